// ABOUTME: Read/write facade over a live set of CSS custom properties
// ABOUTME: StyleSurface is the in-memory target; writes broadcast cssVarsUpdated

use recursica_events::{EventBus, ThemeEvent};
use recursica_logging::trace;
use recursica_types::{CssVarMap, var_target};

/// Hops followed when resolving a `var()` chain on a surface
pub const VAR_CHAIN_LIMIT: usize = 10;

/// A live style target holding custom properties
pub trait CssVarSurface {
    fn get(&self, name: &str) -> Option<String>;

    /// Returns true when the stored value changed
    fn set(&mut self, name: &str, value: &str) -> bool;

    /// Names visited following `var()` references from `name`, starting with `name`
    fn var_chain(&self, name: &str) -> Vec<String> {
        let mut chain = vec![name.to_string()];
        let mut current = name.to_string();
        for _ in 0..VAR_CHAIN_LIMIT {
            let Some(value) = self.get(&current) else {
                break;
            };
            let Some(next) = var_target(&value) else {
                break;
            };
            if chain.iter().any(|seen| seen == next) {
                break;
            }
            chain.push(next.to_string());
            current = next.to_string();
        }
        chain
    }

    /// Terminal value of `name` after following `var()` references.
    ///
    /// `None` when the chain dangles, cycles, or runs past the hop limit.
    fn resolve(&self, name: &str) -> Option<String> {
        let mut value = self.get(name)?;
        for _ in 0..VAR_CHAIN_LIMIT {
            match var_target(&value) {
                Some(next) => value = self.get(next)?,
                None => return Some(value.trim().to_string()),
            }
        }
        None
    }
}

/// In-memory custom-property table, ordered by name
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StyleSurface {
    vars: CssVarMap,
}

impl StyleSurface {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set every entry of `vars`, returning the names whose value changed
    pub fn apply(&mut self, vars: &CssVarMap) -> Vec<String> {
        vars.iter()
            .filter_map(|(name, value)| self.set(name, value).then(|| name.clone()))
            .collect()
    }

    pub fn vars(&self) -> &CssVarMap {
        &self.vars
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }

    /// Render as one rule block, e.g. `:root { --a: 1px; }`
    pub fn to_css(&self, selector: &str) -> String {
        let mut css = format!("{selector} {{\n");
        for (name, value) in &self.vars {
            css.push_str(&format!("  {name}: {value};\n"));
        }
        css.push_str("}\n");
        css
    }
}

impl CssVarSurface for StyleSurface {
    fn get(&self, name: &str) -> Option<String> {
        self.vars.get(name).cloned()
    }

    fn set(&mut self, name: &str, value: &str) -> bool {
        if self.vars.get(name).map(String::as_str) == Some(value) {
            return false;
        }
        self.vars.insert(name.to_string(), value.to_string());
        true
    }
}

/// Write `updates` to `surface` and broadcast the names that actually changed.
pub fn write_and_notify(
    surface: &mut dyn CssVarSurface,
    bus: &dyn EventBus,
    updates: &CssVarMap,
) -> Vec<String> {
    let changed: Vec<String> = updates
        .iter()
        .filter_map(|(name, value)| surface.set(name, value).then(|| name.clone()))
        .collect();

    if changed.is_empty() {
        trace!(requested = updates.len(), "No CSS variables changed");
    } else {
        bus.dispatch(ThemeEvent::CssVarsUpdated {
            names: changed.clone(),
        });
    }
    changed
}

#[cfg(test)]
mod tests {
    use super::*;
    use recursica_events::RecordingBus;

    fn surface() -> StyleSurface {
        let mut surface = StyleSurface::new();
        let vars: CssVarMap = [
            ("--a", "var(--b)"),
            ("--b", "var(--c, red)"),
            ("--c", " #ffffff "),
            ("--loop-1", "var(--loop-2)"),
            ("--loop-2", "var(--loop-1)"),
            ("--dangling", "var(--nowhere)"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
        surface.apply(&vars);
        surface
    }

    #[test]
    fn test_resolve_follows_chain() {
        let surface = surface();
        assert_eq!(surface.resolve("--a").as_deref(), Some("#ffffff"));
        assert_eq!(surface.var_chain("--a"), vec!["--a", "--b", "--c"]);
    }

    #[test]
    fn test_resolve_stops_on_cycles_and_dangling() {
        let surface = surface();
        assert_eq!(surface.resolve("--loop-1"), None);
        assert_eq!(surface.resolve("--dangling"), None);
        assert_eq!(surface.resolve("--missing"), None);
        assert_eq!(surface.var_chain("--loop-1"), vec!["--loop-1", "--loop-2"]);
    }

    #[test]
    fn test_apply_reports_only_changes() {
        let mut surface = surface();
        let mut update = CssVarMap::new();
        update.insert("--a".into(), "var(--b)".into());
        update.insert("--d".into(), "4px".into());
        assert_eq!(surface.apply(&update), vec!["--d"]);
    }

    #[test]
    fn test_write_and_notify_broadcasts_changed_names() {
        let mut surface = surface();
        let bus = RecordingBus::new();

        let mut update = CssVarMap::new();
        update.insert("--c".into(), "#000000".into());
        update.insert("--a".into(), "var(--b)".into());
        let changed = write_and_notify(&mut surface, &bus, &update);

        assert_eq!(changed, vec!["--c"]);
        assert_eq!(
            bus.take(),
            vec![ThemeEvent::CssVarsUpdated {
                names: vec!["--c".into()]
            }]
        );

        // Idempotent: a second identical write is silent
        write_and_notify(&mut surface, &bus, &update);
        assert!(bus.events().is_empty());
    }

    #[test]
    fn test_to_css() {
        let mut surface = StyleSurface::new();
        let mut vars = CssVarMap::new();
        vars.insert("--recursica-x".into(), "1px".into());
        surface.apply(&vars);
        assert_eq!(surface.to_css(":root"), ":root {\n  --recursica-x: 1px;\n}\n");
    }
}
