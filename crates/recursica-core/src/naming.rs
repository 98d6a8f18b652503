// ABOUTME: CSS custom-property names for every emitted variable family
// ABOUTME: Names are an append-only contract; older spellings stay available as aliases

use recursica_types::{ThemeMode, VAR_PREFIX, var_ref};

use crate::levels::canonical_level;
use crate::reference::{RefKind, Reference};
use crate::schema::layer_key;
use crate::token_index::{TokenIndex, normalize_path};

/// Which half of a tone pair
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToneRole {
    Tone,
    OnTone,
}

impl ToneRole {
    pub fn suffix(self) -> &'static str {
        match self {
            ToneRole::Tone => "tone",
            ToneRole::OnTone => "on-tone",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InteractiveState {
    Default,
    Hover,
}

impl InteractiveState {
    pub fn as_str(self) -> &'static str {
        match self {
            InteractiveState::Default => "default",
            InteractiveState::Hover => "hover",
        }
    }
}

fn join<I, S>(segments: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    segments
        .into_iter()
        .map(|segment| segment.as_ref().trim().replace([' ', '.', '/'], "-"))
        .filter(|segment| !segment.is_empty())
        .collect::<Vec<_>>()
        .join("-")
}

/// `color/gray/500` -> `--recursica-tokens-color-gray-500`
pub fn token_var(path: &str) -> String {
    format!("{VAR_PREFIX}-tokens-{}", join(normalize_path(path).split('/')))
}

fn themes_prefix(mode: ThemeMode) -> String {
    format!("{VAR_PREFIX}-brand-themes-{mode}")
}

pub fn palette_var(mode: ThemeMode, palette: &str, level: &str, role: ToneRole) -> String {
    format!(
        "{}-palettes-{}-{level}-{}",
        themes_prefix(mode),
        join([palette]),
        role.suffix()
    )
}

/// The core color alias, e.g. `...-palettes-core-black`
pub fn core_var(mode: ThemeMode, name: &str) -> String {
    format!("{}-palettes-core-{name}", themes_prefix(mode))
}

pub fn core_role_var(mode: ThemeMode, name: &str, role: ToneRole) -> String {
    format!("{}-{}", core_var(mode, name), role.suffix())
}

pub fn interactive_var(mode: ThemeMode, state: InteractiveState, role: ToneRole) -> String {
    format!(
        "{}-{}-{}",
        core_var(mode, "interactive"),
        state.as_str(),
        role.suffix()
    )
}

/// `--recursica-brand-themes-<mode>-layer-<key>-property-<property>`
pub fn layer_var(mode: ThemeMode, layer: &str, property: &str) -> String {
    format!("{}-layer-{layer}-property-{property}", themes_prefix(mode))
}

/// Older generation name for a layer variable: drops the `themes-` segment
pub fn legacy_layer_alias(name: &str) -> Option<String> {
    let rest = name.strip_prefix(&format!("{VAR_PREFIX}-brand-themes-"))?;
    let (mode, tail) = rest.split_once('-')?;
    ThemeMode::from_segment(mode)?;
    tail.starts_with("layer-")
        .then(|| format!("{VAR_PREFIX}-brand-{mode}-{tail}"))
}

pub fn dimension_var<I, S>(path: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    format!("{VAR_PREFIX}-brand-dimensions-{}", join(path))
}

/// Mode-scoped brand variables such as `text-emphasis-high` or `state-hover`
pub fn theme_var(mode: ThemeMode, suffix: &str) -> String {
    format!("{}-{suffix}", themes_prefix(mode))
}

pub fn typography_var(slot: &str, property: &str) -> String {
    format!("{VAR_PREFIX}-brand-typography-{}-{property}", join([slot]))
}

pub fn ui_kit_var<I, S>(path: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    format!("{VAR_PREFIX}-ui-kit-{}", join(path))
}

/// The `var()` a reference compiles to, when it names something we emit.
///
/// Token references must exist in `tokens`; brand references are mapped by
/// shape only. [`BuildContext::var_for`](crate::context::BuildContext::var_for)
/// adds the check that the target resolves.
pub fn reference_var(reference: &Reference, mode: ThemeMode, tokens: &TokenIndex) -> Option<String> {
    match reference.kind {
        RefKind::Token => {
            let path = reference.slash_path();
            tokens.contains(&path).then(|| var_ref(&token_var(&path)))
        }
        RefKind::Brand => {
            let mode = reference.mode.unwrap_or(mode);
            brand_var_name(&reference.path, mode).map(|name| var_ref(&name))
        }
    }
}

fn brand_var_name(path: &[String], mode: ThemeMode) -> Option<String> {
    let head = path.first()?.as_str();
    let rest = &path[1..];

    match head {
        "palettes" | "palette" => palette_path_name(rest, mode),
        "layers" | "layer" => {
            let (layer, props) = rest.split_first()?;
            let props = match props.first().map(String::as_str) {
                Some("properties") | Some("property") => &props[1..],
                _ => props,
            };
            if props.is_empty() {
                return None;
            }
            Some(layer_var(mode, &layer_key(layer), &join(props)))
        }
        "dimensions" if !rest.is_empty() => Some(dimension_var(rest)),
        "text-emphasis" if rest.len() == 1 => {
            Some(theme_var(mode, &format!("text-emphasis-{}", rest[0])))
        }
        "states" if !rest.is_empty() => Some(theme_var(mode, &format!("state-{}", join(rest)))),
        "typography" if rest.len() == 2 => Some(typography_var(&rest[0], &rest[1])),
        _ => None,
    }
}

fn palette_path_name(rest: &[String], mode: ThemeMode) -> Option<String> {
    let (palette, tail) = rest.split_first()?;
    let tail: Vec<&str> = tail
        .iter()
        .map(String::as_str)
        .filter(|segment| *segment != "color")
        .collect();

    if palette == "core" || palette == "core-colors" {
        return match tail.as_slice() {
            [name] => Some(core_var(mode, name)),
            ["interactive", state] if *state == "default" || *state == "hover" => {
                let state = interactive_state(state)?;
                Some(interactive_var(mode, state, ToneRole::Tone))
            }
            ["interactive", state, role] => {
                Some(interactive_var(mode, interactive_state(state)?, tone_role(role)?))
            }
            [name, role] => Some(core_role_var(mode, name, tone_role(role)?)),
            _ => None,
        };
    }

    let (level, role) = match tail.as_slice() {
        [level] => (*level, ToneRole::Tone),
        [level, role] => (*level, tone_role(role)?),
        _ => return None,
    };
    let level = match level {
        "primary" => "primary",
        other => canonical_level(other)?,
    };
    Some(palette_var(mode, palette, level, role))
}

fn tone_role(segment: &str) -> Option<ToneRole> {
    match segment {
        "tone" => Some(ToneRole::Tone),
        "on-tone" | "onTone" => Some(ToneRole::OnTone),
        _ => None,
    }
}

fn interactive_state(segment: &str) -> Option<InteractiveState> {
    match segment {
        "default" => Some(InteractiveState::Default),
        "hover" => Some(InteractiveState::Hover),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reference::parse_reference;
    use serde_json::json;

    #[test]
    fn test_basic_names() {
        assert_eq!(token_var("color/gray/500"), "--recursica-tokens-color-gray-500");
        assert_eq!(token_var("tokens.size.md"), "--recursica-tokens-size-md");
        assert_eq!(
            palette_var(ThemeMode::Light, "neutral", "500", ToneRole::OnTone),
            "--recursica-brand-themes-light-palettes-neutral-500-on-tone"
        );
        assert_eq!(
            interactive_var(ThemeMode::Dark, InteractiveState::Hover, ToneRole::Tone),
            "--recursica-brand-themes-dark-palettes-core-interactive-hover-tone"
        );
        assert_eq!(
            layer_var(ThemeMode::Light, "layer-0", "surface"),
            "--recursica-brand-themes-light-layer-layer-0-property-surface"
        );
        assert_eq!(dimension_var(["spacers", "sm"]), "--recursica-brand-dimensions-spacers-sm");
        assert_eq!(
            typography_var("h1", "font-family"),
            "--recursica-brand-typography-h1-font-family"
        );
    }

    #[test]
    fn test_legacy_layer_alias() {
        let name = layer_var(ThemeMode::Dark, "layer-2", "padding");
        assert_eq!(
            legacy_layer_alias(&name).as_deref(),
            Some("--recursica-brand-dark-layer-layer-2-property-padding")
        );
        assert_eq!(legacy_layer_alias("--recursica-brand-themes-light-palettes-x"), None);
    }

    #[test]
    fn test_reference_var_for_tokens_requires_presence() {
        let tokens = TokenIndex::build(&json!({ "color": { "gray": { "500": "#808080" } } }));
        let present = parse_reference("{tokens.color.gray.500}").unwrap();
        assert_eq!(
            reference_var(&present, ThemeMode::Light, &tokens).as_deref(),
            Some("var(--recursica-tokens-color-gray-500)")
        );
        let absent = parse_reference("{tokens.color.gray.600}").unwrap();
        assert_eq!(reference_var(&absent, ThemeMode::Light, &tokens), None);
    }

    #[test]
    fn test_reference_var_for_brand_shapes() {
        let tokens = TokenIndex::default();
        let cases = [
            (
                "{brand.themes.dark.palettes.neutral.50.on-tone}",
                "var(--recursica-brand-themes-dark-palettes-neutral-050-on-tone)",
            ),
            (
                "{brand.palettes.neutral.500.color.tone}",
                "var(--recursica-brand-themes-light-palettes-neutral-500-tone)",
            ),
            (
                "{brand.palettes.core-colors.white}",
                "var(--recursica-brand-themes-light-palettes-core-white)",
            ),
            (
                "{brand.palettes.core.interactive.hover.on-tone}",
                "var(--recursica-brand-themes-light-palettes-core-interactive-hover-on-tone)",
            ),
            (
                "{brand.layers.1.properties.surface}",
                "var(--recursica-brand-themes-light-layer-layer-1-property-surface)",
            ),
            ("{brand.dimensions.md}", "var(--recursica-brand-dimensions-md)"),
            (
                "{brand.text-emphasis.low}",
                "var(--recursica-brand-themes-light-text-emphasis-low)",
            ),
        ];
        for (input, expected) in cases {
            let reference = parse_reference(input).unwrap();
            assert_eq!(
                reference_var(&reference, ThemeMode::Light, &tokens).as_deref(),
                Some(expected),
                "{input}"
            );
        }
    }

    #[test]
    fn test_reference_var_unknown_shapes() {
        let tokens = TokenIndex::default();
        for input in ["{brand.palettes.neutral.550}", "{brand.elevations.1}"] {
            let reference = parse_reference(input).unwrap();
            assert_eq!(reference_var(&reference, ThemeMode::Light, &tokens), None, "{input}");
        }
    }
}
