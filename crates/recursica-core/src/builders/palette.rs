// ABOUTME: Expands brand palettes into tone/on-tone variables plus a primary alias level
// ABOUTME: Also emits core colors, interactive states, text emphasis, and state opacities

use recursica_logging::{debug, instrument};
use recursica_types::{CssVarMap, ThemeMode, var_ref};
use serde_json::Value;

use crate::builders::values::{color_value, mode_field, opacity_value};
use crate::color::{Rgb, contrast_ratio};
use crate::context::{BuildContext, leaf_text};
use crate::levels::{PRIMARY_FALLBACK_ORDER, PRIMARY_LEVEL, SCALE_LEVELS, canonical_level};
use crate::naming::{
    InteractiveState, ToneRole, core_role_var, core_var, interactive_var, palette_var, theme_var,
};
use crate::reference::parse_reference;
use crate::resolver::COLOR_DEPTH_LIMIT;
use crate::schema::{CORE_COLOR_NAMES, CoreColors, Palette, PaletteLevel};
use crate::store::read_primary_level;

#[instrument(level = "debug", skip_all, fields(mode = %ctx.mode))]
pub fn build(ctx: &BuildContext<'_>) -> CssVarMap {
    let mut vars = CssVarMap::new();

    for key in ctx.theme.palette_keys() {
        if let Some(palette) = ctx.theme.palette(ctx.mode, key) {
            build_palette(ctx, key, palette, &mut vars);
        }
    }

    build_core(ctx, &mut vars);
    build_theme_opacities(ctx, &mut vars);

    debug!(count = vars.len(), "Palette variables built");
    vars
}

fn build_palette(ctx: &BuildContext<'_>, key: &str, palette: &Palette, vars: &mut CssVarMap) {
    let mut toned = Vec::new();

    for level in SCALE_LEVELS {
        let Some(entry) = palette.level(level) else {
            continue;
        };

        match entry.tone.as_ref().map(|tone| (tone, color_value(ctx, tone))) {
            Some((_, Some(tone))) => {
                vars.insert(palette_var(ctx.mode, key, level, ToneRole::Tone), tone);
                toned.push(level);
            }
            Some((raw, None)) => {
                debug!(palette = key, level, tone = %raw, "Palette tone did not resolve");
            }
            None => {}
        }

        // A level that exists always gets an on-tone, tone or not
        vars.insert(
            palette_var(ctx.mode, key, level, ToneRole::OnTone),
            on_tone_value(ctx, entry.on_tone.as_ref()),
        );
    }

    if let Some(level) = choose_primary(ctx, key, palette, &toned) {
        for role in [ToneRole::Tone, ToneRole::OnTone] {
            vars.insert(
                palette_var(ctx.mode, key, PRIMARY_LEVEL, role),
                var_ref(&palette_var(ctx.mode, key, level, role)),
            );
        }
    }
}

/// On-tone policy: black/white literals and core references map to core
/// variables, other references to their var, absent values to core black.
fn on_tone_value(ctx: &BuildContext<'_>, value: Option<&Value>) -> String {
    let black = var_ref(&core_var(ctx.mode, "black"));
    let Some(value) = value else {
        return black;
    };

    if let Some(name) = leaf_text(value).and_then(black_or_white) {
        return var_ref(&core_var(ctx.mode, name));
    }

    match color_value(ctx, value) {
        Some(color) => color,
        None => {
            debug!(value = %value, "On-tone did not resolve, using core black");
            black
        }
    }
}

fn black_or_white(text: &str) -> Option<&'static str> {
    // Only literals; `{...}` references are mapped by name instead
    if parse_reference(text).is_some() {
        return None;
    }
    let color = Rgb::parse(text)?;
    if color == Rgb::WHITE {
        Some("white")
    } else if color == Rgb::BLACK {
        Some("black")
    } else {
        None
    }
}

/// Stored user choice, then the palette's `default`, then the fallback order.
/// Only levels that emitted a tone qualify.
fn choose_primary(
    ctx: &BuildContext<'_>,
    key: &str,
    palette: &Palette,
    toned: &[&'static str],
) -> Option<&'static str> {
    if let Some(store) = ctx.store() {
        if let Some(level) = read_primary_level(store, key, ctx.mode) {
            if toned.contains(&level) {
                debug!(palette = key, level, "Primary level from stored choice");
                return Some(level);
            }
            debug!(palette = key, level, "Stored primary level has no tone, ignoring");
        }
    }

    if let Some(level) = default_level(key, palette) {
        if toned.contains(&level) {
            return Some(level);
        }
    }

    PRIMARY_FALLBACK_ORDER
        .into_iter()
        .find(|level| toned.contains(level))
}

/// Follow the palette's `default` entry to a concrete level
fn default_level(key: &str, palette: &Palette) -> Option<&'static str> {
    let mut current = palette.default.as_ref()?;

    for _ in 0..COLOR_DEPTH_LIMIT {
        let text = leaf_text(current).or_else(|| tone_text(current))?.trim();
        if let Some(level) = canonical_level(text) {
            return Some(level);
        }

        let reference = parse_reference(text)?;
        if reference.is_token() {
            // `default` repeats a level's tone: find the level with the same source
            return SCALE_LEVELS.into_iter().find(|level| {
                palette
                    .level(level)
                    .and_then(|entry| entry.tone.as_ref())
                    .and_then(leaf_text)
                    .is_some_and(|tone| tone.trim() == text)
            });
        }

        match reference.path.as_slice() {
            [head, palette_key, level, ..]
                if (head == "palettes" || head == "palette") && palette_key == key =>
            {
                if let Some(level) = canonical_level(level) {
                    return Some(level);
                }
                if level != "default" {
                    return None;
                }
                current = palette.default.as_ref()?;
            }
            _ => return None,
        }
    }

    debug!(palette = key, "Default level chain exceeded depth limit");
    None
}

fn tone_text(value: &Value) -> Option<&str> {
    let inner = value.get("color").unwrap_or(value);
    inner.get("tone").and_then(leaf_text)
}

fn core_colors<'t>(ctx: &BuildContext<'t>) -> Option<&'t CoreColors> {
    mode_field(ctx, |mode| {
        let core = &mode.core;
        let declared = !core.entries.is_empty()
            || core.interactive_default != PaletteLevel::default();
        declared.then_some(core)
    })
}

fn build_core(ctx: &BuildContext<'_>, vars: &mut CssVarMap) {
    let core = core_colors(ctx);
    let mode = ctx.mode;

    for name in CORE_COLOR_NAMES {
        let entry = core.and_then(|core| core.entry(name));
        let tone_source = entry.and_then(|entry| entry.tone.clone()).or_else(|| match name {
            "black" => Some(Value::String("#000000".into())),
            "white" => Some(Value::String("#ffffff".into())),
            _ => None,
        });
        let Some(tone_source) = tone_source else {
            debug!(core = name, "Core color not declared");
            continue;
        };
        let Some(tone) = literal_or_color(ctx, &tone_source) else {
            debug!(core = name, tone = %tone_source, "Core color did not resolve");
            continue;
        };

        let tone_name = core_role_var(mode, name, ToneRole::Tone);
        vars.insert(tone_name.clone(), tone);
        vars.insert(core_var(mode, name), var_ref(&tone_name));

        let self_ref = var_ref(&core_var(mode, name));
        let on_tone = entry
            .and_then(|entry| entry.on_tone.as_ref())
            .map(|value| on_tone_value(ctx, Some(value)))
            .filter(|on_tone| *on_tone != self_ref)
            .unwrap_or_else(|| contrasting_core(ctx, &tone_source, name));
        vars.insert(core_role_var(mode, name, ToneRole::OnTone), on_tone);
    }

    build_interactive(ctx, core, vars);
}

/// Core black and white keep their literal so they never chain back into themselves
fn literal_or_color(ctx: &BuildContext<'_>, value: &Value) -> Option<String> {
    match leaf_text(value).and_then(black_or_white) {
        Some("black") => Some("#000000".into()),
        Some("white") => Some("#ffffff".into()),
        _ => color_value(ctx, value),
    }
}

/// Whichever core variable reads better on `tone`
fn contrasting_core(ctx: &BuildContext<'_>, tone: &Value, name: &str) -> String {
    let pick = match ctx.resolve_hex(tone) {
        Ok(color) if contrast_ratio(Rgb::WHITE, color) >= contrast_ratio(Rgb::BLACK, color) => {
            "white"
        }
        Ok(_) => "black",
        Err(_) if name == "black" => "white",
        Err(_) => "black",
    };
    var_ref(&core_var(ctx.mode, pick))
}

fn build_interactive(ctx: &BuildContext<'_>, core: Option<&CoreColors>, vars: &mut CssVarMap) {
    let mode = ctx.mode;
    let Some(core) = core else {
        debug!("No interactive core color declared");
        return;
    };

    let states = [
        (InteractiveState::Default, &core.interactive_default),
        (InteractiveState::Hover, &core.interactive_hover),
    ];
    for (state, entry) in states {
        let tone_name = interactive_var(mode, state, ToneRole::Tone);
        let on_tone_name = interactive_var(mode, state, ToneRole::OnTone);
        let default_tone = interactive_var(mode, InteractiveState::Default, ToneRole::Tone);
        let default_on_tone = interactive_var(mode, InteractiveState::Default, ToneRole::OnTone);

        let tone = entry.tone.as_ref().and_then(|tone| color_value(ctx, tone));
        match (tone, state) {
            (Some(tone), _) => {
                vars.insert(tone_name.clone(), tone);
            }
            (None, InteractiveState::Hover) if vars.contains_key(&default_tone) => {
                vars.insert(tone_name.clone(), var_ref(&default_tone));
            }
            (None, _) => {
                debug!(state = state.as_str(), "Interactive tone not declared");
                continue;
            }
        }

        let on_tone = match (&entry.on_tone, state) {
            (Some(value), _) => on_tone_value(ctx, Some(value)),
            (None, InteractiveState::Hover) if vars.contains_key(&default_on_tone) => {
                var_ref(&default_on_tone)
            }
            (None, _) => match &entry.tone {
                Some(tone) => contrasting_core(ctx, tone, "interactive"),
                None => var_ref(&core_var(mode, "white")),
            },
        };
        vars.insert(on_tone_name, on_tone);
    }

    if vars.contains_key(&interactive_var(mode, InteractiveState::Default, ToneRole::Tone)) {
        vars.insert(
            core_var(mode, "interactive"),
            var_ref(&interactive_var(mode, InteractiveState::Default, ToneRole::Tone)),
        );
        vars.insert(
            core_var(mode, "interactive-hover"),
            var_ref(&interactive_var(mode, InteractiveState::Hover, ToneRole::Tone)),
        );
    }
}

fn build_theme_opacities(ctx: &BuildContext<'_>, vars: &mut CssVarMap) {
    let mode: ThemeMode = ctx.mode;

    let high = mode_field(ctx, |m| m.text_emphasis.high.as_ref());
    let low = mode_field(ctx, |m| m.text_emphasis.low.as_ref());
    vars.insert(theme_var(mode, "text-emphasis-high"), opacity_value(ctx, high));
    vars.insert(theme_var(mode, "text-emphasis-low"), opacity_value(ctx, low));

    let disabled = mode_field(ctx, |m| m.states.disabled.as_ref());
    let hover = mode_field(ctx, |m| m.states.hover.as_ref());
    let overlay = mode_field(ctx, |m| m.states.overlay_opacity.as_ref());
    vars.insert(theme_var(mode, "state-disabled"), opacity_value(ctx, disabled));
    vars.insert(theme_var(mode, "state-hover"), opacity_value(ctx, hover));
    vars.insert(theme_var(mode, "state-overlay-opacity"), opacity_value(ctx, overlay));

    let overlay_color = mode_field(ctx, |m| m.states.overlay_color.as_ref())
        .and_then(|color| color_value(ctx, color))
        .unwrap_or_else(|| var_ref(&core_var(mode, "black")));
    vars.insert(theme_var(mode, "state-overlay-color"), overlay_color);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::ThemeSource;
    use crate::store::{KeyValueStore, MemoryStore, primary_level_key};
    use crate::token_index::TokenIndex;
    use serde_json::json;

    const NEUTRAL_500_TONE: &str = "--recursica-brand-themes-light-palettes-neutral-500-tone";

    fn tokens() -> TokenIndex {
        TokenIndex::build(&json!({
            "color": {
                "gray": {
                    "050": "#fafafa",
                    "200": "#dddddd",
                    "500": "#808080",
                    "900": "#111111"
                },
                "red": { "500": "#d32f2f" }
            },
            "opacity": { "solid": 1, "smoky": 0.64 }
        }))
    }

    fn theme(neutral: Value) -> ThemeSource {
        ThemeSource::from_value(json!({
            "brand": { "themes": { "light": { "palettes": {
                "core-colors": {
                    "alert": "{tokens.color.red.500}",
                    "interactive": { "default": { "tone": "{tokens.color.gray.900}" } }
                },
                "neutral": neutral
            } } } }
        }))
    }

    #[test]
    fn test_tone_compiles_to_token_var() {
        let tokens = tokens();
        let theme = theme(json!({ "500": { "color": { "tone": "{tokens.color.gray.500}" } } }));
        let vars = build(&BuildContext::new(&tokens, &theme, ThemeMode::Light));

        assert_eq!(vars[NEUTRAL_500_TONE], "var(--recursica-tokens-color-gray-500)");
        assert_eq!(
            vars["--recursica-brand-themes-light-palettes-neutral-500-on-tone"],
            "var(--recursica-brand-themes-light-palettes-core-black)"
        );
    }

    #[test]
    fn test_every_present_level_gets_on_tone() {
        let tokens = tokens();
        let theme = theme(json!({
            "200": { "on-tone": "white" },
            "500": { "tone": "{tokens.color.gray.500}", "on-tone": "{brand.palettes.core-colors.white}" },
            "900": { "tone": "{tokens.color.gray.900}", "on-tone": "{brand.palettes.neutral.500}" }
        }));
        let vars = build(&BuildContext::new(&tokens, &theme, ThemeMode::Light));

        let white = "var(--recursica-brand-themes-light-palettes-core-white)";
        assert!(!vars.contains_key("--recursica-brand-themes-light-palettes-neutral-200-tone"));
        assert_eq!(vars["--recursica-brand-themes-light-palettes-neutral-200-on-tone"], white);
        assert_eq!(vars["--recursica-brand-themes-light-palettes-neutral-500-on-tone"], white);
        assert_eq!(
            vars["--recursica-brand-themes-light-palettes-neutral-900-on-tone"],
            format!("var({NEUTRAL_500_TONE})")
        );
        assert!(!vars.contains_key("--recursica-brand-themes-light-palettes-neutral-100-on-tone"));
    }

    #[test]
    fn test_on_tone_to_undefined_palette_uses_core_black() {
        let tokens = tokens();
        let theme = theme(json!({
            "500": { "tone": "{tokens.color.gray.500}", "on-tone": "{brand.palettes.ghost.500}" }
        }));
        let vars = build(&BuildContext::new(&tokens, &theme, ThemeMode::Light));

        assert_eq!(
            vars["--recursica-brand-themes-light-palettes-neutral-500-on-tone"],
            "var(--recursica-brand-themes-light-palettes-core-black)"
        );
        assert!(!vars.keys().any(|name| name.contains("-ghost-")));
    }

    #[test]
    fn test_tones_referencing_each_other_are_dropped() {
        let tokens = tokens();
        let theme = ThemeSource::from_value(json!({
            "light": { "palettes": {
                "neutral": {
                    "500": { "tone": "{brand.palettes.accent.500}" },
                    "900": { "tone": "{tokens.color.gray.900}" }
                },
                "accent": {
                    "500": { "tone": "{brand.palettes.neutral.500}" },
                    "700": { "tone": "{brand.palettes.neutral.900}" }
                }
            } }
        }));
        let vars = build(&BuildContext::new(&tokens, &theme, ThemeMode::Light));
        let prefix = "--recursica-brand-themes-light-palettes";

        assert!(!vars.contains_key(&format!("{prefix}-neutral-500-tone")));
        assert!(!vars.contains_key(&format!("{prefix}-accent-500-tone")));
        assert_eq!(
            vars[&format!("{prefix}-accent-700-tone")],
            format!("var({prefix}-neutral-900-tone)")
        );
        assert_eq!(
            vars[&format!("{prefix}-accent-primary-tone")],
            format!("var({prefix}-accent-700-tone)")
        );
        // Levels without a tone still get an on-tone
        assert!(vars.contains_key(&format!("{prefix}-neutral-500-on-tone")));
    }

    #[test]
    fn test_primary_fallback_order() {
        let tokens = tokens();
        let theme = theme(json!({
            "200": { "tone": "{tokens.color.gray.200}" },
            "900": { "tone": "{tokens.color.gray.900}" }
        }));
        let vars = build(&BuildContext::new(&tokens, &theme, ThemeMode::Light));

        // 500, 400, 600, 300, 700 are absent; 200 is next in line
        assert_eq!(
            vars["--recursica-brand-themes-light-palettes-neutral-primary-tone"],
            "var(--recursica-brand-themes-light-palettes-neutral-200-tone)"
        );
        assert_eq!(
            vars["--recursica-brand-themes-light-palettes-neutral-primary-on-tone"],
            "var(--recursica-brand-themes-light-palettes-neutral-200-on-tone)"
        );
    }

    #[test]
    fn test_primary_follows_default_chain() {
        let tokens = tokens();
        let theme = theme(json!({
            "500": { "tone": "{tokens.color.gray.500}" },
            "900": { "tone": "{tokens.color.gray.900}" },
            "default": { "$value": "{brand.themes.light.palettes.neutral.900}" }
        }));
        let vars = build(&BuildContext::new(&tokens, &theme, ThemeMode::Light));
        assert_eq!(
            vars["--recursica-brand-themes-light-palettes-neutral-primary-tone"],
            "var(--recursica-brand-themes-light-palettes-neutral-900-tone)"
        );
    }

    #[test]
    fn test_cyclic_default_falls_back() {
        let tokens = tokens();
        let theme = theme(json!({
            "500": { "tone": "{tokens.color.gray.500}" },
            "default": "{brand.palettes.neutral.default}"
        }));
        let vars = build(&BuildContext::new(&tokens, &theme, ThemeMode::Light));
        assert_eq!(
            vars["--recursica-brand-themes-light-palettes-neutral-primary-tone"],
            format!("var({NEUTRAL_500_TONE})")
        );
    }

    #[test]
    fn test_stored_primary_wins() {
        let tokens = tokens();
        let theme = theme(json!({
            "500": { "tone": "{tokens.color.gray.500}" },
            "900": { "tone": "{tokens.color.gray.900}" },
            "default": "500"
        }));
        let store = MemoryStore::new();
        store
            .set(&primary_level_key("neutral", ThemeMode::Light), "\"900\"")
            .unwrap();

        let ctx = BuildContext::new(&tokens, &theme, ThemeMode::Light).with_store(&store);
        let vars = build(&ctx);
        assert_eq!(
            vars["--recursica-brand-themes-light-palettes-neutral-primary-tone"],
            "var(--recursica-brand-themes-light-palettes-neutral-900-tone)"
        );

        // A stored level without a tone is ignored
        store
            .set(&primary_level_key("neutral", ThemeMode::Light), "300")
            .unwrap();
        let vars = build(&ctx);
        assert_eq!(
            vars["--recursica-brand-themes-light-palettes-neutral-primary-tone"],
            format!("var({NEUTRAL_500_TONE})")
        );
    }

    #[test]
    fn test_core_colors() {
        let tokens = tokens();
        let theme = theme(json!({}));
        let vars = build(&BuildContext::new(&tokens, &theme, ThemeMode::Light));
        let core = "--recursica-brand-themes-light-palettes-core";

        assert_eq!(vars[&format!("{core}-black-tone")], "#000000");
        assert_eq!(vars[&format!("{core}-black")], format!("var({core}-black-tone)"));
        assert_eq!(vars[&format!("{core}-black-on-tone")], format!("var({core}-white)"));
        assert_eq!(vars[&format!("{core}-white-on-tone")], format!("var({core}-black)"));
        assert_eq!(
            vars[&format!("{core}-alert-tone")],
            "var(--recursica-tokens-color-red-500)"
        );
        assert_eq!(vars[&format!("{core}-alert-on-tone")], format!("var({core}-white)"));
        assert!(!vars.contains_key(&format!("{core}-warning-tone")));
    }

    #[test]
    fn test_interactive_states() {
        let tokens = tokens();
        let theme = theme(json!({}));
        let vars = build(&BuildContext::new(&tokens, &theme, ThemeMode::Light));
        let core = "--recursica-brand-themes-light-palettes-core";

        assert_eq!(
            vars[&format!("{core}-interactive-default-tone")],
            "var(--recursica-tokens-color-gray-900)"
        );
        assert_eq!(
            vars[&format!("{core}-interactive-default-on-tone")],
            format!("var({core}-white)")
        );
        assert_eq!(
            vars[&format!("{core}-interactive-hover-tone")],
            format!("var({core}-interactive-default-tone)")
        );
        assert_eq!(
            vars[&format!("{core}-interactive-hover-on-tone")],
            format!("var({core}-interactive-default-on-tone)")
        );
        assert_eq!(
            vars[&format!("{core}-interactive")],
            format!("var({core}-interactive-default-tone)")
        );
    }

    #[test]
    fn test_emphasis_and_states() {
        let tokens = tokens();
        let theme = ThemeSource::from_value(json!({
            "light": {
                "text-emphasis": { "high": 100, "low": "{tokens.opacity.smoky}" },
                "states": { "disabled": 0.5 }
            }
        }));
        let vars = build(&BuildContext::new(&tokens, &theme, ThemeMode::Light));
        let prefix = "--recursica-brand-themes-light";

        assert_eq!(vars[&format!("{prefix}-text-emphasis-high")], "1");
        assert_eq!(
            vars[&format!("{prefix}-text-emphasis-low")],
            "var(--recursica-tokens-opacity-smoky)"
        );
        assert_eq!(vars[&format!("{prefix}-state-disabled")], "0.5");
        assert_eq!(
            vars[&format!("{prefix}-state-hover")],
            "var(--recursica-tokens-opacity-solid)"
        );
        assert_eq!(
            vars[&format!("{prefix}-state-overlay-color")],
            format!("var({prefix}-palettes-core-black)")
        );
    }

    #[test]
    fn test_dark_mode_uses_light_palette_keys() {
        let tokens = tokens();
        let theme = ThemeSource::from_value(json!({
            "light": { "palettes": { "neutral": { "500": { "tone": "{tokens.color.gray.500}" } } } },
            "dark": { "palettes": { "neutral": { "500": { "tone": "{tokens.color.gray.900}" } } } }
        }));
        let vars = build(&BuildContext::new(&tokens, &theme, ThemeMode::Dark));
        assert_eq!(
            vars["--recursica-brand-themes-dark-palettes-neutral-500-tone"],
            "var(--recursica-tokens-color-gray-900)"
        );
    }
}
