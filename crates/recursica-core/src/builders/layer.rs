// ABOUTME: Expands numbered and alternative layers into surface, border, spacing, and element variables
// ABOUTME: Literal surfaces that match no palette tone are reported, never fatal

use recursica_events::ThemeEvent;
use recursica_logging::{debug, instrument, warn};
use recursica_types::{CssVarMap, MissingPaletteRef, var_ref};
use serde_json::Value;

use crate::builders::values::{color_token_for, color_value, default_size, opacity_value, size_value};
use crate::color::Rgb;
use crate::context::{BuildContext, leaf_text};
use crate::levels::{PRIMARY_LEVEL, SCALE_LEVELS, canonical_level};
use crate::naming::{
    InteractiveState, ToneRole, core_var, interactive_var, layer_var, legacy_layer_alias,
    palette_var, theme_var, token_var,
};
use crate::reference::{RefKind, Reference, parse_reference};
use crate::schema::LayerSpec;
use crate::token_index::TokenOverrides;

/// Property names emitted per layer
pub mod property {
    pub const SURFACE: &str = "surface";
    pub const BORDER_COLOR: &str = "border-color";
    pub const BORDER_THICKNESS: &str = "border-thickness";
    pub const BORDER_RADIUS: &str = "border-radius";
    pub const PADDING: &str = "padding";
    pub const TEXT_COLOR: &str = "element-text-color";
    pub const TEXT_HIGH_EMPHASIS: &str = "element-text-high-emphasis";
    pub const TEXT_LOW_EMPHASIS: &str = "element-text-low-emphasis";
    pub const TEXT_ALERT: &str = "element-text-alert";
    pub const TEXT_WARNING: &str = "element-text-warning";
    pub const TEXT_SUCCESS: &str = "element-text-success";
    pub const INTERACTIVE_TONE: &str = "element-interactive-tone";
    pub const INTERACTIVE_TONE_HOVER: &str = "element-interactive-tone-hover";
    pub const INTERACTIVE_ON_TONE: &str = "element-interactive-on-tone";
    pub const INTERACTIVE_ON_TONE_HOVER: &str = "element-interactive-on-tone-hover";
}

/// Build every layer for the context's mode.
///
/// `palette_vars` is the palette builder's output for the same build; it is
/// checked before the live surface when deriving text color from a surface's on-tone.
#[instrument(level = "debug", skip_all, fields(mode = %ctx.mode))]
pub fn build(
    ctx: &BuildContext<'_>,
    overrides: Option<&TokenOverrides>,
    palette_vars: Option<&CssVarMap>,
) -> CssVarMap {
    match overrides {
        Some(overrides) if !overrides.is_empty() => {
            let tokens = ctx.tokens.with_overrides(overrides);
            build_layers(&ctx.with_tokens(&tokens), palette_vars)
        }
        _ => build_layers(ctx, palette_vars),
    }
}

fn build_layers(ctx: &BuildContext<'_>, palette_vars: Option<&CssVarMap>) -> CssVarMap {
    let tones = PaletteTones::collect(ctx);
    let mut vars = CssVarMap::new();
    let mut missing = Vec::new();

    for layer in ctx.theme.layers(ctx.mode) {
        build_layer(ctx, layer, &tones, palette_vars, &mut vars, &mut missing);
    }

    add_legacy_aliases(&mut vars);

    if !missing.is_empty() {
        warn!(
            mode = %ctx.mode,
            count = missing.len(),
            "Layer surfaces are not palette references"
        );
        ctx.dispatch(ThemeEvent::MissingLayerPaletteRefs { refs: missing });
    }

    debug!(count = vars.len(), "Layer variables built");
    vars
}

/// Resolved palette tones, for matching literal surfaces back to a palette level
struct PaletteTones {
    entries: Vec<(String, &'static str, Rgb)>,
}

impl PaletteTones {
    fn collect(ctx: &BuildContext<'_>) -> Self {
        let mut entries = Vec::new();
        for key in ctx.theme.palette_keys() {
            let Some(palette) = ctx.theme.palette(ctx.mode, key) else {
                continue;
            };
            for level in SCALE_LEVELS {
                let tone = palette.level(level).and_then(|entry| entry.tone.as_ref());
                if let Some(color) = tone.and_then(|tone| ctx.resolve_hex(tone).ok()) {
                    entries.push((key.to_string(), level, color));
                }
            }
        }
        Self { entries }
    }

    fn find(&self, color: Rgb) -> Option<(String, String)> {
        self.entries
            .iter()
            .find(|(_, _, tone)| *tone == color)
            .map(|(palette, level, _)| (palette.clone(), level.to_string()))
    }
}

enum SurfaceValue {
    Palette { palette: String, level: String },
    Var(String),
    Literal(String),
    Unresolved(String),
}

fn surface_value(ctx: &BuildContext<'_>, raw: &Value, tones: &PaletteTones) -> SurfaceValue {
    let reference = leaf_text(raw)
        .and_then(parse_reference)
        .filter(|reference| ctx.resolves(reference));
    if let Some((palette, level)) = reference.as_ref().and_then(palette_tone_ref) {
        return SurfaceValue::Palette { palette, level };
    }

    let resolved = ctx.resolve_hex(raw).ok();
    if let Some((palette, level)) = resolved.and_then(|color| tones.find(color)) {
        return SurfaceValue::Palette { palette, level };
    }

    if let Some(var) = reference.as_ref().and_then(|reference| ctx.var_for(reference)) {
        return SurfaceValue::Var(var);
    }

    match resolved {
        Some(color) => match color_token_for(ctx.tokens, color) {
            Some(key) => SurfaceValue::Var(var_ref(&token_var(key))),
            None => SurfaceValue::Literal(color.to_hex()),
        },
        None => SurfaceValue::Unresolved(
            leaf_text(raw)
                .map(str::to_string)
                .unwrap_or_else(|| raw.to_string()),
        ),
    }
}

/// `{brand.palettes.<p>.<level>[.color][.tone]}` -> (p, level)
fn palette_tone_ref(reference: &Reference) -> Option<(String, String)> {
    if reference.kind != RefKind::Brand {
        return None;
    }
    let segments: Vec<&str> = reference
        .path
        .iter()
        .map(String::as_str)
        .filter(|segment| *segment != "color")
        .collect();
    let (palette, level) = match segments.as_slice() {
        [head, palette, level] | [head, palette, level, "tone"]
            if *head == "palettes" || *head == "palette" =>
        {
            (*palette, *level)
        }
        _ => return None,
    };
    if palette == "core" || palette == "core-colors" {
        return None;
    }
    let level = if level == PRIMARY_LEVEL {
        PRIMARY_LEVEL
    } else {
        canonical_level(level)?
    };
    Some((palette.to_string(), level.to_string()))
}

fn build_layer(
    ctx: &BuildContext<'_>,
    layer: &LayerSpec,
    tones: &PaletteTones,
    palette_vars: Option<&CssVarMap>,
    vars: &mut CssVarMap,
    missing: &mut Vec<MissingPaletteRef>,
) {
    let mode = ctx.mode;
    let name = |prop: &str| layer_var(mode, &layer.key, prop);
    let mut surface_palette = None;

    if let Some(raw) = &layer.surface {
        match surface_value(ctx, raw, tones) {
            SurfaceValue::Palette { palette, level } => {
                vars.insert(
                    name(property::SURFACE),
                    var_ref(&palette_var(mode, &palette, &level, ToneRole::Tone)),
                );
                surface_palette = Some((palette, level));
            }
            SurfaceValue::Var(var) => {
                vars.insert(name(property::SURFACE), var);
            }
            SurfaceValue::Literal(hex) => {
                debug!(layer = %layer.key, surface = %hex, "Surface matches no palette tone");
                vars.insert(name(property::SURFACE), hex.clone());
                missing.push(missing_ref(ctx, layer, hex));
            }
            SurfaceValue::Unresolved(text) => {
                debug!(layer = %layer.key, surface = %text, "Surface did not resolve");
                missing.push(missing_ref(ctx, layer, text));
            }
        }
    }

    if let Some(color) = layer.border_color.as_ref().and_then(|raw| color_value(ctx, raw)) {
        vars.insert(name(property::BORDER_COLOR), color);
    }

    let sizes = [
        (property::PADDING, &layer.padding),
        (property::BORDER_THICKNESS, &layer.border_thickness),
        (property::BORDER_RADIUS, &layer.border_radius),
    ];
    for (prop, raw) in sizes {
        let Some(raw) = raw else {
            continue;
        };
        match size_value(ctx, raw).or_else(|| default_size(ctx.tokens)) {
            Some(size) => {
                vars.insert(name(prop), size);
            }
            None => debug!(layer = %layer.key, property = prop, "Size did not resolve"),
        }
    }

    let text_color = layer
        .text
        .color
        .as_ref()
        .and_then(|raw| color_value(ctx, raw))
        .or_else(|| {
            let (palette, level) = surface_palette.as_ref()?;
            derived_on_tone(ctx, palette, level, palette_vars)
        })
        .unwrap_or_else(|| var_ref(&core_var(mode, "black")));
    vars.insert(name(property::TEXT_COLOR), text_color);

    let emphasis = [
        (property::TEXT_HIGH_EMPHASIS, &layer.text.high_emphasis, "text-emphasis-high"),
        (property::TEXT_LOW_EMPHASIS, &layer.text.low_emphasis, "text-emphasis-low"),
    ];
    for (prop, raw, theme_default) in emphasis {
        let value = match raw {
            Some(raw) => opacity_value(ctx, Some(raw)),
            None => var_ref(&theme_var(mode, theme_default)),
        };
        vars.insert(name(prop), value);
    }

    // Role colors stay bound to core; readability is fixed up after the build
    for (prop, role) in [
        (property::TEXT_ALERT, "alert"),
        (property::TEXT_WARNING, "warning"),
        (property::TEXT_SUCCESS, "success"),
    ] {
        vars.insert(name(prop), var_ref(&core_var(mode, role)));
    }

    let interactive = [
        (
            property::INTERACTIVE_TONE,
            &layer.interactive.tone,
            InteractiveState::Default,
            ToneRole::Tone,
        ),
        (
            property::INTERACTIVE_TONE_HOVER,
            &layer.interactive.tone_hover,
            InteractiveState::Hover,
            ToneRole::Tone,
        ),
        (
            property::INTERACTIVE_ON_TONE,
            &layer.interactive.on_tone,
            InteractiveState::Default,
            ToneRole::OnTone,
        ),
        (
            property::INTERACTIVE_ON_TONE_HOVER,
            &layer.interactive.on_tone_hover,
            InteractiveState::Hover,
            ToneRole::OnTone,
        ),
    ];
    for (prop, raw, state, role) in interactive {
        let value = raw
            .as_ref()
            .and_then(|raw| color_value(ctx, raw))
            .unwrap_or_else(|| var_ref(&interactive_var(mode, state, role)));
        vars.insert(name(prop), value);
    }
}

/// On-tone of the surface's palette level, if this build or the live surface has it
fn derived_on_tone(
    ctx: &BuildContext<'_>,
    palette: &str,
    level: &str,
    palette_vars: Option<&CssVarMap>,
) -> Option<String> {
    let on_tone = palette_var(ctx.mode, palette, level, ToneRole::OnTone);
    let in_build = palette_vars.is_some_and(|vars| vars.contains_key(&on_tone));
    let on_surface = || {
        ctx.surface()
            .and_then(|surface| surface.get(&on_tone))
            .is_some()
    };
    (in_build || on_surface()).then(|| var_ref(&on_tone))
}

fn missing_ref(ctx: &BuildContext<'_>, layer: &LayerSpec, value: String) -> MissingPaletteRef {
    MissingPaletteRef {
        mode: ctx.mode,
        layer: layer.key.clone(),
        property: property::SURFACE.to_string(),
        value,
    }
}

/// Emit the pre-`themes` spelling of every layer variable that is still free
fn add_legacy_aliases(vars: &mut CssVarMap) {
    let aliases: Vec<(String, String)> = vars
        .keys()
        .filter_map(|name| legacy_layer_alias(name).map(|alias| (alias, var_ref(name))))
        .collect();
    for (alias, value) in aliases {
        vars.entry(alias).or_insert(value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builders::palette;
    use crate::css::{CssVarSurface, StyleSurface};
    use crate::schema::ThemeSource;
    use crate::token_index::TokenIndex;
    use recursica_events::RecordingBus;
    use recursica_types::ThemeMode;
    use serde_json::json;

    const L0: &str = "--recursica-brand-themes-light-layer-layer-0-property";

    fn tokens() -> TokenIndex {
        TokenIndex::build(&json!({
            "color": {
                "gray": { "050": "#fafafa", "500": "#808080", "900": "#111111" },
                "blue": { "500": "#0055ff" }
            },
            "size": { "sm": 8, "md": 16, "lg": 24 }
        }))
    }

    fn theme(layers: Value) -> ThemeSource {
        ThemeSource::from_value(json!({
            "brand": { "themes": { "light": {
                "palettes": {
                    "neutral": {
                        "050": { "color": { "tone": "{tokens.color.gray.050}", "on-tone": "black" } },
                        "900": { "color": { "tone": "{tokens.color.gray.900}", "on-tone": "white" } }
                    }
                },
                "layers": layers
            } } }
        }))
    }

    fn build_with_palette(tokens: &TokenIndex, theme: &ThemeSource) -> CssVarMap {
        let ctx = BuildContext::new(tokens, theme, ThemeMode::Light);
        let palette_vars = palette::build(&ctx);
        build(&ctx, None, Some(&palette_vars))
    }

    #[test]
    fn test_palette_surface_and_derived_text_color() {
        let tokens = tokens();
        let theme = theme(json!({
            "layer-0": { "properties": { "surface": "{brand.themes.light.palettes.neutral.050}" } }
        }));
        let vars = build_with_palette(&tokens, &theme);

        assert_eq!(
            vars[&format!("{L0}-surface")],
            "var(--recursica-brand-themes-light-palettes-neutral-050-tone)"
        );
        assert_eq!(
            vars[&format!("{L0}-element-text-color")],
            "var(--recursica-brand-themes-light-palettes-neutral-050-on-tone)"
        );
    }

    #[test]
    fn test_text_color_falls_back_to_core_black_without_on_tone() {
        let tokens = tokens();
        let theme = theme(json!({
            "layer-0": { "properties": { "surface": "{brand.palettes.neutral.050}" } }
        }));
        let ctx = BuildContext::new(&tokens, &theme, ThemeMode::Light);
        let vars = build(&ctx, None, None);

        assert_eq!(
            vars[&format!("{L0}-element-text-color")],
            "var(--recursica-brand-themes-light-palettes-core-black)"
        );
    }

    #[test]
    fn test_text_color_reads_live_surface() {
        let tokens = tokens();
        let theme = theme(json!({
            "layer-0": { "properties": { "surface": "{brand.palettes.neutral.900}" } }
        }));
        let mut surface = StyleSurface::new();
        surface.set(
            "--recursica-brand-themes-light-palettes-neutral-900-on-tone",
            "var(--recursica-brand-themes-light-palettes-core-white)",
        );
        let ctx = BuildContext::new(&tokens, &theme, ThemeMode::Light).with_surface(&surface);
        let vars = build(&ctx, None, None);

        assert_eq!(
            vars[&format!("{L0}-element-text-color")],
            "var(--recursica-brand-themes-light-palettes-neutral-900-on-tone)"
        );
    }

    #[test]
    fn test_hex_surface_matching_a_tone_becomes_palette_var() {
        let tokens = tokens();
        let theme = theme(json!({ "layer-0": { "properties": { "surface": "#111111" } } }));
        let bus = RecordingBus::new();
        let ctx = BuildContext::new(&tokens, &theme, ThemeMode::Light).with_events(&bus);
        let vars = build(&ctx, None, None);

        assert_eq!(
            vars[&format!("{L0}-surface")],
            "var(--recursica-brand-themes-light-palettes-neutral-900-tone)"
        );
        assert!(bus.events().is_empty());
    }

    #[test]
    fn test_unmatched_hex_surface_is_reported() {
        let tokens = tokens();
        let theme = theme(json!({
            "layer-1": { "properties": { "surface": "#123456" } },
            "layer-2": { "properties": { "surface": "{tokens.color.gray.500}" } }
        }));
        let bus = RecordingBus::new();
        let ctx = BuildContext::new(&tokens, &theme, ThemeMode::Light).with_events(&bus);
        let vars = build(&ctx, None, None);

        assert_eq!(
            vars["--recursica-brand-themes-light-layer-layer-1-property-surface"],
            "#123456"
        );
        assert_eq!(
            vars["--recursica-brand-themes-light-layer-layer-2-property-surface"],
            "var(--recursica-tokens-color-gray-500)"
        );
        assert_eq!(
            bus.take(),
            vec![ThemeEvent::MissingLayerPaletteRefs {
                refs: vec![MissingPaletteRef {
                    mode: ThemeMode::Light,
                    layer: "layer-1".into(),
                    property: "surface".into(),
                    value: "#123456".into(),
                }]
            }]
        );
    }

    #[test]
    fn test_sizes_snap_to_nearest_token() {
        let tokens = tokens();
        let theme = theme(json!({
            "layer-0": { "properties": {
                "padding": 15,
                "border-radius": "{tokens.size.sm}",
                "border-thickness": "{tokens.size.missing}"
            } }
        }));
        let vars = build_with_palette(&tokens, &theme);

        assert_eq!(vars[&format!("{L0}-padding")], "var(--recursica-tokens-size-md)");
        assert_eq!(vars[&format!("{L0}-border-radius")], "var(--recursica-tokens-size-sm)");
        assert_eq!(
            vars[&format!("{L0}-border-thickness")],
            "var(--recursica-tokens-size-md)"
        );
    }

    #[test]
    fn test_unit_lengths_are_kept() {
        let tokens = tokens();
        let theme = theme(json!({
            "layer-0": { "properties": { "padding": "2rem", "border-radius": "50%" } }
        }));
        let vars = build_with_palette(&tokens, &theme);

        assert_eq!(vars[&format!("{L0}-padding")], "2rem");
        assert_eq!(vars[&format!("{L0}-border-radius")], "50%");
    }

    #[test]
    fn test_surface_naming_an_undefined_level_is_reported() {
        let tokens = tokens();
        let theme = theme(json!({
            "layer-0": { "properties": { "surface": "{brand.palettes.neutral.700}" } }
        }));
        let bus = RecordingBus::new();
        let ctx = BuildContext::new(&tokens, &theme, ThemeMode::Light).with_events(&bus);
        let vars = build(&ctx, None, None);

        assert!(!vars.contains_key(&format!("{L0}-surface")));
        assert_eq!(
            vars[&format!("{L0}-element-text-color")],
            "var(--recursica-brand-themes-light-palettes-core-black)"
        );
        assert!(matches!(
            bus.take().as_slice(),
            [ThemeEvent::MissingLayerPaletteRefs { refs }] if refs[0].value == "{brand.palettes.neutral.700}"
        ));
    }

    #[test]
    fn test_role_and_interactive_defaults() {
        let tokens = tokens();
        let theme = theme(json!({
            "layer-0": { "properties": {
                "element": {
                    "text": { "alert": "#ff0000" },
                    "interactive": { "color": "{tokens.color.blue.500}" }
                }
            } }
        }));
        let vars = build_with_palette(&tokens, &theme);
        let core = "--recursica-brand-themes-light-palettes-core";

        assert_eq!(vars[&format!("{L0}-element-text-alert")], format!("var({core}-alert)"));
        assert_eq!(vars[&format!("{L0}-element-text-success")], format!("var({core}-success)"));
        assert_eq!(
            vars[&format!("{L0}-element-interactive-tone")],
            "var(--recursica-tokens-color-blue-500)"
        );
        assert_eq!(
            vars[&format!("{L0}-element-interactive-tone-hover")],
            format!("var({core}-interactive-hover-tone)")
        );
        assert_eq!(
            vars[&format!("{L0}-element-interactive-on-tone")],
            format!("var({core}-interactive-default-on-tone)")
        );
        assert_eq!(
            vars[&format!("{L0}-element-text-high-emphasis")],
            "var(--recursica-brand-themes-light-text-emphasis-high)"
        );
    }

    #[test]
    fn test_legacy_aliases_never_overwrite() {
        let tokens = tokens();
        let theme = theme(json!({ "layer-0": { "properties": { "padding": 8 } } }));
        let mut vars = build_with_palette(&tokens, &theme);

        let legacy = "--recursica-brand-light-layer-layer-0-property-padding";
        assert_eq!(vars[legacy], format!("var({L0}-padding)"));

        vars.insert(legacy.into(), "custom".into());
        add_legacy_aliases(&mut vars);
        assert_eq!(vars[legacy], "custom");
    }

    #[test]
    fn test_overrides_change_token_matching() {
        let tokens = tokens();
        let theme = theme(json!({ "layer-0": { "properties": { "padding": 20 } } }));
        let ctx = BuildContext::new(&tokens, &theme, ThemeMode::Light);

        let mut overrides = TokenOverrides::new();
        overrides.insert("size/lg".into(), json!(20));
        let vars = build(&ctx, Some(&overrides), None);
        assert_eq!(vars[&format!("{L0}-padding")], "var(--recursica-tokens-size-lg)");
    }

    #[test]
    fn test_alternative_layers() {
        let tokens = tokens();
        let theme = theme(json!({
            "layer-alternative-floating": { "properties": { "surface": "{brand.palettes.neutral.900}" } }
        }));
        let vars = build_with_palette(&tokens, &theme);
        assert_eq!(
            vars["--recursica-brand-themes-light-layer-layer-alternative-floating-property-surface"],
            "var(--recursica-brand-themes-light-palettes-neutral-900-tone)"
        );
    }

    #[test]
    fn test_missing_surface_logs_warning() {
        use tracing_mock::{expect, subscriber};

        let tokens = tokens();
        let theme = theme(json!({ "layer-0": { "properties": { "surface": "#abcdef" } } }));
        let ctx = BuildContext::new(&tokens, &theme, ThemeMode::Light);

        let (subscriber, handle) = subscriber::mock()
            .with_filter(|meta| meta.is_event() && *meta.level() == tracing::Level::WARN)
            .event(
                expect::event()
                    .at_level(tracing::Level::WARN)
                    .with_fields(
                        expect::field("count")
                            .with_value(&1u64)
                            .and(expect::msg("Layer surfaces are not palette references")),
                    ),
            )
            .only()
            .run_with_handle();

        tracing::subscriber::with_default(subscriber, || {
            build(&ctx, None, None);
        });

        handle.assert_finished();
    }
}
