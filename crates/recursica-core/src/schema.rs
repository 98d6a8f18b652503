// ABOUTME: Normalizes legacy and current brand theme shapes into one internal representation
// ABOUTME: Builders read ThemeSource; brace lookups into the raw tree go through ThemeView

use recursica_types::ThemeMode;
use serde_json::{Map, Value};
use std::collections::BTreeMap;

use crate::levels::canonical_level;
use crate::reference::{RefKind, Reference};
use crate::resolver::ThemeAccessor;

/// Highest numbered layer a theme may define
pub const MAX_LAYER_INDEX: u8 = 4;

/// Key spellings that name the same node across schema generations
const KEY_ALIASES: [(&str, &str); 6] = [
    ("layers", "layer"),
    ("core-colors", "core"),
    ("properties", "property"),
    ("elements", "element"),
    ("palettes", "palette"),
    ("on-tone", "onTone"),
];

/// Brand theme after unwrapping `brand`/`themes` and normalizing key spellings
#[derive(Debug, Clone, Default)]
pub struct ThemeSource {
    brand_root: Value,
    themes_root: Value,
    mode_nodes: BTreeMap<ThemeMode, Value>,
    modes: BTreeMap<ThemeMode, ModeTheme>,
    dimensions: Option<Value>,
    typography: BTreeMap<String, TypeStyleSpec>,
}

impl ThemeSource {
    pub fn from_value(value: Value) -> Self {
        let brand_root = match value.get("brand") {
            Some(inner) if inner.is_object() => inner.clone(),
            _ => value,
        };
        let themes_root = match brand_root.get("themes") {
            Some(inner) if inner.is_object() => inner.clone(),
            _ => brand_root.clone(),
        };

        let mut mode_nodes = BTreeMap::new();
        let mut modes = BTreeMap::new();
        if let Some(themes) = themes_root.as_object() {
            for (key, node) in themes {
                if let Some(mode) = ThemeMode::from_segment(key) {
                    modes.insert(mode, ModeTheme::from_value(node));
                    mode_nodes.insert(mode, node.clone());
                }
            }
        }

        let light = mode_nodes.get(&ThemeMode::Light);
        let dimensions = [Some(&brand_root), Some(&themes_root), light]
            .into_iter()
            .flatten()
            .find_map(|root| root.get("dimensions").filter(|d| d.is_object()))
            .cloned();

        let typography = [Some(&brand_root), Some(&themes_root), light]
            .into_iter()
            .flatten()
            .find_map(|root| root.get("typography").and_then(Value::as_object))
            .map(parse_typography)
            .unwrap_or_default();

        Self {
            brand_root,
            themes_root,
            mode_nodes,
            modes,
            dimensions,
            typography,
        }
    }

    pub fn mode(&self, mode: ThemeMode) -> Option<&ModeTheme> {
        self.modes.get(&mode)
    }

    /// Palette keys declared by the light theme, excluding core colors
    pub fn palette_keys(&self) -> Vec<&str> {
        let source = self
            .modes
            .get(&ThemeMode::Light)
            .filter(|light| !light.palettes.is_empty())
            .or_else(|| self.modes.values().find(|m| !m.palettes.is_empty()));
        source
            .map(|mode| mode.palettes.keys().map(String::as_str).collect())
            .unwrap_or_default()
    }

    pub fn palette(&self, mode: ThemeMode, key: &str) -> Option<&Palette> {
        self.modes
            .get(&mode)
            .and_then(|m| m.palettes.get(key))
            .or_else(|| {
                self.modes
                    .get(&ThemeMode::Light)
                    .and_then(|m| m.palettes.get(key))
            })
    }

    pub fn layers(&self, mode: ThemeMode) -> &[LayerSpec] {
        match self.modes.get(&mode) {
            Some(theme) if !theme.layers.is_empty() => &theme.layers,
            _ => self
                .modes
                .get(&ThemeMode::Light)
                .map(|light| light.layers.as_slice())
                .unwrap_or_default(),
        }
    }

    pub fn dimensions(&self) -> Option<&Value> {
        self.dimensions.as_ref()
    }

    pub fn typography(&self) -> &BTreeMap<String, TypeStyleSpec> {
        &self.typography
    }

    pub fn mode_node(&self, mode: ThemeMode) -> Option<&Value> {
        self.mode_nodes.get(&mode)
    }

    pub fn view(&self, mode: ThemeMode) -> ThemeView<'_> {
        ThemeView { source: self, mode }
    }
}

/// One mode's normalized subtree
#[derive(Debug, Clone, Default)]
pub struct ModeTheme {
    pub palettes: BTreeMap<String, Palette>,
    pub core: CoreColors,
    pub layers: Vec<LayerSpec>,
    pub text_emphasis: TextEmphasis,
    pub states: States,
}

impl ModeTheme {
    fn from_value(node: &Value) -> Self {
        let mut theme = ModeTheme::default();

        if let Some(palettes) = child(node, &["palettes", "palette"]).and_then(Value::as_object) {
            for (key, palette) in palettes {
                if key == "core" || key == "core-colors" {
                    theme.core = CoreColors::from_value(palette);
                } else if !key.starts_with('$') {
                    theme.palettes.insert(key.clone(), Palette::from_value(palette));
                }
            }
        }
        if let Some(core) = child(node, &["core-colors", "core"]) {
            theme.core = CoreColors::from_value(core);
        }

        if let Some(layers) = child(node, &["layers", "layer"]).and_then(Value::as_object) {
            theme.layers = parse_layers(layers);
        }

        if let Some(emphasis) = child(node, &["text-emphasis", "textEmphasis"]) {
            theme.text_emphasis = TextEmphasis {
                high: child(emphasis, &["high"]).cloned(),
                low: child(emphasis, &["low"]).cloned(),
            };
        }

        if let Some(states) = child(node, &["states", "state"]) {
            let overlay = child(states, &["overlay"]);
            theme.states = States {
                disabled: child(states, &["disabled"]).cloned(),
                hover: child(states, &["hover"]).cloned(),
                overlay_opacity: overlay
                    .and_then(|o| child(o, &["opacity"]))
                    .or_else(|| child(states, &["overlay-opacity"]))
                    .cloned(),
                overlay_color: overlay
                    .and_then(|o| child(o, &["color"]))
                    .or_else(|| child(states, &["overlay-color"]))
                    .cloned(),
            };
        }

        theme
    }
}

#[derive(Debug, Clone, Default)]
pub struct Palette {
    /// Canonical level (`050`, `500`, ...) -> entry
    pub levels: BTreeMap<String, PaletteLevel>,
    /// Raw `default` entry: a level name, a same-palette reference, or a level object
    pub default: Option<Value>,
}

impl Palette {
    fn from_value(node: &Value) -> Self {
        let mut palette = Palette::default();
        let Some(entries) = node.as_object() else {
            return palette;
        };
        for (key, entry) in entries {
            if key == "default" {
                palette.default = Some(entry.clone());
            } else if let Some(level) = canonical_level(key) {
                palette
                    .levels
                    .insert(level.to_string(), PaletteLevel::from_value(entry));
            }
        }
        palette
    }

    pub fn level(&self, level: &str) -> Option<&PaletteLevel> {
        self.levels.get(level)
    }
}

/// A tone and its foreground pairing; either may be absent
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PaletteLevel {
    pub tone: Option<Value>,
    pub on_tone: Option<Value>,
}

impl PaletteLevel {
    fn from_value(node: &Value) -> Self {
        if !node.is_object() {
            return PaletteLevel {
                tone: (!node.is_null()).then(|| node.clone()),
                on_tone: None,
            };
        }

        let inner = child(node, &["color"])
            .filter(|color| color.is_object())
            .unwrap_or(node);
        let tone = child(inner, &["tone"]).cloned();
        let on_tone = child(inner, &["on-tone", "onTone", "on_tone"]).cloned();

        if tone.is_none() && on_tone.is_none() && node.get("$value").is_some() {
            return PaletteLevel {
                tone: Some(node.clone()),
                on_tone: None,
            };
        }
        PaletteLevel { tone, on_tone }
    }
}

pub const CORE_COLOR_NAMES: [&str; 5] = ["black", "white", "alert", "warning", "success"];

#[derive(Debug, Clone, Default)]
pub struct CoreColors {
    pub entries: BTreeMap<String, PaletteLevel>,
    pub interactive_default: PaletteLevel,
    pub interactive_hover: PaletteLevel,
}

impl CoreColors {
    fn from_value(node: &Value) -> Self {
        let mut core = CoreColors::default();
        let Some(entries) = node.as_object() else {
            return core;
        };

        for (key, entry) in entries {
            if key == "interactive" {
                core.parse_interactive(entry);
            } else if !key.starts_with('$') {
                core.entries
                    .insert(key.clone(), PaletteLevel::from_value(entry));
            }
        }
        core
    }

    fn parse_interactive(&mut self, node: &Value) {
        if let Some(default) = child(node, &["default"]) {
            self.interactive_default = PaletteLevel::from_value(default);
            if let Some(hover) = child(node, &["hover"]) {
                self.interactive_hover = PaletteLevel::from_value(hover);
            }
            return;
        }

        if !node.is_object() {
            self.interactive_default = PaletteLevel::from_value(node);
            return;
        }

        // Flat legacy shape: tone/on-tone plus -hover variants
        self.interactive_default = PaletteLevel {
            tone: child(node, &["tone", "color"]).cloned(),
            on_tone: child(node, &["on-tone", "on-color"]).cloned(),
        };
        self.interactive_hover = PaletteLevel {
            tone: child(node, &["tone-hover", "hover-color", "hover"]).cloned(),
            on_tone: child(node, &["on-tone-hover", "on-hover-color"]).cloned(),
        };
    }

    pub fn entry(&self, name: &str) -> Option<&PaletteLevel> {
        self.entries.get(name)
    }
}

#[derive(Debug, Clone, Default)]
pub struct TextEmphasis {
    pub high: Option<Value>,
    pub low: Option<Value>,
}

#[derive(Debug, Clone, Default)]
pub struct States {
    pub disabled: Option<Value>,
    pub hover: Option<Value>,
    pub overlay_opacity: Option<Value>,
    pub overlay_color: Option<Value>,
}

/// One numbered or alternative layer
#[derive(Debug, Clone, Default)]
pub struct LayerSpec {
    /// `layer-0` .. `layer-4` or `layer-alternative-<name>`
    pub key: String,
    pub index: Option<u8>,
    pub surface: Option<Value>,
    pub border_color: Option<Value>,
    pub border_thickness: Option<Value>,
    pub border_radius: Option<Value>,
    pub padding: Option<Value>,
    pub text: LayerText,
    pub interactive: LayerInteractive,
}

#[derive(Debug, Clone, Default)]
pub struct LayerText {
    pub color: Option<Value>,
    pub high_emphasis: Option<Value>,
    pub low_emphasis: Option<Value>,
}

/// Interactive colors; legacy `color`/`hover-color`/`on-color`/`on-hover-color`
/// names are folded into the current ones during parsing
#[derive(Debug, Clone, Default)]
pub struct LayerInteractive {
    pub tone: Option<Value>,
    pub tone_hover: Option<Value>,
    pub on_tone: Option<Value>,
    pub on_tone_hover: Option<Value>,
}

impl LayerSpec {
    fn from_value(key: String, index: Option<u8>, node: &Value) -> Self {
        let props = child(node, &["properties", "property"]).unwrap_or(node);
        let element = child(props, &["elements", "element"])
            .or_else(|| child(node, &["elements", "element"]));

        let text_node = element.and_then(|e| child(e, &["text"]));
        let text_field = |keys: &[&str], flat: &[&str]| {
            text_node
                .and_then(|t| child(t, keys))
                .or_else(|| element.and_then(|e| child(e, flat)))
                .cloned()
        };
        let text = LayerText {
            color: text_field(&["color"], &["text-color"]),
            high_emphasis: text_field(&["high-emphasis"], &["text-high-emphasis"]),
            low_emphasis: text_field(&["low-emphasis"], &["text-low-emphasis"]),
        };

        let interactive_node = element.and_then(|e| child(e, &["interactive"]));
        let interactive_field =
            |keys: &[&str]| interactive_node.and_then(|i| child(i, keys)).cloned();
        let interactive = LayerInteractive {
            tone: interactive_field(&["tone", "color"]),
            tone_hover: interactive_field(&["tone-hover", "hover-color"]),
            on_tone: interactive_field(&["on-tone", "on-color"]),
            on_tone_hover: interactive_field(&["on-tone-hover", "on-hover-color"]),
        };

        LayerSpec {
            key,
            index,
            surface: child(props, &["surface"]).cloned(),
            border_color: child(props, &["border-color", "borderColor"]).cloned(),
            border_thickness: child(props, &["border-thickness", "border-size", "borderThickness"])
                .cloned(),
            border_radius: child(props, &["border-radius", "borderRadius"]).cloned(),
            padding: child(props, &["padding"]).cloned(),
            text,
            interactive,
        }
    }
}

/// `layer-2` or `2` -> 2, when within the numbered range
pub fn layer_number(key: &str) -> Option<u8> {
    let digits = key.strip_prefix("layer-").unwrap_or(key);
    let index: u8 = digits.parse().ok()?;
    (index <= MAX_LAYER_INDEX).then_some(index)
}

/// Emitted key for a raw layer key, e.g. `0` -> `layer-0`
pub fn layer_key(raw: &str) -> String {
    match layer_number(raw) {
        Some(index) => format!("layer-{index}"),
        None => match alternative_name(raw) {
            Some(name) => format!("layer-alternative-{name}"),
            None => raw.to_string(),
        },
    }
}

fn alternative_name(key: &str) -> Option<&str> {
    key.strip_prefix("layer-alternative-")
        .or_else(|| key.strip_prefix("alternative-"))
        .filter(|name| !name.is_empty())
}

fn parse_layers(layers: &Map<String, Value>) -> Vec<LayerSpec> {
    let mut numbered = Vec::new();
    let mut alternatives = BTreeMap::new();

    for (key, node) in layers {
        if let Some(index) = layer_number(key) {
            numbered.push(LayerSpec::from_value(format!("layer-{index}"), Some(index), node));
        } else if key == "alternative" || key == "layer-alternative" {
            if let Some(named) = node.as_object() {
                for (name, alt) in named {
                    alternatives.insert(name.clone(), alt);
                }
            }
        } else if let Some(name) = alternative_name(key) {
            alternatives.insert(name.to_string(), node);
        }
    }

    numbered.sort_by_key(|layer| layer.index);
    numbered.extend(alternatives.into_iter().map(|(name, node)| {
        LayerSpec::from_value(format!("layer-alternative-{name}"), None, node)
    }));
    numbered
}

/// A text-style slot as the brand theme writes it
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TypeStyleSpec {
    pub family: Option<Value>,
    pub size: Option<Value>,
    pub weight: Option<Value>,
    pub letter_spacing: Option<Value>,
    pub line_height: Option<Value>,
    pub style: Option<Value>,
    pub transform: Option<Value>,
    pub decoration: Option<Value>,
}

impl TypeStyleSpec {
    fn from_value(node: &Value) -> Self {
        let inner = node
            .get("$value")
            .filter(|value| value.is_object())
            .unwrap_or(node);
        let field = |keys: &[&str]| child(inner, keys).cloned();
        TypeStyleSpec {
            family: field(&["font-family", "fontFamily", "family"]),
            size: field(&["font-size", "fontSize", "size"]),
            weight: field(&["font-weight", "fontWeight", "weight"]),
            letter_spacing: field(&["letter-spacing", "letterSpacing"]),
            line_height: field(&["line-height", "lineHeight"]),
            style: field(&["font-style", "fontStyle", "style"]),
            transform: field(&["text-transform", "textTransform", "text-case", "textCase", "case"]),
            decoration: field(&["text-decoration", "textDecoration", "decoration"]),
        }
    }

    /// Field by typography property name (`font-family`, `letter-spacing`, ...)
    pub fn field(&self, property: &str) -> Option<&Value> {
        match property {
            "font-family" => self.family.as_ref(),
            "font-size" => self.size.as_ref(),
            "font-weight" => self.weight.as_ref(),
            "letter-spacing" => self.letter_spacing.as_ref(),
            "line-height" => self.line_height.as_ref(),
            "font-style" => self.style.as_ref(),
            "text-transform" => self.transform.as_ref(),
            "text-decoration" => self.decoration.as_ref(),
            _ => None,
        }
    }
}

fn parse_typography(slots: &Map<String, Value>) -> BTreeMap<String, TypeStyleSpec> {
    slots
        .iter()
        .filter(|(slot, node)| !slot.starts_with('$') && node.is_object())
        .map(|(slot, node)| (slot.clone(), TypeStyleSpec::from_value(node)))
        .collect()
}

/// First of `keys` present on `node`
fn child<'v>(node: &'v Value, keys: &[&str]) -> Option<&'v Value> {
    let map = node.as_object()?;
    keys.iter().find_map(|key| map.get(*key))
}

/// Theme accessor over one mode of a [`ThemeSource`].
///
/// Brand references are looked up in the referenced mode, then light, then the
/// `themes` and `brand` roots, tolerating old and new key spellings.
#[derive(Debug, Clone, Copy)]
pub struct ThemeView<'a> {
    source: &'a ThemeSource,
    mode: ThemeMode,
}

impl<'a> ThemeView<'a> {
    pub fn new(source: &'a ThemeSource, mode: ThemeMode) -> Self {
        Self { source, mode }
    }

    pub fn mode(&self) -> ThemeMode {
        self.mode
    }

    pub fn find(&self, reference: &Reference) -> Option<&'a Value> {
        if reference.kind != RefKind::Brand {
            return None;
        }
        let mode = reference.mode.unwrap_or(self.mode);
        let roots = [
            self.source.mode_node(mode),
            self.source.mode_node(ThemeMode::Light),
            Some(&self.source.themes_root),
            Some(&self.source.brand_root),
        ];
        roots
            .into_iter()
            .flatten()
            .find_map(|root| follow_path(root, &reference.path))
            .map(terminal)
    }
}

impl ThemeAccessor for ThemeView<'_> {
    fn lookup(&self, reference: &Reference) -> Option<Value> {
        self.find(reference).cloned()
    }
}

fn follow_path<'v>(root: &'v Value, path: &[String]) -> Option<&'v Value> {
    let mut node = root;
    for segment in path {
        node = step(node, segment)?;
    }
    Some(node)
}

fn step<'v>(node: &'v Value, segment: &str) -> Option<&'v Value> {
    let map = node.as_object()?;
    if let Some(found) = map.get(segment) {
        return Some(found);
    }

    for (a, b) in KEY_ALIASES {
        let twin = if segment == a {
            b
        } else if segment == b {
            a
        } else {
            continue;
        };
        if let Some(found) = map.get(twin) {
            return Some(found);
        }
    }

    if let Some(found) = canonical_level(segment).and_then(|level| map.get(level)) {
        return Some(found);
    }
    if let Some(index) = layer_number(segment) {
        for key in [format!("layer-{index}"), index.to_string()] {
            if let Some(found) = map.get(&key) {
                return Some(found);
            }
        }
    }

    // Palette levels nest their tones under `color`; typography nests under `$value`
    ["color", "$value"]
        .into_iter()
        .filter_map(|wrapper| map.get(wrapper).filter(|inner| inner.is_object()))
        .find_map(|inner| step(inner, segment))
}

/// A reference to a palette level or core color means its tone
fn terminal(node: &Value) -> &Value {
    let Some(map) = node.as_object() else {
        return node;
    };
    if map.contains_key("$value") || map.contains_key("value") {
        return node;
    }
    if let Some(tone) = map.get("tone") {
        return tone;
    }
    match map.get("color").and_then(|color| color.get("tone")) {
        Some(tone) => tone,
        None => node,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reference::parse_reference;
    use serde_json::json;

    fn brand() -> Value {
        json!({
            "brand": {
                "themes": {
                    "light": {
                        "palettes": {
                            "core-colors": {
                                "black": "#000000",
                                "white": { "tone": "#ffffff", "on-tone": "{brand.palettes.core-colors.black}" },
                                "interactive": {
                                    "default": { "tone": "{tokens.color.blue.500}", "on-tone": "#ffffff" },
                                    "hover": { "tone": "{tokens.color.blue.600}" }
                                }
                            },
                            "neutral": {
                                "050": { "color": { "tone": { "$value": "{tokens.color.gray.050}" } } },
                                "500": { "color": { "tone": "{tokens.color.gray.500}", "on-tone": "white" } },
                                "default": { "$value": "{brand.themes.light.palettes.neutral.500}" }
                            }
                        },
                        "layers": {
                            "layer-0": {
                                "properties": {
                                    "surface": "{brand.palettes.neutral.050}",
                                    "padding": 12,
                                    "element": {
                                        "text": { "color": "{brand.palettes.neutral.500}" },
                                        "interactive": { "color": "#0000ff", "hover-color": "#0000aa" }
                                    }
                                }
                            },
                            "1": { "property": { "surface": "#ffffff" } },
                            "alternative": { "floating": { "properties": { "surface": "#eeeeee" } } }
                        },
                        "text-emphasis": { "high": 1, "low": "{tokens.opacity.smoky}" },
                        "states": { "disabled": 0.5, "overlay": { "opacity": 0.4, "color": "#000000" } }
                    },
                    "dark": {
                        "palettes": {
                            "neutral": { "500": { "tone": "{tokens.color.gray.900}" } }
                        }
                    }
                },
                "dimensions": { "sm": { "$value": "{tokens.size.sm}" } },
                "typography": {
                    "h1": { "$type": "typography", "$value": { "fontFamily": "{tokens.font.typefaces.primary}", "fontSize": 32 } },
                    "body-1": { "font-weight": "{tokens.font.weights.regular}" }
                }
            }
        })
    }

    #[test]
    fn test_unwraps_brand_and_themes() {
        let source = ThemeSource::from_value(brand());
        assert!(source.mode(ThemeMode::Light).is_some());
        assert!(source.mode(ThemeMode::Dark).is_some());
        assert_eq!(source.palette_keys(), vec!["neutral"]);
        assert!(source.dimensions().is_some());
    }

    #[test]
    fn test_unwrapped_theme_is_accepted() {
        let source = ThemeSource::from_value(json!({
            "light": { "palettes": { "accent": { "500": { "tone": "#ff0000" } } } }
        }));
        assert_eq!(source.palette_keys(), vec!["accent"]);
    }

    #[test]
    fn test_palette_level_shapes() {
        let source = ThemeSource::from_value(brand());
        let neutral = source.palette(ThemeMode::Light, "neutral").unwrap();
        let level = neutral.level("500").unwrap();
        assert_eq!(level.tone, Some(json!("{tokens.color.gray.500}")));
        assert_eq!(level.on_tone, Some(json!("white")));
        assert!(neutral.default.is_some());

        let light_only = neutral.level("050").unwrap();
        assert_eq!(light_only.tone, Some(json!({ "$value": "{tokens.color.gray.050}" })));
        assert_eq!(light_only.on_tone, None);
    }

    #[test]
    fn test_dark_palette_falls_back_per_key() {
        let source = ThemeSource::from_value(brand());
        let dark = source.palette(ThemeMode::Dark, "neutral").unwrap();
        assert_eq!(
            dark.level("500").unwrap().tone,
            Some(json!("{tokens.color.gray.900}"))
        );
    }

    #[test]
    fn test_core_colors_and_interactive() {
        let source = ThemeSource::from_value(brand());
        let core = &source.mode(ThemeMode::Light).unwrap().core;
        assert_eq!(core.entry("black").unwrap().tone, Some(json!("#000000")));
        assert_eq!(
            core.interactive_hover.tone,
            Some(json!("{tokens.color.blue.600}"))
        );
        assert_eq!(core.interactive_default.on_tone, Some(json!("#ffffff")));
    }

    #[test]
    fn test_layers_are_ordered_and_legacy_names_fold() {
        let source = ThemeSource::from_value(brand());
        let layers = source.layers(ThemeMode::Light);
        let keys: Vec<_> = layers.iter().map(|l| l.key.as_str()).collect();
        assert_eq!(keys, vec!["layer-0", "layer-1", "layer-alternative-floating"]);

        let first = &layers[0];
        assert_eq!(first.padding, Some(json!(12)));
        assert_eq!(first.interactive.tone, Some(json!("#0000ff")));
        assert_eq!(first.interactive.tone_hover, Some(json!("#0000aa")));
        assert_eq!(layers[1].surface, Some(json!("#ffffff")));

        // Dark declares no layers, so it reuses light's
        assert_eq!(source.layers(ThemeMode::Dark).len(), 3);
    }

    #[test]
    fn test_typography_shapes() {
        let source = ThemeSource::from_value(brand());
        let h1 = &source.typography()["h1"];
        assert_eq!(h1.family, Some(json!("{tokens.font.typefaces.primary}")));
        assert_eq!(h1.field("font-size"), Some(&json!(32)));
        let body = &source.typography()["body-1"];
        assert_eq!(body.weight, Some(json!("{tokens.font.weights.regular}")));
    }

    #[test]
    fn test_states_and_emphasis() {
        let source = ThemeSource::from_value(brand());
        let light = source.mode(ThemeMode::Light).unwrap();
        assert_eq!(light.text_emphasis.high, Some(json!(1)));
        assert_eq!(light.states.overlay_opacity, Some(json!(0.4)));
        assert_eq!(light.states.overlay_color, Some(json!("#000000")));
        assert_eq!(light.states.hover, None);
    }

    #[test]
    fn test_view_follows_nested_color_and_aliases() {
        let source = ThemeSource::from_value(brand());
        let view = source.view(ThemeMode::Light);

        let reference = parse_reference("{brand.themes.light.palettes.neutral.500}").unwrap();
        assert_eq!(view.lookup(&reference), Some(json!("{tokens.color.gray.500}")));

        let reference = parse_reference("{brand.palettes.neutral.500.on-tone}").unwrap();
        assert_eq!(view.lookup(&reference), Some(json!("white")));

        let reference = parse_reference("{brand.palettes.core.black}").unwrap();
        assert_eq!(view.lookup(&reference), Some(json!("#000000")));

        let reference = parse_reference("{brand.layer.0.property.surface}").unwrap();
        assert_eq!(
            view.lookup(&reference),
            Some(json!("{brand.palettes.neutral.050}"))
        );
    }

    #[test]
    fn test_view_uses_reference_mode_and_roots() {
        let source = ThemeSource::from_value(brand());
        let view = source.view(ThemeMode::Light);

        let reference = parse_reference("{brand.themes.dark.palettes.neutral.500}").unwrap();
        assert_eq!(view.lookup(&reference), Some(json!("{tokens.color.gray.900}")));

        let reference = parse_reference("{brand.dimensions.sm}").unwrap();
        assert_eq!(view.lookup(&reference), Some(json!({ "$value": "{tokens.size.sm}" })));

        let reference = parse_reference("{brand.palettes.missing.500}").unwrap();
        assert_eq!(view.lookup(&reference), None);
    }

    #[test]
    fn test_layer_key_normalization() {
        assert_eq!(layer_key("2"), "layer-2");
        assert_eq!(layer_key("layer-3"), "layer-3");
        assert_eq!(layer_key("alternative-popover"), "layer-alternative-popover");
        assert_eq!(layer_number("layer-9"), None);
    }
}
