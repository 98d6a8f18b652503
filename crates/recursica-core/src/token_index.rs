// ABOUTME: Flat lookup table over the raw token JSON keyed by slash paths
// ABOUTME: Legacy singular and current plural category names resolve to the same entry

use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

use crate::levels::canonical_level;

/// A terminal token value. Text may itself be a brace reference.
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    Number(f64),
    Text(String),
}

impl Scalar {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Scalar::Text(text) => Some(text),
            Scalar::Number(_) => None,
        }
    }

    /// Numbers, and text that is entirely numeric
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Scalar::Number(n) => Some(*n),
            Scalar::Text(text) => text.trim().parse().ok(),
        }
    }

    /// Pixel size of a number or a `px`-suffixed string
    pub fn px_value(&self) -> Option<f64> {
        match self {
            Scalar::Number(n) => Some(*n),
            Scalar::Text(text) => {
                let text = text.trim();
                text.strip_suffix("px").unwrap_or(text).trim().parse().ok()
            }
        }
    }

    pub fn to_value(&self) -> Value {
        match self {
            Scalar::Number(n) => serde_json::Number::from_f64(*n)
                .map(Value::Number)
                .unwrap_or(Value::Null),
            Scalar::Text(text) => Value::String(text.clone()),
        }
    }

    pub(crate) fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Number(n) => n.as_f64().map(Scalar::Number),
            Value::String(s) => Some(Scalar::Text(s.clone())),
            Value::Bool(b) => Some(Scalar::Text(b.to_string())),
            Value::Object(map) => {
                // `{ "value": 16, "unit": "px" }` is written as one CSS length
                let inner = map.get("value")?;
                match (Scalar::from_value(inner)?, map.get("unit").and_then(Value::as_str)) {
                    (scalar, Some(unit)) => Some(Scalar::Text(format!("{scalar}{unit}"))),
                    (scalar, None) => Some(scalar),
                }
            }
            Value::Null | Value::Array(_) => None,
        }
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Number(n) => f.write_str(&format_number(*n)),
            Scalar::Text(text) => f.write_str(text),
        }
    }
}

/// `16.0` -> `16`, `0.5` -> `0.5`
pub fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        let formatted = format!("{n:.4}");
        formatted
            .trim_end_matches('0')
            .trim_end_matches('.')
            .to_string()
    }
}

/// Token path -> replacement value, applied on top of the source tokens
pub type TokenOverrides = BTreeMap<String, Value>;

const FONT_PAIRS: [(&str, &str); 9] = [
    ("typeface", "typefaces"),
    ("family", "families"),
    ("size", "sizes"),
    ("weight", "weights"),
    ("letter-spacing", "letter-spacings"),
    ("line-height", "line-heights"),
    ("style", "styles"),
    ("decoration", "decorations"),
    ("case", "cases"),
];

#[derive(Debug, Clone, Default)]
pub struct TokenIndex {
    /// Canonical key -> value, keyed as written in the source
    values: BTreeMap<String, Scalar>,
    /// Every lookup key (canonical and alias) -> canonical key
    keys: BTreeMap<String, String>,
}

impl TokenIndex {
    pub fn build(source: &Value) -> Self {
        let mut index = TokenIndex::default();
        let root = match source.get("tokens") {
            Some(inner) if inner.is_object() => inner,
            _ => source,
        };
        let Some(categories) = root.as_object() else {
            return index;
        };

        for (category, subtree) in categories {
            match category.as_str() {
                "color" | "colors" => index.index_colors(category, subtree),
                "opacity" | "opacities" | "size" | "sizes" | "font" => {
                    let mut path = vec![category.clone()];
                    index.walk(subtree, &mut path);
                }
                _ => {}
            }
        }

        let canonical: Vec<String> = index.values.keys().cloned().collect();
        for key in canonical {
            for alias in aliases_for(&key) {
                index.keys.entry(alias).or_insert_with(|| key.clone());
            }
        }

        index
    }

    /// A copy of this index with `overrides` replacing (or adding) values
    pub fn with_overrides(&self, overrides: &TokenOverrides) -> Self {
        let mut index = self.clone();
        for (path, value) in overrides {
            let Some(scalar) = Scalar::from_value(unwrap_leaf(value)) else {
                continue;
            };
            let key = normalize_path(path);
            match index.keys.get(&key).cloned() {
                Some(canonical) => {
                    index.values.insert(canonical, scalar);
                }
                None => {
                    index.keys.insert(key.clone(), key.clone());
                    for alias in aliases_for(&key) {
                        index.keys.entry(alias).or_insert_with(|| key.clone());
                    }
                    index.values.insert(key, scalar);
                }
            }
        }
        index
    }

    pub fn get(&self, path: &str) -> Option<&Scalar> {
        let canonical = self.keys.get(&normalize_path(path))?;
        self.values.get(canonical)
    }

    pub fn contains(&self, path: &str) -> bool {
        self.keys.contains_key(&normalize_path(path))
    }

    /// The source-written key a lookup path (canonical or alias) lands on
    pub fn canonical_path(&self, path: &str) -> Option<&str> {
        self.keys.get(&normalize_path(path)).map(String::as_str)
    }

    /// Canonical entries in key order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Scalar)> {
        self.values.iter().map(|(key, value)| (key.as_str(), value))
    }

    /// Alias keys and the canonical key each points at
    pub fn aliases(&self) -> impl Iterator<Item = (&str, &str)> {
        self.keys
            .iter()
            .filter(|(alias, canonical)| alias != canonical)
            .map(|(alias, canonical)| (alias.as_str(), canonical.as_str()))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Color on a family scale; `level` may be unpadded (`50`)
    pub fn color(&self, family: &str, level: &str) -> Option<&Scalar> {
        let level = canonical_level(level).unwrap_or(level);
        self.get(&format!("color/{family}/{level}"))
    }

    /// Size tokens with a pixel value, as (canonical key, px), smallest first
    pub fn size_scale(&self) -> Vec<(&str, f64)> {
        let mut sizes: Vec<(&str, f64)> = self
            .values
            .iter()
            .filter(|(key, _)| category_of(key) == "size" || category_of(key) == "sizes")
            .filter_map(|(key, value)| value.px_value().map(|px| (key.as_str(), px)))
            .collect();
        sizes.sort_by(|a, b| a.1.total_cmp(&b.1));
        sizes
    }

    /// First canonical key under any of `prefixes` whose value matches `predicate`
    pub fn find_canonical<F>(&self, prefixes: &[&str], mut predicate: F) -> Option<&str>
    where
        F: FnMut(&Scalar) -> bool,
    {
        prefixes.iter().find_map(|prefix| {
            let prefix = format!("{}/", normalize_path(prefix));
            self.keys
                .iter()
                .filter(|(alias, canonical)| alias == canonical && alias.starts_with(&prefix))
                .find_map(|(key, _)| {
                    let value = self.values.get(key)?;
                    predicate(value).then_some(key.as_str())
                })
        })
    }

    fn index_colors(&mut self, category: &str, subtree: &Value) {
        let Some(families) = subtree.as_object() else {
            return;
        };
        for (family, scale) in families {
            if family.starts_with('$') {
                continue;
            }
            let mut path = vec![category.to_string(), family.clone()];
            self.walk(scale, &mut path);

            // New schema: colors.scale-06 = { alias: "gray", "500": {...} }
            if let Some(alias) = scale.get("alias").and_then(|alias| {
                Scalar::from_value(unwrap_leaf(alias)).and_then(|s| s.as_text().map(str::to_string))
            }) {
                self.values.remove(&format!("{category}/{family}/alias"));
                self.keys.remove(&format!("{category}/{family}/alias"));
                let source_prefix = format!("{category}/{family}/");
                let levels: Vec<(String, String)> = self
                    .values
                    .keys()
                    .filter_map(|key| {
                        key.strip_prefix(&source_prefix)
                            .map(|level| (level.to_string(), key.clone()))
                    })
                    .collect();
                for (level, canonical) in levels {
                    for alias_category in ["color", "colors"] {
                        self.keys
                            .entry(format!("{alias_category}/{alias}/{level}"))
                            .or_insert_with(|| canonical.clone());
                    }
                }
            }
        }
    }

    fn walk(&mut self, node: &Value, path: &mut Vec<String>) {
        if is_leaf(node) {
            if let Some(scalar) = Scalar::from_value(unwrap_leaf(node)) {
                let key = path.join("/");
                self.keys.insert(key.clone(), key.clone());
                self.values.insert(key, scalar);
            }
            return;
        }

        if let Some(children) = node.as_object() {
            for (key, child) in children {
                if key.starts_with('$') {
                    continue;
                }
                path.push(key.clone());
                self.walk(child, path);
                path.pop();
            }
        }
    }
}

fn is_leaf(node: &Value) -> bool {
    match node {
        Value::Object(map) => {
            map.contains_key("$value")
                || (map.contains_key("value") && !map["value"].is_object())
        }
        _ => true,
    }
}

fn unwrap_leaf(node: &Value) -> &Value {
    match node {
        Value::Object(map) => match map.get("$value") {
            Some(inner) => inner,
            None => node,
        },
        _ => node,
    }
}

fn category_of(key: &str) -> &str {
    key.split('/').next().unwrap_or_default()
}

/// `tokens.color.gray.500`, `color.gray.500` and `color/gray/500` all index the same way
pub fn normalize_path(path: &str) -> String {
    let trimmed = path.trim().trim_start_matches('{').trim_end_matches('}');
    let joined = trimmed.replace('.', "/");
    let joined = joined
        .strip_prefix("tokens/")
        .or_else(|| joined.strip_prefix("token/"))
        .unwrap_or(&joined);
    joined.trim_matches('/').to_string()
}

fn aliases_for(key: &str) -> Vec<String> {
    let mut segments: Vec<&str> = key.split('/').collect();
    let Some(category) = segments.first().copied() else {
        return Vec::new();
    };

    let twin = match category {
        "color" => Some("colors"),
        "colors" => Some("color"),
        "opacity" => Some("opacities"),
        "opacities" => Some("opacity"),
        "size" => Some("sizes"),
        "sizes" => Some("size"),
        _ => None,
    };
    if let Some(twin) = twin {
        segments[0] = twin;
        return vec![segments.join("/")];
    }

    if category == "font" && segments.len() > 2 {
        let sub = segments[1];
        let twin = FONT_PAIRS.iter().find_map(|(singular, plural)| {
            if sub == *singular {
                Some(*plural)
            } else if sub == *plural {
                Some(*singular)
            } else {
                None
            }
        });
        if let Some(twin) = twin {
            segments[1] = twin;
            return vec![segments.join("/")];
        }
    }

    Vec::new()
}
