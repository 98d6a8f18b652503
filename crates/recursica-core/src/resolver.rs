// ABOUTME: Brace-reference resolver following chains through the token index and theme tree
// ABOUTME: Depth-capped so cyclic chains end in a LookupMiss instead of recursing forever

use serde_json::Value;

use crate::color::Rgb;
use crate::error::LookupMiss;
use crate::reference::{RefKind, Reference, is_brace_wrapped, parse_reference};
use crate::token_index::{Scalar, TokenIndex};

/// Hop limit when resolving token values
pub const TOKEN_DEPTH_LIMIT: usize = 8;

/// Hop limit when resolving a value all the way to a hex color
pub const COLOR_DEPTH_LIMIT: usize = 10;

/// Looks up `{brand...}` references in the theme tree
pub trait ThemeAccessor {
    fn lookup(&self, reference: &Reference) -> Option<Value>;
}

impl<F> ThemeAccessor for F
where
    F: Fn(&Reference) -> Option<Value>,
{
    fn lookup(&self, reference: &Reference) -> Option<Value> {
        self(reference)
    }
}

#[derive(Clone, Copy)]
pub struct Resolver<'a> {
    tokens: &'a TokenIndex,
    theme: Option<&'a dyn ThemeAccessor>,
    limit: usize,
}

impl<'a> Resolver<'a> {
    pub fn new(tokens: &'a TokenIndex) -> Self {
        Self {
            tokens,
            theme: None,
            limit: TOKEN_DEPTH_LIMIT,
        }
    }

    pub fn with_theme(mut self, theme: &'a dyn ThemeAccessor) -> Self {
        self.theme = Some(theme);
        self
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    pub fn tokens(&self) -> &'a TokenIndex {
        self.tokens
    }

    pub fn resolve(&self, value: &Value) -> Result<Scalar, LookupMiss> {
        self.resolve_at(value, 0)
    }

    pub fn resolve_str(&self, value: &str) -> Result<Scalar, LookupMiss> {
        self.resolve_text(value, 0)
    }

    pub fn resolve_reference(&self, reference: &Reference) -> Result<Scalar, LookupMiss> {
        self.follow(reference, 0)
    }

    /// Resolve to a color, allowing the longer color hop limit
    pub fn resolve_hex(&self, value: &Value) -> Result<Rgb, LookupMiss> {
        let scalar = self.with_limit(COLOR_DEPTH_LIMIT).resolve(value)?;
        let text = scalar.to_string();
        Rgb::parse(&text).ok_or(LookupMiss::NotAColor { value: text })
    }

    pub fn resolve_at(&self, value: &Value, depth: usize) -> Result<Scalar, LookupMiss> {
        if depth > self.limit {
            return Err(LookupMiss::DepthExceeded { limit: self.limit });
        }

        match value {
            Value::Null => Err(LookupMiss::Empty),
            Value::Number(n) => n
                .as_f64()
                .map(Scalar::Number)
                .ok_or(LookupMiss::Empty),
            Value::Bool(b) => Ok(Scalar::Text(b.to_string())),
            Value::String(text) => self.resolve_text(text, depth),
            Value::Object(map)
                if map.contains_key("unit") && map.get("value").is_some_and(Value::is_number) =>
            {
                Scalar::from_value(value).ok_or(LookupMiss::Empty)
            }
            Value::Object(map) => match map.get("$value").or_else(|| map.get("value")) {
                Some(inner) => self.resolve_at(inner, depth),
                None => Err(LookupMiss::Collection),
            },
            Value::Array(_) => Err(LookupMiss::Collection),
        }
    }

    fn resolve_text(&self, text: &str, depth: usize) -> Result<Scalar, LookupMiss> {
        if depth > self.limit {
            return Err(LookupMiss::DepthExceeded { limit: self.limit });
        }

        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Err(LookupMiss::Empty);
        }

        match parse_reference(trimmed) {
            Some(reference) => self.follow(&reference, depth),
            // A braced string we cannot parse must never leak into CSS
            None if is_brace_wrapped(trimmed) => Err(LookupMiss::NotFound {
                path: trimmed.to_string(),
            }),
            None => Ok(Scalar::Text(trimmed.to_string())),
        }
    }

    fn follow(&self, reference: &Reference, depth: usize) -> Result<Scalar, LookupMiss> {
        let next = depth + 1;
        if next > self.limit {
            return Err(LookupMiss::DepthExceeded { limit: self.limit });
        }

        match reference.kind {
            RefKind::Token => {
                let path = reference.slash_path();
                let scalar = self
                    .tokens
                    .get(&path)
                    .ok_or(LookupMiss::NotFound { path })?;
                match scalar {
                    Scalar::Text(text) => self.resolve_text(text, next),
                    Scalar::Number(_) => Ok(scalar.clone()),
                }
            }
            RefKind::Brand => {
                let theme = self.theme.ok_or(LookupMiss::NoThemeAccessor)?;
                let value = theme.lookup(reference).ok_or_else(|| LookupMiss::NotFound {
                    path: reference.to_string(),
                })?;
                self.resolve_at(&value, next)
            }
        }
    }
}

/// Resolve a value to a terminal scalar, or `None` on any miss.
pub fn resolve_brace_ref(
    value: &Value,
    tokens: &TokenIndex,
    theme: Option<&dyn ThemeAccessor>,
    depth: usize,
) -> Option<Scalar> {
    let resolver = match theme {
        Some(theme) => Resolver::new(tokens).with_theme(theme),
        None => Resolver::new(tokens),
    };
    resolver.resolve_at(value, depth).ok()
}
