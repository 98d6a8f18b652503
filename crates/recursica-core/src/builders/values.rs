// ABOUTME: Value coercions shared by the builders: colors, opacities, and sizes
// ABOUTME: Each returns a CSS value or None; the caller owns the fallback policy

use once_cell::sync::Lazy;
use recursica_logging::debug;
use recursica_types::{CssVarMap, var_ref};
use regex::Regex;
use serde_json::Value;

use crate::color::Rgb;
use crate::context::{BuildContext, leaf_text};
use crate::naming::token_var;
use crate::reference::parse_reference;
use crate::schema::ModeTheme;
use crate::token_index::{TokenIndex, format_number};

pub(crate) fn px(n: f64) -> String {
    format!("{}px", format_number(n))
}

/// Percentages above 1 (`64`) are scaled down to 0..1
pub(crate) fn normalize_opacity(n: f64) -> f64 {
    let n = if n > 1.0 { n / 100.0 } else { n };
    n.clamp(0.0, 1.0)
}

/// A field from the build mode's subtree, else from light
pub(crate) fn mode_field<'t, T, F>(ctx: &BuildContext<'t>, field: F) -> Option<&'t T>
where
    F: Fn(&'t ModeTheme) -> Option<&'t T>,
{
    ctx.theme
        .mode(ctx.mode)
        .and_then(&field)
        .or_else(|| ctx.theme.mode(recursica_types::ThemeMode::Light).and_then(&field))
}

/// Canonical color token whose value is exactly `color`
pub(crate) fn color_token_for(tokens: &TokenIndex, color: Rgb) -> Option<&str> {
    tokens.find_canonical(&["color", "colors"], |scalar| {
        scalar.as_text().and_then(Rgb::parse) == Some(color)
    })
}

/// A color as a `var()` when it names one, else the matching token var, else hex
pub(crate) fn color_value(ctx: &BuildContext<'_>, value: &Value) -> Option<String> {
    if let Some(var) = ctx.reference_var(value) {
        return Some(var);
    }
    match ctx.resolve_hex(value) {
        Ok(color) => Some(match color_token_for(ctx.tokens, color) {
            Some(key) => var_ref(&token_var(key)),
            None => color.to_hex(),
        }),
        Err(miss) => {
            debug!(value = %value, reason = %miss, "Color value did not resolve");
            None
        }
    }
}

/// Opacity as a token var when referenced, else a normalized number; misses fall back to solid
pub(crate) fn opacity_value(ctx: &BuildContext<'_>, value: Option<&Value>) -> String {
    if let Some(value) = value {
        if let Some(var) = ctx.reference_var(value) {
            return var;
        }
        match ctx.resolve(value) {
            Ok(scalar) => match scalar.as_number() {
                Some(n) => return format_number(normalize_opacity(n)),
                None => debug!(value = %scalar, "Opacity is not numeric"),
            },
            Err(miss) => debug!(value = %value, reason = %miss, "Opacity did not resolve"),
        }
    }
    solid_opacity(ctx.tokens)
}

fn solid_opacity(tokens: &TokenIndex) -> String {
    match tokens.canonical_path("opacity/solid") {
        Some(key) => var_ref(&token_var(key)),
        None => "1".to_string(),
    }
}

/// A length as a size token var.
///
/// Token and dimension references compile straight to their var. Numbers snap
/// to the nearest size token; with no size tokens they become `px`. Lengths in
/// other units are kept as written.
pub(crate) fn size_value(ctx: &BuildContext<'_>, value: &Value) -> Option<String> {
    if let Some(reference) = leaf_text(value).and_then(parse_reference) {
        let direct = reference.is_token() || reference.segment(0).as_deref() == Some("dimensions");
        if direct {
            if let Some(var) = ctx.var_for(&reference) {
                return Some(var);
            }
        }
    }

    match ctx.resolve(value) {
        Ok(scalar) => match scalar.px_value() {
            Some(n) => Some(nearest_size(ctx.tokens, n)),
            None => {
                let text = scalar.to_string();
                let text = text.trim();
                if is_css_length(text) {
                    Some(text.to_string())
                } else {
                    debug!(value = %text, "Size is not a CSS length");
                    None
                }
            }
        },
        Err(miss) => {
            debug!(value = %value, reason = %miss, "Size did not resolve");
            None
        }
    }
}

static CSS_LENGTH: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^-?(\d+\.?\d*|\.\d+)(rem|em|ex|ch|lh|vw|vh|vmin|vmax|svh|lvh|dvh|cm|mm|q|in|pt|pc|%)$")
        .expect("css length pattern is valid")
});

/// A unit-carrying length or a CSS math function
fn is_css_length(text: &str) -> bool {
    let math = ["calc(", "min(", "max(", "clamp("]
        .into_iter()
        .any(|prefix| text.starts_with(prefix) && text.ends_with(')'));
    math || CSS_LENGTH.is_match(text)
}

/// `size/md` when the tokens define it
pub(crate) fn default_size(tokens: &TokenIndex) -> Option<String> {
    tokens
        .canonical_path("size/md")
        .map(|key| var_ref(&token_var(key)))
}

/// Closest size token by absolute distance; ties go to the smaller token
pub(crate) fn nearest_size(tokens: &TokenIndex, n: f64) -> String {
    let mut best: Option<(&str, f64)> = None;
    for (key, size) in tokens.size_scale() {
        let closer = match best {
            Some((_, current)) => (size - n).abs() < (current - n).abs(),
            None => true,
        };
        if closer {
            best = Some((key, size));
        }
    }

    match best {
        Some((key, size)) => {
            if size != n {
                debug!(requested = n, token = key, token_px = size, "Snapped size to nearest token");
            }
            var_ref(&token_var(key))
        }
        None => px(n),
    }
}

/// Add every entry of `source` whose name `target` does not have yet
pub(crate) fn merge_missing(target: &mut CssVarMap, source: CssVarMap) -> usize {
    let mut added = 0;
    for (name, value) in source {
        if let std::collections::btree_map::Entry::Vacant(slot) = target.entry(name) {
            slot.insert(value);
            added += 1;
        }
    }
    added
}
