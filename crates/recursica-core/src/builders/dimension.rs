// ABOUTME: Flattens the brand dimensions tree into --recursica-brand-dimensions-* variables
// ABOUTME: Token references stay var() links; older spacer/icon/flat names are kept as aliases

use recursica_logging::{debug, instrument};
use recursica_types::{CssVarMap, var_ref};
use serde_json::Value;

use crate::builders::values::px;
use crate::context::{BuildContext, leaf_text};
use crate::naming::dimension_var;
use crate::reference::parse_reference;
use crate::token_index::Scalar;

/// Group renames between schema generations: current name -> older name.
/// `None` means the older generation wrote the group's entries at the top level.
const LEGACY_GROUPS: [(&str, Option<&str>); 3] = [
    ("spacers", Some("spacer")),
    ("icons", Some("icon")),
    ("general", None),
];

#[instrument(level = "debug", skip_all, fields(mode = %ctx.mode))]
pub fn build(ctx: &BuildContext<'_>) -> CssVarMap {
    let mut vars = CssVarMap::new();
    let Some(dimensions) = ctx.theme.dimensions() else {
        return vars;
    };

    let mut produced = Vec::new();
    walk(ctx, dimensions, &mut Vec::new(), &mut vars, &mut produced);

    for path in &produced {
        let Some(legacy) = legacy_path(path) else {
            continue;
        };
        vars.entry(dimension_var(&legacy))
            .or_insert_with(|| var_ref(&dimension_var(path)));
    }

    debug!(count = vars.len(), "Dimension variables built");
    vars
}

fn walk(
    ctx: &BuildContext<'_>,
    node: &Value,
    path: &mut Vec<String>,
    vars: &mut CssVarMap,
    produced: &mut Vec<Vec<String>>,
) {
    let Some(map) = node.as_object() else {
        return;
    };
    for (key, child) in map {
        if key.starts_with('$') {
            continue;
        }
        path.push(key.clone());
        if is_leaf(child) {
            match dimension_value(ctx, child) {
                Some(value) => {
                    vars.insert(dimension_var(path.iter()), value);
                    produced.push(path.clone());
                }
                None => debug!(path = %path.join("."), "Dimension did not resolve"),
            }
        } else {
            walk(ctx, child, path, vars, produced);
        }
        path.pop();
    }
}

fn is_leaf(node: &Value) -> bool {
    match node {
        Value::Object(map) => {
            map.contains_key("$value") || map.get("value").is_some_and(|inner| !inner.is_object())
        }
        _ => true,
    }
}

fn dimension_value(ctx: &BuildContext<'_>, node: &Value) -> Option<String> {
    let reference = leaf_text(node).and_then(parse_reference);
    if let Some(var) = reference.as_ref().and_then(|reference| ctx.var_for(reference)) {
        return Some(var);
    }

    match ctx.resolve(node) {
        Ok(Scalar::Number(n)) => Some(px(n)),
        Ok(Scalar::Text(text)) => Some(match text.trim().parse::<f64>() {
            Ok(n) => px(n),
            Err(_) => text,
        }),
        Err(miss) => {
            debug!(value = %node, reason = %miss, "Dimension value did not resolve");
            None
        }
    }
}

fn legacy_path(path: &[String]) -> Option<Vec<String>> {
    let (group, rest) = path.split_first()?;
    if rest.is_empty() {
        return None;
    }
    let (_, legacy) = LEGACY_GROUPS.iter().find(|(current, _)| current == group)?;
    let mut renamed = Vec::with_capacity(path.len());
    if let Some(legacy) = legacy {
        renamed.push(legacy.to_string());
    }
    renamed.extend(rest.iter().cloned());
    Some(renamed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::ThemeSource;
    use crate::token_index::TokenIndex;
    use recursica_types::ThemeMode;
    use serde_json::json;

    fn build_for(tokens: &Value, dimensions: Value) -> CssVarMap {
        let tokens = TokenIndex::build(tokens);
        let theme = ThemeSource::from_value(json!({ "brand": { "dimensions": dimensions } }));
        build(&BuildContext::new(&tokens, &theme, ThemeMode::Light))
    }

    #[test]
    fn test_token_reference_becomes_var() {
        let vars = build_for(
            &json!({ "size": { "sm": { "$value": 8 } } }),
            json!({ "sm": { "$type": "dimension", "$value": "{tokens.size.sm}" } }),
        );

        assert_eq!(vars["--recursica-brand-dimensions-sm"], "var(--recursica-tokens-size-sm)");
        assert!(!vars.contains_key("--recursica-brand-dimensions-spacer-sm"));
    }

    #[test]
    fn test_spacer_alias_requires_resolved_sibling() {
        let vars = build_for(
            &json!({ "size": { "sm": 8 } }),
            json!({
                "spacers": {
                    "sm": { "$value": "{tokens.size.sm}" },
                    "xl": { "$value": "{tokens.size.xl}" }
                }
            }),
        );

        assert_eq!(
            vars["--recursica-brand-dimensions-spacer-sm"],
            "var(--recursica-brand-dimensions-spacers-sm)"
        );
        assert!(!vars.contains_key("--recursica-brand-dimensions-spacers-xl"));
        assert!(!vars.contains_key("--recursica-brand-dimensions-spacer-xl"));
    }

    #[test]
    fn test_literals_get_units() {
        let vars = build_for(
            &json!({}),
            json!({
                "$type": "dimension",
                "icons": { "default": { "$value": 24 } },
                "general": {
                    "gutter": { "$value": "12" },
                    "radius": { "$value": { "value": 0.5, "unit": "rem" } },
                    "max": "80ch"
                }
            }),
        );

        assert_eq!(vars["--recursica-brand-dimensions-icons-default"], "24px");
        assert_eq!(vars["--recursica-brand-dimensions-general-gutter"], "12px");
        assert_eq!(vars["--recursica-brand-dimensions-general-radius"], "0.5rem");
        assert_eq!(vars["--recursica-brand-dimensions-general-max"], "80ch");
        assert_eq!(
            vars["--recursica-brand-dimensions-icon-default"],
            "var(--recursica-brand-dimensions-icons-default)"
        );
        assert_eq!(
            vars["--recursica-brand-dimensions-gutter"],
            "var(--recursica-brand-dimensions-general-gutter)"
        );
        assert!(!vars.keys().any(|name| name.contains("$type")));
    }

    #[test]
    fn test_legacy_alias_never_overwrites_a_produced_name() {
        let vars = build_for(
            &json!({}),
            json!({
                "gutter": { "$value": 4 },
                "general": { "gutter": { "$value": 12 } }
            }),
        );
        assert_eq!(vars["--recursica-brand-dimensions-gutter"], "4px");
    }

    #[test]
    fn test_missing_dimensions_is_empty() {
        assert!(build_for(&json!({}), json!(null)).is_empty());
    }
}
