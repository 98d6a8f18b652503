// ABOUTME: Flattens the UI-kit component tree into --recursica-ui-kit-* variables
// ABOUTME: References link to token/brand variables; dimension-typed numbers get px

use recursica_logging::{debug, instrument};
use recursica_types::CssVarMap;
use serde_json::Value;

use crate::builders::values::px;
use crate::context::BuildContext;
use crate::naming::ui_kit_var;
use crate::token_index::Scalar;

#[instrument(level = "debug", skip_all, fields(mode = %ctx.mode))]
pub fn build(ctx: &BuildContext<'_>, ui_kit: &Value) -> CssVarMap {
    let root = ["ui-kit", "uiKit"]
        .into_iter()
        .find_map(|key| ui_kit.get(key).filter(|inner| inner.is_object()))
        .unwrap_or(ui_kit);

    let mut vars = CssVarMap::new();
    walk(ctx, root, None, &mut Vec::new(), &mut vars);
    debug!(count = vars.len(), "UI kit variables built");
    vars
}

fn walk(
    ctx: &BuildContext<'_>,
    node: &Value,
    inherited_type: Option<&str>,
    path: &mut Vec<String>,
    vars: &mut CssVarMap,
) {
    let Some(map) = node.as_object() else {
        return;
    };
    let node_type = map.get("$type").and_then(Value::as_str).or(inherited_type);

    for (key, child) in map {
        if key.starts_with('$') {
            continue;
        }
        path.push(key.clone());
        if is_leaf(child) {
            let leaf_type = child
                .get("$type")
                .and_then(Value::as_str)
                .or(node_type);
            match leaf_value(ctx, child, leaf_type) {
                Some(value) => {
                    vars.insert(ui_kit_var(path.iter()), value);
                }
                None => debug!(path = %path.join("."), "UI kit value did not resolve"),
            }
        } else {
            walk(ctx, child, node_type, path, vars);
        }
        path.pop();
    }
}

fn is_leaf(node: &Value) -> bool {
    match node {
        Value::Object(map) => map.contains_key("$value"),
        Value::Array(_) => false,
        _ => true,
    }
}

fn leaf_value(ctx: &BuildContext<'_>, node: &Value, value_type: Option<&str>) -> Option<String> {
    if let Some(var) = ctx.reference_var(node) {
        return Some(var);
    }
    match ctx.resolve(node) {
        Ok(Scalar::Number(n)) if value_type == Some("dimension") => Some(px(n)),
        Ok(scalar) => Some(scalar.to_string()),
        Err(miss) => {
            debug!(value = %node, reason = %miss, "UI kit reference missed");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::ThemeSource;
    use crate::token_index::TokenIndex;
    use recursica_types::ThemeMode;
    use serde_json::json;

    #[test]
    fn test_ui_kit_leaves() {
        let tokens = TokenIndex::build(&json!({ "size": { "md": 16 } }));
        let theme = ThemeSource::from_value(json!({
            "dark": { "layers": { "layer-1": { "properties": { "surface": "#123456" } } } }
        }));
        let ctx = BuildContext::new(&tokens, &theme, ThemeMode::Dark);
        let ui_kit = json!({
            "ui-kit": {
                "$description": "components",
                "button": {
                    "$type": "dimension",
                    "height": { "$value": 40 },
                    "padding": { "$value": "{tokens.size.md}" },
                    "opacity": { "$type": "number", "$value": 0.5 },
                    "surface": "{brand.layers.layer-1.properties.surface}",
                    "gone": "{tokens.size.none}",
                    "border": "{brand.layers.layer-9.properties.border-color}"
                }
            }
        });
        let vars = build(&ctx, &ui_kit);

        assert_eq!(vars["--recursica-ui-kit-button-height"], "40px");
        assert_eq!(vars["--recursica-ui-kit-button-padding"], "var(--recursica-tokens-size-md)");
        assert_eq!(vars["--recursica-ui-kit-button-opacity"], "0.5");
        assert_eq!(
            vars["--recursica-ui-kit-button-surface"],
            "var(--recursica-brand-themes-dark-layer-layer-1-property-surface)"
        );
        assert!(!vars.contains_key("--recursica-ui-kit-button-gone"));
        assert!(!vars.contains_key("--recursica-ui-kit-button-border"));
        assert_eq!(vars.len(), 4);
    }
}
