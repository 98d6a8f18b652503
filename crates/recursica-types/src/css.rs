// ABOUTME: CSS custom-property map type and var() helpers
// ABOUTME: Every builder produces a CssVarMap keyed by --recursica-* names

use std::collections::BTreeMap;

/// Variable name -> terminal CSS value or `var(--other)` reference
pub type CssVarMap = BTreeMap<String, String>;

/// Prefix shared by every emitted variable
pub const VAR_PREFIX: &str = "--recursica";

/// Wrap a custom-property name in `var()`.
pub fn var_ref(name: &str) -> String {
    format!("var({name})")
}

/// Extract the custom-property name from `var(--name)` or `var(--name, fallback)`.
pub fn var_target(value: &str) -> Option<&str> {
    let inner = value.trim().strip_prefix("var(")?.strip_suffix(')')?;
    let name = inner.split(',').next()?.trim();
    name.starts_with("--").then_some(name)
}
