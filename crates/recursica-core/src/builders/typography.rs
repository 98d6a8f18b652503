// ABOUTME: Builds --recursica-brand-typography-<slot>-<property> variables for each text style
// ABOUTME: Priority is user choice, then the brand's own value, then the token scale default

use recursica_logging::{debug, instrument};
use recursica_types::{CssVarMap, TypographyChoices, var_ref};
use serde_json::Value;
use std::collections::BTreeSet;

use crate::builders::values::px;
use crate::context::BuildContext;
use crate::naming::{token_var, typography_var};
use crate::reference::{Reference, is_brace_wrapped, parse_reference};
use crate::token_index::{Scalar, TokenOverrides};

/// Text-style slots every build emits, whether or not the brand defines them
pub const TEXT_STYLE_SLOTS: [&str; 13] = [
    "h1",
    "h2",
    "h3",
    "h4",
    "h5",
    "h6",
    "subtitle-1",
    "subtitle-2",
    "body-1",
    "body-2",
    "button",
    "caption",
    "overline",
];

const GENERIC_FAMILIES: [&str; 10] = [
    "serif",
    "sans-serif",
    "monospace",
    "cursive",
    "fantasy",
    "system-ui",
    "ui-sans-serif",
    "ui-serif",
    "ui-monospace",
    "inherit",
];

struct PropertyRule {
    property: &'static str,
    /// `font/<category>` subtrees a short token name is looked up in
    categories: &'static [&'static str],
    default_token: Option<&'static str>,
    default_literal: Option<&'static str>,
}

const RULES: [PropertyRule; 8] = [
    PropertyRule {
        property: "font-family",
        categories: &["typefaces", "typeface", "families", "family"],
        default_token: Some("primary"),
        default_literal: None,
    },
    PropertyRule {
        property: "font-size",
        categories: &["sizes", "size"],
        default_token: Some("md"),
        default_literal: Some("16px"),
    },
    PropertyRule {
        property: "font-weight",
        categories: &["weights", "weight"],
        default_token: Some("regular"),
        default_literal: Some("400"),
    },
    PropertyRule {
        property: "letter-spacing",
        categories: &["letter-spacings", "letter-spacing"],
        default_token: Some("default"),
        default_literal: Some("0"),
    },
    PropertyRule {
        property: "line-height",
        categories: &["line-heights", "line-height"],
        default_token: Some("default"),
        default_literal: Some("normal"),
    },
    PropertyRule {
        property: "font-style",
        categories: &["styles", "style"],
        default_token: None,
        default_literal: Some("normal"),
    },
    PropertyRule {
        property: "text-transform",
        categories: &["cases", "case", "transforms", "transform"],
        default_token: None,
        default_literal: Some("none"),
    },
    PropertyRule {
        property: "text-decoration",
        categories: &["decorations", "decoration"],
        default_token: None,
        default_literal: Some("none"),
    },
];

/// Typography variables plus the font families they use
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TypographyBuild {
    pub vars: CssVarMap,
    /// Distinct non-generic family names, for a font loader
    pub families_to_load: BTreeSet<String>,
}

#[instrument(level = "debug", skip_all)]
pub fn build(
    ctx: &BuildContext<'_>,
    overrides: Option<&TokenOverrides>,
    choices: Option<&TypographyChoices>,
) -> TypographyBuild {
    match overrides {
        Some(overrides) if !overrides.is_empty() => {
            let tokens = ctx.tokens.with_overrides(overrides);
            build_styles(&ctx.with_tokens(&tokens), choices)
        }
        _ => build_styles(ctx, choices),
    }
}

fn build_styles(ctx: &BuildContext<'_>, choices: Option<&TypographyChoices>) -> TypographyBuild {
    let specs = ctx.theme.typography();
    let mut slots: BTreeSet<&str> = TEXT_STYLE_SLOTS.into_iter().collect();
    slots.extend(specs.keys().map(String::as_str));

    let mut build = TypographyBuild::default();
    for slot in slots {
        let spec = specs.get(slot);
        let choice = choices.and_then(|choices| choices.get(slot));

        for rule in &RULES {
            let chosen = choice.and_then(|choice| choice.field(rule.property));
            let authored = spec.and_then(|spec| spec.field(rule.property));
            let Some(value) = resolve_property(ctx, rule, chosen, authored) else {
                debug!(slot, property = rule.property, "No typography value");
                continue;
            };

            if rule.property == "font-family" {
                if let Some(family) = value.literal.as_deref().and_then(primary_family) {
                    build.families_to_load.insert(family);
                }
            }
            build.vars.insert(typography_var(slot, rule.property), value.css);
        }
    }

    debug!(
        count = build.vars.len(),
        families = build.families_to_load.len(),
        "Typography variables built"
    );
    build
}

struct PropertyValue {
    css: String,
    /// Resolved literal, when known
    literal: Option<String>,
}

fn resolve_property(
    ctx: &BuildContext<'_>,
    rule: &PropertyRule,
    choice: Option<&str>,
    authored: Option<&Value>,
) -> Option<PropertyValue> {
    if let Some(name) = choice {
        match named_token(ctx, rule, name) {
            Some(value) => return Some(value),
            None => debug!(property = rule.property, choice = name, "Choice names no token"),
        }
    }

    if let Some(value) = authored.and_then(|raw| authored_value(ctx, rule, raw)) {
        return Some(value);
    }

    if let Some(value) = rule
        .default_token
        .and_then(|name| named_token(ctx, rule, name))
    {
        return Some(value);
    }

    rule.default_literal.map(|literal| PropertyValue {
        css: literal.to_string(),
        literal: Some(literal.to_string()),
    })
}

/// A short name (`lg`) under the rule's categories, or a full token reference
fn named_token(ctx: &BuildContext<'_>, rule: &PropertyRule, name: &str) -> Option<PropertyValue> {
    let name = name.trim();
    if is_brace_wrapped(name) {
        let reference = parse_reference(name).filter(Reference::is_token)?;
        let key = ctx.tokens.canonical_path(&reference.slash_path())?;
        return token_value(ctx, key);
    }

    rule.categories
        .iter()
        .find_map(|category| ctx.tokens.canonical_path(&format!("font/{category}/{name}")))
        .and_then(|key| token_value(ctx, key))
}

/// Only tokens whose chain ends in a value have a variable to link to
fn token_value(ctx: &BuildContext<'_>, key: &str) -> Option<PropertyValue> {
    let literal = ctx
        .resolver()
        .resolve_reference(&Reference::token(key.split('/')))
        .ok()?
        .to_string();
    Some(PropertyValue {
        css: var_ref(&token_var(key)),
        literal: Some(literal),
    })
}

fn authored_value(ctx: &BuildContext<'_>, rule: &PropertyRule, raw: &Value) -> Option<PropertyValue> {
    let resolved = ctx.resolve(raw);

    if let Some(var) = ctx.reference_var(raw) {
        return Some(PropertyValue {
            css: var,
            literal: resolved.ok().map(|scalar| scalar.to_string()),
        });
    }

    let scalar = match resolved {
        Ok(scalar) => scalar,
        Err(miss) => {
            debug!(property = rule.property, value = %raw, reason = %miss, "Typography value did not resolve");
            return None;
        }
    };

    let prefixes: Vec<String> = rule
        .categories
        .iter()
        .map(|category| format!("font/{category}"))
        .collect();
    let prefixes: Vec<&str> = prefixes.iter().map(String::as_str).collect();
    let matched = ctx
        .tokens
        .find_canonical(&prefixes, |candidate| same_value(rule, candidate, &scalar))
        .and_then(|key| token_value(ctx, key));
    if matched.is_some() {
        return matched;
    }

    let css = match (&scalar, rule.property) {
        (Scalar::Number(n), "font-size") => px(*n),
        _ => scalar.to_string(),
    };
    Some(PropertyValue {
        literal: Some(css.clone()),
        css,
    })
}

fn same_value(rule: &PropertyRule, candidate: &Scalar, target: &Scalar) -> bool {
    if rule.property == "font-size" {
        return candidate.px_value().is_some() && candidate.px_value() == target.px_value();
    }
    match (candidate.as_number(), target.as_number()) {
        (Some(a), Some(b)) => a == b,
        _ => candidate
            .to_string()
            .trim()
            .eq_ignore_ascii_case(target.to_string().trim()),
    }
}

/// First named family in a font stack, unless it is a generic one
fn primary_family(stack: &str) -> Option<String> {
    let first = stack
        .split(',')
        .next()?
        .trim()
        .trim_matches(|c| c == '"' || c == '\'')
        .trim();
    let generic = GENERIC_FAMILIES
        .iter()
        .any(|generic| generic.eq_ignore_ascii_case(first));
    (!first.is_empty() && !generic).then(|| first.to_string())
}
