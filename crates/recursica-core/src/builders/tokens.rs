// ABOUTME: Emits a --recursica-tokens-* variable for every indexed token
// ABOUTME: Source keys carry literals; singular/plural and family aliases chain to them

use recursica_logging::debug;
use recursica_types::{CssVarMap, var_ref};

use crate::builders::values::{normalize_opacity, px};
use crate::naming::token_var;
use crate::reference::parse_reference;
use crate::resolver::Resolver;
use crate::token_index::{Scalar, TokenIndex, format_number};

pub fn build(tokens: &TokenIndex) -> CssVarMap {
    let mut vars = CssVarMap::new();

    for (key, scalar) in tokens.iter() {
        match literal(tokens, key, scalar) {
            Some(value) => {
                vars.insert(token_var(key), value);
            }
            None => debug!(token = key, value = %scalar, "Skipping token with dangling reference"),
        }
    }

    for (alias, canonical) in tokens.aliases() {
        if vars.contains_key(&token_var(canonical)) {
            vars.entry(token_var(alias))
                .or_insert_with(|| var_ref(&token_var(canonical)));
        }
    }

    vars
}

fn literal(tokens: &TokenIndex, key: &str, scalar: &Scalar) -> Option<String> {
    match scalar {
        Scalar::Number(n) => Some(number_literal(key, *n)),
        Scalar::Text(text) => match parse_reference(text) {
            // The chain has to end in a value; dangling and cyclic links are skipped
            Some(reference) if reference.is_token() => {
                let path = reference.slash_path();
                let resolves = Resolver::new(tokens).resolve_str(text).is_ok();
                (resolves && tokens.contains(&path)).then(|| var_ref(&token_var(&path)))
            }
            Some(_) => None,
            None => Some(text.trim().to_string()),
        },
    }
}

fn number_literal(key: &str, n: f64) -> String {
    let mut segments = key.split('/');
    let category = segments.next().unwrap_or_default();
    let sub = segments.next().unwrap_or_default();
    match (category, sub) {
        ("size" | "sizes", _) => px(n),
        ("font", "size" | "sizes") => px(n),
        ("opacity" | "opacities", _) => format_number(normalize_opacity(n)),
        _ => format_number(n),
    }
}
