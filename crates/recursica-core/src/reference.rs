// ABOUTME: Parser for brace references like {tokens.color.gray.500} and legacy var() names
// ABOUTME: Non-references parse to None so callers can fall back to the literal

use once_cell::sync::Lazy;
use recursica_types::{ThemeMode, var_target};
use regex::Regex;
use std::fmt;

/// Which tree a reference points into
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RefKind {
    Token,
    Brand,
}

/// A parsed reference: kind, dotted path, and an optional explicit mode.
///
/// For brand references a leading `themes` segment and the mode segment are
/// removed from `path`, so `{brand.themes.dark.palettes.neutral.500}` becomes
/// `palettes.neutral.500` with `mode = Some(Dark)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Reference {
    pub kind: RefKind,
    pub path: Vec<String>,
    pub mode: Option<ThemeMode>,
}

impl Reference {
    pub fn token<I, S>(path: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            kind: RefKind::Token,
            path: path.into_iter().map(Into::into).collect(),
            mode: None,
        }
    }

    pub fn brand<I, S>(path: I, mode: Option<ThemeMode>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            kind: RefKind::Brand,
            path: path.into_iter().map(Into::into).collect(),
            mode,
        }
    }

    pub fn is_token(&self) -> bool {
        self.kind == RefKind::Token
    }

    /// Slash-joined path, the form the token index is keyed by
    pub fn slash_path(&self) -> String {
        self.path.join("/")
    }

    /// Segment at `index`, lowercased for comparisons
    pub fn segment(&self, index: usize) -> Option<String> {
        self.path.get(index).map(|s| s.to_ascii_lowercase())
    }
}

impl fmt::Display for Reference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.kind, self.mode) {
            (RefKind::Token, _) => write!(f, "{{tokens.{}}}", self.path.join(".")),
            (RefKind::Brand, Some(mode)) => {
                write!(f, "{{brand.themes.{mode}.{}}}", self.path.join("."))
            }
            (RefKind::Brand, None) => write!(f, "{{brand.{}}}", self.path.join(".")),
        }
    }
}

/// Parse a reference string.
///
/// Accepts `{tokens.*}`, `{token.*}`, `{brand.*}` and `{theme.*}` (prefix
/// case-insensitive, braces optional) plus the legacy
/// `var(--recursica-tokens-*)` and `var(--recursica-brand-*-palettes-*)` forms.
pub fn parse_reference(input: &str) -> Option<Reference> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return None;
    }

    if trimmed.starts_with("var(") {
        return parse_legacy_var(trimmed);
    }

    let inner = match trimmed.strip_prefix('{') {
        Some(rest) => rest.strip_suffix('}')?.trim(),
        None => trimmed,
    };

    let mut segments = inner.split('.').map(str::trim);
    let prefix = segments.next()?.to_ascii_lowercase();
    let rest: Vec<&str> = segments.collect();
    if rest.is_empty() || rest.iter().any(|segment| segment.is_empty()) {
        return None;
    }

    match prefix.as_str() {
        "tokens" | "token" => Some(Reference::token(rest)),
        "brand" | "theme" => Some(brand_reference(rest)),
        _ => None,
    }
}

/// Does this look like a brace reference at all, parseable or not
pub fn is_brace_wrapped(input: &str) -> bool {
    let trimmed = input.trim();
    trimmed.starts_with('{') && trimmed.ends_with('}')
}

fn brand_reference(mut rest: Vec<&str>) -> Reference {
    if rest.len() > 1 && rest[0].eq_ignore_ascii_case("themes") {
        rest.remove(0);
    }

    let mode = rest.first().and_then(|segment| ThemeMode::from_segment(segment));
    if mode.is_some() && rest.len() > 1 {
        rest.remove(0);
    }

    Reference::brand(rest, mode)
}

static TOKEN_VAR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^--recursica-tokens-(colors?|opacity|opacities|sizes?|font)-([A-Za-z0-9-]+)$")
        .expect("token var pattern is valid")
});

static PALETTE_VAR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^--recursica-brand-(?:themes-)?(light|dark)-palettes-([A-Za-z0-9-]+)$")
        .expect("palette var pattern is valid")
});

const FONT_SUBCATEGORIES: [&str; 16] = [
    "letter-spacings",
    "letter-spacing",
    "line-heights",
    "line-height",
    "decorations",
    "decoration",
    "typefaces",
    "typeface",
    "families",
    "family",
    "weights",
    "weight",
    "styles",
    "style",
    "sizes",
    "size",
];

const CORE_NAMES: [&str; 6] = ["interactive", "black", "white", "alert", "warning", "success"];

fn parse_legacy_var(input: &str) -> Option<Reference> {
    let name = var_target(input)?;

    if let Some(captures) = TOKEN_VAR.captures(name) {
        let category = captures.get(1)?.as_str();
        let rest = captures.get(2)?.as_str();
        return legacy_token_reference(category, rest);
    }

    if let Some(captures) = PALETTE_VAR.captures(name) {
        let mode = ThemeMode::from_segment(captures.get(1)?.as_str())?;
        let rest = captures.get(2)?.as_str();
        return legacy_palette_reference(mode, rest);
    }

    None
}

fn legacy_token_reference(category: &str, rest: &str) -> Option<Reference> {
    match category {
        "color" | "colors" => {
            let (family, level) = rest.rsplit_once('-')?;
            Some(Reference::token([category, family, level]))
        }
        "font" => {
            let sub = FONT_SUBCATEGORIES
                .iter()
                .copied()
                .find(|sub| rest.len() > sub.len() + 1 && rest.starts_with(&format!("{sub}-")))?;
            Some(Reference::token(["font", sub, &rest[sub.len() + 1..]]))
        }
        _ => Some(Reference::token([category, rest])),
    }
}

fn legacy_palette_reference(mode: ThemeMode, rest: &str) -> Option<Reference> {
    if let Some(core) = rest.strip_prefix("core-") {
        let name = CORE_NAMES
            .iter()
            .find(|name| core == **name || core.starts_with(&format!("{name}-")))?;
        let mut path = vec!["palettes".to_string(), "core-colors".into(), name.to_string()];
        let mut tail = core[name.len()..].trim_start_matches('-');
        if *name == "interactive" {
            for state in ["default", "hover"] {
                if tail == state || tail.starts_with(&format!("{state}-")) {
                    path.push(state.into());
                    tail = tail[state.len()..].trim_start_matches('-');
                }
            }
        }
        match tail {
            "" => {}
            "tone" | "on-tone" => path.push(tail.into()),
            _ => return None,
        }
        return Some(Reference::brand(path, Some(mode)));
    }

    let (rest, role) = if let Some(rest) = rest.strip_suffix("-on-tone") {
        (rest, "on-tone")
    } else if let Some(rest) = rest.strip_suffix("-tone") {
        (rest, "tone")
    } else {
        (rest, "tone")
    };
    let (palette, level) = rest.rsplit_once('-')?;
    if palette.is_empty() || level.is_empty() {
        return None;
    }
    Some(Reference::brand(
        ["palettes", palette, level, role],
        Some(mode),
    ))
}
