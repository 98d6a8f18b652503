// ABOUTME: User typography choices per text-style slot
// ABOUTME: Values are short token names, e.g. family = "secondary", size = "lg"

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Explicit choices for one slot; `None` defers to the brand theme
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct TypeStyleChoice {
    pub family: Option<String>,
    pub size: Option<String>,
    pub weight: Option<String>,
    pub letter_spacing: Option<String>,
    pub line_height: Option<String>,
    pub style: Option<String>,
    pub transform: Option<String>,
    pub decoration: Option<String>,
}

impl TypeStyleChoice {
    /// Choice by CSS property name (`font-family`, `letter-spacing`, ...)
    pub fn field(&self, property: &str) -> Option<&str> {
        let value = match property {
            "font-family" => &self.family,
            "font-size" => &self.size,
            "font-weight" => &self.weight,
            "letter-spacing" => &self.letter_spacing,
            "line-height" => &self.line_height,
            "font-style" => &self.style,
            "text-transform" => &self.transform,
            "text-decoration" => &self.decoration,
            _ => return None,
        };
        value.as_deref()
    }
}

/// Slot name (`h1`, `body-1`, ...) -> choices
pub type TypographyChoices = BTreeMap<String, TypeStyleChoice>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_choice_deserializes_kebab_keys() {
        let choice: TypeStyleChoice =
            serde_json::from_str(r#"{"family":"secondary","letter-spacing":"wide"}"#).unwrap();
        assert_eq!(choice.family.as_deref(), Some("secondary"));
        assert_eq!(choice.letter_spacing.as_deref(), Some("wide"));
        assert!(choice.size.is_none());
    }
}
