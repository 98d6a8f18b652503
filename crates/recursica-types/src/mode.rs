// ABOUTME: Theme mode selection shared by every builder
// ABOUTME: Light and dark are the only modes a brand theme may define

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Which per-mode subtree of the brand theme is being compiled
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemeMode {
    #[default]
    Light,
    Dark,
}

impl ThemeMode {
    pub const ALL: [ThemeMode; 2] = [ThemeMode::Light, ThemeMode::Dark];

    pub fn as_str(self) -> &'static str {
        match self {
            ThemeMode::Light => "light",
            ThemeMode::Dark => "dark",
        }
    }

    /// Case-insensitive match against a path segment such as `Light` or `dark`.
    pub fn from_segment(segment: &str) -> Option<Self> {
        if segment.eq_ignore_ascii_case("light") {
            Some(ThemeMode::Light)
        } else if segment.eq_ignore_ascii_case("dark") {
            Some(ThemeMode::Dark)
        } else {
            None
        }
    }
}

impl fmt::Display for ThemeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ThemeMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ThemeMode::from_segment(s.trim()).ok_or_else(|| format!("unknown theme mode '{s}'"))
    }
}
