// ABOUTME: Walks a color token scale outward from a starting level to find an AA-readable foreground
// ABOUTME: Falls back to core white or black when no scale level reaches the threshold

use recursica_logging::{debug, trace};
use recursica_types::{ThemeMode, var_ref};

use crate::color::{Rgb, WCAG_AA_CONTRAST, blended_contrast};
use crate::levels::{SCALE_LEVELS, canonical_level, level_index, lookup_level};
use crate::naming::{core_var, token_var};
use crate::reference::{Reference, parse_reference};
use crate::resolver::Resolver;
use crate::token_index::TokenIndex;

/// Where on a color scale the search starts
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScaleStart {
    pub family: String,
    /// As written; validated when the search runs
    pub level: String,
}

impl ScaleStart {
    pub fn new(family: impl Into<String>, level: impl Into<String>) -> Self {
        Self {
            family: family.into(),
            level: level.into(),
        }
    }

    /// From a color token variable name or `var()` reference,
    /// e.g. `var(--recursica-tokens-color-gray-500)`
    pub fn from_token_var(value: &str) -> Option<Self> {
        let value = value.trim();
        let reference = if value.starts_with("var(") {
            parse_reference(value)
        } else {
            parse_reference(&format!("var({value})"))
        }?;
        if !reference.is_token() {
            return None;
        }
        match reference.path.as_slice() {
            [category, family, level] if category == "color" || category == "colors" => {
                Some(Self::new(family.as_str(), level.as_str()))
            }
            _ => None,
        }
    }
}

/// Core colors used when no scale level passes
#[derive(Debug, Clone, PartialEq)]
pub struct CoreFallback {
    pub white_var: String,
    pub black_var: String,
    pub white: Rgb,
    pub black: Rgb,
}

impl CoreFallback {
    pub fn for_mode(mode: ThemeMode) -> Self {
        Self {
            white_var: var_ref(&core_var(mode, "white")),
            black_var: var_ref(&core_var(mode, "black")),
            white: Rgb::WHITE,
            black: Rgb::BLACK,
        }
    }

    /// Use the theme's actual core colors for contrast checks
    pub fn with_colors(mut self, white: Rgb, black: Rgb) -> Self {
        self.white = white;
        self.black = black;
        self
    }

    /// White when it passes, else black when it passes, else the higher contrast.
    /// Ties go to white.
    fn pick(&self, surface: Rgb, opacity: f64, threshold: f64) -> &str {
        let white = blended_contrast(self.white, surface, opacity);
        let black = blended_contrast(self.black, surface, opacity);
        if white >= threshold {
            &self.white_var
        } else if black >= threshold || black > white {
            &self.black_var
        } else {
            &self.white_var
        }
    }
}

pub struct AaStepper<'a> {
    tokens: &'a TokenIndex,
    fallback: CoreFallback,
    threshold: f64,
}

impl<'a> AaStepper<'a> {
    pub fn new(tokens: &'a TokenIndex, mode: ThemeMode) -> Self {
        Self {
            tokens,
            fallback: CoreFallback::for_mode(mode),
            threshold: WCAG_AA_CONTRAST,
        }
    }

    pub fn with_fallback(mut self, fallback: CoreFallback) -> Self {
        self.fallback = fallback;
        self
    }

    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// A `var()` for a foreground that reads on `surface_hex` at `opacity`.
    ///
    /// Returns `None` when the surface is not a color or `start` names a level
    /// that is not on the scale. Otherwise always returns something: a scale
    /// level when one passes, else a core color.
    pub fn find(&self, surface_hex: &str, start: Option<&ScaleStart>, opacity: f64) -> Option<String> {
        let Some(surface) = Rgb::parse(surface_hex) else {
            debug!(surface = surface_hex, "Surface is not a color");
            return None;
        };

        if let Some(start) = start {
            let Some(level) = canonical_level(&start.level) else {
                debug!(family = %start.family, level = %start.level, "Start level is not on the scale");
                return None;
            };
            if let Some(found) = self.step(&start.family, lookup_level(level), surface, opacity) {
                return Some(found);
            }
        }

        let picked = self.fallback.pick(surface, opacity, self.threshold);
        debug!(surface = surface_hex, fallback = picked, "No scale level passed, using core color");
        Some(picked.to_string())
    }

    /// Lighter levels nearest first, then darker
    fn step(&self, family: &str, level: &'static str, surface: Rgb, opacity: f64) -> Option<String> {
        let index = level_index(level)?;
        let lighter = SCALE_LEVELS[..index].iter().rev();
        let darker = SCALE_LEVELS[index + 1..].iter();

        lighter
            .chain(darker)
            .filter(|candidate| **candidate != "000")
            .find_map(|candidate| {
                let color = self.level_color(family, candidate)?;
                let ratio = blended_contrast(color, surface, opacity);
                trace!(family, level = *candidate, ratio, "Checked scale level");
                (ratio >= self.threshold).then(|| self.level_var(family, candidate))
            })
    }

    fn level_color(&self, family: &str, level: &str) -> Option<Rgb> {
        let scalar = Resolver::new(self.tokens)
            .resolve_reference(&Reference::token(["color", family, level]))
            .ok()?;
        Rgb::parse(&scalar.to_string())
    }

    fn level_var(&self, family: &str, level: &str) -> String {
        let path = format!("color/{family}/{level}");
        let key = self.tokens.canonical_path(&path).unwrap_or(&path);
        var_ref(&token_var(key))
    }
}

/// One-shot search with the default AA threshold and pure black/white fallbacks
pub fn find_aa_compliant_color(
    surface_hex: &str,
    start: Option<&ScaleStart>,
    opacity: f64,
    tokens: &TokenIndex,
    mode: ThemeMode,
) -> Option<String> {
    AaStepper::new(tokens, mode).find(surface_hex, start, opacity)
}
