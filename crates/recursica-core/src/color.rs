// ABOUTME: Hex color parsing, alpha blending, and WCAG relative-luminance contrast
// ABOUTME: Channels stay in f64 until formatted so repeated blends do not drift

/// WCAG 2.1 AA minimum for normal text
pub const WCAG_AA_CONTRAST: f64 = 4.5;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgb {
    pub r: f64,
    pub g: f64,
    pub b: f64,
}

impl Rgb {
    pub const BLACK: Rgb = Rgb::new(0.0, 0.0, 0.0);
    pub const WHITE: Rgb = Rgb::new(255.0, 255.0, 255.0);

    pub const fn new(r: f64, g: f64, b: f64) -> Self {
        Self { r, g, b }
    }

    /// Parse `#rgb`, `#rrggbb`, or `#rrggbbaa` (alpha ignored).
    /// `black` and `white` are accepted since brand files use them for core colors.
    pub fn parse(input: &str) -> Option<Self> {
        let input = input.trim();
        if input.eq_ignore_ascii_case("black") {
            return Some(Self::BLACK);
        }
        if input.eq_ignore_ascii_case("white") {
            return Some(Self::WHITE);
        }

        let hex = input.strip_prefix('#')?;
        if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return None;
        }

        let channel = |digits: &str| u8::from_str_radix(digits, 16).ok().map(f64::from);
        let short = |c: char| c.to_digit(16).map(|d| f64::from(d * 17));

        match hex.len() {
            3 => {
                let mut chars = hex.chars();
                Some(Self::new(
                    short(chars.next()?)?,
                    short(chars.next()?)?,
                    short(chars.next()?)?,
                ))
            }
            6 | 8 => Some(Self::new(
                channel(&hex[0..2])?,
                channel(&hex[2..4])?,
                channel(&hex[4..6])?,
            )),
            _ => None,
        }
    }

    pub fn to_hex(self) -> String {
        let clamp = |c: f64| c.round().clamp(0.0, 255.0) as u8;
        format!(
            "#{:02x}{:02x}{:02x}",
            clamp(self.r),
            clamp(self.g),
            clamp(self.b)
        )
    }

    /// Composite `self` at `opacity` over an opaque `background`.
    pub fn blend_over(self, background: Rgb, opacity: f64) -> Rgb {
        let alpha = if opacity.is_nan() {
            1.0
        } else {
            opacity.clamp(0.0, 1.0)
        };
        let mix = |fg: f64, bg: f64| fg * alpha + bg * (1.0 - alpha);
        Rgb::new(
            mix(self.r, background.r),
            mix(self.g, background.g),
            mix(self.b, background.b),
        )
    }

    pub fn relative_luminance(self) -> f64 {
        0.2126 * srgb_to_linear(self.r / 255.0)
            + 0.7152 * srgb_to_linear(self.g / 255.0)
            + 0.0722 * srgb_to_linear(self.b / 255.0)
    }
}

fn srgb_to_linear(c: f64) -> f64 {
    if c <= 0.03928 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}

pub fn contrast_ratio(a: Rgb, b: Rgb) -> f64 {
    let la = a.relative_luminance();
    let lb = b.relative_luminance();
    let lighter = la.max(lb);
    let darker = la.min(lb);
    (lighter + 0.05) / (darker + 0.05)
}

/// Contrast of `foreground` blended at `opacity` against `background`.
pub fn blended_contrast(foreground: Rgb, background: Rgb, opacity: f64) -> f64 {
    contrast_ratio(foreground.blend_over(background, opacity), background)
}

pub fn meets_aa(foreground: Rgb, background: Rgb, opacity: f64) -> bool {
    blended_contrast(foreground, background, opacity) >= WCAG_AA_CONTRAST
}
