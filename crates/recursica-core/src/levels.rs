// ABOUTME: The fixed palette scale and level normalization rules
// ABOUTME: 000 has no usable swatch, so color lookups floor it to 050

/// Ordered lightest to darkest
pub const SCALE_LEVELS: [&str; 12] = [
    "000", "050", "100", "200", "300", "400", "500", "600", "700", "800", "900", "1000",
];

/// Search order for a palette's primary level when nothing selects one
pub const PRIMARY_FALLBACK_ORDER: [&str; 10] = [
    "500", "400", "600", "300", "700", "200", "800", "100", "900", "050",
];

pub const PRIMARY_LEVEL: &str = "primary";

/// Map a raw level string onto the fixed scale.
///
/// Accepts exact names and unpadded numbers (`50` -> `050`, `0` -> `000`).
pub fn canonical_level(raw: &str) -> Option<&'static str> {
    let raw = raw.trim();
    if let Some(level) = SCALE_LEVELS.iter().copied().find(|level| *level == raw) {
        return Some(level);
    }
    let number: u32 = raw.parse().ok()?;
    SCALE_LEVELS
        .iter()
        .find(|level| level.parse::<u32>().ok() == Some(number))
        .copied()
}

/// Level used when looking a color up on the scale
pub fn lookup_level(level: &'static str) -> &'static str {
    if level == "000" { "050" } else { level }
}

pub fn level_index(level: &str) -> Option<usize> {
    SCALE_LEVELS.iter().position(|candidate| *candidate == level)
}
