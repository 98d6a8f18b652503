// ABOUTME: Payloads for non-fatal build diagnostics
// ABOUTME: Carried by the missingLayerPaletteRefs notification

use crate::mode::ThemeMode;
use serde::{Deserialize, Serialize};

/// A layer property whose color could not be expressed as a palette variable
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MissingPaletteRef {
    pub mode: ThemeMode,
    /// Layer key as emitted, e.g. `layer-1` or `layer-alternative-floating`
    pub layer: String,
    pub property: String,
    /// The literal that was emitted in place of a reference
    pub value: String,
}
