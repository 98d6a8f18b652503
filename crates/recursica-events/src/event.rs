// ABOUTME: Theme-level events emitted by the compiler and the CSS surface
// ABOUTME: Names mirror the custom notification events external collaborators listen for

use recursica_types::{MissingPaletteRef, ThemeMode};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ThemeEvent {
    /// One or more custom properties on the live surface changed value
    CssVarsUpdated { names: Vec<String> },

    /// Layer surfaces that were emitted as literals instead of palette references
    MissingLayerPaletteRefs { refs: Vec<MissingPaletteRef> },

    /// A full rebuild finished for `mode`
    ThemeRebuilt { mode: ThemeMode, var_count: usize },
}

impl ThemeEvent {
    /// The notification name external listeners subscribe to
    pub fn name(&self) -> &'static str {
        match self {
            ThemeEvent::CssVarsUpdated { .. } => "cssVarsUpdated",
            ThemeEvent::MissingLayerPaletteRefs { .. } => "missingLayerPaletteRefs",
            ThemeEvent::ThemeRebuilt { .. } => "themeRebuilt",
        }
    }
}
