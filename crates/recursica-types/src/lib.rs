// ABOUTME: Pure data types with no cross-crate dependencies
// ABOUTME: Foundation layer for all other recursica crates

pub mod css;
pub mod diagnostics;
pub mod mode;
pub mod typography;

pub use css::{CssVarMap, VAR_PREFIX, var_ref, var_target};
pub use diagnostics::MissingPaletteRef;
pub use mode::ThemeMode;
pub use typography::{TypeStyleChoice, TypographyChoices};
