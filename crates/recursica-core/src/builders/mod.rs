// ABOUTME: Builders that turn tokens and a brand theme into CSS variable maps
// ABOUTME: Free functions here are the plain entry points; engine.rs sequences them

pub mod dimension;
pub mod layer;
pub mod palette;
pub mod tokens;
pub mod typography;
pub mod ui_kit;
pub(crate) mod values;

use recursica_types::{CssVarMap, ThemeMode, TypographyChoices};
use serde_json::Value;

use crate::context::BuildContext;
use crate::schema::ThemeSource;
use crate::token_index::{TokenIndex, TokenOverrides};

pub use typography::TypographyBuild;

pub fn build_token_vars(tokens: &TokenIndex) -> CssVarMap {
    tokens::build(tokens)
}

pub fn build_palette_vars(tokens: &TokenIndex, theme: &ThemeSource, mode: ThemeMode) -> CssVarMap {
    palette::build(&BuildContext::new(tokens, theme, mode))
}

pub fn build_layer_vars(
    tokens: &TokenIndex,
    theme: &ThemeSource,
    mode: ThemeMode,
    overrides: Option<&TokenOverrides>,
    palette_vars: Option<&CssVarMap>,
) -> CssVarMap {
    layer::build(&BuildContext::new(tokens, theme, mode), overrides, palette_vars)
}

pub fn build_dimension_vars(tokens: &TokenIndex, theme: &ThemeSource, mode: ThemeMode) -> CssVarMap {
    dimension::build(&BuildContext::new(tokens, theme, mode))
}

/// Typography is mode-independent; brand references resolve against light
pub fn build_typography_vars(
    tokens: &TokenIndex,
    theme: &ThemeSource,
    overrides: Option<&TokenOverrides>,
    choices: Option<&TypographyChoices>,
) -> TypographyBuild {
    typography::build(
        &BuildContext::new(tokens, theme, ThemeMode::Light),
        overrides,
        choices,
    )
}

pub fn build_ui_kit_vars(
    tokens: &TokenIndex,
    theme: &ThemeSource,
    ui_kit: &Value,
    mode: ThemeMode,
) -> CssVarMap {
    ui_kit::build(&BuildContext::new(tokens, theme, mode), ui_kit)
}
