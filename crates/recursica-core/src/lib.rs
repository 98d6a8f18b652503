// ABOUTME: Design-token resolution engine: reference grammar, token index, builders, AA stepping
// ABOUTME: Turns token, brand, and UI-kit JSON into --recursica-* CSS custom properties

pub mod builders;
pub mod color;
pub mod compliance;
pub mod context;
pub mod css;
pub mod engine;
pub mod error;
pub mod levels;
pub mod naming;
pub mod reference;
pub mod resolver;
pub mod schema;
pub mod store;
pub mod token_index;


pub use builders::{
    TypographyBuild, build_dimension_vars, build_layer_vars, build_palette_vars,
    build_token_vars, build_typography_vars, build_ui_kit_vars,
};
pub use color::{Rgb, WCAG_AA_CONTRAST, blended_contrast, contrast_ratio, meets_aa};
pub use compliance::{ComplianceEnforcer, Correction, ScaleStart, find_aa_compliant_color};
pub use context::BuildContext;
pub use css::{CssVarSurface, StyleSurface, write_and_notify};
pub use engine::{CompileOptions, CompiledTheme, SourcePaths, Sources, ThemeEngine};
pub use error::{LookupMiss, SourceError, StoreError};
pub use reference::{RefKind, Reference, parse_reference};
pub use resolver::{Resolver, ThemeAccessor, resolve_brace_ref};
pub use schema::ThemeSource;
pub use store::{KeyValueStore, MemoryStore};
pub use token_index::{Scalar, TokenIndex, TokenOverrides};
