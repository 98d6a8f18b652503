// ABOUTME: Loads the three JSON sources and runs every builder in dependency order for one mode
// ABOUTME: Earlier builders win name collisions; each run ends with a themeRebuilt event

use recursica_events::{EventBus, NullBus, ThemeEvent};
use recursica_logging::{info, instrument, timed};
use recursica_types::{CssVarMap, ThemeMode, TypographyChoices};
use serde_json::Value;
use std::borrow::Cow;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::builders::values::merge_missing;
use crate::builders::{dimension, layer, palette, tokens, typography, ui_kit};
use crate::context::BuildContext;
use crate::css::CssVarSurface;
use crate::error::SourceError;
use crate::schema::ThemeSource;
use crate::store::KeyValueStore;
use crate::token_index::{TokenIndex, TokenOverrides};

/// Where the three sources live on disk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourcePaths {
    pub tokens: PathBuf,
    pub brand: PathBuf,
    pub ui_kit: Option<PathBuf>,
}

/// Parsed and indexed inputs, reusable across modes
#[derive(Debug, Clone, Default)]
pub struct Sources {
    pub tokens: TokenIndex,
    pub theme: ThemeSource,
    pub ui_kit: Option<Value>,
}

impl Sources {
    pub fn from_values(tokens: &Value, brand: Value, ui_kit: Option<Value>) -> Self {
        Self {
            tokens: TokenIndex::build(tokens),
            theme: ThemeSource::from_value(brand),
            ui_kit,
        }
    }

    pub fn load(paths: &SourcePaths) -> Result<Self, SourceError> {
        let tokens = read_json("tokens", &paths.tokens)?;
        let brand = read_json("brand", &paths.brand)?;
        let ui_kit = paths
            .ui_kit
            .as_deref()
            .map(|path| read_json("ui-kit", path))
            .transpose()?;

        let sources = Self::from_values(&tokens, brand, ui_kit);
        info!(
            tokens = sources.tokens.len(),
            layers = sources.theme.layers(ThemeMode::Light).len(),
            ui_kit = sources.ui_kit.is_some(),
            "Loaded theme sources"
        );
        Ok(sources)
    }
}

fn read_json(kind: &'static str, path: &Path) -> Result<Value, SourceError> {
    let text = std::fs::read_to_string(path).map_err(|source| SourceError::Io {
        kind,
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&text).map_err(|source| SourceError::Parse {
        kind,
        path: path.to_path_buf(),
        source,
    })
}

#[derive(Debug, Clone, Default)]
pub struct CompileOptions {
    pub mode: ThemeMode,
    pub typography_choices: Option<TypographyChoices>,
    /// Token edits applied before any builder runs
    pub token_overrides: Option<TokenOverrides>,
}

impl CompileOptions {
    pub fn for_mode(mode: ThemeMode) -> Self {
        Self {
            mode,
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CompiledTheme {
    pub mode: ThemeMode,
    pub vars: CssVarMap,
    pub families_to_load: BTreeSet<String>,
}

/// Runs the builders with the injected store and event bus
pub struct ThemeEngine {
    store: Option<Arc<dyn KeyValueStore>>,
    events: Arc<dyn EventBus + Send + Sync>,
}

impl Default for ThemeEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl ThemeEngine {
    pub fn new() -> Self {
        Self {
            store: None,
            events: Arc::new(NullBus),
        }
    }

    pub fn with_store(mut self, store: Arc<dyn KeyValueStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn with_events(mut self, events: Arc<dyn EventBus + Send + Sync>) -> Self {
        self.events = events;
        self
    }

    pub fn events(&self) -> &dyn EventBus {
        self.events.as_ref()
    }

    pub fn compile(&self, sources: &Sources, options: &CompileOptions) -> CompiledTheme {
        self.run(sources, options, None)
    }

    /// Compile while letting the layer builder read on-tones already on `surface`
    pub fn compile_against(
        &self,
        sources: &Sources,
        options: &CompileOptions,
        surface: &dyn CssVarSurface,
    ) -> CompiledTheme {
        self.run(sources, options, Some(surface))
    }

    #[instrument(skip_all, fields(mode = %options.mode))]
    fn run(
        &self,
        sources: &Sources,
        options: &CompileOptions,
        surface: Option<&dyn CssVarSurface>,
    ) -> CompiledTheme {
        let mode = options.mode;
        let token_index = match options.token_overrides.as_ref() {
            Some(overrides) if !overrides.is_empty() => {
                Cow::Owned(sources.tokens.with_overrides(overrides))
            }
            _ => Cow::Borrowed(&sources.tokens),
        };

        let mut ctx = BuildContext::new(&token_index, &sources.theme, mode)
            .with_events(self.events.as_ref());
        if let Some(store) = self.store.as_deref() {
            ctx = ctx.with_store(store);
        }
        if let Some(surface) = surface {
            ctx = ctx.with_surface(surface);
        }

        let mut vars = timed!("token_vars", { tokens::build(&token_index) });
        let palette_vars = timed!("palette_vars", { palette::build(&ctx) });
        let layer_vars = timed!("layer_vars", {
            layer::build(&ctx, None, Some(&palette_vars))
        });
        merge_missing(&mut vars, palette_vars);
        merge_missing(&mut vars, layer_vars);
        merge_missing(&mut vars, timed!("dimension_vars", { dimension::build(&ctx) }));

        let typography = timed!("typography_vars", {
            typography::build(&ctx, None, options.typography_choices.as_ref())
        });
        merge_missing(&mut vars, typography.vars);

        if let Some(kit) = &sources.ui_kit {
            merge_missing(&mut vars, timed!("ui_kit_vars", { ui_kit::build(&ctx, kit) }));
        }

        info!(
            mode = %mode,
            vars = vars.len(),
            families = typography.families_to_load.len(),
            "Theme compiled"
        );
        self.events.dispatch(ThemeEvent::ThemeRebuilt {
            mode,
            var_count: vars.len(),
        });

        CompiledTheme {
            mode,
            vars,
            families_to_load: typography.families_to_load,
        }
    }
}
