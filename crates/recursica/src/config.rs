// ABOUTME: recursica.toml loading and merging with command-line flags
// ABOUTME: A missing default config file means built-in defaults

use anyhow::{Context, Result, bail};
use recursica_core::SourcePaths;
use recursica_logging::{LoggingConfig, warn};
use recursica_types::{ThemeMode, TypographyChoices};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::cli::Cli;

/// WCAG AA for normal text
pub const DEFAULT_THRESHOLD: f64 = 4.5;

/// Highest ratio two colors can reach
const MAX_CONTRAST: f64 = 21.0;

/// Paths to the three JSON sources
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SourcesConfig {
    pub tokens: Option<PathBuf>,
    pub brand: Option<PathBuf>,
    pub ui_kit: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ThemeConfig {
    pub mode: ThemeMode,
}

/// Contrast corrections run after the build
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ComplianceConfig {
    pub enforce: bool,
    pub threshold: f64,
}

impl Default for ComplianceConfig {
    fn default() -> Self {
        Self {
            enforce: true,
            threshold: DEFAULT_THRESHOLD,
        }
    }
}

impl ComplianceConfig {
    /// Get a copy with the threshold clamped to a ratio contrast can reach
    pub fn sanitized(&self) -> Self {
        let mut config = self.clone();
        if !config.threshold.is_finite() || config.threshold < 1.0 {
            warn!(
                threshold = config.threshold,
                "Invalid contrast threshold, using the AA default"
            );
            config.threshold = DEFAULT_THRESHOLD;
        } else if config.threshold > MAX_CONTRAST {
            warn!(
                threshold = config.threshold,
                "Contrast threshold above 21:1 can never pass, capping"
            );
            config.threshold = MAX_CONTRAST;
        }
        config
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// JSON object of `palette-primary-level:<palette>:<mode>` entries
    pub path: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub sources: SourcesConfig,
    pub theme: ThemeConfig,
    pub compliance: ComplianceConfig,
    pub store: StoreConfig,
    /// Per-slot choices, e.g. `[typography.h1] family = "secondary"`
    pub typography: TypographyChoices,
    pub logging: LoggingConfig,
}

impl Config {
    /// `<config dir>/recursica/recursica.toml`
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("recursica").join("recursica.toml"))
    }

    /// Load `explicit` when given, else the default location if it exists
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::load_from_file(path);
        }
        match Self::default_path() {
            Some(path) if path.exists() => Self::load_from_file(&path),
            _ => Ok(Self::default()),
        }
    }

    pub fn load_from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        toml::from_str(&text).with_context(|| format!("invalid config {}", path.display()))
    }

    /// Command-line flags win over file settings
    pub fn apply_cli(&mut self, cli: &Cli) {
        if let Some(tokens) = &cli.tokens {
            self.sources.tokens = Some(tokens.clone());
        }
        if let Some(brand) = &cli.brand {
            self.sources.brand = Some(brand.clone());
        }
        if let Some(ui_kit) = &cli.ui_kit {
            self.sources.ui_kit = Some(ui_kit.clone());
        }
        if let Some(mode) = cli.mode {
            self.theme.mode = mode;
        }
        if let Some(store) = &cli.store {
            self.store.path = Some(store.clone());
        }
        if cli.no_compliance {
            self.compliance.enforce = false;
        }
        self.logging = self.logging.clone().with_verbosity(cli.verbose);
    }

    /// Tokens and brand are required; the ui-kit source is optional
    pub fn source_paths(&self) -> Result<SourcePaths> {
        let Some(tokens) = self.sources.tokens.clone() else {
            bail!("no tokens source; pass --tokens or set sources.tokens");
        };
        let Some(brand) = self.sources.brand.clone() else {
            bail!("no brand source; pass --brand or set sources.brand");
        };
        Ok(SourcePaths {
            tokens,
            brand,
            ui_kit: self.sources.ui_kit.clone(),
        })
    }
}
