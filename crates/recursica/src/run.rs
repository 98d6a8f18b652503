// ABOUTME: One compile run: load sources, build, apply to a surface, enforce contrast
// ABOUTME: Collects bus diagnostics so they can be reported alongside the output

use anyhow::{Context, Result};
use recursica_core::{
    CompileOptions, ComplianceEnforcer, Correction, MemoryStore, Sources, StyleSurface,
    ThemeEngine, write_and_notify,
};
use recursica_events::{BroadcastBus, EventHandler, HandlerError, ThemeEvent, drain};
use recursica_logging::{debug, info, warn};
use recursica_types::{MissingPaletteRef, ThemeMode};
use serde_json::{Value, json};
use std::collections::BTreeSet;
use std::sync::Arc;

use crate::cli::OutputFormat;
use crate::config::Config;

/// Everything a run produced
#[derive(Debug)]
pub struct Outcome {
    pub mode: ThemeMode,
    pub surface: StyleSurface,
    pub families_to_load: BTreeSet<String>,
    pub corrections: Vec<Correction>,
    pub missing_refs: Vec<MissingPaletteRef>,
}

/// Bus events the run reports on
#[derive(Debug, Default)]
struct Diagnostics {
    missing_refs: Vec<MissingPaletteRef>,
    updated: usize,
}

impl EventHandler for Diagnostics {
    fn handle(&mut self, event: &ThemeEvent) -> Result<(), HandlerError> {
        match event {
            ThemeEvent::MissingLayerPaletteRefs { refs } => {
                self.missing_refs.extend(refs.iter().cloned());
            }
            ThemeEvent::CssVarsUpdated { names } => self.updated += names.len(),
            ThemeEvent::ThemeRebuilt { .. } => {}
        }
        Ok(())
    }
}

pub fn execute(config: &Config) -> Result<Outcome> {
    let paths = config.source_paths()?;
    let sources = Sources::load(&paths).context("failed to load theme sources")?;
    let mode = config.theme.mode;

    let bus = Arc::new(BroadcastBus::default());
    let mut receiver = bus.subscribe();
    let mut engine = ThemeEngine::new().with_events(bus.clone());

    if let Some(path) = &config.store.path {
        // An unreadable store only loses remembered primary levels
        match MemoryStore::from_json_file(path) {
            Ok(store) => {
                debug!(path = %path.display(), entries = store.len(), "Loaded primary-level store");
                engine = engine.with_store(Arc::new(store));
            }
            Err(error) => warn!(%error, "Ignoring primary-level store"),
        }
    }

    let mut options = CompileOptions::for_mode(mode);
    if !config.typography.is_empty() {
        options.typography_choices = Some(config.typography.clone());
    }
    let compiled = engine.compile(&sources, &options);

    let mut surface = StyleSurface::new();
    write_and_notify(&mut surface, engine.events(), &compiled.vars);

    let corrections = if config.compliance.enforce {
        let compliance = config.compliance.sanitized();
        ComplianceEnforcer::new(&sources.tokens, &sources.theme, mode)
            .with_threshold(compliance.threshold)
            .apply(&mut surface, engine.events())
    } else {
        debug!("Contrast enforcement disabled");
        Vec::new()
    };

    let mut diagnostics = Diagnostics::default();
    drain(&mut receiver, &mut diagnostics).context("failed to collect theme diagnostics")?;

    info!(
        mode = %mode,
        vars = surface.len(),
        updated = diagnostics.updated,
        corrections = corrections.len(),
        missing_refs = diagnostics.missing_refs.len(),
        "Run finished"
    );

    Ok(Outcome {
        mode,
        surface,
        families_to_load: compiled.families_to_load,
        corrections,
        missing_refs: diagnostics.missing_refs,
    })
}

impl Outcome {
    pub fn render(&self, format: OutputFormat) -> Result<String> {
        match format {
            OutputFormat::Css => Ok(self.surface.to_css(":root")),
            OutputFormat::Json => {
                serde_json::to_string_pretty(&self.to_json()).context("failed to encode output")
            }
        }
    }

    fn to_json(&self) -> Value {
        let corrections: Vec<Value> = self
            .corrections
            .iter()
            .map(|c| json!({ "name": c.name, "from": c.from, "to": c.to }))
            .collect();
        json!({
            "mode": self.mode,
            "vars": self.surface.vars(),
            "familiesToLoad": self.families_to_load,
            "corrections": corrections,
            "missingLayerPaletteRefs": self.missing_refs,
        })
    }
}
