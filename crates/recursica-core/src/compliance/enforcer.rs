// ABOUTME: Checks built foregrounds against their surfaces on a live CSS surface and plans fixes
// ABOUTME: Every correction is computed before the first write; writes go out in one batch

use recursica_events::EventBus;
use recursica_logging::{debug, info, instrument};
use recursica_types::{CssVarMap, ThemeMode};

use crate::builders::layer::property;
use crate::builders::values::normalize_opacity;
use crate::color::{Rgb, WCAG_AA_CONTRAST, blended_contrast, contrast_ratio};
use crate::compliance::stepper::{AaStepper, CoreFallback, ScaleStart};
use crate::css::{CssVarSurface, write_and_notify};
use crate::levels::{PRIMARY_LEVEL, SCALE_LEVELS};
use crate::naming::{ToneRole, core_var, layer_var, palette_var};
use crate::schema::ThemeSource;
use crate::token_index::TokenIndex;

/// One planned variable rewrite
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Correction {
    pub name: String,
    pub from: Option<String>,
    pub to: String,
}

pub struct ComplianceEnforcer<'a> {
    tokens: &'a TokenIndex,
    theme: &'a ThemeSource,
    mode: ThemeMode,
    threshold: f64,
}

impl<'a> ComplianceEnforcer<'a> {
    pub fn new(tokens: &'a TokenIndex, theme: &'a ThemeSource, mode: ThemeMode) -> Self {
        Self {
            tokens,
            theme,
            mode,
            threshold: WCAG_AA_CONTRAST,
        }
    }

    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }

    /// Corrections needed on `surface`, in the order they were found.
    ///
    /// Palette on-tones are fixed first; layer checks then see those fixes.
    #[instrument(level = "debug", skip_all, fields(mode = %self.mode))]
    pub fn plan(&self, surface: &dyn CssVarSurface) -> Vec<Correction> {
        let mut pending = Pending::new(surface);
        let fallback = self.core_fallback(&pending);

        self.plan_on_tones(&mut pending, &fallback);

        let stepper = AaStepper::new(self.tokens, self.mode)
            .with_fallback(fallback)
            .with_threshold(self.threshold);
        self.plan_layers(&mut pending, &stepper);

        pending.corrections
    }

    /// Plan, then write every correction and broadcast the changed names once
    pub fn apply(&self, surface: &mut dyn CssVarSurface, events: &dyn EventBus) -> Vec<Correction> {
        let corrections = self.plan(surface);
        if corrections.is_empty() {
            debug!(mode = %self.mode, "All foregrounds pass contrast");
            return corrections;
        }

        let updates: CssVarMap = corrections
            .iter()
            .map(|correction| (correction.name.clone(), correction.to.clone()))
            .collect();
        let changed = write_and_notify(surface, events, &updates);
        info!(mode = %self.mode, corrected = changed.len(), "Applied contrast corrections");
        corrections
    }

    fn core_fallback(&self, surface: &dyn CssVarSurface) -> CoreFallback {
        let core = |name: &str| {
            surface
                .resolve(&core_var(self.mode, name))
                .and_then(|value| Rgb::parse(&value))
        };
        CoreFallback::for_mode(self.mode).with_colors(
            core("white").unwrap_or(Rgb::WHITE),
            core("black").unwrap_or(Rgb::BLACK),
        )
    }

    fn plan_on_tones(&self, pending: &mut Pending<'_>, fallback: &CoreFallback) {
        for key in self.theme.palette_keys() {
            // Primary last, so it sees corrections made to the level it aliases
            for level in SCALE_LEVELS.into_iter().chain([PRIMARY_LEVEL]) {
                let on_tone_name = palette_var(self.mode, key, level, ToneRole::OnTone);
                let tone = hex(pending, &palette_var(self.mode, key, level, ToneRole::Tone));
                let on_tone = hex(pending, &on_tone_name);
                let (Some(tone), Some(on_tone)) = (tone, on_tone) else {
                    continue;
                };

                let ratio = contrast_ratio(on_tone, tone);
                if ratio >= self.threshold {
                    continue;
                }

                let to = if contrast_ratio(fallback.white, tone) >= contrast_ratio(fallback.black, tone) {
                    &fallback.white_var
                } else {
                    &fallback.black_var
                };
                debug!(palette = key, level, ratio, to = %to, "On-tone fails contrast");
                pending.correct(&on_tone_name, to);
            }
        }
    }

    fn plan_layers(&self, pending: &mut Pending<'_>, stepper: &AaStepper<'_>) {
        for layer in self.theme.layers(self.mode) {
            let name = |prop: &str| layer_var(self.mode, &layer.key, prop);

            let Some(surface_hex) = pending.resolve(&name(property::SURFACE)) else {
                continue;
            };
            let Some(surface) = Rgb::parse(&surface_hex) else {
                debug!(layer = %layer.key, surface = %surface_hex, "Layer surface is not a color");
                continue;
            };
            let emphasis = pending
                .resolve(&name(property::TEXT_HIGH_EMPHASIS))
                .and_then(|value| value.trim().parse::<f64>().ok())
                .map(normalize_opacity)
                .unwrap_or(1.0);

            let roles = [
                (property::TEXT_COLOR, emphasis),
                (property::TEXT_ALERT, emphasis),
                (property::TEXT_WARNING, emphasis),
                (property::TEXT_SUCCESS, emphasis),
                (property::INTERACTIVE_TONE, 1.0),
            ];
            for (prop, opacity) in roles {
                let foreground_name = name(prop);
                let Some(foreground) = hex(pending, &foreground_name) else {
                    continue;
                };
                let ratio = blended_contrast(foreground, surface, opacity);
                if ratio >= self.threshold {
                    continue;
                }

                let start = pending
                    .var_chain(&foreground_name)
                    .iter()
                    .find_map(|link| ScaleStart::from_token_var(link));
                match stepper.find(&surface_hex, start.as_ref(), opacity) {
                    Some(to) => {
                        debug!(layer = %layer.key, property = prop, ratio, to = %to, "Foreground fails contrast");
                        pending.correct(&foreground_name, &to);
                    }
                    None => debug!(layer = %layer.key, property = prop, "No readable replacement"),
                }
            }
        }
    }
}

fn hex(surface: &dyn CssVarSurface, name: &str) -> Option<Rgb> {
    surface.resolve(name).and_then(|value| Rgb::parse(&value))
}

/// A read-through view of a surface with planned corrections layered on top
struct Pending<'s> {
    base: &'s dyn CssVarSurface,
    overlay: CssVarMap,
    corrections: Vec<Correction>,
}

impl<'s> Pending<'s> {
    fn new(base: &'s dyn CssVarSurface) -> Self {
        Self {
            base,
            overlay: CssVarMap::new(),
            corrections: Vec::new(),
        }
    }

    fn correct(&mut self, name: &str, to: &str) {
        let from = self.get(name);
        if from.as_deref() == Some(to) {
            return;
        }
        self.overlay.insert(name.to_string(), to.to_string());
        match self.corrections.iter_mut().find(|c| c.name == name) {
            Some(existing) => existing.to = to.to_string(),
            None => self.corrections.push(Correction {
                name: name.to_string(),
                from,
                to: to.to_string(),
            }),
        }
    }
}

impl CssVarSurface for Pending<'_> {
    fn get(&self, name: &str) -> Option<String> {
        self.overlay
            .get(name)
            .cloned()
            .or_else(|| self.base.get(name))
    }

    fn set(&mut self, name: &str, value: &str) -> bool {
        let changed = self.get(name).as_deref() != Some(value);
        self.correct(name, value);
        changed
    }
}
