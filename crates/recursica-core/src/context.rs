// ABOUTME: Inputs shared by every builder for one mode: tokens, theme, and injected side channels
// ABOUTME: The store, live surface, and event bus are optional and never owned here

use recursica_events::{EventBus, ThemeEvent};
use recursica_logging::debug;
use recursica_types::{ThemeMode, var_ref};
use serde_json::Value;

use crate::color::Rgb;
use crate::css::CssVarSurface;
use crate::error::LookupMiss;
use crate::levels::{PRIMARY_LEVEL, SCALE_LEVELS};
use crate::naming::{core_var, reference_var};
use crate::reference::{RefKind, Reference, parse_reference};
use crate::resolver::{COLOR_DEPTH_LIMIT, Resolver};
use crate::schema::{ThemeSource, ThemeView};
use crate::store::KeyValueStore;
use crate::token_index::{Scalar, TokenIndex};

#[derive(Clone, Copy)]
pub struct BuildContext<'a> {
    pub tokens: &'a TokenIndex,
    pub theme: &'a ThemeSource,
    pub mode: ThemeMode,
    view: ThemeView<'a>,
    store: Option<&'a dyn KeyValueStore>,
    surface: Option<&'a dyn CssVarSurface>,
    events: Option<&'a dyn EventBus>,
}

impl<'a> BuildContext<'a> {
    pub fn new(tokens: &'a TokenIndex, theme: &'a ThemeSource, mode: ThemeMode) -> Self {
        Self {
            tokens,
            theme,
            mode,
            view: theme.view(mode),
            store: None,
            surface: None,
            events: None,
        }
    }

    pub fn with_store(mut self, store: &'a dyn KeyValueStore) -> Self {
        self.store = Some(store);
        self
    }

    pub fn with_surface(mut self, surface: &'a dyn CssVarSurface) -> Self {
        self.surface = Some(surface);
        self
    }

    pub fn with_events(mut self, events: &'a dyn EventBus) -> Self {
        self.events = Some(events);
        self
    }

    /// Same side channels over a different token index
    pub fn with_tokens<'b>(&self, tokens: &'b TokenIndex) -> BuildContext<'b>
    where
        'a: 'b,
    {
        BuildContext {
            tokens,
            theme: self.theme,
            mode: self.mode,
            view: self.view,
            store: self.store,
            surface: self.surface,
            events: self.events,
        }
    }

    pub fn store(&self) -> Option<&'a dyn KeyValueStore> {
        self.store
    }

    pub fn surface(&self) -> Option<&'a dyn CssVarSurface> {
        self.surface
    }

    pub fn resolver(&self) -> Resolver<'_> {
        Resolver::new(self.tokens).with_theme(&self.view)
    }

    pub fn resolve(&self, value: &Value) -> Result<Scalar, LookupMiss> {
        self.resolver().resolve(value)
    }

    pub fn resolve_hex(&self, value: &Value) -> Result<Rgb, LookupMiss> {
        self.resolver().resolve_hex(value)
    }

    /// `var()` for a value that is a reference we emit a variable for
    pub fn reference_var(&self, value: &Value) -> Option<String> {
        let text = leaf_text(value)?;
        let reference = parse_reference(text)?;
        self.var_for(&reference)
    }

    /// `var()` for `reference`, only when its target ends in a value.
    ///
    /// Core black and white are always emitted, so they need no lookup.
    pub fn var_for(&self, reference: &Reference) -> Option<String> {
        let var = reference_var(reference, self.mode, self.tokens)?;
        let mode = reference.mode.unwrap_or(self.mode);
        let always_emitted = ["black", "white"]
            .into_iter()
            .any(|name| var == var_ref(&core_var(mode, name)));
        if always_emitted || self.resolves(reference) {
            Some(var)
        } else {
            debug!(reference = %reference, "Reference target does not resolve");
            None
        }
    }

    /// Whether `reference` follows through to a terminal value
    pub fn resolves(&self, reference: &Reference) -> bool {
        if let Some(palette) = primary_palette(reference) {
            return self.has_tone(palette, reference.mode.unwrap_or(self.mode));
        }
        self.resolver()
            .with_limit(COLOR_DEPTH_LIMIT)
            .resolve_reference(reference)
            .is_ok()
    }

    /// A palette's primary level exists once any of its levels has a color tone
    fn has_tone(&self, palette: &str, mode: ThemeMode) -> bool {
        let Some(palette) = self.theme.palette(mode, palette) else {
            return false;
        };
        SCALE_LEVELS.into_iter().any(|level| {
            palette
                .level(level)
                .and_then(|entry| entry.tone.as_ref())
                .is_some_and(|tone| self.resolve_hex(tone).is_ok())
        })
    }

    pub fn dispatch(&self, event: ThemeEvent) {
        if let Some(events) = self.events {
            events.dispatch(event);
        }
    }
}

/// `{brand.palettes.<p>.primary...}` -> p
fn primary_palette(reference: &Reference) -> Option<&str> {
    if reference.kind != RefKind::Brand {
        return None;
    }
    match reference.path.as_slice() {
        [head, palette, level, ..]
            if (head == "palettes" || head == "palette")
                && level == PRIMARY_LEVEL
                && palette != "core"
                && palette != "core-colors" =>
        {
            Some(palette.as_str())
        }
        _ => None,
    }
}

/// The string inside a leaf, unwrapping `$value`/`value`
pub fn leaf_text(value: &Value) -> Option<&str> {
    match value {
        Value::String(text) => Some(text.as_str()),
        Value::Object(map) => map
            .get("$value")
            .or_else(|| map.get("value"))
            .and_then(leaf_text),
        _ => None,
    }
}
