// ABOUTME: Event definitions and buses for decoupled change notification
// ABOUTME: Builders report diagnostics and CSS writes here instead of touching observers directly

pub mod bus;
pub mod event;
pub mod handler;

pub use bus::{BroadcastBus, EventBus, NullBus, RecordingBus};
pub use event::ThemeEvent;
pub use handler::{EventHandler, HandlerError, drain};
