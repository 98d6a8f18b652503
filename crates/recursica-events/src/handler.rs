// ABOUTME: Event handler trait and a pump that drains a broadcast receiver into it
// ABOUTME: Lagged receivers skip ahead and keep going rather than failing

use crate::event::ThemeEvent;
use tokio::sync::broadcast::{Receiver, error::TryRecvError};
use tracing::warn;

/// Receives theme events drained from a bus subscription
pub trait EventHandler {
    fn handle(&mut self, event: &ThemeEvent) -> Result<(), HandlerError>;
}

impl<F> EventHandler for F
where
    F: FnMut(&ThemeEvent) -> Result<(), HandlerError>,
{
    fn handle(&mut self, event: &ThemeEvent) -> Result<(), HandlerError> {
        self(event)
    }
}

/// Event handler error types
#[derive(Debug, thiserror::Error)]
pub enum HandlerError {
    #[error("Handler failed to process {event}: {message}")]
    ProcessingFailed { event: &'static str, message: String },

    #[error("Handler internal error: {source}")]
    Internal {
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

/// Deliver every pending event on `receiver` to `handler`.
///
/// Returns how many events were handled. Stops at the first handler error.
pub fn drain(
    receiver: &mut Receiver<ThemeEvent>,
    handler: &mut dyn EventHandler,
) -> Result<usize, HandlerError> {
    let mut handled = 0;
    loop {
        match receiver.try_recv() {
            Ok(event) => {
                handler.handle(&event)?;
                handled += 1;
            }
            Err(TryRecvError::Lagged(skipped)) => {
                warn!(skipped, "Theme event subscriber lagged behind");
            }
            Err(TryRecvError::Empty) | Err(TryRecvError::Closed) => return Ok(handled),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bus::{BroadcastBus, EventBus};

    #[test]
    fn test_drain_collects_pending_events() {
        let bus = BroadcastBus::default();
        let mut receiver = bus.subscribe();
        bus.dispatch(ThemeEvent::CssVarsUpdated {
            names: vec!["--a".into(), "--b".into()],
        });
        bus.dispatch(ThemeEvent::CssVarsUpdated {
            names: vec!["--c".into()],
        });

        let mut seen = Vec::new();
        let mut handler = |event: &ThemeEvent| -> Result<(), HandlerError> {
            if let ThemeEvent::CssVarsUpdated { names } = event {
                seen.extend(names.iter().cloned());
            }
            Ok(())
        };
        let handled = drain(&mut receiver, &mut handler).unwrap();

        assert_eq!(handled, 2);
        assert_eq!(seen, vec!["--a", "--b", "--c"]);
    }

    #[test]
    fn test_drain_stops_on_handler_error() {
        let bus = BroadcastBus::default();
        let mut receiver = bus.subscribe();
        bus.dispatch(ThemeEvent::CssVarsUpdated { names: vec![] });

        let mut failing = |event: &ThemeEvent| -> Result<(), HandlerError> {
            Err(HandlerError::ProcessingFailed {
                event: event.name(),
                message: "listener detached".into(),
            })
        };
        assert!(drain(&mut receiver, &mut failing).is_err());
    }

    #[test]
    fn test_drain_recovers_from_lag() {
        let bus = BroadcastBus::new(1);
        let mut receiver = bus.subscribe();
        for _ in 0..3 {
            bus.dispatch(ThemeEvent::CssVarsUpdated { names: vec![] });
        }

        let mut count = 0;
        let mut counting = |_: &ThemeEvent| -> Result<(), HandlerError> {
            count += 1;
            Ok(())
        };
        let handled = drain(&mut receiver, &mut counting).unwrap();
        assert_eq!(handled, 1);
        assert_eq!(count, 1);
    }
}
