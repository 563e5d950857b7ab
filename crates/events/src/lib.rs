#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Event system for recipe execution
//!
//! All user-facing output flows through events - recipes never print or log
//! directly. The host owns the receiving end of the channel and decides how
//! events are rendered; levels map onto `tracing` for structured logs.

pub mod events;
pub mod meta;

pub use events::{AppEvent, BuildEvent, GeneralEvent, LifecycleEvent, PackageEvent, SourceEvent};
pub use meta::EventLevel;

use tokio::sync::mpsc::UnboundedSender;

/// Type alias for the event sender
pub type EventSender = UnboundedSender<AppEvent>;

/// Type alias for the event receiver
pub type EventReceiver = tokio::sync::mpsc::UnboundedReceiver<AppEvent>;

/// Create a new event channel
#[must_use]
pub fn channel() -> (EventSender, EventReceiver) {
    tokio::sync::mpsc::unbounded_channel()
}

/// The unified trait for emitting events
///
/// Implemented by every context handed to a recipe hook; a `None` sender
/// silently drops events, which keeps unit tests free of channel plumbing.
pub trait EventEmitter {
    /// Get the event sender for this emitter
    fn event_sender(&self) -> Option<&EventSender>;

    /// Emit an event through this emitter
    fn emit(&self, event: AppEvent) {
        event.trace();
        if let Some(sender) = self.event_sender() {
            // Ignore send errors - if the receiver is gone we just continue
            let _ = sender.send(event);
        }
    }

    /// Emit a debug log event
    fn emit_debug(&self, message: impl Into<String>) {
        self.emit(AppEvent::General(GeneralEvent::Debug {
            message: message.into(),
        }));
    }

    /// Emit an info event
    fn emit_info(&self, message: impl Into<String>) {
        self.emit(AppEvent::General(GeneralEvent::Info {
            message: message.into(),
        }));
    }

    /// Emit a warning event
    fn emit_warning(&self, message: impl Into<String>) {
        self.emit(AppEvent::General(GeneralEvent::Warning {
            message: message.into(),
        }));
    }

    /// Emit an error event
    fn emit_error(&self, message: impl Into<String>) {
        self.emit(AppEvent::General(GeneralEvent::Error {
            message: message.into(),
        }));
    }
}

impl EventEmitter for Option<EventSender> {
    fn event_sender(&self) -> Option<&EventSender> {
        self.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn emits_through_channel() {
        let (tx, mut rx) = channel();
        let emitter = Some(tx);
        emitter.emit_info("hello");
        match rx.recv().await {
            Some(AppEvent::General(GeneralEvent::Info { message })) => {
                assert_eq!(message, "hello");
            }
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[test]
    fn missing_receiver_is_silent() {
        let emitter: Option<EventSender> = None;
        emitter.emit_warning("dropped");
    }
}
