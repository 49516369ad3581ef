//! Event system for the USSD simulator
//!
//! Observers subscribe to a broadcast of lifecycle events. Emitting never
//! fails: with no subscribers the event is simply dropped.

use chrono::{DateTime, Utc};
use tokio::sync::broadcast;
use tokio_stream::wrappers::BroadcastStream;

use crate::dialog::UiLifecycleState;
use crate::error::TransportFailure;
use crate::presentation::Rejection;
use crate::session::SessionId;

/// Events emitted by the dialog controller
#[derive(Debug, Clone)]
pub enum UssdEvent {
    /// A dial matched the pattern and a session opened
    SessionOpened {
        session_id: SessionId,
        ussd_code: String,
        at: DateTime<Utc>,
    },

    /// The dialog lifecycle moved
    StateChanged {
        previous: UiLifecycleState,
        current: UiLifecycleState,
    },

    /// A turn got a usable reply
    TurnCompleted {
        session_id: SessionId,
        text: String,
        message: String,
    },

    /// A turn failed and the fallback message was rendered
    TurnFailed {
        session_id: SessionId,
        text: String,
        failure: TransportFailure,
    },

    /// A submit arrived while a turn was outstanding and was discarded
    TurnDropped {
        session_id: SessionId,
        text: String,
    },

    /// A dial attempt was refused
    DialRejected {
        buffer: String,
        reason: Rejection,
    },

    /// The operator closed the dialog
    SessionClosed {
        session_id: Option<SessionId>,
        at: DateTime<Utc>,
    },
}

/// Event stream type
pub type EventStream = BroadcastStream<UssdEvent>;

/// Broadcast emitter for [`UssdEvent`]s
#[derive(Clone)]
pub struct EventEmitter {
    sender: broadcast::Sender<UssdEvent>,
}

impl EventEmitter {
    /// Create a new event emitter with the specified capacity
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    pub fn emit(&self, event: UssdEvent) {
        // No receivers is not an error
        let _ = self.sender.send(event);
    }

    pub fn subscribe(&self) -> EventStream {
        BroadcastStream::new(self.sender.subscribe())
    }

}

impl Default for EventEmitter {
    fn default() -> Self {
        Self::new(256)
    }
}
