//! Single-flight turn dispatch
//!
//! At most one turn is outstanding at any time. A send issued while another
//! is in flight is dropped outright, neither queued nor replacing the
//! current one, so replies always render in the order they were requested.
//!
//! Failures never escape: every failed turn resolves to
//! [`FALLBACK_MESSAGE`] and the cause is logged.
//!
//! The request timeout bounds the wait, not the call. The exchange runs on
//! its own task; when the timeout fires the turn fails and the flight slot is
//! released, while the abandoned call runs to completion in the background
//! and its result is discarded.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use tracing::{debug, error};

use crate::error::TransportFailure;
use crate::presentation::PresentationPort;
use crate::session::UssdSession;
use crate::transport::{UssdRequest, UssdTransport};

/// Rendered in place of the backend reply when a turn fails
pub const FALLBACK_MESSAGE: &str = "Connection error.\nPlease retry.";

/// Result of a dispatched turn
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TurnOutcome {
    /// The backend message, verbatim
    Reply(String),
    /// The turn failed; render the fallback
    Failed(TransportFailure),
}

impl TurnOutcome {
    /// Text to show the operator
    pub fn message(&self) -> &str {
        match self {
            TurnOutcome::Reply(message) => message,
            TurnOutcome::Failed(_) => FALLBACK_MESSAGE,
        }
    }

    pub fn into_message(self) -> String {
        match self {
            TurnOutcome::Reply(message) => message,
            TurnOutcome::Failed(_) => FALLBACK_MESSAGE.to_string(),
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, TurnOutcome::Failed(_))
    }
}

/// A claimed flight slot
///
/// Obtained from [`RequestDispatcher::try_claim`]. Holding one means no other
/// turn can start. Dropping it releases the slot and, if the turn was started,
/// clears the busy indicator; this happens on every exit path.
pub struct Flight<'a> {
    dispatcher: &'a RequestDispatcher,
    busy_shown: bool,
}

impl Flight<'_> {
    /// Perform the turn this slot was claimed for
    pub async fn run(mut self, session: &UssdSession, text: &str) -> TurnOutcome {
        let dispatcher = self.dispatcher;
        dispatcher.presenter.set_busy(true);
        self.busy_shown = true;

        let request = UssdRequest::for_turn(session, text);
        let transport = dispatcher.transport.clone();
        let call = tokio::spawn(async move { transport.exchange(&request).await });

        let result = match tokio::time::timeout(dispatcher.request_timeout, call).await {
            Ok(Ok(result)) => result,
            Ok(Err(join_error)) => Err(TransportFailure::Network {
                reason: format!("transport task failed: {}", join_error),
            }),
            Err(_) => Err(TransportFailure::Timeout {
                after: dispatcher.request_timeout,
            }),
        };

        match result {
            Ok(response) => TurnOutcome::Reply(response.message),
            Err(failure) => {
                error!(
                    "USSD turn failed for session {} ({}): {}",
                    session.session_id(),
                    failure.category(),
                    failure
                );
                TurnOutcome::Failed(failure)
            }
        }
    }
}

impl Drop for Flight<'_> {
    fn drop(&mut self) {
        if self.busy_shown {
            self.dispatcher.presenter.set_busy(false);
        }
        self.dispatcher.in_flight.store(false, Ordering::Release);
    }
}

/// Sends turns to the backend, one at a time
pub struct RequestDispatcher {
    transport: Arc<dyn UssdTransport>,
    presenter: Arc<dyn PresentationPort>,
    request_timeout: Duration,
    in_flight: AtomicBool,
}

impl RequestDispatcher {
    pub fn new(
        transport: Arc<dyn UssdTransport>,
        presenter: Arc<dyn PresentationPort>,
        request_timeout: Duration,
    ) -> Self {
        Self {
            transport,
            presenter,
            request_timeout,
            in_flight: AtomicBool::new(false),
        }
    }

    /// Whether a turn is outstanding
    pub fn is_busy(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Send one turn and return the text to render
    ///
    /// Returns `None` when the call was dropped because another turn is in
    /// flight. In that case no request was made and nothing changed.
    pub async fn send(&self, session: &UssdSession, text: &str) -> Option<String> {
        self.dispatch(session, text).await.map(TurnOutcome::into_message)
    }

    /// Like [`send`](Self::send) but keeps the failure cause
    pub async fn dispatch(&self, session: &UssdSession, text: &str) -> Option<TurnOutcome> {
        let Some(flight) = self.try_claim() else {
            debug!("Dropping turn for session {}: a request is already in flight", session.session_id());
            return None;
        };
        Some(flight.run(session, text).await)
    }

    /// Claim the flight slot without starting a turn
    ///
    /// Returns `None` if a turn is outstanding. Claiming has no visible
    /// effect until [`Flight::run`] is called, so a caller can claim first
    /// and only then touch the UI.
    pub fn try_claim(&self) -> Option<Flight<'_>> {
        self.in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Flight {
                dispatcher: self,
                busy_shown: false,
            })
    }
}
