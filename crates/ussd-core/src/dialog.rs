//! Dialog controller
//!
//! Composes the composer, session manager and dispatcher behind one object
//! and owns the modal lifecycle:
//!
//! ```text
//!   Closed ──dial──▶ Opening ──opening turn resolved──▶ Open ──┐
//!     ▲                 │                                │   ▲ │ submit
//!     │                 └───────────close────────────────┤   └─┘
//!     └──── Closing ◀────────────────────────────────────┘
//!          (close_delay)
//! ```
//!
//! The dialogue ends only when the operator closes it. Replies are never
//! inspected for an end marker, and failed turns leave the dialog open for
//! another attempt.

use std::sync::Arc;

use chrono::Utc;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::composer::{Composer, is_keypad_char};
use crate::config::UssdConfig;
use crate::dispatcher::{Flight, RequestDispatcher, TurnOutcome};
use crate::error::UssdResult;
use crate::events::{EventEmitter, EventStream, UssdEvent};
use crate::presentation::{PresentationPort, Rejection};
use crate::session::{SessionManager, UssdSession};
use crate::transport::{HttpTransport, UssdTransport};

/// Modal lifecycle, independent of whether a session is active
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UiLifecycleState {
    Closed,
    Opening,
    Open,
    Closing,
}

impl UiLifecycleState {
    /// Whether the reply field accepts submissions
    pub fn accepts_replies(&self) -> bool {
        matches!(self, UiLifecycleState::Opening | UiLifecycleState::Open)
    }
}

impl std::fmt::Display for UiLifecycleState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            UiLifecycleState::Closed => "Closed",
            UiLifecycleState::Opening => "Opening",
            UiLifecycleState::Open => "Open",
            UiLifecycleState::Closing => "Closing",
        };
        write!(f, "{}", name)
    }
}

/// A physical key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyInput {
    Char(char),
    Backspace,
    Enter,
}

/// What a key press did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyAction {
    Appended,
    Erased,
    /// Enter opened a session; carries the opening turn's outcome
    Dialed(TurnOutcome),
    /// Enter submitted a reply; `None` if the turn was dropped
    Submitted(Option<TurnOutcome>),
    Ignored,
}

/// Snapshot of controller activity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DialogStats {
    pub state: UiLifecycleState,
    pub session_active: bool,
    pub dial_buffer_len: usize,
    pub turns_completed: u64,
    pub turns_failed: u64,
    pub turns_dropped: u64,
}

struct DialogState {
    composer: Composer,
    sessions: SessionManager,
    lifecycle: UiLifecycleState,
    turns_completed: u64,
    turns_failed: u64,
    turns_dropped: u64,
}

impl DialogState {
    fn transition(&mut self, next: UiLifecycleState) -> Option<UssdEvent> {
        let previous = self.lifecycle;
        if previous == next {
            return None;
        }
        self.lifecycle = next;
        debug!("Dialog state {} -> {}", previous, next);
        Some(UssdEvent::StateChanged { previous, current: next })
    }

    fn reset_counters(&mut self) {
        self.turns_completed = 0;
        self.turns_failed = 0;
        self.turns_dropped = 0;
    }
}

/// Drives one simulated handset
///
/// All state lives behind a single mutex that is never held across an
/// `.await` or while calling into the presenter.
pub struct DialogController {
    config: UssdConfig,
    state: Mutex<DialogState>,
    dispatcher: RequestDispatcher,
    presenter: Arc<dyn PresentationPort>,
    events: EventEmitter,
}

impl DialogController {
    /// Create a controller using `transport` for turns
    pub fn new(
        config: UssdConfig,
        transport: Arc<dyn UssdTransport>,
        presenter: Arc<dyn PresentationPort>,
    ) -> UssdResult<Self> {
        config.validate()?;

        let dispatcher = RequestDispatcher::new(transport, presenter.clone(), config.request_timeout);
        let state = DialogState {
            composer: Composer::new(config.max_dial_length),
            sessions: SessionManager::new(),
            lifecycle: UiLifecycleState::Closed,
            turns_completed: 0,
            turns_failed: 0,
            turns_dropped: 0,
        };

        Ok(Self {
            config,
            state: Mutex::new(state),
            dispatcher,
            presenter,
            events: EventEmitter::default(),
        })
    }

    /// Create a controller talking HTTP to `config.api_url`
    pub fn with_http(config: UssdConfig, presenter: Arc<dyn PresentationPort>) -> UssdResult<Self> {
        let transport = Arc::new(HttpTransport::new(&config)?);
        Self::new(config, transport, presenter)
    }

    pub fn state(&self) -> UiLifecycleState {
        self.state.lock().lifecycle
    }

    /// The active session, if any
    pub fn session(&self) -> Option<UssdSession> {
        self.state.lock().sessions.current().cloned()
    }

    pub fn dial_buffer(&self) -> String {
        self.state.lock().composer.buffer().to_string()
    }

    /// Whether a turn is outstanding
    pub fn is_busy(&self) -> bool {
        self.dispatcher.is_busy()
    }

    pub fn stats(&self) -> DialogStats {
        let state = self.state.lock();
        DialogStats {
            state: state.lifecycle,
            session_active: state.sessions.is_active(),
            dial_buffer_len: state.composer.len(),
            turns_completed: state.turns_completed,
            turns_failed: state.turns_failed,
            turns_dropped: state.turns_dropped,
        }
    }

    pub fn subscribe(&self) -> EventStream {
        self.events.subscribe()
    }

    /// Route a physical key press
    ///
    /// `reply_input` is the content of the reply field when it has focus.
    /// While a session is active and the reply field is focused, only Enter
    /// is handled (it submits the reply); other keys belong to the field.
    pub async fn press_key(&self, key: KeyInput, reply_input: Option<&str>) -> KeyAction {
        let session_active = self.state.lock().sessions.is_active();

        if session_active {
            if let Some(input) = reply_input {
                return match key {
                    KeyInput::Enter => KeyAction::Submitted(self.submit_reply(input).await),
                    _ => KeyAction::Ignored,
                };
            }
        }

        match key {
            KeyInput::Char(c) if is_keypad_char(c) => {
                if self.append_digit(c) {
                    self.presenter.highlight_key(c);
                    KeyAction::Appended
                } else {
                    KeyAction::Ignored
                }
            }
            KeyInput::Char(_) => KeyAction::Ignored,
            KeyInput::Backspace => {
                if self.backspace() {
                    KeyAction::Erased
                } else {
                    KeyAction::Ignored
                }
            }
            KeyInput::Enter => match self.open_dialog().await {
                Some(outcome) => KeyAction::Dialed(outcome),
                None => KeyAction::Ignored,
            },
        }
    }

    /// Append a keypad character to the dial buffer
    ///
    /// Ignored while a session is active, for characters outside the keypad
    /// alphabet, and once the buffer is full.
    pub fn append_digit(&self, digit: char) -> bool {
        let buffer = {
            let mut state = self.state.lock();
            if state.sessions.is_active() || !state.composer.append_digit(digit) {
                return false;
            }
            state.composer.buffer().to_string()
        };
        self.presenter.update_display(&buffer);
        true
    }

    /// Remove the last dialed character
    pub fn backspace(&self) -> bool {
        let buffer = {
            let mut state = self.state.lock();
            if state.sessions.is_active() || !state.composer.backspace() {
                return false;
            }
            state.composer.buffer().to_string()
        };
        self.presenter.update_display(&buffer);
        true
    }

    /// Try to open a session from the dial buffer and send the opening turn
    ///
    /// Returns whether a session was opened. A buffer that doesn't match the
    /// dial pattern is left as is and no request is made.
    pub async fn dial(&self) -> bool {
        self.open_dialog().await.is_some()
    }

    /// `None` if no session was opened, otherwise the opening turn's outcome
    async fn open_dialog(&self) -> Option<TurnOutcome> {
        let opened = {
            let mut state = self.state.lock();
            if state.sessions.is_active() {
                return None;
            }

            let buffer = state.composer.buffer().to_string();
            let Some(flight) = self.dispatcher.try_claim() else {
                drop(state);
                self.reject_dial(buffer, Rejection::TurnInFlight);
                return None;
            };

            let dialed = state.composer.try_start_session();
            let Some(code) = dialed else {
                drop(state);
                self.reject_dial(buffer, Rejection::InvalidDialString);
                return None;
            };

            let session = match state.sessions.open(code, self.config.phone_number.clone()) {
                Ok(session) => session,
                Err(e) => {
                    warn!("Could not open USSD session: {}", e);
                    return None;
                }
            };
            state.reset_counters();
            let transition = state.transition(UiLifecycleState::Opening);
            (session, transition, flight)
        };
        let (session, transition, flight) = opened;

        self.presenter.update_display("");
        self.presenter.show_modal();
        self.presenter.focus_input();

        self.events.emit(UssdEvent::SessionOpened {
            session_id: session.session_id().clone(),
            ussd_code: session.ussd_code().to_string(),
            at: session.opened_at(),
        });
        if let Some(event) = transition {
            self.events.emit(event);
        }

        Some(self.run_turn(flight, session, String::new()).await)
    }

    /// Submit the operator's reply as the next turn
    ///
    /// The input is trimmed before sending. Returns `None` when there is no
    /// open dialog or a turn is already outstanding; neither case changes
    /// any state.
    pub async fn submit_reply(&self, input: &str) -> Option<TurnOutcome> {
        let session = {
            let state = self.state.lock();
            if !state.lifecycle.accepts_replies() {
                return None;
            }
            state.sessions.current()?.clone()
        };

        let text = input.trim().to_string();
        let Some(flight) = self.dispatcher.try_claim() else {
            self.record_drop(&session, text);
            return None;
        };

        self.presenter.clear_input();
        Some(self.run_turn(flight, session, text).await)
    }

    /// Close the dialog
    ///
    /// Plays the exit animation for `close_delay`, then destroys the
    /// session, clears the dial buffer and the rendered content. Returns
    /// false if the dialog was not visible or is already closing.
    pub async fn close(&self) -> bool {
        let transition = {
            let mut state = self.state.lock();
            if !state.lifecycle.accepts_replies() {
                return false;
            }
            state.transition(UiLifecycleState::Closing)
        };
        if let Some(event) = transition {
            self.events.emit(event);
        }

        tokio::time::sleep(self.config.close_delay).await;

        let (closed, transition) = {
            let mut state = self.state.lock();
            let closed = state.sessions.close();
            state.composer.clear();
            state.reset_counters();
            (closed, state.transition(UiLifecycleState::Closed))
        };

        self.presenter.hide_modal();
        self.presenter.clear_content();
        self.presenter.clear_input();
        self.presenter.update_display("");

        info!(
            "USSD dialog closed{}",
            closed
                .as_ref()
                .map(|s| format!(" (session {})", s.session_id()))
                .unwrap_or_default()
        );
        self.events.emit(UssdEvent::SessionClosed {
            session_id: closed.map(|s| s.session_id().clone()),
            at: Utc::now(),
        });
        if let Some(event) = transition {
            self.events.emit(event);
        }
        true
    }

    async fn run_turn(&self, flight: Flight<'_>, session: UssdSession, text: String) -> TurnOutcome {
        let outcome = flight.run(&session, &text).await;

        let transition = {
            let mut state = self.state.lock();
            if !state.sessions.is_current(session.session_id()) || !state.lifecycle.accepts_replies() {
                debug!(
                    "Discarding reply for session {}: dialog closed while the turn was in flight",
                    session.session_id()
                );
                return outcome;
            }

            if outcome.is_failure() {
                state.turns_failed += 1;
            } else {
                state.turns_completed += 1;
            }
            state.transition(UiLifecycleState::Open)
        };

        self.presenter.render(outcome.message());
        // Always re-enabled; content never ends the dialogue
        self.presenter.enable_input();
        self.presenter.focus_input();

        let event = match &outcome {
            TurnOutcome::Reply(message) => UssdEvent::TurnCompleted {
                session_id: session.session_id().clone(),
                text,
                message: message.clone(),
            },
            TurnOutcome::Failed(failure) => UssdEvent::TurnFailed {
                session_id: session.session_id().clone(),
                text,
                failure: failure.clone(),
            },
        };
        self.events.emit(event);
        if let Some(event) = transition {
            self.events.emit(event);
        }

        outcome
    }

    fn record_drop(&self, session: &UssdSession, text: String) {
        debug!("Ignoring submit for session {}: turn in flight", session.session_id());
        self.state.lock().turns_dropped += 1;
        self.presenter.notify_rejection(Rejection::TurnInFlight);
        self.events.emit(UssdEvent::TurnDropped {
            session_id: session.session_id().clone(),
            text,
        });
    }

    fn reject_dial(&self, buffer: String, reason: Rejection) {
        debug!("Dial of {:?} refused: {}", buffer, reason);
        self.presenter.notify_rejection(reason);
        self.events.emit(UssdEvent::DialRejected { buffer, reason });
    }
}
