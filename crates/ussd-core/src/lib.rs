//! # USSD Simulator Core
//!
//! Client side of a USSD dialogue, headless and UI-agnostic:
//!
//! - **composer**: keypad buffer and the dial pattern (`*` ... `#`)
//! - **session**: session identity and the immutable dialed code
//! - **dispatcher**: single-flight turn dispatch with timeout and fallback
//! - **dialog**: the modal lifecycle tying the three together
//! - **transport**: the wire contract and its HTTP implementation
//! - **presentation**: the port a front end implements
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use rvoip_ussd_core::{DialogController, NullPresenter, UssdConfig};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let controller = DialogController::with_http(UssdConfig::default(), Arc::new(NullPresenter))?;
//!
//!     for key in "*123#".chars() {
//!         controller.append_digit(key);
//!     }
//!     controller.dial().await;
//!
//!     // Pick menu option 1
//!     let reply = controller.submit_reply("1").await;
//!     println!("{:?}", reply.map(|o| o.into_message()));
//!
//!     controller.close().await;
//!     Ok(())
//! }
//! ```

pub mod composer;
pub mod config;
pub mod dialog;
pub mod dispatcher;
pub mod error;
pub mod events;
pub mod presentation;
pub mod session;
pub mod transport;

// Re-export main types
pub use composer::{Composer, is_dial_pattern, is_keypad_char};
pub use config::UssdConfig;
pub use dialog::{DialogController, DialogStats, KeyAction, KeyInput, UiLifecycleState};
pub use dispatcher::{FALLBACK_MESSAGE, Flight, RequestDispatcher, TurnOutcome};
pub use error::{TransportFailure, UssdError, UssdResult};
pub use events::{EventEmitter, EventStream, UssdEvent};
pub use presentation::{NullPresenter, PresentationPort, Rejection};
pub use session::{SessionId, SessionManager, UssdSession};
pub use transport::{HttpTransport, UssdRequest, UssdResponse, UssdTransport};
