//! Presentation port
//!
//! The dialog controller never touches a concrete UI. It drives this trait,
//! and each front end (terminal, GUI, test recorder) implements it.

/// Why an operator action was refused
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    /// The dial buffer does not match the dial pattern
    InvalidDialString,
    /// A turn is still outstanding
    TurnInFlight,
}

impl std::fmt::Display for Rejection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Rejection::InvalidDialString => write!(f, "invalid USSD code"),
            Rejection::TurnInFlight => write!(f, "request already in progress"),
        }
    }
}

/// UI surface driven by the dialog controller
///
/// Calls are made synchronously from the controller and must not block.
pub trait PresentationPort: Send + Sync {
    /// Redraw the composer display
    fn update_display(&self, buffer: &str);

    /// Flash the key that was pressed
    fn highlight_key(&self, _key: char) {}

    /// Make the dialog visible and start its entry animation
    fn show_modal(&self);

    /// Hide the dialog once its exit animation finished
    fn hide_modal(&self);

    /// Replace the dialog content with `message`
    fn render(&self, message: &str);

    /// Gray out content and disable submit while a turn is outstanding
    fn set_busy(&self, busy: bool);

    fn focus_input(&self);

    /// Show the reply field and submit control
    fn enable_input(&self);

    fn clear_content(&self);

    fn clear_input(&self);

    /// An operator action was refused; silent unless a front end opts in
    fn notify_rejection(&self, _rejection: Rejection) {}
}

/// Presenter that draws nothing, for headless use
#[derive(Debug, Default, Clone, Copy)]
pub struct NullPresenter;

impl PresentationPort for NullPresenter {
    fn update_display(&self, _buffer: &str) {}
    fn show_modal(&self) {}
    fn hide_modal(&self) {}
    fn render(&self, _message: &str) {}
    fn set_busy(&self, _busy: bool) {}
    fn focus_input(&self) {}
    fn enable_input(&self) {}
    fn clear_content(&self) {}
    fn clear_input(&self) {}
}
