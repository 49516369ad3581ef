//! Terminal rendering of the handset

use std::io::Write;
use std::sync::atomic::{AtomicBool, Ordering};

use colored::Colorize;
use rvoip_ussd_core::{PresentationPort, Rejection};

const DIALOG_WIDTH: usize = 32;

/// Draws the composer display and the USSD dialog on stdout
#[derive(Default)]
pub struct TerminalPresenter {
    modal_visible: AtomicBool,
}

impl TerminalPresenter {
    pub fn new() -> Self {
        Self::default()
    }

    fn print(&self, line: impl std::fmt::Display) {
        let mut stdout = std::io::stdout().lock();
        let _ = writeln!(stdout, "{}", line);
        let _ = stdout.flush();
    }

    fn rule(&self, label: &str) -> String {
        let fill = DIALOG_WIDTH.saturating_sub(label.len() + 2);
        format!("┌ {} {}┐", label, "─".repeat(fill))
    }
}

impl PresentationPort for TerminalPresenter {
    fn update_display(&self, buffer: &str) {
        if self.modal_visible.load(Ordering::Relaxed) {
            return;
        }
        if buffer.is_empty() {
            self.print("☎  ".dimmed());
        } else {
            self.print(format!("☎  {}", buffer.bold()));
        }
    }

    fn show_modal(&self) {
        self.modal_visible.store(true, Ordering::Relaxed);
        self.print(self.rule("USSD").cyan());
    }

    fn hide_modal(&self) {
        self.modal_visible.store(false, Ordering::Relaxed);
        self.print(format!("└{}┘", "─".repeat(DIALOG_WIDTH)).cyan());
        self.print("Dialog closed.".dimmed());
    }

    fn render(&self, message: &str) {
        for line in message.lines() {
            self.print(format!("│ {}", line));
        }
    }

    fn set_busy(&self, busy: bool) {
        if busy {
            self.print("│ …".dimmed());
        }
    }

    fn focus_input(&self) {}

    fn enable_input(&self) {
        self.print("│ > reply, or :close".dimmed());
    }

    fn clear_content(&self) {}

    fn clear_input(&self) {}

    fn notify_rejection(&self, rejection: Rejection) {
        match rejection {
            Rejection::InvalidDialString => {
                self.print(format!("{} (codes look like *123#)", rejection).yellow())
            }
            Rejection::TurnInFlight => self.print(format!("{}, please wait", rejection).yellow()),
        }
    }
}
