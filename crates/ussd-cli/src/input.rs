//! Line-oriented keypad input
//!
//! The terminal has no separate keypad and reply field, so each line is
//! interpreted according to whether a dialog is open.

use rvoip_ussd_core::KeyInput;

/// One parsed line of operator input
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Keys pressed on the keypad, each line ending in Enter
    Keys(Vec<KeyInput>),
    /// Text typed in the reply field, submitted with Enter
    Reply(String),
    Close,
    Stats,
    Help,
    Quit,
    Unknown(String),
}

/// Parse one line
///
/// `dialog_open` selects between keypad and reply-field interpretation.
/// Lines starting with `:` are commands in both modes.
pub fn parse_line(line: &str, dialog_open: bool) -> Command {
    let trimmed = line.trim();

    if let Some(command) = trimmed.strip_prefix(':') {
        return match command {
            "close" | "c" => Command::Close,
            "stats" => Command::Stats,
            "help" | "h" | "?" => Command::Help,
            "quit" | "q" | "exit" => Command::Quit,
            "back" | "b" if !dialog_open => Command::Keys(vec![KeyInput::Backspace]),
            other => Command::Unknown(other.to_string()),
        };
    }

    if dialog_open {
        return Command::Reply(line.to_string());
    }

    let mut keys: Vec<KeyInput> = trimmed
        .chars()
        .filter(|c| !c.is_whitespace())
        .map(KeyInput::Char)
        .collect();
    keys.push(KeyInput::Enter);
    Command::Keys(keys)
}

pub const HELP: &str = "\
Keypad mode (no dialog open):
  *123#        type keys and press Enter to dial
  :back        erase the last key
Dialog mode:
  <text>       reply to the current menu
  :close       close the dialog
Anywhere:
  :stats       show session counters
  :help        this text
  :quit        exit";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keypad_line_ends_with_enter() {
        assert_eq!(
            parse_line("*1 2#\n", false),
            Command::Keys(vec![
                KeyInput::Char('*'),
                KeyInput::Char('1'),
                KeyInput::Char('2'),
                KeyInput::Char('#'),
                KeyInput::Enter,
            ])
        );
        assert_eq!(parse_line("", false), Command::Keys(vec![KeyInput::Enter]));
    }

    #[test]
    fn test_reply_is_passed_through_untrimmed() {
        assert_eq!(parse_line(" 1 ", true), Command::Reply(" 1 ".to_string()));
    }

    #[test]
    fn test_commands() {
        assert_eq!(parse_line(":close", true), Command::Close);
        assert_eq!(parse_line(":q", false), Command::Quit);
        assert_eq!(parse_line(":back", false), Command::Keys(vec![KeyInput::Backspace]));
        assert_eq!(parse_line(":back", true), Command::Unknown("back".to_string()));
        assert_eq!(parse_line(":dance", false), Command::Unknown("dance".to_string()));
    }
}
