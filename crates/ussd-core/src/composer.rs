//! Keypad composer
//!
//! Accumulates the dialed characters before a session exists. Input that
//! falls outside the keypad alphabet or beyond capacity is ignored rather
//! than reported: a physical keypad has no way to signal "invalid key".

use crate::config::DEFAULT_MAX_DIAL_LENGTH;

/// Returns true for characters present on the keypad (`0-9`, `*`, `#`)
pub fn is_keypad_char(c: char) -> bool {
    c.is_ascii_digit() || c == '*' || c == '#'
}

/// The dial pattern: contains at least one `*` and ends with `#`
pub fn is_dial_pattern(code: &str) -> bool {
    code.contains('*') && code.ends_with('#')
}

/// Digit buffer edited from the keypad
#[derive(Debug, Clone)]
pub struct Composer {
    buffer: String,
    max_len: usize,
}

impl Default for Composer {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_DIAL_LENGTH)
    }
}

impl Composer {
    /// Create an empty composer holding at most `max_len` characters
    pub fn new(max_len: usize) -> Self {
        Self {
            buffer: String::with_capacity(max_len),
            max_len,
        }
    }

    /// Current buffer contents
    pub fn buffer(&self) -> &str {
        &self.buffer
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Append a keypad character
    ///
    /// Returns whether the buffer changed.
    pub fn append_digit(&mut self, digit: char) -> bool {
        if !is_keypad_char(digit) || self.buffer.len() >= self.max_len {
            return false;
        }
        self.buffer.push(digit);
        true
    }

    /// Remove the last character, returning whether the buffer changed
    pub fn backspace(&mut self) -> bool {
        self.buffer.pop().is_some()
    }

    /// Promote the buffer to a dialed code
    ///
    /// On success the buffer is emptied and its former contents returned.
    /// A buffer that does not match the dial pattern is left untouched.
    pub fn try_start_session(&mut self) -> Option<String> {
        if !is_dial_pattern(&self.buffer) {
            return None;
        }
        Some(std::mem::take(&mut self.buffer))
    }

    pub fn clear(&mut self) {
        self.buffer.clear();
    }
}
