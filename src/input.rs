use std::time::{Duration, Instant};

use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

pub const DEFAULT_MAX_WIDTH: usize = 30;
pub const DEFAULT_BACKSPACE_REPEAT: Duration = Duration::from_millis(100);

/// The text the player is typing, bounded in width, with a rate-limited
/// backspace so a held key does not wipe the field in one frame.
#[derive(Debug, Clone)]
pub struct TypedInput {
    text: String,
    max_width: usize,
    backspace_repeat: Duration,
    last_delete: Option<Instant>,
}

impl Default for TypedInput {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_WIDTH, DEFAULT_BACKSPACE_REPEAT)
    }
}

impl TypedInput {
    pub fn new(max_width: usize, backspace_repeat: Duration) -> Self {
        Self {
            text: String::new(),
            max_width,
            backspace_repeat,
            last_delete: None,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    pub fn width(&self) -> usize {
        self.text.width()
    }

    pub fn max_width(&self) -> usize {
        self.max_width
    }

    /// Appends `c` unless it is a control char or the field is full.
    pub fn insert(&mut self, c: char) -> bool {
        if c.is_control() {
            return false;
        }
        let char_width = c.width().unwrap_or(0);
        if self.width() + char_width > self.max_width {
            return false;
        }
        self.text.push(c);
        true
    }

    /// Removes the last char. Returns `true` only if a char was removed;
    /// repeats faster than the configured rate are dropped.
    pub fn backspace(&mut self, now: Instant) -> bool {
        if let Some(last) = self.last_delete {
            if now.saturating_duration_since(last) < self.backspace_repeat {
                return false;
            }
        }
        self.last_delete = Some(now);
        self.text.pop().is_some()
    }

    /// Empties the field. Returns `true` if there was anything to clear.
    pub fn clear(&mut self) -> bool {
        let had_text = !self.text.is_empty();
        self.text.clear();
        had_text
    }

    /// Hands back the current text and empties the field.
    pub fn take(&mut self) -> String {
        std::mem::take(&mut self.text)
    }
}
