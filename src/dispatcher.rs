//! Applies resolved gestures to the text being composed.

use crate::{
    constants::{BACKSPACE_GLYPH, SPACE_GLYPH},
    gesture::Action,
};
use log::debug;

/// Text being composed by the user
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextBuffer {
    text: String,
}

impl TextBuffer {
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.text
    }

    #[must_use]
    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }

    pub fn push_str(&mut self, s: &str) {
        self.text.push_str(s);
    }

    /// Remove the last character, if any
    pub fn backspace(&mut self) {
        self.text.pop();
    }

    /// Hand out the text, leaving the buffer empty
    pub fn take(&mut self) -> String {
        std::mem::take(&mut self.text)
    }
}

/// Turns one [`Action`] into a buffer edit or a submission
#[derive(Debug, Clone, Default)]
pub struct InputDispatcher;

impl InputDispatcher {
    /// Apply `action` to `buffer`. Returns the text to send on a submit.
    ///
    /// A submit with blank text is ignored and leaves the buffer untouched.
    pub fn apply(&self, action: &Action, buffer: &mut TextBuffer) -> Option<String> {
        match action {
            Action::ActivateHoveredKey(label) => {
                match label.as_str() {
                    BACKSPACE_GLYPH => buffer.backspace(),
                    SPACE_GLYPH => buffer.push_str(SPACE_GLYPH),
                    other => buffer.push_str(other),
                }
                debug!("Key {:?} applied, buffer is now {:?}", label, buffer.as_str());
                None
            }
            Action::Submit => {
                if buffer.is_blank() {
                    debug!("Submit ignored: buffer is blank");
                    None
                } else {
                    Some(buffer.take())
                }
            }
            Action::None => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(label: &str) -> Action {
        Action::ActivateHoveredKey(label.to_string())
    }

    #[test]
    fn test_letter_appends() {
        let mut buffer = TextBuffer::default();
        assert_eq!(InputDispatcher.apply(&key("A"), &mut buffer), None);
        assert_eq!(buffer.as_str(), "A");
    }

    #[test]
    fn test_space_and_backspace() {
        let mut buffer = TextBuffer::new("HI");
        InputDispatcher.apply(&key(SPACE_GLYPH), &mut buffer);
        assert_eq!(buffer.as_str(), "HI ");
        InputDispatcher.apply(&key(BACKSPACE_GLYPH), &mut buffer);
        InputDispatcher.apply(&key(BACKSPACE_GLYPH), &mut buffer);
        assert_eq!(buffer.as_str(), "H");
    }

    #[test]
    fn test_backspace_on_empty_is_noop() {
        let mut buffer = TextBuffer::default();
        InputDispatcher.apply(&key(BACKSPACE_GLYPH), &mut buffer);
        assert_eq!(buffer.as_str(), "");
    }

    #[test]
    fn test_submit_takes_text() {
        let mut buffer = TextBuffer::new("HI");
        assert_eq!(InputDispatcher.apply(&Action::Submit, &mut buffer), Some("HI".to_string()));
        assert_eq!(buffer.as_str(), "");
    }

    #[test]
    fn test_blank_submit_is_noop() {
        let mut buffer = TextBuffer::new("   ");
        assert_eq!(InputDispatcher.apply(&Action::Submit, &mut buffer), None);
        assert_eq!(buffer.as_str(), "   ");
    }

    #[test]
    fn test_none_is_noop() {
        let mut buffer = TextBuffer::new("X");
        assert_eq!(InputDispatcher.apply(&Action::None, &mut buffer), None);
        assert_eq!(buffer.as_str(), "X");
    }
}
