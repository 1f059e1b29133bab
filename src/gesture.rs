//! Single vs double blink classification.
//!
//! Keeps its own timestamp, separate from the recognizer's debounce timer: the
//! recognizer decides whether a closure is a blink at all, this decides what an
//! accepted blink means.

use crate::constants::DEFAULT_DOUBLE_BLINK_WINDOW_MS;
use log::debug;
use std::time::Duration;

/// What an accepted blink resolves to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Press the key under the cursor
    ActivateHoveredKey(String),
    /// Send the current text
    Submit,
    /// Nothing to do
    None,
}

/// Classify one accepted blink.
///
/// Returns the action and the timestamp to persist for the next call. A double
/// blink consumes the pair, so a third rapid blink starts over.
#[must_use]
pub fn classify(
    now: Duration,
    last: Option<Duration>,
    window: Duration,
    hovered: Option<&str>,
) -> (Action, Option<Duration>) {
    if let Some(last) = last {
        if now.saturating_sub(last) < window {
            return (Action::Submit, None);
        }
    }

    let action = hovered.map_or(Action::None, |key| Action::ActivateHoveredKey(key.to_string()));
    (action, Some(now))
}

/// Stateful wrapper around [`classify`]
#[derive(Debug, Clone)]
pub struct GestureClassifier {
    window: Duration,
    last_gesture_blink: Option<Duration>,
}

impl Default for GestureClassifier {
    fn default() -> Self {
        Self::new(Duration::from_millis(DEFAULT_DOUBLE_BLINK_WINDOW_MS))
    }
}

impl GestureClassifier {
    #[must_use]
    pub const fn new(window: Duration) -> Self {
        Self {
            window,
            last_gesture_blink: None,
        }
    }

    /// Resolve an accepted blink at `now` against the currently hovered key
    pub fn on_blink_accepted(&mut self, now: Duration, hovered: Option<&str>) -> Action {
        let (action, last) = classify(now, self.last_gesture_blink, self.window, hovered);
        self.last_gesture_blink = last;
        debug!("Blink at {}ms classified as {:?}", now.as_millis(), action);
        action
    }

    #[must_use]
    pub const fn last_gesture_blink(&self) -> Option<Duration> {
        self.last_gesture_blink
    }

    pub fn reset(&mut self) {
        self.last_gesture_blink = None;
    }
}
