//! Per-frame pipeline: landmarks in, cursor, hover and text edits out.

use crate::{
    blink::BlinkRecognizer,
    chat::{Conversation, Message, ReplyService},
    config::Config,
    dispatcher::{InputDispatcher, TextBuffer},
    gaze::{CursorPosition, GazeMapper},
    gesture::{Action, GestureClassifier},
    keyboard::{KeyLayout, Keyboard, QwertyLayout},
    landmarks::FaceFrame,
    Result,
};
use log::{debug, info};
use std::time::Duration;

/// What happened while processing one frame
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrameOutcome {
    /// Cursor in viewport pixels, if a face was seen
    pub cursor: Option<CursorPosition>,
    /// Key under the cursor after this frame
    pub hovered: Option<String>,
    /// A new blink was accepted this frame
    pub blink: bool,
    /// Gesture resolved from the blink
    pub action: Option<Action>,
    /// Text that was sent
    pub submitted: Option<String>,
    /// Reply recorded for the sent text
    pub reply: Option<Message>,
}

/// Owns every piece of per-session input state
pub struct Tracker<L: KeyLayout = QwertyLayout> {
    mapper: GazeMapper,
    recognizer: BlinkRecognizer,
    classifier: GestureClassifier,
    keyboard: Keyboard<L>,
    dispatcher: InputDispatcher,
    buffer: TextBuffer,
    conversation: Conversation,
    viewport: (f64, f64),
    cursor: Option<CursorPosition>,
    click_flash: Duration,
    clicking_until: Option<Duration>,
}

impl Tracker<QwertyLayout> {
    /// Build a tracker with the QWERTY keyboard described by `config`
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        let layout = QwertyLayout::from_config(&config.keyboard);
        let viewport = layout.viewport();
        Self::with_parts(
            config.gaze_mapper(),
            config.blink_recognizer(),
            config.gesture_classifier(),
            Keyboard::new(layout),
            viewport,
            Conversation::new(&config.chat.assistant_name),
        )
        .with_click_flash(Duration::from_millis(config.gesture.click_flash_ms))
    }

    /// Follow a viewport resize; key geometry is recomputed on the next frame
    pub fn resize(&mut self, width: f64, height: f64) {
        self.viewport = (width, height);
        self.keyboard.layout_mut().resize(width, height);
    }
}

impl<L: KeyLayout> Tracker<L> {
    #[must_use]
    pub fn with_parts(
        mapper: GazeMapper,
        recognizer: BlinkRecognizer,
        classifier: GestureClassifier,
        keyboard: Keyboard<L>,
        viewport: (f64, f64),
        conversation: Conversation,
    ) -> Self {
        Self {
            mapper,
            recognizer,
            classifier,
            keyboard,
            dispatcher: InputDispatcher,
            buffer: TextBuffer::default(),
            conversation,
            viewport,
            cursor: None,
            click_flash: Duration::from_millis(crate::constants::DEFAULT_CLICK_FLASH_MS),
            clicking_until: None,
        }
    }

    #[must_use]
    pub const fn with_click_flash(mut self, click_flash: Duration) -> Self {
        self.click_flash = click_flash;
        self
    }

    /// Process one frame observed at `now` (time since the session started).
    ///
    /// Without a face the previous cursor and hover stay current and no blink
    /// can be recognized.
    ///
    /// # Errors
    ///
    /// Returns a detection error when the face lacks a required landmark; no
    /// state has been changed in that case.
    pub fn process_frame(
        &mut self,
        face: Option<&FaceFrame>,
        now: Duration,
        service: &mut dyn ReplyService,
    ) -> Result<FrameOutcome> {
        let Some(face) = face else {
            return Ok(FrameOutcome {
                cursor: None,
                hovered: self.keyboard.hovered().map(str::to_string),
                ..FrameOutcome::default()
            });
        };

        let normalized = self.mapper.map_frame(face)?;
        let apertures = crate::blink::EyeApertures::from_frame(face)?;

        let cursor = normalized.to_viewport(self.viewport.0, self.viewport.1);
        self.cursor = Some(cursor);
        let hovered = self.keyboard.update_hover(cursor).map(str::to_string);

        let mut outcome = FrameOutcome {
            cursor: Some(cursor),
            hovered: hovered.clone(),
            ..FrameOutcome::default()
        };

        if !self.recognizer.detect(apertures, now) {
            return Ok(outcome);
        }

        outcome.blink = true;
        self.clicking_until = Some(now + self.click_flash);

        let action = self.classifier.on_blink_accepted(now, hovered.as_deref());
        if let Some(text) = self.dispatcher.apply(&action, &mut self.buffer) {
            info!("Submitting {:?}", text);
            outcome.reply = self.conversation.send(&text, service).cloned();
            outcome.submitted = Some(text);
        }
        outcome.action = Some(action);

        debug!("Frame outcome: {:?}", outcome);
        Ok(outcome)
    }

    /// Whether the cursor should show its click state at `now`
    #[must_use]
    pub fn is_clicking(&self, now: Duration) -> bool {
        self.clicking_until.is_some_and(|until| now < until)
    }

    /// Show the keyboard and start from a clean gesture history
    pub fn activate(&mut self) {
        self.keyboard.set_active(true);
        self.recognizer.reset();
        self.classifier.reset();
    }

    /// Hide the keyboard and forget transient input state; typed text stays
    pub fn deactivate(&mut self) {
        self.keyboard.set_active(false);
        self.recognizer.reset();
        self.classifier.reset();
        self.cursor = None;
        self.clicking_until = None;
    }

    /// Last cursor position in viewport pixels
    #[must_use]
    pub const fn cursor(&self) -> Option<CursorPosition> {
        self.cursor
    }

    #[must_use]
    pub fn hovered(&self) -> Option<&str> {
        self.keyboard.hovered()
    }

    #[must_use]
    pub fn text(&self) -> &str {
        self.buffer.as_str()
    }

    /// Replace the composed text, as typing in the regular input field does
    pub fn set_text(&mut self, text: impl Into<String>) {
        self.buffer = TextBuffer::new(text);
    }

    /// Send the composed text through the explicit send control
    pub fn send_now(&mut self, service: &mut dyn ReplyService) -> Option<Message> {
        let text = self.dispatcher.apply(&Action::Submit, &mut self.buffer)?;
        self.conversation.send(&text, service).cloned()
    }

    #[must_use]
    pub const fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    #[must_use]
    pub const fn keyboard(&self) -> &Keyboard<L> {
        &self.keyboard
    }
}
