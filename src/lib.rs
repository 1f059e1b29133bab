//! Hands-free text entry driven by facial landmarks.
//!
//! A per-frame landmark stream moves an on-screen cursor, and eye closures are
//! read as key presses (single blink) or "send" (double blink) on a virtual
//! keyboard. The pipeline per frame is:
//! 1. Map the nose-tip landmark to an ergonomically adjusted cursor position
//! 2. Hit-test the cursor against the live keyboard layout
//! 3. Measure eyelid apertures and recognize debounced blinks
//! 4. Classify accepted blinks as single or double
//! 5. Apply the resulting action to the text buffer or send it
//!
//! # Examples
//!
//! ## Mapping and hit-testing
//!
//! ```
//! use gaze_keyboard::{
//!     gaze::GazeMapper,
//!     keyboard::{hit_test, KeyDefinition, Rect},
//!     landmarks::Keypoint,
//! };
//!
//! # fn main() -> gaze_keyboard::Result<()> {
//! let mapper = GazeMapper::default();
//! let cursor = mapper
//!     .map(&Keypoint::new(4, 320.0, 240.0), 640.0, 480.0)?
//!     .to_viewport(1000.0, 1000.0);
//!
//! let layout = vec![KeyDefinition::new("A", Rect::new(450.0, 650.0, 550.0, 750.0))];
//! assert_eq!(hit_test(cursor, &layout).as_deref(), Some("A"));
//! # Ok(())
//! # }
//! ```
//!
//! ## Blinks and gestures
//!
//! ```
//! use gaze_keyboard::{
//!     blink::{BlinkRecognizer, EyeApertures},
//!     gesture::{Action, GestureClassifier},
//! };
//! use std::time::Duration;
//!
//! let mut recognizer = BlinkRecognizer::default();
//! let mut classifier = GestureClassifier::default();
//!
//! let now = Duration::from_millis(1000);
//! if recognizer.detect(EyeApertures::new(3.0, 14.0), now) {
//!     let action = classifier.on_blink_accepted(now, Some("A"));
//!     assert_eq!(action, Action::ActivateHoveredKey("A".to_string()));
//! }
//! ```
//!
//! ## Replaying a recorded session
//!
//! ```no_run
//! use gaze_keyboard::{
//!     app::{GazeKeyboardApp, Pacing},
//!     chat::EchoReplyService,
//!     config::Config,
//!     cursor_control::NullCursorSink,
//!     landmarks::ReplaySource,
//!     tracker::Tracker,
//! };
//! use std::sync::atomic::AtomicBool;
//!
//! # fn main() -> gaze_keyboard::Result<()> {
//! let config = Config::default();
//! let mut app = GazeKeyboardApp::new(
//!     Tracker::from_config(&config),
//!     Box::new(EchoReplyService),
//!     Box::new(NullCursorSink),
//!     config.display.target_fps,
//!     Pacing::Simulated,
//! );
//! let mut source = ReplaySource::new("session.jsonl");
//! let summary = app.run(&mut source, &AtomicBool::new(true))?;
//! println!("{} blinks, text: {:?}", summary.blinks, app.tracker().text());
//! # Ok(())
//! # }
//! ```

/// Landmark frames, sources and the scoped capture session
pub mod landmarks;

/// Nose-tip to cursor mapping
pub mod gaze;

/// Debounced blink recognition
pub mod blink;

/// Single vs double blink classification
pub mod gesture;

/// Virtual keyboard layout and hit-testing
pub mod keyboard;

/// Text buffer edits and submission
pub mod dispatcher;

/// Conversation log and reply services
pub mod chat;

/// Per-frame pipeline
pub mod tracker;

/// Main application module
pub mod app;

/// Cursor sinks, including X11 pointer control
pub mod cursor_control;

/// Numeric helpers for pixel coordinates
pub mod utils;

/// Error types and result handling
pub mod error;

/// Constants used throughout the application
pub mod constants;

/// Configuration management
pub mod config;

pub use error::{Error, Result};
