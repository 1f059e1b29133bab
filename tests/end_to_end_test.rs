//! End-to-end scenarios from landmark frames to typed and sent text


use gaze_keyboard::{
    app::{AppState, GazeKeyboardApp, Pacing},
    blink::{BlinkRecognizer, RearmPolicy},
    chat::{Conversation, EchoReplyService, Message},
    config::Config,
    constants::{BACKSPACE_GLYPH, FALLBACK_REPLY},
    cursor_control::NullCursorSink,
    dispatcher::{InputDispatcher, TextBuffer},
    gaze::GazeMapper,
    gesture::{Action, GestureClassifier},
    keyboard::{KeyDefinition, KeyLayout, Keyboard, QwertyLayout, Rect},
    landmarks::{FaceFrame, ReplaySource},
    tracker::Tracker,
};
use std::sync::atomic::AtomicBool;
use test_helpers::{face, ms, nose_for_viewport, write_trace};

const VIEWPORT: (f64, f64) = (640.0, 480.0);

fn key_center(layout: &dyn KeyLayout, label: &str) -> (f64, f64) {
    let key = layout
        .keys()
        .into_iter()
        .find(|k| k.label == label)
        .expect("key present in layout");
    (
        (key.bounds.left + key.bounds.right) / 2.0,
        (key.bounds.top + key.bounds.bottom) / 2.0,
    )
}

fn small_layout() -> Vec<KeyDefinition> {
    vec![
        KeyDefinition::new("A", Rect::new(100.0, 300.0, 160.0, 360.0)),
        KeyDefinition::new(BACKSPACE_GLYPH, Rect::new(400.0, 300.0, 460.0, 360.0)),
    ]
}

fn tracker_with_refractory(refractory_ms: u64) -> Tracker<Vec<KeyDefinition>> {
    Tracker::with_parts(
        GazeMapper::default(),
        BlinkRecognizer::new(6.0, ms(refractory_ms), RearmPolicy::Refractory),
        GestureClassifier::default(),
        Keyboard::new(small_layout()),
        VIEWPORT,
        Conversation::new("Omega"),
    )
}

#[test]
fn test_single_blink_on_a_types_a() {
    let mut tracker = tracker_with_refractory(600);
    let nose = nose_for_viewport(key_center(&small_layout(), "A"), VIEWPORT);

    let outcome = tracker
        .process_frame(Some(&face(nose, 2.0)), ms(1000), &mut EchoReplyService)
        .unwrap();

    assert_eq!(outcome.hovered.as_deref(), Some("A"));
    assert_eq!(outcome.action, Some(Action::ActivateHoveredKey("A".to_string())));
    assert_eq!(tracker.text(), "A");
}

#[test]
fn test_double_blink_on_backspace_submits_instead_of_deleting() {
    let hovered = Some(BACKSPACE_GLYPH);
    let mut classifier = GestureClassifier::default();
    let dispatcher = InputDispatcher;
    let mut buffer = TextBuffer::new("HIX");

    // First blink is a plain key press
    let first = classifier.on_blink_accepted(ms(1000), hovered);
    assert_eq!(dispatcher.apply(&first, &mut buffer), None);
    assert_eq!(buffer.as_str(), "HI");

    // Second blink inside the window sends the text untouched
    let second = classifier.on_blink_accepted(ms(1200), hovered);
    assert_eq!(second, Action::Submit);
    assert_eq!(dispatcher.apply(&second, &mut buffer), Some("HI".to_string()));
    assert_eq!(buffer.as_str(), "");
}

#[test]
fn test_tracker_double_blink_sends_message() {
    // Short refractory so two accepted blinks can fall inside the double-blink window
    let mut tracker = tracker_with_refractory(100);
    tracker.set_text("HIX");
    let nose = nose_for_viewport(key_center(&small_layout(), BACKSPACE_GLYPH), VIEWPORT);

    tracker.process_frame(Some(&face(nose, 2.0)), ms(1000), &mut EchoReplyService).unwrap();
    tracker.process_frame(Some(&face(nose, 12.0)), ms(1100), &mut EchoReplyService).unwrap();
    let outcome = tracker
        .process_frame(Some(&face(nose, 2.0)), ms(1200), &mut EchoReplyService)
        .unwrap();

    assert_eq!(outcome.action, Some(Action::Submit));
    assert_eq!(outcome.submitted.as_deref(), Some("HI"));
    assert_eq!(outcome.reply, Some(Message::bot("You said: HI")));
    assert_eq!(tracker.text(), "");
}

#[test]
fn test_double_blink_with_empty_buffer_sends_nothing() {
    let mut tracker = tracker_with_refractory(100);
    let nose = (320.0, 20.0); // above every key

    tracker.process_frame(Some(&face(nose, 2.0)), ms(1000), &mut EchoReplyService).unwrap();
    let outcome = tracker
        .process_frame(Some(&face(nose, 2.0)), ms(1150), &mut EchoReplyService)
        .unwrap();

    assert_eq!(outcome.action, Some(Action::Submit));
    assert_eq!(outcome.submitted, None);
    assert_eq!(tracker.conversation().messages().len(), 1);
}

fn hold(frames: &mut Vec<Option<FaceFrame>>, nose: (f64, f64), count: usize, aperture: f64) {
    frames.extend(std::iter::repeat(Some(face(nose, aperture))).take(count));
}

#[test]
fn test_replay_types_and_corrects_text() {
    let config = Config::default();
    let layout = QwertyLayout::from_config(&config.keyboard);
    let viewport = layout.viewport();
    let on = |label: &str| nose_for_viewport(key_center(&layout, label), viewport);

    // Simulated 30 fps: frame i is stamped i * 33.3ms
    let mut frames = Vec::new();
    hold(&mut frames, on("H"), 10, 12.0);
    hold(&mut frames, on("H"), 1, 2.0); // 333ms: H
    hold(&mut frames, on("I"), 30, 12.0);
    hold(&mut frames, on("I"), 1, 2.0); // 1367ms: I
    hold(&mut frames, on("I"), 30, 12.0);
    frames.push(None);
    hold(&mut frames, on("I"), 1, 2.0); // 2433ms: I again
    hold(&mut frames, on("I"), 25, 12.0);
    hold(&mut frames, on(BACKSPACE_GLYPH), 1, 2.0); // 3300ms: too late to pair, deletes
    hold(&mut frames, on(BACKSPACE_GLYPH), 5, 12.0);

    let path = write_trace("hi", &frames).unwrap();
    let mut app = GazeKeyboardApp::new(
        Tracker::from_config(&config),
        Box::new(EchoReplyService),
        Box::new(NullCursorSink),
        30,
        Pacing::Simulated,
    );
    let mut source = ReplaySource::new(&path);
    let summary = app.run(&mut source, &AtomicBool::new(true)).unwrap();
    std::fs::remove_file(&path).ok();

    assert_eq!(app.state(), &AppState::Stopped);
    assert_eq!(summary.frames, frames.len() as u64);
    assert_eq!(summary.faces, frames.len() as u64 - 1);
    assert_eq!(summary.blinks, 4);
    assert_eq!(summary.submissions, 0);
    assert_eq!(app.tracker().text(), "HI");
}

#[test]
fn test_reply_failure_surfaces_fallback_message() {
    struct Offline;
    impl gaze_keyboard::chat::ReplyService for Offline {
        fn reply(&mut self, _text: &str) -> gaze_keyboard::Result<String> {
            Err(gaze_keyboard::Error::Network("connection refused".to_string()))
        }
    }

    let mut tracker = tracker_with_refractory(600);
    tracker.set_text("HELLO");
    let reply = tracker.send_now(&mut Offline);
    assert_eq!(reply, Some(Message::bot(FALLBACK_REPLY)));
    assert_eq!(tracker.text(), "");
}

#[test]
fn test_inactive_flag_processes_no_frames() {
    let frames = vec![Some(face((320.0, 240.0), 2.0)); 5];
    let path = write_trace("inactive", &frames).unwrap();
    let mut app = GazeKeyboardApp::new(
        Tracker::from_config(&Config::default()),
        Box::new(EchoReplyService),
        Box::new(NullCursorSink),
        30,
        Pacing::Simulated,
    );
    let mut source = ReplaySource::new(&path);
    let summary = app.run(&mut source, &AtomicBool::new(false)).unwrap();
    std::fs::remove_file(&path).ok();

    assert_eq!(summary.frames, 0);
    assert_eq!(app.tracker().text(), "");
}
