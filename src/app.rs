//! Main application module: the frame-driven detection loop.

use crate::{
    chat::ReplyService,
    cursor_control::CursorSink,
    error::{Error, Result},
    landmarks::{CaptureSession, LandmarkSource},
    tracker::{FrameOutcome, Tracker},
};
use log::{debug, error, info, warn};
use std::{
    sync::atomic::{AtomicBool, Ordering},
    thread,
    time::{Duration, Instant},
};

/// How frame timestamps are produced
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pacing {
    /// Wall clock, sleeping to hold the target framerate
    Realtime,
    /// Frame index times the frame interval, no sleeping (replays and tests)
    Simulated,
}

/// Lifecycle of the hands-free input feature
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppState {
    /// Not started yet
    Idle,
    /// Frames are being processed
    Running,
    /// Stopped normally (toggle-off or end of stream)
    Stopped,
    /// Camera or model unavailable; inert until re-activated by the user
    Error(String),
}

/// Counters for one run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub frames: u64,
    pub faces: u64,
    pub skipped: u64,
    pub blinks: u64,
    pub submissions: u64,
}

impl RunSummary {
    fn record(&mut self, outcome: &FrameOutcome) {
        if outcome.cursor.is_some() {
            self.faces += 1;
        }
        if outcome.blink {
            self.blinks += 1;
        }
        if outcome.submitted.is_some() {
            self.submissions += 1;
        }
    }
}

/// Main application struct
pub struct GazeKeyboardApp {
    tracker: Tracker,
    service: Box<dyn ReplyService>,
    cursor_sink: Box<dyn CursorSink>,
    frame_interval: Duration,
    pacing: Pacing,
    state: AppState,
}

impl GazeKeyboardApp {
    /// Create a new application around an already configured tracker
    #[must_use]
    pub fn new(
        tracker: Tracker,
        service: Box<dyn ReplyService>,
        cursor_sink: Box<dyn CursorSink>,
        target_fps: u32,
        pacing: Pacing,
    ) -> Self {
        info!("Initializing gaze keyboard at {} fps ({:?})", target_fps, pacing);
        Self {
            tracker,
            service,
            cursor_sink,
            frame_interval: Duration::from_secs_f64(1.0 / f64::from(target_fps.max(1))),
            pacing,
            state: AppState::Idle,
        }
    }

    /// Run until `active` is cleared, the source ends, or acquisition fails.
    ///
    /// Each frame's inference completes before the next frame starts. A result
    /// that arrives after `active` was cleared is discarded. The source is
    /// released on every exit path.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Acquisition`] when the source cannot be opened or fails
    /// for good while running; the state is then [`AppState::Error`].
    pub fn run(&mut self, source: &mut dyn LandmarkSource, active: &AtomicBool) -> Result<RunSummary> {
        info!("Starting detection loop");

        let mut session = match CaptureSession::acquire(source) {
            Ok(session) => session,
            Err(e) => {
                error!("{}", e);
                self.state = AppState::Error(e.to_string());
                return Err(e);
            }
        };

        self.tracker.activate();
        self.state = AppState::Running;

        let started = Instant::now();
        let mut summary = RunSummary::default();

        while active.load(Ordering::SeqCst) {
            let frame_started = Instant::now();
            let estimate = session.estimate_face();

            if !active.load(Ordering::SeqCst) {
                debug!("Discarding inference that finished after deactivation");
                break;
            }
            if matches!(estimate, Err(Error::EndOfStream)) {
                info!("End of landmark stream reached");
                break;
            }

            let now = match self.pacing {
                Pacing::Realtime => started.elapsed(),
                Pacing::Simulated => self.frame_interval.saturating_mul(
                    u32::try_from(summary.frames).unwrap_or(u32::MAX),
                ),
            };
            summary.frames += 1;

            match estimate {
                Ok(face) => match self.tracker.process_frame(face.as_ref(), now, self.service.as_mut()) {
                    Ok(outcome) => {
                        self.follow_cursor(&outcome);
                        summary.record(&outcome);
                    }
                    Err(e) => {
                        warn!("Frame {} skipped: {}", summary.frames, e);
                        summary.skipped += 1;
                    }
                },
                Err(e) if e.is_transient() => {
                    warn!("Frame detection failed: {}", e);
                    summary.skipped += 1;
                }
                Err(e) => {
                    error!("Landmark source failed: {}", e);
                    self.tracker.deactivate();
                    let e = Error::Acquisition(e.to_string());
                    self.state = AppState::Error(e.to_string());
                    return Err(e);
                }
            }

            if self.pacing == Pacing::Realtime {
                if let Some(remaining) = self.frame_interval.checked_sub(frame_started.elapsed()) {
                    thread::sleep(remaining);
                }
            }
        }

        drop(session);
        self.tracker.deactivate();
        self.state = AppState::Stopped;
        info!(
            "Detection loop stopped after {} frames ({} blinks, {} messages sent)",
            summary.frames, summary.blinks, summary.submissions
        );
        Ok(summary)
    }

    fn follow_cursor(&mut self, outcome: &FrameOutcome) {
        if let Some(cursor) = outcome.cursor {
            if let Err(e) = self.cursor_sink.move_to(cursor) {
                warn!("Failed to move cursor: {}", e);
            }
        }
    }

    #[must_use]
    pub const fn state(&self) -> &AppState {
        &self.state
    }

    #[must_use]
    pub const fn tracker(&self) -> &Tracker {
        &self.tracker
    }
}
