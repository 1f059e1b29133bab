//! Blink recognition from eyelid apertures.
//!
//! Each frame, the distance between upper and lower eyelid landmarks is
//! measured for both eyes. Either eye dropping below the threshold is a closure
//! candidate; a candidate becomes a blink only once the refractory interval
//! since the last accepted blink has passed.

use crate::{
    constants::{
        DEFAULT_APERTURE_THRESHOLD, DEFAULT_REFRACTORY_MS, LEFT_EYE_LOWER_INDEX, LEFT_EYE_UPPER_INDEX,
        RIGHT_EYE_LOWER_INDEX, RIGHT_EYE_UPPER_INDEX,
    },
    landmarks::FaceFrame,
    Error, Result,
};
use log::debug;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// When the recognizer may fire again after an accepted blink
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RearmPolicy {
    /// Any closed frame after the refractory interval fires, so a held
    /// closure repeats
    #[default]
    Refractory,
    /// Both eyes must be seen open between two accepted blinks
    Reopen,
}

impl std::str::FromStr for RearmPolicy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "refractory" => Ok(Self::Refractory),
            "reopen" => Ok(Self::Reopen),
            _ => Err(Error::InvalidInput(format!("Unknown rearm policy: {s}"))),
        }
    }
}

/// Eyelid openings of both eyes, in source pixels
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EyeApertures {
    pub left: f64,
    pub right: f64,
}

impl EyeApertures {
    #[must_use]
    pub const fn new(left: f64, right: f64) -> Self {
        Self { left, right }
    }

    /// Measure both apertures from a face frame
    ///
    /// # Errors
    ///
    /// Returns [`Error::Detection`] if any eyelid landmark is missing
    pub fn from_frame(frame: &FaceFrame) -> Result<Self> {
        let left = frame
            .require(LEFT_EYE_UPPER_INDEX)?
            .distance(frame.require(LEFT_EYE_LOWER_INDEX)?);
        let right = frame
            .require(RIGHT_EYE_UPPER_INDEX)?
            .distance(frame.require(RIGHT_EYE_LOWER_INDEX)?);
        Ok(Self { left, right })
    }

    /// Either eye below the threshold
    #[must_use]
    pub fn is_closure(&self, threshold: f64) -> bool {
        self.left < threshold || self.right < threshold
    }
}

/// Debounced blink detector
#[derive(Debug, Clone)]
pub struct BlinkRecognizer {
    threshold: f64,
    refractory: Duration,
    rearm: RearmPolicy,
    last_accepted: Option<Duration>,
    armed: bool,
}

impl Default for BlinkRecognizer {
    fn default() -> Self {
        Self::new(
            DEFAULT_APERTURE_THRESHOLD,
            Duration::from_millis(DEFAULT_REFRACTORY_MS),
            RearmPolicy::default(),
        )
    }
}

impl BlinkRecognizer {
    #[must_use]
    pub const fn new(threshold: f64, refractory: Duration, rearm: RearmPolicy) -> Self {
        Self {
            threshold,
            refractory,
            rearm,
            last_accepted: None,
            armed: true,
        }
    }

    /// Evaluate a face frame at time `now`; true exactly when a new blink is accepted
    ///
    /// # Errors
    ///
    /// Returns [`Error::Detection`] if the frame lacks eyelid landmarks
    pub fn detect_blink(&mut self, frame: &FaceFrame, now: Duration) -> Result<bool> {
        let apertures = EyeApertures::from_frame(frame)?;
        Ok(self.detect(apertures, now))
    }

    /// Evaluate pre-measured apertures at time `now`
    pub fn detect(&mut self, apertures: EyeApertures, now: Duration) -> bool {
        if !apertures.is_closure(self.threshold) {
            self.armed = true;
            return false;
        }

        if self.rearm == RearmPolicy::Reopen && !self.armed {
            return false;
        }

        let elapsed_ok = self
            .last_accepted
            .map_or(true, |last| now.saturating_sub(last) > self.refractory);
        if !elapsed_ok {
            debug!(
                "Closure at {}ms rejected inside refractory interval (left {:.1}, right {:.1})",
                now.as_millis(),
                apertures.left,
                apertures.right
            );
            return false;
        }

        debug!(
            "Blink accepted at {}ms (left {:.1}, right {:.1})",
            now.as_millis(),
            apertures.left,
            apertures.right
        );
        self.last_accepted = Some(now);
        self.armed = false;
        true
    }

    /// Time of the last accepted blink
    #[must_use]
    pub const fn last_accepted(&self) -> Option<Duration> {
        self.last_accepted
    }

    /// Forget all history
    pub fn reset(&mut self) {
        self.last_accepted = None;
        self.armed = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::landmarks::Keypoint;

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    fn closed() -> EyeApertures {
        EyeApertures::new(2.0, 2.0)
    }

    fn open() -> EyeApertures {
        EyeApertures::new(12.0, 12.0)
    }

    #[test]
    fn test_either_eye_triggers_closure() {
        assert!(EyeApertures::new(5.0, 20.0).is_closure(6.0));
        assert!(EyeApertures::new(20.0, 5.0).is_closure(6.0));
        assert!(!EyeApertures::new(7.0, 8.0).is_closure(6.0));
        assert!(!EyeApertures::new(6.0, 6.0).is_closure(6.0));
    }

    #[test]
    fn test_refractory_debounce() {
        let mut recognizer = BlinkRecognizer::default();
        assert!(recognizer.detect(closed(), ms(0)));
        assert!(!recognizer.detect(closed(), ms(300)));
        assert!(recognizer.detect(closed(), ms(650)));
        assert_eq!(recognizer.last_accepted(), Some(ms(650)));
    }

    #[test]
    fn test_refractory_boundary_is_strict() {
        let mut recognizer = BlinkRecognizer::default();
        assert!(recognizer.detect(closed(), ms(1000)));
        assert!(!recognizer.detect(closed(), ms(1600)));
        assert!(recognizer.detect(closed(), ms(1601)));
    }

    #[test]
    fn test_rejected_candidate_keeps_timer() {
        let mut recognizer = BlinkRecognizer::default();
        assert!(recognizer.detect(closed(), ms(0)));
        assert!(!recognizer.detect(closed(), ms(500)));
        assert_eq!(recognizer.last_accepted(), Some(ms(0)));
    }

    #[test]
    fn test_held_closure_refires_under_refractory_policy() {
        let mut recognizer = BlinkRecognizer::default();
        let fired: Vec<bool> = (0..=40).map(|i| recognizer.detect(closed(), ms(i * 33))).collect();
        assert_eq!(fired.iter().filter(|f| **f).count(), 3);
    }

    #[test]
    fn test_reopen_policy_requires_open_frame() {
        let mut recognizer = BlinkRecognizer::new(6.0, ms(600), RearmPolicy::Reopen);
        assert!(recognizer.detect(closed(), ms(0)));
        assert!(!recognizer.detect(closed(), ms(1000)));
        assert!(!recognizer.detect(open(), ms(1100)));
        assert!(recognizer.detect(closed(), ms(1200)));
    }

    #[test]
    fn test_reset_forgets_history() {
        let mut recognizer = BlinkRecognizer::default();
        assert!(recognizer.detect(closed(), ms(100)));
        recognizer.reset();
        assert!(recognizer.detect(closed(), ms(200)));
    }

    #[test]
    fn test_apertures_from_frame() {
        let frame = FaceFrame::new(
            640.0,
            480.0,
            vec![
                Keypoint::new(LEFT_EYE_UPPER_INDEX, 100.0, 100.0),
                Keypoint::new(LEFT_EYE_LOWER_INDEX, 100.0, 105.0),
                Keypoint::new(RIGHT_EYE_UPPER_INDEX, 200.0, 100.0),
                Keypoint::new(RIGHT_EYE_LOWER_INDEX, 200.0, 120.0),
            ],
        );
        let apertures = EyeApertures::from_frame(&frame).unwrap();
        assert_eq!(apertures, EyeApertures::new(5.0, 20.0));

        let mut recognizer = BlinkRecognizer::default();
        assert!(recognizer.detect_blink(&frame, ms(0)).unwrap());
    }

    #[test]
    fn test_missing_eyelid_is_detection_error() {
        let frame = FaceFrame::new(640.0, 480.0, vec![Keypoint::new(4, 1.0, 1.0)]);
        let mut recognizer = BlinkRecognizer::default();
        assert!(matches!(recognizer.detect_blink(&frame, ms(0)), Err(Error::Detection(_))));
    }

    #[test]
    fn test_rearm_policy_parse() {
        assert_eq!("Reopen".parse::<RearmPolicy>().unwrap(), RearmPolicy::Reopen);
        assert!("sometimes".parse::<RearmPolicy>().is_err());
    }
}
