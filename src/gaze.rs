//! Gaze mapping from the nose-tip landmark to normalized screen coordinates.
//!
//! Natural nose-tip motion under-uses the lower half of the screen when seated
//! at typical webcam height, so the vertical axis is stretched and shifted down
//! before clamping.

use crate::{
    constants::{DEFAULT_VERTICAL_BIAS, DEFAULT_VERTICAL_GAIN, NOSE_TIP_INDEX},
    landmarks::{FaceFrame, Keypoint},
    Error, Result,
};

/// Normalized cursor position; (0, 0) is the top-left of the viewport
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct CursorPosition {
    pub x: f64,
    pub y: f64,
}

impl CursorPosition {
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Scale into device viewport pixels
    #[must_use]
    pub fn to_viewport(self, width: f64, height: f64) -> Self {
        Self {
            x: self.x * width,
            y: self.y * height,
        }
    }
}

/// Maps a landmark to an ergonomically adjusted cursor position
#[derive(Debug, Clone)]
pub struct GazeMapper {
    vertical_gain: f64,
    vertical_bias: f64,
    clamp_x: bool,
    nose_tip_index: usize,
}

impl Default for GazeMapper {
    fn default() -> Self {
        Self {
            vertical_gain: DEFAULT_VERTICAL_GAIN,
            vertical_bias: DEFAULT_VERTICAL_BIAS,
            clamp_x: true,
            nose_tip_index: NOSE_TIP_INDEX,
        }
    }
}

impl GazeMapper {
    #[must_use]
    pub const fn new(vertical_gain: f64, vertical_bias: f64, clamp_x: bool) -> Self {
        Self {
            vertical_gain,
            vertical_bias,
            clamp_x,
            nose_tip_index: NOSE_TIP_INDEX,
        }
    }

    /// Use a different landmark as the pointer
    #[must_use]
    pub const fn with_nose_tip_index(mut self, index: usize) -> Self {
        self.nose_tip_index = index;
        self
    }

    /// Map one keypoint detected in a `source_width` x `source_height` image
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] if either dimension is not a positive
    /// finite number
    pub fn map(&self, keypoint: &Keypoint, source_width: f64, source_height: f64) -> Result<CursorPosition> {
        if !(source_width.is_finite() && source_width > 0.0) || !(source_height.is_finite() && source_height > 0.0) {
            return Err(Error::InvalidInput(format!(
                "Source dimensions must be positive, got {source_width}x{source_height}"
            )));
        }

        let norm_x = keypoint.x / source_width;
        let norm_y = keypoint.y / source_height;

        let x = if self.clamp_x { norm_x.clamp(0.0, 1.0) } else { norm_x };
        let y = self.ergonomic_y(norm_y);

        Ok(CursorPosition { x, y })
    }

    /// Map the nose tip of a face frame using the frame's own source size
    ///
    /// # Errors
    ///
    /// - [`Error::Detection`] if the frame lacks the nose-tip landmark
    /// - [`Error::InvalidInput`] if the frame has a degenerate source size
    pub fn map_frame(&self, frame: &FaceFrame) -> Result<CursorPosition> {
        let nose = frame.require(self.nose_tip_index)?;
        self.map(nose, frame.width, frame.height)
    }

    /// Vertical remap; monotonic non-decreasing in `norm_y`
    #[must_use]
    pub fn ergonomic_y(&self, norm_y: f64) -> f64 {
        let y = (norm_y - 0.5) * self.vertical_gain + 0.5 + self.vertical_bias;
        y.clamp(0.0, 1.0)
    }
}
