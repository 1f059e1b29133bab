//! Facial landmark frames and the sources that produce them.
//!
//! The landmark model itself is a black box behind [`LandmarkSource`]: once per
//! frame it yields the keypoints of at most one face, in source-image pixels,
//! already mirrored to match a mirrored camera preview.

use crate::{Error, Result};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::{
    fs::File,
    io::{BufRead, BufReader, ErrorKind, Lines},
    path::{Path, PathBuf},
};

/// A single labeled 2D landmark
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Keypoint {
    /// Landmark index in the face mesh
    pub index: usize,
    /// Horizontal position in source pixels
    pub x: f64,
    /// Vertical position in source pixels
    pub y: f64,
}

impl Keypoint {
    #[must_use]
    pub const fn new(index: usize, x: f64, y: f64) -> Self {
        Self { index, x, y }
    }

    /// Euclidean distance to another keypoint
    #[must_use]
    pub fn distance(&self, other: &Self) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

/// Keypoints of one detected face in one video frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FaceFrame {
    /// Width of the source image the keypoints were detected in
    pub width: f64,
    /// Height of the source image the keypoints were detected in
    pub height: f64,
    /// Keypoints in detector order
    pub keypoints: Vec<Keypoint>,
}

impl FaceFrame {
    #[must_use]
    pub fn new(width: f64, height: f64, keypoints: Vec<Keypoint>) -> Self {
        Self {
            width,
            height,
            keypoints,
        }
    }

    /// Look up a keypoint by landmark index.
    ///
    /// Mesh detectors emit keypoints in index order, so the positional slot is
    /// tried first before falling back to a scan.
    #[must_use]
    pub fn keypoint(&self, index: usize) -> Option<&Keypoint> {
        match self.keypoints.get(index) {
            Some(kp) if kp.index == index => Some(kp),
            _ => self.keypoints.iter().find(|kp| kp.index == index),
        }
    }

    /// Look up a keypoint, reporting a detection error when it is missing
    pub fn require(&self, index: usize) -> Result<&Keypoint> {
        self.keypoint(index)
            .ok_or_else(|| Error::Detection(format!("Landmark {index} missing from frame")))
    }
}

/// Producer of per-frame face landmarks (camera + model, or a recording)
pub trait LandmarkSource {
    /// Acquire the underlying resources (camera, model)
    ///
    /// # Errors
    ///
    /// Returns [`Error::Acquisition`] when the source cannot be brought up
    fn open(&mut self) -> Result<()>;

    /// Estimate the first face in the next frame, or `None` if no face is visible
    ///
    /// # Errors
    ///
    /// - [`Error::Detection`] when a single frame fails
    /// - [`Error::EndOfStream`] when a finite source is exhausted
    fn estimate_face(&mut self) -> Result<Option<FaceFrame>>;

    /// Release every underlying resource. Must be safe to call more than once.
    fn release(&mut self);

    /// Human readable source name
    fn name(&self) -> &str;
}

/// Scoped ownership of an opened landmark source.
///
/// The source is released when the session is dropped, and also when
/// opening fails part way through.
pub struct CaptureSession<'a> {
    source: &'a mut dyn LandmarkSource,
}

impl<'a> CaptureSession<'a> {
    /// Open the source and tie its release to the returned guard
    ///
    /// # Errors
    ///
    /// Returns [`Error::Acquisition`] when opening fails; the source has been
    /// released by the time the error is returned.
    pub fn acquire(source: &'a mut dyn LandmarkSource) -> Result<Self> {
        info!("Acquiring landmark source: {}", source.name());
        if let Err(e) = source.open() {
            source.release();
            return Err(match e {
                Error::Acquisition(msg) => Error::Acquisition(msg),
                other => Error::Acquisition(other.to_string()),
            });
        }
        Ok(Self { source })
    }

    /// Estimate the next frame
    ///
    /// # Errors
    ///
    /// See [`LandmarkSource::estimate_face`]
    pub fn estimate_face(&mut self) -> Result<Option<FaceFrame>> {
        self.source.estimate_face()
    }
}

impl Drop for CaptureSession<'_> {
    fn drop(&mut self) {
        info!("Releasing landmark source: {}", self.source.name());
        self.source.release();
    }
}

/// One line of a recorded landmark trace
#[derive(Debug, Clone, Serialize, Deserialize)]
struct TraceRecord {
    #[serde(default)]
    face: Option<FaceFrame>,
}

/// Replays landmark frames recorded as JSON lines.
///
/// Each line is `{"face": {"width": .., "height": .., "keypoints": [..]}}` or
/// `{"face": null}` when no face was visible. Blank lines are skipped.
pub struct ReplaySource {
    path: PathBuf,
    lines: Option<Lines<BufReader<File>>>,
    line_number: usize,
}

impl ReplaySource {
    #[must_use]
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            lines: None,
            line_number: 0,
        }
    }

    /// Encode a frame as one trace line
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails
    pub fn encode_line(face: Option<&FaceFrame>) -> Result<String> {
        let record = TraceRecord { face: face.cloned() };
        Ok(serde_json::to_string(&record)?)
    }

    fn parse_line(line: &str) -> Result<Option<FaceFrame>> {
        let record: TraceRecord = serde_json::from_str(line)?;
        Ok(record.face)
    }
}

impl LandmarkSource for ReplaySource {
    fn open(&mut self) -> Result<()> {
        let file = File::open(&self.path).map_err(|e| {
            Error::Acquisition(format!("Cannot open trace {}: {e}", self.path.display()))
        })?;
        self.lines = Some(BufReader::new(file).lines());
        self.line_number = 0;
        Ok(())
    }

    fn estimate_face(&mut self) -> Result<Option<FaceFrame>> {
        let lines = self
            .lines
            .as_mut()
            .ok_or_else(|| Error::Detection("Replay source is not open".to_string()))?;

        loop {
            let Some(line) = lines.next() else {
                debug!("Trace {} exhausted after {} lines", self.path.display(), self.line_number);
                return Err(Error::EndOfStream);
            };
            self.line_number += 1;
            let line = match line {
                Ok(line) => line,
                Err(e) if e.kind() == ErrorKind::InvalidData => {
                    warn!("Undecodable trace line {}: {}", self.line_number, e);
                    return Err(Error::Detection(format!("line {}: {e}", self.line_number)));
                }
                Err(e) => return Err(e.into()),
            };
            if line.trim().is_empty() {
                continue;
            }
            return Self::parse_line(&line).map_err(|e| {
                warn!("Malformed trace line {}: {}", self.line_number, e);
                Error::Detection(format!("line {}: {e}", self.line_number))
            });
        }
    }

    fn release(&mut self) {
        self.lines = None;
    }

    fn name(&self) -> &str {
        "replay"
    }
}
