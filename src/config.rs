//! Configuration management for the gaze keyboard application

use crate::{
    blink::{BlinkRecognizer, RearmPolicy},
    constants::{
        DEFAULT_APERTURE_THRESHOLD, DEFAULT_ASSISTANT_NAME, DEFAULT_BOTTOM_MARGIN, DEFAULT_CHAT_ENDPOINT,
        DEFAULT_CHAT_TIMEOUT_SECS, DEFAULT_CLICK_FLASH_MS, DEFAULT_DOUBLE_BLINK_WINDOW_MS, DEFAULT_KEY_GAP,
        DEFAULT_KEY_HEIGHT, DEFAULT_KEY_WIDTH, DEFAULT_REFRACTORY_MS, DEFAULT_TARGET_FPS, DEFAULT_VERTICAL_BIAS,
        DEFAULT_VERTICAL_GAIN, DEFAULT_VIEWPORT_HEIGHT, DEFAULT_VIEWPORT_WIDTH, NOSE_TIP_INDEX,
    },
    gaze::GazeMapper,
    gesture::GestureClassifier,
    Error, Result,
};
use serde::{Deserialize, Serialize};
use std::{path::Path, time::Duration};

/// Application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Gaze mapping configuration
    pub gaze: GazeConfig,

    /// Blink recognition configuration
    pub blink: BlinkConfig,

    /// Gesture classification configuration
    pub gesture: GestureConfig,

    /// Keyboard geometry
    pub keyboard: KeyboardConfig,

    /// Reply service configuration
    pub chat: ChatConfig,

    /// Display configuration
    pub display: DisplayConfig,

    /// Cursor control configuration
    pub cursor: CursorConfig,
}

/// Gaze mapping parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GazeConfig {
    /// Vertical stretch applied around the frame center
    pub vertical_gain: f64,

    /// Downward shift of the vertical center
    pub vertical_bias: f64,

    /// Clamp horizontal output to [0, 1]
    pub clamp_x: bool,

    /// Landmark used as the pointer
    pub nose_tip_index: usize,
}

/// Blink recognition parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BlinkConfig {
    /// Eyelid distance below which an eye counts as closed (source pixels)
    pub aperture_threshold: f64,

    /// Minimum milliseconds between accepted blinks
    pub refractory_ms: u64,

    /// When a held closure may fire again
    pub rearm: RearmPolicy,
}

/// Gesture classification parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GestureConfig {
    /// Two blinks closer than this submit the message
    pub double_blink_window_ms: u64,

    /// How long the cursor shows the click state after a blink
    pub click_flash_ms: u64,
}

/// Keyboard geometry in viewport pixels
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct KeyboardConfig {
    pub viewport_width: f64,
    pub viewport_height: f64,
    pub key_width: f64,
    pub key_height: f64,
    pub key_gap: f64,
    pub bottom_margin: f64,
}

/// Reply service configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatConfig {
    /// Base URL of the reply backend
    pub endpoint: String,

    /// Request timeout in seconds
    pub timeout_secs: u64,

    /// Name used in the greeting
    pub assistant_name: String,

    /// Echo messages locally instead of calling the backend
    pub offline: bool,
}

/// Display configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// Target framerate of the detection loop
    pub target_fps: u32,
}

/// Cursor control configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CursorConfig {
    /// Move the X11 pointer along with the gaze cursor
    pub x11_enabled: bool,
}

impl Default for GazeConfig {
    fn default() -> Self {
        Self {
            vertical_gain: DEFAULT_VERTICAL_GAIN,
            vertical_bias: DEFAULT_VERTICAL_BIAS,
            clamp_x: true,
            nose_tip_index: NOSE_TIP_INDEX,
        }
    }
}

impl Default for BlinkConfig {
    fn default() -> Self {
        Self {
            aperture_threshold: DEFAULT_APERTURE_THRESHOLD,
            refractory_ms: DEFAULT_REFRACTORY_MS,
            rearm: RearmPolicy::Refractory,
        }
    }
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self {
            double_blink_window_ms: DEFAULT_DOUBLE_BLINK_WINDOW_MS,
            click_flash_ms: DEFAULT_CLICK_FLASH_MS,
        }
    }
}

impl Default for KeyboardConfig {
    fn default() -> Self {
        Self {
            viewport_width: DEFAULT_VIEWPORT_WIDTH,
            viewport_height: DEFAULT_VIEWPORT_HEIGHT,
            key_width: DEFAULT_KEY_WIDTH,
            key_height: DEFAULT_KEY_HEIGHT,
            key_gap: DEFAULT_KEY_GAP,
            bottom_margin: DEFAULT_BOTTOM_MARGIN,
        }
    }
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_CHAT_ENDPOINT.to_string(),
            timeout_secs: DEFAULT_CHAT_TIMEOUT_SECS,
            assistant_name: DEFAULT_ASSISTANT_NAME.to_string(),
            offline: false,
        }
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            target_fps: DEFAULT_TARGET_FPS,
        }
    }
}

impl Config {
    /// Load configuration from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse configuration from YAML text
    pub fn from_yaml(content: &str) -> Result<Self> {
        serde_yaml::from_str(content).map_err(|e| Error::ConfigError(format!("Failed to parse config: {e}")))
    }

    /// Save configuration to a YAML file
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        std::fs::write(path, self.to_yaml()?)?;
        Ok(())
    }

    /// Serialize configuration to YAML text
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).map_err(|e| Error::ConfigError(format!("Failed to serialize config: {e}")))
    }

    /// Build the gaze mapper described by this configuration
    #[must_use]
    pub fn gaze_mapper(&self) -> GazeMapper {
        GazeMapper::new(self.gaze.vertical_gain, self.gaze.vertical_bias, self.gaze.clamp_x)
            .with_nose_tip_index(self.gaze.nose_tip_index)
    }

    /// Build the blink recognizer described by this configuration
    #[must_use]
    pub fn blink_recognizer(&self) -> BlinkRecognizer {
        BlinkRecognizer::new(
            self.blink.aperture_threshold,
            Duration::from_millis(self.blink.refractory_ms),
            self.blink.rearm,
        )
    }

    /// Build the gesture classifier described by this configuration
    #[must_use]
    pub fn gesture_classifier(&self) -> GestureClassifier {
        GestureClassifier::new(Duration::from_millis(self.gesture.double_blink_window_ms))
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if !(self.gaze.vertical_gain.is_finite() && self.gaze.vertical_gain > 0.0) {
            return Err(Error::ConfigError("Vertical gain must be positive".to_string()));
        }
        if !self.gaze.vertical_bias.is_finite() {
            return Err(Error::ConfigError("Vertical bias must be finite".to_string()));
        }

        if !(self.blink.aperture_threshold.is_finite() && self.blink.aperture_threshold > 0.0) {
            return Err(Error::ConfigError("Aperture threshold must be positive".to_string()));
        }
        if self.blink.refractory_ms == 0 {
            return Err(Error::ConfigError(
                "Refractory interval must be greater than 0".to_string(),
            ));
        }
        if self.gesture.double_blink_window_ms == 0 {
            return Err(Error::ConfigError(
                "Double blink window must be greater than 0".to_string(),
            ));
        }
        if self.gesture.double_blink_window_ms <= self.blink.refractory_ms {
            log::warn!(
                "Double blink window ({}ms) does not exceed the refractory interval ({}ms); double blinks cannot occur",
                self.gesture.double_blink_window_ms,
                self.blink.refractory_ms
            );
        }

        let kb = &self.keyboard;
        for (name, value) in [
            ("Viewport width", kb.viewport_width),
            ("Viewport height", kb.viewport_height),
            ("Key width", kb.key_width),
            ("Key height", kb.key_height),
        ] {
            if !(value.is_finite() && value > 0.0) {
                return Err(Error::ConfigError(format!("{name} must be positive")));
            }
        }
        if kb.key_gap < 0.0 || kb.bottom_margin < 0.0 {
            return Err(Error::ConfigError(
                "Key gap and bottom margin must not be negative".to_string(),
            ));
        }

        if self.display.target_fps == 0 {
            return Err(Error::ConfigError("Target FPS must be greater than 0".to_string()));
        }

        if !self.chat.offline && self.chat.endpoint.trim().is_empty() {
            return Err(Error::ConfigError("Chat endpoint must be set unless offline".to_string()));
        }

        Ok(())
    }
}

/// Example configuration file content
pub const EXAMPLE_CONFIG: &str = r#"# Gaze Keyboard Configuration

# Nose-tip to cursor mapping
gaze:
  vertical_gain: 1.5
  vertical_bias: 0.2
  clamp_x: true
  nose_tip_index: 4

# Blink recognition
blink:
  aperture_threshold: 6.0
  refractory_ms: 600
  rearm: refractory   # or "reopen"

# Single vs double blink
gesture:
  double_blink_window_ms: 500
  click_flash_ms: 200

# Keyboard geometry (viewport pixels)
keyboard:
  viewport_width: 1280.0
  viewport_height: 720.0
  key_width: 64.0
  key_height: 64.0
  key_gap: 8.0
  bottom_margin: 24.0

# Reply backend
chat:
  endpoint: "http://localhost:8000"
  timeout_secs: 30
  assistant_name: "Omega"
  offline: false

# Detection loop
display:
  target_fps: 30

# Cursor control
cursor:
  x11_enabled: false
"#;
