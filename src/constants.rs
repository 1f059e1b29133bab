//! Constants used throughout the application

/// Landmark index of the nose tip in the face mesh
pub const NOSE_TIP_INDEX: usize = 4;

/// Landmark indices of the eyelids (upper, lower)
pub const LEFT_EYE_UPPER_INDEX: usize = 159;
pub const LEFT_EYE_LOWER_INDEX: usize = 145;
pub const RIGHT_EYE_UPPER_INDEX: usize = 386;
pub const RIGHT_EYE_LOWER_INDEX: usize = 374;

/// Ergonomic vertical remapping for seated webcam geometry
pub const DEFAULT_VERTICAL_GAIN: f64 = 1.5;
pub const DEFAULT_VERTICAL_BIAS: f64 = 0.2;

/// Eyelid aperture below which an eye counts as closed, in source pixels of a
/// 640x480 capture
pub const DEFAULT_APERTURE_THRESHOLD: f64 = 6.0;

/// Minimum time between accepted blinks
pub const DEFAULT_REFRACTORY_MS: u64 = 600;

/// Two accepted blinks closer than this form a double blink
pub const DEFAULT_DOUBLE_BLINK_WINDOW_MS: u64 = 500;

/// Duration of the cursor "click" flash after a blink
pub const DEFAULT_CLICK_FLASH_MS: u64 = 200;

/// Key glyphs with special dispatch behavior
pub const BACKSPACE_GLYPH: &str = "⌫";
pub const SPACE_GLYPH: &str = " ";

/// Virtual keyboard rows, top to bottom
pub const KEY_ROWS: [&[&str]; 3] = [
    &["Q", "W", "E", "R", "T", "Y", "U", "I", "O", "P"],
    &["A", "S", "D", "F", "G", "H", "J", "K", "L"],
    &["Z", "X", "C", "V", "B", "N", "M", SPACE_GLYPH, BACKSPACE_GLYPH],
];

/// Default viewport and key geometry (device pixels)
pub const DEFAULT_VIEWPORT_WIDTH: f64 = 1280.0;
pub const DEFAULT_VIEWPORT_HEIGHT: f64 = 720.0;
pub const DEFAULT_KEY_WIDTH: f64 = 64.0;
pub const DEFAULT_KEY_HEIGHT: f64 = 64.0;
pub const DEFAULT_KEY_GAP: f64 = 8.0;
pub const DEFAULT_BOTTOM_MARGIN: f64 = 24.0;

/// Default frames per second of the detection loop
pub const DEFAULT_TARGET_FPS: u32 = 30;

/// Chat defaults
pub const DEFAULT_ASSISTANT_NAME: &str = "Omega";
pub const DEFAULT_CHAT_ENDPOINT: &str = "http://localhost:8000";
pub const DEFAULT_CHAT_TIMEOUT_SECS: u64 = 30;
pub const FALLBACK_REPLY: &str = "⚠️ Backend not reachable.";
