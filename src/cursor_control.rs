//! Cursor sinks that follow the gaze cursor.
//!
//! The gaze cursor lives in viewport pixels. A sink decides what to do with
//! each update; the X11 sink warps the system pointer so that the regular
//! desktop follows the user's head.

use crate::{
    error::{Error, Result},
    gaze::CursorPosition,
    utils::f64_to_i16_clamp,
};
use log::{debug, info};
use x11rb::{
    connection::Connection,
    protocol::xproto::{ConnectionExt, Screen},
    rust_connection::RustConnection,
};

/// Receiver of cursor updates in viewport pixels
pub trait CursorSink {
    /// Move the visible cursor
    ///
    /// # Errors
    ///
    /// Returns [`Error::CursorControl`] if the cursor could not be moved
    fn move_to(&mut self, position: CursorPosition) -> Result<()>;
}

/// Sink that ignores updates
#[derive(Debug, Default)]
pub struct NullCursorSink;

impl CursorSink for NullCursorSink {
    fn move_to(&mut self, _position: CursorPosition) -> Result<()> {
        Ok(())
    }
}

/// Warps the X11 pointer, scaling the viewport onto the root screen
pub struct X11CursorSink {
    connection: RustConnection,
    screen: Screen,
    viewport_width: f64,
    viewport_height: f64,
}

impl X11CursorSink {
    /// Connect to the default display
    ///
    /// # Errors
    ///
    /// Returns [`Error::CursorControl`] if no X11 display is reachable
    pub fn new(viewport_width: f64, viewport_height: f64) -> Result<Self> {
        info!("Initializing X11 cursor sink");

        let (connection, screen_num) = RustConnection::connect(None)
            .map_err(|e| Error::CursorControl(format!("Failed to connect to X11: {e}")))?;

        let screen = connection
            .setup()
            .roots
            .get(screen_num)
            .ok_or_else(|| Error::CursorControl("Failed to get screen".to_string()))?
            .clone();

        info!(
            "Connected to X11 display, screen: {}x{}",
            screen.width_in_pixels, screen.height_in_pixels
        );

        Ok(Self {
            connection,
            screen,
            viewport_width,
            viewport_height,
        })
    }

    /// Root screen dimensions
    #[must_use]
    pub const fn screen_size(&self) -> (u16, u16) {
        (self.screen.width_in_pixels, self.screen.height_in_pixels)
    }
}

/// Map a viewport position onto a screen of the given size, clamped to its pixels
#[must_use]
pub fn map_to_screen(
    position: CursorPosition,
    viewport: (f64, f64),
    screen: (u16, u16),
) -> (i16, i16) {
    let (vw, vh) = viewport;
    let (sw, sh) = screen;
    let nx = if vw > 0.0 { position.x / vw } else { 0.0 };
    let ny = if vh > 0.0 { position.y / vh } else { 0.0 };
    let max_x = f64::from(sw.saturating_sub(1));
    let max_y = f64::from(sh.saturating_sub(1));
    (
        f64_to_i16_clamp(nx * f64::from(sw), 0.0, max_x),
        f64_to_i16_clamp(ny * f64::from(sh), 0.0, max_y),
    )
}

impl CursorSink for X11CursorSink {
    fn move_to(&mut self, position: CursorPosition) -> Result<()> {
        let (x, y) = map_to_screen(
            position,
            (self.viewport_width, self.viewport_height),
            self.screen_size(),
        );

        debug!("Warping pointer to ({}, {})", x, y);

        self.connection
            .warp_pointer(x11rb::NONE, self.screen.root, 0, 0, 0, 0, x, y)
            .map_err(|e| Error::CursorControl(format!("Failed to warp pointer: {e}")))?;

        self.connection
            .flush()
            .map_err(|e| Error::CursorControl(format!("Failed to flush connection: {e}")))?;

        Ok(())
    }
}
