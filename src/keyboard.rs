//! Virtual keyboard layout and cursor hit-testing.
//!
//! Key geometry is data owned by the layout, not by the hit-tester: every
//! hit-test re-queries the layout so a resize between frames is always seen.

use crate::{
    config::KeyboardConfig,
    constants::{BACKSPACE_GLYPH, KEY_ROWS, SPACE_GLYPH},
    gaze::CursorPosition,
};
use log::debug;

/// Axis-aligned region in viewport pixels, edges inclusive
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub left: f64,
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
}

impl Rect {
    #[must_use]
    pub const fn new(left: f64, top: f64, right: f64, bottom: f64) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    /// Build from origin and size
    #[must_use]
    pub fn from_origin(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self::new(left, top, left + width, top + height)
    }

    #[must_use]
    pub fn contains(&self, x: f64, y: f64) -> bool {
        self.left <= x && x <= self.right && self.top <= y && y <= self.bottom
    }

    #[must_use]
    pub fn width(&self) -> f64 {
        self.right - self.left
    }

    #[must_use]
    pub fn height(&self) -> f64 {
        self.bottom - self.top
    }
}

/// A key label and where it is currently drawn
#[derive(Debug, Clone, PartialEq)]
pub struct KeyDefinition {
    pub label: String,
    pub bounds: Rect,
}

impl KeyDefinition {
    #[must_use]
    pub fn new(label: impl Into<String>, bounds: Rect) -> Self {
        Self {
            label: label.into(),
            bounds,
        }
    }

    #[must_use]
    pub fn is_backspace(&self) -> bool {
        self.label == BACKSPACE_GLYPH
    }

    #[must_use]
    pub fn is_space(&self) -> bool {
        self.label == SPACE_GLYPH
    }
}

/// Anything that can report the live key geometry
pub trait KeyLayout {
    /// Current keys in layout order
    fn keys(&self) -> Vec<KeyDefinition>;
}

impl KeyLayout for Vec<KeyDefinition> {
    fn keys(&self) -> Vec<KeyDefinition> {
        self.clone()
    }
}

/// Label of the first key whose bounds contain the cursor (viewport pixels)
#[must_use]
pub fn hit_test(cursor: CursorPosition, layout: &dyn KeyLayout) -> Option<String> {
    layout
        .keys()
        .into_iter()
        .find(|key| key.bounds.contains(cursor.x, cursor.y))
        .map(|key| key.label)
}

/// QWERTY grid anchored to the bottom of the viewport, rows centered
#[derive(Debug, Clone)]
pub struct QwertyLayout {
    viewport_width: f64,
    viewport_height: f64,
    key_width: f64,
    key_height: f64,
    key_gap: f64,
    bottom_margin: f64,
}

impl Default for QwertyLayout {
    fn default() -> Self {
        Self::from_config(&KeyboardConfig::default())
    }
}

impl QwertyLayout {
    #[must_use]
    pub fn from_config(config: &KeyboardConfig) -> Self {
        Self {
            viewport_width: config.viewport_width,
            viewport_height: config.viewport_height,
            key_width: config.key_width,
            key_height: config.key_height,
            key_gap: config.key_gap,
            bottom_margin: config.bottom_margin,
        }
    }

    /// Track a new viewport size; takes effect on the next hit-test
    pub fn resize(&mut self, viewport_width: f64, viewport_height: f64) {
        debug!("Keyboard viewport resized to {viewport_width}x{viewport_height}");
        self.viewport_width = viewport_width;
        self.viewport_height = viewport_height;
    }

    #[must_use]
    pub const fn viewport(&self) -> (f64, f64) {
        (self.viewport_width, self.viewport_height)
    }
}

impl KeyLayout for QwertyLayout {
    #[allow(clippy::cast_precision_loss)] // Row and column counts are tiny
    fn keys(&self) -> Vec<KeyDefinition> {
        let rows = KEY_ROWS.len() as f64;
        let block_height = rows * self.key_height + (rows - 1.0) * self.key_gap;
        let block_top = self.viewport_height - self.bottom_margin - block_height;

        let mut keys = Vec::with_capacity(KEY_ROWS.iter().map(|r| r.len()).sum());
        for (row_idx, row) in KEY_ROWS.iter().enumerate() {
            let n = row.len() as f64;
            let row_width = n * self.key_width + (n - 1.0) * self.key_gap;
            let row_left = (self.viewport_width - row_width) / 2.0;
            let top = block_top + row_idx as f64 * (self.key_height + self.key_gap);

            for (col_idx, label) in row.iter().enumerate() {
                let left = row_left + col_idx as f64 * (self.key_width + self.key_gap);
                keys.push(KeyDefinition::new(
                    *label,
                    Rect::from_origin(left, top, self.key_width, self.key_height),
                ));
            }
        }
        keys
    }
}

/// Keyboard with hover tracking
#[derive(Debug, Clone)]
pub struct Keyboard<L: KeyLayout = QwertyLayout> {
    layout: L,
    hovered: Option<String>,
    active: bool,
}

impl<L: KeyLayout> Keyboard<L> {
    #[must_use]
    pub const fn new(layout: L) -> Self {
        Self {
            layout,
            hovered: None,
            active: true,
        }
    }

    /// Hit-test the cursor (viewport pixels) and remember the hovered key
    pub fn update_hover(&mut self, cursor: CursorPosition) -> Option<&str> {
        if !self.active {
            self.hovered = None;
            return None;
        }

        let hit = hit_test(cursor, &self.layout);
        if hit != self.hovered {
            debug!("Hovered key: {:?} -> {:?}", self.hovered, hit);
        }
        self.hovered = hit;
        self.hovered.as_deref()
    }

    #[must_use]
    pub fn hovered(&self) -> Option<&str> {
        self.hovered.as_deref()
    }

    /// Showing or hiding the keyboard; hiding clears the hover
    pub fn set_active(&mut self, active: bool) {
        self.active = active;
        if !active {
            self.hovered = None;
        }
    }

    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.active
    }

    #[must_use]
    pub const fn layout(&self) -> &L {
        &self.layout
    }

    pub fn layout_mut(&mut self) -> &mut L {
        &mut self.layout
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_keys() -> Vec<KeyDefinition> {
        vec![
            KeyDefinition::new("A", Rect::new(0.0, 0.0, 10.0, 10.0)),
            KeyDefinition::new("B", Rect::new(20.0, 0.0, 30.0, 10.0)),
        ]
    }

    #[test]
    fn test_inclusive_edges() {
        let layout = two_keys();
        assert_eq!(hit_test(CursorPosition::new(0.0, 5.0), &layout).as_deref(), Some("A"));
        assert_eq!(hit_test(CursorPosition::new(10.0, 10.0), &layout).as_deref(), Some("A"));
        assert_eq!(hit_test(CursorPosition::new(20.0, 0.0), &layout).as_deref(), Some("B"));
    }

    #[test]
    fn test_outside_all_keys() {
        let layout = two_keys();
        assert_eq!(hit_test(CursorPosition::new(-1.0, 5.0), &layout), None);
        assert_eq!(hit_test(CursorPosition::new(15.0, 5.0), &layout), None);
        assert_eq!(hit_test(CursorPosition::new(5.0, 11.0), &layout), None);
    }

    #[test]
    fn test_first_match_wins_on_overlap() {
        let layout = vec![
            KeyDefinition::new("first", Rect::new(0.0, 0.0, 10.0, 10.0)),
            KeyDefinition::new("second", Rect::new(5.0, 5.0, 15.0, 15.0)),
        ];
        assert_eq!(hit_test(CursorPosition::new(7.0, 7.0), &layout).as_deref(), Some("first"));
    }

    #[test]
    fn test_qwerty_layout_has_all_keys() {
        let keys = QwertyLayout::default().keys();
        assert_eq!(keys.len(), 28);
        assert_eq!(keys.first().map(|k| k.label.as_str()), Some("Q"));
        assert!(keys.iter().any(KeyDefinition::is_backspace));
        assert!(keys.iter().any(KeyDefinition::is_space));
    }

    #[test]
    fn test_qwerty_keys_use_configured_size() {
        let config = KeyboardConfig {
            key_width: 50.0,
            key_height: 40.0,
            ..KeyboardConfig::default()
        };
        for key in QwertyLayout::from_config(&config).keys() {
            assert!((key.bounds.width() - 50.0).abs() < 1e-9, "{}", key.label);
            assert!((key.bounds.height() - 40.0).abs() < 1e-9, "{}", key.label);
        }
    }

    #[test]
    fn test_qwerty_keys_do_not_overlap() {
        let keys = QwertyLayout::default().keys();
        for (i, a) in keys.iter().enumerate() {
            for b in keys.iter().skip(i + 1) {
                let overlap = a.bounds.left <= b.bounds.right
                    && b.bounds.left <= a.bounds.right
                    && a.bounds.top <= b.bounds.bottom
                    && b.bounds.top <= a.bounds.bottom;
                assert!(!overlap, "{} overlaps {}", a.label, b.label);
            }
        }
    }

    #[test]
    fn test_resize_moves_keys() {
        let mut keyboard = Keyboard::new(QwertyLayout::default());
        let q_before = keyboard.layout().keys()[0].bounds;
        let center = CursorPosition::new(
            (q_before.left + q_before.right) / 2.0,
            (q_before.top + q_before.bottom) / 2.0,
        );
        assert_eq!(keyboard.update_hover(center), Some("Q"));

        keyboard.layout_mut().resize(1920.0, 1080.0);
        assert_eq!(keyboard.update_hover(center), None);
        assert_eq!(keyboard.hovered(), None);
    }

    #[test]
    fn test_inactive_keyboard_clears_hover() {
        let mut keyboard = Keyboard::new(two_keys());
        assert_eq!(keyboard.update_hover(CursorPosition::new(5.0, 5.0)), Some("A"));
        keyboard.set_active(false);
        assert_eq!(keyboard.hovered(), None);
        assert_eq!(keyboard.update_hover(CursorPosition::new(5.0, 5.0)), None);
    }
}
