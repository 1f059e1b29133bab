//! Numeric helpers for pixel coordinates.

/// Clamp a float into `[min, max]` and truncate it to an X11 coordinate.
///
/// Non-finite values map to `min`.
#[must_use]
#[allow(clippy::cast_possible_truncation)] // Clamping to the i16 range first makes truncation safe
pub fn f64_to_i16_clamp(value: f64, min: f64, max: f64) -> i16 {
    let (min, max) = if min <= max { (min, max) } else { (max, min) };
    let min = min.max(f64::from(i16::MIN));
    let max = max.min(f64::from(i16::MAX));

    if !value.is_finite() {
        return min as i16;
    }

    value.clamp(min, max) as i16
}
