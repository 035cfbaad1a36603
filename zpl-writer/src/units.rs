//! Millimetre to dot conversion
//!
//! Every positional directive converts its millimetre inputs with the
//! configured dots-per-millimetre and clamps the result into the range the
//! ZPL command accepts.

/// Largest coordinate, box extent or label length ZPL accepts
pub const MAX_DOTS: u32 = 32000;

/// Largest `^GE` / `^GC` extent or stroke
pub const MAX_CURVE_DOTS: u32 = 4095;

/// Smallest visible ellipse/circle extent
pub const MIN_CURVE_EXTENT: u32 = 3;

/// Smallest ellipse/circle stroke
pub const MIN_CURVE_STROKE: u32 = 2;

/// Largest `^GB` corner rounding
pub const MAX_ROUNDING: u32 = 8;

/// Convert `mm` to dots and clamp into `[min, max]`
///
/// NaN converts to `min`.
pub fn dots(mm: f64, dpmm: f64, min: u32, max: u32) -> u32 {
    clamp_dots((mm * dpmm).round(), min, max)
}

/// Clamp an already-converted dot value into `[min, max]`
pub fn clamp_dots(value: f64, min: u32, max: u32) -> u32 {
    if value.is_nan() {
        return min;
    }
    value.clamp(min as f64, max as f64) as u32
}

/// Convert a left/top pair to clamped device coordinates
pub fn coordinates(left: f64, top: f64, dpmm: f64) -> (u32, u32) {
    (dots(left, dpmm, 0, MAX_DOTS), dots(top, dpmm, 0, MAX_DOTS))
}

/// Stroke thickness for `^GB` shapes
///
/// At least one dot; the result is also the floor of the shape's extents.
pub fn box_stroke(thick: f64, dpmm: f64) -> u32 {
    dots(thick, dpmm, 1, MAX_DOTS)
}
