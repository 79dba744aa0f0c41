//! Clamp bounds for every editable attribute.
//!
//! Reducers and descriptors both read these so the limits live in one place.

/// Altitude (`y`) range for entities and trajectory points.
pub const ALTITUDE_MIN: f32 = -300.0;
pub const ALTITUDE_MAX: f32 = 300.0;

/// Gain range for object and cone sounds.
pub const ENTITY_GAIN_MIN: f32 = 0.05;
pub const ENTITY_GAIN_MAX: f32 = 2.0;

/// Gain range for zone sounds.
pub const ZONE_GAIN_MIN: f32 = 0.0;
pub const ZONE_GAIN_MAX: f32 = 2.0;

/// Zone opacity is a linear map of zone gain onto this range.
pub const ZONE_OPACITY_MIN: f32 = 0.05;
pub const ZONE_OPACITY_MAX: f32 = 0.35;

pub const SPREAD_MIN: f32 = 0.05;
pub const SPREAD_MAX: f32 = 1.0;

pub const ZONE_SCALE_MIN: f32 = 0.5;
pub const ZONE_SCALE_MAX: f32 = 2.0;

pub const SPEED_MIN: f32 = -100.0;
pub const SPEED_MAX: f32 = 100.0;

/// Phase values that land exactly on a boundary are replaced by these.
pub const PHASE_FLOOR: f32 = 0.01;
pub const PHASE_CEIL: f32 = 0.99;

/// Drag-tick divisors: one pixel of drag moves the attribute by `1 / divisor`.
pub const GAIN_DRAG_DIVISOR: f32 = 50.0;
pub const SCALE_DRAG_DIVISOR: f32 = 50.0;
pub const SPREAD_DRAG_DIVISOR: f32 = 100.0;
pub const SPEED_DRAG_DIVISOR: f32 = 10.0;
pub const PHASE_DRAG_DIVISOR: f32 = 100.0;

/// Linear remap of `value` from `[in_min, in_max]` onto `[out_min, out_max]`.
pub fn map_range(value: f32, in_min: f32, in_max: f32, out_min: f32, out_max: f32) -> f32 {
    out_min + (value - in_min) * (out_max - out_min) / (in_max - in_min)
}

pub fn zone_opacity(gain: f32) -> f32 {
    map_range(gain, ZONE_GAIN_MIN, ZONE_GAIN_MAX, ZONE_OPACITY_MIN, ZONE_OPACITY_MAX)
}
