//! Ability to level, percentage and band conversions.
//!
//! Every conversion is total: out-of-range or unrecognised inputs map to a
//! defined value instead of an error.

use crate::model::{CefrLevel, THETA_MAX, THETA_MIN};

/// Level thresholds, checked in ascending order. A value below the bound
/// belongs to the paired level; anything at or above the last bound is C2.
const LEVEL_BOUNDS: [(f64, CefrLevel); 5] = [
    (-1.5, CefrLevel::A1),
    (-0.5, CefrLevel::A2),
    (0.5, CefrLevel::B1),
    (1.5, CefrLevel::B2),
    (2.5, CefrLevel::C1),
];

/// CEFR level for an ability estimate.
pub fn cefr_level_for(theta: f64) -> CefrLevel {
    LEVEL_BOUNDS
        .iter()
        .find(|(bound, _)| theta < *bound)
        .map(|(_, level)| *level)
        .unwrap_or(CefrLevel::C2)
}

/// CEFR level of an item with numeric difficulty `b`.
///
/// Uses the same thresholds as [`cefr_level_for`], so an item sits in the
/// level whose anchor is nearest to its difficulty.
pub fn difficulty_to_cefr(b: f64) -> CefrLevel {
    cefr_level_for(b)
}

/// Linear map of `[-4, 4]` onto `[0, 100]`, clamped.
pub fn score_percentage(theta: f64) -> f64 {
    let span = THETA_MAX - THETA_MIN;
    ((theta - THETA_MIN) / span * 100.0).clamp(0.0, 100.0)
}

/// Band score for a level.
pub fn cefr_to_band(level: CefrLevel) -> f64 {
    level.band()
}

/// Band score for a level label; `5.0` when the label is not recognised.
pub fn cefr_label_to_band(label: &str) -> f64 {
    label
        .parse::<CefrLevel>()
        .map(cefr_to_band)
        .unwrap_or(CefrLevel::B1.band())
}

/// Round to a fixed number of decimals for reporting.
pub(crate) fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}
