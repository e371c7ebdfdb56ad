//! Value-over-lifetime interpolation curves

use serde::{Deserialize, Serialize};
use std::f32::consts::PI;

/// Linear interpolation between two floats
pub fn lerp_f32(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Maps normalized progress in `[0, 1]` onto an eased fraction.
///
/// Implement this to plug custom easing into the built-in modifiers.
pub trait Interpolator: Send + Sync {
    fn interpolate(&self, fraction: f32) -> f32;
}

/// Built-in easing curves, selectable from emitter configuration
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Curve {
    #[default]
    Linear,
    /// Starts slow and speeds up; `factor` 1.0 is a parabola
    Accelerate { factor: f32 },
    /// Starts fast and slows down
    Decelerate { factor: f32 },
    /// Cosine ease-in-out
    AccelerateDecelerate,
}

impl Interpolator for Curve {
    fn interpolate(&self, fraction: f32) -> f32 {
        match *self {
            Curve::Linear => fraction,
            Curve::Accelerate { factor } => {
                if factor == 1.0 {
                    fraction * fraction
                } else {
                    fraction.powf(2.0 * factor)
                }
            }
            Curve::Decelerate { factor } => {
                if factor == 1.0 {
                    1.0 - (1.0 - fraction) * (1.0 - fraction)
                } else {
                    1.0 - (1.0 - fraction).powf(2.0 * factor)
                }
            }
            Curve::AccelerateDecelerate => ((fraction + 1.0) * PI).cos() / 2.0 + 0.5,
        }
    }
}
