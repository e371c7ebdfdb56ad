//! Per-frame modifiers that drive visual attributes from elapsed lifetime

use crate::curves::{lerp_f32, Curve, Interpolator};
use crate::particle::Particle;
use spark_core::Millis;
use std::sync::Arc;

/// Computes a time-varying attribute of a particle.
///
/// Invoked every frame for every active particle, after the motion update,
/// in registration order. Two modifiers touching the same field resolve
/// last-writer-wins.
pub trait ParticleModifier: Send + Sync {
    fn apply(&self, particle: &mut Particle, elapsed: Millis);
}

/// Immutable, shared list of modifiers for one emission session.
/// Particles hold a handle to it, never a copy.
#[derive(Clone)]
pub struct ModifierPipeline(Arc<[Arc<dyn ParticleModifier>]>);

impl ModifierPipeline {
    pub fn new(modifiers: Vec<Arc<dyn ParticleModifier>>) -> Self {
        Self(modifiers.into())
    }

    pub fn empty() -> Self {
        Self::new(Vec::new())
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<dyn ParticleModifier>> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Convert a 0.0–1.0 alpha into the 0–255 scale
pub fn alpha_from_unit(value: f32) -> u8 {
    (255.0 * value.clamp(0.0, 1.0) + 0.5) as u8
}

/// Where an elapsed time falls relative to a `[start, end]` window, with the
/// eased progress when inside it.
enum WindowPosition {
    Before,
    Inside(f32),
    After,
}

fn window_position(
    elapsed: i64,
    start: i64,
    end: i64,
    curve: &dyn Interpolator,
) -> WindowPosition {
    if elapsed < start {
        WindowPosition::Before
    } else if elapsed > end {
        WindowPosition::After
    } else if end == start {
        WindowPosition::Inside(curve.interpolate(1.0))
    } else {
        let fraction = (elapsed - start) as f32 / (end - start) as f32;
        WindowPosition::Inside(curve.interpolate(fraction))
    }
}

fn interpolate_alpha(start: u8, end: u8, position: WindowPosition) -> u8 {
    match position {
        WindowPosition::Before => start,
        WindowPosition::After => end,
        WindowPosition::Inside(eased) => {
            let value = lerp_f32(start as f32, end as f32, eased);
            (value as i32).clamp(0, 255) as u8
        }
    }
}

/// Interpolates alpha over a window measured from activation
pub struct AlphaModifier {
    start_value: u8,
    end_value: u8,
    start_time: Millis,
    end_time: Millis,
    curve: Arc<dyn Interpolator>,
}

impl AlphaModifier {
    pub fn new(start_value: u8, end_value: u8, start_time: Millis, end_time: Millis) -> Self {
        Self::with_curve(start_value, end_value, start_time, end_time, Arc::new(Curve::Linear))
    }

    pub fn with_curve(
        start_value: u8,
        end_value: u8,
        start_time: Millis,
        end_time: Millis,
        curve: Arc<dyn Interpolator>,
    ) -> Self {
        Self {
            start_value,
            end_value,
            start_time,
            end_time,
            curve,
        }
    }

    /// Alpha values given as 0.0–1.0 fractions
    pub fn from_unit(start_value: f32, end_value: f32, start_time: Millis, end_time: Millis) -> Self {
        Self::new(
            alpha_from_unit(start_value),
            alpha_from_unit(end_value),
            start_time,
            end_time,
        )
    }
}

impl ParticleModifier for AlphaModifier {
    fn apply(&self, particle: &mut Particle, elapsed: Millis) {
        let position = window_position(
            elapsed as i64,
            self.start_time as i64,
            self.end_time as i64,
            self.curve.as_ref(),
        );
        particle.alpha = interpolate_alpha(self.start_value, self.end_value, position);
    }
}

/// Interpolates alpha over the last `duration` ms of each particle's own
/// lifetime, so a continuous stream fades uniformly before expiry.
pub struct FadeOutModifier {
    start_value: u8,
    end_value: u8,
    duration: Millis,
    curve: Arc<dyn Interpolator>,
}

impl FadeOutModifier {
    pub fn new(start_value: u8, end_value: u8, duration: Millis) -> Self {
        Self::with_curve(start_value, end_value, duration, Arc::new(Curve::Linear))
    }

    pub fn with_curve(
        start_value: u8,
        end_value: u8,
        duration: Millis,
        curve: Arc<dyn Interpolator>,
    ) -> Self {
        Self {
            start_value,
            end_value,
            duration,
            curve,
        }
    }

    pub fn from_unit(start_value: f32, end_value: f32, duration: Millis) -> Self {
        Self::new(alpha_from_unit(start_value), alpha_from_unit(end_value), duration)
    }
}

impl ParticleModifier for FadeOutModifier {
    fn apply(&self, particle: &mut Particle, elapsed: Millis) {
        let end = particle.time_to_live() as i64;
        let start = end - self.duration as i64;
        let position = window_position(elapsed as i64, start, end, self.curve.as_ref());
        particle.alpha = interpolate_alpha(self.start_value, self.end_value, position);
    }
}

/// Interpolates scale over a window measured from activation
pub struct ScaleModifier {
    start_value: f32,
    end_value: f32,
    start_time: Millis,
    end_time: Millis,
    curve: Arc<dyn Interpolator>,
}

impl ScaleModifier {
    pub fn new(start_value: f32, end_value: f32, start_time: Millis, end_time: Millis) -> Self {
        Self::with_curve(start_value, end_value, start_time, end_time, Arc::new(Curve::Linear))
    }

    pub fn with_curve(
        start_value: f32,
        end_value: f32,
        start_time: Millis,
        end_time: Millis,
        curve: Arc<dyn Interpolator>,
    ) -> Self {
        Self {
            start_value,
            end_value,
            start_time,
            end_time,
            curve,
        }
    }
}

impl ParticleModifier for ScaleModifier {
    fn apply(&self, particle: &mut Particle, elapsed: Millis) {
        particle.scale = match window_position(
            elapsed as i64,
            self.start_time as i64,
            self.end_time as i64,
            self.curve.as_ref(),
        ) {
            WindowPosition::Before => self.start_value,
            WindowPosition::After => self.end_value,
            WindowPosition::Inside(eased) => lerp_f32(self.start_value, self.end_value, eased),
        };
    }
}
