//! Spawn-time initializers that randomize a particle's motion and look

use crate::particle::Particle;
use crate::sampling::{uniform_f32, uniform_i32};
use glam::Vec2;
use rand::RngCore;

/// Randomizes some fields of a freshly activated particle.
///
/// Initializers run in registration order before the spawn point is bound.
/// Each built-in kind owns a disjoint set of fields.
pub trait ParticleInitializer: Send + Sync {
    fn initialize(&self, particle: &mut Particle, rng: &mut dyn RngCore);
}

fn direction(angle_degrees: f32) -> Vec2 {
    let radians = angle_degrees.to_radians();
    Vec2::new(radians.cos(), radians.sin())
}

fn normalize_angle(mut angle: i32) -> i32 {
    while angle < 0 {
        angle += 360;
    }
    angle
}

/// Speed magnitude plus travel angle; the sprite is turned to face its travel
/// direction (`rotation = angle + 90`).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpeedByAngleInitializer {
    speed_min: f32,
    speed_max: f32,
    min_angle: i32,
    max_angle: i32,
}

impl SpeedByAngleInitializer {
    /// Negative angles are moved into `[0, 360)` and the pair is reordered so
    /// that `min_angle <= max_angle`.
    pub fn new(speed_min: f32, speed_max: f32, min_angle: i32, max_angle: i32) -> Self {
        let mut min_angle = normalize_angle(min_angle);
        let mut max_angle = normalize_angle(max_angle);
        if min_angle > max_angle {
            std::mem::swap(&mut min_angle, &mut max_angle);
        }
        Self {
            speed_min,
            speed_max,
            min_angle,
            max_angle,
        }
    }

    /// Like `new`, but a range such as 270 → 90 is read as passing through 0
    /// (270 → 450) instead of being swapped into 90 → 270.
    pub fn wrapping(speed_min: f32, speed_max: f32, min_angle: i32, mut max_angle: i32) -> Self {
        while max_angle < min_angle {
            max_angle += 360;
        }
        Self::new(speed_min, speed_max, min_angle, max_angle)
    }

    pub fn angle_range(&self) -> (i32, i32) {
        (self.min_angle, self.max_angle)
    }
}

impl ParticleInitializer for SpeedByAngleInitializer {
    fn initialize(&self, particle: &mut Particle, rng: &mut dyn RngCore) {
        let speed = uniform_f32(rng, self.speed_min, self.speed_max);
        let angle = uniform_i32(rng, self.min_angle, self.max_angle) as f32;
        particle.velocity = direction(angle) * speed;
        particle.initial_rotation = angle + 90.0;
    }
}

/// Independent X and Y speeds
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpeedByComponentsInitializer {
    pub min_x: f32,
    pub max_x: f32,
    pub min_y: f32,
    pub max_y: f32,
}

impl SpeedByComponentsInitializer {
    pub fn new(min_x: f32, max_x: f32, min_y: f32, max_y: f32) -> Self {
        Self {
            min_x,
            max_x,
            min_y,
            max_y,
        }
    }
}

impl ParticleInitializer for SpeedByComponentsInitializer {
    fn initialize(&self, particle: &mut Particle, rng: &mut dyn RngCore) {
        particle.velocity = Vec2::new(
            uniform_f32(rng, self.min_x, self.max_x),
            uniform_f32(rng, self.min_y, self.max_y),
        );
    }
}

/// Initial rotation in whole degrees
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RotationInitializer {
    pub min_angle: i32,
    pub max_angle: i32,
}

impl RotationInitializer {
    pub fn new(min_angle: i32, max_angle: i32) -> Self {
        Self {
            min_angle,
            max_angle,
        }
    }
}

impl ParticleInitializer for RotationInitializer {
    fn initialize(&self, particle: &mut Particle, rng: &mut dyn RngCore) {
        particle.initial_rotation = uniform_i32(rng, self.min_angle, self.max_angle) as f32;
    }
}

/// Rotation speed in degrees per second; may be negative
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RotationSpeedInitializer {
    pub min: f32,
    pub max: f32,
}

impl RotationSpeedInitializer {
    pub fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }
}

impl ParticleInitializer for RotationSpeedInitializer {
    fn initialize(&self, particle: &mut Particle, rng: &mut dyn RngCore) {
        particle.rotation_speed = uniform_f32(rng, self.min, self.max);
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScaleInitializer {
    pub min: f32,
    pub max: f32,
}

impl ScaleInitializer {
    pub fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }
}

impl ParticleInitializer for ScaleInitializer {
    fn initialize(&self, particle: &mut Particle, rng: &mut dyn RngCore) {
        particle.scale = uniform_f32(rng, self.min, self.max);
    }
}

/// Acceleration magnitude (px/ms²) plus direction angle
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AccelerationInitializer {
    pub min: f32,
    pub max: f32,
    pub min_angle: i32,
    pub max_angle: i32,
}

impl AccelerationInitializer {
    pub fn new(min: f32, max: f32, min_angle: i32, max_angle: i32) -> Self {
        Self {
            min,
            max,
            min_angle,
            max_angle,
        }
    }
}

impl ParticleInitializer for AccelerationInitializer {
    fn initialize(&self, particle: &mut Particle, rng: &mut dyn RngCore) {
        let angle = uniform_i32(rng, self.min_angle, self.max_angle) as f32;
        let value = uniform_f32(rng, self.min, self.max);
        particle.acceleration = direction(angle) * value;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image::{ParticleImage, Sprite};
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::sync::Arc;

    fn particle() -> Particle {
        Particle::new(ParticleImage::Static(Arc::new(Sprite::new("p", 4, 4))))
    }

    #[test]
    fn speed_by_angle_fixed_angle() {
        let init = SpeedByAngleInitializer::new(0.1, 0.3, 0, 0);
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..100 {
            let mut p = particle();
            init.initialize(&mut p, &mut rng);
            assert!(p.velocity.x >= 0.1 && p.velocity.x < 0.3);
            assert_eq!(p.velocity.y, 0.0);
            assert_eq!(p.initial_rotation, 90.0);
        }
    }

    #[test]
    fn speed_by_angle_normalizes_and_swaps() {
        assert_eq!(SpeedByAngleInitializer::new(1.0, 1.0, -90, 10).angle_range(), (10, 270));
        assert_eq!(SpeedByAngleInitializer::new(1.0, 1.0, 200, 100).angle_range(), (100, 200));
    }

    #[test]
    fn speed_by_angle_wrap_around() {
        let init = SpeedByAngleInitializer::wrapping(1.0, 1.0, 270, 90);
        assert_eq!(init.angle_range(), (270, 450));

        let mut rng = StdRng::seed_from_u64(5);
        for _ in 0..200 {
            let mut p = particle();
            init.initialize(&mut p, &mut rng);
            // Upward-through-right half plane: x is never meaningfully negative
            assert!(p.velocity.x > -1e-4);
            assert!((p.velocity.length() - 1.0).abs() < 1e-4);
        }
    }

    #[test]
    fn speed_by_components_ranges() {
        let init = SpeedByComponentsInitializer::new(-0.1, 0.1, -0.1, 0.02);
        let mut rng = StdRng::seed_from_u64(11);
        for _ in 0..200 {
            let mut p = particle();
            init.initialize(&mut p, &mut rng);
            assert!((-0.1..0.1).contains(&p.velocity.x));
            assert!((-0.1..0.02).contains(&p.velocity.y));
        }
    }

    #[test]
    fn rotation_and_rotation_speed() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut p = particle();
        RotationInitializer::new(0, 360).initialize(&mut p, &mut rng);
        assert!((0.0..360.0).contains(&p.initial_rotation));
        assert_eq!(p.initial_rotation.fract(), 0.0);

        RotationSpeedInitializer::new(-120.0, -60.0).initialize(&mut p, &mut rng);
        assert!(p.rotation_speed <= -60.0 && p.rotation_speed >= -120.0);

        RotationSpeedInitializer::new(90.0, 90.0).initialize(&mut p, &mut rng);
        assert_eq!(p.rotation_speed, 90.0);
    }

    #[test]
    fn scale_range() {
        let mut rng = StdRng::seed_from_u64(8);
        let mut p = particle();
        for _ in 0..100 {
            ScaleInitializer::new(0.5, 1.5).initialize(&mut p, &mut rng);
            assert!((0.5..1.5).contains(&p.scale));
        }
    }

    #[test]
    fn acceleration_fixed_angle() {
        let init = AccelerationInitializer::new(0.002, 0.002, 90, 90);
        let mut rng = StdRng::seed_from_u64(1);
        let mut p = particle();
        init.initialize(&mut p, &mut rng);
        assert!(p.acceleration.x.abs() < 1e-8);
        assert!((p.acceleration.y - 0.002).abs() < 1e-8);
    }

    #[test]
    fn same_seed_same_result() {
        let init = SpeedByAngleInitializer::new(0.1, 0.5, 0, 360);
        let mut a = StdRng::seed_from_u64(77);
        let mut b = StdRng::seed_from_u64(77);
        let (mut pa, mut pb) = (particle(), particle());
        init.initialize(&mut pa, &mut a);
        init.initialize(&mut pb, &mut b);
        assert_eq!(pa.velocity, pb.velocity);
        assert_eq!(pa.initial_rotation, pb.initial_rotation);
    }
}
