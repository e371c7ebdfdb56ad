//! Particle state, its motion law, and the slot pool

use crate::image::{ParticleImage, Sprite};
use crate::modifiers::ModifierPipeline;
use crate::render::Canvas;
use glam::{Affine2, Vec2};
use spark_core::Millis;

/// Fully opaque alpha
pub const OPAQUE: u8 = 255;

/// One simulated sprite.
///
/// Motion is closed-form: position and rotation are recomputed from the
/// values bound at activation and the elapsed time, never integrated.
/// Velocity is in px/ms and acceleration in px/ms² (applied as `a·t²`).
pub struct Particle {
    image: ParticleImage,
    position: Vec2,
    initial_position: Vec2,
    half_size: Vec2,
    rotation: f32,
    time_to_live: Millis,
    activation_time: Millis,
    elapsed: Millis,
    configured: bool,
    modifiers: Option<ModifierPipeline>,

    pub scale: f32,
    pub alpha: u8,
    /// Degrees
    pub initial_rotation: f32,
    /// Degrees per second
    pub rotation_speed: f32,
    pub velocity: Vec2,
    pub acceleration: Vec2,
}

impl Particle {
    pub fn new(image: ParticleImage) -> Self {
        Self {
            image,
            position: Vec2::ZERO,
            initial_position: Vec2::ZERO,
            half_size: Vec2::ZERO,
            rotation: 0.0,
            time_to_live: 0,
            activation_time: 0,
            elapsed: 0,
            configured: false,
            modifiers: None,
            scale: 1.0,
            alpha: OPAQUE,
            initial_rotation: 0.0,
            rotation_speed: 0.0,
            velocity: Vec2::ZERO,
            acceleration: Vec2::ZERO,
        }
    }

    /// Reset the per-activation visual state
    pub fn init(&mut self) {
        self.scale = 1.0;
        self.alpha = OPAQUE;
        self.configured = false;
    }

    /// Bind spawn point and lifetime. `spawn` is the sprite center; the
    /// stored position is the top-left draw origin. Ignored if the particle
    /// is already configured for this activation.
    pub fn configure(&mut self, time_to_live: Millis, spawn: Vec2) {
        if self.configured {
            return;
        }
        let (half_w, half_h) = self.image.base_sprite().half_size();
        self.half_size = Vec2::new(half_w as f32, half_h as f32);
        self.initial_position = spawn - self.half_size;
        self.position = self.initial_position;
        self.time_to_live = time_to_live;
        self.configured = true;
    }

    pub fn activate(&mut self, activation_time: Millis, modifiers: ModifierPipeline) -> &mut Self {
        self.activation_time = activation_time;
        self.elapsed = 0;
        self.modifiers = Some(modifiers);
        self
    }

    /// Advance to `tick`. Returns false once more than `time_to_live` ms have
    /// passed since activation, leaving the particle untouched.
    pub fn update(&mut self, tick: Millis) -> bool {
        let elapsed = tick.saturating_sub(self.activation_time);
        if elapsed > self.time_to_live {
            return false;
        }
        self.elapsed = elapsed;
        let t = elapsed as f32;
        self.position = self.initial_position + self.velocity * t + self.acceleration * (t * t);
        self.rotation = self.initial_rotation + self.rotation_speed * t / 1000.0;

        // Modifiers run last so they can override scale and alpha.
        if let Some(pipeline) = self.modifiers.take() {
            for modifier in pipeline.iter() {
                modifier.apply(self, elapsed);
            }
            self.modifiers = Some(pipeline);
        }
        true
    }

    /// Drop the pipeline handle when the particle goes back to the pool
    pub(crate) fn release(&mut self) {
        self.modifiers = None;
    }

    /// Top-left draw origin
    pub fn position(&self) -> Vec2 {
        self.position
    }

    /// Sprite center
    pub fn center(&self) -> Vec2 {
        self.position + self.half_size
    }

    /// Current rotation in degrees
    pub fn rotation(&self) -> f32 {
        self.rotation
    }

    pub fn time_to_live(&self) -> Millis {
        self.time_to_live
    }

    pub fn activation_time(&self) -> Millis {
        self.activation_time
    }

    /// Lifetime elapsed at the last update
    pub fn elapsed(&self) -> Millis {
        self.elapsed
    }

    pub fn is_configured(&self) -> bool {
        self.configured
    }

    pub fn image(&self) -> &ParticleImage {
        &self.image
    }

    /// Sprite to draw for the current animation frame
    pub fn current_sprite(&self) -> &Sprite {
        self.image.sprite_at(self.elapsed)
    }

    pub fn current_frame(&self) -> u32 {
        self.image.frame_index_at(self.elapsed)
    }

    /// Draw transform: rotate then scale about the sprite center, then
    /// translate to the draw origin.
    pub fn transform(&self) -> Affine2 {
        Affine2::from_translation(self.position)
            * Affine2::from_translation(self.half_size)
            * Affine2::from_scale(Vec2::splat(self.scale))
            * Affine2::from_angle(self.rotation.to_radians())
            * Affine2::from_translation(-self.half_size)
    }

    pub fn draw(&self, canvas: &mut dyn Canvas) {
        canvas.draw_sprite(self.current_sprite(), self.transform(), self.alpha);
    }
}

/// Fixed set of particle slots split into an active prefix and a free suffix.
///
/// Activation takes the first free slot; expiry swap-removes against the last
/// active slot, so both are O(1) and no particle is allocated after setup.
pub struct ParticlePool {
    particles: Vec<Particle>,
    active_count: usize,
}

impl ParticlePool {
    pub fn new(images: Vec<ParticleImage>) -> Self {
        Self {
            particles: images.into_iter().map(Particle::new).collect(),
            active_count: 0,
        }
    }

    pub fn capacity(&self) -> usize {
        self.particles.len()
    }

    pub fn active_count(&self) -> usize {
        self.active_count
    }

    pub fn free_count(&self) -> usize {
        self.particles.len() - self.active_count
    }

    /// Move one free particle into the active set, returning it for setup.
    /// Returns None if every slot is active.
    pub fn take_free(&mut self) -> Option<&mut Particle> {
        if self.active_count >= self.particles.len() {
            return None;
        }
        let idx = self.active_count;
        self.active_count += 1;
        Some(&mut self.particles[idx])
    }

    /// Update every active particle, returning expired ones to the free
    /// set in the same pass. Returns how many expired.
    pub fn update_and_compact(&mut self, tick: Millis) -> usize {
        let mut expired = 0;
        let mut i = 0;
        while i < self.active_count {
            if self.particles[i].update(tick) {
                i += 1;
            } else {
                self.particles[i].release();
                self.active_count -= 1;
                if i < self.active_count {
                    self.particles.swap(i, self.active_count);
                }
                expired += 1;
                // Slot i now holds the swapped-in particle, which still needs its update
            }
        }
        expired
    }

    /// Return every active particle to the free set
    pub fn recycle_all(&mut self) {
        for p in &mut self.particles[..self.active_count] {
            p.release();
        }
        self.active_count = 0;
    }

    /// Active particles (first `active_count` slots)
    pub fn active(&self) -> &[Particle] {
        &self.particles[..self.active_count]
    }
}
