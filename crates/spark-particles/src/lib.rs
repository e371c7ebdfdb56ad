//! Spark Particles - pooled 2D sprite particle system
//!
//! Provides a time-stepped particle engine with:
//! - Fixed-size pool, no allocation after construction
//! - Closed-form motion from spawn-time velocity, acceleration and rotation speed
//! - Initializer pipeline run once per activation
//! - Modifier pipeline run every frame over elapsed lifetime
//! - One-shot bursts and rate-limited streams with start-time backfill
//! - Renderer-agnostic drawing plus GPU instance packing

pub mod curves;
pub mod emitter;
pub mod image;
pub mod initializers;
pub mod modifiers;
pub mod particle;
pub mod region;
pub mod render;
pub mod sampling;
pub mod shared;
pub mod system;

pub use curves::{Curve, Interpolator};
pub use emitter::{EmissionConfig, EmitterConfig};
pub use image::{FrameAnimation, ImageSource, ParticleImage, Sprite};
pub use initializers::{
    AccelerationInitializer, ParticleInitializer, RotationInitializer, RotationSpeedInitializer,
    ScaleInitializer, SpeedByAngleInitializer, SpeedByComponentsInitializer,
};
pub use modifiers::{
    alpha_from_unit, AlphaModifier, FadeOutModifier, ModifierPipeline, ParticleModifier,
    ScaleModifier,
};
pub use particle::{Particle, ParticlePool};
pub use region::SpawnRegion;
pub use render::{pack_instances, Canvas, DrawCall, RecordingCanvas, SpriteInstance};
pub use shared::SharedParticleSystem;
pub use system::{ParticleSystem, RedrawCallback, SystemState};
