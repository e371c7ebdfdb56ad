//! Renderer-facing contract: per-particle draw calls and GPU instance packing

use crate::image::Sprite;
use crate::particle::Particle;
use bytemuck::{Pod, Zeroable};
use glam::Affine2;

/// Drawing surface supplied by the host.
///
/// Receives one call per active particle each frame; it must not hold on to
/// the sprite reference past the call.
pub trait Canvas {
    fn draw_sprite(&mut self, sprite: &Sprite, transform: Affine2, alpha: u8);
}

/// One recorded draw call
#[derive(Debug, Clone, PartialEq)]
pub struct DrawCall {
    pub sprite: String,
    pub transform: Affine2,
    pub alpha: u8,
}

/// Canvas that stores draw calls instead of rasterizing them
#[derive(Debug, Default)]
pub struct RecordingCanvas {
    pub calls: Vec<DrawCall>,
}

impl RecordingCanvas {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.calls.clear();
    }
}

impl Canvas for RecordingCanvas {
    fn draw_sprite(&mut self, sprite: &Sprite, transform: Affine2, alpha: u8) {
        self.calls.push(DrawCall {
            sprite: sprite.name.clone(),
            transform,
            alpha,
        });
    }
}

/// GPU instance data for one sprite.
/// 32 bytes, 4-byte aligned: a column-major 2x3 affine, alpha and frame.
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct SpriteInstance {
    /// Affine2 columns: x_axis, y_axis, translation
    pub transform: [f32; 6],
    /// Opacity in [0, 1]
    pub alpha: f32,
    /// Animation frame index
    pub frame: u32,
}

impl SpriteInstance {
    pub fn from_particle(p: &Particle) -> Self {
        Self {
            transform: p.transform().to_cols_array(),
            alpha: p.alpha as f32 / 255.0,
            frame: p.current_frame(),
        }
    }
}

/// Pack particles into an instance buffer for upload, replacing its contents
pub fn pack_instances(particles: &[Particle], buffer: &mut Vec<SpriteInstance>) {
    buffer.clear();
    buffer.extend(particles.iter().map(SpriteInstance::from_particle));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image::ParticleImage;
    use crate::modifiers::ModifierPipeline;
    use glam::Vec2;
    use std::sync::Arc;

    #[test]
    fn sprite_instance_layout() {
        assert_eq!(std::mem::size_of::<SpriteInstance>(), 32);
        assert_eq!(std::mem::align_of::<SpriteInstance>(), 4);
    }

    #[test]
    fn pack_and_draw_agree() {
        let image = ParticleImage::Static(Arc::new(Sprite::new("spark", 8, 8)));
        let mut p = Particle::new(image);
        p.init();
        p.configure(1000, Vec2::new(20.0, 30.0));
        p.activate(0, ModifierPipeline::empty());
        p.alpha = 51;
        assert!(p.update(0));

        let mut buffer = Vec::new();
        pack_instances(std::slice::from_ref(&p), &mut buffer);
        assert_eq!(buffer.len(), 1);
        assert!((buffer[0].alpha - 0.2).abs() < 1e-6);
        assert_eq!(buffer[0].transform[4], 16.0);
        assert_eq!(buffer[0].transform[5], 26.0);

        let mut canvas = RecordingCanvas::new();
        p.draw(&mut canvas);
        assert_eq!(canvas.calls.len(), 1);
        assert_eq!(canvas.calls[0].sprite, "spark");
        assert_eq!(canvas.calls[0].alpha, 51);
        assert_eq!(canvas.calls[0].transform.to_cols_array(), buffer[0].transform);
    }
}
