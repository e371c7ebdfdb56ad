//! Sprite images owned by pool slots

use crate::sampling::uniform_i32;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use spark_core::{Millis, Result, SparkError};
use std::sync::Arc;

/// A renderer-side image, identified by name, with its pixel size
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sprite {
    pub name: String,
    pub width: u32,
    pub height: u32,
}

impl Sprite {
    pub fn new(name: impl Into<String>, width: u32, height: u32) -> Self {
        Self {
            name: name.into(),
            width,
            height,
        }
    }

    /// Half extents in whole pixels (integer division, as the draw origin uses)
    pub fn half_size(&self) -> (i32, i32) {
        ((self.width / 2) as i32, (self.height / 2) as i32)
    }
}

/// A looping sequence of sprites, each shown for a fixed duration
#[derive(Debug, Clone, PartialEq)]
pub struct FrameAnimation {
    frames: Vec<(Sprite, Millis)>,
    total_duration: Millis,
    one_shot: bool,
}

impl FrameAnimation {
    pub fn new(frames: Vec<(Sprite, Millis)>) -> Result<Self> {
        if frames.is_empty() {
            return Err(SparkError::EmptyAnimation);
        }
        let total_duration = frames.iter().map(|(_, d)| *d).sum();
        Ok(Self {
            frames,
            total_duration,
            one_shot: false,
        })
    }

    /// Hold the last frame instead of looping
    pub fn one_shot(mut self, one_shot: bool) -> Self {
        self.one_shot = one_shot;
        self
    }

    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    pub fn total_duration(&self) -> Millis {
        self.total_duration
    }

    /// Frame shown `elapsed` ms after activation
    pub fn frame_index_at(&self, elapsed: Millis) -> usize {
        if self.total_duration == 0 {
            return 0;
        }
        let mut t = if self.one_shot {
            elapsed.min(self.total_duration - 1)
        } else {
            elapsed % self.total_duration
        };
        for (i, (_, duration)) in self.frames.iter().enumerate() {
            if t < *duration {
                return i;
            }
            t -= duration;
        }
        self.frames.len() - 1
    }

    pub fn sprite_at(&self, elapsed: Millis) -> &Sprite {
        &self.frames[self.frame_index_at(elapsed)].0
    }

    pub fn first_sprite(&self) -> &Sprite {
        &self.frames[0].0
    }
}

/// Where pool slots get their images from
#[derive(Debug, Clone)]
pub enum ImageSource {
    /// Every particle shares one sprite
    Single(Sprite),
    /// Each pool slot picks one sprite at random when the pool is built
    Multiple(Vec<Sprite>),
    /// Every particle plays the same frame animation
    Animation(FrameAnimation),
}

impl ImageSource {
    /// Assign an image to each of `count` pool slots.
    /// An empty sprite list is rejected here, before any emission.
    pub(crate) fn build_images(
        &self,
        count: usize,
        rng: &mut dyn RngCore,
    ) -> Result<Vec<ParticleImage>> {
        match self {
            ImageSource::Single(sprite) => {
                let shared = Arc::new(sprite.clone());
                Ok((0..count)
                    .map(|_| ParticleImage::Static(Arc::clone(&shared)))
                    .collect())
            }
            ImageSource::Multiple(sprites) => {
                if sprites.is_empty() {
                    return Err(SparkError::EmptyImageSource);
                }
                let shared: Vec<Arc<Sprite>> = sprites.iter().cloned().map(Arc::new).collect();
                Ok((0..count)
                    .map(|_| {
                        let idx = uniform_i32(rng, 0, shared.len() as i32) as usize;
                        ParticleImage::Static(Arc::clone(&shared[idx]))
                    })
                    .collect())
            }
            ImageSource::Animation(animation) => {
                let shared = Arc::new(animation.clone());
                Ok((0..count)
                    .map(|_| ParticleImage::Animated(Arc::clone(&shared)))
                    .collect())
            }
        }
    }
}

/// The image a single particle slot draws for its whole pool lifetime
#[derive(Debug, Clone)]
pub enum ParticleImage {
    Static(Arc<Sprite>),
    Animated(Arc<FrameAnimation>),
}

impl ParticleImage {
    /// Sprite used for sizing the draw origin
    pub fn base_sprite(&self) -> &Sprite {
        match self {
            ParticleImage::Static(sprite) => sprite,
            ParticleImage::Animated(animation) => animation.first_sprite(),
        }
    }

    pub fn sprite_at(&self, elapsed: Millis) -> &Sprite {
        match self {
            ParticleImage::Static(sprite) => sprite,
            ParticleImage::Animated(animation) => animation.sprite_at(elapsed),
        }
    }

    pub fn frame_index_at(&self, elapsed: Millis) -> u32 {
        match self {
            ParticleImage::Static(_) => 0,
            ParticleImage::Animated(animation) => animation.frame_index_at(elapsed) as u32,
        }
    }
}
