//! Emitter configuration parsed from TOML

use crate::curves::Curve;
use crate::image::{FrameAnimation, ImageSource, Sprite};
use crate::modifiers::{AlphaModifier, FadeOutModifier, ScaleModifier};
use crate::region::SpawnRegion;
use crate::system::ParticleSystem;
use log::debug;
use serde::{Deserialize, Serialize};
use spark_core::{Alignment, Millis, Rect, Result, SparkError};
use spark_runtime::DEFAULT_FRAME_INTERVAL;
use std::path::Path;
use std::sync::Arc;

fn default_frame_interval() -> Millis {
    DEFAULT_FRAME_INTERVAL
}

fn default_pixel_density() -> f32 {
    1.0
}

/// Complete description of one particle effect
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmitterConfig {
    pub max_particles: usize,
    /// Lifetime of every particle, in ms
    pub time_to_live: Millis,
    #[serde(default = "default_frame_interval")]
    pub frame_interval: Millis,
    #[serde(default)]
    pub start_time: Millis,
    #[serde(default)]
    pub seed: Option<u64>,
    /// Pixels per density-independent unit
    #[serde(default = "default_pixel_density")]
    pub pixel_density: f32,
    pub image: ImageConfig,
    #[serde(default)]
    pub spawn: SpawnConfig,
    pub emission: EmissionConfig,
    #[serde(default)]
    pub initializers: Vec<InitializerConfig>,
    #[serde(default)]
    pub modifiers: Vec<ModifierConfig>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ImageConfig {
    Single(Sprite),
    Multiple {
        sprites: Vec<Sprite>,
    },
    Animation {
        frames: Vec<FrameConfig>,
        #[serde(default)]
        one_shot: bool,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameConfig {
    pub name: String,
    pub width: u32,
    pub height: u32,
    pub duration: Millis,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SpawnConfig {
    /// A window coordinate
    Point {
        x: i32,
        y: i32,
        #[serde(default)]
        parent_origin: (i32, i32),
    },
    /// An element's window bounds resolved through an alignment
    Bounds {
        bounds: Rect,
        #[serde(default)]
        alignment: Alignment,
        #[serde(default)]
        parent_origin: (i32, i32),
    },
}

impl Default for SpawnConfig {
    fn default() -> Self {
        SpawnConfig::Point {
            x: 0,
            y: 0,
            parent_origin: (0, 0),
        }
    }
}

impl SpawnConfig {
    pub fn region(&self) -> SpawnRegion {
        match *self {
            SpawnConfig::Point { x, y, parent_origin } => SpawnRegion::point(x, y, parent_origin),
            SpawnConfig::Bounds {
                bounds,
                alignment,
                parent_origin,
            } => SpawnRegion::from_bounds(bounds, parent_origin, alignment),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum EmissionConfig {
    /// Particles per second, for `duration` ms or until stopped
    Rate {
        rate: u32,
        #[serde(default)]
        duration: Option<Millis>,
    },
    /// A single burst at t=0
    OneShot { count: usize },
}

/// Speeds and accelerations are in dp per ms (or ms²), except the fixed
/// `acceleration` kind which is raw px/ms².
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum InitializerConfig {
    SpeedRange {
        min: f32,
        max: f32,
    },
    SpeedByAngle {
        min: f32,
        max: f32,
        min_angle: i32,
        max_angle: i32,
    },
    SpeedByComponents {
        min_x: f32,
        max_x: f32,
        min_y: f32,
        max_y: f32,
    },
    Rotation {
        min: i32,
        max: i32,
    },
    RotationSpeed {
        min: f32,
        max: f32,
    },
    Scale {
        min: f32,
        max: f32,
    },
    Acceleration {
        value: f32,
        angle: i32,
    },
    AccelerationRange {
        min: f32,
        max: f32,
        min_angle: i32,
        max_angle: i32,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ModifierConfig {
    /// Alpha over an absolute window after activation
    Alpha {
        start: u8,
        end: u8,
        start_time: Millis,
        end_time: Millis,
        #[serde(default)]
        curve: Curve,
    },
    /// Opaque to transparent over the last `duration` ms of `time_to_live`
    FadeOut {
        duration: Millis,
        #[serde(default)]
        curve: Curve,
    },
    /// Alpha over the last `duration` ms of each particle's own lifetime
    LifetimeAlpha {
        start: u8,
        end: u8,
        duration: Millis,
        #[serde(default)]
        curve: Curve,
    },
    Scale {
        start: f32,
        end: f32,
        start_time: Millis,
        end_time: Millis,
        #[serde(default)]
        curve: Curve,
    },
}

impl EmitterConfig {
    pub fn from_toml_str(toml_str: &str) -> Result<Self> {
        let config: EmitterConfig = toml::from_str(toml_str)?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        debug!("Loading emitter config from {}", path.display());
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Reject values the system can't run with
    pub fn validate(&self) -> Result<()> {
        if self.max_particles == 0 {
            return Err(SparkError::InvalidConfig(
                "max_particles must be at least 1".to_string(),
            ));
        }
        if self.frame_interval == 0 {
            return Err(SparkError::InvalidConfig(
                "frame_interval must be at least 1ms".to_string(),
            ));
        }
        if !(self.pixel_density > 0.0) {
            return Err(SparkError::ValueOutOfRange {
                field: "pixel_density".to_string(),
                min: f64::MIN_POSITIVE,
                max: f64::MAX,
                value: self.pixel_density as f64,
            });
        }
        match &self.image {
            ImageConfig::Multiple { sprites } if sprites.is_empty() => {
                return Err(SparkError::EmptyImageSource)
            }
            ImageConfig::Animation { frames, .. } if frames.is_empty() => {
                return Err(SparkError::EmptyAnimation)
            }
            _ => {}
        }
        for init in &self.initializers {
            if let InitializerConfig::Scale { min, max } = *init {
                if min < 0.0 || max < 0.0 {
                    return Err(SparkError::ValueOutOfRange {
                        field: "scale".to_string(),
                        min: 0.0,
                        max: f64::MAX,
                        value: min.min(max) as f64,
                    });
                }
            }
        }
        Ok(())
    }

    pub fn image_source(&self) -> Result<ImageSource> {
        Ok(match &self.image {
            ImageConfig::Single(sprite) => ImageSource::Single(sprite.clone()),
            ImageConfig::Multiple { sprites } => ImageSource::Multiple(sprites.clone()),
            ImageConfig::Animation { frames, one_shot } => {
                let frames = frames
                    .iter()
                    .map(|f| (Sprite::new(f.name.clone(), f.width, f.height), f.duration))
                    .collect();
                ImageSource::Animation(FrameAnimation::new(frames)?.one_shot(*one_shot))
            }
        })
    }

    /// Build an idle system with every initializer and modifier attached
    pub fn build(&self) -> Result<ParticleSystem> {
        self.validate()?;
        let source = self.image_source()?;
        let system = match self.seed {
            Some(seed) => {
                ParticleSystem::new_seeded(self.max_particles, source, self.time_to_live, seed)?
            }
            None => ParticleSystem::new(self.max_particles, source, self.time_to_live)?,
        };
        // Density first: the range helpers below read it.
        let mut system = system
            .with_frame_interval(self.frame_interval)
            .with_start_time(self.start_time)
            .with_pixel_density(self.pixel_density)
            .with_region(self.spawn.region());

        for init in &self.initializers {
            system = apply_initializer(system, *init);
        }
        for modifier in &self.modifiers {
            system = apply_modifier(system, *modifier);
        }
        debug!(
            "Built emitter: {} slot(s), {} initializer(s), {} modifier(s)",
            self.max_particles,
            self.initializers.len(),
            self.modifiers.len()
        );
        Ok(system)
    }

    /// Launch the configured emission on `system`
    pub fn start(&self, system: &mut ParticleSystem) {
        match self.emission {
            EmissionConfig::Rate { rate, duration } => system.emit(rate, duration),
            EmissionConfig::OneShot { count } => system.one_shot(count),
        }
    }
}

fn apply_initializer(system: ParticleSystem, init: InitializerConfig) -> ParticleSystem {
    match init {
        InitializerConfig::SpeedRange { min, max } => system.with_speed_range(min, max),
        InitializerConfig::SpeedByAngle {
            min,
            max,
            min_angle,
            max_angle,
        } => system.with_speed_module_and_angle_range(min, max, min_angle, max_angle),
        InitializerConfig::SpeedByComponents {
            min_x,
            max_x,
            min_y,
            max_y,
        } => system.with_speed_by_components_range(min_x, max_x, min_y, max_y),
        InitializerConfig::Rotation { min, max } => system.with_initial_rotation_range(min, max),
        InitializerConfig::RotationSpeed { min, max } => {
            system.with_rotation_speed_range(min, max)
        }
        InitializerConfig::Scale { min, max } => system.with_scale_range(min, max),
        InitializerConfig::Acceleration { value, angle } => system.with_acceleration(value, angle),
        InitializerConfig::AccelerationRange {
            min,
            max,
            min_angle,
            max_angle,
        } => system.with_acceleration_module_and_angle_range(min, max, min_angle, max_angle),
    }
}

fn apply_modifier(mut system: ParticleSystem, modifier: ModifierConfig) -> ParticleSystem {
    match modifier {
        ModifierConfig::Alpha {
            start,
            end,
            start_time,
            end_time,
            curve,
        } => system.add_modifier(Arc::new(AlphaModifier::with_curve(
            start,
            end,
            start_time,
            end_time,
            Arc::new(curve),
        ))),
        ModifierConfig::FadeOut { duration, curve } => {
            return system.with_fade_out_curve(duration, Arc::new(curve));
        }
        ModifierConfig::LifetimeAlpha {
            start,
            end,
            duration,
            curve,
        } => system.add_modifier(Arc::new(FadeOutModifier::with_curve(
            start,
            end,
            duration,
            Arc::new(curve),
        ))),
        ModifierConfig::Scale {
            start,
            end,
            start_time,
            end_time,
            curve,
        } => system.add_modifier(Arc::new(ScaleModifier::with_curve(
            start,
            end,
            start_time,
            end_time,
            Arc::new(curve),
        ))),
    }
    system
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::system::SystemState;

    const CONFETTI: &str = include_str!("../../spark-cli/configs/confetti.toml");

    const STREAM: &str = r#"
max_particles = 200
time_to_live = 1000
start_time = 500
seed = 3

[image]
kind = "single"
name = "dot"
width = 8
height = 8

[spawn]
kind = "bounds"
bounds = { x = 100, y = 300, width = 80, height = 40 }
alignment = { horizontal = "fill", vertical = "top" }

[emission]
mode = "rate"
rate = 10

[[initializers]]
kind = "speed_by_angle"
min = 0.1
max = 0.2
min_angle = 270
max_angle = 90

[[modifiers]]
kind = "fade_out"
duration = 200
"#;

    #[test]
    fn parse_confetti() {
        let config = EmitterConfig::from_toml_str(CONFETTI).unwrap();
        assert_eq!(config.max_particles, 10);
        assert_eq!(config.time_to_live, 3000);
        assert_eq!(config.frame_interval, 33);
        assert_eq!(config.emission, EmissionConfig::OneShot { count: 10 });
        assert!(matches!(config.image, ImageConfig::Multiple { ref sprites } if sprites.len() == 6));
        assert!(!config.modifiers.is_empty());
    }

    #[test]
    fn confetti_runs_to_completion() {
        let config = EmitterConfig::from_toml_str(CONFETTI).unwrap();
        let mut system = config.build().unwrap();
        config.start(&mut system);
        assert_eq!(system.state(), SystemState::OneShot);
        assert_eq!(system.active_count(), 10);

        let mut t = 0;
        while system.state() != SystemState::Idle {
            t += config.frame_interval;
            system.on_update(t);
            assert!(t < 10_000);
        }
        assert!(t > config.time_to_live);
    }

    #[test]
    fn parse_rate_stream_with_backfill() {
        let config = EmitterConfig::from_toml_str(STREAM).unwrap();
        assert_eq!(
            config.emission,
            EmissionConfig::Rate {
                rate: 10,
                duration: None
            }
        );
        assert_eq!(config.spawn.region(), SpawnRegion::new(100, 180, 300, 300));

        let mut system = config.build().unwrap();
        config.start(&mut system);
        assert_eq!(system.state(), SystemState::RateLimited);
        assert_eq!(system.activated_count(), 5);
        for p in system.active_particles() {
            assert!((100.0..180.0 + 100.0).contains(&p.center().x));
        }
    }

    #[test]
    fn defaults_apply() {
        let config = EmitterConfig::from_toml_str(
            r#"
max_particles = 5
time_to_live = 100

[image]
kind = "single"
name = "p"
width = 2
height = 2

[emission]
mode = "one_shot"
count = 5
"#,
        )
        .unwrap();
        assert_eq!(config.frame_interval, DEFAULT_FRAME_INTERVAL);
        assert_eq!(config.start_time, 0);
        assert_eq!(config.pixel_density, 1.0);
        assert_eq!(config.spawn, SpawnConfig::default());
        assert!(config.initializers.is_empty());
    }

    #[test]
    fn animation_image() {
        let config = EmitterConfig::from_toml_str(
            r#"
max_particles = 3
time_to_live = 500

[image]
kind = "animation"
one_shot = true
frames = [
    { name = "f0", width = 8, height = 8, duration = 100 },
    { name = "f1", width = 8, height = 8, duration = 100 },
]

[emission]
mode = "one_shot"
count = 3

[[modifiers]]
kind = "scale"
start = 1.0
end = 2.0
start_time = 0
end_time = 100
curve = { kind = "accelerate", factor = 1.0 }
"#,
        )
        .unwrap();
        let mut system = config.build().unwrap();
        config.start(&mut system);
        system.on_update(150);
        for p in system.active_particles() {
            assert_eq!(p.current_sprite().name, "f1");
            assert_eq!(p.scale, 2.0);
        }
    }

    #[test]
    fn empty_sprite_list_rejected() {
        let config = EmitterConfig::from_toml_str(
            r#"
max_particles = 3
time_to_live = 500

[image]
kind = "multiple"
sprites = []

[emission]
mode = "one_shot"
count = 3
"#,
        )
        .unwrap();
        assert!(matches!(config.validate(), Err(SparkError::EmptyImageSource)));
        assert!(config.build().is_err());
    }

    #[test]
    fn invalid_values_rejected() {
        let mut config = EmitterConfig::from_toml_str(STREAM).unwrap();
        config.pixel_density = 0.0;
        assert!(matches!(
            config.validate(),
            Err(SparkError::ValueOutOfRange { .. })
        ));

        config.pixel_density = 1.0;
        config.max_particles = 0;
        assert!(matches!(config.validate(), Err(SparkError::InvalidConfig(_))));

        config.max_particles = 10;
        config.frame_interval = 0;
        assert!(matches!(config.validate(), Err(SparkError::InvalidConfig(_))));
        assert!(config.build().is_err());
    }

    #[test]
    fn unknown_kind_is_parse_error() {
        let bad = STREAM.replace("speed_by_angle", "warp_drive");
        assert!(matches!(
            EmitterConfig::from_toml_str(&bad),
            Err(SparkError::TomlParseError(_))
        ));

        let bad = STREAM.replace("mode = \"rate\"", "mode = \"trickle\"");
        assert_ne!(bad, STREAM);
        assert!(matches!(
            EmitterConfig::from_toml_str(&bad),
            Err(SparkError::TomlParseError(_))
        ));
    }

    #[test]
    fn lifetime_alpha_modifier() {
        let mut config = EmitterConfig::from_toml_str(STREAM).unwrap();
        config.start_time = 0;
        config.modifiers = vec![ModifierConfig::LifetimeAlpha {
            start: 200,
            end: 0,
            duration: 1000,
            curve: Curve::Linear,
        }];
        config.emission = EmissionConfig::OneShot { count: 1 };
        let mut system = config.build().unwrap();
        config.start(&mut system);
        system.on_update(500);
        assert_eq!(system.active_particles()[0].alpha, 100);
    }
}
