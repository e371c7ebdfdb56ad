//! The particle system: pool ownership, emission scheduling and per-tick update

use crate::curves::{Curve, Interpolator};
use crate::image::ImageSource;
use crate::initializers::{
    AccelerationInitializer, ParticleInitializer, RotationInitializer, RotationSpeedInitializer,
    ScaleInitializer, SpeedByAngleInitializer, SpeedByComponentsInitializer,
};
use crate::modifiers::{AlphaModifier, ModifierPipeline, ParticleModifier};
use crate::particle::{Particle, ParticlePool};
use crate::region::SpawnRegion;
use crate::render::{pack_instances, Canvas, SpriteInstance};
use log::{debug, info, trace};
use rand::rngs::StdRng;
use rand::SeedableRng;
use spark_core::{Millis, Result};
use spark_runtime::{interval_for_fps, RuntimeSystem, DEFAULT_FRAME_INTERVAL};
use std::sync::Arc;

/// Emission state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SystemState {
    /// Not emitting and nothing animating
    Idle,
    /// A fixed burst was spawned at t=0; no further spawns
    OneShot,
    /// Spawning continuously at a fixed rate
    RateLimited,
    /// Emission over, remaining particles finishing their lifetime
    Draining,
}

/// Transient state for one `emit` / `one_shot` call
struct EmissionSession {
    rate_per_second: u32,
    activated: u64,
    /// Emission stops at this session time; None emits until stopped
    duration: Option<Millis>,
    current_time: Millis,
    pipeline: ModifierPipeline,
}

impl EmissionSession {
    fn new(rate_per_second: u32, duration: Option<Millis>, pipeline: ModifierPipeline) -> Self {
        Self {
            rate_per_second,
            activated: 0,
            duration,
            current_time: 0,
            pipeline,
        }
    }

    fn window_open(&self, tick: Millis) -> bool {
        self.duration.is_none_or(|end| tick < end)
    }

    /// Due count derived from absolute session time, so tick spacing never
    /// changes how many particles have been spawned by `tick`.
    fn behind_schedule(&self, tick: Millis) -> bool {
        self.activated * 1000 < u64::from(self.rate_per_second) * tick
    }
}

/// Called after every tick that changed what should be on screen
pub type RedrawCallback = Box<dyn FnMut() + Send>;

/// A fixed pool of sprites plus the pipelines and scheduler that animate them.
///
/// Ticks passed to [`ParticleSystem::on_update`] are session time: ms since the
/// current emission began at t=0.
pub struct ParticleSystem {
    pool: ParticlePool,
    initializers: Vec<Box<dyn ParticleInitializer>>,
    modifiers: Vec<Arc<dyn ParticleModifier>>,
    rng: StdRng,
    time_to_live: Millis,
    region: SpawnRegion,
    frame_interval: Millis,
    start_time: Millis,
    pixel_density: f32,
    state: SystemState,
    session: Option<EmissionSession>,
    redraw: Option<RedrawCallback>,
}

impl ParticleSystem {
    /// Build a system with `max_particles` slots drawn from `source`.
    /// Fails if the image source is empty.
    pub fn new(max_particles: usize, source: ImageSource, time_to_live: Millis) -> Result<Self> {
        Self::from_rng(max_particles, source, time_to_live, StdRng::from_os_rng())
    }

    /// Same as `new` with a fixed RNG seed, for reproducible runs
    pub fn new_seeded(
        max_particles: usize,
        source: ImageSource,
        time_to_live: Millis,
        seed: u64,
    ) -> Result<Self> {
        Self::from_rng(max_particles, source, time_to_live, StdRng::seed_from_u64(seed))
    }

    fn from_rng(
        max_particles: usize,
        source: ImageSource,
        time_to_live: Millis,
        mut rng: StdRng,
    ) -> Result<Self> {
        let images = source.build_images(max_particles, &mut rng)?;
        Ok(Self {
            pool: ParticlePool::new(images),
            initializers: Vec::new(),
            modifiers: Vec::new(),
            rng,
            time_to_live,
            region: SpawnRegion::default(),
            frame_interval: DEFAULT_FRAME_INTERVAL,
            start_time: 0,
            pixel_density: 1.0,
            state: SystemState::Idle,
            session: None,
            redraw: None,
        })
    }

    // ── Configuration ──

    /// Backfill step spacing; zero is clamped to 1ms
    pub fn with_frame_interval(mut self, frame_interval: Millis) -> Self {
        self.frame_interval = frame_interval.max(1);
        self
    }

    pub fn with_fps(self, fps: f64) -> Self {
        self.with_frame_interval(interval_for_fps(fps))
    }

    /// Start emission as if it had already been running for `start_time` ms
    pub fn with_start_time(mut self, start_time: Millis) -> Self {
        self.start_time = start_time;
        self
    }

    /// Pixels per density-independent unit, applied by the speed and
    /// acceleration range helpers
    pub fn with_pixel_density(mut self, pixel_density: f32) -> Self {
        self.pixel_density = pixel_density;
        self
    }

    pub fn with_region(mut self, region: SpawnRegion) -> Self {
        self.region = region;
        self
    }

    pub fn with_initializer(mut self, initializer: impl ParticleInitializer + 'static) -> Self {
        self.add_initializer(Box::new(initializer));
        self
    }

    pub fn with_modifier(mut self, modifier: impl ParticleModifier + 'static) -> Self {
        self.add_modifier(Arc::new(modifier));
        self
    }

    pub fn add_initializer(&mut self, initializer: Box<dyn ParticleInitializer>) {
        self.initializers.push(initializer);
    }

    /// Register a modifier. Takes effect from the next emission session.
    pub fn add_modifier(&mut self, modifier: Arc<dyn ParticleModifier>) {
        self.modifiers.push(modifier);
    }

    fn dp(&self, value: f32) -> f32 {
        value * self.pixel_density
    }

    /// Speed in any direction
    pub fn with_speed_range(self, speed_min: f32, speed_max: f32) -> Self {
        let init = SpeedByAngleInitializer::new(self.dp(speed_min), self.dp(speed_max), 0, 360);
        self.with_initializer(init)
    }

    /// Speed within an angle range; 270 → 90 means "through 0", not 90 → 270
    pub fn with_speed_module_and_angle_range(
        self,
        speed_min: f32,
        speed_max: f32,
        min_angle: i32,
        max_angle: i32,
    ) -> Self {
        let init = SpeedByAngleInitializer::wrapping(
            self.dp(speed_min),
            self.dp(speed_max),
            min_angle,
            max_angle,
        );
        self.with_initializer(init)
    }

    pub fn with_speed_by_components_range(
        self,
        min_x: f32,
        max_x: f32,
        min_y: f32,
        max_y: f32,
    ) -> Self {
        let init = SpeedByComponentsInitializer::new(
            self.dp(min_x),
            self.dp(max_x),
            self.dp(min_y),
            self.dp(max_y),
        );
        self.with_initializer(init)
    }

    pub fn with_initial_rotation_range(self, min_angle: i32, max_angle: i32) -> Self {
        self.with_initializer(RotationInitializer::new(min_angle, max_angle))
    }

    pub fn with_scale_range(self, min: f32, max: f32) -> Self {
        self.with_initializer(ScaleInitializer::new(min, max))
    }

    pub fn with_rotation_speed(self, rotation_speed: f32) -> Self {
        self.with_rotation_speed_range(rotation_speed, rotation_speed)
    }

    pub fn with_rotation_speed_range(self, min: f32, max: f32) -> Self {
        self.with_initializer(RotationSpeedInitializer::new(min, max))
    }

    pub fn with_acceleration_module_and_angle_range(
        self,
        min: f32,
        max: f32,
        min_angle: i32,
        max_angle: i32,
    ) -> Self {
        let init = AccelerationInitializer::new(self.dp(min), self.dp(max), min_angle, max_angle);
        self.with_initializer(init)
    }

    /// Fixed acceleration in raw px/ms² (not density scaled)
    pub fn with_acceleration(self, acceleration: f32, angle: i32) -> Self {
        self.with_initializer(AccelerationInitializer::new(
            acceleration,
            acceleration,
            angle,
            angle,
        ))
    }

    /// Fade from opaque to transparent over the last `duration` ms of the
    /// configured time-to-live
    pub fn with_fade_out(self, duration: Millis) -> Self {
        self.with_fade_out_curve(duration, Arc::new(Curve::Linear))
    }

    pub fn with_fade_out_curve(self, duration: Millis, curve: Arc<dyn Interpolator>) -> Self {
        let start = self.time_to_live.saturating_sub(duration);
        let end = self.time_to_live;
        self.with_modifier(AlphaModifier::with_curve(255, 0, start, end, curve))
    }

    /// Ask the host to repaint after each tick, typically by waking its
    /// render loop.
    ///
    /// Called from inside `on_update`, so it must not reach back into this
    /// system. Through [`SharedParticleSystem`](crate::SharedParticleSystem)
    /// it runs after the lock is released.
    pub fn set_redraw_callback(&mut self, callback: impl FnMut() + Send + 'static) {
        self.redraw = Some(Box::new(callback));
    }

    /// Move the spawn area, including for a session already running
    pub fn update_emit_point(&mut self, region: SpawnRegion) {
        self.region = region;
    }

    // ── Emission control ──

    /// Spawn `count` particles at once (capped by the pool size), all at t=0.
    /// Any running session is cancelled first.
    pub fn one_shot(&mut self, count: usize) {
        self.cancel();
        let mut session = EmissionSession::new(0, Some(0), self.snapshot_pipeline());
        let count = count.min(self.pool.capacity());
        for _ in 0..count {
            let Some(p) = self.pool.take_free() else {
                break;
            };
            spawn_particle(
                p,
                &self.initializers,
                &mut self.rng,
                &self.region,
                self.time_to_live,
                0,
                &session.pipeline,
            );
            session.activated += 1;
        }
        info!("One-shot burst of {} particle(s)", session.activated);
        self.session = Some(session);
        self.state = SystemState::OneShot;
    }

    /// Emit continuously at `rate_per_second`, for `duration` ms or until
    /// stopped. With a start time configured, the interval before it is
    /// replayed so the first visible tick already shows a populated stream.
    pub fn emit(&mut self, rate_per_second: u32, duration: Option<Millis>) {
        self.cancel();
        self.session = Some(EmissionSession::new(
            rate_per_second,
            duration,
            self.snapshot_pipeline(),
        ));
        self.state = SystemState::RateLimited;
        match duration {
            Some(ms) => info!("Emitting {rate_per_second}/s for {ms}ms"),
            None => info!("Emitting {rate_per_second}/s until stopped"),
        }
        self.update_particles_before_start_time();
    }

    /// Stop spawning; particles already alive run out their lifetime
    pub fn stop_emitting(&mut self) {
        if self.state != SystemState::RateLimited {
            return;
        }
        if let Some(session) = self.session.as_mut() {
            session.duration = Some(session.current_time);
        }
        self.state = SystemState::Draining;
        if self.pool.active_count() == 0 {
            self.finish_session();
        }
    }

    /// Stop immediately, returning every particle to the pool
    pub fn cancel(&mut self) {
        if self.state != SystemState::Idle {
            debug!(
                "Cancelling emission with {} active particle(s)",
                self.pool.active_count()
            );
        }
        self.finish_session();
    }

    /// Advance to `tick`: spawn whatever is due, update every active
    /// particle and recycle the expired ones.
    pub fn on_update(&mut self, tick: Millis) {
        if self.step(tick) {
            self.request_redraw();
        }
    }

    /// `on_update` without the redraw signal. Returns false if idle.
    pub(crate) fn step(&mut self, tick: Millis) -> bool {
        let Some((spawned, expired)) = self.advance(tick) else {
            return false;
        };
        trace!(
            "tick {tick}: +{spawned} -{expired}, {} active",
            self.pool.active_count()
        );
        true
    }

    /// Spawn, update and recycle; returns the spawned and expired counts
    fn advance(&mut self, tick: Millis) -> Option<(usize, usize)> {
        if self.state == SystemState::Idle {
            return None;
        }
        let mut spawned = 0;
        if let Some(session) = self.session.as_mut() {
            session.current_time = tick;
            if self.state == SystemState::RateLimited {
                while session.window_open(tick)
                    && session.behind_schedule(tick)
                    && self.pool.free_count() > 0
                {
                    let Some(p) = self.pool.take_free() else {
                        break;
                    };
                    spawn_particle(
                        p,
                        &self.initializers,
                        &mut self.rng,
                        &self.region,
                        self.time_to_live,
                        tick,
                        &session.pipeline,
                    );
                    session.activated += 1;
                    spawned += 1;
                }
                if !session.window_open(tick) {
                    self.state = SystemState::Draining;
                }
            }
        }

        let expired = self.pool.update_and_compact(tick);

        if self.state != SystemState::RateLimited && self.pool.active_count() == 0 {
            debug!("Emission finished at {tick}ms");
            self.finish_session();
        }
        Some((spawned, expired))
    }

    fn request_redraw(&mut self) {
        if let Some(redraw) = self.redraw.as_mut() {
            redraw();
        }
    }

    pub(crate) fn take_redraw_callback(&mut self) -> Option<RedrawCallback> {
        self.redraw.take()
    }

    /// Put a taken callback back unless a new one was set meanwhile
    pub(crate) fn restore_redraw_callback(&mut self, callback: RedrawCallback) {
        if self.redraw.is_none() {
            self.redraw = Some(callback);
        }
    }

    /// Replay the rate-limited schedule from 0 to the start time in evenly
    /// spaced steps of about one frame interval.
    fn update_particles_before_start_time(&mut self) {
        let rate = self.session.as_ref().map_or(0, |s| s.rate_per_second);
        if rate == 0 || self.start_time == 0 {
            return;
        }
        let start = self.start_time;
        let steps = start.div_ceil(self.frame_interval);
        debug!("Replaying {steps} step(s) up to {start}ms");
        for i in 1..=steps {
            self.advance(start * i / steps);
            if self.state == SystemState::Idle {
                break;
            }
        }
    }

    fn snapshot_pipeline(&self) -> ModifierPipeline {
        ModifierPipeline::new(self.modifiers.clone())
    }

    fn finish_session(&mut self) {
        self.pool.recycle_all();
        self.session = None;
        self.state = SystemState::Idle;
    }

    // ── Queries ──

    pub fn state(&self) -> SystemState {
        self.state
    }

    pub fn is_emitting(&self) -> bool {
        self.state == SystemState::RateLimited
    }

    pub fn capacity(&self) -> usize {
        self.pool.capacity()
    }

    pub fn active_count(&self) -> usize {
        self.pool.active_count()
    }

    pub fn free_count(&self) -> usize {
        self.pool.free_count()
    }

    /// Particles spawned so far in the current session
    pub fn activated_count(&self) -> u64 {
        self.session.as_ref().map_or(0, |s| s.activated)
    }

    /// Last tick seen by the current session
    pub fn current_time(&self) -> Millis {
        self.session.as_ref().map_or(0, |s| s.current_time)
    }

    pub fn time_to_live(&self) -> Millis {
        self.time_to_live
    }

    pub fn start_time(&self) -> Millis {
        self.start_time
    }

    pub fn frame_interval(&self) -> Millis {
        self.frame_interval
    }

    pub fn region(&self) -> SpawnRegion {
        self.region
    }

    /// Active particles, in no particular order
    pub fn active_particles(&self) -> &[Particle] {
        self.pool.active()
    }

    pub fn draw(&self, canvas: &mut dyn Canvas) {
        for p in self.pool.active() {
            p.draw(canvas);
        }
    }

    pub fn pack_instances(&self, buffer: &mut Vec<SpriteInstance>) {
        pack_instances(self.pool.active(), buffer);
    }
}

impl RuntimeSystem for ParticleSystem {
    fn initialize(&mut self) -> Result<()> {
        debug!("Particle system ready with {} slot(s)", self.capacity());
        Ok(())
    }

    fn update(&mut self, tick: Millis) -> Result<()> {
        self.on_update(tick);
        Ok(())
    }

    fn is_running(&self) -> bool {
        self.state != SystemState::Idle
    }

    fn shutdown(&mut self) -> Result<()> {
        self.cancel();
        Ok(())
    }

    fn name(&self) -> &str {
        "particles"
    }
}

/// Run the initializers, bind spawn point and lifetime, and attach the
/// session pipeline. Initializers go first since they may change scale.
fn spawn_particle(
    p: &mut Particle,
    initializers: &[Box<dyn ParticleInitializer>],
    rng: &mut StdRng,
    region: &SpawnRegion,
    time_to_live: Millis,
    activation_time: Millis,
    pipeline: &ModifierPipeline,
) {
    p.init();
    for initializer in initializers {
        initializer.initialize(p, rng);
    }
    let spawn = region.sample(rng);
    p.configure(time_to_live, spawn);
    p.activate(activation_time, pipeline.clone());
}
