//! Headless emitter run

use anyhow::{Context, Result};
use serde::Serialize;
use spark_particles::{EmissionConfig, EmitterConfig, RecordingCanvas, SystemState};
use spark_runtime::FrameClock;

pub struct SimulateArgs {
    pub config: String,
    pub duration: u64,
    pub stop_at: Option<u64>,
    pub seed: Option<u64>,
    pub every: usize,
    pub format: String,
}

/// Pool snapshot after one frame
#[derive(Debug, Serialize)]
struct FrameSample {
    tick: u64,
    state: String,
    active: usize,
    free: usize,
    activated: u64,
    draw_calls: usize,
}

pub fn run(args: SimulateArgs) -> Result<()> {
    let mut config = EmitterConfig::load(&args.config)
        .with_context(|| format!("Failed to load emitter '{}'", args.config))?;
    if args.seed.is_some() {
        config.seed = args.seed;
    }
    let mut system = config.build().context("Invalid emitter configuration")?;

    // Backfill only applies to rate-limited emission; bursts always start at 0
    let first_tick = match config.emission {
        EmissionConfig::Rate { .. } => system.start_time(),
        EmissionConfig::OneShot { .. } => 0,
    };
    let mut clock = FrameClock::with_interval(system.frame_interval()).starting_at(first_tick);
    config.start(&mut system);

    let every = args.every.max(1);
    let mut canvas = RecordingCanvas::new();
    let mut samples = Vec::new();
    let mut frame = 0usize;

    loop {
        let tick = clock.tick();
        if tick > args.duration {
            break;
        }
        if args.stop_at.is_some_and(|at| tick >= at) && system.is_emitting() {
            system.stop_emitting();
        }
        system.on_update(tick);

        if frame % every == 0 || system.state() == SystemState::Idle {
            canvas.clear();
            system.draw(&mut canvas);
            samples.push(FrameSample {
                tick,
                state: format!("{:?}", system.state()).to_lowercase(),
                active: system.active_count(),
                free: system.free_count(),
                activated: system.activated_count(),
                draw_calls: canvas.calls.len(),
            });
        }
        frame += 1;

        if system.state() == SystemState::Idle {
            break;
        }
    }

    if args.format == "json" {
        let output = serde_json::json!({
            "config": args.config,
            "capacity": system.capacity(),
            "frame_interval": system.frame_interval(),
            "frames": frame,
            "samples": samples,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        println!(
            "{}: {} slot(s), {}ms frames",
            args.config,
            system.capacity(),
            system.frame_interval()
        );
        println!("{:>8}  {:<12} {:>6} {:>6} {:>9}", "tick", "state", "active", "free", "activated");
        for s in &samples {
            println!(
                "{:>8}  {:<12} {:>6} {:>6} {:>9}",
                s.tick, s.state, s.active, s.free, s.activated
            );
        }
        println!("{} frame(s) simulated", frame);
    }

    Ok(())
}
