//! Spark Runtime - Tick delivery for particle simulations
//!
//! Provides the building blocks a host loop uses to drive simulations:
//! - `FrameClock`: fixed-interval timer ticks or wall-clock animation ticks
//! - `RuntimeSystem`: trait for systems advanced by the host loop

mod clock;
mod system;

pub use clock::{interval_for_fps, ClockMode, FrameClock, DEFAULT_FRAME_INTERVAL};
pub use system::RuntimeSystem;
