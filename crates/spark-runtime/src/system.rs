//! Runtime system trait

use spark_core::{Millis, Result};

/// A system that can be ticked by the host loop
///
/// Ticks are absolute simulation times in milliseconds, delivered in
/// increasing order. One tick is fully processed before the next arrives.
pub trait RuntimeSystem {
    /// Called once before the first tick
    fn initialize(&mut self) -> Result<()>;

    /// Advance the simulation to `tick`
    fn update(&mut self, tick: Millis) -> Result<()>;

    /// Whether the system still has work to do (emitting or animating)
    fn is_running(&self) -> bool;

    /// Called when the system is being shut down
    fn shutdown(&mut self) -> Result<()>;

    /// Human-readable name for this system
    fn name(&self) -> &str;
}
