//! Spark Core - Foundational types for the Spark particle engine
//!
//! This crate provides the types that all other Spark crates depend on:
//! - `Millis` - Simulation time in integer milliseconds
//! - `Rect`, `Alignment` - Host geometry used to place emitters
//! - Error types and Result alias

mod error;
mod types;

pub use error::{Result, SparkError};
pub use types::{Alignment, HorizontalAlign, Millis, Rect, VerticalAlign};
