//! Shared utilities.

pub mod parallelism;
pub mod telemetry;

pub use parallelism::*;
pub use telemetry::*;
