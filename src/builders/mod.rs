//! Builders to construct executors and schedulers from configuration.

pub mod proc_builder;

pub use proc_builder::{build_executor, build_scheduler};
