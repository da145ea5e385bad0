//! Configuration models for the executor and the scheduler.

pub mod scheduler;

pub use scheduler::{ExecutorConfig, ProcConfig, SchedulerConfig};
