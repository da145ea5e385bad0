//! # nolan
//!
//! Bounded concurrent task scheduling and fan-out execution on tokio.
//!
//! The crate offers two components with real concurrency coordination:
//!
//! - **`TaskScheduler`**: a long-lived producer/consumer process. Work is
//!   submitted into a job queue, a dispatch loop admits each job through a
//!   bounded concurrency gate, and every job runs as its own task under a
//!   per-job timeout. Shutdown is graceful: `stop` waits for every accepted
//!   job before closing the queue.
//! - **`ConcurrentExecutor`**: one-shot fan-out of a batch of delegates over
//!   the same argument, bounded by a gate, joining every failure into a
//!   single `JoinedError`.
//!
//! Both run caller-supplied **delegates**: `Fn(Context, T) -> Future` closures
//! (or `Delegate` implementations) that receive a cancellable `Context`.
//!
//! ## Concurrent fan-out
//!
//! ```rust,ignore
//! use nolan::core::{delegate_fn, ConcurrentExecutor, Context, Executor};
//!
//! let plan = vec![
//!     delegate_fn(|_ctx: Context, order: u64| async move { reserve_stock(order).await }),
//!     delegate_fn(|_ctx: Context, order: u64| async move { charge_card(order).await }),
//! ];
//! let executor = ConcurrentExecutor::new(2);
//! if let Err(errors) = executor.execute_all(&Context::background(), 42, plan).await {
//!     for err in &errors {
//!         tracing::warn!(%err, "order step failed");
//!     }
//! }
//! ```
//!
//! ## Scheduling a stream of jobs
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use nolan::config::SchedulerConfig;
//! use nolan::core::{delegate_fn, Context, TaskScheduler};
//!
//! let scheduler = Arc::new(TaskScheduler::new(
//!     SchedulerConfig::new().with_max_concurrent_workers(4),
//!     delegate_fn(|ctx: Context, url: String| async move { fetch(ctx, url).await }),
//! )?);
//! let dispatch = tokio::spawn({
//!     let scheduler = Arc::clone(&scheduler);
//!     async move { scheduler.start().await }
//! });
//! scheduler.submit_work("https://example.com".into()).await?;
//! scheduler.stop(&Context::background()).await?;
//! dispatch.await??;
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

/// Core concurrency abstractions: context, delegates, gate, executors, scheduler.
pub mod core;
/// Configuration models for the executor and the scheduler.
pub mod config;
/// Builders to construct executors and schedulers from configuration.
pub mod builders;
/// Runtime adapters.
pub mod runtime;
/// Shared utilities.
pub mod util;
