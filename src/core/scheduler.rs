//! Bounded concurrent task scheduler.
//!
//! A [`TaskScheduler`] is a long-lived producer/consumer process. Callers
//! submit arguments with [`submit_work`](TaskScheduler::submit_work); the
//! dispatch loop run by [`start`](TaskScheduler::start) admits each one
//! through the scheduler's [`Gate`] and spawns a worker that calls the
//! delegate under a per-job timeout derived from the base context.
//! [`stop`](TaskScheduler::stop) waits for every accepted job to finish and
//! then closes the queue, which ends the dispatch loop.
//!
//! # Lifecycle
//!
//! `Created` -> `Running` (start) -> `Draining` (stop) -> `Terminated` (drained).
//!
//! A dispatch loop that dies on an admission failure moves `Running` to
//! `Failed`; `stop` still drains from there.
//!
//! # Intake and shutdown races
//!
//! The only long-lived queue sender lives behind a mutex; the drain closes the
//! queue by taking it. A submission racing `stop` therefore ends one of three
//! ways: it sees the shutdown flag (`AlreadyTerminated`), it sees the queue
//! closed (`QueueClosed`, its in-flight slot is released), or it is delivered
//! before the close and runs normally. Sending on a closed queue is an error
//! value here, never a panic.
//!
//! # Job results
//!
//! Delegate errors are not returned to submitters. They are logged with the
//! job id and counted in [`SchedulerStats::failed_jobs`]; callers that need
//! per-job results should write them to their own sink from the delegate.
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use std::time::Duration;
//! use nolan::config::SchedulerConfig;
//! use nolan::core::{delegate_fn, Context, TaskScheduler};
//!
//! let scheduler = Arc::new(TaskScheduler::new(
//!     SchedulerConfig::new().with_max_concurrent_workers(8),
//!     delegate_fn(|ctx: Context, path: String| async move { reindex(ctx, path).await }),
//! )?);
//!
//! let dispatch = tokio::spawn({
//!     let scheduler = Arc::clone(&scheduler);
//!     async move { scheduler.start().await }
//! });
//!
//! scheduler.submit_work("/var/data/a".into()).await?;
//! scheduler.stop(&Context::background().with_timeout(Duration::from_secs(5))).await?;
//! dispatch.await??;
//! ```

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tokio::sync::{mpsc, oneshot};
use tokio_util::task::task_tracker::TaskTrackerToken;
use tokio_util::task::TaskTracker;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use super::{Context, Gate, GatePermit, SchedulerError, SharedDelegate, Spawn};
use crate::config::SchedulerConfig;
use crate::runtime::TokioSpawner;

/// A process that runs from `start` until `stop` is called.
#[async_trait]
pub trait BootableProcess: Send + Sync {
    /// Lifecycle error.
    type Error;

    /// Run the process; returns once it has shut down.
    async fn start(&self) -> Result<(), Self::Error>;

    /// Ask the process to shut down and wait for it, bounded by `ctx`.
    async fn stop(&self, ctx: &Context) -> Result<(), Self::Error>;
}

/// Lifecycle state of a [`TaskScheduler`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SchedulerState {
    /// Constructed; the dispatch loop has not started.
    Created,
    /// Accepting submissions and dispatching jobs.
    Running,
    /// The dispatch loop exited on an admission failure; no further jobs
    /// are delivered.
    Failed,
    /// Stop requested; waiting for in-flight jobs.
    Draining,
    /// Drained and the job queue is closed.
    Terminated,
}

/// Statistics about scheduler utilization.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchedulerStats {
    /// Gate capacity.
    pub max_concurrent_workers: usize,
    /// Workers currently holding a gate slot.
    pub active_workers: usize,
    /// Jobs accepted but not yet completed.
    pub in_flight_jobs: usize,
    /// Total jobs accepted for delivery to the queue.
    pub submitted_jobs: u64,
    /// Total jobs whose delegate returned `Ok`.
    pub completed_jobs: u64,
    /// Total jobs whose delegate returned an error.
    pub failed_jobs: u64,
}

#[derive(Debug, Default)]
struct SchedulerCounters {
    submitted: AtomicU64,
    completed: AtomicU64,
    failed: AtomicU64,
}

/// One accepted submission. Holds its in-flight slot until dropped.
struct Job<T> {
    id: u64,
    arg: T,
    in_flight: TaskTrackerToken,
}

/// Bounded concurrent task scheduler.
///
/// Share it behind an `Arc` to run [`start`](Self::start) on its own task
/// while other tasks submit work.
pub struct TaskScheduler<T, S = TokioSpawner>
where
    T: Send + 'static,
{
    id: Uuid,
    delegate: SharedDelegate<T>,
    config: SchedulerConfig,
    base_ctx: Context,
    gate: Gate,
    /// Queue sender; `None` once the drain has closed the queue.
    intake: Arc<Mutex<Option<mpsc::Sender<Job<T>>>>>,
    /// Queue receiver; taken by the dispatch loop.
    queue: Mutex<Option<mpsc::Receiver<Job<T>>>>,
    in_flight: TaskTracker,
    started: AtomicBool,
    dispatch_failed: AtomicBool,
    shutting_down: AtomicBool,
    terminated: Arc<AtomicBool>,
    counters: Arc<SchedulerCounters>,
    job_ids: AtomicU64,
    spawner: S,
}

impl<T> TaskScheduler<T, TokioSpawner>
where
    T: Send + 'static,
{
    /// Create a scheduler from configuration.
    ///
    /// # Errors
    ///
    /// Returns `SchedulerError::InvalidConfig` if the configuration is invalid.
    pub fn new(config: SchedulerConfig, delegate: SharedDelegate<T>) -> Result<Self, SchedulerError> {
        Self::new_with_spawner(config, delegate, TokioSpawner::default())
    }

    /// Create a scheduler with default configuration: twice the available
    /// processors as workers and a 15 second per-job timeout.
    #[must_use]
    pub fn with_defaults(delegate: SharedDelegate<T>) -> Self {
        Self::build(SchedulerConfig::default(), delegate, TokioSpawner::default())
    }
}

impl<T, S> TaskScheduler<T, S>
where
    T: Send + 'static,
    S: Spawn,
{
    /// Create a scheduler that launches workers through `spawner`.
    ///
    /// # Errors
    ///
    /// Returns `SchedulerError::InvalidConfig` if the configuration is invalid.
    pub fn new_with_spawner(
        config: SchedulerConfig,
        delegate: SharedDelegate<T>,
        spawner: S,
    ) -> Result<Self, SchedulerError> {
        config.validate().map_err(SchedulerError::InvalidConfig)?;
        Ok(Self::build(config, delegate, spawner))
    }

    fn build(config: SchedulerConfig, delegate: SharedDelegate<T>, spawner: S) -> Self {
        let (intake, queue) = mpsc::channel(config.queue_capacity.max(1));
        let gate = Gate::new(config.resolved_max_concurrent_workers());
        let id = Uuid::new_v4();

        debug!(
            scheduler = %id,
            max_concurrent_workers = gate.capacity(),
            worker_exec_timeout_ms = config.worker_exec_timeout_ms,
            queue_capacity = config.queue_capacity,
            "task scheduler created"
        );

        Self {
            id,
            delegate,
            config,
            base_ctx: Context::background(),
            gate,
            intake: Arc::new(Mutex::new(Some(intake))),
            queue: Mutex::new(Some(queue)),
            in_flight: TaskTracker::new(),
            started: AtomicBool::new(false),
            dispatch_failed: AtomicBool::new(false),
            shutting_down: AtomicBool::new(false),
            terminated: Arc::new(AtomicBool::new(false)),
            counters: Arc::new(SchedulerCounters::default()),
            job_ids: AtomicU64::new(0),
            spawner,
        }
    }

    /// Replace the base context every job context derives from.
    ///
    /// Cancelling it aborts a dispatch loop waiting for a worker slot and
    /// cancels every running job's context.
    #[must_use]
    pub fn with_base_context(mut self, ctx: Context) -> Self {
        self.base_ctx = ctx;
        self
    }

    /// Scheduler identifier used in log fields.
    #[must_use]
    pub const fn id(&self) -> Uuid {
        self.id
    }

    /// Configuration this scheduler was built with.
    #[must_use]
    pub const fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    /// Base context shared by every job.
    #[must_use]
    pub const fn base_context(&self) -> &Context {
        &self.base_ctx
    }

    /// Jobs accepted but not yet completed.
    #[must_use]
    pub fn in_flight(&self) -> usize {
        self.in_flight.len()
    }

    /// Current lifecycle state.
    #[must_use]
    pub fn state(&self) -> SchedulerState {
        if self.terminated.load(Ordering::Acquire) {
            SchedulerState::Terminated
        } else if self.shutting_down.load(Ordering::Acquire) {
            SchedulerState::Draining
        } else if self.dispatch_failed.load(Ordering::Acquire) {
            SchedulerState::Failed
        } else if self.started.load(Ordering::Acquire) {
            SchedulerState::Running
        } else {
            SchedulerState::Created
        }
    }

    /// Get current scheduler statistics.
    #[must_use]
    pub fn stats(&self) -> SchedulerStats {
        SchedulerStats {
            max_concurrent_workers: self.gate.capacity(),
            active_workers: self.gate.admitted(),
            in_flight_jobs: self.in_flight.len(),
            submitted_jobs: self.counters.submitted.load(Ordering::Relaxed),
            completed_jobs: self.counters.completed.load(Ordering::Relaxed),
            failed_jobs: self.counters.failed.load(Ordering::Relaxed),
        }
    }

    /// Submit an argument for execution.
    ///
    /// Suspends while the job queue is full, i.e. until the dispatch loop is
    /// ready for more work.
    ///
    /// # Errors
    ///
    /// - `SchedulerError::AlreadyTerminated` once `stop` has been called
    /// - `SchedulerError::QueueClosed` if the queue closed before delivery
    pub async fn submit_work(&self, arg: T) -> Result<(), SchedulerError> {
        if self.shutting_down.load(Ordering::Acquire) {
            return Err(SchedulerError::AlreadyTerminated);
        }

        let in_flight = self.in_flight.token();
        let intake = self.intake.lock().clone();
        let Some(intake) = intake else {
            return Err(SchedulerError::QueueClosed);
        };

        let id = self.job_ids.fetch_add(1, Ordering::Relaxed);
        // completed + failed <= submitted holds for every stats snapshot.
        self.counters.submitted.fetch_add(1, Ordering::Relaxed);
        if intake.send(Job { id, arg, in_flight }).await.is_err() {
            self.counters.submitted.fetch_sub(1, Ordering::Relaxed);
            warn!(scheduler = %self.id, job_id = id, "job queue closed before delivery");
            return Err(SchedulerError::QueueClosed);
        }

        debug!(scheduler = %self.id, job_id = id, "job submitted");
        Ok(())
    }

    /// Run the dispatch loop until the job queue is closed and drained.
    ///
    /// # Errors
    ///
    /// - `SchedulerError::AlreadyStarted` if the loop already ran
    /// - `SchedulerError::Admission` if the base context finished while the
    ///   loop waited for a worker slot; dispatch stops for good
    pub async fn start(&self) -> Result<(), SchedulerError> {
        let queue = self.queue.lock().take();
        let Some(mut queue) = queue else {
            return Err(SchedulerError::AlreadyStarted);
        };
        self.started.store(true, Ordering::Release);

        info!(
            scheduler = %self.id,
            max_concurrent_workers = self.gate.capacity(),
            "task scheduler started"
        );

        while let Some(job) = queue.recv().await {
            let permit = match self.gate.acquire(&self.base_ctx).await {
                Ok(permit) => permit,
                Err(err) => {
                    error!(
                        scheduler = %self.id,
                        job_id = job.id,
                        error = %err,
                        "failed to acquire worker slot, stopping dispatch"
                    );
                    self.dispatch_failed.store(true, Ordering::Release);
                    return Err(SchedulerError::Admission(err));
                }
            };
            self.dispatch(job, permit);
        }

        info!(scheduler = %self.id, "job queue closed, dispatch loop exiting");
        Ok(())
    }

    /// Stop accepting work, wait for in-flight jobs, then close the queue.
    ///
    /// The drain runs on its own task and always completes, even if the
    /// caller stops waiting because `ctx` finished first.
    ///
    /// # Errors
    ///
    /// - `SchedulerError::AlreadyTerminated` if stop was already called
    /// - `SchedulerError::Context` if `ctx` finished before the drain
    pub async fn stop(&self, ctx: &Context) -> Result<(), SchedulerError> {
        if self.shutting_down.swap(true, Ordering::AcqRel) {
            return Err(SchedulerError::AlreadyTerminated);
        }

        info!(
            scheduler = %self.id,
            in_flight = self.in_flight.len(),
            "stopping task scheduler, draining in-flight jobs"
        );

        let (drained_tx, drained_rx) = oneshot::channel();
        let in_flight = self.in_flight.clone();
        let intake = Arc::clone(&self.intake);
        let terminated = Arc::clone(&self.terminated);
        let id = self.id;
        self.spawner.spawn(async move {
            in_flight.close();
            in_flight.wait().await;
            // Mark terminated first so a dispatch loop seeing the closed
            // queue observes the final state.
            terminated.store(true, Ordering::Release);
            intake.lock().take();
            info!(scheduler = %id, "task scheduler drained, job queue closed");
            let _ = drained_tx.send(());
        });

        tokio::select! {
            biased;
            drained = drained_rx => drained.map_err(|_| SchedulerError::DrainInterrupted),
            err = ctx.done() => {
                warn!(scheduler = %self.id, error = %err, "stopped waiting for drain");
                Err(SchedulerError::Context(err))
            }
        }
    }

    fn dispatch(&self, job: Job<T>, permit: GatePermit) {
        let delegate = Arc::clone(&self.delegate);
        let base_ctx = self.base_ctx.clone();
        let timeout = self.config.worker_exec_timeout();
        let counters = Arc::clone(&self.counters);
        let scheduler = self.id;

        debug!(scheduler = %scheduler, job_id = job.id, "dispatching job");
        self.spawner.spawn(async move {
            let Job { id, arg, in_flight } = job;
            let _in_flight = in_flight;
            let _permit = permit;

            let outcome = match timeout {
                Some(timeout) => run_scoped(&base_ctx, timeout, &delegate, arg).await,
                None => delegate.call(base_ctx, arg).await,
            };

            match outcome {
                Ok(()) => {
                    counters.completed.fetch_add(1, Ordering::Relaxed);
                    debug!(scheduler = %scheduler, job_id = id, "job completed");
                }
                Err(err) => {
                    counters.failed.fetch_add(1, Ordering::Relaxed);
                    warn!(scheduler = %scheduler, job_id = id, error = %err, "job failed");
                }
            }
        });
    }
}

/// Call the delegate under a per-job timeout; the job context is cancelled
/// once the delegate returns.
async fn run_scoped<T>(
    base_ctx: &Context,
    timeout: Duration,
    delegate: &SharedDelegate<T>,
    arg: T,
) -> anyhow::Result<()>
where
    T: Send + 'static,
{
    let scoped = base_ctx.with_timeout(timeout);
    let _cancel = scoped.drop_guard();
    delegate.call(scoped, arg).await
}

#[async_trait]
impl<T, S> BootableProcess for TaskScheduler<T, S>
where
    T: Send + 'static,
    S: Spawn,
{
    type Error = SchedulerError;

    async fn start(&self) -> Result<(), SchedulerError> {
        Self::start(self).await
    }

    async fn stop(&self, ctx: &Context) -> Result<(), SchedulerError> {
        Self::stop(self, ctx).await
    }
}
