//! Executors: run a batch of delegates against one shared argument.
//!
//! - [`ConcurrentExecutor`] fans the batch out as independent tasks, admitted
//!   through a [`Gate`], and joins every failure into one [`JoinedError`].
//! - [`SyncExecutor`] runs the batch in order on the calling task and stops at
//!   the first failure.
//!
//! # Example
//!
//! ```rust,ignore
//! use nolan::core::{delegate_fn, ConcurrentExecutor, Context, Executor};
//!
//! let plan = vec![
//!     delegate_fn(|_ctx: Context, id: u64| async move { index_user(id).await }),
//!     delegate_fn(|_ctx: Context, id: u64| async move { notify_user(id).await }),
//! ];
//! let executor = ConcurrentExecutor::new(4);
//! executor.execute_all(&Context::background(), 42, plan).await?;
//! ```

use std::sync::{Arc, OnceLock};

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio_util::task::TaskTracker;
use tracing::{debug, warn};

use super::{Context, Delegate, DelegateResult, ExecError, Gate, JoinedError, SharedDelegate, Spawn};
use crate::config::ExecutorConfig;
use crate::runtime::TokioSpawner;
use crate::util::resolve_concurrency;

/// Runs delegates with a given argument.
///
/// How the delegates run (concurrently or in sequence) depends on the
/// implementation.
#[async_trait]
pub trait Executor<T>: Send + Sync
where
    T: Clone + Send + 'static,
{
    /// Call one delegate directly.
    async fn execute(&self, ctx: &Context, arg: T, delegate: &dyn Delegate<T>) -> DelegateResult;

    /// Run every delegate of `delegates` with `arg`.
    ///
    /// # Errors
    ///
    /// Returns a [`JoinedError`] holding every recorded failure.
    async fn execute_all<I>(&self, ctx: &Context, arg: T, delegates: I) -> Result<(), JoinedError>
    where
        I: IntoIterator<Item = SharedDelegate<T>> + Send,
        I::IntoIter: Send;
}

type ErrorSink = Arc<Mutex<Vec<ExecError>>>;

/// Records a delegate's outcome; records [`ExecError::Aborted`] if dropped
/// before [`finish`](Self::finish).
struct Completion {
    index: usize,
    errors: ErrorSink,
    finished: bool,
}

impl Completion {
    const fn new(index: usize, errors: ErrorSink) -> Self {
        Self {
            index,
            errors,
            finished: false,
        }
    }

    fn finish(mut self, outcome: DelegateResult) {
        self.finished = true;
        if let Err(source) = outcome {
            debug!(index = self.index, error = %source, "delegate failed");
            self.errors.lock().push(ExecError::Delegate {
                index: self.index,
                source,
            });
        }
    }
}

impl Drop for Completion {
    fn drop(&mut self) {
        if !self.finished {
            warn!(index = self.index, "delegate dropped before completion");
            self.errors.lock().push(ExecError::Aborted { index: self.index });
        }
    }
}

/// Concurrency-backed [`Executor`].
///
/// Each delegate runs as its own task; a shared [`Gate`] bounds how many run
/// at once. The default value is ready to use: its gate is sized on first use
/// to twice the available processors.
#[derive(Debug, Default)]
pub struct ConcurrentExecutor<S = TokioSpawner> {
    max_concurrency: usize,
    gate: OnceLock<Gate>,
    spawner: S,
}

impl ConcurrentExecutor<TokioSpawner> {
    /// Create an executor running at most `max_concurrency` delegates at
    /// once; `0` means twice the available processors.
    #[must_use]
    pub fn new(max_concurrency: usize) -> Self {
        Self::with_spawner(max_concurrency, TokioSpawner::default())
    }

    /// Create an executor from configuration.
    ///
    /// # Errors
    ///
    /// Returns the validation message if `config` is invalid.
    pub fn from_config(config: &ExecutorConfig) -> Result<Self, String> {
        config.validate()?;
        Ok(Self::new(config.max_concurrency))
    }
}

impl<S: Spawn> ConcurrentExecutor<S> {
    /// Create an executor that launches delegates through `spawner`.
    pub const fn with_spawner(max_concurrency: usize, spawner: S) -> Self {
        Self {
            max_concurrency,
            gate: OnceLock::new(),
            spawner,
        }
    }

    /// Concurrency ceiling after applying the default.
    #[must_use]
    pub fn max_concurrency(&self) -> usize {
        self.gate().capacity()
    }

    /// Gate shared by every batch run on this executor.
    #[must_use]
    pub fn gate(&self) -> &Gate {
        self.gate
            .get_or_init(|| Gate::new(resolve_concurrency(self.max_concurrency)))
    }
}

#[async_trait]
impl<T, S> Executor<T> for ConcurrentExecutor<S>
where
    T: Clone + Send + 'static,
    S: Spawn,
{
    async fn execute(&self, ctx: &Context, arg: T, delegate: &dyn Delegate<T>) -> DelegateResult {
        delegate.call(ctx.clone(), arg).await
    }

    async fn execute_all<I>(&self, ctx: &Context, arg: T, delegates: I) -> Result<(), JoinedError>
    where
        I: IntoIterator<Item = SharedDelegate<T>> + Send,
        I::IntoIter: Send,
    {
        let gate = self.gate();
        let errors: ErrorSink = Arc::default();
        let tracker = TaskTracker::new();

        for (index, delegate) in delegates.into_iter().enumerate() {
            let permit = match gate.acquire(ctx).await {
                Ok(permit) => permit,
                Err(source) => {
                    warn!(index, error = %source, "delegate not admitted, stopping batch");
                    errors.lock().push(ExecError::Admission { index, source });
                    break;
                }
            };

            let in_flight = tracker.token();
            let completion = Completion::new(index, Arc::clone(&errors));
            let ctx = ctx.clone();
            let arg = arg.clone();
            self.spawner.spawn(async move {
                let _in_flight = in_flight;
                let _permit = permit;
                let completion = completion;
                completion.finish(delegate.call(ctx, arg).await);
            });
        }
        tracker.close();

        tokio::select! {
            biased;
            () = tracker.wait() => {}
            err = ctx.done() => {
                warn!(
                    pending = tracker.len(),
                    error = %err,
                    "context finished before batch, leaving stragglers running"
                );
                errors.lock().push(ExecError::Context(err));
            }
        }

        let recorded = std::mem::take(&mut *errors.lock());
        JoinedError::join(recorded)
    }
}

/// Sequential [`Executor`]: runs delegates one after another on the calling
/// task and stops at the first failure.
#[derive(Debug, Clone, Copy, Default)]
pub struct SyncExecutor;

#[async_trait]
impl<T> Executor<T> for SyncExecutor
where
    T: Clone + Send + 'static,
{
    async fn execute(&self, ctx: &Context, arg: T, delegate: &dyn Delegate<T>) -> DelegateResult {
        delegate.call(ctx.clone(), arg).await
    }

    async fn execute_all<I>(&self, ctx: &Context, arg: T, delegates: I) -> Result<(), JoinedError>
    where
        I: IntoIterator<Item = SharedDelegate<T>> + Send,
        I::IntoIter: Send,
    {
        for (index, delegate) in delegates.into_iter().enumerate() {
            if let Err(source) = delegate.call(ctx.clone(), arg.clone()).await {
                return Err(JoinedError::single(ExecError::Delegate { index, source }));
            }
        }
        Ok(())
    }
}
