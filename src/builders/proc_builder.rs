//! Builders to construct executors and schedulers from a [`ProcConfig`].

use crate::config::ProcConfig;
use crate::core::{ConcurrentExecutor, Context, SchedulerError, SharedDelegate, Spawn, TaskScheduler};

/// Build a concurrent executor from the `executor` section of `cfg`.
///
/// # Errors
///
/// Returns `SchedulerError::InvalidConfig` if `cfg` fails validation.
pub fn build_executor<S>(cfg: &ProcConfig, spawner: S) -> Result<ConcurrentExecutor<S>, SchedulerError>
where
    S: Spawn,
{
    cfg.validate()
        .map_err(|e| SchedulerError::InvalidConfig(format!("config invalid: {e}")))?;
    Ok(ConcurrentExecutor::with_spawner(
        cfg.executor.max_concurrency,
        spawner,
    ))
}

/// Build a task scheduler from the `scheduler` section of `cfg`.
///
/// When `base_ctx` is given, every job context derives from it.
///
/// # Errors
///
/// Returns `SchedulerError::InvalidConfig` if `cfg` fails validation.
pub fn build_scheduler<T, S>(
    cfg: &ProcConfig,
    delegate: SharedDelegate<T>,
    spawner: S,
    base_ctx: Option<Context>,
) -> Result<TaskScheduler<T, S>, SchedulerError>
where
    T: Send + 'static,
    S: Spawn,
{
    cfg.validate()
        .map_err(|e| SchedulerError::InvalidConfig(format!("config invalid: {e}")))?;

    let scheduler = TaskScheduler::new_with_spawner(cfg.scheduler.clone(), delegate, spawner)?;
    Ok(match base_ctx {
        Some(ctx) => scheduler.with_base_context(ctx),
        None => scheduler,
    })
}
