//! Tests for builder modules

use std::time::Duration;

use nolan::builders::{build_executor, build_scheduler};
use nolan::config::{ProcConfig, SchedulerConfig};
use nolan::core::{delegate_fn, Context, SchedulerError};
use nolan::runtime::TokioSpawner;

fn proc_config() -> ProcConfig {
    let mut cfg = ProcConfig::default();
    cfg.executor.max_concurrency = 5;
    cfg.scheduler = SchedulerConfig::new()
        .with_max_concurrent_workers(3)
        .with_worker_exec_timeout(Duration::from_secs(1));
    cfg
}

#[test]
fn test_build_executor_uses_executor_section() {
    let executor = build_executor(&proc_config(), TokioSpawner::default()).unwrap();
    assert_eq!(executor.max_concurrency(), 5);
}

#[test]
fn test_build_scheduler_uses_scheduler_section() {
    let scheduler = build_scheduler(
        &proc_config(),
        delegate_fn(|_ctx: Context, _n: u32| async { Ok(()) }),
        TokioSpawner::default(),
        None,
    )
    .unwrap();
    assert_eq!(scheduler.stats().max_concurrent_workers, 3);
    assert_eq!(
        scheduler.config().worker_exec_timeout(),
        Some(Duration::from_secs(1))
    );
}

#[test]
fn test_build_scheduler_with_base_context() {
    let base = Context::background().with_cancel();
    let scheduler = build_scheduler(
        &proc_config(),
        delegate_fn(|_ctx: Context, _n: u32| async { Ok(()) }),
        TokioSpawner::default(),
        Some(base.clone()),
    )
    .unwrap();

    base.cancel();
    assert!(scheduler.base_context().is_done());
}

#[test]
fn test_builders_reject_invalid_config() {
    let mut cfg = proc_config();
    cfg.scheduler.queue_capacity = 0;

    assert!(matches!(
        build_executor(&cfg, TokioSpawner::default()),
        Err(SchedulerError::InvalidConfig(_))
    ));
    let result = build_scheduler(
        &cfg,
        delegate_fn(|_ctx: Context, _n: u32| async { Ok(()) }),
        TokioSpawner::default(),
        None,
    );
    assert!(matches!(result, Err(SchedulerError::InvalidConfig(msg)) if msg.contains("queue_capacity")));
}
