//! Tests for configuration validation

use std::time::Duration;

use nolan::config::{ExecutorConfig, ProcConfig, SchedulerConfig};

#[test]
fn test_scheduler_config_builders() {
    let cfg = SchedulerConfig::new()
        .with_max_concurrent_workers(6)
        .with_worker_exec_timeout(Duration::from_millis(2500))
        .with_queue_capacity(16);
    assert_eq!(cfg.max_concurrent_workers, 6);
    assert_eq!(cfg.worker_exec_timeout_ms, 2500);
    assert_eq!(cfg.worker_exec_timeout(), Some(Duration::from_millis(2500)));
    assert_eq!(cfg.queue_capacity, 16);
    assert!(cfg.validate().is_ok());
}

#[test]
fn test_scheduler_config_invalid_queue_capacity() {
    let invalid = SchedulerConfig::new().with_queue_capacity(0);
    assert!(invalid.validate().is_err());
}

#[test]
fn test_scheduler_config_invalid_workers() {
    let invalid = SchedulerConfig::new().with_max_concurrent_workers(usize::MAX);
    assert!(invalid.validate().is_err());
}

#[test]
fn test_executor_config_invalid_concurrency() {
    assert!(ExecutorConfig::new().with_max_concurrency(0).validate().is_ok());
    assert!(ExecutorConfig::new()
        .with_max_concurrency(usize::MAX)
        .validate()
        .is_err());
}

#[test]
fn test_proc_config_from_json() {
    let cfg = ProcConfig::from_json_str(
        r#"{
            "executor": { "max_concurrency": 3 },
            "scheduler": { "max_concurrent_workers": 4, "worker_exec_timeout_ms": 0 }
        }"#,
    )
    .unwrap();
    assert_eq!(cfg.executor.max_concurrency, 3);
    assert_eq!(cfg.scheduler.max_concurrent_workers, 4);
    assert_eq!(cfg.scheduler.worker_exec_timeout(), None);
    // Omitted fields keep their defaults.
    assert_eq!(cfg.scheduler.queue_capacity, 1);
}

#[test]
fn test_proc_config_empty_json_is_default() {
    let cfg = ProcConfig::from_json_str("{}").unwrap();
    assert_eq!(cfg, ProcConfig::default());
}

#[test]
fn test_proc_config_rejects_invalid_section() {
    let err = ProcConfig::from_json_str(r#"{ "scheduler": { "queue_capacity": 0 } }"#).unwrap_err();
    assert!(err.starts_with("scheduler invalid:"), "{err}");

    let err = ProcConfig::from_json_str("not json").unwrap_err();
    assert!(err.starts_with("parse error:"), "{err}");
}
