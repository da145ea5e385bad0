//! Tests for utility functions

use std::time::Duration;

use nolan::util::{default_concurrency, init_tracing, resolve_concurrency, DEFAULT_WORKER_EXEC_TIMEOUT};

#[test]
fn test_default_worker_exec_timeout() {
    assert_eq!(DEFAULT_WORKER_EXEC_TIMEOUT, Duration::from_secs(15));
}

#[test]
fn test_resolve_concurrency_keeps_explicit_values() {
    assert_eq!(resolve_concurrency(1), 1);
    assert_eq!(resolve_concurrency(64), 64);
    assert_eq!(resolve_concurrency(0), default_concurrency());
}

#[test]
fn test_init_tracing_is_idempotent() {
    init_tracing();
    assert!(!init_tracing());
    tracing::info!(component = "util_test", "tracing initialized");
}
