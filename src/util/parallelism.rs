//! Concurrency defaults derived from the host.

use std::time::Duration;

/// Default per-job execution timeout for the task scheduler.
pub const DEFAULT_WORKER_EXEC_TIMEOUT: Duration = Duration::from_secs(15);

/// Default number of concurrent admissions: twice the available processors.
#[must_use]
pub fn default_concurrency() -> usize {
    num_cpus::get().saturating_mul(2).max(1)
}

/// Resolve a requested concurrency, falling back to [`default_concurrency`]
/// when it is unset (zero).
#[must_use]
pub fn resolve_concurrency(requested: usize) -> usize {
    if requested == 0 {
        default_concurrency()
    } else {
        requested
    }
}
