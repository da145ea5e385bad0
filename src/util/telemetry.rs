//! Structured logging setup.
//!
//! Scheduler and executor events are emitted under the `nolan` target with
//! `scheduler` and `job_id` fields, so `RUST_LOG=nolan=debug` shows per-job
//! dispatch and completion.

use tracing_subscriber::EnvFilter;

/// Filter used when `RUST_LOG` is unset or unparsable.
pub const DEFAULT_LOG_DIRECTIVE: &str = "nolan=info";

/// Install a fmt subscriber unless the application already set one.
///
/// Returns `true` if this call installed the subscriber.
pub fn init_tracing() -> bool {
    if tracing::dispatcher::has_been_set() {
        return false;
    }
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_DIRECTIVE));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init()
        .is_ok()
}
