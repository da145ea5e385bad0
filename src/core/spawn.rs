//! Runtime abstraction for launching concurrent units of work.

use std::future::Future;

/// Abstraction for spawning task execution on a runtime.
///
/// Spawned futures are detached: the executor and scheduler track completion
/// themselves and never abort what they spawn.
pub trait Spawn: Send + Sync {
    /// Spawn an async task that returns a future.
    fn spawn<F>(&self, fut: F)
    where
        F: Future<Output = ()> + Send + 'static;
}
