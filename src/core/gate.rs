//! Bounded concurrency gate and lock abstractions.
//!
//! A [`Gate`] admits at most `capacity` holders at a time. Admission is
//! scoped: the returned [`GatePermit`] gives its slot back when dropped, so a
//! slot is released exactly once on every exit path, panics included.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{Mutex, OwnedMutexGuard, OwnedSemaphorePermit, Semaphore, TryAcquireError};

use super::{AdmissionError, Context};
use crate::util::resolve_concurrency;

/// Counting admission primitive.
///
/// Clones share the same slots.
#[derive(Debug, Clone)]
pub struct Gate {
    capacity: usize,
    semaphore: Arc<Semaphore>,
}

impl Gate {
    /// Create a gate admitting `capacity` concurrent holders.
    ///
    /// A capacity of `0` resolves to [`default_concurrency`](crate::util::default_concurrency).
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let capacity = resolve_concurrency(capacity).min(Semaphore::MAX_PERMITS);
        Self {
            capacity,
            semaphore: Arc::new(Semaphore::new(capacity)),
        }
    }

    /// Create a gate sized to twice the available processors.
    #[must_use]
    pub fn with_default_capacity() -> Self {
        Self::new(0)
    }

    /// Maximum concurrent holders.
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Free slots right now.
    #[must_use]
    pub fn available(&self) -> usize {
        self.semaphore.available_permits()
    }

    /// Slots currently held.
    #[must_use]
    pub fn admitted(&self) -> usize {
        self.capacity.saturating_sub(self.available())
    }

    /// Wait for a free slot.
    ///
    /// # Errors
    ///
    /// Returns [`AdmissionError::Aborted`] if `ctx` is already done or
    /// finishes first. The caller must not run the guarded work in that case.
    pub async fn acquire(&self, ctx: &Context) -> Result<GatePermit, AdmissionError> {
        if let Some(err) = ctx.err() {
            return Err(AdmissionError::Aborted(err));
        }
        tokio::select! {
            biased;
            permit = Arc::clone(&self.semaphore).acquire_owned() => permit
                .map(|permit| GatePermit { permit })
                .map_err(|_| AdmissionError::Closed),
            err = ctx.done() => Err(AdmissionError::Aborted(err)),
        }
    }

    /// Take a slot only if one is free right now.
    #[must_use]
    pub fn try_acquire(&self) -> Option<GatePermit> {
        match Arc::clone(&self.semaphore).try_acquire_owned() {
            Ok(permit) => Some(GatePermit { permit }),
            Err(TryAcquireError::NoPermits | TryAcquireError::Closed) => None,
        }
    }
}

impl Default for Gate {
    fn default() -> Self {
        Self::with_default_capacity()
    }
}

/// One admitted slot of a [`Gate`]. Dropping it releases the slot.
#[derive(Debug)]
#[must_use = "dropping the permit releases the slot immediately"]
pub struct GatePermit {
    permit: OwnedSemaphorePermit,
}

impl GatePermit {
    /// Release the slot now.
    pub fn release(self) {
        drop(self.permit);
    }
}

/// Context-aware exclusive or shared lock.
///
/// Unlocking is dropping the guard.
#[async_trait]
pub trait Lock: Send + Sync {
    /// Held-lock guard.
    type Guard: Send;

    /// Wait for the lock or for `ctx` to finish.
    async fn lock(&self, ctx: &Context) -> Result<Self::Guard, AdmissionError>;

    /// Take the lock only if it is free right now.
    fn try_lock(&self) -> Option<Self::Guard>;
}

#[async_trait]
impl Lock for Gate {
    type Guard = GatePermit;

    async fn lock(&self, ctx: &Context) -> Result<GatePermit, AdmissionError> {
        self.acquire(ctx).await
    }

    fn try_lock(&self) -> Option<GatePermit> {
        self.try_acquire()
    }
}

/// Single-holder [`Lock`].
#[derive(Debug, Clone, Default)]
pub struct MutexLock {
    inner: Arc<Mutex<()>>,
}

impl MutexLock {
    /// Create an unlocked mutex.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Lock for MutexLock {
    type Guard = OwnedMutexGuard<()>;

    async fn lock(&self, ctx: &Context) -> Result<OwnedMutexGuard<()>, AdmissionError> {
        if let Some(err) = ctx.err() {
            return Err(AdmissionError::Aborted(err));
        }
        tokio::select! {
            biased;
            guard = Arc::clone(&self.inner).lock_owned() => Ok(guard),
            err = ctx.done() => Err(AdmissionError::Aborted(err)),
        }
    }

    fn try_lock(&self) -> Option<OwnedMutexGuard<()>> {
        Arc::clone(&self.inner).try_lock_owned().ok()
    }
}
