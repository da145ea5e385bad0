//! Error types for gate admission, execution and scheduler lifecycle.

use std::fmt;

use thiserror::Error;

/// Reason a [`Context`](crate::core::Context) is done.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
pub enum ContextError {
    /// The context (or one of its ancestors) was cancelled.
    #[error("context canceled")]
    Cancelled,
    /// The context deadline passed.
    #[error("context deadline exceeded")]
    DeadlineExceeded,
}

/// Errors produced when acquiring a slot from a [`Gate`](crate::core::Gate)
/// or a [`Lock`](crate::core::Lock).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AdmissionError {
    /// The context finished before a slot was free.
    #[error("admission aborted: {0}")]
    Aborted(#[from] ContextError),
    /// The underlying semaphore was closed.
    #[error("gate closed")]
    Closed,
}

impl AdmissionError {
    /// The context error behind this failure, if any.
    #[must_use]
    pub const fn context_error(&self) -> Option<ContextError> {
        match self {
            Self::Aborted(err) => Some(*err),
            Self::Closed => None,
        }
    }
}

/// A single failure recorded while executing a batch of delegates.
#[derive(Debug, Error)]
pub enum ExecError {
    /// The delegate at `index` could not acquire a gate slot.
    #[error("delegate {index} not admitted: {source}")]
    Admission {
        /// Position of the delegate in the batch.
        index: usize,
        /// Why admission failed.
        #[source]
        source: AdmissionError,
    },
    /// The caller's context finished before the batch did.
    #[error("execution interrupted: {0}")]
    Context(#[from] ContextError),
    /// The delegate at `index` returned an error.
    #[error("delegate {index} failed: {source}")]
    Delegate {
        /// Position of the delegate in the batch.
        index: usize,
        /// Error returned by the delegate.
        #[source]
        source: anyhow::Error,
    },
    /// The delegate at `index` was dropped before it returned (it panicked
    /// or its runtime shut down).
    #[error("delegate {index} aborted before completion")]
    Aborted {
        /// Position of the delegate in the batch.
        index: usize,
    },
}

impl ExecError {
    /// The context error behind this failure, if any.
    #[must_use]
    pub const fn context_error(&self) -> Option<ContextError> {
        match self {
            Self::Admission { source, .. } => source.context_error(),
            Self::Context(err) => Some(*err),
            Self::Delegate { .. } | Self::Aborted { .. } => None,
        }
    }
}

/// Aggregate of every [`ExecError`] recorded during one batch, in the order
/// they were discovered. Never empty.
#[derive(Debug)]
pub struct JoinedError {
    errors: Vec<ExecError>,
}

impl JoinedError {
    /// Join recorded errors; an empty list means success.
    ///
    /// # Errors
    ///
    /// Returns the joined error when `errors` is non-empty.
    pub fn join(errors: Vec<ExecError>) -> Result<(), Self> {
        if errors.is_empty() {
            Ok(())
        } else {
            Err(Self { errors })
        }
    }

    /// Wrap a single error.
    #[must_use]
    pub fn single(error: ExecError) -> Self {
        Self {
            errors: vec![error],
        }
    }

    /// The underlying errors.
    #[must_use]
    pub fn errors(&self) -> &[ExecError] {
        &self.errors
    }

    /// Iterate over the underlying errors.
    pub fn iter(&self) -> std::slice::Iter<'_, ExecError> {
        self.errors.iter()
    }

    /// Number of underlying errors.
    #[must_use]
    pub fn len(&self) -> usize {
        self.errors.len()
    }

    /// Always `false`; a joined error holds at least one cause.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Consume into the underlying errors.
    #[must_use]
    pub fn into_errors(self) -> Vec<ExecError> {
        self.errors
    }

    /// First delegate error of type `E`.
    #[must_use]
    pub fn find<E>(&self) -> Option<&E>
    where
        E: fmt::Display + fmt::Debug + Send + Sync + 'static,
    {
        self.errors.iter().find_map(|err| match err {
            ExecError::Delegate { source, .. } => source.downcast_ref::<E>(),
            _ => None,
        })
    }

    /// Whether any delegate failed with an error of type `E`.
    #[must_use]
    pub fn contains<E>(&self) -> bool
    where
        E: fmt::Display + fmt::Debug + Send + Sync + 'static,
    {
        self.find::<E>().is_some()
    }

    /// First cancellation or deadline error recorded, if any.
    #[must_use]
    pub fn context_error(&self) -> Option<ContextError> {
        self.errors.iter().find_map(ExecError::context_error)
    }
}

impl fmt::Display for JoinedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, err) in self.errors.iter().enumerate() {
            if i > 0 {
                f.write_str("\n")?;
            }
            write!(f, "{err}")?;
        }
        Ok(())
    }
}

impl std::error::Error for JoinedError {}

impl IntoIterator for JoinedError {
    type Item = ExecError;
    type IntoIter = std::vec::IntoIter<ExecError>;

    fn into_iter(self) -> Self::IntoIter {
        self.errors.into_iter()
    }
}

impl<'a> IntoIterator for &'a JoinedError {
    type Item = &'a ExecError;
    type IntoIter = std::slice::Iter<'a, ExecError>;

    fn into_iter(self) -> Self::IntoIter {
        self.errors.iter()
    }
}

/// Errors produced by the task scheduler.
#[derive(Debug, Error)]
pub enum SchedulerError {
    /// Shutdown already began; no more submissions or stops are accepted.
    #[error("task scheduler already terminated")]
    AlreadyTerminated,
    /// The dispatch loop was already started.
    #[error("task scheduler already started")]
    AlreadyStarted,
    /// The job queue closed before the submission could be delivered.
    #[error("job queue closed")]
    QueueClosed,
    /// The dispatch loop could not acquire a worker slot.
    #[error("dispatch aborted: {0}")]
    Admission(#[from] AdmissionError),
    /// The caller stopped waiting for the drain.
    #[error("stop interrupted: {0}")]
    Context(#[from] ContextError),
    /// The drain task was dropped before it finished.
    #[error("drain task dropped before completion")]
    DrainInterrupted,
    /// Configuration validation failed.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Application-facing result using anyhow for higher-level contexts.
pub type AppResult<T> = Result<T, anyhow::Error>;
