//! Executor and scheduler configuration structures.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::sync::Semaphore;

use crate::util::{default_concurrency, resolve_concurrency, DEFAULT_WORKER_EXEC_TIMEOUT};

/// Concurrent executor configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExecutorConfig {
    /// Maximum delegates running at once; `0` means twice the available processors.
    pub max_concurrency: usize,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            max_concurrency: default_concurrency(),
        }
    }
}

impl ExecutorConfig {
    /// Create a configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the concurrency ceiling.
    #[must_use]
    pub const fn with_max_concurrency(mut self, max_concurrency: usize) -> Self {
        self.max_concurrency = max_concurrency;
        self
    }

    /// Concurrency ceiling after applying the default.
    #[must_use]
    pub fn resolved_max_concurrency(&self) -> usize {
        resolve_concurrency(self.max_concurrency)
    }

    /// Validate configuration values.
    ///
    /// # Errors
    ///
    /// Returns a description of the first invalid value.
    pub fn validate(&self) -> Result<(), String> {
        if self.max_concurrency > Semaphore::MAX_PERMITS {
            return Err(format!(
                "max_concurrency must not exceed {}",
                Semaphore::MAX_PERMITS
            ));
        }
        Ok(())
    }
}

/// Task scheduler configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    /// Maximum jobs running at once; `0` means twice the available processors.
    pub max_concurrent_workers: usize,
    /// Per-job timeout in milliseconds; `0` disables the timeout.
    pub worker_exec_timeout_ms: u64,
    /// Job queue slots between submitters and the dispatch loop.
    pub queue_capacity: usize,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            max_concurrent_workers: default_concurrency(),
            worker_exec_timeout_ms: u64::try_from(DEFAULT_WORKER_EXEC_TIMEOUT.as_millis())
                .unwrap_or(u64::MAX),
            queue_capacity: 1,
        }
    }
}

impl SchedulerConfig {
    /// Create a configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the worker concurrency ceiling.
    #[must_use]
    pub const fn with_max_concurrent_workers(mut self, workers: usize) -> Self {
        self.max_concurrent_workers = workers;
        self
    }

    /// Set the per-job timeout.
    #[must_use]
    pub fn with_worker_exec_timeout(mut self, timeout: Duration) -> Self {
        self.worker_exec_timeout_ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX);
        self
    }

    /// Run jobs under the base context with no deadline.
    #[must_use]
    pub const fn without_worker_exec_timeout(mut self) -> Self {
        self.worker_exec_timeout_ms = 0;
        self
    }

    /// Set the job queue capacity.
    #[must_use]
    pub const fn with_queue_capacity(mut self, capacity: usize) -> Self {
        self.queue_capacity = capacity;
        self
    }

    /// Worker concurrency ceiling after applying the default.
    #[must_use]
    pub fn resolved_max_concurrent_workers(&self) -> usize {
        resolve_concurrency(self.max_concurrent_workers)
    }

    /// Per-job timeout, or `None` when disabled.
    #[must_use]
    pub const fn worker_exec_timeout(&self) -> Option<Duration> {
        if self.worker_exec_timeout_ms == 0 {
            None
        } else {
            Some(Duration::from_millis(self.worker_exec_timeout_ms))
        }
    }

    /// Validate configuration values.
    ///
    /// # Errors
    ///
    /// Returns a description of the first invalid value.
    pub fn validate(&self) -> Result<(), String> {
        if self.queue_capacity == 0 {
            return Err("queue_capacity must be greater than 0".into());
        }
        if self.queue_capacity > Semaphore::MAX_PERMITS {
            return Err(format!(
                "queue_capacity must not exceed {}",
                Semaphore::MAX_PERMITS
            ));
        }
        if self.max_concurrent_workers > Semaphore::MAX_PERMITS {
            return Err(format!(
                "max_concurrent_workers must not exceed {}",
                Semaphore::MAX_PERMITS
            ));
        }
        Ok(())
    }
}

/// Root configuration for the executor and the scheduler.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProcConfig {
    /// Concurrent executor settings.
    pub executor: ExecutorConfig,
    /// Task scheduler settings.
    pub scheduler: SchedulerConfig,
}

impl ProcConfig {
    /// Validate both sections.
    ///
    /// # Errors
    ///
    /// Returns a description of the first invalid value, prefixed with its section.
    pub fn validate(&self) -> Result<(), String> {
        self.executor
            .validate()
            .map_err(|e| format!("executor invalid: {e}"))?;
        self.scheduler
            .validate()
            .map_err(|e| format!("scheduler invalid: {e}"))?;
        Ok(())
    }

    /// Parse configuration from a JSON string and validate.
    ///
    /// # Errors
    ///
    /// Returns a parse or validation message.
    pub fn from_json_str(input: &str) -> Result<Self, String> {
        let cfg: Self = serde_json::from_str(input).map_err(|e| format!("parse error: {e}"))?;
        cfg.validate()?;
        Ok(cfg)
    }
}
