//! Core concurrency abstractions: context, delegates, gate, executors and
//! the task scheduler.

pub mod context;
pub mod delegate;
pub mod error;
pub mod executor;
pub mod gate;
pub mod scheduler;
pub mod spawn;

pub use context::Context;
pub use delegate::{delegate_fn, Delegate, DelegateResult, SharedDelegate};
pub use error::{AdmissionError, AppResult, ContextError, ExecError, JoinedError, SchedulerError};
pub use executor::{ConcurrentExecutor, Executor, SyncExecutor};
pub use gate::{Gate, GatePermit, Lock, MutexLock};
pub use scheduler::{BootableProcess, SchedulerState, SchedulerStats, TaskScheduler};
pub use spawn::Spawn;
