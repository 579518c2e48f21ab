//! Task scheduling: bounded worker pool, per-task execution and progress reporting.

pub mod pool;
pub mod progress;
pub mod scheduler;
pub mod summary;

pub use pool::{PoolError, WorkerPool};
pub use progress::{DownloadProgress, LogProgress, NoopProgress};
pub use scheduler::{CancelToken, ScheduleOptions, Scheduler};
pub use summary::{RunSummary, TaskError, TaskFailure, TaskOutcome, TaskResult};
