//! Service layer: business logic independent of any storage backend.
//!
//! Services take repository trait bounds, never concrete backends, so the
//! same code path runs against Firestore in production and the in-memory
//! repository in tests.

pub mod drivers;
pub mod import;
pub mod import_processor;
pub mod job_tracker;
pub mod statistics;

pub use import::{import_transport_log, parse_transport_log, ImportError, ImportSummary, RowError};
pub use import_processor::process_import_async;
pub use job_tracker::{Job, JobStatus, JobTracker, LogEntry, LogLevel};
pub use statistics::{
    compute_statistics, compute_statistics_with_options, enumerate_probe_months, StatisticsError,
    StatisticsOptions, MANAGEMENT_FEE_RATE,
};
