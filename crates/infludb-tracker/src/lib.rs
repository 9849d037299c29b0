//! Batch orchestration over the extractors, and the periodic scheduler
//! that drives it.

pub mod error;
pub mod report;
pub mod scheduler;
pub mod tracker;

pub use error::{SchedulerError, TrackerError};
pub use report::{AccountOutcome, BatchReport, ImportSummary};
pub use scheduler::{ScrapeScheduler, SchedulerState};
pub use tracker::{Tracker, DEFAULT_MAX_CONCURRENT};
