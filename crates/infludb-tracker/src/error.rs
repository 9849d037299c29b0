use infludb_core::Platform;
use infludb_db::DbError;
use thiserror::Error;
use tokio_cron_scheduler::JobSchedulerError;

/// Errors reported synchronously to the caller.
///
/// Extraction failures are not here: they are recorded on the account as
/// `failed` and never abort an operation.
#[derive(Debug, Error)]
pub enum TrackerError {
    #[error("missing required field: {0}")]
    MissingField(&'static str),

    #[error("unsupported platform: {0}")]
    UnsupportedPlatform(String),

    #[error("link {link} looks like {inferred}, not {declared}")]
    PlatformMismatch {
        link: String,
        declared: Platform,
        inferred: Platform,
    },

    #[error(transparent)]
    Store(#[from] DbError),
}

#[derive(Debug, Error)]
pub enum SchedulerError {
    #[error(transparent)]
    Engine(#[from] JobSchedulerError),
}
