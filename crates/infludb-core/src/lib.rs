pub mod accounts;
pub mod app_config;
pub mod classify;
pub mod config;
pub mod import;
pub mod number;

pub use accounts::{Category, Platform, TrackedAccount};
pub use app_config::{AppConfig, Environment, OverlapPolicy};
pub use classify::{classify, MACRO_THRESHOLD};
pub use config::{load_app_config, load_app_config_from_env};
pub use import::{load_import_file, resolve_import_rows, ImportFile, ImportPlan, ImportRow};
pub use number::{parse_number, ParseError};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("failed to read import file {path}: {source}")]
    ImportFileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse import file: {0}")]
    ImportFileParse(#[source] serde_yaml::Error),
}
