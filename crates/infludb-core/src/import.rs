//! Import rows of `(name, link[, platform])` into tracked accounts.

use std::path::Path;

use serde::Deserialize;

use crate::accounts::{Category, Platform, TrackedAccount};
use crate::ConfigError;

/// One row of an import file. Every column is optional at parse time so
/// that malformed rows can be dropped individually instead of failing the
/// whole file.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ImportRow {
    pub name: Option<String>,
    pub link: Option<String>,
    pub platform: Option<String>,
}

impl ImportRow {
    #[must_use]
    pub fn new(name: &str, link: &str, platform: Option<&str>) -> Self {
        Self {
            name: Some(name.to_string()),
            link: Some(link.to_string()),
            platform: platform.map(str::to_string),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ImportFile {
    pub accounts: Vec<ImportRow>,
}

/// Outcome of resolving import rows, before anything is persisted.
#[derive(Debug, Default)]
pub struct ImportPlan {
    /// Rows with a supported platform, staged as `pending`.
    pub queued: Vec<TrackedAccount>,
    /// Rows whose platform could not be resolved, staged as `failed_platform`.
    pub unsupported: Vec<TrackedAccount>,
    /// Rows missing a name or link. These produce no record.
    pub dropped: usize,
}

/// Resolve raw import rows into accounts.
///
/// A row's own platform column wins when it names a supported platform;
/// otherwise the platform is inferred from the link. Rows that resolve to
/// neither are kept as `unknown` / `failed_platform`.
#[must_use]
pub fn resolve_import_rows(rows: Vec<ImportRow>) -> ImportPlan {
    let mut plan = ImportPlan::default();

    for row in rows {
        let name = row.name.as_deref().map(str::trim).unwrap_or_default();
        let link = row.link.as_deref().map(str::trim).unwrap_or_default();
        if name.is_empty() || link.is_empty() {
            plan.dropped += 1;
            continue;
        }

        let declared = row
            .platform
            .as_deref()
            .map_or(Platform::Unknown, Platform::from_tag);
        let platform = if declared.is_supported() {
            declared
        } else {
            Platform::infer_from_link(link)
        };

        if platform.is_supported() {
            plan.queued.push(TrackedAccount::pending(name, link, platform));
        } else {
            let mut account = TrackedAccount::pending(name, link, Platform::Unknown);
            account.category = Category::FailedPlatform;
            plan.unsupported.push(account);
        }
    }

    plan
}

/// Load import rows from a YAML file of the form `accounts: [{name, link, platform}]`.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read or parsed.
pub fn load_import_file(path: &Path) -> Result<ImportFile, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ImportFileIo {
        path: path.display().to_string(),
        source: e,
    })?;

    serde_yaml::from_str(&content).map_err(ConfigError::ImportFileParse)
}
