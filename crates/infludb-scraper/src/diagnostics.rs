//! Failure screenshots.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::Utc;
use infludb_core::Platform;

use crate::render::{RenderRequest, Renderer};

/// Captures a full-page screenshot of a profile that could not be read.
///
/// Capturing is best effort: errors are logged and swallowed so a broken
/// screenshot never changes an extraction result.
#[derive(Clone)]
pub struct ScreenshotSink {
    renderer: Arc<dyn Renderer>,
    dir: Option<PathBuf>,
}

impl ScreenshotSink {
    #[must_use]
    pub fn new(renderer: Arc<dyn Renderer>, dir: impl Into<PathBuf>) -> Self {
        Self {
            renderer,
            dir: Some(dir.into()),
        }
    }

    /// A sink that never captures anything.
    #[must_use]
    pub fn disabled(renderer: Arc<dyn Renderer>) -> Self {
        Self {
            renderer,
            dir: None,
        }
    }

    /// Where a capture for `user` would be written.
    #[must_use]
    pub fn target_path(dir: &Path, platform: Platform, user: &str, reason: &str) -> PathBuf {
        let timestamp = Utc::now().format("%Y%m%dT%H%M%S");
        dir.join(format!("{}_failed", platform.as_str()))
            .join(format!("{}_{reason}_{timestamp}.png", sanitize(user)))
    }

    /// Screenshot `request.url` and write it under the configured directory.
    pub async fn capture(
        &self,
        platform: Platform,
        user: &str,
        reason: &str,
        request: &RenderRequest,
    ) {
        let Some(dir) = &self.dir else {
            return;
        };

        let bytes = match self.renderer.screenshot(request).await {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::warn!(url = %request.url, error = %e, "diagnostic screenshot failed");
                return;
            }
        };

        let path = Self::target_path(dir, platform, user, reason);
        if let Some(parent) = path.parent() {
            if let Err(e) = tokio::fs::create_dir_all(parent).await {
                tracing::warn!(
                    path = %parent.display(),
                    error = %e,
                    "cannot create screenshot dir"
                );
                return;
            }
        }
        match tokio::fs::write(&path, &bytes).await {
            Ok(()) => tracing::info!(path = %path.display(), "saved diagnostic screenshot"),
            Err(e) => tracing::warn!(path = %path.display(), error = %e, "cannot write screenshot"),
        }
    }
}

fn sanitize(user: &str) -> String {
    user.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect()
}
