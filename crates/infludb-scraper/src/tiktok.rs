//! TikTok follower extraction from a rendered profile page.

use std::sync::Arc;

use async_trait::async_trait;
use infludb_core::{parse_number, Platform};
use serde_json::Value;

use crate::attempts::run_attempts;
use crate::diagnostics::ScreenshotSink;
use crate::error::ExtractionError;
use crate::extractor::Extractor;
use crate::html::{body_text, first_parsable_count, scan_follower_phrase, script_by_id};
use crate::profile::tiktok_username;
use crate::render::{RenderRequest, Renderer};

pub const DEFAULT_TIKTOK_PAGE_URL: &str = "https://www.tiktok.com";

const MAX_ATTEMPTS: u32 = 3;

const LABELED_COUNT_SELECTORS: [&str; 2] = [
    "strong[title='Followers']",
    "strong[data-e2e='followers-count']",
];

pub struct TikTokExtractor {
    renderer: Arc<dyn Renderer>,
    screenshots: ScreenshotSink,
    page_base_url: String,
    settle_ms: u64,
    retry_delay_ms: u64,
    timeout_ms: u64,
}

impl TikTokExtractor {
    #[must_use]
    pub fn new(renderer: Arc<dyn Renderer>, screenshots: ScreenshotSink) -> Self {
        Self {
            renderer,
            screenshots,
            page_base_url: DEFAULT_TIKTOK_PAGE_URL.to_string(),
            settle_ms: 2_000,
            retry_delay_ms: 1_000,
            timeout_ms: 30_000,
        }
    }

    /// Settle time and pause between attempts, in milliseconds.
    #[must_use]
    pub fn with_timing(mut self, settle_ms: u64, retry_delay_ms: u64) -> Self {
        self.settle_ms = settle_ms;
        self.retry_delay_ms = retry_delay_ms;
        self
    }

    #[must_use]
    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }
}

#[async_trait]
impl Extractor for TikTokExtractor {
    fn platform(&self) -> Platform {
        Platform::TikTok
    }

    async fn extract(&self, profile_reference: &str) -> Result<u64, ExtractionError> {
        let Some(username) = tiktok_username(profile_reference) else {
            return Err(ExtractionError::NotFound {
                reference: profile_reference.to_string(),
            });
        };
        let request = RenderRequest::new(format!("{}/@{username}", self.page_base_url))
            .settle_ms(self.settle_ms)
            .scroll_to_bottom(true)
            .timeout_ms(self.timeout_ms);

        let result = run_attempts(
            MAX_ATTEMPTS,
            self.retry_delay_ms,
            ExtractionError::is_transient_load_failure,
            |attempt| {
                let request = &request;
                let username = username.as_str();
                async move {
                    tracing::debug!(username, attempt, "rendering tiktok profile");
                    let page = self.renderer.render(request).await?;
                    follower_count_from_page(&page.html, username).ok_or_else(|| {
                        ExtractionError::parse_failure(format!(
                            "no follower count on tiktok profile of {username}"
                        ))
                    })
                }
            },
        )
        .await;

        if let Err(e) = &result {
            self.screenshots
                .capture(Platform::TikTok, &username, e.kind().as_str(), &request)
                .await;
        }
        result
    }
}

/// Structured state first, then labeled elements, then a text scan.
pub(crate) fn follower_count_from_page(html: &str, username: &str) -> Option<u64> {
    if let Some(count) = from_structured_state(html, username) {
        return Some(count);
    }
    tracing::debug!(username, "no structured state; falling back to visible text");
    LABELED_COUNT_SELECTORS
        .iter()
        .find_map(|css| first_parsable_count(html, css))
        .or_else(|| scan_follower_phrase(&body_text(html)))
}

const REHYDRATION_FOLLOWER_COUNT: &str =
    "/__DEFAULT_SCOPE__/webapp.user-detail/userInfo/stats/followerCount";

fn from_structured_state(html: &str, username: &str) -> Option<u64> {
    if let Some(raw) = script_by_id(html, "SIGI_STATE") {
        match serde_json::from_str::<Value>(&raw) {
            Ok(state) => {
                if let Some(count) = from_sigi_state(&state, username) {
                    return Some(count);
                }
            }
            Err(e) => tracing::debug!(error = %e, "SIGI_STATE is not valid json"),
        }
    }

    let raw = script_by_id(html, "__UNIVERSAL_DATA_FOR_REHYDRATION__")?;
    let state: Value = match serde_json::from_str(&raw) {
        Ok(state) => state,
        Err(e) => {
            tracing::debug!(error = %e, "rehydration data is not valid json");
            return None;
        }
    };
    count_value(state.pointer(REHYDRATION_FOLLOWER_COUNT)?)
}

/// `UserModule.users`: exact `uniqueId`/`nickname` match, else the first
/// entry that carries a follower count.
fn from_sigi_state(state: &Value, username: &str) -> Option<u64> {
    let users = state.get("UserModule")?.get("users")?.as_object()?;
    let exact = users.values().find(|user| {
        ["uniqueId", "nickname"]
            .iter()
            .any(|key| user[*key].as_str() == Some(username))
    });
    if let Some(count) = exact.and_then(user_follower_count) {
        return Some(count);
    }
    tracing::debug!(username, "no exact user match in SIGI_STATE; using first entry");
    users.values().find_map(user_follower_count)
}

fn user_follower_count(user: &Value) -> Option<u64> {
    let stats = user.get("stats")?;
    stats.get("followerCount").and_then(count_value)
}

fn count_value(value: &Value) -> Option<u64> {
    value
        .as_u64()
        .or_else(|| value.as_str().and_then(|s| parse_number(s).ok()))
}
