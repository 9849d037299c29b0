//! Instagram follower extraction.
//!
//! The extractor tries the lightweight web-profile API first and falls back
//! to a rendered page. A rate-limit answer from the API puts the API into
//! cooldown: until the cooldown elapses every call goes straight to the
//! rendered fallback, and the first call after it elapses builds a brand new
//! API client through the [`LookupFactory`].

mod api;
mod page;

use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use infludb_core::Platform;

pub use api::{InstagramApi, ProfileLookup, DEFAULT_INSTAGRAM_BASE_URL};

use crate::attempts::run_attempts;
use crate::clock::{Clock, SystemClock};
use crate::diagnostics::ScreenshotSink;
use crate::error::ExtractionError;
use crate::extractor::Extractor;
use crate::profile::instagram_username;
use crate::render::{RenderRequest, Renderer};

pub const DEFAULT_INSTAGRAM_PAGE_URL: &str = "https://www.instagram.com";

/// Rendered-page attempts per call.
const BROWSER_ATTEMPTS: u32 = 2;

/// One year.
const MAX_COOLDOWN_MINS: u64 = 525_600;

/// Builds a fresh primary lookup, e.g. after a cooldown.
pub type LookupFactory =
    Arc<dyn Fn() -> Result<Arc<dyn ProfileLookup>, ExtractionError> + Send + Sync>;

enum PrimaryState {
    Active(Arc<dyn ProfileLookup>),
    Cooldown { until: DateTime<Utc> },
}

pub struct InstagramExtractor {
    state: Mutex<PrimaryState>,
    factory: LookupFactory,
    renderer: Arc<dyn Renderer>,
    screenshots: ScreenshotSink,
    clock: Arc<dyn Clock>,
    cooldown: chrono::Duration,
    page_base_url: String,
    settle_ms: u64,
    retry_delay_ms: u64,
    timeout_ms: u64,
}

impl InstagramExtractor {
    /// Creates the extractor with an initial primary lookup from `factory`.
    ///
    /// # Errors
    ///
    /// Returns whatever `factory` returns when it fails.
    pub fn new(
        factory: LookupFactory,
        renderer: Arc<dyn Renderer>,
        screenshots: ScreenshotSink,
    ) -> Result<Self, ExtractionError> {
        let primary = factory()?;
        Ok(Self {
            state: Mutex::new(PrimaryState::Active(primary)),
            factory,
            renderer,
            screenshots,
            clock: Arc::new(SystemClock),
            cooldown: chrono::Duration::minutes(30),
            page_base_url: DEFAULT_INSTAGRAM_PAGE_URL.to_string(),
            settle_ms: 3_000,
            retry_delay_ms: 2_000,
            timeout_ms: 30_000,
        })
    }

    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    #[must_use]
    pub fn with_cooldown_mins(mut self, mins: u64) -> Self {
        let mins = i64::try_from(mins.min(MAX_COOLDOWN_MINS)).unwrap_or(0);
        self.cooldown = chrono::Duration::minutes(mins);
        self
    }

    /// Settle time and pause between rendered attempts, in milliseconds.
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

    /// End of the current cooldown window, if any.
    #[must_use]
    pub fn cooldown_until(&self) -> Option<DateTime<Utc>> {
        match &*self.lock_state() {
            PrimaryState::Active(_) => None,
            PrimaryState::Cooldown { until } => Some(*until),
        }
    }

    fn lock_state(&self) -> MutexGuard<'_, PrimaryState> {
        self.state
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    /// The primary lookup to use for this call, or `None` while cooling down.
    fn primary(&self) -> Option<Arc<dyn ProfileLookup>> {
        let mut state = self.lock_state();
        let until = match &*state {
            PrimaryState::Active(lookup) => return Some(Arc::clone(lookup)),
            PrimaryState::Cooldown { until } => *until,
        };

        let now = self.clock.now();
        if now < until {
            tracing::debug!(
                remaining_secs = (until - now).num_seconds(),
                "instagram api cooling down; skipping"
            );
            return None;
        }
        match (self.factory)() {
            Ok(fresh) => {
                tracing::info!("instagram api cooldown elapsed; using a fresh client");
                *state = PrimaryState::Active(Arc::clone(&fresh));
                Some(fresh)
            }
            Err(e) => {
                tracing::warn!(error = %e, "could not rebuild instagram api client");
                None
            }
        }
    }

    fn enter_cooldown(&self) {
        let until = self.clock.now() + self.cooldown;
        *self.lock_state() = PrimaryState::Cooldown { until };
        tracing::warn!(%until, "instagram api rate limited; cooling down");
    }

    async fn extract_rendered(&self, username: &str) -> Result<u64, ExtractionError> {
        let request = RenderRequest::new(format!("{}/{username}/", self.page_base_url))
            .settle_ms(self.settle_ms)
            .timeout_ms(self.timeout_ms);

        let result = run_attempts(
            BROWSER_ATTEMPTS,
            self.retry_delay_ms,
            |_| true,
            |attempt| {
                let request = &request;
                async move {
                    tracing::debug!(username, attempt, "rendering instagram profile");
                    let page = self.renderer.render(request).await?;
                    if page::is_login_redirect(&page.final_url) {
                        return Err(ExtractionError::Navigation {
                            url: page.final_url,
                            detail: "redirected to login".to_string(),
                        });
                    }
                    page::from_meta_description(&page.html)
                        .or_else(|| page::from_dom_text(&page.html))
                        .ok_or_else(|| {
                            ExtractionError::parse_failure(format!(
                                "no follower count on rendered profile of {username}"
                            ))
                        })
                }
            },
        )
        .await;

        if let Err(e) = &result {
            self.screenshots
                .capture(Platform::Instagram, username, e.kind().as_str(), &request)
                .await;
        }
        result
    }
}

#[async_trait]
impl Extractor for InstagramExtractor {
    fn platform(&self) -> Platform {
        Platform::Instagram
    }

    async fn extract(&self, profile_reference: &str) -> Result<u64, ExtractionError> {
        let Some(username) = instagram_username(profile_reference) else {
            return Err(ExtractionError::NotFound {
                reference: profile_reference.to_string(),
            });
        };

        if let Some(lookup) = self.primary() {
            match lookup.follower_count(&username).await {
                Ok(count) => return Ok(count),
                Err(e @ ExtractionError::RateLimited { .. }) => {
                    tracing::warn!(%username, error = %e, "instagram api rate limited");
                    self.enter_cooldown();
                }
                Err(e) => {
                    tracing::info!(
                        %username,
                        error = %e,
                        "instagram api failed; trying rendered page"
                    );
                }
            }
        }

        self.extract_rendered(&username).await
    }
}

#[cfg(test)]
#[path = "../instagram_test.rs"]
mod tests;
