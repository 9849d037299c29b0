//! X (Twitter) follower extraction from a rendered profile page.

use std::sync::Arc;

use async_trait::async_trait;
use infludb_core::Platform;

use crate::error::ExtractionError;
use crate::extractor::Extractor;
use crate::html::{body_text, first_parsable_count, scan_follower_phrase};
use crate::profile::twitter_handle;
use crate::render::{RenderRequest, Renderer};

pub const DEFAULT_TWITTER_PAGE_URL: &str = "https://x.com";

const PROFILE_HEADER_SELECTOR: &str =
    "div[data-testid='UserProfileHeader_Items'] a[href*='/followers'] span";
const FOLLOWERS_LINK_SELECTOR: &str = "a[href$='/followers'] span";

/// One rendered session per call, no state between calls.
pub struct TwitterExtractor {
    renderer: Arc<dyn Renderer>,
    page_base_url: String,
    settle_ms: u64,
    timeout_ms: u64,
}

impl TwitterExtractor {
    #[must_use]
    pub fn new(renderer: Arc<dyn Renderer>) -> Self {
        Self {
            renderer,
            page_base_url: DEFAULT_TWITTER_PAGE_URL.to_string(),
            settle_ms: 5_000,
            timeout_ms: 30_000,
        }
    }

    #[must_use]
    pub fn with_settle_ms(mut self, settle_ms: u64) -> Self {
        self.settle_ms = settle_ms;
        self
    }

    #[must_use]
    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }
}

#[async_trait]
impl Extractor for TwitterExtractor {
    fn platform(&self) -> Platform {
        Platform::Twitter
    }

    async fn extract(&self, profile_reference: &str) -> Result<u64, ExtractionError> {
        let Some(handle) = twitter_handle(profile_reference) else {
            return Err(ExtractionError::NotFound {
                reference: profile_reference.to_string(),
            });
        };
        let request = RenderRequest::new(format!("{}/{handle}", self.page_base_url))
            .settle_ms(self.settle_ms)
            .timeout_ms(self.timeout_ms);

        let page = self.renderer.render(&request).await?;
        follower_count_from_page(&page.html).ok_or_else(|| {
            ExtractionError::parse_failure(format!("no follower count on x profile of {handle}"))
        })
    }
}

/// Profile header, then any followers link, then a whole-page text scan.
pub(crate) fn follower_count_from_page(html: &str) -> Option<u64> {
    first_parsable_count(html, PROFILE_HEADER_SELECTOR)
        .or_else(|| first_parsable_count(html, FOLLOWERS_LINK_SELECTOR))
        .or_else(|| scan_follower_phrase(&body_text(html)))
}
