//! Per-platform follower-count extraction.
//!
//! Each [`Extractor`] turns a profile reference into a follower count by
//! walking its own fallback chain. Rendered pages come from a [`Renderer`]
//! (Browserless in production); every render is its own browser session.

pub(crate) mod attempts;
pub mod clock;
pub mod diagnostics;
pub mod error;
pub mod extractor;
pub mod html;
pub mod instagram;
pub mod profile;
pub mod render;
pub mod tiktok;
pub mod twitter;

use std::sync::Arc;

use infludb_core::AppConfig;

pub use clock::{Clock, SystemClock};
pub use diagnostics::ScreenshotSink;
pub use error::{ExtractionError, ExtractionErrorKind};
pub use extractor::{Dispatch, Extractor, Extractors};
pub use instagram::{InstagramApi, InstagramExtractor, LookupFactory, ProfileLookup};
pub use render::{BrowserlessRenderer, RenderRequest, RenderedPage, Renderer};
pub use tiktok::TikTokExtractor;
pub use twitter::TwitterExtractor;

/// Builds the production extractor set from configuration.
///
/// # Errors
///
/// Returns [`ExtractionError::Navigation`] if an HTTP client cannot be
/// constructed.
pub fn build_extractors(config: &AppConfig) -> Result<Extractors, ExtractionError> {
    let timeout_secs = config.scraper_request_timeout_secs;
    let timeout_ms = timeout_secs.saturating_mul(1_000);

    let renderer: Arc<dyn Renderer> = Arc::new(BrowserlessRenderer::new(
        &config.browserless_url,
        config.browserless_token.as_deref(),
        timeout_secs,
    )?);
    let screenshots = ScreenshotSink::new(Arc::clone(&renderer), config.screenshot_dir.clone());

    let user_agent = config.scraper_user_agent.clone();
    let factory: LookupFactory = Arc::new(move || {
        let api = InstagramApi::new(
            instagram::DEFAULT_INSTAGRAM_BASE_URL,
            timeout_secs,
            &user_agent,
        )?;
        Ok(Arc::new(api) as Arc<dyn ProfileLookup>)
    });

    let instagram = InstagramExtractor::new(factory, Arc::clone(&renderer), screenshots.clone())?
        .with_cooldown_mins(config.instagram_cooldown_mins)
        .with_timeout_ms(timeout_ms);
    let tiktok =
        TikTokExtractor::new(Arc::clone(&renderer), screenshots).with_timeout_ms(timeout_ms);
    let twitter = TwitterExtractor::new(renderer).with_timeout_ms(timeout_ms);

    Ok(Extractors {
        instagram: Arc::new(instagram),
        tiktok: Arc::new(tiktok),
        twitter: Arc::new(twitter),
    })
}
