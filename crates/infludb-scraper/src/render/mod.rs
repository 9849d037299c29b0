//! Rendered-page sessions.
//!
//! A [`Renderer`] call is one isolated browser session: it is opened,
//! navigated, read and closed inside the call, on every exit path. Retrying
//! means calling again, which always gets a brand new session.

mod browserless;

use async_trait::async_trait;

pub use browserless::BrowserlessRenderer;

use crate::error::ExtractionError;

/// Script injected after load to trigger lazily rendered content.
pub const SCROLL_TO_BOTTOM_JS: &str = "window.scrollTo(0, document.body.scrollHeight);";

/// What to load and how long to let it settle.
#[derive(Debug, Clone)]
pub struct RenderRequest {
    pub url: String,
    /// CSS selector that must appear before the page is captured.
    pub wait_for_selector: Option<String>,
    /// Extra settle time after load, in milliseconds.
    pub settle_ms: u64,
    /// Scroll to the bottom once loaded to force dynamic content.
    pub scroll_to_bottom: bool,
    /// Navigation timeout in milliseconds.
    pub timeout_ms: u64,
}

impl RenderRequest {
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            wait_for_selector: Some("body".to_string()),
            settle_ms: 0,
            scroll_to_bottom: false,
            timeout_ms: 30_000,
        }
    }

    #[must_use]
    pub fn settle_ms(mut self, ms: u64) -> Self {
        self.settle_ms = ms;
        self
    }

    #[must_use]
    pub fn scroll_to_bottom(mut self, scroll: bool) -> Self {
        self.scroll_to_bottom = scroll;
        self
    }

    #[must_use]
    pub fn timeout_ms(mut self, ms: u64) -> Self {
        self.timeout_ms = ms;
        self
    }
}

/// The captured state of a rendered page.
#[derive(Debug, Clone)]
pub struct RenderedPage {
    /// URL after redirects.
    pub final_url: String,
    pub html: String,
}

#[async_trait]
pub trait Renderer: Send + Sync {
    /// Render `request.url` in a fresh isolated session and capture its HTML.
    async fn render(&self, request: &RenderRequest) -> Result<RenderedPage, ExtractionError>;

    /// Render `request.url` in a fresh isolated session and capture a PNG.
    async fn screenshot(&self, request: &RenderRequest) -> Result<Vec<u8>, ExtractionError>;
}
