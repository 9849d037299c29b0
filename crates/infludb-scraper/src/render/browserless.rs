//! [`Renderer`] backed by a Browserless instance.
//!
//! Browserless launches a new browser context for every `/content` and
//! `/screenshot` request and tears it down when the response is sent, which
//! is exactly the per-attempt session isolation the extractors rely on.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};

use super::{RenderRequest, RenderedPage, Renderer, SCROLL_TO_BOTTOM_JS};
use crate::error::ExtractionError;

/// Headroom added to the navigation timeout for the HTTP round trip.
const HTTP_TIMEOUT_HEADROOM_SECS: u64 = 15;

pub struct BrowserlessRenderer {
    client: Client,
    base_url: String,
    token: Option<String>,
}

/// Client-side timeout: the page budget plus headroom for Browserless itself.
fn http_timeout(request_timeout_secs: u64) -> Duration {
    let secs = request_timeout_secs.saturating_add(HTTP_TIMEOUT_HEADROOM_SECS);
    Duration::from_secs(secs)
}

impl BrowserlessRenderer {
    /// Creates a renderer for the Browserless instance at `base_url`.
    ///
    /// # Errors
    ///
    /// Returns [`ExtractionError::Navigation`] if the HTTP client cannot be
    /// constructed.
    pub fn new(
        base_url: &str,
        token: Option<&str>,
        request_timeout_secs: u64,
    ) -> Result<Self, ExtractionError> {
        let client = Client::builder()
            .timeout(http_timeout(request_timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| ExtractionError::from_http(base_url, &e))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.map(String::from),
        })
    }

    fn endpoint(&self, path: &str) -> Result<reqwest::Url, ExtractionError> {
        let mut url = reqwest::Url::parse(&format!("{}/{path}", self.base_url)).map_err(|e| {
            ExtractionError::Navigation {
                url: self.base_url.clone(),
                detail: format!("invalid browserless base url: {e}"),
            }
        })?;
        if let Some(token) = &self.token {
            url.query_pairs_mut().append_pair("token", token);
        }
        Ok(url)
    }

    fn base_body(request: &RenderRequest) -> Value {
        let mut body = json!({
            "url": request.url,
            "gotoOptions": {
                "waitUntil": "domcontentloaded",
                "timeout": request.timeout_ms,
            },
            "bestAttempt": true,
        });
        if let Some(selector) = &request.wait_for_selector {
            body["waitForSelector"] = json!({
                "selector": selector,
                "timeout": request.timeout_ms,
            });
        }
        if request.settle_ms > 0 {
            body["waitForTimeout"] = json!(request.settle_ms);
        }
        if request.scroll_to_bottom {
            body["addScriptTag"] = json!([{ "content": SCROLL_TO_BOTTOM_JS }]);
        }
        body
    }

    async fn post(
        &self,
        path: &str,
        request: &RenderRequest,
        body: &Value,
    ) -> Result<reqwest::Response, ExtractionError> {
        let endpoint = self.endpoint(path)?;
        let response = self
            .client
            .post(endpoint)
            .json(body)
            .send()
            .await
            .map_err(|e| ExtractionError::from_http(&request.url, &e))?;

        let status = response.status();
        if status == reqwest::StatusCode::REQUEST_TIMEOUT
            || status == reqwest::StatusCode::GATEWAY_TIMEOUT
        {
            return Err(ExtractionError::Timeout {
                url: request.url.clone(),
            });
        }
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(ExtractionError::Navigation {
                url: request.url.clone(),
                detail: format!(
                    "browserless returned {}: {}",
                    status.as_u16(),
                    message.chars().take(200).collect::<String>()
                ),
            });
        }

        // Browserless reports the target page's own status separately.
        let target_status = response
            .headers()
            .get("x-response-code")
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.parse::<u16>().ok());
        if target_status == Some(404) {
            return Err(ExtractionError::NotFound {
                reference: request.url.clone(),
            });
        }

        Ok(response)
    }
}

#[async_trait]
impl Renderer for BrowserlessRenderer {
    async fn render(&self, request: &RenderRequest) -> Result<RenderedPage, ExtractionError> {
        let body = Self::base_body(request);
        let response = self.post("content", request, &body).await?;

        let final_url = response
            .headers()
            .get("x-response-url")
            .and_then(|v| v.to_str().ok())
            .map_or_else(|| request.url.clone(), str::to_owned);

        let html = response
            .text()
            .await
            .map_err(|e| ExtractionError::from_http(&request.url, &e))?;

        tracing::debug!(
            url = %request.url,
            final_url = %final_url,
            bytes = html.len(),
            "rendered page"
        );
        Ok(RenderedPage { final_url, html })
    }

    async fn screenshot(&self, request: &RenderRequest) -> Result<Vec<u8>, ExtractionError> {
        let mut body = Self::base_body(request);
        body["options"] = json!({ "fullPage": true, "type": "png" });
        let response = self.post("screenshot", request, &body).await?;
        let bytes = response
            .bytes()
            .await
            .map_err(|e| ExtractionError::from_http(&request.url, &e))?;
        Ok(bytes.to_vec())
    }
}
