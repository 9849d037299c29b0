//! Instagram's public web-profile-info endpoint.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use crate::error::ExtractionError;

/// App id the Instagram web client sends; the endpoint rejects requests without it.
const WEB_APP_ID: &str = "936619743392459";

pub const DEFAULT_INSTAGRAM_BASE_URL: &str = "https://i.instagram.com";

/// Lightweight follower lookup by username.
#[async_trait]
pub trait ProfileLookup: Send + Sync {
    async fn follower_count(&self, username: &str) -> Result<u64, ExtractionError>;
}

#[derive(Debug, Deserialize)]
struct WebProfileInfo {
    data: Option<ProfileData>,
}

#[derive(Debug, Deserialize)]
struct ProfileData {
    user: Option<ProfileUser>,
}

#[derive(Debug, Deserialize)]
struct ProfileUser {
    edge_followed_by: EdgeCount,
}

#[derive(Debug, Deserialize)]
struct EdgeCount {
    count: u64,
}

/// [`ProfileLookup`] over `GET /api/v1/users/web_profile_info/?username=`.
///
/// Each instance owns its own HTTP client and cookie-free connection pool,
/// so replacing the instance starts a fresh context.
pub struct InstagramApi {
    client: Client,
    base_url: String,
}

impl InstagramApi {
    /// # Errors
    ///
    /// Returns [`ExtractionError::Navigation`] if the HTTP client cannot be
    /// constructed.
    pub fn new(
        base_url: &str,
        timeout_secs: u64,
        user_agent: &str,
    ) -> Result<Self, ExtractionError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()
            .map_err(|e| ExtractionError::from_http(base_url, &e))?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn profile_url(&self) -> String {
        format!("{}/api/v1/users/web_profile_info/", self.base_url)
    }
}

#[async_trait]
impl ProfileLookup for InstagramApi {
    async fn follower_count(&self, username: &str) -> Result<u64, ExtractionError> {
        let url = self.profile_url();
        let response = self
            .client
            .get(&url)
            .query(&[("username", username)])
            .header("x-ig-app-id", WEB_APP_ID)
            .send()
            .await
            .map_err(|e| ExtractionError::from_http(&url, &e))?;

        let status = response.status();
        match status.as_u16() {
            // 400/401 is how the endpoint says "please wait a few minutes".
            400 | 401 | 429 => {
                return Err(ExtractionError::RateLimited {
                    service: "instagram".to_string(),
                    detail: format!("HTTP {}", status.as_u16()),
                });
            }
            404 => {
                return Err(ExtractionError::NotFound {
                    reference: username.to_string(),
                });
            }
            _ if !status.is_success() => {
                return Err(ExtractionError::Navigation {
                    url,
                    detail: format!("unexpected status {}", status.as_u16()),
                });
            }
            _ => {}
        }

        let body = response
            .text()
            .await
            .map_err(|e| ExtractionError::from_http(&url, &e))?;
        let info: WebProfileInfo = serde_json::from_str(&body).map_err(|e| {
            ExtractionError::parse_failure(format!("web_profile_info body: {e}"))
        })?;

        info.data
            .and_then(|d| d.user)
            .map(|u| u.edge_followed_by.count)
            .ok_or_else(|| ExtractionError::NotFound {
                reference: username.to_string(),
            })
    }
}
