//! The per-platform extractor contract and its closed dispatch table.

use std::sync::Arc;

use async_trait::async_trait;
use infludb_core::Platform;

use crate::error::ExtractionError;

/// Turns a profile reference into a follower count.
///
/// Implementations run their own private fallback chain. Any network or
/// render resources they open are released before `extract` returns.
#[async_trait]
pub trait Extractor: Send + Sync {
    fn platform(&self) -> Platform;

    async fn extract(&self, profile_reference: &str) -> Result<u64, ExtractionError>;
}

/// Result of looking up the extractor for a platform.
pub enum Dispatch<'a> {
    Supported(&'a dyn Extractor),
    Unsupported,
}

/// One extractor per supported platform.
#[derive(Clone)]
pub struct Extractors {
    pub instagram: Arc<dyn Extractor>,
    pub tiktok: Arc<dyn Extractor>,
    pub twitter: Arc<dyn Extractor>,
}

impl Extractors {
    #[must_use]
    pub fn dispatch(&self, platform: Platform) -> Dispatch<'_> {
        match platform {
            Platform::Instagram => Dispatch::Supported(self.instagram.as_ref()),
            Platform::TikTok => Dispatch::Supported(self.tiktok.as_ref()),
            Platform::Twitter => Dispatch::Supported(self.twitter.as_ref()),
            Platform::Unknown => Dispatch::Unsupported,
        }
    }
}
