use serde::{Deserialize, Serialize};

/// Social platform an account lives on.
///
/// `Unknown` is a real variant rather than a lookup miss: accounts whose
/// platform cannot be resolved are still stored and surface as
/// [`Category::FailedPlatform`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Instagram,
    TikTok,
    Twitter,
    Unknown,
}

impl Platform {
    /// Platforms that have an extractor.
    pub const SUPPORTED: [Platform; 3] = [Platform::Instagram, Platform::TikTok, Platform::Twitter];

    /// Infer the platform from a profile link by fixed domain-substring rules.
    ///
    /// Matching is case-insensitive and checks `x.com` last.
    #[must_use]
    pub fn infer_from_link(link: &str) -> Platform {
        let lower = link.to_lowercase();
        if lower.contains("instagram.com") {
            Platform::Instagram
        } else if lower.contains("tiktok.com") {
            Platform::TikTok
        } else if lower.contains("twitter.com") || lower.contains("x.com") {
            Platform::Twitter
        } else {
            Platform::Unknown
        }
    }

    /// Parse a user-supplied platform tag. Anything unrecognised maps to
    /// [`Platform::Unknown`].
    #[must_use]
    pub fn from_tag(tag: &str) -> Platform {
        match tag.trim().to_lowercase().as_str() {
            "instagram" => Platform::Instagram,
            "tiktok" => Platform::TikTok,
            "twitter" => Platform::Twitter,
            _ => Platform::Unknown,
        }
    }

    #[must_use]
    pub fn is_supported(self) -> bool {
        !matches!(self, Platform::Unknown)
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Platform::Instagram => "instagram",
            Platform::TikTok => "tiktok",
            Platform::Twitter => "twitter",
            Platform::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(self.as_str())
    }
}

/// Tier label or terminal failure marker stored with each account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Pending,
    Micro,
    Macro,
    Failed,
    FailedPlatform,
}

impl Category {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Category::Pending => "pending",
            Category::Micro => "micro",
            Category::Macro => "macro",
            Category::Failed => "failed",
            Category::FailedPlatform => "failed_platform",
        }
    }

    /// Parse a stored category string. Unknown values return `None`.
    #[must_use]
    pub fn from_stored(s: &str) -> Option<Category> {
        match s {
            "pending" => Some(Category::Pending),
            "micro" => Some(Category::Micro),
            "macro" => Some(Category::Macro),
            "failed" => Some(Category::Failed),
            "failed_platform" => Some(Category::FailedPlatform),
            _ => None,
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(self.as_str())
    }
}

/// An account whose follower count is tracked. `link` is the identity key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackedAccount {
    pub name: String,
    pub link: String,
    pub platform: Platform,
    pub followers: u64,
    pub category: Category,
}

impl TrackedAccount {
    /// A freshly added account: zero followers, `pending`.
    #[must_use]
    pub fn pending(name: impl Into<String>, link: impl Into<String>, platform: Platform) -> Self {
        Self {
            name: name.into(),
            link: link.into(),
            platform,
            followers: 0,
            category: Category::Pending,
        }
    }

    /// Same account with a new outcome applied.
    #[must_use]
    pub fn with_outcome(&self, followers: u64, category: Category) -> Self {
        Self {
            followers,
            category,
            ..self.clone()
        }
    }
}
