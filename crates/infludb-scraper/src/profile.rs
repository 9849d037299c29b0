//! Username extraction from profile references.

use std::sync::LazyLock;

use regex::Regex;

static INSTAGRAM_USER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)instagram\.com/([^/?#&]+)").expect("valid regex"));

static TIKTOK_USER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)tiktok\.com/@([^/?#&]+)").expect("valid regex"));

/// Username from an Instagram profile link, e.g. `https://www.instagram.com/nasa/` → `nasa`.
#[must_use]
pub fn instagram_username(link: &str) -> Option<String> {
    INSTAGRAM_USER_RE
        .captures(link)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
        .filter(|u| !u.is_empty())
}

/// Username from a TikTok profile link, e.g. `https://www.tiktok.com/@khaby.lame` → `khaby.lame`.
#[must_use]
pub fn tiktok_username(link: &str) -> Option<String> {
    TIKTOK_USER_RE
        .captures(link)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
        .filter(|u| !u.is_empty())
}

/// Handle from an X/Twitter link or bare handle.
///
/// `https://x.com/jack/` → `jack`, `@jack` → `jack`, `jack` → `jack`.
/// Query strings and fragments on links are ignored.
#[must_use]
pub fn twitter_handle(reference: &str) -> Option<String> {
    let trimmed = reference.trim();
    let handle = if trimmed.starts_with("http") {
        let without_query = trimmed.split(['?', '#']).next().unwrap_or(trimmed);
        let without_scheme = without_query
            .split_once("://")
            .map_or(without_query, |(_, rest)| rest);
        // First segment is the host; the handle is the last non-empty path segment.
        without_scheme
            .split('/')
            .skip(1)
            .filter(|s| !s.is_empty())
            .last()
            .unwrap_or_default()
    } else {
        trimmed
    };
    let handle = handle.trim_start_matches('@');
    if handle.is_empty() || handle.contains(['/', ':']) {
        None
    } else {
        Some(handle.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn instagram_username_from_link() {
        assert_eq!(
            instagram_username("https://www.instagram.com/nasa/").as_deref(),
            Some("nasa")
        );
        assert_eq!(
            instagram_username("https://instagram.com/nasa?hl=en").as_deref(),
            Some("nasa")
        );
    }

    #[test]
    fn instagram_username_missing() {
        assert_eq!(instagram_username("https://instagram.com/"), None);
        assert_eq!(instagram_username("https://example.com/nasa"), None);
    }

    #[test]
    fn tiktok_username_from_link() {
        assert_eq!(
            tiktok_username("https://www.tiktok.com/@khaby.lame?lang=en").as_deref(),
            Some("khaby.lame")
        );
        assert_eq!(tiktok_username("https://www.tiktok.com/foryou"), None);
    }

    #[test]
    fn twitter_handle_from_link_and_text() {
        for (input, handle) in [
            ("https://x.com/graykolori", "graykolori"),
            ("https://twitter.com/jack/", "jack"),
            ("https://x.com/jack?s=20", "jack"),
            ("@elonmusk", "elonmusk"),
            ("nandoxun", "nandoxun"),
        ] {
            assert_eq!(twitter_handle(input).as_deref(), Some(handle), "{input}");
        }
    }

    #[test]
    fn twitter_handle_rejects_empty() {
        assert_eq!(twitter_handle("   "), None);
        assert_eq!(twitter_handle("@"), None);
        assert_eq!(twitter_handle("https://x.com/"), None);
    }
}
