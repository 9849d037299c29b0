//! Follower count from a rendered Instagram profile page.

use crate::html::{first_parsable_count, meta_content, scan_follower_phrase, texts};

/// Tier 1: `<meta name="description" content="12.3K Followers, ...">`.
pub(crate) fn from_meta_description(html: &str) -> Option<u64> {
    meta_content(html, "description").and_then(|content| scan_follower_phrase(&content))
}

/// Tier 2: visible elements mentioning followers, then the followers link.
pub(crate) fn from_dom_text(html: &str) -> Option<u64> {
    texts(html, "span, div")
        .iter()
        .filter(|t| t.to_lowercase().contains("follower"))
        .find_map(|t| scan_follower_phrase(t))
        .or_else(|| first_parsable_count(html, "a[href*='/followers/'] span"))
}

/// True when Instagram bounced the session to its login wall.
pub(crate) fn is_login_redirect(final_url: &str) -> bool {
    final_url.contains("/accounts/login")
}
