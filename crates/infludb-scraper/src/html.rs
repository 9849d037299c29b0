//! Read-only queries over rendered HTML.
//!
//! `scraper::Html` is not `Send`, so every helper parses, queries and drops
//! the document synchronously and hands back owned strings. Callers never
//! hold a parsed document across an `.await`.

use std::sync::LazyLock;

use regex::Regex;
use scraper::{Html, Selector};

use infludb_core::parse_number;

/// `<number><K|M|blank> follower(s)`, case-insensitive.
static FOLLOWER_PHRASE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(\d[\d,.]*\s?[km]?)\s*followers?\b").expect("valid regex"));

fn selector(css: &str) -> Option<Selector> {
    match Selector::parse(css) {
        Ok(s) => Some(s),
        Err(e) => {
            tracing::debug!(css, error = ?e, "invalid css selector");
            None
        }
    }
}

fn normalise_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// `content` attribute of `<meta name="{name}">` or `<meta property="{name}">`.
#[must_use]
pub fn meta_content(html: &str, name: &str) -> Option<String> {
    let doc = Html::parse_document(html);
    let sel = selector("meta")?;
    doc.select(&sel)
        .find(|el| {
            let v = el.value();
            ["name", "property"]
                .into_iter()
                .filter_map(|attr| v.attr(attr))
                .any(|value| value.eq_ignore_ascii_case(name))
        })
        .and_then(|el| el.value().attr("content"))
        .map(str::to_string)
}

/// Whitespace-normalised text of every element matching `css`, in document order.
#[must_use]
pub fn texts(html: &str, css: &str) -> Vec<String> {
    let doc = Html::parse_document(html);
    let Some(sel) = selector(css) else {
        return Vec::new();
    };
    doc.select(&sel)
        .map(|el| normalise_whitespace(&el.text().collect::<String>()))
        .filter(|t| !t.is_empty())
        .collect()
}

/// Raw inner text of the `<script id="{id}">` element.
#[must_use]
pub fn script_by_id(html: &str, id: &str) -> Option<String> {
    let doc = Html::parse_document(html);
    let sel = selector("script")?;
    doc.select(&sel)
        .find(|el| el.value().id() == Some(id))
        .map(|el| el.text().collect::<String>())
        .filter(|t| !t.trim().is_empty())
}

/// Visible text of the whole page, excluding `<script>` and `<style>` contents.
#[must_use]
pub fn body_text(html: &str) -> String {
    let doc = Html::parse_document(html);
    let Some(body_sel) = selector("body") else {
        return String::new();
    };
    let Some(root) = doc.select(&body_sel).next() else {
        return String::new();
    };

    let mut out = String::new();
    for node in root.descendants() {
        let Some(text) = node.value().as_text() else {
            continue;
        };
        let inside_script = node.ancestors().any(|a| {
            a.value()
                .as_element()
                .is_some_and(|e| matches!(e.name(), "script" | "style" | "noscript"))
        });
        if !inside_script {
            out.push_str(text);
            out.push(' ');
        }
    }
    normalise_whitespace(&out)
}

/// First count parsed from a `<number> follower(s)` phrase in `text`.
#[must_use]
pub fn scan_follower_phrase(text: &str) -> Option<u64> {
    FOLLOWER_PHRASE_RE
        .captures_iter(text)
        .filter_map(|c| c.get(1))
        .find_map(|m| parse_number(m.as_str()).ok())
}

/// First element text matching `css` that parses as a count on its own.
#[must_use]
pub fn first_parsable_count(html: &str, css: &str) -> Option<u64> {
    texts(html, css)
        .iter()
        .find_map(|t| parse_number(t).ok())
}
