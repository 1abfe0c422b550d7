//! Regex-based HTML helpers for the Golfpang listing fragment.
//!
//! The listing endpoint returns a bare `<tr>` table fragment, so a full DOM
//! is not needed. These helpers find rows, cells, elements by class token and
//! attribute values, and flatten markup to text.

use std::sync::LazyLock;

use regex::Regex;

static ROW_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<tr\b([^>]*)>(.*?)</tr\s*>").expect("valid row regex"));

static CELL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<td\b[^>]*>(.*?)</td\s*>").expect("valid cell regex"));

static OPEN_TAG_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<([a-z][a-z0-9]*)\b([^>]*)>").expect("valid open tag regex")
});

static ATTR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?is)([a-z_:][-a-z0-9_:.]*)\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s"'>]+))"#)
        .expect("valid attribute regex")
});

static TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<[^>]*>").expect("valid tag regex"));

static NUMERIC_ENTITY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"&#(x?)([0-9a-fA-F]+);").expect("valid entity regex"));

static WHITESPACE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("valid whitespace regex"));

/// One `<tr>` whose `id` starts with `tr_`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ListingRow<'a> {
    pub id: String,
    pub attrs: &'a str,
    pub inner: &'a str,
}

/// Listing rows in document order. Rows without a `tr_` id (headers, the
/// "no results" row) are ignored.
pub(crate) fn listing_rows(html: &str) -> Vec<ListingRow<'_>> {
    ROW_RE
        .captures_iter(html)
        .filter_map(|cap| {
            let attrs = cap.get(1)?.as_str();
            let inner = cap.get(2)?.as_str();
            let id = attr(attrs, "id")?;
            id.starts_with("tr_").then_some(ListingRow { id, attrs, inner })
        })
        .collect()
}

/// Inner HTML of each `<td>`, in order.
pub(crate) fn cells(row_html: &str) -> Vec<&str> {
    CELL_RE
        .captures_iter(row_html)
        .filter_map(|cap| cap.get(1).map(|m| m.as_str()))
        .collect()
}

/// Value of attribute `name` within an opening tag's attribute text.
pub(crate) fn attr(attrs: &str, name: &str) -> Option<String> {
    ATTR_RE.captures_iter(attrs).find_map(|cap| {
        let key = cap.get(1)?.as_str();
        if !key.eq_ignore_ascii_case(name) {
            return None;
        }
        let value = cap.get(2).or(cap.get(3)).or(cap.get(4))?.as_str();
        Some(decode_entities(value).trim().to_string())
    })
}

/// First non-empty value of attribute `name` on any element in `html`.
pub(crate) fn attr_anywhere(html: &str, name: &str) -> Option<String> {
    OPEN_TAG_RE
        .captures_iter(html)
        .filter_map(|cap| cap.get(2).and_then(|a| attr(a.as_str(), name)))
        .find(|v| !v.is_empty())
}

/// Flattened text of the first element carrying `class` as one of its class
/// tokens. Empty elements are skipped.
///
/// Nested elements of the same tag name end the match early; listing cells
/// do not nest that way.
pub(crate) fn text_by_class(html: &str, class: &str) -> Option<String> {
    for cap in OPEN_TAG_RE.captures_iter(html) {
        let (Some(whole), Some(tag), Some(attrs)) = (cap.get(0), cap.get(1), cap.get(2)) else {
            continue;
        };
        let has_class = attr(attrs.as_str(), "class")
            .is_some_and(|c| c.split_whitespace().any(|token| token == class));
        if !has_class {
            continue;
        }
        let rest = &html[whole.end()..];
        let close = format!("</{}", tag.as_str().to_ascii_lowercase());
        let end = rest.to_ascii_lowercase().find(&close).unwrap_or(rest.len());
        let text = flatten_text(&rest[..end]);
        if !text.is_empty() {
            return Some(text);
        }
    }
    None
}

/// Strips tags, decodes common entities, and collapses whitespace.
pub(crate) fn flatten_text(html: &str) -> String {
    let stripped = TAG_RE.replace_all(html, " ");
    let decoded = decode_entities(&stripped);
    WHITESPACE_RE.replace_all(decoded.trim(), " ").into_owned()
}

fn decode_entities(text: &str) -> String {
    let named = text
        .replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&apos;", "'");
    let numeric = NUMERIC_ENTITY_RE.replace_all(&named, |cap: &regex::Captures<'_>| {
        let radix = if cap[1].is_empty() { 10 } else { 16 };
        u32::from_str_radix(&cap[2], radix)
            .ok()
            .and_then(char::from_u32)
            .map(String::from)
            .unwrap_or_default()
    });
    // `&amp;` last so `&amp;lt;` stays literal.
    numeric.replace("&amp;", "&")
}
