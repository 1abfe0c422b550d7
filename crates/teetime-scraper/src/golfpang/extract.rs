//! Field extraction for Golfpang listing rows.
//!
//! Each field has an ordered list of strategies; the first one that yields a
//! value wins. Element lookups come first, regex scans over the row's
//! flattened text come last. Everything markup-specific stays in this module.

use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;

use super::html::{
    attr, attr_anywhere, cells, flatten_text, listing_rows, text_by_class, ListingRow,
};
use crate::error::ScraperError;
use crate::normalize::{normalize_price, parse_hour};

static CLUB_SUFFIX_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[0-9A-Za-z가-힣&()]+?(?:컨트리클럽|골프클럽|골프장|C\.C|CC|GC|cc)\b")
        .expect("valid club name regex")
});

static ISO_DATE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(\d{4})[-./](\d{1,2})[-./](\d{1,2})\b").expect("valid date regex")
});

static HH_MM_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b([01]?\d|2[0-3]):([0-5]\d)\b").expect("valid time regex")
});

static DIGIT_GROUP_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d{1,3}(?:,\d{3})+").expect("valid price group regex"));

static WON_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d[\d,]*)\s*원").expect("valid won regex"));

/// A row reduced to the views strategies look at.
pub(crate) struct RowView<'a> {
    pub id: String,
    pub attrs: &'a str,
    pub inner: &'a str,
    pub cells: Vec<&'a str>,
    pub text: String,
}

impl<'a> RowView<'a> {
    pub(crate) fn new(row: ListingRow<'a>) -> Self {
        Self {
            cells: cells(row.inner),
            text: flatten_text(row.inner),
            id: row.id,
            attrs: row.attrs,
            inner: row.inner,
        }
    }
}

type Strategy<T> = fn(&RowView<'_>) -> Option<T>;

const NAME_STRATEGIES: &[Strategy<String>] = &[
    |row| text_by_class(row.inner, "club_name"),
    |row| text_by_class(row.inner, "clubname"),
    |row| text_by_class(row.inner, "name"),
    |row| attr(row.attrs, "data-clubname").filter(|v| !v.is_empty()),
    |row| attr_anywhere(row.inner, "data-clubname"),
    |row| CLUB_SUFFIX_RE.find(&row.text).map(|m| m.as_str().to_string()),
];

const DATE_STRATEGIES: &[Strategy<NaiveDate>] = &[
    |row| text_by_class(row.inner, "date").and_then(|t| scan_date(&t)),
    |row| attr(row.attrs, "data-date").and_then(|t| scan_date(&t)),
    |row| scan_date(&row.text),
];

const HOUR_STRATEGIES: &[Strategy<u8>] = &[
    |row| row.cells.get(2).and_then(|c| scan_hour(&flatten_text(c))),
    |row| text_by_class(row.inner, "time").and_then(|t| scan_hour(&t)),
    |row| scan_hour(&row.text),
];

const PRICE_STRATEGIES: &[Strategy<String>] = &[
    |row| text_by_class(row.inner, "price"),
    |row| DIGIT_GROUP_RE.find(&row.text).map(|m| m.as_str().to_string()),
    |row| WON_RE.captures(&row.text).and_then(|c| c.get(1)).map(|m| m.as_str().to_string()),
];

fn first_match<T>(strategies: &[Strategy<T>], row: &RowView<'_>) -> Option<T> {
    strategies.iter().find_map(|strategy| strategy(row))
}

fn scan_date(text: &str) -> Option<NaiveDate> {
    let cap = ISO_DATE_RE.captures(text)?;
    let year = cap[1].parse().ok()?;
    let month = cap[2].parse().ok()?;
    let day = cap[3].parse().ok()?;
    NaiveDate::from_ymd_opt(year, month, day)
}

fn scan_hour(text: &str) -> Option<u8> {
    HH_MM_RE.find(text).and_then(|m| parse_hour(m.as_str()))
}

/// A listing row that resolved every required field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    /// Name as printed in the row; used for favorites matching.
    pub listed_name: String,
    pub date: NaiveDate,
    pub hour: u8,
    /// `None` when the price text held no digits.
    pub price: Option<u32>,
    pub benefit: Option<String>,
}

/// Why a row did not become a [`Candidate`].
#[derive(Debug)]
pub enum Rejection {
    Unresolved(ScraperError),
    DateMismatch(NaiveDate),
    NotFavorite(String),
}

/// Resolves one row, applying the date and favorites filters.
///
/// # Errors
///
/// Returns a [`Rejection`] when a required field is missing, the row's date
/// is not `requested`, or the name matches none of `favorites`.
pub fn extract_candidate(
    row: &RowView<'_>,
    requested: NaiveDate,
    favorites: &[String],
) -> Result<Candidate, Rejection> {
    let missing = |field: &'static str| {
        Rejection::Unresolved(ScraperError::Parse {
            context: format!("listing row {}", row.id),
            field,
        })
    };

    let listed_name = first_match(NAME_STRATEGIES, row).ok_or_else(|| missing("name"))?;
    let date = first_match(DATE_STRATEGIES, row).ok_or_else(|| missing("date"))?;
    let hour = first_match(HOUR_STRATEGIES, row).ok_or_else(|| missing("time"))?;
    let raw_price = first_match(PRICE_STRATEGIES, row).ok_or_else(|| missing("price"))?;

    if date != requested {
        return Err(Rejection::DateMismatch(date));
    }
    if !favorites.is_empty() && !favorites.iter().any(|f| listed_name.contains(f.as_str())) {
        return Err(Rejection::NotFavorite(listed_name));
    }

    Ok(Candidate {
        listed_name,
        date,
        hour,
        price: normalize_price(&raw_price),
        benefit: text_by_class(row.inner, "benefit"),
    })
}

/// Result of parsing one listing page.
#[derive(Debug, Default)]
pub struct PageExtract {
    pub candidates: Vec<Candidate>,
    pub rows_seen: usize,
    pub rejected: usize,
}

/// Parses every listing row on a page, logging each rejection at `debug`.
#[must_use]
pub fn extract_page(html: &str, requested: NaiveDate, favorites: &[String]) -> PageExtract {
    let mut page = PageExtract::default();

    for row in listing_rows(html) {
        page.rows_seen += 1;
        let view = RowView::new(row);
        match extract_candidate(&view, requested, favorites) {
            Ok(candidate) => page.candidates.push(candidate),
            Err(rejection) => {
                page.rejected += 1;
                match rejection {
                    Rejection::Unresolved(err) => {
                        tracing::debug!(error = %err, "listing row dropped");
                    }
                    Rejection::DateMismatch(found) => {
                        tracing::debug!(
                            row = %view.id,
                            %found,
                            %requested,
                            "listing row for another date dropped"
                        );
                    }
                    Rejection::NotFavorite(name) => {
                        tracing::debug!(
                            row = %view.id,
                            club = %name,
                            "listing row outside favorites dropped"
                        );
                    }
                }
            }
        }
    }

    page
}

#[cfg(test)]
#[path = "extract_test.rs"]
mod tests;
