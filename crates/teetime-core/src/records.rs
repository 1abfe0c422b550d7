//! Tee-time record types shared by the adapters, the cache, and the query path.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Upstream provider a record was scraped from.
///
/// Serialized with the short names the booking front-end already understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SourceId {
    /// Teescanner JSON API. Authoritative on price ties.
    #[serde(rename = "teescan")]
    Teescanner,
    /// Golfpang HTML listing.
    #[serde(rename = "golfpang")]
    Golfpang,
}

impl SourceId {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            SourceId::Teescanner => "teescan",
            SourceId::Golfpang => "golfpang",
        }
    }
}

impl std::fmt::Display for SourceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One bookable slot at one venue on one date.
///
/// `date` is always the date the crawl pass asked for. `price` is `None` when
/// the upstream value could not be parsed; such a record never wins a
/// lowest-price comparison.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeeTimeRecord {
    pub club: String,
    pub date: NaiveDate,
    pub hour_label: String,
    pub hour_bucket: u8,
    pub price: Option<u32>,
    pub source: SourceId,
    pub booking_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub benefit: Option<String>,
}

impl TeeTimeRecord {
    /// Builds a record, deriving the display label from `hour_bucket`.
    #[must_use]
    pub fn new(
        club: impl Into<String>,
        date: NaiveDate,
        hour_bucket: u8,
        price: Option<u32>,
        source: SourceId,
        booking_url: impl Into<String>,
    ) -> Self {
        Self {
            club: club.into(),
            date,
            hour_label: hour_label(hour_bucket),
            hour_bucket,
            price,
            source,
            booking_url: booking_url.into(),
            benefit: None,
        }
    }

    #[must_use]
    pub fn with_benefit(mut self, benefit: impl Into<String>) -> Self {
        let benefit = benefit.into();
        self.benefit = if benefit.trim().is_empty() {
            None
        } else {
            Some(benefit)
        };
        self
    }
}

/// Display label for an hour bucket, e.g. `9` → `"09시대"`.
#[must_use]
pub fn hour_label(hour_bucket: u8) -> String {
    format!("{hour_bucket:02}시대")
}

/// A deduplicated record as served to the query caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsolidatedRecord {
    pub club: String,
    /// Short `MM/DD` form of the slot date.
    pub date: String,
    pub hour_label: String,
    pub price: Option<u32>,
    pub source: SourceId,
    pub booking_url: String,
}

impl ConsolidatedRecord {
    #[must_use]
    pub fn from_record(record: TeeTimeRecord) -> Self {
        Self {
            date: record.date.format("%m/%d").to_string(),
            club: record.club,
            hour_label: record.hour_label,
            price: record.price,
            source: record.source,
            booking_url: record.booking_url,
        }
    }
}
