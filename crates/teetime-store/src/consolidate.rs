//! Merge and dedup of cached records into the query result.
//!
//! Records are keyed by `(club, date, hour_label)`. Within a key the lowest
//! known price wins; on an equal price a Teescanner record beats a Golfpang
//! one; any remaining tie goes to the record seen last. A record with an
//! unknown price only wins against another unknown price.

use std::cmp::Ordering;
use std::collections::btree_map::Entry;
use std::collections::{BTreeMap, BTreeSet, HashSet};

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer};
use teetime_core::{ConsolidatedRecord, SourceId, TeeTimeRecord};

use crate::cache::CacheStore;

/// One consolidation request.
///
/// An absent, `null` or empty `hour_range` or `favorite_clubs` means
/// "no filter".
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TeeTimeQuery {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub hour_range: Vec<u8>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub favorite_clubs: Vec<String>,
}

fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

impl TeeTimeQuery {
    #[must_use]
    pub fn new(start_date: NaiveDate, end_date: NaiveDate) -> Self {
        Self {
            start_date,
            end_date,
            hour_range: Vec::new(),
            favorite_clubs: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_hours(mut self, hours: impl IntoIterator<Item = u8>) -> Self {
        self.hour_range = hours.into_iter().collect();
        self
    }

    #[must_use]
    pub fn with_favorites(mut self, clubs: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.favorite_clubs = clubs.into_iter().map(Into::into).collect();
        self
    }

    /// Inclusive number of days covered; zero when the range is inverted.
    #[must_use]
    pub fn day_count(&self) -> i64 {
        (self.end_date - self.start_date).num_days().max(-1) + 1
    }
}

/// Lower known price first; unknown prices sort last and tie each other.
fn compare_price(a: Option<u32>, b: Option<u32>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.cmp(&b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Whether `challenger`, seen after `incumbent`, takes over its key.
fn replaces(incumbent: &TeeTimeRecord, challenger: &TeeTimeRecord) -> bool {
    match compare_price(challenger.price, incumbent.price) {
        Ordering::Less => true,
        Ordering::Greater => false,
        Ordering::Equal => {
            !(incumbent.source == SourceId::Teescanner && challenger.source == SourceId::Golfpang)
        }
    }
}

/// Filters and deduplicates `records` in input order.
///
/// Output is ordered by date, then club, then hour label.
pub fn consolidate(
    records: impl IntoIterator<Item = TeeTimeRecord>,
    query: &TeeTimeQuery,
) -> Vec<ConsolidatedRecord> {
    let hours: BTreeSet<u8> = query.hour_range.iter().copied().collect();
    let favorites: HashSet<&str> = query.favorite_clubs.iter().map(String::as_str).collect();

    let mut winners: BTreeMap<(NaiveDate, String, String), TeeTimeRecord> = BTreeMap::new();

    for record in records {
        if !favorites.is_empty() && !favorites.contains(record.club.as_str()) {
            continue;
        }
        if !hours.is_empty() && !hours.contains(&record.hour_bucket) {
            continue;
        }

        let key = (record.date, record.club.clone(), record.hour_label.clone());
        match winners.entry(key) {
            Entry::Occupied(mut slot) => {
                if replaces(slot.get(), &record) {
                    slot.insert(record);
                }
            }
            Entry::Vacant(slot) => {
                slot.insert(record);
            }
        }
    }

    winners
        .into_values()
        .map(ConsolidatedRecord::from_record)
        .collect()
}

/// Consolidates every cached date in the query range.
///
/// Reads the cache once and never touches an upstream. A cache read that
/// times out yields an empty result.
pub async fn query(store: &CacheStore, request: &TeeTimeQuery) -> Vec<ConsolidatedRecord> {
    let cached = match store.get_range(request.start_date, request.end_date).await {
        Ok(cached) => cached,
        Err(e) => {
            tracing::warn!(
                start = %request.start_date,
                end = %request.end_date,
                error = %e,
                "cache read skipped, returning no tee times"
            );
            return Vec::new();
        }
    };

    let results = consolidate(cached.into_values().flatten(), request);
    tracing::debug!(
        start = %request.start_date,
        end = %request.end_date,
        results = results.len(),
        "tee times consolidated"
    );
    results
}

#[cfg(test)]
#[path = "consolidate_test.rs"]
mod tests;
