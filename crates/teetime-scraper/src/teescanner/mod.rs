//! Source A: Teescanner's public JSON tee-time API.
//!
//! One GET per club with a Teescanner sequence id. A club that fails is
//! logged and skipped; the rest of the directory is still fetched.

mod types;

use std::time::Duration;

use chrono::NaiveDate;
use reqwest::Client;
use teetime_core::{Club, ClubDirectory, SourceId, TeeTimeRecord};

use crate::error::ScraperError;
use crate::normalize::{parse_hour, price_from_json};
use crate::source::{FetchReport, TeeTimeSource};

pub use types::{TeeTimeListResponse, TeeTimeSlot};

const LIST_PATH: &str = "/v1/booking/getTeeTimeListbyGolfclub";
pub const BOOKING_URL: &str = "https://www.teescanner.com/";

/// HTTP client for the Teescanner tee-time list endpoint.
pub struct TeescannerClient {
    client: Client,
    base_url: String,
    timeout_ms: u64,
}

impl TeescannerClient {
    /// Creates a client with the given per-call timeout and `User-Agent`.
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError::Transport`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(base_url: &str, timeout_secs: u64, user_agent: &str) -> Result<Self, ScraperError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .user_agent(user_agent)
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_owned(),
            timeout_ms: timeout_secs.saturating_mul(1000),
        })
    }

    /// Fetches and converts every slot Teescanner lists for one club.
    ///
    /// Slots whose time cannot be read are dropped; slots whose price cannot
    /// be read are kept with an unknown price.
    ///
    /// # Errors
    ///
    /// - [`ScraperError::Timeout`] / [`ScraperError::Transport`] on network failure.
    /// - [`ScraperError::UnexpectedStatus`] for any non-2xx status.
    /// - [`ScraperError::Deserialize`] if the body is not JSON at all.
    /// - [`ScraperError::UpstreamFormat`] if it is JSON of the wrong shape.
    pub async fn fetch_club_slots(
        &self,
        seq: &str,
        club_name: &str,
        date: NaiveDate,
    ) -> Result<Vec<TeeTimeRecord>, ScraperError> {
        let url = self.list_url(seq, date)?;
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| ScraperError::from_send(e, &url, self.timeout_ms))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ScraperError::UnexpectedStatus {
                status: status.as_u16(),
                url,
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| ScraperError::from_send(e, &url, self.timeout_ms))?;
        let context = format!("tee-time list for {club_name}");
        let value = serde_json::from_str::<serde_json::Value>(&body).map_err(|e| {
            ScraperError::Deserialize {
                context: context.clone(),
                source: e,
            }
        })?;
        let parsed = serde_json::from_value::<TeeTimeListResponse>(value).map_err(|e| {
            ScraperError::UpstreamFormat {
                context,
                reason: e.to_string(),
            }
        })?;

        let slots = parsed.into_slots();
        tracing::debug!(club = %club_name, %date, slots = slots.len(), "teescanner slots fetched");

        Ok(slots
            .into_iter()
            .filter_map(|slot| slot_to_record(slot, club_name, date))
            .collect())
    }

    async fn fetch_club(
        &self,
        club: &Club,
        seq: &str,
        date: NaiveDate,
    ) -> Option<Vec<TeeTimeRecord>> {
        match self.fetch_club_slots(seq, &club.name, date).await {
            Ok(records) => Some(records),
            Err(e) => {
                tracing::warn!(
                    club = %club.name,
                    %date,
                    error = %e,
                    "teescanner club lookup failed"
                );
                None
            }
        }
    }

    /// Builds the list URL with the query string the endpoint expects.
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError::InvalidUrl`] if the base URL does not parse.
    fn list_url(&self, seq: &str, date: NaiveDate) -> Result<String, ScraperError> {
        let base = format!("{}{LIST_PATH}", self.base_url);
        let mut url = reqwest::Url::parse(&base).map_err(|e| ScraperError::InvalidUrl {
            url: base.clone(),
            reason: e.to_string(),
        })?;
        url.query_pairs_mut()
            .append_pair("golfclub_seq", seq)
            .append_pair("roundDay", &date.format("%Y-%m-%d").to_string())
            .append_pair("orderType", "");
        Ok(url.to_string())
    }
}

fn slot_to_record(slot: TeeTimeSlot, club_name: &str, date: NaiveDate) -> Option<TeeTimeRecord> {
    let Some(hour) = slot.teetime_time.as_deref().and_then(parse_hour) else {
        tracing::debug!(
            club = %club_name,
            raw_time = ?slot.teetime_time,
            "teescanner slot without a readable time dropped"
        );
        return None;
    };
    let price = price_from_json(&slot.price);
    Some(TeeTimeRecord::new(
        club_name,
        date,
        hour,
        price,
        SourceId::Teescanner,
        BOOKING_URL,
    ))
}

impl TeeTimeSource for TeescannerClient {
    fn source_id(&self) -> SourceId {
        SourceId::Teescanner
    }

    async fn fetch(
        &self,
        date: NaiveDate,
        clubs: &ClubDirectory,
    ) -> Result<FetchReport, ScraperError> {
        let mut report = FetchReport::default();

        for club in clubs.clubs() {
            let Some(seq) = club.teescanner_seq.as_deref() else {
                continue;
            };
            report.attempted_units += 1;
            match self.fetch_club(club, seq, date).await {
                Some(records) => report.records.extend(records),
                None => report.failed_units += 1,
            }
        }

        tracing::info!(
            %date,
            records = report.records.len(),
            clubs = report.attempted_units,
            failed = report.failed_units,
            "teescanner fetch complete"
        );
        report.into_result(SourceId::Teescanner)
    }
}
