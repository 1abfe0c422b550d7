//! Source B: Golfpang's HTML booking listing.
//!
//! Clubs are grouped by sector. For each club the listing endpoint is paged
//! until a page yields no accepted rows. Every POST goes through
//! [`retry_with_backoff`] and a per-attempt deadline; a failing page ends that
//! club's paging but keeps the rows already collected.

mod extract;
mod html;

use std::collections::BTreeMap;

use chrono::NaiveDate;
use reqwest::Client;
use teetime_core::{Club, ClubDirectory, Sector, SourceId, TeeTimeRecord};

use crate::error::ScraperError;
use crate::retry::{retry_with_backoff, with_deadline, CallBudget, RetryPolicy, RETRIABLE_STATUSES};
use crate::source::{FetchReport, TeeTimeSource};

pub use extract::{extract_page, Candidate, PageExtract, Rejection};

const LISTING_PATH: &str = "/web/round/booking_tblList.do";
pub const BOOKING_URL: &str = "https://www.golfpang.com/";

/// Loop guard for a listing that never runs dry.
pub const MAX_PAGES: u32 = 50;

/// HTTP client for the Golfpang listing endpoint.
pub struct GolfpangClient {
    client: Client,
    listing_url: String,
    retry: RetryPolicy,
    budget: CallBudget,
    favorites: Vec<String>,
}

impl GolfpangClient {
    /// Creates a client with separate connect and read budgets.
    ///
    /// `accept_invalid_certs` disables TLS verification; the upstream has
    /// served an incomplete chain in the past.
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError::Transport`] if the `reqwest::Client` cannot be
    /// built.
    pub fn new(
        base_url: &str,
        budget: CallBudget,
        retry: RetryPolicy,
        user_agent: &str,
        accept_invalid_certs: bool,
    ) -> Result<Self, ScraperError> {
        let client = Client::builder()
            .connect_timeout(budget.connect)
            .read_timeout(budget.read)
            .user_agent(user_agent)
            .danger_accept_invalid_certs(accept_invalid_certs)
            .build()?;
        Ok(Self {
            client,
            listing_url: format!("{}{LISTING_PATH}", base_url.trim_end_matches('/')),
            retry,
            budget,
            favorites: Vec::new(),
        })
    }

    /// Restricts accepted rows to names containing one of `favorites`.
    /// Blank entries are ignored; an empty list disables the filter.
    #[must_use]
    pub fn with_favorites(mut self, favorites: Vec<String>) -> Self {
        self.favorites = favorites
            .into_iter()
            .map(|f| f.trim().to_string())
            .filter(|f| !f.is_empty())
            .collect();
        self
    }

    /// Fetches one listing page, retrying transient failures.
    ///
    /// # Errors
    ///
    /// - [`ScraperError::Timeout`] when an attempt exceeds its budget.
    /// - [`ScraperError::RetriableStatus`] once retries are exhausted on
    ///   429/5xx.
    /// - [`ScraperError::UnexpectedStatus`] for any other non-2xx status.
    pub async fn fetch_page(
        &self,
        sector: Sector,
        code: &str,
        date: NaiveDate,
        page: u32,
    ) -> Result<String, ScraperError> {
        let form = [
            ("pageNum", page.to_string()),
            ("bkOrder", "clubname_desc".to_string()),
            ("rd_date", date.format("%Y-%m-%d").to_string()),
            ("ampm", String::new()),
            ("sector", sector.code().to_string()),
            ("clubname", code.to_string()),
        ];

        retry_with_backoff(&self.retry, || {
            with_deadline(&self.listing_url, self.budget.total(), self.post_listing(&form))
        })
        .await
    }

    async fn post_listing(&self, form: &[(&str, String)]) -> Result<String, ScraperError> {
        let url = &self.listing_url;
        let budget_ms = u64::try_from(self.budget.total().as_millis()).unwrap_or(u64::MAX);

        let response = self
            .client
            .post(url)
            .header("Accept", "*/*")
            .form(form)
            .send()
            .await
            .map_err(|e| ScraperError::from_send(e, url, budget_ms))?;

        let status = response.status().as_u16();
        if RETRIABLE_STATUSES.contains(&status) {
            return Err(ScraperError::RetriableStatus {
                status,
                url: url.clone(),
            });
        }
        if !response.status().is_success() {
            return Err(ScraperError::UnexpectedStatus {
                status,
                url: url.clone(),
            });
        }

        response
            .text()
            .await
            .map_err(|e| ScraperError::from_send(e, url, budget_ms))
    }

    /// Pages through one club's listing, appending accepted rows to `report`.
    async fn crawl_club(
        &self,
        club: &Club,
        sector: Sector,
        code: &str,
        date: NaiveDate,
        report: &mut FetchReport,
    ) {
        report.attempted_units += 1;
        let mut collected = 0usize;

        for page in 1..=MAX_PAGES {
            let body = match self.fetch_page(sector, code, date, page).await {
                Ok(body) => body,
                Err(e) => {
                    tracing::warn!(
                        club = %club.name,
                        %sector,
                        page,
                        error = %e,
                        "golfpang page failed, keeping rows collected so far"
                    );
                    if collected == 0 {
                        report.failed_units += 1;
                    }
                    return;
                }
            };

            let extracted = extract_page(&body, date, &self.favorites);
            tracing::debug!(
                club = %club.name,
                %sector,
                page,
                rows = extracted.rows_seen,
                accepted = extracted.candidates.len(),
                "golfpang page parsed"
            );
            if extracted.candidates.is_empty() {
                return;
            }

            collected += extracted.candidates.len();
            let records = extracted
                .candidates
                .into_iter()
                .map(|c| candidate_to_record(c, &club.name));
            report.records.extend(records);
        }

        tracing::warn!(
            club = %club.name,
            %sector,
            max_pages = MAX_PAGES,
            "golfpang page cap reached"
        );
    }
}

fn candidate_to_record(candidate: Candidate, club_name: &str) -> TeeTimeRecord {
    let record = TeeTimeRecord::new(
        club_name,
        candidate.date,
        candidate.hour,
        candidate.price,
        SourceId::Golfpang,
        BOOKING_URL,
    );
    match candidate.benefit {
        Some(benefit) => record.with_benefit(benefit),
        None => record,
    }
}

/// Clubs with a Golfpang code, grouped by sector in a stable order.
fn clubs_by_sector(clubs: &ClubDirectory) -> BTreeMap<Sector, Vec<(&Club, &str)>> {
    let mut grouped: BTreeMap<Sector, Vec<(&Club, &str)>> = BTreeMap::new();
    for club in clubs.clubs() {
        let Some(code) = club.golfpang_code.as_deref() else {
            continue;
        };
        let Some(sector) = club.sector else {
            tracing::warn!(
                club = %club.name,
                address = %club.address,
                "no golfpang sector for address, skipping"
            );
            continue;
        };
        grouped.entry(sector).or_default().push((club, code));
    }
    grouped
}

impl TeeTimeSource for GolfpangClient {
    fn source_id(&self) -> SourceId {
        SourceId::Golfpang
    }

    async fn fetch(
        &self,
        date: NaiveDate,
        clubs: &ClubDirectory,
    ) -> Result<FetchReport, ScraperError> {
        let mut report = FetchReport::default();

        for (sector, members) in clubs_by_sector(clubs) {
            let before = report.records.len();
            for (club, code) in members {
                self.crawl_club(club, sector, code, date, &mut report).await;
            }
            tracing::debug!(
                %sector,
                %date,
                records = report.records.len() - before,
                "golfpang sector done"
            );
        }

        tracing::info!(
            %date,
            records = report.records.len(),
            clubs = report.attempted_units,
            failed = report.failed_units,
            "golfpang fetch complete"
        );
        report.into_result(SourceId::Golfpang)
    }
}
