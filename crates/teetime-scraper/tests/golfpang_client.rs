//! Integration tests for `GolfpangClient` and the circuit-breaker wrapper.
//!
//! A `wiremock` server stands in for the listing endpoint. Form fields are
//! matched on the raw request body.

use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use teetime_core::{ClubDirectory, ClubEntry, SourceId};
use teetime_scraper::{
    BreakerConfig, CallBudget, CircuitBreaker, CircuitState, GolfpangClient, ResilientSource,
    RetryPolicy, ScraperError, TeeTimeSource,
};

const LISTING_PATH: &str = "/web/round/booking_tblList.do";

fn day() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 7, 1).unwrap()
}

fn client(server: &MockServer, retry: RetryPolicy) -> GolfpangClient {
    GolfpangClient::new(
        &server.uri(),
        CallBudget {
            connect: Duration::from_millis(500),
            read: Duration::from_millis(500),
        },
        retry,
        "teetime-test/0.1",
        false,
    )
    .expect("failed to build test client")
}

fn directory() -> ClubDirectory {
    ClubDirectory::from_entries(vec![ClubEntry {
        name: Some("레이크사이드".to_string()),
        seq: None,
        golfpang_code: Some("345".to_string()),
        address: "경기도 용인시".to_string(),
    }])
}

fn row(name: &str, time: &str, price: &str) -> String {
    format!(
        r##"<tr id="tr_{time}">
            <td><span class="club_name">{name}</span></td>
            <td class="date">2025-07-01</td>
            <td>{time}</td>
            <td>18홀</td>
            <td><span class="price">{price}</span></td>
            <td><a href="#">예약</a></td>
        </tr>"##
    )
}

fn page(rows: &[String]) -> String {
    format!("<tr><th>골프장</th></tr>{}", rows.concat())
}

async fn mount_page(server: &MockServer, page_num: u32, body: String) {
    Mock::given(method("POST"))
        .and(path(LISTING_PATH))
        .and(body_string_contains(format!("pageNum={page_num}&")))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .mount(server)
        .await;
}

#[tokio::test]
async fn pages_until_a_page_yields_no_rows() {
    let server = MockServer::start().await;

    mount_page(
        &server,
        1,
        page(&[
            row("레이크사이드CC", "07:10", "85,000"),
            row("레이크사이드CC", "07:40", "88,000"),
        ]),
    )
    .await;
    mount_page(&server, 2, page(&[row("레이크사이드CC", "12:05", "문의")])).await;
    mount_page(&server, 3, page(&[])).await;

    let report = client(&server, RetryPolicy::none())
        .fetch(day(), &directory())
        .await
        .expect("fetch ok");

    let summary: Vec<_> = report
        .records
        .iter()
        .map(|r| (r.hour_label.as_str(), r.price))
        .collect();
    assert_eq!(
        summary,
        vec![("07시대", Some(85_000)), ("07시대", Some(88_000)), ("12시대", None)]
    );
    assert!(report.records.iter().all(|r| r.club == "레이크사이드"));
    assert!(report.records.iter().all(|r| r.source == SourceId::Golfpang));
    assert_eq!(report.attempted_units, 1);
    assert_eq!(report.failed_units, 0);
}

#[tokio::test]
async fn sends_the_listing_form_fields() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(LISTING_PATH))
        .and(body_string_contains("bkOrder=clubname_desc"))
        .and(body_string_contains("rd_date=2025-07-01"))
        .and(body_string_contains("sector=5"))
        .and(body_string_contains("clubname=345"))
        .respond_with(ResponseTemplate::new(200).set_body_string(page(&[])))
        .expect(1)
        .mount(&server)
        .await;

    let report = client(&server, RetryPolicy::none())
        .fetch(day(), &directory())
        .await
        .expect("fetch ok");
    assert!(report.records.is_empty());
}

#[tokio::test]
async fn retries_transient_status_then_succeeds() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(LISTING_PATH))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    mount_page(&server, 1, page(&[row("레이크사이드CC", "09:00", "90,000")])).await;
    mount_page(&server, 2, page(&[])).await;

    let retry = RetryPolicy::new(2, Duration::from_millis(5));
    let report = client(&server, retry)
        .fetch(day(), &directory())
        .await
        .expect("recovered after retry");
    assert_eq!(report.records.len(), 1);
}

#[tokio::test]
async fn non_retriable_status_is_not_retried() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(LISTING_PATH))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;

    let retry = RetryPolicy::new(3, Duration::from_millis(5));
    let result = client(&server, retry)
        .fetch_page(teetime_core::Sector::Gyeonggi, "345", day(), 1)
        .await;
    assert!(
        matches!(result, Err(ScraperError::UnexpectedStatus { status: 404, .. })),
        "expected UnexpectedStatus, got: {result:?}"
    );
}

#[tokio::test]
async fn slow_listing_times_out() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(LISTING_PATH))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(3)))
        .mount(&server)
        .await;

    let result = client(&server, RetryPolicy::none())
        .fetch_page(teetime_core::Sector::Gyeonggi, "345", day(), 1)
        .await;
    assert!(
        matches!(result, Err(ScraperError::Timeout { .. })),
        "expected Timeout, got: {result:?}"
    );
}

#[tokio::test]
async fn failure_after_first_page_keeps_collected_rows() {
    let server = MockServer::start().await;

    mount_page(&server, 1, page(&[row("레이크사이드CC", "07:10", "85,000")])).await;
    Mock::given(method("POST"))
        .and(path(LISTING_PATH))
        .and(body_string_contains("pageNum=2&"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let report = client(&server, RetryPolicy::none())
        .fetch(day(), &directory())
        .await
        .expect("partial rows survive");
    assert_eq!(report.records.len(), 1);
    assert_eq!(report.failed_units, 0);
}

#[tokio::test]
async fn favorites_filter_drops_other_names() {
    let server = MockServer::start().await;

    mount_page(
        &server,
        1,
        page(&[row("레이크사이드CC", "07:10", "85,000"), row("남촌CC", "07:20", "60,000")]),
    )
    .await;
    mount_page(&server, 2, page(&[row("남촌CC", "08:20", "60,000")])).await;

    let report = client(&server, RetryPolicy::none())
        .with_favorites(vec!["레이크".to_string()])
        .fetch(day(), &directory())
        .await
        .expect("fetch ok");
    assert_eq!(report.records.len(), 1);
    assert_eq!(report.records[0].price, Some(85_000));
}

#[tokio::test]
async fn every_club_failing_is_source_unavailable() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(LISTING_PATH))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let result = client(&server, RetryPolicy::none())
        .fetch(day(), &directory())
        .await;
    assert!(
        matches!(
            result,
            Err(ScraperError::SourceUnavailable {
                source_id: SourceId::Golfpang,
                failed: 1
            })
        ),
        "expected SourceUnavailable, got: {result:?}"
    );
}

#[tokio::test]
async fn open_circuit_stops_calling_the_listing() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(LISTING_PATH))
        .respond_with(ResponseTemplate::new(500))
        .expect(3)
        .mount(&server)
        .await;

    let breaker = Arc::new(CircuitBreaker::new(BreakerConfig::default()));
    let source = ResilientSource::new(client(&server, RetryPolicy::none()), Arc::clone(&breaker));
    let clubs = directory();

    for _ in 0..3 {
        assert!(source.fetch(day(), &clubs).await.is_err());
    }
    assert_eq!(breaker.state(), CircuitState::Open);

    let skipped = source.fetch(day(), &clubs).await.expect("skip is not an error");
    assert!(skipped.skipped);
    assert!(skipped.records.is_empty());
}
