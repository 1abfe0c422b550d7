use std::collections::HashSet;
use std::time::Duration;

use super::*;

fn day(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 7, d).unwrap()
}

fn rec(
    club: &str,
    date: NaiveDate,
    hour: u8,
    price: Option<u32>,
    source: SourceId,
) -> TeeTimeRecord {
    let url = match source {
        SourceId::Teescanner => "https://www.teescanner.com/",
        SourceId::Golfpang => "https://www.golfpang.com/",
    };
    TeeTimeRecord::new(club, date, hour, price, source, url)
}

fn all_days() -> TeeTimeQuery {
    TeeTimeQuery::new(day(1), day(31))
}

#[test]
fn equal_price_prefers_teescanner_in_either_order() {
    let a = rec("A", day(1), 9, Some(80_000), SourceId::Teescanner);
    let b = rec("A", day(1), 9, Some(80_000), SourceId::Golfpang);

    for input in [vec![a.clone(), b.clone()], vec![b, a]] {
        let out = consolidate(input, &all_days());
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].price, Some(80_000));
        assert_eq!(out[0].source, SourceId::Teescanner);
        assert_eq!(out[0].booking_url, "https://www.teescanner.com/");
    }
}

#[test]
fn lower_price_wins_regardless_of_source() {
    let out = consolidate(
        vec![
            rec("A", day(1), 9, Some(90_000), SourceId::Teescanner),
            rec("A", day(1), 9, Some(85_000), SourceId::Golfpang),
        ],
        &all_days(),
    );
    assert_eq!(out.len(), 1);
    assert_eq!(out[0].price, Some(85_000));
    assert_eq!(out[0].source, SourceId::Golfpang);
}

#[test]
fn unknown_price_never_beats_a_known_one() {
    let out = consolidate(
        vec![
            rec("A", day(1), 9, Some(250_000), SourceId::Golfpang),
            rec("A", day(1), 9, None, SourceId::Teescanner),
        ],
        &all_days(),
    );
    assert_eq!(out[0].price, Some(250_000));

    let out = consolidate(
        vec![
            rec("A", day(1), 9, None, SourceId::Teescanner),
            rec("A", day(1), 9, Some(250_000), SourceId::Golfpang),
        ],
        &all_days(),
    );
    assert_eq!(out[0].price, Some(250_000));
}

#[test]
fn same_source_tie_goes_to_the_later_record() {
    let mut first = rec("A", day(1), 9, Some(80_000), SourceId::Golfpang);
    first.booking_url = "https://www.golfpang.com/first".to_string();
    let mut second = first.clone();
    second.booking_url = "https://www.golfpang.com/second".to_string();

    let out = consolidate(vec![first, second], &all_days());
    assert_eq!(out[0].booking_url, "https://www.golfpang.com/second");
}

#[test]
fn hour_filter_drops_records_outside_the_set() {
    let query = all_days().with_hours([9, 10]);
    let out = consolidate(
        vec![
            rec("A", day(1), 9, Some(80_000), SourceId::Teescanner),
            rec("A", day(1), 14, Some(60_000), SourceId::Teescanner),
        ],
        &query,
    );
    assert_eq!(out.len(), 1);
    assert_eq!(out[0].hour_label, "09시대");
}

#[test]
fn favorites_filter_is_exact_match() {
    let query = all_days().with_favorites(["레이크사이드"]);
    let out = consolidate(
        vec![
            rec("레이크사이드", day(1), 9, Some(80_000), SourceId::Teescanner),
            rec("레이크사이드CC", day(1), 9, Some(70_000), SourceId::Golfpang),
            rec("남촌", day(1), 9, Some(60_000), SourceId::Teescanner),
        ],
        &query,
    );
    let clubs: Vec<_> = out.iter().map(|r| r.club.as_str()).collect();
    assert_eq!(clubs, vec!["레이크사이드"]);
}

#[test]
fn distinct_keys_are_all_kept_with_short_dates() {
    let out = consolidate(
        vec![
            rec("A", day(1), 9, Some(80_000), SourceId::Teescanner),
            rec("A", day(1), 10, Some(80_000), SourceId::Teescanner),
            rec("B", day(1), 9, Some(80_000), SourceId::Teescanner),
            rec("A", day(2), 9, Some(80_000), SourceId::Teescanner),
        ],
        &all_days(),
    );
    assert_eq!(out.len(), 4);
    let dates: HashSet<_> = out.iter().map(|r| r.date.as_str()).collect();
    assert_eq!(dates, HashSet::from(["07/01", "07/02"]));
}

#[test]
fn day_count_is_inclusive_and_zero_when_inverted() {
    assert_eq!(TeeTimeQuery::new(day(1), day(1)).day_count(), 1);
    assert_eq!(TeeTimeQuery::new(day(1), day(7)).day_count(), 7);
    assert_eq!(TeeTimeQuery::new(day(7), day(1)).day_count(), 0);
}

#[test]
fn query_deserializes_with_optional_filters() {
    let q: TeeTimeQuery =
        serde_json::from_str(r#"{"start_date":"2025-07-01","end_date":"2025-07-03"}"#).unwrap();
    assert_eq!(q, TeeTimeQuery::new(day(1), day(3)));

    let q: TeeTimeQuery = serde_json::from_str(
        r#"{"start_date":"2025-07-01","end_date":"2025-07-03","hour_range":[6,7],"favorite_clubs":["A"]}"#,
    )
    .unwrap();
    assert_eq!(q.hour_range, vec![6, 7]);
    assert_eq!(q.favorite_clubs, vec!["A".to_string()]);
}

#[test]
fn null_filters_deserialize_as_no_filter() {
    let q: TeeTimeQuery = serde_json::from_str(
        r#"{"start_date":"2025-07-01","end_date":"2025-07-02","hour_range":null,"favorite_clubs":null}"#,
    )
    .unwrap();
    assert_eq!(q, TeeTimeQuery::new(day(1), day(2)));

    let records = vec![
        rec("A", day(1), 6, Some(70_000), SourceId::Teescanner),
        rec("B", day(2), 14, Some(90_000), SourceId::Golfpang),
    ];
    assert_eq!(consolidate(records, &q).len(), 2);
}

#[tokio::test]
async fn query_reads_only_the_requested_range() {
    let store = CacheStore::new(Duration::from_millis(50));
    store
        .put(day(1), vec![rec("A", day(1), 9, Some(80_000), SourceId::Teescanner)])
        .await
        .unwrap();
    store
        .put(day(5), vec![rec("A", day(5), 9, Some(80_000), SourceId::Teescanner)])
        .await
        .unwrap();

    let out = query(&store, &TeeTimeQuery::new(day(1), day(3))).await;
    assert_eq!(out.len(), 1);
    assert_eq!(out[0].date, "07/01");
}

#[tokio::test]
async fn query_is_idempotent_on_an_unchanged_cache() {
    let store = CacheStore::new(Duration::from_millis(50));
    store
        .put(
            day(1),
            vec![
                rec("A", day(1), 9, Some(80_000), SourceId::Golfpang),
                rec("A", day(1), 9, Some(80_000), SourceId::Teescanner),
                rec("B", day(1), 7, None, SourceId::Golfpang),
            ],
        )
        .await
        .unwrap();

    let request = TeeTimeQuery::new(day(1), day(1));
    let first = query(&store, &request).await;
    let second = query(&store, &request).await;
    assert_eq!(first, second);
    assert_eq!(first.len(), 2);
}
