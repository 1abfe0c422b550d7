use std::io::Write;

use super::*;

fn entries(json: &str) -> Vec<ClubEntry> {
    serde_json::from_str(json).expect("valid club json")
}

#[test]
fn sector_from_address_maps_known_provinces() {
    assert_eq!(Sector::from_address("경기도 용인시"), Some(Sector::Gyeonggi));
    assert_eq!(Sector::from_address("충청북도 충주시"), Some(Sector::Chungcheong));
    assert_eq!(Sector::from_address("강원특별자치도 춘천시"), Some(Sector::Gangwon));
    assert_eq!(Sector::from_address("전라남도 해남군"), Some(Sector::Jeolla));
}

#[test]
fn sector_from_address_rejects_unknown_province() {
    assert_eq!(Sector::from_address("제주특별자치도 서귀포시"), None);
    assert_eq!(Sector::from_address(""), None);
}

#[test]
fn sector_codes_match_listing_form_values() {
    assert_eq!(Sector::Gyeonggi.code(), "5");
    assert_eq!(Sector::Chungcheong.code(), "4");
    assert_eq!(Sector::Gangwon.code(), "8");
    assert_eq!(Sector::Jeolla.code(), "16");
}

#[test]
fn entry_accepts_numeric_and_string_ids() {
    let parsed = entries(
        r#"[
            {"name": "Lakeside CC", "seq": 101, "Golpang_code": "LK01", "address": "경기도 용인시"},
            {"name": "Hill GC", "seq": "202", "Golpang_code": 77, "address": "강원도 원주시"}
        ]"#,
    );
    assert_eq!(parsed[0].seq.as_deref(), Some("101"));
    assert_eq!(parsed[0].golfpang_code.as_deref(), Some("LK01"));
    assert_eq!(parsed[1].seq.as_deref(), Some("202"));
    assert_eq!(parsed[1].golfpang_code.as_deref(), Some("77"));
}

#[test]
fn entry_tolerates_missing_and_null_ids() {
    let parsed = entries(r#"[{"name": "Bare CC"}, {"name": "Null CC", "seq": null}]"#);
    assert!(parsed[0].seq.is_none());
    assert!(parsed[0].golfpang_code.is_none());
    assert!(parsed[1].seq.is_none());
    assert_eq!(parsed[0].address, "");
}

#[test]
fn directory_dedupes_by_display_name_first_wins() {
    let dir = ClubDirectory::from_entries(entries(
        r#"[
            {"name": "Lakeside CC", "seq": 1},
            {"name": "Lakeside CC", "seq": 2},
            {"name": "Hill GC", "seq": 3}
        ]"#,
    ));
    assert_eq!(dir.len(), 2);
    assert_eq!(dir.clubs()[0].teescanner_seq.as_deref(), Some("1"));
}

#[test]
fn directory_skips_entries_without_name() {
    let dir = ClubDirectory::from_entries(entries(
        r#"[{"seq": 1}, {"name": "  ", "seq": 2}, {"name": "Real CC"}]"#,
    ));
    assert_eq!(dir.len(), 1);
    assert_eq!(dir.clubs()[0].name, "Real CC");
}

#[test]
fn directory_derives_sector_from_address() {
    let dir = ClubDirectory::from_entries(entries(
        r#"[
            {"name": "A CC", "address": "경기도 이천시"},
            {"name": "B CC", "address": "제주시"}
        ]"#,
    ));
    assert_eq!(dir.clubs()[0].sector, Some(Sector::Gyeonggi));
    assert_eq!(dir.clubs()[1].sector, None);
}

#[test]
fn display_names_are_sorted() {
    let dir = ClubDirectory::from_entries(entries(
        r#"[{"name": "Zeta CC"}, {"name": "Alpha GC"}, {"name": "Mid CC"}]"#,
    ));
    assert_eq!(dir.display_names(), vec!["Alpha GC", "Mid CC", "Zeta CC"]);
}

#[test]
fn load_clubs_reads_json_file() {
    let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
    write!(
        file,
        r#"[{{"name": "Lakeside CC", "seq": 101, "address": "경기도 용인시"}}]"#
    )
    .unwrap();
    let dir = load_clubs(file.path()).expect("load json");
    assert_eq!(dir.display_names(), vec!["Lakeside CC"]);
}

#[test]
fn load_clubs_reads_yaml_file() {
    let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
    writeln!(
        file,
        "- name: Hill GC\n  seq: 5\n  Golpang_code: H1\n  address: 충청남도 천안시"
    )
    .unwrap();
    let dir = load_clubs(file.path()).expect("load yaml");
    let club = &dir.clubs()[0];
    assert_eq!(club.golfpang_code.as_deref(), Some("H1"));
    assert_eq!(club.sector, Some(Sector::Chungcheong));
}

#[test]
fn load_clubs_missing_file_is_io_error() {
    let result = load_clubs(Path::new("/nonexistent/golf_clubs.json"));
    assert!(
        matches!(result, Err(ConfigError::ClubsFileIo { .. })),
        "expected ClubsFileIo, got: {result:?}"
    );
}

#[test]
fn load_clubs_malformed_file_is_parse_error() {
    let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
    write!(file, "{{not json").unwrap();
    let result = load_clubs(file.path());
    assert!(
        matches!(result, Err(ConfigError::ClubsFileParse { .. })),
        "expected ClubsFileParse, got: {result:?}"
    );
}
