use qrcheckin::core::normalizer::{Field, HeaderMap, normalize_reader, normalize_str};
use qrcheckin::errors::AppError;

#[test]
fn korean_headers_map_to_canonical_fields() {
    let csv = "이름,소속,전화번호,차량번호\n홍길동,서울센터,010-1111-2222,12가3456\n";
    let rows = normalize_str(csv).expect("parse");

    assert_eq!(rows.len(), 1);
    let a = &rows[0];
    assert_eq!(a.name, "홍길동");
    assert_eq!(a.affiliation, "서울센터");
    assert_eq!(a.phone, "010-1111-2222");
    assert_eq!(a.vehicle, "12가3456");
    assert!(!a.checked_in);
    assert!(a.checked_in_at.is_none());
}

#[test]
fn name_is_found_regardless_of_column_order() {
    let csv = "Phone,Group,Full Name\n010-1,Team A,Kim\n";
    let rows = normalize_str(csv).expect("parse");

    assert_eq!(rows[0].name, "Kim");
    assert_eq!(rows[0].phone, "010-1");
    assert_eq!(rows[0].affiliation, "Team A");
}

#[test]
fn missing_columns_yield_empty_fields() {
    let rows = normalize_str("Name\nLee\n").expect("parse");

    assert_eq!(rows[0].name, "Lee");
    assert_eq!(rows[0].phone, "");
    assert_eq!(rows[0].vehicle, "");
    assert_eq!(rows[0].event_name, None);
}

#[test]
fn event_name_header_does_not_steal_the_name_column() {
    let csv = "Event Name,Name,Tel,Disability,Assistive Device\nForum,Park,010-9,visual,cane\n";
    let rows = normalize_str(csv).expect("parse");

    let a = &rows[0];
    assert_eq!(a.name, "Park");
    assert_eq!(a.event_name.as_deref(), Some("Forum"));
    assert_eq!(a.disability.as_deref(), Some("visual"));
    assert_eq!(a.assistive_device.as_deref(), Some("cane"));
}

#[test]
fn bom_blank_lines_and_padding_are_ignored() {
    let csv = "\u{feff}이름,전화\n  Hong , 010-1111-2222 \n,\n\nKim,010-3\n";
    let rows = normalize_str(csv).expect("parse");

    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].name, "Hong");
    assert_eq!(rows[0].phone, "010-1111-2222");
    assert_eq!(rows[1].name, "Kim");
}

#[test]
fn header_map_resolves_each_column_once() {
    let headers = csv::StringRecord::from(vec!["Name", "Phone", "Car"]);
    let map = HeaderMap::resolve(&headers);

    assert_eq!(map.column(Field::Name), Some(0));
    assert_eq!(map.column(Field::Phone), Some(1));
    assert_eq!(map.column(Field::Vehicle), Some(2));
    assert_eq!(map.column(Field::Affiliation), None);
}

#[test]
fn undecodable_csv_is_a_parse_error() {
    // Latin-1 bytes in a data row
    let bytes: &[u8] = b"Name,Phone\nJos\xe9,010-1\n";
    let err = normalize_reader(bytes).unwrap_err();
    assert!(matches!(err, AppError::Csv(_)));
    assert!(err.to_string().starts_with("CSV parse error"));

    let bytes: &[u8] = b"\xff\xfeN\x00a\x00\n";
    assert!(matches!(normalize_reader(bytes), Err(AppError::Csv(_))));
}

#[test]
fn ragged_rows_keep_the_cells_they_have() {
    let rows = normalize_str("Name,Affiliation,Phone\nKim,Busan\nLee,Seoul,010-2,extra\n").unwrap();

    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].phone, "");
    assert_eq!(rows[1].phone, "010-2");
}
