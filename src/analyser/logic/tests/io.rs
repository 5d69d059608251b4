use super::*;

#[test]
fn test_parse_strips_bom_and_infers_kinds() {
    let data = dataset(concat!(
        "\u{feff}id,joined,active,city\n",
        "1,2024-01-02,yes,Paris\n",
        "2,2024-02-03,no,Paris\n",
        "3,2024-03-04,yes,Paris\n",
    ));
    assert_eq!(data.column_names(), ["id", "joined", "active", "city"]);
    let stats = profile(&data);
    assert_eq!(stats.data_types["id"], ColumnKind::Numeric);
    assert_eq!(stats.data_types["joined"], ColumnKind::Datetime);
    assert_eq!(stats.data_types["active"], ColumnKind::Boolean);
    assert_eq!(stats.data_types["city"], ColumnKind::Categorical);
}

#[test]
fn test_missing_tokens() {
    let data = dataset("a,b\nNA,x\nnull,\nN/A,None\n4,y\n");
    assert_eq!(data.column("a").unwrap().missing_count(), 3);
    assert_eq!(data.column("b").unwrap().missing_count(), 2);
}

#[test]
fn test_duplicate_and_blank_headers() {
    let data = dataset("a,a,,a\n1,2,3,4\n");
    assert_eq!(data.column_names(), ["a", "a.1", "Unnamed: 2", "a.2"]);
}

#[test]
fn test_ragged_rows_are_parse_errors() {
    let err = parse_csv(b"a,b\n1,2\n3\n", 0.5).unwrap_err();
    assert_eq!(err.kind(), "parse_error");
}

#[test]
fn test_invalid_utf8_is_parse_error() {
    let err = parse_csv(&[b'a', b'\n', 0xff, 0xfe, b'\n'], 0.5).unwrap_err();
    assert_eq!(err.kind(), "parse_error");
}

#[test]
fn test_empty_upload_is_parse_error() {
    assert_eq!(parse_csv(b"", 0.5).unwrap_err().kind(), "parse_error");
    assert_eq!(parse_csv(b"  \n", 0.5).unwrap_err().kind(), "parse_error");
}

#[test]
fn test_header_only_is_empty_dataset() {
    let data = dataset("a,b\n");
    assert_eq!(data.shape(), (0, 2));
}

#[test]
fn test_quoted_fields_survive_round_trip() {
    let csv = "name,note\n\"Smith, J\",\"said \"\"hi\"\"\"\nLee,\n";
    let data = dataset(csv);
    let written = write_csv(&data).unwrap();
    let reparsed = parse_csv(&written, 0.5).unwrap();
    assert_eq!(reparsed, data);
    assert_eq!(data.column("name").unwrap().cell(0), Some("Smith, J"));
}

#[test]
fn test_reparsed_export_reproduces_profile() {
    let data = dataset(concat!(
        "a,b,c\n",
        "1,x,2024-01-01\n",
        "2.50,y,\n",
        ",x,2024-01-03\n",
        "1,x,2024-01-01\n",
        "1e3,z,2024-01-05\n",
    ));
    let reparsed = parse_csv(&write_csv(&data).unwrap(), 0.5).unwrap();
    assert_eq!(profile(&reparsed), profile(&data));
}

#[test]
fn test_written_csv_leaves_missing_cells_empty() {
    let data = dataset("a,b\n1,NA\n2,y\n");
    let written = write_csv(&data).unwrap();
    assert_eq!(String::from_utf8(written).unwrap(), "a,b\n1,\n2,y\n");
}

#[test]
fn test_short_row_reports_its_line() {
    let err = parse_csv(b"a,b\n1,2\n3,4\n5\n", 0.5).unwrap_err();
    assert_eq!(err.message(), "Line 4 has fewer fields than the header");
}

#[test]
fn test_long_row_is_parse_error() {
    let err = parse_csv(b"a,b\n1,2,3\n", 0.5).unwrap_err();
    assert_eq!(err.kind(), "parse_error");
}
