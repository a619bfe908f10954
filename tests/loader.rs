mod common;

use common::{HEADER, SAMPLE_ROWS, TestWorkspace, accident_csv, sample_csv};
use encoding_rs::{EUC_KR, UTF_8};
use marine_accidents::loader;

#[test]
fn loads_cp949_file_and_normalizes_fields() {
    let workspace = TestWorkspace::new();
    let path = workspace.write_cp949("accidents.csv", &sample_csv());
    let dataset = loader::load_dataset(&path, b',', EUC_KR).expect("load cp949 dataset");

    assert_eq!(dataset.len(), 3);
    let first = &dataset.records()[0];
    assert_eq!(first.accident_type.as_deref(), Some("충돌"));
    assert_eq!(first.coast_guard_jurisdiction.as_deref(), Some("부산해양경찰서"));
    assert_eq!(first.month, Some(1));
    assert_eq!(first.tonnage, Some(9.77));
    assert_eq!(first.latitude, Some(35.0 + 5.0 / 60.0));
    assert_eq!(first.longitude, Some(129.0 + 2.0 / 60.0 + 30.0 / 3600.0));

    let capsize = &dataset.records()[2];
    assert_eq!(capsize.latitude_raw.as_deref(), Some("35|0"));
    assert_eq!(capsize.latitude, None);
    assert_eq!(dataset.report().unlocated, 1);
    assert_eq!(dataset.report().unparsed_dates, 0);
}

#[test]
fn header_whitespace_and_bom_are_ignored() {
    let workspace = TestWorkspace::new();
    let mut header = HEADER.to_vec();
    header[8] = "선종";
    let text = format!("\u{feff}{}", accident_csv(&header, &SAMPLE_ROWS[..1]));
    let path = workspace.write("accidents.csv", &text);
    let dataset = loader::load_dataset(&path, b',', UTF_8).expect("load utf-8 dataset");
    assert_eq!(dataset.records()[0].vessel_type.as_deref(), Some("어선"));
}

#[test]
fn missing_column_names_the_column() {
    let workspace = TestWorkspace::new();
    let text = format!("{}\n{}\n", HEADER[..14].join(","), SAMPLE_ROWS[0][..14].join(","));
    let path = workspace.write_cp949("accidents.csv", &text);
    let err = loader::load_dataset(&path, b',', EUC_KR).expect_err("missing column");
    assert!(format!("{err:#}").contains("Missing required column '경도'"));
}

#[test]
fn undecodable_bytes_are_fatal() {
    let workspace = TestWorkspace::new();
    let path = workspace.write_cp949("accidents.csv", &sample_csv());
    let err = loader::load_dataset(&path, b',', UTF_8).expect_err("encoding mismatch");
    assert!(format!("{err:#}").contains("Failed to decode"));
}

#[test]
fn malformed_fields_degrade_to_none() {
    let workspace = TestWorkspace::new();
    let mut row = SAMPLE_ROWS[0];
    row[0] = "어제";
    row[1] = "";
    row[9] = "많음";
    row[10] = "-";
    let path = workspace.write_cp949("accidents.csv", &accident_csv(&HEADER, &[row]));
    let dataset = loader::load_dataset(&path, b',', EUC_KR).expect("load dataset");
    let record = &dataset.records()[0];
    assert_eq!(record.occurred_at, None);
    assert_eq!(record.month, None);
    assert_eq!(record.tonnage, None);
    assert_eq!(record.injured, None);
    assert_eq!(dataset.report().unparsed_dates, 1);
}
