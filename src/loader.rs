//! Dataset loading and normalization.
//!
//! Reads the accident file once, decodes it with the configured encoding and
//! turns every row into a typed [`Record`]. Malformed dates, numbers and
//! coordinates become absent values; only I/O, decoding and schema problems
//! (a required column missing from the header) abort the load.

use std::{io::Read, path::Path};

use anyhow::{Context, Result, bail};
use encoding_rs::Encoding;
use log::{debug, info, warn};
use serde::Serialize;

use crate::{
    data::{self, Record},
    io_utils,
};

pub const COL_OCCURRED_AT: &str = "발생일시";
pub const COL_MONTH: &str = "월별";
pub const COL_HOUR: &str = "시간대별";
pub const COL_JURISDICTION: &str = "관할해경서";
pub const COL_SEA_AREA: &str = "발생해역";
pub const COL_WEATHER: &str = "기상상태";
pub const COL_CAUSE: &str = "발생원인";
pub const COL_ACCIDENT_TYPE: &str = "발생유형";
pub const COL_VESSEL_TYPE: &str = "선 종";
pub const COL_TONNAGE: &str = "톤수";
pub const COL_INJURED: &str = "부상";
pub const COL_DEAD: &str = "사망";
pub const COL_MISSING: &str = "실종";
pub const COL_LATITUDE: &str = "위도";
pub const COL_LONGITUDE: &str = "경도";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LoadReport {
    pub rows: usize,
    pub unparsed_dates: usize,
    pub unlocated: usize,
}

impl LoadReport {
    fn from_records(records: &[Record]) -> Self {
        Self {
            rows: records.len(),
            unparsed_dates: records.iter().filter(|r| r.occurred_at.is_none()).count(),
            unlocated: records.iter().filter(|r| r.location().is_none()).count(),
        }
    }
}

/// The normalized, read-only accident dataset.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    records: Vec<Record>,
    report: LoadReport,
}

impl Dataset {
    pub fn from_records(records: Vec<Record>) -> Self {
        let report = LoadReport::from_records(&records);
        Self { records, report }
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn report(&self) -> &LoadReport {
        &self.report
    }
}

/// Header positions of every column the normalizer reads.
#[derive(Debug, Clone)]
pub struct ColumnMap {
    occurred_at: usize,
    month: usize,
    hour: usize,
    jurisdiction: usize,
    sea_area: usize,
    weather: usize,
    cause: usize,
    accident_type: usize,
    vessel_type: usize,
    tonnage: usize,
    injured: usize,
    dead: usize,
    missing: usize,
    latitude: usize,
    longitude: usize,
}

fn header_key(name: &str) -> String {
    name.trim_start_matches('\u{feff}')
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect()
}

impl ColumnMap {
    pub fn from_headers(headers: &[String]) -> Result<Self> {
        let keys = headers.iter().map(|h| header_key(h)).collect::<Vec<_>>();
        let find = |name: &str| -> Result<usize> {
            let wanted = header_key(name);
            match keys.iter().position(|key| *key == wanted) {
                Some(idx) => Ok(idx),
                None => bail!("Missing required column '{name}'"),
            }
        };
        Ok(Self {
            occurred_at: find(COL_OCCURRED_AT)?,
            month: find(COL_MONTH)?,
            hour: find(COL_HOUR)?,
            jurisdiction: find(COL_JURISDICTION)?,
            sea_area: find(COL_SEA_AREA)?,
            weather: find(COL_WEATHER)?,
            cause: find(COL_CAUSE)?,
            accident_type: find(COL_ACCIDENT_TYPE)?,
            vessel_type: find(COL_VESSEL_TYPE)?,
            tonnage: find(COL_TONNAGE)?,
            injured: find(COL_INJURED)?,
            dead: find(COL_DEAD)?,
            missing: find(COL_MISSING)?,
            latitude: find(COL_LATITUDE)?,
            longitude: find(COL_LONGITUDE)?,
        })
    }
}

pub fn normalize_row(columns: &ColumnMap, row: &[String]) -> Record {
    let field = |idx: usize| row.get(idx).map(|s| s.as_str()).unwrap_or("");
    let mut record = Record {
        occurred_at: data::parse_naive_datetime(field(columns.occurred_at)).ok(),
        month: data::parse_integer(field(columns.month)),
        hour_bucket: data::parse_integer(field(columns.hour)),
        vessel_type: data::parse_text(field(columns.vessel_type)),
        accident_type: data::parse_text(field(columns.accident_type)),
        cause: data::parse_text(field(columns.cause)),
        weather: data::parse_text(field(columns.weather)),
        coast_guard_jurisdiction: data::parse_text(field(columns.jurisdiction)),
        sea_area: data::parse_text(field(columns.sea_area)),
        tonnage: data::parse_float(field(columns.tonnage)),
        injured: data::parse_count(field(columns.injured)),
        dead: data::parse_count(field(columns.dead)),
        missing: data::parse_count(field(columns.missing)),
        latitude_raw: data::parse_text(field(columns.latitude)),
        longitude_raw: data::parse_text(field(columns.longitude)),
        latitude: None,
        longitude: None,
    };
    record.derive_coordinates();
    record
}

pub fn read_dataset<R>(reader: R, delimiter: u8, encoding: &'static Encoding) -> Result<Dataset>
where
    R: Read,
{
    let mut reader = io_utils::open_csv_reader(reader, delimiter);
    let headers = io_utils::reader_headers(&mut reader, encoding).context("Reading header row")?;
    debug!("Input headers: {:?}", headers);
    let columns = ColumnMap::from_headers(&headers)?;

    let mut records = Vec::new();
    for (row_idx, record) in reader.byte_records().enumerate() {
        let record = record.with_context(|| format!("Reading row {}", row_idx + 2))?;
        let decoded = io_utils::decode_record(&record, encoding)
            .with_context(|| format!("Decoding row {}", row_idx + 2))?;
        records.push(normalize_row(&columns, &decoded));
    }
    Ok(Dataset::from_records(records))
}

pub fn load_dataset(path: &Path, delimiter: u8, encoding: &'static Encoding) -> Result<Dataset> {
    info!(
        "Loading '{}' (delimiter '{}', encoding {})",
        path.display(),
        crate::printable_delimiter(delimiter),
        encoding.name()
    );
    let input = io_utils::open_input(path)?;
    let dataset = read_dataset(input, delimiter, encoding)
        .with_context(|| format!("Loading accidents from {path:?}"))?;
    let report = dataset.report();
    info!("Loaded {} accident record(s)", report.rows);
    if report.unparsed_dates > 0 {
        warn!(
            "{} record(s) have an unparseable occurrence time",
            report.unparsed_dates
        );
    }
    if report.unlocated > 0 {
        warn!(
            "{} record(s) have no usable latitude/longitude",
            report.unlocated
        );
    }
    Ok(dataset)
}
