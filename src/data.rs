use std::fmt;

use anyhow::{Result, anyhow};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::coordinate;

/// One normalized accident report.
///
/// `month` and `hour_bucket` come from their own source columns and are kept
/// even when they disagree with `occurred_at`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub occurred_at: Option<NaiveDateTime>,
    pub month: Option<i64>,
    pub hour_bucket: Option<i64>,
    pub vessel_type: Option<String>,
    pub accident_type: Option<String>,
    pub cause: Option<String>,
    pub weather: Option<String>,
    pub coast_guard_jurisdiction: Option<String>,
    pub sea_area: Option<String>,
    pub tonnage: Option<f64>,
    pub injured: Option<u64>,
    pub dead: Option<u64>,
    pub missing: Option<u64>,
    pub latitude_raw: Option<String>,
    pub longitude_raw: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

impl Record {
    pub fn category(&self, category: Category) -> Option<&str> {
        let value = match category {
            Category::VesselType => &self.vessel_type,
            Category::AccidentType => &self.accident_type,
            Category::Cause => &self.cause,
            Category::Weather => &self.weather,
            Category::Jurisdiction => &self.coast_guard_jurisdiction,
            Category::SeaArea => &self.sea_area,
        };
        value.as_deref()
    }

    pub fn location(&self) -> Option<GeoPoint> {
        Some(GeoPoint {
            latitude: self.latitude?,
            longitude: self.longitude?,
        })
    }

    /// Fills `latitude`/`longitude` from the raw `deg|min|sec` strings.
    pub fn derive_coordinates(&mut self) {
        self.latitude = coordinate::dms_to_decimal(self.latitude_raw.as_deref());
        self.longitude = coordinate::dms_to_decimal(self.longitude_raw.as_deref());
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

/// The categorical filter dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    VesselType,
    AccidentType,
    Cause,
    Weather,
    Jurisdiction,
    SeaArea,
}

impl Category {
    pub const ALL: [Category; 6] = [
        Category::VesselType,
        Category::AccidentType,
        Category::Cause,
        Category::Weather,
        Category::Jurisdiction,
        Category::SeaArea,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Category::VesselType => "vessel_type",
            Category::AccidentType => "accident_type",
            Category::Cause => "cause",
            Category::Weather => "weather",
            Category::Jurisdiction => "jurisdiction",
            Category::SeaArea => "sea_area",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

pub fn parse_naive_date(value: &str) -> Result<NaiveDate> {
    const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%Y.%m.%d", "%Y%m%d"];
    let value = value.trim();
    for fmt in DATE_FORMATS {
        if let Ok(parsed) = NaiveDate::parse_from_str(value, fmt) {
            return Ok(parsed);
        }
    }
    Err(anyhow!("Failed to parse '{value}' as date"))
}

/// Tolerant timestamp parser; a bare date is read as midnight.
pub fn parse_naive_datetime(value: &str) -> Result<NaiveDateTime> {
    const DATETIME_FORMATS: &[&str] = &[
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%d %H:%M",
        "%Y-%m-%dT%H:%M",
        "%Y/%m/%d %H:%M:%S",
        "%Y/%m/%d %H:%M",
        "%Y.%m.%d %H:%M:%S",
        "%Y.%m.%d %H:%M",
        "%Y-%m-%d %H:%M:%S%.f",
    ];
    let value = value.trim();
    for fmt in DATETIME_FORMATS {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(value, fmt) {
            return Ok(parsed);
        }
    }
    parse_naive_date(value)
        .map(|date| date.and_time(NaiveTime::MIN))
        .map_err(|_| anyhow!("Failed to parse '{value}' as datetime"))
}

pub fn parse_text(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

fn strip_grouping(value: &str) -> Option<String> {
    let cleaned = value.trim().replace(',', "");
    if cleaned.is_empty() { None } else { Some(cleaned) }
}

pub fn parse_float(value: &str) -> Option<f64> {
    strip_grouping(value)?
        .parse::<f64>()
        .ok()
        .filter(|parsed| parsed.is_finite())
}

/// Accepts `12`, `1,200` and float spellings with no fraction such as `3.0`.
pub fn parse_integer(value: &str) -> Option<i64> {
    let cleaned = strip_grouping(value)?;
    if let Ok(parsed) = cleaned.parse::<i64>() {
        return Some(parsed);
    }
    let float = cleaned.parse::<f64>().ok()?;
    if float.is_finite() && float.fract() == 0.0 && float.abs() < i64::MAX as f64 {
        Some(float as i64)
    } else {
        None
    }
}

pub fn parse_count(value: &str) -> Option<u64> {
    parse_integer(value).and_then(|parsed| u64::try_from(parsed).ok())
}
