//! Sexagesimal coordinate parsing.
//!
//! Source files store latitude and longitude as `degrees|minutes|seconds`
//! strings (for example `35|5|30.5`). [`parse_dms()`] converts one of these
//! into decimal degrees and reports exactly why a value was rejected;
//! [`dms_to_decimal()`] is the infallible form used by the loader, where any
//! rejected value simply becomes an absent coordinate.

use thiserror::Error;

pub const COMPONENT_SEPARATOR: char = '|';

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoordinateError {
    #[error("coordinate is empty")]
    Empty,
    #[error("expected 3 '|'-separated components, found {0}")]
    WrongArity(usize),
    #[error("component {index} ('{value}') is not a finite number")]
    NonNumeric { index: usize, value: String },
}

/// Parses `deg|min|sec` into `deg + min / 60 + sec / 3600`.
pub fn parse_dms(raw: &str) -> Result<f64, CoordinateError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(CoordinateError::Empty);
    }
    let parts = trimmed
        .split(COMPONENT_SEPARATOR)
        .map(str::trim)
        .collect::<Vec<_>>();
    if parts.len() != 3 {
        return Err(CoordinateError::WrongArity(parts.len()));
    }
    let mut components = [0.0f64; 3];
    for (index, part) in parts.iter().enumerate() {
        components[index] = part
            .parse::<f64>()
            .ok()
            .filter(|value| value.is_finite())
            .ok_or_else(|| CoordinateError::NonNumeric {
                index,
                value: (*part).to_string(),
            })?;
    }
    let [degrees, minutes, seconds] = components;
    Ok(degrees + minutes / 60.0 + seconds / 3600.0)
}

pub fn dms_to_decimal(raw: Option<&str>) -> Option<f64> {
    parse_dms(raw?).ok()
}
