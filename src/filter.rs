//! Filter specification and the filter engine.
//!
//! A [`FilterSpec`] holds one selection per dimension. Interval dimensions
//! are `None` when unrestricted; once restricted, records with a null value
//! on that dimension never match. Categorical dimensions are unrestricted
//! while their selection set is empty. [`apply()`] keeps the records that
//! satisfy every dimension, in dataset order.

use std::{collections::BTreeSet, fmt, str::FromStr};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    data::{Category, Record},
    loader::Dataset,
};

/// Closed interval `[start, end]`. An interval with `start > end` is empty.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Interval<T> {
    pub start: T,
    pub end: T,
}

impl<T: PartialOrd> Interval<T> {
    pub fn new(start: T, end: T) -> Self {
        Self { start, end }
    }

    pub fn contains(&self, value: &T) -> bool {
        self.start <= *value && *value <= self.end
    }

    /// Unrestricted intervals match everything, nulls included.
    fn admits(interval: Option<&Self>, value: Option<&T>) -> bool {
        match (interval, value) {
            (None, _) => true,
            (Some(interval), Some(value)) => interval.contains(value),
            (Some(_), None) => false,
        }
    }
}

impl<T: fmt::Display> fmt::Display for Interval<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..={}", self.start, self.end)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IntervalParseError {
    #[error("interval is empty")]
    Empty,
    #[error("invalid interval bound '{0}'")]
    InvalidBound(String),
}

impl<T> FromStr for Interval<T>
where
    T: FromStr,
{
    type Err = IntervalParseError;

    /// Accepts `a..b`, `a..=b`, `a:b`, or a single value `a` meaning `[a, a]`.
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(IntervalParseError::Empty);
        }
        let (left, right) = if let Some((left, right)) = trimmed.split_once("..") {
            (left, right.strip_prefix('=').unwrap_or(right))
        } else if let Some((left, right)) = trimmed.split_once(':') {
            (left, right)
        } else {
            (trimmed, trimmed)
        };
        let parse = |bound: &str| {
            let bound = bound.trim();
            bound
                .parse::<T>()
                .map_err(|_| IntervalParseError::InvalidBound(bound.to_string()))
        };
        Ok(Interval {
            start: parse(left)?,
            end: parse(right)?,
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FilterSpec {
    pub date: Option<Interval<NaiveDate>>,
    pub month: Option<Interval<i64>>,
    pub hour: Option<Interval<i64>>,
    pub tonnage: Option<Interval<f64>>,
    pub vessel_types: BTreeSet<String>,
    pub accident_types: BTreeSet<String>,
    pub causes: BTreeSet<String>,
    pub weather: BTreeSet<String>,
    pub jurisdictions: BTreeSet<String>,
    pub sea_areas: BTreeSet<String>,
}

impl FilterSpec {
    pub fn selection(&self, category: Category) -> &BTreeSet<String> {
        match category {
            Category::VesselType => &self.vessel_types,
            Category::AccidentType => &self.accident_types,
            Category::Cause => &self.causes,
            Category::Weather => &self.weather,
            Category::Jurisdiction => &self.jurisdictions,
            Category::SeaArea => &self.sea_areas,
        }
    }

    pub fn selection_mut(&mut self, category: Category) -> &mut BTreeSet<String> {
        match category {
            Category::VesselType => &mut self.vessel_types,
            Category::AccidentType => &mut self.accident_types,
            Category::Cause => &mut self.causes,
            Category::Weather => &mut self.weather,
            Category::Jurisdiction => &mut self.jurisdictions,
            Category::SeaArea => &mut self.sea_areas,
        }
    }

    pub fn is_unrestricted(&self) -> bool {
        self.date.is_none()
            && self.month.is_none()
            && self.hour.is_none()
            && self.tonnage.is_none()
            && Category::ALL
                .iter()
                .all(|category| self.selection(*category).is_empty())
    }

    pub fn matches(&self, record: &Record) -> bool {
        let occurred_on = record.occurred_at.map(|ts| ts.date());
        Interval::admits(self.date.as_ref(), occurred_on.as_ref())
            && Interval::admits(self.month.as_ref(), record.month.as_ref())
            && Interval::admits(self.hour.as_ref(), record.hour_bucket.as_ref())
            && Interval::admits(self.tonnage.as_ref(), record.tonnage.as_ref())
            && Category::ALL
                .iter()
                .all(|category| self.admits_category(*category, record))
    }

    fn admits_category(&self, category: Category, record: &Record) -> bool {
        let selected = self.selection(category);
        if selected.is_empty() {
            return true;
        }
        record
            .category(category)
            .is_some_and(|value| selected.contains(value))
    }
}

/// Records that satisfy a [`FilterSpec`], in dataset order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilteredSubset<'a> {
    records: Vec<&'a Record>,
}

impl<'a> FilteredSubset<'a> {
    pub fn all(dataset: &'a Dataset) -> Self {
        Self {
            records: dataset.records().iter().collect(),
        }
    }

    pub(crate) fn from_refs(records: Vec<&'a Record>) -> Self {
        Self { records }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &'a Record> + '_ {
        self.records.iter().copied()
    }

    pub fn records(&self) -> &[&'a Record] {
        &self.records
    }
}

pub fn apply<'a>(dataset: &'a Dataset, spec: &FilterSpec) -> FilteredSubset<'a> {
    FilteredSubset {
        records: dataset
            .records()
            .iter()
            .filter(|record| spec.matches(record))
            .collect(),
    }
}
