//! Reductions over a [`FilteredSubset`].
//!
//! Every function here is pure and accepts an empty subset, returning empty
//! tables or zero totals. The grouped counts come back in ascending key
//! order; [`rank_by_count()`] reorders them for ranking-style views.

use std::{
    collections::{BTreeMap, BTreeSet},
    fmt,
};

use itertools::Itertools;
use serde::Serialize;

use crate::{
    data::{Category, GeoPoint, Record},
    filter::FilteredSubset,
};

/// Collision and capsize, as spelled in the source data.
pub const FOCUS_ACCIDENT_TYPES: [&str; 2] = ["충돌", "전복"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Month,
    Hour,
    Category(Category),
}

impl Field {
    pub fn key(self, record: &Record) -> Option<GroupKey> {
        match self {
            Field::Month => record.month.map(GroupKey::Number),
            Field::Hour => record.hour_bucket.map(GroupKey::Number),
            Field::Category(category) => record
                .category(category)
                .map(|value| GroupKey::Text(value.to_string())),
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Field::Month => "month",
            Field::Hour => "hour",
            Field::Category(category) => category.label(),
        }
    }
}

/// Group key of an aggregate row. `Empty` only appears when nulls are grouped.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(untagged)]
pub enum GroupKey {
    Empty,
    Number(i64),
    Text(String),
}

impl fmt::Display for GroupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GroupKey::Empty => f.write_str("<empty>"),
            GroupKey::Number(value) => write!(f, "{value}"),
            GroupKey::Text(value) => f.write_str(value),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryCount {
    pub key: GroupKey,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CrossCount {
    pub key: GroupKey,
    pub series: GroupKey,
    pub count: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Nulls {
    #[default]
    Skip,
    Group,
}

pub fn count_by(subset: &FilteredSubset<'_>, field: Field) -> Vec<CategoryCount> {
    count_by_with(subset, field, Nulls::Skip)
}

pub fn count_by_with(subset: &FilteredSubset<'_>, field: Field, nulls: Nulls) -> Vec<CategoryCount> {
    let mut counts: BTreeMap<GroupKey, usize> = BTreeMap::new();
    for record in subset.iter() {
        let key = match (field.key(record), nulls) {
            (Some(key), _) => key,
            (None, Nulls::Group) => GroupKey::Empty,
            (None, Nulls::Skip) => continue,
        };
        *counts.entry(key).or_insert(0) += 1;
    }
    counts
        .into_iter()
        .map(|(key, count)| CategoryCount { key, count })
        .collect()
}

/// Count descending, ties broken by ascending key.
pub fn rank_by_count(counts: Vec<CategoryCount>) -> Vec<CategoryCount> {
    counts
        .into_iter()
        .sorted_by(|a, b| b.count.cmp(&a.count).then_with(|| a.key.cmp(&b.key)))
        .collect()
}

pub fn cross_count_by(subset: &FilteredSubset<'_>, key: Field, series: Field) -> Vec<CrossCount> {
    let mut counts: BTreeMap<(GroupKey, GroupKey), usize> = BTreeMap::new();
    for record in subset.iter() {
        let (Some(left), Some(right)) = (key.key(record), series.key(record)) else {
            continue;
        };
        *counts.entry((left, right)).or_insert(0) += 1;
    }
    counts
        .into_iter()
        .map(|((key, series), count)| CrossCount { key, series, count })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Measure {
    Injured,
    Dead,
    Missing,
}

impl Measure {
    pub fn value(self, record: &Record) -> Option<u64> {
        match self {
            Measure::Injured => record.injured,
            Measure::Dead => record.dead,
            Measure::Missing => record.missing,
        }
    }
}

/// Total of a casualty count; absent values contribute 0.
pub fn sum_by(subset: &FilteredSubset<'_>, measure: Measure) -> u64 {
    subset
        .iter()
        .map(|record| measure.value(record).unwrap_or(0))
        .sum()
}

/// Narrows `subset` to the given accident types. `None` signals an empty
/// focused population.
pub fn focus_filter<'a, S>(subset: &FilteredSubset<'a>, accident_types: &[S]) -> Option<FilteredSubset<'a>>
where
    S: AsRef<str>,
{
    let wanted = accident_types
        .iter()
        .map(|value| value.as_ref())
        .collect::<BTreeSet<_>>();
    let focused = subset
        .iter()
        .filter(|record| {
            record
                .accident_type
                .as_deref()
                .is_some_and(|value| wanted.contains(value))
        })
        .collect::<Vec<_>>();
    if focused.is_empty() {
        None
    } else {
        Some(FilteredSubset::from_refs(focused))
    }
}

pub fn locations(subset: &FilteredSubset<'_>) -> Vec<GeoPoint> {
    subset.iter().filter_map(Record::location).collect()
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Kpis {
    pub accidents: usize,
    pub injured: u64,
    pub dead: u64,
    pub missing: u64,
}

impl Kpis {
    pub fn from_subset(subset: &FilteredSubset<'_>) -> Self {
        Self {
            accidents: subset.len(),
            injured: sum_by(subset, Measure::Injured),
            dead: sum_by(subset, Measure::Dead),
            missing: sum_by(subset, Measure::Missing),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::Dataset;

    fn record(month: i64, accident_type: &str, cause: Option<&str>) -> Record {
        Record {
            month: Some(month),
            accident_type: Some(accident_type.to_string()),
            cause: cause.map(str::to_string),
            injured: Some(month as u64),
            ..Record::default()
        }
    }

    fn sample() -> Dataset {
        Dataset::from_records(vec![
            record(3, "충돌", Some("경계소홀")),
            record(1, "좌초", None),
            record(3, "전복", Some("경계소홀")),
            record(1, "충돌", Some("기관손상")),
        ])
    }

    #[test]
    fn count_by_orders_keys_ascending() {
        let dataset = sample();
        let subset = FilteredSubset::all(&dataset);
        let counts = count_by(&subset, Field::Month);
        assert_eq!(
            counts,
            vec![
                CategoryCount { key: GroupKey::Number(1), count: 2 },
                CategoryCount { key: GroupKey::Number(3), count: 2 },
            ]
        );
    }

    #[test]
    fn count_by_skips_or_groups_nulls() {
        let dataset = sample();
        let subset = FilteredSubset::all(&dataset);
        let skipped = count_by(&subset, Field::Category(Category::Cause));
        assert_eq!(skipped.iter().map(|c| c.count).sum::<usize>(), 3);

        let grouped = count_by_with(&subset, Field::Category(Category::Cause), Nulls::Group);
        assert_eq!(grouped[0], CategoryCount { key: GroupKey::Empty, count: 1 });
    }

    #[test]
    fn rank_by_count_breaks_ties_by_key() {
        let dataset = sample();
        let subset = FilteredSubset::all(&dataset);
        let ranked = rank_by_count(count_by(&subset, Field::Category(Category::AccidentType)));
        let keys = ranked.iter().map(|c| c.key.to_string()).collect::<Vec<_>>();
        assert_eq!(keys, vec!["충돌", "전복", "좌초"]);
    }

    #[test]
    fn cross_count_by_groups_pairs() {
        let dataset = sample();
        let subset = FilteredSubset::all(&dataset);
        let cross = cross_count_by(
            &subset,
            Field::Month,
            Field::Category(Category::AccidentType),
        );
        assert_eq!(cross.len(), 4);
        assert!(cross.iter().all(|row| row.count == 1));
        assert_eq!(cross[0].key, GroupKey::Number(1));
    }

    #[test]
    fn focus_filter_signals_empty_population() {
        let dataset = Dataset::from_records(vec![record(1, "좌초", None)]);
        let subset = FilteredSubset::all(&dataset);
        assert!(focus_filter(&subset, &FOCUS_ACCIDENT_TYPES).is_none());

        let dataset = sample();
        let subset = FilteredSubset::all(&dataset);
        let focused = focus_filter(&subset, &FOCUS_ACCIDENT_TYPES).unwrap();
        assert_eq!(focused.len(), 3);
    }

    #[test]
    fn kpis_sum_absent_counts_as_zero() {
        let mut records = vec![record(2, "충돌", None), record(5, "충돌", None)];
        records[1].injured = None;
        records[1].dead = Some(1);
        let dataset = Dataset::from_records(records);
        let kpis = Kpis::from_subset(&FilteredSubset::all(&dataset));
        assert_eq!(
            kpis,
            Kpis {
                accidents: 2,
                injured: 2,
                dead: 1,
                missing: 0
            }
        );
    }

    #[test]
    fn reductions_accept_empty_subsets() {
        let subset = FilteredSubset::default();
        assert!(count_by(&subset, Field::Hour).is_empty());
        assert!(cross_count_by(&subset, Field::Month, Field::Hour).is_empty());
        assert_eq!(sum_by(&subset, Measure::Dead), 0);
        assert!(locations(&subset).is_empty());
        assert_eq!(Kpis::from_subset(&subset), Kpis::default());
    }
}
