//! Builds the [`FilterSpec`] for one pass from a selection file and CLI flags.
//!
//! The base selection comes from `--filter-file` (YAML; JSON documents parse
//! as YAML too), or else starts every range at the dataset bounds, which drops
//! rows with a null date, month, hour or tonnage. `--unbounded` starts fully
//! unrestricted instead. Each flag that is present then replaces its dimension.

use std::{fs, path::Path};

use anyhow::{Context, Result, bail};
use chrono::NaiveDate;
use log::debug;

use crate::{
    cli::FilterArgs,
    data::Category,
    filter::{FilterSpec, Interval},
    loader::Dataset,
    options::FilterOptions,
};

pub fn load_filter_file(path: &Path) -> Result<FilterSpec> {
    let raw = fs::read_to_string(path).with_context(|| format!("Opening filter file {path:?}"))?;
    serde_yaml::from_str(&raw).with_context(|| format!("Parsing filter file {path:?}"))
}

pub fn resolve(args: &FilterArgs, dataset: &Dataset) -> Result<FilterSpec> {
    let mut spec = match &args.filter_file {
        Some(path) => {
            if args.unbounded {
                bail!("--filter-file and --unbounded cannot be used together");
            }
            load_filter_file(path)?
        }
        None if args.unbounded => FilterSpec::default(),
        None => FilterOptions::from_dataset(dataset).default_spec(),
    };

    if args.from.is_some() || args.to.is_some() {
        // A lone bound keeps the other end of the base range, or leaves it open.
        spec.date = Some(Interval::new(
            args.from
                .or(spec.date.map(|d| d.start))
                .unwrap_or(NaiveDate::MIN),
            args.to
                .or(spec.date.map(|d| d.end))
                .unwrap_or(NaiveDate::MAX),
        ));
    }
    if let Some(month) = args.month {
        spec.month = Some(month);
    }
    if let Some(hour) = args.hour {
        spec.hour = Some(hour);
    }
    if let Some(tonnage) = args.tonnage {
        spec.tonnage = Some(tonnage);
    }
    for (category, values) in [
        (Category::VesselType, &args.vessel_types),
        (Category::AccidentType, &args.accident_types),
        (Category::Cause, &args.causes),
        (Category::Weather, &args.weather),
        (Category::Jurisdiction, &args.jurisdictions),
        (Category::SeaArea, &args.sea_areas),
    ] {
        let values = values
            .iter()
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
            .map(str::to_string)
            .collect::<Vec<_>>();
        if !values.is_empty() {
            *spec.selection_mut(category) = values.into_iter().collect();
        }
    }
    debug!("Resolved filter selection: {:?}", spec);
    Ok(spec)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::Record;
    use chrono::NaiveDateTime;
    use tempfile::tempdir;

    fn dataset() -> Dataset {
        Dataset::from_records(vec![
            Record {
                month: Some(2),
                hour_bucket: Some(9),
                ..Record::default()
            },
            Record {
                month: Some(11),
                hour_bucket: Some(20),
                ..Record::default()
            },
        ])
    }

    #[test]
    fn resolve_without_flags_pins_intervals_to_dataset_bounds() {
        let spec = resolve(&FilterArgs::default(), &dataset()).unwrap();
        assert_eq!(spec.month, Some(Interval::new(2, 11)));
        assert_eq!(spec.hour, Some(Interval::new(9, 20)));
        assert!(spec.date.is_none());
        assert!(spec.tonnage.is_none());
    }

    #[test]
    fn unbounded_starts_unrestricted() {
        let args = FilterArgs {
            unbounded: true,
            hour: Some(Interval::new(0, 12)),
            ..FilterArgs::default()
        };
        let spec = resolve(&args, &dataset()).unwrap();
        assert_eq!(spec.month, None);
        assert_eq!(spec.hour, Some(Interval::new(0, 12)));
    }

    #[test]
    fn resolve_opens_one_sided_date_ranges() {
        let from = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
        let args = FilterArgs {
            unbounded: true,
            from: Some(from),
            ..FilterArgs::default()
        };
        let spec = resolve(&args, &dataset()).unwrap();
        assert_eq!(spec.date, Some(Interval::new(from, NaiveDate::MAX)));
    }

    #[test]
    fn lone_date_bound_keeps_the_dataset_end() {
        let at = |value: &str| NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M").ok();
        let dataset = Dataset::from_records(vec![
            Record {
                occurred_at: at("2024-01-05 08:00"),
                ..Record::default()
            },
            Record {
                occurred_at: at("2024-09-30 23:00"),
                ..Record::default()
            },
        ]);
        let to = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        let args = FilterArgs {
            to: Some(to),
            ..FilterArgs::default()
        };
        let spec = resolve(&args, &dataset).unwrap();
        assert_eq!(
            spec.date,
            Some(Interval::new(NaiveDate::from_ymd_opt(2024, 1, 5).unwrap(), to))
        );
    }

    #[test]
    fn filter_file_conflicts_with_unbounded() {
        let args = FilterArgs {
            filter_file: Some("selection.yml".into()),
            unbounded: true,
            ..FilterArgs::default()
        };
        assert!(resolve(&args, &dataset()).is_err());
    }

    #[test]
    fn flags_replace_file_selection_per_dimension() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("selection.yml");
        fs::write(
            &path,
            "month:\n  start: 1\n  end: 3\nweather:\n  - 맑음\ncauses:\n  - 기관손상\n",
        )
        .unwrap();
        let args = FilterArgs {
            filter_file: Some(path),
            causes: vec![" 운항부주의 ".to_string(), " ".to_string()],
            ..FilterArgs::default()
        };
        let spec = resolve(&args, &dataset()).unwrap();
        assert_eq!(spec.month, Some(Interval::new(1, 3)));
        assert!(spec.weather.contains("맑음"));
        assert_eq!(spec.causes.len(), 1);
        assert!(spec.causes.contains("운항부주의"));
    }

    #[test]
    fn filter_file_accepts_json_documents() {
        let dir = tempdir().expect("temp dir");
        let json = dir.path().join("selection.json");
        fs::write(
            &json,
            r#"{"hour": {"start": 6, "end": 18}, "date": {"start": "2024-01-01", "end": "2024-03-31"}, "sea_areas": ["영해"]}"#,
        )
        .unwrap();
        let spec = load_filter_file(&json).unwrap();
        assert_eq!(spec.hour, Some(Interval::new(6, 18)));
        assert_eq!(
            spec.date.map(|d| d.end),
            NaiveDate::from_ymd_opt(2024, 3, 31)
        );
        assert!(spec.sea_areas.contains("영해"));
    }

    #[test]
    fn filter_file_rejects_unknown_dimensions() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("bad.yml");
        fs::write(&path, "colour: red\n").unwrap();
        assert!(load_filter_file(&path).is_err());
    }
}
