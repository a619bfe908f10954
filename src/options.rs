//! Filter choices offered for a dataset.
//!
//! Mirrors what a dashboard sidebar needs: the sorted distinct values of
//! every categorical column and the observed bounds of the date and numeric
//! columns. [`FilterOptions::default_spec()`] is the initial "whole range"
//! selection built from those bounds.

use std::{collections::BTreeMap, io::Write};

use anyhow::Result;
use chrono::NaiveDate;
use itertools::{Itertools, MinMaxResult};
use log::info;
use serde::Serialize;

use crate::{
    cli::{OptionsArgs, OutputFormat},
    data::Category,
    filter::{FilterSpec, Interval},
    io_utils,
    loader::Dataset,
    table,
};

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FilterOptions {
    pub date: Option<Interval<NaiveDate>>,
    pub month: Option<Interval<i64>>,
    pub hour: Option<Interval<i64>>,
    pub tonnage: Option<Interval<f64>>,
    pub categories: BTreeMap<Category, Vec<String>>,
}

fn bounds<T: Copy>(result: MinMaxResult<T>) -> Option<Interval<T>> {
    match result {
        MinMaxResult::NoElements => None,
        MinMaxResult::OneElement(value) => Some(Interval {
            start: value,
            end: value,
        }),
        MinMaxResult::MinMax(start, end) => Some(Interval { start, end }),
    }
}

impl FilterOptions {
    pub fn from_dataset(dataset: &Dataset) -> Self {
        let records = dataset.records();
        let categories = Category::ALL
            .iter()
            .map(|category| {
                let values = records
                    .iter()
                    .filter_map(|record| record.category(*category))
                    .unique()
                    .sorted()
                    .map(str::to_string)
                    .collect::<Vec<_>>();
                (*category, values)
            })
            .collect();
        Self {
            date: bounds(
                records
                    .iter()
                    .filter_map(|r| r.occurred_at.map(|ts| ts.date()))
                    .minmax(),
            ),
            month: bounds(records.iter().filter_map(|r| r.month).minmax()),
            hour: bounds(records.iter().filter_map(|r| r.hour_bucket).minmax()),
            tonnage: bounds(
                records
                    .iter()
                    .filter_map(|r| r.tonnage)
                    .minmax_by(|a, b| a.total_cmp(b)),
            ),
            categories,
        }
    }

    /// Every interval pinned to the dataset bounds, no categorical restriction.
    pub fn default_spec(&self) -> FilterSpec {
        FilterSpec {
            date: self.date,
            month: self.month,
            hour: self.hour,
            tonnage: self.tonnage,
            ..FilterSpec::default()
        }
    }

    fn render_rows(&self) -> Vec<Vec<String>> {
        let mut rows = Vec::new();
        let mut push_bounds = |name: &str, bounds: Option<String>| {
            rows.push(vec![
                name.to_string(),
                bounds.unwrap_or_else(|| "<empty>".to_string()),
            ]);
        };
        push_bounds("date", self.date.map(|i| i.to_string()));
        push_bounds("month", self.month.map(|i| i.to_string()));
        push_bounds("hour", self.hour.map(|i| i.to_string()));
        push_bounds("tonnage", self.tonnage.map(|i| i.to_string()));
        for (category, values) in &self.categories {
            rows.push(vec![category.to_string(), values.join(", ")]);
        }
        rows
    }
}

pub fn execute(args: &OptionsArgs) -> Result<()> {
    let dataset = crate::load_input(&args.input)?;
    let options = FilterOptions::from_dataset(&dataset);
    let mut out = io_utils::open_output(None)?;
    match args.format {
        OutputFormat::Table => {
            let headers = vec!["dimension".to_string(), "choices".to_string()];
            write!(out, "{}", table::render_table(&headers, &options.render_rows()))?;
        }
        OutputFormat::Json => {
            serde_json::to_writer_pretty(&mut out, &options)?;
            writeln!(out)?;
        }
        OutputFormat::Yaml => write!(out, "{}", serde_yaml::to_string(&options)?)?,
    }
    out.flush()?;
    info!(
        "Listed filter choices for {} categorical dimension(s)",
        options.categories.len()
    );
    Ok(())
}
