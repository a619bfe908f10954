//! Dashboard composition.
//!
//! [`compose()`] filters the dataset once and derives every view and KPI from
//! that single [`FilteredSubset`], so all numbers describe the same
//! population. Views fed by the focused collision/capsize population carry
//! an explicit [`ViewData::NoData`] when that population is empty.

use std::io::Write;

use anyhow::{Context, Result};
use clap::ValueEnum;
use log::{debug, info};
use serde::Serialize;

use crate::{
    aggregate::{
        self, CategoryCount, CrossCount, FOCUS_ACCIDENT_TYPES, Field, Kpis, count_by,
        cross_count_by, rank_by_count,
    },
    cli::{ExportArgs, ExportFormat, SummaryArgs, ViewsArgs},
    data::{Category, GeoPoint},
    filter::{self, FilterSpec, FilteredSubset},
    io_utils,
    loader::Dataset,
    selection, table,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
#[value(rename_all = "snake_case")]
pub enum ViewId {
    MonthTrend,
    HourTrend,
    MapPoints,
    JurisdictionRanking,
    AreaRanking,
    TypeBreakdown,
    CauseBreakdown,
    VesselRanking,
    FocusCauseBreakdown,
    FocusMonthTrend,
}

impl ViewId {
    pub const ALL: [ViewId; 10] = [
        ViewId::MonthTrend,
        ViewId::HourTrend,
        ViewId::MapPoints,
        ViewId::JurisdictionRanking,
        ViewId::AreaRanking,
        ViewId::TypeBreakdown,
        ViewId::CauseBreakdown,
        ViewId::VesselRanking,
        ViewId::FocusCauseBreakdown,
        ViewId::FocusMonthTrend,
    ];

    pub fn title(self) -> &'static str {
        match self {
            ViewId::MonthTrend => "Accidents by month",
            ViewId::HourTrend => "Accidents by hour",
            ViewId::MapPoints => "Accident locations",
            ViewId::JurisdictionRanking => "Accidents by coast guard jurisdiction",
            ViewId::AreaRanking => "Accidents by sea area",
            ViewId::TypeBreakdown => "Accident types",
            ViewId::CauseBreakdown => "Accident causes",
            ViewId::VesselRanking => "Accidents by vessel type",
            ViewId::FocusCauseBreakdown => "Collision/capsize causes",
            ViewId::FocusMonthTrend => "Collision/capsize accidents by month",
        }
    }

    fn field(self) -> Option<Field> {
        match self {
            ViewId::MonthTrend | ViewId::FocusMonthTrend => Some(Field::Month),
            ViewId::HourTrend => Some(Field::Hour),
            ViewId::MapPoints => None,
            ViewId::JurisdictionRanking => Some(Field::Category(Category::Jurisdiction)),
            ViewId::AreaRanking => Some(Field::Category(Category::SeaArea)),
            ViewId::TypeBreakdown => Some(Field::Category(Category::AccidentType)),
            ViewId::CauseBreakdown | ViewId::FocusCauseBreakdown => {
                Some(Field::Category(Category::Cause))
            }
            ViewId::VesselRanking => Some(Field::Category(Category::VesselType)),
        }
    }

    pub fn key_field(self) -> &'static str {
        self.field().map_or("location", Field::label)
    }

    pub fn is_trend(self) -> bool {
        matches!(
            self,
            ViewId::MonthTrend | ViewId::HourTrend | ViewId::FocusMonthTrend
        )
    }

    pub fn is_focused(self) -> bool {
        matches!(self, ViewId::FocusCauseBreakdown | ViewId::FocusMonthTrend)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ViewData {
    Counts { rows: Vec<CategoryCount> },
    CrossCounts { rows: Vec<CrossCount> },
    Points { points: Vec<GeoPoint> },
    NoData { message: String },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct View {
    pub id: ViewId,
    pub title: &'static str,
    pub key_field: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub series_field: Option<&'static str>,
    pub value_field: &'static str,
    pub data: ViewData,
}

impl View {
    fn new(id: ViewId, data: ViewData) -> Self {
        Self {
            id,
            title: id.title(),
            key_field: id.key_field(),
            series_field: None,
            value_field: "accidents",
            data,
        }
    }

    pub fn counts(id: ViewId, rows: Vec<CategoryCount>) -> Self {
        Self::new(id, ViewData::Counts { rows })
    }

    pub fn cross_counts(id: ViewId, series: Field, rows: Vec<CrossCount>) -> Self {
        Self {
            series_field: Some(series.label()),
            ..Self::new(id, ViewData::CrossCounts { rows })
        }
    }

    pub fn points(id: ViewId, points: Vec<GeoPoint>) -> Self {
        Self {
            value_field: "points",
            ..Self::new(id, ViewData::Points { points })
        }
    }

    pub fn no_data(id: ViewId, message: impl Into<String>) -> Self {
        Self::new(
            id,
            ViewData::NoData {
                message: message.into(),
            },
        )
    }

    pub fn has_data(&self) -> bool {
        !matches!(self.data, ViewData::NoData { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComposeOptions {
    pub focus_types: Vec<String>,
}

impl Default for ComposeOptions {
    fn default() -> Self {
        Self {
            focus_types: FOCUS_ACCIDENT_TYPES.iter().map(|t| t.to_string()).collect(),
        }
    }
}

impl ComposeOptions {
    fn from_focus_types(focus_types: &[String]) -> Self {
        let focus_types = focus_types
            .iter()
            .map(|t| t.trim())
            .filter(|t| !t.is_empty())
            .map(str::to_string)
            .collect::<Vec<_>>();
        if focus_types.is_empty() {
            Self::default()
        } else {
            Self { focus_types }
        }
    }

    fn no_focus_message(&self) -> String {
        format!(
            "No {} accidents match the current filters",
            self.focus_types.join("/")
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dashboard {
    pub total_records: usize,
    pub filtered_records: usize,
    pub filter: FilterSpec,
    pub kpis: Kpis,
    pub views: Vec<View>,
}

impl Dashboard {
    pub fn view(&self, id: ViewId) -> Option<&View> {
        self.views.iter().find(|view| view.id == id)
    }
}

fn build_view<'a>(
    id: ViewId,
    subset: &FilteredSubset<'a>,
    focus: Option<&FilteredSubset<'a>>,
    options: &ComposeOptions,
) -> View {
    let source = if id.is_focused() {
        match focus {
            Some(focus) => focus,
            None => return View::no_data(id, options.no_focus_message()),
        }
    } else {
        subset
    };
    let Some(field) = id.field() else {
        return View::points(id, aggregate::locations(source));
    };
    if id == ViewId::FocusMonthTrend {
        let series = Field::Category(Category::AccidentType);
        View::cross_counts(id, series, cross_count_by(source, field, series))
    } else if id.is_trend() {
        View::counts(id, count_by(source, field))
    } else {
        View::counts(id, rank_by_count(count_by(source, field)))
    }
}

pub fn compose(dataset: &Dataset, spec: &FilterSpec, options: &ComposeOptions) -> Dashboard {
    let subset = filter::apply(dataset, spec);
    debug!(
        "Filter kept {} of {} record(s)",
        subset.len(),
        dataset.len()
    );
    let focus = aggregate::focus_filter(&subset, options.focus_types.as_slice());
    let views = ViewId::ALL
        .iter()
        .map(|id| build_view(*id, &subset, focus.as_ref(), options))
        .collect();
    Dashboard {
        total_records: dataset.len(),
        filtered_records: subset.len(),
        filter: spec.clone(),
        kpis: Kpis::from_subset(&subset),
        views,
    }
}

pub fn execute_summary(args: &SummaryArgs) -> Result<()> {
    let dataset = crate::load_input(&args.input)?;
    let spec = selection::resolve(&args.filters, &dataset)?;
    let subset = filter::apply(&dataset, &spec);
    let kpis = Kpis::from_subset(&subset);
    print!("{}", table::render_kpis(&kpis, dataset.len()));
    info!(
        "Summarized {} of {} accident record(s)",
        subset.len(),
        dataset.len()
    );
    Ok(())
}

pub fn execute(args: &ViewsArgs) -> Result<()> {
    let dataset = crate::load_input(&args.input)?;
    let spec = selection::resolve(&args.filters, &dataset)?;
    let dashboard = compose(
        &dataset,
        &spec,
        &ComposeOptions::from_focus_types(&args.focus_types),
    );
    let mut out = io_utils::open_output(None)?;
    write!(out, "{}", table::render_kpis(&dashboard.kpis, dashboard.total_records))?;
    for view in &dashboard.views {
        if !args.views.is_empty() && !args.views.contains(&view.id) {
            continue;
        }
        write!(out, "\n{}", table::render_view(view, args.top))?;
    }
    out.flush()?;
    info!(
        "Rendered views for {} of {} accident record(s)",
        dashboard.filtered_records, dashboard.total_records
    );
    Ok(())
}

pub fn export(args: &ExportArgs) -> Result<()> {
    let dataset = crate::load_input(&args.input)?;
    let spec = selection::resolve(&args.filters, &dataset)?;
    let dashboard = compose(
        &dataset,
        &spec,
        &ComposeOptions::from_focus_types(&args.focus_types),
    );
    let mut out = io_utils::open_output(args.output.as_deref())?;
    match args.format {
        ExportFormat::Json => {
            serde_json::to_writer_pretty(&mut out, &dashboard).context("Writing dashboard JSON")?;
            writeln!(out)?;
        }
        ExportFormat::Yaml => {
            let yaml = serde_yaml::to_string(&dashboard).context("Writing dashboard YAML")?;
            out.write_all(yaml.as_bytes())?;
        }
    }
    out.flush()?;
    info!(
        "Exported {} view(s) to {}",
        dashboard.views.len(),
        args.output
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "stdout".into())
    );
    Ok(())
}
