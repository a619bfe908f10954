use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::{data, filter::Interval, io_utils::DEFAULT_INPUT_ENCODING, views::ViewId};

#[derive(Debug, Parser)]
#[command(author, version, about = "Filter and summarize maritime accident records", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Print accident, injury, death and missing-person totals for the selection
    Summary(SummaryArgs),
    /// Print every dashboard view for the selection as text tables
    Views(ViewsArgs),
    /// Serialize the dashboard for an external chart renderer
    Export(ExportArgs),
    /// List the filter choices and bounds available in a file
    Options(OptionsArgs),
}

#[derive(Debug, Clone, Args)]
pub struct InputArgs {
    /// Accident CSV file ('-' reads stdin)
    #[arg(short = 'i', long = "input")]
    pub input: PathBuf,
    /// CSV delimiter character (supports ',', 'tab', ';', '|')
    #[arg(long, value_parser = parse_delimiter)]
    pub delimiter: Option<u8>,
    /// Character encoding of the input file
    #[arg(long = "input-encoding", default_value = DEFAULT_INPUT_ENCODING)]
    pub input_encoding: String,
}

#[derive(Debug, Clone, Default, Args)]
pub struct FilterArgs {
    /// YAML or JSON file holding a complete filter selection
    #[arg(long = "filter-file")]
    pub filter_file: Option<PathBuf>,
    /// Leave date/month/hour/tonnage unrestricted instead of pinning them to
    /// the dataset's ranges (keeps rows with blank values in those columns)
    #[arg(long = "unbounded")]
    pub unbounded: bool,
    /// First occurrence date to include (YYYY-MM-DD)
    #[arg(long = "from", value_parser = parse_date_arg)]
    pub from: Option<NaiveDate>,
    /// Last occurrence date to include (YYYY-MM-DD)
    #[arg(long = "to", value_parser = parse_date_arg)]
    pub to: Option<NaiveDate>,
    /// Month range such as `1..6` or a single month
    #[arg(long, value_parser = parse_int_interval)]
    pub month: Option<Interval<i64>>,
    /// Hour range such as `6..18` or a single hour
    #[arg(long, value_parser = parse_int_interval)]
    pub hour: Option<Interval<i64>>,
    /// Tonnage range such as `0..500`
    #[arg(long, value_parser = parse_float_interval)]
    pub tonnage: Option<Interval<f64>>,
    /// Vessel types to keep (repeatable, comma-separated)
    #[arg(long = "vessel-type", value_delimiter = ',', action = clap::ArgAction::Append)]
    pub vessel_types: Vec<String>,
    /// Accident types to keep (repeatable, comma-separated)
    #[arg(long = "accident-type", value_delimiter = ',', action = clap::ArgAction::Append)]
    pub accident_types: Vec<String>,
    /// Causes to keep (repeatable, comma-separated)
    #[arg(long = "cause", value_delimiter = ',', action = clap::ArgAction::Append)]
    pub causes: Vec<String>,
    /// Weather conditions to keep (repeatable, comma-separated)
    #[arg(long = "weather", value_delimiter = ',', action = clap::ArgAction::Append)]
    pub weather: Vec<String>,
    /// Coast guard jurisdictions to keep (repeatable, comma-separated)
    #[arg(long = "jurisdiction", value_delimiter = ',', action = clap::ArgAction::Append)]
    pub jurisdictions: Vec<String>,
    /// Sea areas to keep (repeatable, comma-separated)
    #[arg(long = "sea-area", value_delimiter = ',', action = clap::ArgAction::Append)]
    pub sea_areas: Vec<String>,
}

#[derive(Debug, Args)]
pub struct SummaryArgs {
    #[command(flatten)]
    pub input: InputArgs,
    #[command(flatten)]
    pub filters: FilterArgs,
}

#[derive(Debug, Args)]
pub struct ViewsArgs {
    #[command(flatten)]
    pub input: InputArgs,
    #[command(flatten)]
    pub filters: FilterArgs,
    /// Only print these views (repeatable); all views when omitted
    #[arg(long = "view", value_enum, action = clap::ArgAction::Append)]
    pub views: Vec<ViewId>,
    /// Maximum rows per ranking table or point list (0 = all)
    #[arg(long, default_value_t = 0)]
    pub top: usize,
    /// Accident types forming the focused collision/capsize analysis
    #[arg(long = "focus-type", value_delimiter = ',', action = clap::ArgAction::Append)]
    pub focus_types: Vec<String>,
}

#[derive(Debug, Args)]
pub struct ExportArgs {
    #[command(flatten)]
    pub input: InputArgs,
    #[command(flatten)]
    pub filters: FilterArgs,
    /// Output file (stdout if omitted)
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,
    /// Serialization format
    #[arg(long, value_enum, default_value = "json")]
    pub format: ExportFormat,
    /// Accident types forming the focused collision/capsize analysis
    #[arg(long = "focus-type", value_delimiter = ',', action = clap::ArgAction::Append)]
    pub focus_types: Vec<String>,
}

#[derive(Debug, Args)]
pub struct OptionsArgs {
    #[command(flatten)]
    pub input: InputArgs,
    /// Output format
    #[arg(long, value_enum, default_value = "table")]
    pub format: OutputFormat,
}

#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq, Default)]
#[value(rename_all = "kebab-case")]
pub enum ExportFormat {
    #[default]
    Json,
    Yaml,
}

#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq, Default)]
#[value(rename_all = "kebab-case")]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
    Yaml,
}

pub fn parse_delimiter(value: &str) -> Result<u8, String> {
    match value {
        "tab" | "\t" => Ok(b'\t'),
        "comma" | "," => Ok(b','),
        "|" | "pipe" => Ok(b'|'),
        ";" | "semicolon" => Ok(b';'),
        other => {
            let mut chars = other.chars();
            let first = chars
                .next()
                .ok_or_else(|| "Delimiter cannot be empty".to_string())?;
            if chars.next().is_some() {
                return Err("Delimiter must be a single character".to_string());
            }
            if !first.is_ascii() {
                return Err("Delimiter must be ASCII".to_string());
            }
            Ok(first as u8)
        }
    }
}

fn parse_date_arg(value: &str) -> Result<NaiveDate, String> {
    data::parse_naive_date(value).map_err(|err| err.to_string())
}

fn parse_int_interval(value: &str) -> Result<Interval<i64>, String> {
    value.parse().map_err(|err| format!("{err}"))
}

fn parse_float_interval(value: &str) -> Result<Interval<f64>, String> {
    value.parse().map_err(|err| format!("{err}"))
}
