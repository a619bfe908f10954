pub mod aggregate;
pub mod cli;
pub mod coordinate;
pub mod data;
pub mod filter;
pub mod io_utils;
pub mod loader;
pub mod options;
pub mod selection;
pub mod table;
pub mod views;

use std::{env, sync::OnceLock};

use anyhow::Result;
use clap::Parser;
use log::{LevelFilter, debug};

use crate::{
    cli::{Cli, Commands, InputArgs},
    loader::Dataset,
};

static LOGGER: OnceLock<()> = OnceLock::new();

fn init_logging() {
    LOGGER.get_or_init(|| {
        let mut builder = env_logger::Builder::from_env(env_logger::Env::default());
        if env::var("RUST_LOG").is_err() {
            builder.filter_module("marine_accidents", LevelFilter::Info);
        }
        let _ = builder.format_timestamp_millis().try_init();
    });
}

pub fn run() -> Result<()> {
    init_logging();
    let cli = Cli::parse();
    match cli.command {
        Commands::Summary(args) => views::execute_summary(&args),
        Commands::Views(args) => views::execute(&args),
        Commands::Export(args) => views::export(&args),
        Commands::Options(args) => options::execute(&args),
    }
}

pub(crate) fn load_input(args: &InputArgs) -> Result<Dataset> {
    let delimiter = io_utils::resolve_input_delimiter(&args.input, args.delimiter);
    let encoding = io_utils::resolve_encoding(&args.input_encoding)?;
    debug!(
        "Resolved input '{}' to delimiter '{}' and encoding {}",
        args.input.display(),
        printable_delimiter(delimiter),
        encoding.name()
    );
    loader::load_dataset(&args.input, delimiter, encoding)
}

pub(crate) fn printable_delimiter(delimiter: u8) -> String {
    match delimiter {
        b',' => ",".to_string(),
        b'\t' => "\\t".to_string(),
        b'\n' => "\\n".to_string(),
        other => (other as char).to_string(),
    }
}
