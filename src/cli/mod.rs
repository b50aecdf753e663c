//! Command-line parsing for the COVID curve plotter.
//!
//! The goal of this module is to keep **argument parsing** and **command
//! dispatch** separate from the series/transform code.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "covid", version, about = "COVID-19 case/death curve plotter (NYT dataset format)")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Render the requested curves in an interactive terminal UI.
    ///
    /// This is the default subcommand: `covid -k NY` behaves like
    /// `covid chart -k NY`.
    Chart(SeriesArgs),
    /// Render a deterministic ASCII chart to stdout (useful for scripting).
    Ascii(AsciiArgs),
    /// Write the transformed series to a CSV file.
    Export(ExportArgs),
    /// Generate a synthetic dataset in the expected CSV format.
    Sample(SampleArgs),
}

/// Common options for selecting and transforming series.
#[derive(Debug, Parser, Clone)]
pub struct SeriesArgs {
    /// Location key: a state name or abbreviation, or State:County.
    /// Repeatable; when omitted, every state in the dataset is plotted.
    #[arg(short = 'k', long = "key", value_name = "STATE[:COUNTY]")]
    pub keys: Vec<String>,

    /// Plot cumulative deaths instead of cases.
    #[arg(short = 'd', long)]
    pub deaths: bool,

    /// Plot new counts per day instead of cumulative totals.
    #[arg(short = 'p', long = "per-day")]
    pub per_day: bool,

    /// Start plotting at this day, as month-day (e.g. 3-15). The year is
    /// taken from the dataset. Invalid values disable the filter with a
    /// warning rather than aborting.
    #[arg(short = 's', long, value_name = "M-D")]
    pub start: Option<String>,

    /// Number of days to average (centered window; even values are rounded
    /// up to the next odd value; 1 disables smoothing).
    #[arg(short = 'a', long = "average", default_value_t = 1, value_name = "DAYS")]
    pub average: usize,

    /// State-level dataset CSV (overrides $COVID_STATES_CSV).
    #[arg(long, value_name = "CSV")]
    pub states_csv: Option<PathBuf>,

    /// County-level dataset CSV (overrides $COVID_COUNTIES_CSV).
    #[arg(long, value_name = "CSV")]
    pub counties_csv: Option<PathBuf>,

    /// State abbreviation map JSON (overrides $COVID_STATE_CODES).
    #[arg(long, value_name = "JSON")]
    pub codes: Option<PathBuf>,
}

/// Options for the ASCII renderer.
#[derive(Debug, Parser)]
pub struct AsciiArgs {
    #[command(flatten)]
    pub series: SeriesArgs,

    /// Plot width (columns).
    #[arg(long, default_value_t = 100)]
    pub width: usize,

    /// Plot height (rows).
    #[arg(long, default_value_t = 25)]
    pub height: usize,
}

/// Options for the CSV exporter.
#[derive(Debug, Parser)]
pub struct ExportArgs {
    #[command(flatten)]
    pub series: SeriesArgs,

    /// Output CSV path.
    #[arg(short = 'o', long, value_name = "CSV")]
    pub out: PathBuf,
}

/// Options for synthetic dataset generation.
#[derive(Debug, Parser)]
pub struct SampleArgs {
    /// Number of daily rows per location.
    #[arg(long, default_value_t = 120)]
    pub days: usize,

    /// Number of synthetic states.
    #[arg(long, default_value_t = 6)]
    pub states: usize,

    /// Number of synthetic counties per state.
    #[arg(long, default_value_t = 3)]
    pub counties: usize,

    /// Random seed (deterministic output per seed).
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// First date of the generated series (YYYY-MM-DD).
    #[arg(long, default_value = "2020-03-01")]
    pub start: NaiveDate,

    /// Directory to write us-states.csv and us-counties.csv into.
    #[arg(long, value_name = "DIR", default_value = "data")]
    pub out_dir: PathBuf,
}
