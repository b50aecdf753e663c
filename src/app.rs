//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments
//! - resolves dataset/map paths from flags, environment, and defaults
//! - runs the resolve -> extract -> transform pipeline
//! - dispatches to the TUI, ASCII, export, or sample front-ends

use std::path::PathBuf;

use clap::Parser;

use crate::cli::{Command, SeriesArgs};
use crate::domain::{Metric, RunConfig};
use crate::error::AppError;

pub mod pipeline;

/// Built-in dataset locations (the NYT covid-19-data layout).
const DEFAULT_STATES_CSV: &str = "data/us-states.csv";
const DEFAULT_COUNTIES_CSV: &str = "data/us-counties.csv";
const DEFAULT_STATE_CODES: &str = "state-codes.json";

/// Entry point for the `covid` binary.
pub fn run() -> Result<(), AppError> {
    // Optional .env for the COVID_* path overrides; absence is fine.
    let _ = dotenvy::dotenv();

    // We want `covid -k NY` to behave like `covid chart -k NY`.
    //
    // Clap requires a subcommand name, so we do a small, explicit rewrite of
    // the argv list before parsing. This preserves a clean clap structure
    // while retaining the flag-only UX.
    let argv = rewrite_args(std::env::args().collect());
    let cli = crate::cli::Cli::parse_from(argv);

    match cli.command {
        Command::Chart(args) => handle_chart(args),
        Command::Ascii(args) => handle_ascii(args),
        Command::Export(args) => handle_export(args),
        Command::Sample(args) => handle_sample(args),
    }
}

fn handle_chart(args: SeriesArgs) -> Result<(), AppError> {
    let config = run_config_from_args(&args);
    crate::tui::run(config)
}

fn handle_ascii(args: crate::cli::AsciiArgs) -> Result<(), AppError> {
    let config = run_config_from_args(&args.series);
    let run = pipeline::run_pipeline(&config)?;

    println!("{}", crate::report::format_run_summary(&run, &config));
    println!(
        "{}",
        crate::plot::render_ascii_chart(&run.series, args.width, args.height)
    );
    Ok(())
}

fn handle_export(args: crate::cli::ExportArgs) -> Result<(), AppError> {
    let config = run_config_from_args(&args.series);
    let run = pipeline::run_pipeline(&config)?;

    crate::io::export::write_series_csv(&args.out, &run, &config)?;
    println!(
        "Wrote {} series ({} keys requested) to {}",
        run.series.len(),
        run.keys.len(),
        args.out.display()
    );
    Ok(())
}

fn handle_sample(args: crate::cli::SampleArgs) -> Result<(), AppError> {
    let config = crate::data::sample::SampleConfig {
        days: args.days,
        states: args.states,
        counties_per_state: args.counties,
        seed: args.seed,
        start: args.start,
    };
    let (states_path, counties_path) =
        crate::data::sample::write_sample_dataset(&args.out_dir, &config)?;
    println!(
        "Wrote {} and {}",
        states_path.display(),
        counties_path.display()
    );
    Ok(())
}

/// Build the pipeline configuration from CLI flags.
///
/// Path precedence: explicit flag, then COVID_* environment variable (via
/// `.env` or the real environment), then the built-in default.
pub fn run_config_from_args(args: &SeriesArgs) -> RunConfig {
    RunConfig {
        keys: args.keys.clone(),
        metric: if args.deaths { Metric::Deaths } else { Metric::Cases },
        per_day: args.per_day,
        start_input: args.start.clone(),
        window: args.average,
        states_csv: resolve_path(&args.states_csv, "COVID_STATES_CSV", DEFAULT_STATES_CSV),
        counties_csv: resolve_path(&args.counties_csv, "COVID_COUNTIES_CSV", DEFAULT_COUNTIES_CSV),
        codes_path: resolve_path(&args.codes, "COVID_STATE_CODES", DEFAULT_STATE_CODES),
    }
}

fn resolve_path(flag: &Option<PathBuf>, env_var: &str, default: &str) -> PathBuf {
    if let Some(path) = flag {
        return path.clone();
    }
    match std::env::var_os(env_var) {
        Some(value) if !value.is_empty() => PathBuf::from(value),
        _ => PathBuf::from(default),
    }
}

/// Rewrite argv so `covid` defaults to `covid chart`.
///
/// Rules:
/// - `covid`                     -> `covid chart`
/// - `covid -k NY ...`           -> `covid chart -k NY ...`
/// - `covid --help/--version/-h` -> unchanged (show top-level help/version)
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    let Some(arg1) = argv.get(1).cloned() else {
        argv.push("chart".to_string());
        return argv;
    };

    let is_top_level_help_or_version = matches!(
        arg1.as_str(),
        "-h" | "--help" | "-V" | "--version" | "help"
    );
    if is_top_level_help_or_version {
        return argv;
    }

    let is_subcommand = matches!(arg1.as_str(), "chart" | "ascii" | "export" | "sample");
    if is_subcommand {
        return argv;
    }

    // If the first token is a flag, treat it as "chart flags".
    if arg1.starts_with('-') {
        argv.insert(1, "chart".to_string());
        return argv;
    }

    // Otherwise, leave as-is.
    argv
}

#[cfg(test)]
mod tests {
    use super::*;

    fn argv(parts: &[&str]) -> Vec<String> {
        parts.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn bare_invocation_defaults_to_chart() {
        assert_eq!(rewrite_args(argv(&["covid"])), argv(&["covid", "chart"]));
    }

    #[test]
    fn leading_flag_is_treated_as_chart_flags() {
        assert_eq!(
            rewrite_args(argv(&["covid", "-k", "NY"])),
            argv(&["covid", "chart", "-k", "NY"])
        );
    }

    #[test]
    fn subcommands_and_help_pass_through() {
        assert_eq!(
            rewrite_args(argv(&["covid", "ascii", "-k", "NY"])),
            argv(&["covid", "ascii", "-k", "NY"])
        );
        assert_eq!(rewrite_args(argv(&["covid", "--help"])), argv(&["covid", "--help"]));
        assert_eq!(rewrite_args(argv(&["covid", "-V"])), argv(&["covid", "-V"]));
    }
}
