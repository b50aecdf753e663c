//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable where it
//! matters so they can be:
//!
//! - used in-memory during extraction/transformation
//! - exported to CSV
//! - rendered by both the TUI and the ASCII plotter

use std::collections::BTreeSet;
use std::path::PathBuf;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

/// Which dataset column a series is projected from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Metric {
    Cases,
    Deaths,
}

impl Metric {
    /// Lowercase column name as it appears in the dataset CSVs.
    pub fn column_name(self) -> &'static str {
        match self {
            Metric::Cases => "cases",
            Metric::Deaths => "deaths",
        }
    }

    /// Capitalized label for chart titles.
    pub fn display_name(self) -> &'static str {
        match self {
            Metric::Cases => "Cases",
            Metric::Deaths => "Deaths",
        }
    }

    /// Project the metric value out of a record.
    pub fn value_of(self, record: &CaseRecord) -> u64 {
        match self {
            Metric::Cases => record.cases,
            Metric::Deaths => record.deaths,
        }
    }
}

/// Cumulative totals vs first differences.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    Cumulative,
    PerDay,
}

impl Mode {
    pub fn from_per_day(per_day: bool) -> Self {
        if per_day { Mode::PerDay } else { Mode::Cumulative }
    }

    /// Label used in chart titles ("Cumulative COVID-19 Cases" etc.).
    pub fn display_name(self) -> &'static str {
        match self {
            Mode::Cumulative => "Cumulative",
            Mode::PerDay => "New Daily",
        }
    }
}

/// One row of the NYT-style dataset after ingest.
///
/// State-level rows have `county = None`; county-level rows carry both the
/// county and its state. `fips` is kept verbatim (it may be empty) so exports
/// can round-trip it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaseRecord {
    pub date: NaiveDate,
    pub state: String,
    pub county: Option<String>,
    pub fips: String,
    pub cases: u64,
    pub deaths: u64,
}

/// The fully materialized input: state-level and county-level tables.
///
/// Loaded once per run and read-only afterwards. Within a single location's
/// records, dates are unique (a property of the upstream dataset; extraction
/// sorts but does not deduplicate).
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    pub states: Vec<CaseRecord>,
    pub counties: Vec<CaseRecord>,
}

impl Dataset {
    pub fn is_empty(&self) -> bool {
        self.states.is_empty() && self.counties.is_empty()
    }

    /// Year of the earliest record across both tables.
    ///
    /// Start dates are given as `M-D` on the command line; the year is implied
    /// by the dataset rather than hardcoded.
    pub fn implicit_year(&self) -> Option<i32> {
        self.states
            .iter()
            .chain(self.counties.iter())
            .map(|r| r.date)
            .min()
            .map(|d| d.year())
    }

    /// All distinct state names in the state-level table, sorted ascending.
    ///
    /// Used as the default key set when the user supplies no keys.
    pub fn state_names_sorted(&self) -> Vec<String> {
        let names: BTreeSet<&str> = self.states.iter().map(|r| r.state.as_str()).collect();
        names.into_iter().map(str::to_string).collect()
    }
}

/// A location to plot: a state, or a state/county pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocationKey {
    pub state: String,
    pub county: Option<String>,
}

impl LocationKey {
    /// Parse `"State"` or `"State:County"`.
    ///
    /// Only the first two `:`-separated fields are used; anything after a
    /// second `:` is discarded.
    pub fn parse(raw: &str) -> Self {
        let mut parts = raw.splitn(3, ':');
        let state = parts.next().unwrap_or("").to_string();
        let county = parts.next().map(str::to_string);
        Self { state, county }
    }

    pub fn is_county(&self) -> bool {
        self.county.is_some()
    }
}

impl std::fmt::Display for LocationKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.county {
            Some(county) => write!(f, "{}:{}", self.state, county),
            None => write!(f, "{}", self.state),
        }
    }
}

/// A date-ordered series of (date, value) pairs.
///
/// Dates and values are kept as parallel vectors; `is_aligned()` is the
/// pipeline-stage invariant. Values are `f64` because differencing can go
/// negative (cumulative corrections) and averaging is fractional.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Series {
    pub dates: Vec<NaiveDate>,
    pub values: Vec<f64>,
}

impl Series {
    pub fn new(dates: Vec<NaiveDate>, values: Vec<f64>) -> Self {
        Self { dates, values }
    }

    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    pub fn is_aligned(&self) -> bool {
        self.dates.len() == self.values.len()
    }

    /// Iterate paired (date, value) points.
    pub fn points(&self) -> impl Iterator<Item = (NaiveDate, f64)> + '_ {
        self.dates.iter().copied().zip(self.values.iter().copied())
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.dates.first().copied()
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.dates.last().copied()
    }
}

/// Transform options, applied in order: differencing, trim, smoothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct TransformOptions {
    /// Convert cumulative totals to per-day deltas.
    pub per_day: bool,
    /// Drop entries before this date (exact match against the series' dates).
    pub start_date: Option<NaiveDate>,
    /// Centered moving-average window in days; 1 disables smoothing, even
    /// values are coerced up to the next odd value.
    pub window: usize,
}

/// Transform output for one key.
///
/// `averaged` is present only when smoothing is active; it may be empty when
/// the series is shorter than the window (raw points are still shown).
#[derive(Debug, Clone, PartialEq)]
pub struct TransformOutput {
    pub raw: Series,
    pub averaged: Option<Series>,
}

impl TransformOutput {
    /// The series a single-line renderer should draw: averaged when present
    /// and non-empty, raw otherwise.
    pub fn line(&self) -> &Series {
        match &self.averaged {
            Some(avg) if !avg.is_empty() => avg,
            _ => &self.raw,
        }
    }
}

/// A surviving key's renderable data, in resolved input order.
#[derive(Debug, Clone, PartialEq)]
pub struct KeySeries {
    pub label: String,
    pub output: TransformOutput,
}

/// A full run's configuration as understood by the pipeline.
///
/// This is derived from CLI flags plus environment/default path resolution.
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// Raw key strings as typed by the user (pre-resolution).
    pub keys: Vec<String>,
    pub metric: Metric,
    pub per_day: bool,
    /// Raw `M-D` start date input; resolved against the dataset's year.
    pub start_input: Option<String>,
    /// Smoothing window in days (1 = off).
    pub window: usize,

    pub states_csv: PathBuf,
    pub counties_csv: PathBuf,
    pub codes_path: PathBuf,
}

impl RunConfig {
    pub fn mode(&self) -> Mode {
        Mode::from_per_day(self.per_day)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn location_key_parses_state_and_county() {
        let key = LocationKey::parse("New York");
        assert_eq!(key.state, "New York");
        assert_eq!(key.county, None);

        let key = LocationKey::parse("New York:Albany");
        assert_eq!(key.state, "New York");
        assert_eq!(key.county.as_deref(), Some("Albany"));
        assert_eq!(key.to_string(), "New York:Albany");
    }

    #[test]
    fn location_key_ignores_fields_past_the_second() {
        let key = LocationKey::parse("A:B:C");
        assert_eq!(key.state, "A");
        assert_eq!(key.county.as_deref(), Some("B"));
    }

    #[test]
    fn implicit_year_is_earliest_record_year() {
        let dataset = Dataset {
            states: vec![CaseRecord {
                date: d(2021, 2, 1),
                state: "Avalon".to_string(),
                county: None,
                fips: String::new(),
                cases: 1,
                deaths: 0,
            }],
            counties: vec![CaseRecord {
                date: d(2020, 12, 30),
                state: "Avalon".to_string(),
                county: Some("Alder".to_string()),
                fips: String::new(),
                cases: 1,
                deaths: 0,
            }],
        };
        assert_eq!(dataset.implicit_year(), Some(2020));
        assert_eq!(Dataset::default().implicit_year(), None);
    }

    #[test]
    fn state_names_are_sorted_and_deduplicated() {
        let row = |state: &str| CaseRecord {
            date: d(2020, 3, 1),
            state: state.to_string(),
            county: None,
            fips: String::new(),
            cases: 0,
            deaths: 0,
        };
        let dataset = Dataset {
            states: vec![row("Borealis"), row("Avalon"), row("Borealis")],
            counties: Vec::new(),
        };
        assert_eq!(dataset.state_names_sorted(), vec!["Avalon", "Borealis"]);
    }

    #[test]
    fn line_prefers_non_empty_averaged() {
        let raw = Series::new(vec![d(2020, 3, 1)], vec![1.0]);
        let out = TransformOutput {
            raw: raw.clone(),
            averaged: Some(Series::default()),
        };
        assert_eq!(out.line(), &raw);
    }
}
