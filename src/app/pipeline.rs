//! Shared pipeline logic used by every front-end.
//!
//! Keeping this in one place avoids duplicating the core workflow:
//! resolve keys -> ingest datasets -> extract per key -> transform per key
//!
//! The TUI, ASCII, and export front-ends can then focus on presentation.
//! The TUI additionally re-runs only the extract/transform stages when the
//! user toggles settings, via `build_key_series`.

use chrono::NaiveDate;

use crate::domain::{
    Dataset, KeySeries, LocationKey, Metric, RunConfig, TransformOptions,
};
use crate::error::AppError;
use crate::io::ingest::IngestedDataset;

/// All computed outputs of a single run.
#[derive(Debug, Clone)]
pub struct RunOutput {
    pub ingest: IngestedDataset,
    /// Resolved keys, in input order (or the default all-states set).
    pub keys: Vec<LocationKey>,
    /// Start date resolved against the dataset's implicit year, if any.
    pub start_date: Option<NaiveDate>,
    /// Surviving keys' series, in key order. Keys whose series was dropped
    /// (no match, too short to difference) do not appear here.
    pub series: Vec<KeySeries>,
}

/// Execute the full pipeline: resolve, ingest, extract, transform.
pub fn run_pipeline(config: &RunConfig) -> Result<RunOutput, AppError> {
    // Key resolution happens first: with no keys it is a free no-op, and a
    // broken abbreviation map should fail before we spend time on ingest.
    let resolved = crate::keys::resolve_keys(&config.keys, &config.codes_path)?;

    let ingest = crate::io::ingest::load_dataset(&config.states_csv, &config.counties_csv)?;

    let keys = if resolved.is_empty() {
        default_keys(&ingest.dataset)
    } else {
        resolved
    };

    let start_date = resolve_start_date(config.start_input.as_deref(), &ingest.dataset);
    let options = TransformOptions {
        per_day: config.per_day,
        start_date,
        window: config.window,
    };

    let series = build_key_series(&keys, &ingest.dataset, config.metric, &options);

    Ok(RunOutput {
        ingest,
        keys,
        start_date,
        series,
    })
}

/// Extract and transform each key against an already-loaded dataset.
///
/// Keys are processed sequentially and independently; output order matches
/// key order. Dropped keys simply do not appear.
pub fn build_key_series(
    keys: &[LocationKey],
    dataset: &Dataset,
    metric: Metric,
    options: &TransformOptions,
) -> Vec<KeySeries> {
    keys.iter()
        .filter_map(|key| {
            let extracted = crate::series::extract(key, dataset, metric);
            crate::series::transform(extracted, options).map(|output| KeySeries {
                label: key.to_string(),
                output,
            })
        })
        .collect()
}

/// Default key set when the user supplies none: every state, sorted.
fn default_keys(dataset: &Dataset) -> Vec<LocationKey> {
    dataset
        .state_names_sorted()
        .into_iter()
        .map(|state| LocationKey {
            state,
            county: None,
        })
        .collect()
}

/// Resolve an `M-D` start input against the dataset's implicit year.
///
/// Any failure disables the filter for the run with a stderr diagnostic;
/// an absent input is silently no filter.
fn resolve_start_date(input: Option<&str>, dataset: &Dataset) -> Option<NaiveDate> {
    let raw = input?.trim();
    if raw.is_empty() {
        return None;
    }

    match parse_month_day(raw, dataset.implicit_year()?) {
        Some(date) => Some(date),
        None => {
            eprintln!("invalid start date '{raw}'; plotting the full range");
            None
        }
    }
}

fn parse_month_day(raw: &str, year: i32) -> Option<NaiveDate> {
    let mut parts = raw.splitn(3, '-');
    let month: u32 = parts.next()?.parse().ok()?;
    let day: u32 = parts.next()?.parse().ok()?;
    NaiveDate::from_ymd_opt(year, month, day)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::CaseRecord;

    fn d(m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2020, m, day).unwrap()
    }

    /// Ten consecutive daily cumulative rows for one state.
    fn california_dataset() -> Dataset {
        let states = (0..10)
            .map(|i| CaseRecord {
                date: d(3, 1 + i),
                state: "California".to_string(),
                county: None,
                fips: "06".to_string(),
                cases: 10 * (i as u64 + 1),
                deaths: i as u64,
            })
            .collect();
        Dataset {
            states,
            counties: Vec::new(),
        }
    }

    #[test]
    fn per_day_with_window_three_yields_seven_averaged_points() {
        // 10 rows -> 9 after differencing -> 7 after a centered window of
        // half = 1.
        let keys = vec![LocationKey::parse("California")];
        let options = TransformOptions {
            per_day: true,
            start_date: None,
            window: 3,
        };
        let series = build_key_series(&keys, &california_dataset(), Metric::Cases, &options);
        assert_eq!(series.len(), 1);
        let out = &series[0].output;
        assert_eq!(out.raw.len(), 9);
        assert_eq!(out.averaged.as_ref().unwrap().len(), 7);
    }

    #[test]
    fn dropped_keys_are_absent_and_order_is_preserved() {
        let keys = vec![
            LocationKey::parse("Nowhere"),
            LocationKey::parse("California"),
        ];
        let options = TransformOptions::default();
        let series = build_key_series(&keys, &california_dataset(), Metric::Cases, &options);
        assert_eq!(series.len(), 1);
        assert_eq!(series[0].label, "California");
    }

    #[test]
    fn month_day_parses_against_the_implicit_year() {
        let dataset = california_dataset();
        assert_eq!(resolve_start_date(Some("3-5"), &dataset), Some(d(3, 5)));
        assert_eq!(resolve_start_date(Some(""), &dataset), None);
        assert_eq!(resolve_start_date(None, &dataset), None);
        assert_eq!(resolve_start_date(Some("13-40"), &dataset), None);
        assert_eq!(resolve_start_date(Some("soon"), &dataset), None);
    }

    #[test]
    fn default_keys_cover_every_state_sorted() {
        let mut dataset = california_dataset();
        dataset.states.push(CaseRecord {
            date: d(3, 1),
            state: "Avalon".to_string(),
            county: None,
            fips: String::new(),
            cases: 1,
            deaths: 0,
        });
        let keys = default_keys(&dataset);
        let labels: Vec<String> = keys.iter().map(|k| k.to_string()).collect();
        assert_eq!(labels, vec!["Avalon", "California"]);
    }
}
