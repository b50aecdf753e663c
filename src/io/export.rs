//! Export transformed series to CSV.
//!
//! The export is meant to be easy to consume in spreadsheets or downstream
//! scripts: one row per raw point, with the averaged value alongside when the
//! smoothing window covers that date (blank otherwise).

use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::app::pipeline::RunOutput;
use crate::domain::{KeySeries, RunConfig};
use crate::error::AppError;

/// Write every surviving key's series to one CSV file.
pub fn write_series_csv(path: &Path, run: &RunOutput, config: &RunConfig) -> Result<(), AppError> {
    let mut file = File::create(path).map_err(|e| {
        AppError::config(format!(
            "Failed to create export CSV '{}': {e}",
            path.display()
        ))
    })?;

    writeln!(file, "key,date,metric,mode,value,averaged")
        .map_err(|e| AppError::config(format!("Failed to write export CSV header: {e}")))?;

    let metric = config.metric.column_name();
    let mode = match config.mode() {
        crate::domain::Mode::Cumulative => "cumulative",
        crate::domain::Mode::PerDay => "per-day",
    };

    for entry in &run.series {
        for (date, value, averaged) in rows_for(entry) {
            let averaged = averaged.map(|v| format!("{v:.4}")).unwrap_or_default();
            writeln!(
                file,
                "{},{},{},{},{},{}",
                entry.label, date, metric, mode, value, averaged
            )
            .map_err(|e| AppError::config(format!("Failed to write export CSV row: {e}")))?;
        }
    }

    Ok(())
}

/// Pair each raw point with its averaged value where one exists.
///
/// The averaged series covers a contiguous, centered slice of the raw dates,
/// so a two-pointer walk lines them up without any lookups.
fn rows_for(entry: &KeySeries) -> Vec<(chrono::NaiveDate, f64, Option<f64>)> {
    let raw = &entry.output.raw;
    let averaged = entry.output.averaged.as_ref();

    let mut avg_idx = 0usize;
    raw.points()
        .map(|(date, value)| {
            let avg = averaged.and_then(|avg| {
                if avg_idx < avg.len() && avg.dates[avg_idx] == date {
                    let v = avg.values[avg_idx];
                    avg_idx += 1;
                    Some(v)
                } else {
                    None
                }
            });
            (date, value, avg)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Series, TransformOutput};
    use chrono::NaiveDate;

    #[test]
    fn averaged_values_line_up_with_centered_dates() {
        let d = |day| NaiveDate::from_ymd_opt(2020, 3, day).unwrap();
        let entry = KeySeries {
            label: "Avalon".to_string(),
            output: TransformOutput {
                raw: Series::new(
                    vec![d(1), d(2), d(3), d(4), d(5)],
                    vec![1.0, 2.0, 3.0, 4.0, 5.0],
                ),
                averaged: Some(Series::new(vec![d(2), d(3), d(4)], vec![2.0, 3.0, 4.0])),
            },
        };

        let rows = rows_for(&entry);
        assert_eq!(rows.len(), 5);
        assert_eq!(rows[0].2, None);
        assert_eq!(rows[1].2, Some(2.0));
        assert_eq!(rows[3].2, Some(4.0));
        assert_eq!(rows[4].2, None);
    }
}
