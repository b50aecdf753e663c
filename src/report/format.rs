//! Formatted terminal output for runs and series.

use crate::app::pipeline::RunOutput;
use crate::domain::{KeySeries, Metric, Mode, RunConfig};
use crate::series::transform::coerce_window;

/// Chart title: "Cumulative COVID-19 Cases", "New Daily COVID-19 Deaths
/// (7 day avg)", etc. The window in the title is the coerced (odd) value
/// actually used for averaging.
pub fn chart_title(metric: Metric, mode: Mode, window: usize) -> String {
    let mut title = format!(
        "{} COVID-19 {}",
        mode.display_name(),
        metric.display_name()
    );
    if window > 1 {
        title.push_str(&format!(" ({} day avg)", coerce_window(window)));
    }
    title
}

/// Format the full run summary (ingest stats + options + key outcomes).
pub fn format_run_summary(run: &RunOutput, config: &RunConfig) -> String {
    let mut out = String::new();

    out.push_str(&format!(
        "=== covid — {} ===\n",
        chart_title(config.metric, config.mode(), config.window)
    ));
    out.push_str(&format!(
        "Rows: read={} used={} skipped={}\n",
        run.ingest.rows_read,
        run.ingest.rows_used,
        run.ingest.row_errors.len(),
    ));
    out.push_str(&format!(
        "Tables: states={} counties={}\n",
        run.ingest.dataset.states.len(),
        run.ingest.dataset.counties.len(),
    ));

    match run.start_date {
        Some(date) => out.push_str(&format!("Start: {date}\n")),
        None => out.push_str("Start: full range\n"),
    }

    out.push_str(&format!(
        "Keys: requested={} plotted={}\n",
        run.keys.len(),
        run.series.len(),
    ));

    let dropped_labels: Vec<String> = run
        .keys
        .iter()
        .map(|k| k.to_string())
        .filter(|label| !run.series.iter().any(|s| &s.label == label))
        .collect();
    if !dropped_labels.is_empty() {
        out.push_str(&format!("Dropped (no plottable series): {}\n", dropped_labels.join(", ")));
    }

    out.push('\n');
    out.push_str(&format_key_table(&run.series));
    out
}

/// Per-key table: point counts, date range, last and peak values.
pub fn format_key_table(series: &[KeySeries]) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "{:<28} {:>6} {:>12} {:>12} {:>12} {:>12}\n",
        "key", "n", "from", "to", "last", "peak"
    ));

    for entry in series {
        let raw = &entry.output.raw;
        let from = raw
            .first_date()
            .map(|d| d.to_string())
            .unwrap_or_else(|| "-".to_string());
        let to = raw
            .last_date()
            .map(|d| d.to_string())
            .unwrap_or_else(|| "-".to_string());
        let last = raw.values.last().copied().unwrap_or(0.0);
        let peak = raw.values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let peak = if peak.is_finite() { peak } else { 0.0 };

        out.push_str(&format!(
            "{:<28} {:>6} {:>12} {:>12} {:>12.1} {:>12.1}\n",
            entry.label,
            raw.len(),
            from,
            to,
            last,
            peak,
        ));
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Series, TransformOutput};
    use chrono::NaiveDate;

    #[test]
    fn title_covers_all_modes() {
        assert_eq!(
            chart_title(Metric::Cases, Mode::Cumulative, 1),
            "Cumulative COVID-19 Cases"
        );
        assert_eq!(
            chart_title(Metric::Deaths, Mode::PerDay, 1),
            "New Daily COVID-19 Deaths"
        );
        // Even windows show the coerced value actually used.
        assert_eq!(
            chart_title(Metric::Cases, Mode::PerDay, 6),
            "New Daily COVID-19 Cases (7 day avg)"
        );
    }

    #[test]
    fn key_table_lists_labels_and_counts() {
        let d = |day| NaiveDate::from_ymd_opt(2020, 3, day).unwrap();
        let series = vec![KeySeries {
            label: "California".to_string(),
            output: TransformOutput {
                raw: Series::new(vec![d(1), d(2)], vec![10.0, 25.0]),
                averaged: None,
            },
        }];
        let table = format_key_table(&series);
        assert!(table.contains("California"));
        assert!(table.contains("2020-03-01"));
        assert!(table.contains("25.0"));
    }
}
