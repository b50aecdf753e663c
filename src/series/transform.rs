//! Series transformation: differencing, start-date trimming, smoothing.
//!
//! Step order is fixed and significant: per-day differencing first (it
//! shortens the series by one and shifts the dates), then the start-date
//! trim, then the centered moving average. Each step preserves the
//! date/value alignment invariant.

use chrono::NaiveDate;

use crate::domain::{Series, TransformOptions, TransformOutput};

/// Transform one extracted series.
///
/// Returns `None` when the key has no plottable series: empty or misaligned
/// input, or a series too short to difference. These are defined drops, not
/// errors; the key simply does not appear in the output or the legend.
pub fn transform(series: Series, options: &TransformOptions) -> Option<TransformOutput> {
    if series.is_empty() || !series.is_aligned() {
        return None;
    }

    let mut series = series;

    if options.per_day {
        series = difference(series)?;
    }

    if let Some(start) = options.start_date {
        series = trim_from(series, start);
    }

    if options.window > 1 {
        let averaged = smooth(&series, options.window);
        return Some(TransformOutput {
            raw: series,
            averaged: Some(averaged),
        });
    }

    Some(TransformOutput {
        raw: series,
        averaged: None,
    })
}

/// First differences: `d[i] = v[i+1] - v[i]`, paired with `dates[1..]`.
///
/// The first date is dropped since it has no predecessor. A series with fewer
/// than two points cannot be differenced and is dropped. Negative deltas are
/// preserved; upstream cumulative counts are occasionally revised downward.
pub fn difference(series: Series) -> Option<Series> {
    if series.len() < 2 {
        return None;
    }

    let values = series.values.windows(2).map(|w| w[1] - w[0]).collect();
    let dates = series.dates[1..].to_vec();
    Some(Series::new(dates, values))
}

/// Truncate the series to entries from `start` onward, inclusive.
///
/// The match is exact: if `start` is not one of the series' dates the series
/// is returned untouched. That silent no-op is intentional (it mirrors the
/// exact-match behavior users already rely on), although it does mean a start
/// date between two observations filters nothing.
pub fn trim_from(series: Series, start: NaiveDate) -> Series {
    match series.dates.iter().position(|&d| d == start) {
        Some(idx) => Series::new(
            series.dates[idx..].to_vec(),
            series.values[idx..].to_vec(),
        ),
        None => series,
    }
}

/// Coerce an even window up to the next odd value so the centered window has
/// equal halves.
pub fn coerce_window(window: usize) -> usize {
    if window % 2 == 0 { window + 1 } else { window }
}

/// Equal-weight centered moving average.
///
/// With `half = (window - 1) / 2` after odd-coercion, the averaged value at
/// index `i` in `[half, n-1-half]` is the mean of `values[i-half ..= i+half]`,
/// aligned to `dates[half .. n-half]`. A series with `n <= 2*half` produces an
/// empty averaged series (callers show raw points only).
pub fn smooth(series: &Series, window: usize) -> Series {
    let window = coerce_window(window);
    let half = window / 2;
    let n = series.len();

    if n <= 2 * half {
        return Series::default();
    }

    let mut values = Vec::with_capacity(n - 2 * half);
    for i in half..n - half {
        let total: f64 = series.values[i - half..=i + half].iter().sum();
        values.push(total / window as f64);
    }
    let dates = series.dates[half..n - half].to_vec();
    Series::new(dates, values)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2020, 3, day).unwrap()
    }

    fn series(days: std::ops::RangeInclusive<u32>, values: &[f64]) -> Series {
        Series::new(days.map(d).collect(), values.to_vec())
    }

    #[test]
    fn differencing_pairs_deltas_with_later_dates() {
        let out = difference(series(1..=3, &[10.0, 15.0, 20.0])).unwrap();
        assert_eq!(out.values, vec![5.0, 5.0]);
        assert_eq!(out.dates, vec![d(2), d(3)]);
    }

    #[test]
    fn differencing_preserves_negative_deltas() {
        let out = difference(series(1..=3, &[10.0, 8.0, 12.0])).unwrap();
        assert_eq!(out.values, vec![-2.0, 4.0]);
    }

    #[test]
    fn short_series_cannot_be_differenced() {
        assert!(difference(series(1..=1, &[10.0])).is_none());
        assert!(difference(Series::default()).is_none());
    }

    #[test]
    fn trim_matches_exactly_or_leaves_untouched() {
        let input = series(1..=5, &[1.0, 2.0, 3.0, 4.0, 5.0]);

        let trimmed = trim_from(input.clone(), d(3));
        assert_eq!(trimmed.dates, vec![d(3), d(4), d(5)]);
        assert_eq!(trimmed.values, vec![3.0, 4.0, 5.0]);

        // March 6th is not in the series: exact-match no-op.
        let untouched = trim_from(input.clone(), d(6));
        assert_eq!(untouched, input);
    }

    #[test]
    fn window_three_averages_the_middle_points() {
        let input = series(1..=5, &[1.0, 2.0, 3.0, 4.0, 5.0]);
        let averaged = smooth(&input, 3);
        assert_eq!(averaged.values, vec![2.0, 3.0, 4.0]);
        assert_eq!(averaged.dates, vec![d(2), d(3), d(4)]);
    }

    #[test]
    fn even_window_is_coerced_to_the_next_odd() {
        assert_eq!(coerce_window(4), 5);
        assert_eq!(coerce_window(5), 5);
        assert_eq!(coerce_window(1), 1);

        // Window 4 behaves exactly like window 5: half = 2.
        let input = series(1..=5, &[1.0, 2.0, 3.0, 4.0, 5.0]);
        assert_eq!(smooth(&input, 4), smooth(&input, 5));
        assert_eq!(smooth(&input, 4).values, vec![3.0]);
    }

    #[test]
    fn oversized_window_yields_an_empty_averaged_series() {
        let input = series(1..=3, &[1.0, 2.0, 3.0]);
        let averaged = smooth(&input, 7);
        assert!(averaged.is_empty());
        assert!(averaged.is_aligned());
    }

    #[test]
    fn transform_keeps_raw_alongside_averaged() {
        let input = series(1..=5, &[1.0, 2.0, 3.0, 4.0, 5.0]);
        let options = TransformOptions {
            per_day: false,
            start_date: None,
            window: 3,
        };
        let out = transform(input.clone(), &options).unwrap();
        assert_eq!(out.raw, input);
        let averaged = out.averaged.unwrap();
        assert_eq!(averaged.values, vec![2.0, 3.0, 4.0]);
    }

    #[test]
    fn transform_applies_steps_in_order() {
        // Cumulative 10..=19 over ten days: difference -> nine 1.0 deltas on
        // days 2..=10, trim from day 4 -> seven points, window 3 -> five.
        let values: Vec<f64> = (10..20).map(f64::from).collect();
        let input = series(1..=10, &values);
        let options = TransformOptions {
            per_day: true,
            start_date: Some(d(4)),
            window: 3,
        };
        let out = transform(input, &options).unwrap();
        assert_eq!(out.raw.dates.first(), Some(&d(4)));
        assert_eq!(out.raw.len(), 7);
        let averaged = out.averaged.unwrap();
        assert_eq!(averaged.len(), 5);
        assert!(averaged.values.iter().all(|&v| (v - 1.0).abs() < 1e-12));
    }

    #[test]
    fn transform_drops_undifferencable_keys() {
        let options = TransformOptions {
            per_day: true,
            start_date: None,
            window: 1,
        };
        assert!(transform(series(1..=1, &[10.0]), &options).is_none());
        assert!(transform(Series::default(), &options).is_none());
    }

    #[test]
    fn transform_drops_misaligned_input() {
        let broken = Series::new(vec![d(1), d(2)], vec![1.0]);
        assert!(transform(broken, &TransformOptions::default()).is_none());
    }

    #[test]
    fn no_smoothing_returns_a_single_series() {
        let input = series(1..=3, &[1.0, 2.0, 3.0]);
        let out = transform(input.clone(), &TransformOptions::default()).unwrap();
        assert_eq!(out.raw, input);
        assert!(out.averaged.is_none());
    }
}
