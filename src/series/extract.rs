//! Series extraction: from raw records to a date-ordered series.

use crate::domain::{Dataset, LocationKey, Metric, Series};

/// Extract the metric series for one resolved key.
///
/// A compound key selects county records matching both state and county
/// exactly; a bare key selects state records matching the state name exactly.
/// Matches are sorted ascending by date before projection. An empty match set
/// yields an empty series, not an error; the transformer drops the key.
pub fn extract(key: &LocationKey, dataset: &Dataset, metric: Metric) -> Series {
    let mut matched: Vec<_> = match &key.county {
        Some(county) => dataset
            .counties
            .iter()
            .filter(|r| r.state == key.state && r.county.as_deref() == Some(county.as_str()))
            .collect(),
        None => dataset
            .states
            .iter()
            .filter(|r| r.state == key.state)
            .collect(),
    };

    matched.sort_by_key(|r| r.date);

    let dates = matched.iter().map(|r| r.date).collect();
    let values = matched
        .iter()
        .map(|r| metric.value_of(r) as f64)
        .collect();
    Series::new(dates, values)
}
