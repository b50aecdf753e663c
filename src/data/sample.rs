//! Synthetic cumulative case/death data in the NYT CSV layout.
//!
//! Useful for demos and manual testing without downloading the real dataset.
//! Output is deterministic per seed, and cumulative counts never decrease:
//! noise is applied to the daily increments before accumulation, not to the
//! totals.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{Duration, NaiveDate};
use rand::prelude::*;
use rand::rngs::StdRng;
use rand_distr::Normal;

use crate::domain::{CaseRecord, Dataset};
use crate::error::AppError;

/// Fictional state names so generated data is never mistaken for real data.
const SAMPLE_STATES: &[&str] = &[
    "Avalon", "Borealis", "Caldera", "Dunmore", "Esperia", "Frontera", "Galena", "Highmark",
];

/// Fraction of cumulative cases recorded as deaths.
const SAMPLE_CFR: f64 = 0.02;

#[derive(Debug, Clone)]
pub struct SampleConfig {
    pub days: usize,
    pub states: usize,
    pub counties_per_state: usize,
    pub seed: u64,
    pub start: NaiveDate,
}

#[derive(Debug, Clone)]
pub struct SampleData {
    pub dataset: Dataset,
}

/// Generate the synthetic dataset in memory.
pub fn generate_sample(config: &SampleConfig) -> Result<SampleData, AppError> {
    if config.days == 0 {
        return Err(AppError::config("Sample day count must be > 0."));
    }
    if config.states == 0 || config.states > SAMPLE_STATES.len() {
        return Err(AppError::config(format!(
            "Sample state count must be in 1..={}.",
            SAMPLE_STATES.len()
        )));
    }

    let mut rng = StdRng::seed_from_u64(config.seed);
    let noise = Normal::new(0.0, 0.35)
        .map_err(|e| AppError::terminal(format!("Noise distribution error: {e}")))?;

    let mut states = Vec::new();
    let mut counties = Vec::new();

    for (state_idx, &state) in SAMPLE_STATES.iter().take(config.states).enumerate() {
        let state_fips = format!("{:02}", state_idx + 1);
        let curve = cumulative_curve(config, &mut rng, &noise, 1.0);
        push_rows(&mut states, config, state, None, &state_fips, &curve);

        for county_idx in 0..config.counties_per_state {
            let county = format!("{} County {:02}", state, county_idx + 1);
            let county_fips = format!("{state_fips}{:03}", county_idx + 1);
            // Counties are a fraction of their state's scale.
            let scale = rng.gen_range(0.05..0.4);
            let curve = cumulative_curve(config, &mut rng, &noise, scale);
            push_rows(
                &mut counties,
                config,
                state,
                Some(&county),
                &county_fips,
                &curve,
            );
        }
    }

    Ok(SampleData {
        dataset: Dataset { states, counties },
    })
}

/// Write `us-states.csv` and `us-counties.csv` under `out_dir`.
pub fn write_sample_dataset(
    out_dir: &Path,
    config: &SampleConfig,
) -> Result<(PathBuf, PathBuf), AppError> {
    let sample = generate_sample(config)?;

    fs::create_dir_all(out_dir).map_err(|e| {
        AppError::config(format!(
            "Failed to create output directory '{}': {e}",
            out_dir.display()
        ))
    })?;

    let states_path = out_dir.join("us-states.csv");
    let counties_path = out_dir.join("us-counties.csv");

    write_states_csv(&states_path, &sample.dataset.states)?;
    write_counties_csv(&counties_path, &sample.dataset.counties)?;

    Ok((states_path, counties_path))
}

/// One location's cumulative case curve: a logistic baseline with noisy
/// daily increments, accumulated so the totals are non-decreasing.
fn cumulative_curve(
    config: &SampleConfig,
    rng: &mut StdRng,
    noise: &Normal<f64>,
    scale: f64,
) -> Vec<u64> {
    let capacity = scale * rng.gen_range(20_000.0..200_000.0);
    let growth = rng.gen_range(0.06..0.18);
    let midpoint = config.days as f64 * rng.gen_range(0.35..0.65);

    let logistic = |t: f64| capacity / (1.0 + (-growth * (t - midpoint)).exp());

    let mut totals = Vec::with_capacity(config.days);
    let mut total = 0.0f64;
    for day in 0..config.days {
        let t = day as f64;
        let base_daily = (logistic(t + 1.0) - logistic(t)).max(0.0);
        let jitter = (1.0 + noise.sample(rng)).max(0.0);
        total += base_daily * jitter;
        totals.push(total.round() as u64);
    }
    totals
}

fn push_rows(
    rows: &mut Vec<CaseRecord>,
    config: &SampleConfig,
    state: &str,
    county: Option<&str>,
    fips: &str,
    curve: &[u64],
) {
    for (day, &cases) in curve.iter().enumerate() {
        let date = config.start + Duration::days(day as i64);
        rows.push(CaseRecord {
            date,
            state: state.to_string(),
            county: county.map(str::to_string),
            fips: fips.to_string(),
            cases,
            deaths: (cases as f64 * SAMPLE_CFR).round() as u64,
        });
    }
}

fn write_states_csv(path: &Path, rows: &[CaseRecord]) -> Result<(), AppError> {
    let mut file = fs::File::create(path)
        .map_err(|e| AppError::config(format!("Failed to create '{}': {e}", path.display())))?;
    writeln!(file, "date,state,fips,cases,deaths")
        .map_err(|e| AppError::config(format!("Failed to write '{}': {e}", path.display())))?;
    for r in rows {
        writeln!(file, "{},{},{},{},{}", r.date, r.state, r.fips, r.cases, r.deaths)
            .map_err(|e| AppError::config(format!("Failed to write '{}': {e}", path.display())))?;
    }
    Ok(())
}

fn write_counties_csv(path: &Path, rows: &[CaseRecord]) -> Result<(), AppError> {
    let mut file = fs::File::create(path)
        .map_err(|e| AppError::config(format!("Failed to create '{}': {e}", path.display())))?;
    writeln!(file, "date,county,state,fips,cases,deaths")
        .map_err(|e| AppError::config(format!("Failed to write '{}': {e}", path.display())))?;
    for r in rows {
        writeln!(
            file,
            "{},{},{},{},{},{}",
            r.date,
            r.county.as_deref().unwrap_or(""),
            r.state,
            r.fips,
            r.cases,
            r.deaths
        )
        .map_err(|e| AppError::config(format!("Failed to write '{}': {e}", path.display())))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> SampleConfig {
        SampleConfig {
            days: 30,
            states: 2,
            counties_per_state: 2,
            seed: 7,
            start: NaiveDate::from_ymd_opt(2020, 3, 1).unwrap(),
        }
    }

    #[test]
    fn output_is_deterministic_per_seed() {
        let a = generate_sample(&config()).unwrap();
        let b = generate_sample(&config()).unwrap();
        assert_eq!(a.dataset.states, b.dataset.states);
        assert_eq!(a.dataset.counties, b.dataset.counties);

        let mut other = config();
        other.seed = 8;
        let c = generate_sample(&other).unwrap();
        assert_ne!(a.dataset.states, c.dataset.states);
    }

    #[test]
    fn cumulative_counts_never_decrease() {
        let sample = generate_sample(&config()).unwrap();
        for rows in sample.dataset.states.chunks(30) {
            for pair in rows.windows(2) {
                assert!(pair[1].cases >= pair[0].cases);
                assert!(pair[1].deaths >= pair[0].deaths);
            }
        }
    }

    #[test]
    fn row_counts_match_the_config() {
        let sample = generate_sample(&config()).unwrap();
        assert_eq!(sample.dataset.states.len(), 2 * 30);
        assert_eq!(sample.dataset.counties.len(), 2 * 2 * 30);
    }

    #[test]
    fn invalid_configs_are_rejected() {
        let mut c = config();
        c.days = 0;
        assert_eq!(generate_sample(&c).unwrap_err().exit_code(), 2);

        let mut c = config();
        c.states = SAMPLE_STATES.len() + 1;
        assert_eq!(generate_sample(&c).unwrap_err().exit_code(), 2);
    }
}
