//! ASCII plotting for terminal output.
//!
//! This is intentionally "dumb" (fixed-size grid), optimized for:
//! - quick visual sanity checks in a terminal
//! - deterministic output (helpful for golden tests)
//!
//! Plot elements:
//! - one glyph per key, drawn as a connected line (averaged series when
//!   smoothing is active, raw otherwise)
//! - raw points as `.` dots underneath the averaged line
//! - a legend mapping glyph -> key label, in plot order

use chrono::NaiveDate;

use crate::domain::KeySeries;

/// Per-key line glyphs, assigned in key order and reused cyclically.
const SERIES_GLYPHS: &[char] = &['*', 'o', '+', 'x', '#', '%', '@', '&', '=', '~'];

/// Render all surviving series onto one fixed-size grid.
///
/// The x axis is the union date range of all raw series; y is the union value
/// range with a small pad. Empty input renders a short notice instead of a
/// grid.
pub fn render_ascii_chart(series: &[KeySeries], width: usize, height: usize) -> String {
    let width = width.max(10);
    let height = height.max(5);

    let Some((d_min, d_max)) = date_range(series) else {
        return "(no plottable series)\n".to_string();
    };
    let (y_min, y_max) = value_range(series).unwrap_or((0.0, 1.0));
    let (y_min, y_max) = pad_range(y_min, y_max, 0.05);

    let span_days = (d_max - d_min).num_days().max(1) as f64;

    let mut grid = vec![vec![' '; width]; height];

    for (idx, entry) in series.iter().enumerate() {
        let glyph = SERIES_GLYPHS[idx % SERIES_GLYPHS.len()];

        // Raw dots first so the line can overlay them.
        if entry.output.averaged.is_some() {
            for (date, value) in entry.output.raw.points() {
                let x = map_x(date, d_min, span_days, width);
                let y = map_y(value, y_min, y_max, height);
                if grid[y][x] == ' ' {
                    grid[y][x] = '.';
                }
            }
        }

        let line = entry.output.line();
        let mut prev = None;
        for (date, value) in line.points() {
            let x = map_x(date, d_min, span_days, width);
            let y = map_y(value, y_min, y_max, height);
            if let Some((x0, y0)) = prev {
                draw_line(&mut grid, x0, y0, x, y, glyph);
            } else {
                grid[y][x] = glyph;
            }
            prev = Some((x, y));
        }
    }

    // Build final string. We include a small header with ranges and a legend.
    let mut out = String::new();
    out.push_str(&format!(
        "Plot: dates=[{d_min}, {d_max}] | y=[{y_min:.1}, {y_max:.1}]\n"
    ));

    for row in grid {
        out.push_str(&row.into_iter().collect::<String>());
        out.push('\n');
    }

    for (idx, entry) in series.iter().enumerate() {
        let glyph = SERIES_GLYPHS[idx % SERIES_GLYPHS.len()];
        out.push_str(&format!("  {glyph} {}\n", entry.label));
    }

    out
}

fn date_range(series: &[KeySeries]) -> Option<(NaiveDate, NaiveDate)> {
    let mut min_d: Option<NaiveDate> = None;
    let mut max_d: Option<NaiveDate> = None;
    for entry in series {
        for &date in &entry.output.raw.dates {
            min_d = Some(min_d.map_or(date, |m| m.min(date)));
            max_d = Some(max_d.map_or(date, |m| m.max(date)));
        }
    }
    match (min_d, max_d) {
        (Some(a), Some(b)) => Some((a, b)),
        _ => None,
    }
}

fn value_range(series: &[KeySeries]) -> Option<(f64, f64)> {
    let mut min_y = f64::INFINITY;
    let mut max_y = f64::NEG_INFINITY;

    for entry in series {
        for &v in &entry.output.raw.values {
            min_y = min_y.min(v);
            max_y = max_y.max(v);
        }
        if let Some(avg) = &entry.output.averaged {
            for &v in &avg.values {
                min_y = min_y.min(v);
                max_y = max_y.max(v);
            }
        }
    }

    if min_y.is_finite() && max_y.is_finite() && max_y > min_y {
        Some((min_y, max_y))
    } else if min_y.is_finite() {
        // Flat series: synthesize a range around the constant value.
        Some((min_y - 0.5, min_y + 0.5))
    } else {
        None
    }
}

fn pad_range(min: f64, max: f64, frac: f64) -> (f64, f64) {
    let span = (max - min).abs();
    let pad = (span * frac).max(1e-12);
    (min - pad, max + pad)
}

fn map_x(date: NaiveDate, d_min: NaiveDate, span_days: f64, width: usize) -> usize {
    let width = width.max(2);
    let offset = (date - d_min).num_days() as f64;
    let u = (offset / span_days).clamp(0.0, 1.0);
    (u * (width as f64 - 1.0)).round() as usize
}

fn map_y(y: f64, y_min: f64, y_max: f64, height: usize) -> usize {
    let height = height.max(2);
    let u = ((y - y_min) / (y_max - y_min)).clamp(0.0, 1.0);
    // y=top is max -> row 0
    (height as f64 - 1.0 - (u * (height as f64 - 1.0))).round() as usize
}

/// Integer line drawing (Bresenham-ish). Only fills blank or dot cells so
/// earlier series stay visible.
fn draw_line(grid: &mut [Vec<char>], x0: usize, y0: usize, x1: usize, y1: usize, ch: char) {
    let mut x0 = x0 as isize;
    let mut y0 = y0 as isize;
    let x1 = x1 as isize;
    let y1 = y1 as isize;

    let dx = (x1 - x0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let dy = -(y1 - y0).abs();
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;

    loop {
        if y0 >= 0
            && (y0 as usize) < grid.len()
            && x0 >= 0
            && (x0 as usize) < grid[0].len()
        {
            let cell = &mut grid[y0 as usize][x0 as usize];
            if *cell == ' ' || *cell == '.' {
                *cell = ch;
            }
        }

        if x0 == x1 && y0 == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x0 += sx;
        }
        if e2 <= dx {
            err += dx;
            y0 += sy;
        }
    }
}
