//! Plotters-powered case-curve chart widget for Ratatui.
//!
//! Why Plotters instead of Ratatui's built-in `Chart` widget?
//! - nicer line rendering at terminal resolution
//! - the same drawing model we would use for PNG/SVG export later
//!
//! We render Plotters output into the Ratatui buffer using
//! `plotters-ratatui-backend`. Axis tick marks and date labels are drawn by
//! the TUI around the chart rect, where their density can be tuned to the
//! terminal size.

use plotters::prelude::*;
use plotters::style::Color as _;
use plotters_ratatui_backend::widget_fn;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    widgets::Widget,
};

/// Fixed per-key palette, high-contrast for terminal readability. Reused
/// cyclically when more keys than colors are plotted.
const PALETTE: &[(u8, u8, u8)] = &[
    (0, 255, 255),   // cyan
    (0, 255, 0),     // green
    (255, 255, 0),   // yellow
    (255, 0, 255),   // magenta
    (255, 128, 0),   // orange
    (0, 128, 255),   // azure
    (255, 0, 0),     // red
    (255, 255, 255), // white
];

/// Color assigned to the key at `idx` (plot order).
pub fn series_color(idx: usize) -> (u8, u8, u8) {
    PALETTE[idx % PALETTE.len()]
}

/// Same palette entry as a Ratatui color, for the legend.
pub fn series_legend_color(idx: usize) -> Color {
    let (r, g, b) = series_color(idx);
    Color::Rgb(r, g, b)
}

/// One key's chart data in day-offset coordinates.
pub struct ChartSeries {
    /// The line to draw: averaged series when smoothing, raw otherwise.
    pub line: Vec<(f64, f64)>,
    /// Raw scatter points; non-empty only when smoothing is active.
    pub points: Vec<(f64, f64)>,
    pub color: (u8, u8, u8),
}

/// A lightweight, render-only chart description.
///
/// The widget is intentionally data-driven: all series and bounds are computed
/// outside the render call. This keeps `render()` focused on drawing and makes
/// it easy to test the data prep separately.
pub struct CovidPlottersChart<'a> {
    pub series: &'a [ChartSeries],
    /// X bounds in days since the first plotted date.
    pub x_bounds: [f64; 2],
    /// Y bounds in metric units (counts, or counts per day).
    pub y_bounds: [f64; 2],
}

impl<'a> Widget for CovidPlottersChart<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        // When the available area is too small, Plotters may fail to build a
        // chart. In that case, we render a small hint rather than panicking.
        if area.width < 20 || area.height < 6 {
            buf.set_string(
                area.x,
                area.y,
                "Chart area too small (resize terminal).",
                Style::default().fg(Color::Yellow),
            );
            return;
        }

        let x0 = self.x_bounds[0];
        let x1 = self.x_bounds[1];
        let y0 = self.y_bounds[0];
        let y1 = self.y_bounds[1];

        if !(x0.is_finite() && x1.is_finite() && y0.is_finite() && y1.is_finite())
            || x1 <= x0
            || y1 <= y0
        {
            return;
        }

        // `plotters-ratatui-backend` draws Plotters primitives via Ratatui's
        // `Canvas` widget, which ultimately writes to the terminal buffer.
        //
        // We delegate rendering to the crate-provided widget helper to avoid
        // coupling our code to its internal backend types.
        let widget = widget_fn(move |root| {
            let mut chart = ChartBuilder::on(&root)
                .margin(1)
                .build_cartesian_2d(x0..x1, y0..y1)?;

            // No mesh lines: gridlines add clutter at terminal resolution,
            // and tick marks/labels are the caller's responsibility.
            chart
                .configure_mesh()
                .disable_x_mesh()
                .disable_y_mesh()
                .draw()?;

            for series in self.series {
                let (r, g, b) = series.color;
                let color = RGBColor(r, g, b);

                // Raw observations as dots beneath the averaged line.
                //
                // We intentionally avoid `Circle` markers here: the backend
                // maps circle radii into normalized canvas units, producing
                // huge blobs at terminal resolution. A `Pixel` reads as a
                // clean dot.
                chart.draw_series(
                    series
                        .points
                        .iter()
                        .map(|&(x, y)| Pixel::new((x, y), color.mix(0.6))),
                )?;

                chart.draw_series(LineSeries::new(series.line.iter().copied(), &color))?;
            }

            Ok(())
        });

        widget.render(area, buf);
    }
}
