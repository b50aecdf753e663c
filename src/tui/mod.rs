//! Ratatui-based terminal UI.
//!
//! The TUI renders the requested curves and blocks until the user quits.
//! Metric, per-day
//! mode, and the smoothing window can be toggled live; only the transform
//! stage re-runs on a toggle (the dataset is ingested exactly once).

use std::io;
use std::time::Duration;

use chrono::NaiveDate;
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, List, ListItem, Paragraph},
    Terminal,
};

use crate::app::pipeline::{self, RunOutput};
use crate::domain::{KeySeries, RunConfig, TransformOptions};
use crate::error::AppError;
use crate::report::chart_title;

mod plotters_chart;

use plotters_chart::{series_color, series_legend_color, ChartSeries, CovidPlottersChart};

/// Start the TUI.
pub fn run(config: RunConfig) -> Result<(), AppError> {
    // Resolve, ingest, and transform before touching the terminal so startup
    // errors and start-date diagnostics print normally.
    let run = pipeline::run_pipeline(&config)?;
    let mut app = App::new(config, run);

    let _guard = TerminalGuard::new()?;

    let backend = CrosstermBackend::new(io::stdout());
    let mut terminal = Terminal::new(backend)
        .map_err(|e| AppError::terminal(format!("Failed to initialize terminal: {e}")))?;

    app.event_loop(&mut terminal)
}

/// Ensures the terminal is restored (raw mode, alternate screen) on exit.
struct TerminalGuard;

impl TerminalGuard {
    fn new() -> Result<Self, AppError> {
        enable_raw_mode()
            .map_err(|e| AppError::terminal(format!("Failed to enable raw mode: {e}")))?;
        if let Err(e) = execute!(io::stdout(), EnterAlternateScreen) {
            let _ = disable_raw_mode();
            return Err(AppError::terminal(format!(
                "Failed to enter alternate screen: {e}"
            )));
        }
        Ok(Self)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
    }
}

struct App {
    config: RunConfig,
    run: RunOutput,
    status: String,
}

impl App {
    fn new(config: RunConfig, run: RunOutput) -> Self {
        let status = format!(
            "{} of {} keys plottable",
            run.series.len(),
            run.keys.len()
        );
        Self {
            config,
            run,
            status,
        }
    }

    fn event_loop<B: ratatui::backend::Backend>(
        &mut self,
        terminal: &mut Terminal<B>,
    ) -> Result<(), AppError> {
        let mut needs_redraw = true;
        loop {
            if needs_redraw {
                terminal
                    .draw(|f| self.draw(f))
                    .map_err(|e| AppError::terminal(format!("Terminal draw error: {e}")))?;
                needs_redraw = false;
            }

            if !event::poll(Duration::from_millis(100))
                .map_err(|e| AppError::terminal(format!("Event poll error: {e}")))?
            {
                continue;
            }

            match event::read().map_err(|e| AppError::terminal(format!("Event read error: {e}")))? {
                Event::Key(key) => {
                    if key.kind != KeyEventKind::Press {
                        continue;
                    }
                    if self.handle_key(key.code) {
                        break;
                    }
                    needs_redraw = true;
                }
                Event::Resize(_, _) => {
                    needs_redraw = true;
                }
                _ => {}
            }
        }
        Ok(())
    }

    fn handle_key(&mut self, code: KeyCode) -> bool {
        match code {
            KeyCode::Char('q') => return true,
            KeyCode::Char('d') => {
                self.config.metric = match self.config.metric {
                    crate::domain::Metric::Cases => crate::domain::Metric::Deaths,
                    crate::domain::Metric::Deaths => crate::domain::Metric::Cases,
                };
                self.rebuild();
                self.status = format!("metric: {}", self.config.metric.display_name());
            }
            KeyCode::Char('p') => {
                self.config.per_day = !self.config.per_day;
                self.rebuild();
                self.status = format!("mode: {}", self.config.mode().display_name());
            }
            KeyCode::Left => {
                self.config.window = if self.config.window > 2 {
                    self.config.window - 2
                } else {
                    1
                };
                self.rebuild();
                self.status = format!("average: {} day(s)", self.config.window);
            }
            KeyCode::Right => {
                self.config.window = if self.config.window <= 1 {
                    3
                } else {
                    self.config.window + 2
                };
                self.rebuild();
                self.status = format!("average: {} day(s)", self.config.window);
            }
            _ => {}
        }
        false
    }

    /// Re-run extract/transform against the already-loaded dataset.
    fn rebuild(&mut self) {
        let options = TransformOptions {
            per_day: self.config.per_day,
            start_date: self.run.start_date,
            window: self.config.window,
        };
        self.run.series = pipeline::build_key_series(
            &self.run.keys,
            &self.run.ingest.dataset,
            self.config.metric,
            &options,
        );
    }

    fn draw(&mut self, frame: &mut ratatui::Frame<'_>) {
        let legend_height = (self.run.series.len().min(8) as u16) + 2;
        let size = frame.area();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(4),
                Constraint::Min(0),
                Constraint::Length(legend_height),
                Constraint::Length(3),
            ])
            .split(size);

        self.draw_header(frame, chunks[0]);
        self.draw_chart(frame, chunks[1]);
        self.draw_legend(frame, chunks[2]);
        self.draw_footer(frame, chunks[3]);
    }

    fn draw_header(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let mut lines: Vec<Line> = Vec::new();
        lines.push(Line::from(vec![
            Span::styled("covid", Style::default().fg(Color::Cyan)),
            Span::raw(format!(
                " — {}",
                chart_title(self.config.metric, self.config.mode(), self.config.window)
            )),
        ]));

        let start = self
            .run
            .start_date
            .map(|d| d.to_string())
            .unwrap_or_else(|| "full range".to_string());
        lines.push(Line::from(Span::styled(
            format!(
                "metric: {} | mode: {} | avg: {} | start: {start} | keys: {}/{}",
                self.config.metric.display_name(),
                self.config.mode().display_name(),
                self.config.window,
                self.run.series.len(),
                self.run.keys.len(),
            ),
            Style::default().fg(Color::Gray),
        )));

        lines.push(Line::from(Span::styled(
            format!(
                "rows: read={} used={} skipped={}",
                self.run.ingest.rows_read,
                self.run.ingest.rows_used,
                self.run.ingest.row_errors.len(),
            ),
            Style::default().fg(Color::Gray),
        )));

        let p = Paragraph::new(Text::from(lines)).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }

    fn draw_chart(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let block = Block::default().title("Curves").borders(Borders::ALL);
        let inner = block.inner(area);
        frame.render_widget(block, area);
        frame.render_widget(Clear, inner);

        if self.run.series.is_empty() {
            let msg = Paragraph::new("No plottable series for the requested keys.")
                .style(Style::default().fg(Color::Yellow))
                .block(Block::default());
            frame.render_widget(msg, inner);
            return;
        }

        let Some((series, x_bounds, y_bounds, base_date)) = chart_series(&self.run.series) else {
            return;
        };

        let (chart_rect, insets) = chart_layout(inner);
        let widget = CovidPlottersChart {
            series: &series,
            x_bounds,
            y_bounds,
        };

        frame.render_widget(widget, chart_rect);
        if let Some(insets) = insets {
            draw_axis_ticks(frame, inner, chart_rect, insets, x_bounds, y_bounds, base_date);
        }
    }

    fn draw_legend(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let items: Vec<ListItem> = self
            .run
            .series
            .iter()
            .enumerate()
            .map(|(idx, entry)| {
                ListItem::new(Line::from(vec![
                    Span::styled("——", Style::default().fg(series_legend_color(idx))),
                    Span::raw(format!(" {}", entry.label)),
                ]))
            })
            .collect();

        let list = List::new(items).block(Block::default().title("Legend").borders(Borders::ALL));
        frame.render_widget(list, area);
    }

    fn draw_footer(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let help = "←/→ average  d deaths/cases  p per-day  q quit";
        let line = Line::from(vec![
            Span::styled(help, Style::default().fg(Color::Gray)),
            Span::raw(" | "),
            Span::styled(&self.status, Style::default().fg(Color::Yellow)),
        ]);
        let p = Paragraph::new(line).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }
}

/// Build chart series in day-offset coordinates for Plotters.
///
/// Returns the series, x/y bounds, and the base date (day offset 0).
fn chart_series(
    entries: &[KeySeries],
) -> Option<(Vec<ChartSeries>, [f64; 2], [f64; 2], NaiveDate)> {
    let base_date = entries
        .iter()
        .filter_map(|e| e.output.raw.first_date())
        .min()?;
    let last_date = entries
        .iter()
        .filter_map(|e| e.output.raw.last_date())
        .max()?;
    let span = (last_date - base_date).num_days().max(1) as f64;
    let x_bounds = [0.0, span];

    let to_offset = |d: NaiveDate| (d - base_date).num_days() as f64;

    let mut series = Vec::with_capacity(entries.len());
    let (mut y_min, mut y_max) = (f64::INFINITY, f64::NEG_INFINITY);

    for (idx, entry) in entries.iter().enumerate() {
        let line: Vec<(f64, f64)> = entry
            .output
            .line()
            .points()
            .map(|(d, v)| (to_offset(d), v))
            .collect();

        // Raw scatter only when an averaged line is drawn over it.
        let points: Vec<(f64, f64)> = if entry.output.averaged.is_some() {
            entry
                .output
                .raw
                .points()
                .map(|(d, v)| (to_offset(d), v))
                .collect()
        } else {
            Vec::new()
        };

        for &(_, y) in line.iter().chain(points.iter()) {
            y_min = y_min.min(y);
            y_max = y_max.max(y);
        }

        series.push(ChartSeries {
            line,
            points,
            color: series_color(idx),
        });
    }

    if !y_min.is_finite() || !y_max.is_finite() {
        return None;
    }
    if y_max <= y_min {
        y_min -= 0.5;
        y_max += 0.5;
    }

    let pad = ((y_max - y_min).abs() * 0.05).max(1e-12);
    let y_bounds = [y_min - pad, y_max + pad];

    Some((series, x_bounds, y_bounds, base_date))
}

#[derive(Debug, Clone, Copy)]
struct AxisInsets {
    left: u16,
    right: u16,
    top: u16,
    bottom: u16,
}

fn chart_layout(inner: Rect) -> (Rect, Option<AxisInsets>) {
    let insets = AxisInsets {
        left: 8,
        right: 2,
        top: 1,
        bottom: 2,
    };

    if inner.width <= insets.left + insets.right + 10
        || inner.height <= insets.top + insets.bottom + 5
    {
        return (inner, None);
    }

    let rect = Rect {
        x: inner.x + insets.left,
        y: inner.y + insets.top,
        width: inner.width - insets.left - insets.right,
        height: inner.height - insets.top - insets.bottom,
    };

    (rect, Some(insets))
}

/// Draw y value labels and the x tick rows around the chart rect.
///
/// The x axis gets weekly major ticks (`+`, labeled `MM-DD`) and daily minor
/// ticks (`·`) when the chart is wide enough to give each day its own column.
fn draw_axis_ticks(
    frame: &mut ratatui::Frame<'_>,
    inner: Rect,
    chart: Rect,
    insets: AxisInsets,
    x_bounds: [f64; 2],
    y_bounds: [f64; 2],
    base_date: NaiveDate,
) {
    let style = Style::default().fg(Color::Gray);

    // Y labels: 5 evenly spaced values, right-aligned into the left inset.
    let ticks = 5usize;
    for i in 0..ticks {
        let u = i as f64 / (ticks as f64 - 1.0);
        let y_val = y_bounds[0] + u * (y_bounds[1] - y_bounds[0]);
        let y = chart.y + (chart.height - 1) - ((chart.height - 1) as f64 * u).round() as u16;
        let label = format!("{y_val:.0}");
        let label_len = label.len() as u16;
        let x = inner.x + insets.left.saturating_sub(1);
        let start = x.saturating_sub(label_len);
        if start < inner.x {
            continue;
        }
        frame.render_widget(
            Paragraph::new(label).style(style),
            Rect {
                x: start,
                y,
                width: label_len,
                height: 1,
            },
        );
    }

    let span_days = (x_bounds[1] - x_bounds[0]).max(1.0);
    let total_days = span_days.round() as i64;
    let width = chart.width.max(2) as usize;
    let col_of = |day: i64| -> usize {
        let u = (day as f64 / span_days).clamp(0.0, 1.0);
        (u * (width as f64 - 1.0)).round() as usize
    };

    // Tick row directly under the chart.
    let tick_y = chart.y + chart.height;
    if tick_y < inner.y + inner.height {
        let mut row = vec![' '; width];
        let draw_minor = width >= (total_days as usize + 1);
        if draw_minor {
            for day in 0..=total_days {
                row[col_of(day)] = '·';
            }
        }
        for day in (0..=total_days).step_by(7) {
            row[col_of(day)] = '+';
        }
        frame.render_widget(
            Paragraph::new(row.into_iter().collect::<String>()).style(style),
            Rect {
                x: chart.x,
                y: tick_y,
                width: chart.width,
                height: 1,
            },
        );
    }

    // Weekly date labels under the tick row; thin them out when they would
    // overlap.
    let label_y = tick_y + 1;
    if label_y < inner.y + inner.height {
        let label_width = 5usize; // MM-DD
        let weeks = (total_days / 7).max(0) as usize;
        let cols_per_week = if weeks > 0 { width / weeks } else { width };
        let step_weeks = if cols_per_week > label_width {
            1
        } else {
            (label_width + cols_per_week).div_ceil(cols_per_week.max(1))
        };

        let mut last_end: Option<usize> = None;
        for week in (0..=weeks).step_by(step_weeks.max(1)) {
            let day = (week * 7) as i64;
            if day > total_days {
                break;
            }
            let col = col_of(day);
            let start = col.saturating_sub(label_width / 2).min(width - label_width.min(width));
            if let Some(end) = last_end {
                if start <= end {
                    continue;
                }
            }
            let date = base_date + chrono::Duration::days(day);
            let label = date.format("%m-%d").to_string();
            frame.render_widget(
                Paragraph::new(label).style(style),
                Rect {
                    x: chart.x + start as u16,
                    y: label_y,
                    width: label_width as u16,
                    height: 1,
                },
            );
            last_end = Some(start + label_width);
        }
    }
}
