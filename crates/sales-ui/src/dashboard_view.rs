//! Full-screen dashboard layout.
//!
//! Top to bottom: header, three stat tiles, the price-increase impact panel,
//! the region picker, the daily sales chart with the cutoff marker, the
//! insight sentence, and a key help line.

use std::path::Path;

use ratatui::{
    layout::{Alignment, Constraint, Layout, Rect},
    symbols::Marker,
    text::{Line, Span, Text},
    widgets::{Axis, Block, Borders, Chart, Dataset, GraphType, Paragraph, Wrap},
    Frame,
};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use sales_core::formatting::{format_currency, format_date_range};
use sales_core::models::{ChartSeries, DerivedMetrics};

use crate::components::header::Header;
use crate::components::indicators::{ChangeIndicator, RegionPicker};
use crate::themes::Theme;

pub const KEY_HELP: &str = "←/→ Tab: region · 1-5 / a n s e w: jump · q Esc: quit";

/// What the dashboard needs for one frame.
#[derive(Debug, Clone, Copy)]
pub struct DashboardViewData<'a> {
    pub metrics: &'a DerivedMetrics,
    pub series: &'a ChartSeries,
}

/// Render the dashboard into `area`.
pub fn render_dashboard(frame: &mut Frame, area: Rect, data: DashboardViewData, theme: &Theme) {
    let rows = Layout::vertical([
        Constraint::Length(3),
        Constraint::Length(3),
        Constraint::Length(3),
        Constraint::Length(3),
        Constraint::Min(8),
        Constraint::Length(1),
        Constraint::Length(1),
    ])
    .split(area);

    let header = Header::new(data.metrics.cutoff, theme);
    frame.render_widget(Paragraph::new(Text::from(header.to_lines())), rows[0]);

    render_tiles(frame, rows[1], data.metrics, theme);
    render_impact(frame, rows[2], data.metrics, theme);

    let picker = RegionPicker::new(data.series.region, theme);
    frame.render_widget(
        Paragraph::new(picker.to_line()).block(panel(" Region ", theme)),
        rows[3],
    );

    render_chart(frame, rows[4], data.series, theme);

    let change = ChangeIndicator::new(data.metrics.percent_change, theme);
    frame.render_widget(Paragraph::new(change.insight_line()), rows[5]);
    frame.render_widget(
        Paragraph::new(Line::from(Span::styled(KEY_HELP, theme.dim))),
        rows[6],
    );
}

/// Placeholder shown when the canonical dataset has not been produced yet.
pub fn render_no_data(frame: &mut Frame, area: Rect, path: &Path, theme: &Theme) {
    let text = vec![
        Line::from(""),
        Line::from(Span::styled("No sales data available", theme.warning)),
        Line::from(""),
        Line::from(Span::styled(
            format!("{} does not exist yet.", path.display()),
            theme.dim,
        )),
        Line::from(Span::styled(
            "Run with --mode process to build it from the source CSV files.",
            theme.dim,
        )),
        Line::from(Span::styled("Press 'q' or Ctrl+C to exit", theme.dim)),
    ];
    frame.render_widget(
        Paragraph::new(Text::from(text)).block(panel(" Sales Dashboard ", theme)),
        area,
    );
}

/// Error screen for a dataset that exists but could not be loaded.
pub fn render_load_error(frame: &mut Frame, area: Rect, message: &str, theme: &Theme) {
    let text = vec![
        Line::from(""),
        Line::from(Span::styled("Could not load sales data", theme.error)),
        Line::from(""),
        Line::from(Span::styled(message.to_string(), theme.text)),
        Line::from(""),
        Line::from(Span::styled("Press 'q' or Ctrl+C to exit", theme.dim)),
    ];
    frame.render_widget(
        Paragraph::new(Text::from(text))
            .wrap(Wrap { trim: false })
            .block(panel(" Sales Dashboard ", theme)),
        area,
    );
}

// ── Chart geometry ────────────────────────────────────────────────────────────

/// `(day offset from the first point, sales)` for every point.
pub fn chart_points(series: &ChartSeries) -> Vec<(f64, f64)> {
    let Some(first) = series.points.first() else {
        return Vec::new();
    };
    series
        .points
        .iter()
        .map(|p| {
            let x = (p.date - first.date).num_days() as f64;
            (x, p.sales.to_f64().unwrap_or_default())
        })
        .collect()
}

/// Two points forming a vertical line at the cutoff, or `None` when the
/// cutoff lies outside the plotted dates.
pub fn cutoff_line(series: &ChartSeries, y_max: f64) -> Option<[(f64, f64); 2]> {
    let first = series.points.first()?;
    let last = series.points.last()?;
    let cutoff = series.cutoff.date;
    if cutoff < first.date || cutoff > last.date {
        return None;
    }
    let x = (cutoff - first.date).num_days() as f64;
    Some([(x, 0.0), (x, y_max)])
}

/// Upper y bound: 10% headroom over the largest day, at least `1.10`.
pub fn y_axis_top(series: &ChartSeries) -> Decimal {
    let top = series.max_sales().max(Decimal::ONE);
    top.checked_mul(Decimal::new(11, 1)).unwrap_or(top)
}

// ── Internal helpers ──────────────────────────────────────────────────────────

fn panel<'a>(title: &'a str, theme: &Theme) -> Block<'a> {
    Block::default()
        .borders(Borders::ALL)
        .border_style(theme.border)
        .title(Span::styled(title, theme.panel_title))
}

fn render_tiles(frame: &mut Frame, area: Rect, metrics: &DerivedMetrics, theme: &Theme) {
    let cols = Layout::horizontal([Constraint::Ratio(1, 3); 3]).split(area);
    let tiles = [
        (" Date Range ", format_date_range(metrics.date_range)),
        (" Total Sales ", format_currency(metrics.total_sales)),
        (" Avg Daily Sales ", format_currency(metrics.avg_daily_sales)),
    ];
    for ((title, value), col) in tiles.into_iter().zip(cols.iter()) {
        frame.render_widget(
            Paragraph::new(Span::styled(value, theme.value))
                .alignment(Alignment::Center)
                .block(panel(title, theme)),
            *col,
        );
    }
}

fn render_impact(frame: &mut Frame, area: Rect, metrics: &DerivedMetrics, theme: &Theme) {
    let change = ChangeIndicator::new(metrics.percent_change, theme).to_line();

    let mut spans = vec![
        Span::styled("Before: ", theme.label),
        Span::styled(format_currency(metrics.before_avg), theme.value),
        Span::styled("/day", theme.dim),
        Span::raw("    "),
    ];
    spans.extend(change.spans);
    spans.extend([
        Span::raw("    "),
        Span::styled("After: ", theme.label),
        Span::styled(format_currency(metrics.after_avg), theme.value),
        Span::styled("/day", theme.dim),
    ]);

    frame.render_widget(
        Paragraph::new(Line::from(spans))
            .alignment(Alignment::Center)
            .block(panel(" Price Increase Impact ", theme)),
        area,
    );
}

fn render_chart(frame: &mut Frame, area: Rect, series: &ChartSeries, theme: &Theme) {
    let title = format!(" Daily Sales · {} ", series.region.label());
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(theme.border)
        .title(Span::styled(title, theme.panel_title));

    if series.is_empty() {
        frame.render_widget(
            Paragraph::new(Span::styled(
                format!("No sales recorded for {}", series.region.label()),
                theme.warning,
            ))
            .alignment(Alignment::Center)
            .block(block),
            area,
        );
        return;
    }

    let points = chart_points(series);
    let x_max = points.last().map(|p| p.0).unwrap_or_default().max(1.0);
    let y_top_amount = y_axis_top(series);
    let y_top = y_top_amount.to_f64().unwrap_or(1.0);
    let cutoff = cutoff_line(series, y_top);

    let mut datasets = vec![Dataset::default()
        .name("Sales")
        .marker(Marker::Braille)
        .graph_type(GraphType::Line)
        .style(theme.chart_line)
        .data(&points)];
    if let Some(line) = cutoff.as_ref() {
        datasets.push(
            Dataset::default()
                .name("Price increase")
                .marker(Marker::Braille)
                .graph_type(GraphType::Line)
                .style(theme.chart_cutoff)
                .data(line),
        );
    }

    let x_labels = match (series.points.first(), series.points.last()) {
        (Some(first), Some(last)) => vec![
            Span::styled(first.date.format("%b %d").to_string(), theme.chart_axis),
            Span::styled(last.date.format("%b %d").to_string(), theme.chart_axis),
        ],
        _ => Vec::new(),
    };
    let y_labels = vec![
        Span::styled("$0", theme.chart_axis),
        Span::styled(format_currency(y_top_amount), theme.chart_axis),
    ];

    let chart = Chart::new(datasets)
        .block(block)
        .x_axis(
            Axis::default()
                .style(theme.chart_axis)
                .bounds([0.0, x_max])
                .labels(x_labels),
        )
        .y_axis(
            Axis::default()
                .style(theme.chart_axis)
                .bounds([0.0, y_top])
                .labels(y_labels),
        );

    frame.render_widget(chart, area);
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use ratatui::backend::TestBackend;
    use ratatui::buffer::Buffer;
    use ratatui::Terminal;
    use sales_core::models::{CutoffMarker, Region, RegionFilter, TrendPoint};

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2021, 1, d).unwrap()
    }

    fn series(region: RegionFilter, points: &[(u32, i64)]) -> ChartSeries {
        let points: Vec<TrendPoint> = points
            .iter()
            .map(|(d, cents)| TrendPoint {
                date: date(*d),
                sales: Decimal::new(*cents, 2),
            })
            .collect();
        let index = points.partition_point(|p| p.date < date(15));
        ChartSeries {
            region,
            points,
            cutoff: CutoffMarker {
                date: date(15),
                index,
            },
        }
    }

    fn metrics() -> DerivedMetrics {
        DerivedMetrics {
            total_sales: Decimal::new(123456, 2),
            avg_daily_sales: Decimal::new(61728, 2),
            date_range: Some((date(10), date(20))),
            before_avg: Decimal::new(1000, 2),
            after_avg: Decimal::new(1250, 2),
            percent_change: Decimal::new(25, 0),
            cutoff: date(15),
            days_before: 1,
            days_after: 1,
        }
    }

    fn buffer_text(buffer: &Buffer) -> String {
        let width = buffer.area.width as usize;
        buffer
            .content
            .chunks(width)
            .map(|row| row.iter().map(|c| c.symbol()).collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }

    // ── Geometry ──────────────────────────────────────────────────────────────

    #[test]
    fn test_chart_points_day_offsets() {
        let s = series(RegionFilter::All, &[(10, 1000), (12, 250), (20, 1000)]);
        assert_eq!(
            chart_points(&s),
            vec![(0.0, 10.0), (2.0, 2.5), (10.0, 10.0)]
        );
    }

    #[test]
    fn test_cutoff_line_inside_range() {
        let s = series(RegionFilter::All, &[(10, 1000), (20, 1000)]);
        assert_eq!(cutoff_line(&s, 11.0), Some([(5.0, 0.0), (5.0, 11.0)]));
    }

    #[test]
    fn test_cutoff_line_outside_range() {
        let s = series(RegionFilter::All, &[(1, 1000), (3, 1000)]);
        assert_eq!(cutoff_line(&s, 11.0), None);
        assert!(chart_points(&series(RegionFilter::All, &[])).is_empty());
    }

    #[test]
    fn test_y_axis_top_has_headroom() {
        let s = series(RegionFilter::All, &[(10, 1000), (20, 1250)]);
        assert_eq!(y_axis_top(&s), Decimal::new(1375, 2));
        assert_eq!(y_axis_top(&series(RegionFilter::All, &[])), Decimal::new(11, 1));
    }

    // ── Rendering ─────────────────────────────────────────────────────────────

    #[test]
    fn test_render_dashboard_content() {
        let backend = TestBackend::new(120, 40);
        let mut terminal = Terminal::new(backend).unwrap();
        let theme = Theme::dark();
        let m = metrics();
        let s = series(RegionFilter::All, &[(10, 1000), (20, 1250)]);

        terminal
            .draw(|frame| {
                let area = frame.area();
                render_dashboard(frame, area, DashboardViewData { metrics: &m, series: &s }, &theme);
            })
            .unwrap();

        let text = buffer_text(terminal.backend().buffer());
        assert!(text.contains("SOUL FOODS SALES DASHBOARD"));
        assert!(text.contains("Performance before & after Jan 15, 2021 price increase"));
        assert!(text.contains("Jan 10, 2021 to Jan 20, 2021"));
        assert!(text.contains("$1,234.56"));
        assert!(text.contains("$617.28"));
        assert!(text.contains("+25.0%"));
        assert!(text.contains("Daily sales changed by +25.0% after the price increase."));
        assert!(text.contains("(•) All"));
        assert!(text.contains("$13.75"), "top y label should match the axis bound");
    }

    #[test]
    fn test_render_dashboard_empty_region_does_not_panic() {
        let backend = TestBackend::new(100, 30);
        let mut terminal = Terminal::new(backend).unwrap();
        let theme = Theme::light();
        let m = metrics();
        let s = series(RegionFilter::Only(Region::West), &[]);

        terminal
            .draw(|frame| {
                let area = frame.area();
                render_dashboard(frame, area, DashboardViewData { metrics: &m, series: &s }, &theme);
            })
            .unwrap();

        let text = buffer_text(terminal.backend().buffer());
        assert!(text.contains("No sales recorded for West"));
    }

    #[test]
    fn test_render_dashboard_small_terminal_does_not_panic() {
        let backend = TestBackend::new(40, 10);
        let mut terminal = Terminal::new(backend).unwrap();
        let theme = Theme::classic();
        let m = metrics();
        let s = series(RegionFilter::All, &[(10, 1000), (20, 1250)]);

        terminal
            .draw(|frame| {
                let area = frame.area();
                render_dashboard(frame, area, DashboardViewData { metrics: &m, series: &s }, &theme);
            })
            .unwrap();
    }

    #[test]
    fn test_render_no_data() {
        let backend = TestBackend::new(90, 12);
        let mut terminal = Terminal::new(backend).unwrap();
        let theme = Theme::dark();

        terminal
            .draw(|frame| {
                let area = frame.area();
                render_no_data(frame, area, Path::new("formatted_sales_data.csv"), &theme);
            })
            .unwrap();

        let text = buffer_text(terminal.backend().buffer());
        assert!(text.contains("No sales data available"));
        assert!(text.contains("formatted_sales_data.csv does not exist yet."));
    }

    #[test]
    fn test_render_load_error() {
        let backend = TestBackend::new(90, 12);
        let mut terminal = Terminal::new(backend).unwrap();
        let theme = Theme::dark();

        terminal
            .draw(|frame| {
                let area = frame.area();
                render_load_error(frame, area, "Malformed row at out.csv:3: bad", &theme);
            })
            .unwrap();

        let text = buffer_text(terminal.backend().buffer());
        assert!(text.contains("Could not load sales data"));
        assert!(text.contains("Malformed row at out.csv:3: bad"));
    }
}
