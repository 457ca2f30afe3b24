//! Chart layout and rendering.

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    symbols,
    text::{Line, Span},
    widgets::{
        Axis, Bar, BarChart, BarGroup, Block, Borders, Chart, Dataset, GraphType, LegendPosition,
        Paragraph,
    },
    Frame,
};

use super::app::{ChartApp, View};
use crate::stats::Summary;

const BASELINE_COLOR: Color = Color::Blue;
const LOADED_COLOR: Color = Color::Red;
const STAT_LABELS: [&str; 2] = ["Min", "Mean"];
/// Bar heights are integers; values are scaled to hundredths of a millisecond.
const BAR_SCALE: f64 = 100.0;

/// Render the current chart plus a one-line key hint.
pub fn render_ui(frame: &mut Frame, app: &ChartApp) {
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(5), Constraint::Length(1)])
        .split(frame.area());

    match app.view() {
        View::Comparison => render_comparison(frame, app, layout[0]),
        View::Statistics => render_statistics(frame, app, layout[0]),
    }
    render_status_bar(frame, app, layout[1]);
}

fn render_comparison(frame: &mut Frame, app: &ChartApp, area: Rect) {
    let baseline = app.baseline.points();
    let loaded = app.loaded.points();

    let rounds = baseline.len().max(loaded.len());
    let x_max = rounds.saturating_sub(1).max(1) as f64;
    let (y_min, y_max) = value_bounds(app.baseline.values.iter().chain(app.loaded.values.iter()));

    let datasets = vec![
        Dataset::default()
            .name(app.baseline.label.clone())
            .marker(symbols::Marker::Dot)
            .graph_type(GraphType::Line)
            .style(Style::default().fg(BASELINE_COLOR))
            .data(&baseline),
        Dataset::default()
            .name(app.loaded.label.clone())
            .marker(symbols::Marker::Braille)
            .graph_type(GraphType::Line)
            .style(Style::default().fg(LOADED_COLOR))
            .data(&loaded),
    ];

    let chart = Chart::new(datasets)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("Execution Times Comparison"),
        )
        .x_axis(
            Axis::default()
                .title("Round")
                .style(Style::default().fg(Color::Gray))
                .bounds([0.0, x_max])
                .labels(axis_labels(0.0, x_max, 0)),
        )
        .y_axis(
            Axis::default()
                .title("Execution Time (ms)")
                .style(Style::default().fg(Color::Gray))
                .bounds([y_min, y_max])
                .labels(axis_labels(y_min, y_max, 1)),
        )
        .legend_position(Some(LegendPosition::TopRight))
        .hidden_legend_constraints((Constraint::Ratio(3, 4), Constraint::Ratio(3, 4)));

    frame.render_widget(chart, area);
}

fn render_statistics(frame: &mut Frame, app: &ChartApp, area: Rect) {
    let Some((baseline, loaded)) = &app.summaries else {
        let msg = Paragraph::new("No statistics available")
            .block(Block::default().borders(Borders::ALL).title("Execution Time Statistics"));
        frame.render_widget(msg, area);
        return;
    };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(4), Constraint::Length(1)])
        .split(area);

    let bar_width = (chunks[0].width.saturating_sub(10) / 5).clamp(3, 16);
    let mut chart = BarChart::default()
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("Execution Time Statistics"),
        )
        .bar_width(bar_width)
        .bar_gap(1)
        .group_gap(bar_width.min(6));

    for (idx, label) in STAT_LABELS.iter().enumerate() {
        let group = BarGroup::default()
            .label(Line::from(*label))
            .bars(&[
                stat_bar(baseline.bars()[idx], BASELINE_COLOR),
                stat_bar(loaded.bars()[idx], LOADED_COLOR),
            ]);
        chart = chart.data(group);
    }
    frame.render_widget(chart, chunks[0]);

    frame.render_widget(Paragraph::new(legend_line(baseline, loaded)), chunks[1]);
}

fn stat_bar(value: f64, color: Color) -> Bar<'static> {
    Bar::default()
        .value((value.max(0.0) * BAR_SCALE).round() as u64)
        .text_value(format!("{:.2}", value))
        .style(Style::default().fg(color))
        .value_style(Style::default().fg(Color::White).bg(color))
}

fn legend_line(baseline: &Summary, loaded: &Summary) -> Line<'static> {
    Line::from(vec![
        Span::styled("■ ", Style::default().fg(BASELINE_COLOR)),
        Span::raw(format!("{}   ", baseline.label)),
        Span::styled("■ ", Style::default().fg(LOADED_COLOR)),
        Span::raw(loaded.label.clone()),
    ])
}

fn render_status_bar(frame: &mut Frame, app: &ChartApp, area: Rect) {
    let (pos, total) = app.position();
    let hint = format!(
        " chart {}/{} | Enter/→ next  ← back  q quit",
        pos, total
    );
    let bar = Paragraph::new(Line::from(Span::styled(
        hint,
        Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
    )));
    frame.render_widget(bar, area);
}

/// Padded `(min, max)` over all values; `(0, 1)` when there are none.
fn value_bounds<'a>(values: impl Iterator<Item = &'a f64>) -> (f64, f64) {
    let (lo, hi) = values.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
        (lo.min(*v), hi.max(*v))
    });
    if !lo.is_finite() || !hi.is_finite() {
        return (0.0, 1.0);
    }
    let pad = if hi > lo { (hi - lo) * 0.05 } else { lo.abs().max(1.0) * 0.05 };
    ((lo - pad).max(0.0), hi + pad)
}

fn axis_labels(lo: f64, hi: f64, precision: usize) -> Vec<Span<'static>> {
    let mid = (lo + hi) / 2.0;
    [lo, mid, hi]
        .iter()
        .map(|v| Span::raw(format!("{:.*}", precision, v)))
        .collect()
}
