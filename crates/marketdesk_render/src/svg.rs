use crate::chart::{Axis, DualAxisChart, LineSeries, LineStyle};
use crate::html::escape;
use crate::scale::LinearScale;
use itertools::Itertools;
use std::fmt::Write;

const MARGIN_LEFT: f64 = 64.0;
const MARGIN_RIGHT: f64 = 64.0;
const MARGIN_TOP: f64 = 10.0;
const MARGIN_BOTTOM: f64 = 26.0;
/// Share of the plot height kept free above and below each price scale.
const SCALE_MARGIN: f64 = 0.08;
const VALUE_TICKS: usize = 5;

const BACKGROUND: &str = "#fff";
const TEXT: &str = "#111";
const GRID_HORIZONTAL: &str = "#eee";
const GRID_VERTICAL: &str = "#f6f6f6";

struct PlotArea {
    left: f64,
    right: f64,
    top: f64,
    bottom: f64,
}

impl PlotArea {
    fn of(chart: &DualAxisChart) -> Self {
        let width = f64::from(chart.width);
        let height = f64::from(chart.height);
        Self {
            left: MARGIN_LEFT,
            right: (width - MARGIN_RIGHT).max(MARGIN_LEFT + 1.0),
            top: MARGIN_TOP,
            bottom: (height - MARGIN_BOTTOM).max(MARGIN_TOP + 1.0),
        }
    }

    fn value_range(&self) -> (f64, f64) {
        let pad = (self.bottom - self.top) * SCALE_MARGIN;
        (self.bottom - pad, self.top + pad)
    }
}

fn visible_points<'a>(series: &'a LineSeries, range: (i64, i64)) -> impl Iterator<Item = (i64, f64)> + 'a {
    series
        .points
        .iter()
        .filter(move |p| p.time >= range.0 && p.time <= range.1)
        .map(|p| (p.time, p.value))
}

fn value_scale(chart: &DualAxisChart, axis: Axis, area: &PlotArea) -> LinearScale {
    let values = chart
        .series_on(axis)
        .flat_map(|s| visible_points(s, chart.visible_range))
        .map(|(_, v)| v);
    LinearScale::fit(values, area.value_range())
}

fn format_value(value: f64) -> String {
    let abs = value.abs();
    if abs >= 1_000_000.0 {
        format!("{:.2}M", value / 1_000_000.0)
    } else if abs >= 10_000.0 {
        format!("{value:.0}")
    } else if abs >= 100.0 {
        format!("{value:.1}")
    } else {
        format!("{value:.2}")
    }
}

fn write_series(out: &mut String, series: &LineSeries, chart: &DualAxisChart, time: &LinearScale, value: &LinearScale, clip: &str) {
    let points: Vec<(f64, f64)> = visible_points(series, chart.visible_range)
        .map(|(t, v)| (time.map(t as f64), value.map(v)))
        .collect();

    match points.as_slice() {
        [] => {}
        [(x, y)] => {
            let _ = writeln!(
                out,
                r#"<circle cx="{x:.1}" cy="{y:.1}" r="2" fill="{}" clip-path="url(#{clip})"/>"#,
                escape(&series.color)
            );
        }
        _ => {
            let dash = match series.style {
                LineStyle::Solid => "",
                LineStyle::Dashed => r#" stroke-dasharray="6 4""#,
            };
            let coords = points.iter().map(|(x, y)| format!("{x:.1},{y:.1}")).join(" ");
            let _ = writeln!(
                out,
                r#"<polyline fill="none" stroke="{}" stroke-width="2"{dash} clip-path="url(#{clip})" points="{coords}"/>"#,
                escape(&series.color)
            );
        }
    }
}

/// Draws the chart as a standalone SVG element.
pub fn render_svg(chart: &DualAxisChart) -> String {
    let area = PlotArea::of(chart);
    let time = LinearScale::new(
        (chart.visible_range.0 as f64, chart.visible_range.1 as f64),
        (area.left, area.right),
    );
    let left = value_scale(chart, Axis::Left, &area);
    let right = value_scale(chart, Axis::Right, &area);
    let clip = format!("clip-{}", escape(&chart.id));

    let mut out = String::new();
    let _ = writeln!(
        out,
        r#"<svg xmlns="http://www.w3.org/2000/svg" class="dual-axis-chart" width="{w}" height="{h}" viewBox="0 0 {w} {h}" font-family="Arial, sans-serif" font-size="11">"#,
        w = chart.width,
        h = chart.height
    );
    let _ = writeln!(out, r#"<rect width="100%" height="100%" fill="{BACKGROUND}"/>"#);
    let _ = writeln!(
        out,
        r#"<defs><clipPath id="{clip}"><rect x="{:.1}" y="{:.1}" width="{:.1}" height="{:.1}"/></clipPath></defs>"#,
        area.left,
        area.top,
        area.right - area.left,
        area.bottom - area.top
    );

    for tick in left.ticks(VALUE_TICKS) {
        let y = left.map(tick);
        let _ = writeln!(
            out,
            r#"<line x1="{:.1}" y1="{y:.1}" x2="{:.1}" y2="{y:.1}" stroke="{GRID_HORIZONTAL}"/>"#,
            area.left, area.right
        );
        let _ = writeln!(
            out,
            r#"<text x="{:.1}" y="{y:.1}" text-anchor="end" dominant-baseline="middle" fill="{TEXT}">{}</text>"#,
            area.left - 6.0,
            format_value(tick)
        );
    }
    for tick in right.ticks(VALUE_TICKS) {
        let _ = writeln!(
            out,
            r#"<text x="{:.1}" y="{:.1}" text-anchor="start" dominant-baseline="middle" fill="{TEXT}">{}</text>"#,
            area.right + 6.0,
            right.map(tick),
            format_value(tick)
        );
    }
    for (ts, label) in &chart.time_ticks {
        let x = time.map(*ts as f64);
        let _ = writeln!(
            out,
            r#"<line x1="{x:.1}" y1="{:.1}" x2="{x:.1}" y2="{:.1}" stroke="{GRID_VERTICAL}"/>"#,
            area.top, area.bottom
        );
        let _ = writeln!(
            out,
            r#"<text x="{x:.1}" y="{:.1}" text-anchor="middle" fill="{TEXT}">{}</text>"#,
            area.bottom + 16.0,
            escape(label)
        );
    }

    let _ = writeln!(
        out,
        r#"<line x1="{l:.1}" y1="{:.1}" x2="{l:.1}" y2="{:.1}" stroke="{}"/>"#,
        area.top,
        area.bottom,
        escape(&chart.left_border),
        l = area.left
    );
    let _ = writeln!(
        out,
        r#"<line x1="{r:.1}" y1="{:.1}" x2="{r:.1}" y2="{:.1}" stroke="{}"/>"#,
        area.top,
        area.bottom,
        escape(&chart.right_border),
        r = area.right
    );

    for series in &chart.series {
        let scale = match series.axis {
            Axis::Left => &left,
            Axis::Right => &right,
        };
        write_series(&mut out, series, chart, &time, scale, &clip);
    }

    out.push_str("</svg>\n");
    out
}

/// The legend block appended under every chart.
pub fn render_legend(chart: &DualAxisChart) -> String {
    let mut out = String::from(r#"<div class="custom-legend" style="margin-top: 8px; font-size:14px">"#);
    for (i, entry) in chart.legend.iter().enumerate() {
        let gap = if i == 2 { "margin-left:16px;" } else { "" };
        let _ = write!(
            out,
            r#"<span style="color:{};font-weight:bold;{gap}">{} {}</span> "#,
            escape(&entry.color),
            entry.glyph,
            escape(&entry.label)
        );
    }
    let _ = write!(
        out,
        r#"<span style="color:#444;margin-left:16px;">{}</span></div>"#,
        escape(&chart.axis_note)
    );
    out
}
