use crate::page::{Page, RegionContent};
use crate::palette::Palette;
use bon::Builder;
use marketdesk_engine::{build_chart_series, MarketClock, MarketSession, TimeError, VisibleRangePolicy};
use marketdesk_shared_models::{fields, Point, Sample};

pub const DEFAULT_WIDTH: u32 = 540;
pub const DEFAULT_HEIGHT: u32 = 360;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    Left,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineStyle {
    Solid,
    Dashed,
}

impl LineStyle {
    pub fn legend_glyph(&self) -> &'static str {
        match self {
            LineStyle::Solid => "━",
            LineStyle::Dashed => "╌",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LineSeries {
    pub label: String,
    pub color: String,
    pub style: LineStyle,
    pub axis: Axis,
    pub points: Vec<Point>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LegendEntry {
    pub glyph: &'static str,
    pub label: String,
    pub color: String,
}

/// A fully resolved dual-scale line chart, ready to be drawn.
#[derive(Debug, Clone, PartialEq)]
pub struct DualAxisChart {
    pub id: String,
    pub width: u32,
    pub height: u32,
    pub series: Vec<LineSeries>,
    pub visible_range: (i64, i64),
    /// Time-axis ticks with their `HH:MM` labels in the market zone.
    pub time_ticks: Vec<(i64, String)>,
    pub left_border: String,
    pub right_border: String,
    pub legend: Vec<LegendEntry>,
    pub axis_note: String,
}

impl DualAxisChart {
    pub fn series_on(&self, axis: Axis) -> impl Iterator<Item = &LineSeries> {
        self.series.iter().filter(move |s| s.axis == axis)
    }

    pub fn series_by_label(&self, label: &str) -> Option<&LineSeries> {
        self.series.iter().find(|s| s.label == label)
    }
}

/// Options for one dual-axis chart. LTP and its moving average always sit on the left
/// scale; the right scale plots `right_series_key` and `right_series_ma_key`.
#[derive(Debug, Clone, Builder)]
#[builder(on(String, into))]
pub struct DualAxisChartConfig {
    pub container_id: String,
    pub data: Vec<Sample>,
    pub right_series_key: String,
    pub right_series_ma_key: String,
    pub left_color: String,
    pub left_color_ma: String,
    pub right_color: String,
    pub right_color_ma: String,
    pub right_label: String,
    pub right_label_ma: String,
    #[builder(default = DEFAULT_WIDTH)]
    pub width: u32,
    #[builder(default = DEFAULT_HEIGHT)]
    pub height: u32,
}

/// The two charts drawn for every index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartKind {
    OpenInterest,
    Delta,
}

impl ChartKind {
    pub const ALL: [ChartKind; 2] = [ChartKind::OpenInterest, ChartKind::Delta];

    pub fn container_id(&self, symbol: &str) -> String {
        match self {
            ChartKind::OpenInterest => format!("chart_{symbol}_OI"),
            ChartKind::Delta => format!("chart_{symbol}_DEX"),
        }
    }

    pub fn config(&self, symbol: &str, data: Vec<Sample>, palette: &Palette) -> DualAxisChartConfig {
        let builder = DualAxisChartConfig::builder()
            .container_id(self.container_id(symbol))
            .data(data)
            .left_color(palette.ltp.clone())
            .left_color_ma(palette.ltp_ma.clone());

        match self {
            ChartKind::OpenInterest => builder
                .right_series_key(fields::NET_OI_CHANGE)
                .right_series_ma_key(fields::NET_OI_MA)
                .right_color(palette.net_oi.clone())
                .right_color_ma(palette.net_oi_ma.clone())
                .right_label("Net OI")
                .right_label_ma("Net OI MA")
                .build(),
            ChartKind::Delta => builder
                .right_series_key(fields::NET_DEX)
                .right_series_ma_key(fields::NET_DEX_MA)
                .right_color(palette.net_dex.clone())
                .right_color_ma(palette.net_dex_ma.clone())
                .right_label("Net Dex")
                .right_label_ma("Net Dex MA")
                .build(),
        }
    }
}

fn data_extent(series: &[LineSeries]) -> Option<(i64, i64)> {
    series
        .iter()
        .filter_map(|s| Some((s.points.first()?.time, s.points.last()?.time)))
        .reduce(|(lo, hi), (first, last)| (lo.min(first), hi.max(last)))
}

fn tick_step(span: i64) -> i64 {
    match span {
        s if s <= 2 * 3600 => 15 * 60,
        s if s <= 4 * 3600 => 30 * 60,
        s if s <= 12 * 3600 => 3600,
        _ => 3 * 3600,
    }
}

/// Ticks on whole local quarter/half/full hours within `range`.
pub fn time_ticks(range: (i64, i64), clock: &MarketClock) -> Vec<(i64, String)> {
    let (from, to) = range;
    if to <= from {
        return Vec::new();
    }

    let step = tick_step(to - from);
    let offset = clock.utc_offset_secs(from);
    let first = (from + offset).div_euclid(step) * step - offset;
    let first = if first < from { first + step } else { first };

    (0..)
        .map(|i| first + i * step)
        .take_while(|ts| *ts <= to)
        .map(|ts| (ts, clock.format_hhmm(ts)))
        .collect()
}

pub fn build_dual_axis_chart(
    config: &DualAxisChartConfig,
    clock: &MarketClock,
    session: &MarketSession,
    policy: VisibleRangePolicy,
) -> Result<DualAxisChart, TimeError> {
    let line = |key: &str, label: &str, color: &str, style, axis| LineSeries {
        label: label.to_string(),
        color: color.to_string(),
        style,
        axis,
        points: build_chart_series(&config.data, key, clock),
    };

    let series = vec![
        line(fields::LTP, "LTP", &config.left_color, LineStyle::Solid, Axis::Left),
        line(fields::LTP_MA, "LTP MA", &config.left_color_ma, LineStyle::Dashed, Axis::Left),
        line(&config.right_series_key, &config.right_label, &config.right_color, LineStyle::Solid, Axis::Right),
        line(
            &config.right_series_ma_key,
            &config.right_label_ma,
            &config.right_color_ma,
            LineStyle::Dashed,
            Axis::Right,
        ),
    ];

    let visible_range = policy.visible_range(session.bounds(clock)?, data_extent(&series));
    let legend = series
        .iter()
        .map(|s| LegendEntry {
            glyph: s.style.legend_glyph(),
            label: s.label.clone(),
            color: s.color.clone(),
        })
        .collect();

    Ok(DualAxisChart {
        id: config.container_id.clone(),
        width: config.width,
        height: config.height,
        time_ticks: time_ticks(visible_range, clock),
        visible_range,
        series,
        left_border: config.left_color.clone(),
        right_border: config.right_color.clone(),
        legend,
        axis_note: format!("(Left Y: LTP, Right Y: {})", config.right_label),
    })
}

/// Rebuilds the chart in the page region named by `config.container_id`.
///
/// Returns `false` and leaves the page untouched when the region does not exist.
pub fn render_dual_axis_chart(
    page: &mut Page,
    config: &DualAxisChartConfig,
    clock: &MarketClock,
    session: &MarketSession,
    policy: VisibleRangePolicy,
) -> bool {
    let Some(region) = page.region_mut(&config.container_id) else {
        tracing::error!(container = %config.container_id, "chart container not found");
        return false;
    };
    region.clear();

    match build_dual_axis_chart(config, clock, session, policy) {
        Ok(chart) => {
            region.content = RegionContent::Chart(Box::new(chart));
            true
        }
        Err(err) => {
            tracing::error!(container = %config.container_id, %err, "cannot place chart on the session");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn clock() -> MarketClock {
        MarketClock::new(NaiveDate::from_ymd_opt(2025, 8, 14).unwrap(), chrono_tz::Asia::Kolkata)
    }

    fn data() -> Vec<Sample> {
        vec![
            Sample::new("09:20")
                .with(fields::LTP, 100.0)
                .with(fields::NET_OI_CHANGE, -500.0),
            Sample::new("09:25")
                .with(fields::LTP, 110.0)
                .with(fields::LTP_MA, 104.0)
                .with(fields::NET_OI_CHANGE, 250.0)
                .with(fields::NET_OI_MA, -125.0),
        ]
    }

    #[test]
    fn chart_kinds_pick_fields_and_containers() {
        let palette = Palette::default();
        let oi = ChartKind::OpenInterest.config("NIFTY", data(), &palette);
        let dex = ChartKind::Delta.config("NIFTY", data(), &palette);

        assert_eq!(oi.container_id, "chart_NIFTY_OI");
        assert_eq!(oi.right_series_key, fields::NET_OI_CHANGE);
        assert_eq!(oi.right_color, palette.net_oi);
        assert_eq!(oi.width, DEFAULT_WIDTH);
        assert_eq!(dex.container_id, "chart_NIFTY_DEX");
        assert_eq!(dex.right_series_ma_key, fields::NET_DEX_MA);
        assert_eq!(dex.right_label_ma, "Net Dex MA");
    }

    #[test]
    fn builds_four_series_on_two_axes() {
        let config = ChartKind::OpenInterest.config("NIFTY", data(), &Palette::default());
        let chart = build_dual_axis_chart(&config, &clock(), &MarketSession::default(), VisibleRangePolicy::Session)
            .unwrap();

        assert_eq!(chart.series_on(Axis::Left).count(), 2);
        assert_eq!(chart.series_on(Axis::Right).count(), 2);
        assert_eq!(chart.series_by_label("LTP").unwrap().points.len(), 2);
        assert_eq!(chart.series_by_label("LTP MA").unwrap().points.len(), 1);
        assert_eq!(chart.series_by_label("Net OI").unwrap().style, LineStyle::Solid);
        assert_eq!(chart.series_by_label("Net OI MA").unwrap().style, LineStyle::Dashed);
        assert_eq!(chart.axis_note, "(Left Y: LTP, Right Y: Net OI)");

        let glyphs: Vec<_> = chart.legend.iter().map(|e| e.glyph).collect();
        assert_eq!(glyphs, vec!["━", "╌", "━", "╌"]);
    }

    #[test]
    fn visible_range_follows_policy() {
        let clock = clock();
        let config = ChartKind::Delta.config("NIFTY", data(), &Palette::default());
        let session = MarketSession::default();

        let fixed = build_dual_axis_chart(&config, &clock, &session, VisibleRangePolicy::Session).unwrap();
        assert_eq!(
            fixed.visible_range,
            (clock.timestamp("09:15").unwrap(), clock.timestamp("15:30").unwrap())
        );

        let clamped = build_dual_axis_chart(&config, &clock, &session, VisibleRangePolicy::ClampToData).unwrap();
        assert_eq!(
            clamped.visible_range,
            (clock.timestamp("09:20").unwrap(), clock.timestamp("09:25").unwrap())
        );
    }

    #[test]
    fn ticks_land_on_local_hours() {
        let clock = clock();
        let range = (clock.timestamp("09:15").unwrap(), clock.timestamp("15:30").unwrap());
        let labels: Vec<_> = time_ticks(range, &clock).into_iter().map(|(_, l)| l).collect();

        assert_eq!(labels, vec!["10:00", "11:00", "12:00", "13:00", "14:00", "15:00"]);
    }

    #[test]
    fn short_range_uses_quarter_hours() {
        let clock = clock();
        let range = (clock.timestamp("09:20").unwrap(), clock.timestamp("10:00").unwrap());
        let labels: Vec<_> = time_ticks(range, &clock).into_iter().map(|(_, l)| l).collect();

        assert_eq!(labels, vec!["09:30", "09:45", "10:00"]);
    }

    #[test]
    fn missing_container_is_skipped() {
        let mut page = Page::new("test").with_region("chart_NIFTY_OI");
        let config = ChartKind::Delta.config("NIFTY", data(), &Palette::default());

        let rendered = render_dual_axis_chart(
            &mut page,
            &config,
            &clock(),
            &MarketSession::default(),
            VisibleRangePolicy::Session,
        );

        assert!(!rendered);
        assert!(page.chart("chart_NIFTY_OI").is_none());
        assert!(page.region("chart_NIFTY_DEX").is_none());
    }

    #[test]
    fn rerender_replaces_previous_chart() {
        let mut page = Page::new("test").with_region("chart_NIFTY_OI");
        let clock = clock();
        let session = MarketSession::default();

        let first = ChartKind::OpenInterest.config("NIFTY", data(), &Palette::default());
        assert!(render_dual_axis_chart(&mut page, &first, &clock, &session, VisibleRangePolicy::Session));

        let second = ChartKind::OpenInterest.config("NIFTY", data()[..1].to_vec(), &Palette::default());
        assert!(render_dual_axis_chart(&mut page, &second, &clock, &session, VisibleRangePolicy::Session));

        let chart = page.chart("chart_NIFTY_OI").unwrap();
        assert_eq!(chart.series_by_label("LTP").unwrap().points.len(), 1);
    }
}
