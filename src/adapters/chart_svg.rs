//! Inline SVG chart rendering for the dashboard.
//!
//! Line charts draw each run of defined values as its own polyline, so a
//! missing value leaves a gap instead of dropping the line to zero.

use std::fmt::Write;

use chrono::NaiveDate;

use crate::domain::histogram::Histogram;
use crate::domain::metrics::AugmentedSeries;

const WIDTH: f64 = 800.0;
const HEIGHT: f64 = 320.0;
const PADDING: f64 = 56.0;

pub const NO_DATA: &str = "No data available.";

/// One line on a line chart.
pub struct LineSeries<'a> {
    pub label: String,
    pub color: &'a str,
    pub dashed: bool,
    pub values: Vec<Option<f64>>,
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

fn open_svg(out: &mut String, title: &str) {
    let _ = write!(
        out,
        r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 {w} {h}" width="{w}" height="{h}" role="img" aria-label="{t}">"#,
        w = WIDTH,
        h = HEIGHT,
        t = escape(title)
    );
    let _ = write!(
        out,
        r#"<rect width="{}" height="{}" fill="white"/><text x="{}" y="24" text-anchor="middle" font-size="16" font-family="sans-serif">{}</text>"#,
        WIDTH,
        HEIGHT,
        WIDTH / 2.0,
        escape(title)
    );
}

/// An SVG holding only the title and the empty-state message.
pub fn empty_chart(title: &str) -> String {
    let mut out = String::new();
    open_svg(&mut out, title);
    let _ = write!(
        out,
        r##"<text x="{}" y="{}" text-anchor="middle" font-size="14" font-family="sans-serif" fill="#666">{}</text></svg>"##,
        WIDTH / 2.0,
        HEIGHT / 2.0,
        NO_DATA
    );
    out
}

fn draw_axes(out: &mut String, x_label: &str, y_label: &str) {
    let bottom = HEIGHT - PADDING;
    let right = WIDTH - PADDING;
    let _ = write!(
        out,
        r##"<g stroke="#333" stroke-width="1"><line x1="{p}" y1="{p}" x2="{p}" y2="{b}"/><line x1="{p}" y1="{b}" x2="{r}" y2="{b}"/></g>"##,
        p = PADDING,
        b = bottom,
        r = right
    );
    let _ = write!(
        out,
        r#"<text x="{}" y="{}" text-anchor="middle" font-size="12" font-family="sans-serif">{}</text>"#,
        WIDTH / 2.0,
        HEIGHT - 10.0,
        escape(x_label)
    );
    let _ = write!(
        out,
        r#"<text x="14" y="{y}" text-anchor="middle" font-size="12" font-family="sans-serif" transform="rotate(-90 14 {y})">{}</text>"#,
        escape(y_label),
        y = HEIGHT / 2.0
    );
}

fn value_range<'a>(values: impl Iterator<Item = &'a Option<f64>>) -> Option<(f64, f64)> {
    values.flatten().filter(|v| v.is_finite()).fold(None, |acc, &v| match acc {
        None => Some((v, v)),
        Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
    })
}

fn format_tick(value: f64) -> String {
    if value.abs() >= 100.0 {
        format!("{:.0}", value)
    } else if value.abs() >= 1.0 {
        format!("{:.2}", value)
    } else {
        format!("{:.4}", value)
    }
}

/// Line chart over a shared date axis. Each series must have one entry per date.
pub fn line_chart(
    title: &str,
    x_label: &str,
    y_label: &str,
    dates: &[NaiveDate],
    series: &[LineSeries<'_>],
) -> String {
    let Some((min, max)) = value_range(series.iter().flat_map(|s| s.values.iter())) else {
        return empty_chart(title);
    };

    let plot_width = WIDTH - 2.0 * PADDING;
    let plot_height = HEIGHT - 2.0 * PADDING;
    let range = max - min;
    let scale_y = if range > 0.0 { plot_height / range } else { 1.0 };
    let scale_x = if dates.len() > 1 {
        plot_width / (dates.len() - 1) as f64
    } else {
        0.0
    };
    let y_of = |v: f64| {
        if range > 0.0 {
            HEIGHT - PADDING - (v - min) * scale_y
        } else {
            HEIGHT / 2.0
        }
    };

    let mut out = String::new();
    open_svg(&mut out, title);
    draw_axes(&mut out, x_label, y_label);

    for (value, y) in [(max, y_of(max)), (min, y_of(min))] {
        let _ = write!(
            out,
            r#"<text x="{}" y="{:.1}" text-anchor="end" font-size="10" font-family="sans-serif">{}</text>"#,
            PADDING - 4.0,
            y + 3.0,
            format_tick(value)
        );
    }
    if let (Some(first), Some(last)) = (dates.first(), dates.last()) {
        let _ = write!(
            out,
            r#"<text x="{}" y="{}" font-size="10" font-family="sans-serif">{}</text><text x="{}" y="{}" text-anchor="end" font-size="10" font-family="sans-serif">{}</text>"#,
            PADDING,
            HEIGHT - PADDING + 14.0,
            first,
            WIDTH - PADDING,
            HEIGHT - PADDING + 14.0,
            last
        );
    }

    for line in series {
        let dash = if line.dashed {
            r#" stroke-dasharray="6 4""#
        } else {
            ""
        };
        for segment in segments(&line.values) {
            let points: Vec<(f64, f64)> = segment
                .iter()
                .map(|&(i, v)| (PADDING + i as f64 * scale_x, y_of(v)))
                .collect();
            if points.len() == 1 {
                let _ = write!(
                    out,
                    r#"<circle cx="{:.1}" cy="{:.1}" r="1.5" fill="{}"/>"#,
                    points[0].0, points[0].1, line.color
                );
            } else {
                let joined: Vec<String> = points
                    .iter()
                    .map(|(x, y)| format!("{:.1},{:.1}", x, y))
                    .collect();
                let _ = write!(
                    out,
                    r#"<polyline fill="none" stroke="{}" stroke-width="1.5"{} points="{}"/>"#,
                    line.color,
                    dash,
                    joined.join(" ")
                );
            }
        }
    }

    // legend
    for (n, line) in series.iter().enumerate() {
        let y = PADDING + 14.0 * n as f64;
        let x = WIDTH - PADDING - 150.0;
        let _ = write!(
            out,
            r#"<line x1="{:.1}" y1="{:.1}" x2="{:.1}" y2="{:.1}" stroke="{}" stroke-width="2"/><text x="{:.1}" y="{:.1}" font-size="11" font-family="sans-serif">{}</text>"#,
            x,
            y - 4.0,
            x + 20.0,
            y - 4.0,
            line.color,
            x + 26.0,
            y,
            escape(&line.label)
        );
    }

    out.push_str("</svg>");
    out
}

/// Runs of consecutive defined values as (index, value) pairs.
pub fn segments(values: &[Option<f64>]) -> Vec<Vec<(usize, f64)>> {
    let mut out = Vec::new();
    let mut current: Vec<(usize, f64)> = Vec::new();
    for (i, v) in values.iter().enumerate() {
        match v {
            Some(v) if v.is_finite() => current.push((i, *v)),
            _ => {
                if !current.is_empty() {
                    out.push(std::mem::take(&mut current));
                }
            }
        }
    }
    if !current.is_empty() {
        out.push(current);
    }
    out
}

fn dates_of(augmented: &AugmentedSeries<'_>) -> Vec<NaiveDate> {
    augmented.series.bars().iter().map(|b| b.date).collect()
}

pub fn price_chart_svg(augmented: &AugmentedSeries<'_>) -> String {
    let title = format!("{} Stock Price Trend", augmented.symbol());
    let closes = augmented
        .series
        .bars()
        .iter()
        .map(|b| Some(b.close))
        .collect();
    let series = [
        LineSeries {
            label: "Close Price".to_string(),
            color: "blue",
            dashed: false,
            values: closes,
        },
        LineSeries {
            label: format!("{}-Day SMA", augmented.config.sma_short),
            color: "green",
            dashed: true,
            values: augmented.sma_short(),
        },
        LineSeries {
            label: format!("{}-Day SMA", augmented.config.sma_long),
            color: "red",
            dashed: true,
            values: augmented.sma_long(),
        },
    ];
    line_chart(&title, "Date", "Price (USD)", &dates_of(augmented), &series)
}

pub fn volatility_chart_svg(augmented: &AugmentedSeries<'_>) -> String {
    let series = [LineSeries {
        label: "Volatility".to_string(),
        color: "red",
        dashed: false,
        values: augmented.volatility(),
    }];
    line_chart(
        "Stock Volatility Over Time",
        "Date",
        "Volatility",
        &dates_of(augmented),
        &series,
    )
}

pub fn returns_histogram_svg(histogram: &Histogram) -> String {
    let title = "Daily Returns Distribution";
    let max_count = histogram.max_count();
    if histogram.is_empty() || max_count == 0 {
        return empty_chart(title);
    }

    let plot_width = WIDTH - 2.0 * PADDING;
    let plot_height = HEIGHT - 2.0 * PADDING;
    let bar_width = plot_width / histogram.bins.len() as f64;
    let peak = histogram
        .density
        .iter()
        .map(|p| p.count)
        .fold(max_count as f64, f64::max);
    let scale_y = plot_height / peak;

    let mut out = String::new();
    open_svg(&mut out, title);
    draw_axes(&mut out, "Daily Return", "Count");

    for (i, bin) in histogram.bins.iter().enumerate() {
        if bin.count == 0 {
            continue;
        }
        let h = bin.count as f64 * scale_y;
        let _ = write!(
            out,
            r#"<rect x="{:.1}" y="{:.1}" width="{:.1}" height="{:.1}" fill="purple" fill-opacity="0.7"><title>{} to {}: {}</title></rect>"#,
            PADDING + i as f64 * bar_width,
            HEIGHT - PADDING - h,
            (bar_width - 1.0).max(0.5),
            h,
            format_tick(bin.lower),
            format_tick(bin.upper),
            bin.count
        );
    }

    if let (Some(first), Some(last)) = (histogram.bins.first(), histogram.bins.last()) {
        let span = last.upper - first.lower;
        if !histogram.density.is_empty() && span > 0.0 {
            let points: Vec<String> = histogram
                .density
                .iter()
                .map(|p| {
                    format!(
                        "{:.1},{:.1}",
                        PADDING + (p.x - first.lower) / span * plot_width,
                        HEIGHT - PADDING - p.count * scale_y
                    )
                })
                .collect();
            let _ = write!(
                out,
                r#"<polyline fill="none" stroke="indigo" stroke-width="1.5" points="{}"><title>Density</title></polyline>"#,
                points.join(" ")
            );
        }

        let _ = write!(
            out,
            r#"<text x="{}" y="{}" font-size="10" font-family="sans-serif">{}</text><text x="{}" y="{}" text-anchor="end" font-size="10" font-family="sans-serif">{}</text>"#,
            PADDING,
            HEIGHT - PADDING + 14.0,
            format_tick(first.lower),
            WIDTH - PADDING,
            HEIGHT - PADDING + 14.0,
            format_tick(last.upper)
        );
    }
    let _ = write!(
        out,
        r#"<text x="{}" y="{:.1}" text-anchor="end" font-size="10" font-family="sans-serif">{}</text>"#,
        PADDING - 4.0,
        PADDING + 3.0,
        peak.round()
    );

    out.push_str("</svg>");
    out
}
