//! services/api/src/adapters/png_chart.rs
//!
//! This module contains the chart renderer, which implements the
//! `ChartRenderingService` port. A habit's series is laid out as an SVG
//! document and then rasterized to PNG with `resvg`.

use crate::markup::escape;
use chrono::{Duration, NaiveDate};
use habit_tracker_core::chart::ChartBounds;
use habit_tracker_core::domain::SeriesPoint;
use habit_tracker_core::ports::{ChartRenderingService, PortError, PortResult, RenderedChart};
use resvg::{tiny_skia, usvg};
use std::fmt::Write;
use std::sync::Arc;

const WIDTH: f64 = 1000.0;
const HEIGHT: f64 = 600.0;
const MARGIN_LEFT: f64 = 90.0;
const MARGIN_RIGHT: f64 = 40.0;
const MARGIN_TOP: f64 = 60.0;
const MARGIN_BOTTOM: f64 = 140.0;
const MAX_X_TICKS: i64 = 8;
const Y_TICKS: usize = 5;
const LINE_COLOR: &str = "#d62728";

pub const NO_DATA_MESSAGE: &str = "No data found for the selected habit.";

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// An adapter that implements the `ChartRenderingService` port, producing PNG images.
#[derive(Clone)]
pub struct PngChartAdapter {
    fontdb: Arc<usvg::fontdb::Database>,
}

impl PngChartAdapter {
    /// Creates a new `PngChartAdapter`, indexing the system fonts once.
    pub fn new() -> Self {
        let mut fontdb = usvg::fontdb::Database::new();
        fontdb.load_system_fonts();

        // `sans-serif` maps to Arial unless told otherwise.
        let sans_serif = usvg::fontdb::Query {
            families: &[usvg::fontdb::Family::SansSerif],
            ..Default::default()
        };
        if fontdb.query(&sans_serif).is_none() {
            let fallback = fontdb
                .faces()
                .find_map(|face| face.families.first().map(|(name, _)| name.clone()));
            if let Some(family) = fallback {
                fontdb.set_sans_serif_family(family);
            }
        }

        Self {
            fontdb: Arc::new(fontdb),
        }
    }

    fn rasterize(&self, svg: &str) -> PortResult<Vec<u8>> {
        let options = usvg::Options {
            fontdb: Arc::clone(&self.fontdb),
            ..usvg::Options::default()
        };
        let tree = usvg::Tree::from_str(svg, &options)
            .map_err(|e| PortError::Unexpected(format!("Failed to parse chart: {e}")))?;

        let size = tree.size().to_int_size();
        let mut pixmap = tiny_skia::Pixmap::new(size.width(), size.height())
            .ok_or_else(|| PortError::Unexpected("Chart canvas has no area".to_string()))?;
        resvg::render(&tree, tiny_skia::Transform::default(), &mut pixmap.as_mut());

        pixmap
            .encode_png()
            .map_err(|e| PortError::Unexpected(format!("Failed to encode chart: {e}")))
    }
}

impl Default for PngChartAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl ChartRenderingService for PngChartAdapter {
    fn render_series(&self, habit_name: &str, points: &[SeriesPoint]) -> PortResult<RenderedChart> {
        let svg = render_svg(habit_name, points)?;
        Ok(RenderedChart {
            content_type: "image/png",
            bytes: self.rasterize(&svg)?,
        })
    }
}

//=========================================================================================
// Rendering
//=========================================================================================

/// Maps data coordinates onto the plot area. Zero-width ranges collapse onto the origin.
struct Frame {
    bounds: ChartBounds,
    left: f64,
    right: f64,
    top: f64,
    bottom: f64,
}

impl Frame {
    fn new(bounds: ChartBounds) -> Self {
        Self {
            bounds,
            left: MARGIN_LEFT,
            right: WIDTH - MARGIN_RIGHT,
            top: MARGIN_TOP,
            bottom: HEIGHT - MARGIN_BOTTOM,
        }
    }

    fn x(&self, date: NaiveDate) -> f64 {
        let span = self.bounds.day_span();
        if span == 0 {
            return self.left;
        }
        let offset = (date - self.bounds.min_date).num_days() as f64;
        self.left + offset / span as f64 * (self.right - self.left)
    }

    fn y(&self, duration: f64) -> f64 {
        let span = self.bounds.duration_span();
        if span == 0.0 {
            return self.bottom;
        }
        self.bottom - (duration - self.bounds.min_duration) / span * (self.bottom - self.top)
    }
}

fn render_svg(habit_name: &str, points: &[SeriesPoint]) -> PortResult<String> {
    let bounds = ChartBounds::from_points(points)
        .ok_or_else(|| PortError::NotFound(NO_DATA_MESSAGE.to_string()))?;
    let frame = Frame::new(bounds);
    let mut svg = String::new();
    draw(&mut svg, &frame, habit_name, points)
        .map_err(|e| PortError::Unexpected(format!("Failed to render chart: {e}")))?;
    Ok(svg)
}

fn draw(
    svg: &mut String,
    frame: &Frame,
    habit_name: &str,
    points: &[SeriesPoint],
) -> std::fmt::Result {
    writeln!(
        svg,
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{WIDTH}" height="{HEIGHT}" viewBox="0 0 {WIDTH} {HEIGHT}" font-family="sans-serif">"#
    )?;
    writeln!(svg, r#"<rect width="100%" height="100%" fill="white"/>"#)?;
    writeln!(
        svg,
        r#"<text x="{:.1}" y="35" text-anchor="middle" font-size="20">Duration of &#39;{}&#39; Habit Over Time</text>"#,
        WIDTH / 2.0,
        escape(habit_name)
    )?;

    // Axes
    writeln!(
        svg,
        r#"<g stroke="black" stroke-width="1"><line x1="{l:.1}" y1="{b:.1}" x2="{r:.1}" y2="{b:.1}"/><line x1="{l:.1}" y1="{t:.1}" x2="{l:.1}" y2="{b:.1}"/></g>"#,
        l = frame.left,
        r = frame.right,
        t = frame.top,
        b = frame.bottom
    )?;

    for date in x_ticks(&frame.bounds) {
        let x = frame.x(date);
        let label_y = frame.bottom + 18.0;
        writeln!(
            svg,
            r#"<line x1="{x:.1}" y1="{b:.1}" x2="{x:.1}" y2="{t:.1}" stroke="black"/><text x="{x:.1}" y="{label_y:.1}" font-size="12" text-anchor="end" transform="rotate(-45 {x:.1} {label_y:.1})">{}</text>"#,
            date.format("%d/%m/%Y"),
            b = frame.bottom,
            t = frame.bottom + 5.0
        )?;
    }

    for value in y_ticks(&frame.bounds) {
        let y = frame.y(value);
        writeln!(
            svg,
            r#"<line x1="{l:.1}" y1="{y:.1}" x2="{t:.1}" y2="{y:.1}" stroke="black"/><text x="{lx:.1}" y="{ly:.1}" font-size="12" text-anchor="end">{}</text>"#,
            format_tick(value),
            l = frame.left - 5.0,
            t = frame.left,
            lx = frame.left - 8.0,
            ly = y + 4.0
        )?;
    }

    writeln!(
        svg,
        r#"<text x="{:.1}" y="{:.1}" text-anchor="middle" font-size="14">Timestamp</text>"#,
        (frame.left + frame.right) / 2.0,
        HEIGHT - 15.0
    )?;
    writeln!(
        svg,
        r#"<text x="20" y="{cy:.1}" text-anchor="middle" font-size="14" transform="rotate(-90 20 {cy:.1})">Duration (minutes)</text>"#,
        cy = (frame.top + frame.bottom) / 2.0
    )?;

    // Series: one connected line, a marker on every point.
    let path = points
        .iter()
        .map(|p| format!("{:.1},{:.1}", frame.x(p.date), frame.y(p.duration)))
        .collect::<Vec<_>>()
        .join(" ");
    writeln!(
        svg,
        r#"<polyline fill="none" stroke="{LINE_COLOR}" stroke-width="2" points="{path}"/>"#
    )?;
    for p in points {
        writeln!(
            svg,
            r#"<circle cx="{:.1}" cy="{:.1}" r="4" fill="{LINE_COLOR}"/>"#,
            frame.x(p.date),
            frame.y(p.duration)
        )?;
    }

    writeln!(svg, "</svg>")
}

fn x_ticks(bounds: &ChartBounds) -> Vec<NaiveDate> {
    let span = bounds.day_span();
    let step = ((span + MAX_X_TICKS - 1) / MAX_X_TICKS).max(1);
    let mut ticks = Vec::new();
    let mut offset = 0;
    while offset <= span {
        ticks.push(bounds.min_date + Duration::days(offset));
        offset += step;
    }
    ticks
}

fn y_ticks(bounds: &ChartBounds) -> Vec<f64> {
    let span = bounds.duration_span();
    if span == 0.0 {
        return vec![bounds.min_duration];
    }
    (0..Y_TICKS)
        .map(|i| bounds.min_duration + span * i as f64 / (Y_TICKS - 1) as f64)
        .collect()
}

fn format_tick(value: f64) -> String {
    let text = format!("{value:.2}");
    text.trim_end_matches('0').trim_end_matches('.').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point(y: i32, m: u32, d: u32, duration: f64) -> SeriesPoint {
        SeriesPoint {
            date: NaiveDate::from_ymd_opt(y, m, d).unwrap(),
            duration,
        }
    }

    fn render(name: &str, points: &[SeriesPoint]) -> String {
        render_svg(name, points).unwrap()
    }

    /// Width and height from the PNG `IHDR` chunk.
    fn png_dimensions(bytes: &[u8]) -> (u32, u32) {
        let width = u32::from_be_bytes(bytes[16..20].try_into().unwrap());
        let height = u32::from_be_bytes(bytes[20..24].try_into().unwrap());
        (width, height)
    }

    #[test]
    fn empty_series_is_not_found() {
        let err = PngChartAdapter::new().render_series("Running", &[]).unwrap_err();
        assert!(matches!(err, PortError::NotFound(ref msg) if msg == NO_DATA_MESSAGE));
    }

    #[test]
    fn series_is_rasterized_to_png() {
        let chart = PngChartAdapter::new()
            .render_series("Running", &[point(2024, 1, 1, 30.0), point(2024, 1, 3, 45.0)])
            .unwrap();
        assert_eq!(chart.content_type, "image/png");
        assert!(chart.bytes.starts_with(b"\x89PNG\r\n\x1a\n"));
        assert_eq!(png_dimensions(&chart.bytes), (1000, 600));
    }

    #[test]
    fn layout_carries_title_axes_and_date_labels() {
        let svg = render(
            "Running",
            &[point(2024, 1, 1, 30.0), point(2024, 1, 3, 45.0)],
        );
        assert!(svg.starts_with("<svg"));
        assert!(svg.contains("Duration of &#39;Running&#39; Habit Over Time"));
        assert!(svg.contains("Duration (minutes)"));
        assert!(svg.contains(">01/01/2024</text>"));
        assert!(svg.contains(">03/01/2024</text>"));
        assert!(svg.contains("rotate(-45"));
        assert_eq!(svg.matches("<circle").count(), 2);
        assert_eq!(svg.matches("<polyline").count(), 1);
    }

    #[test]
    fn points_span_the_full_plot_area() {
        let svg = render(
            "Running",
            &[point(2024, 1, 1, 10.0), point(2024, 1, 11, 20.0)],
        );
        // min maps to the bottom-left corner, max to the top-right one.
        assert!(svg.contains(r#"<circle cx="90.0" cy="460.0""#));
        assert!(svg.contains(r#"<circle cx="960.0" cy="60.0""#));
    }

    #[test]
    fn single_point_renders_at_origin() {
        let svg = render("Running", &[point(2024, 1, 1, 30.0)]);
        assert_eq!(svg.matches("<circle").count(), 1);
        assert!(svg.contains(r#"<circle cx="90.0" cy="460.0""#));
        assert_eq!(svg.matches("rotate(-45").count(), 1);
        assert!(svg.contains(">30</text>"));
    }

    #[test]
    fn habit_name_is_escaped() {
        let svg = render("<script>", &[point(2024, 1, 1, 1.0)]);
        assert!(!svg.contains("<script>"));
        assert!(svg.contains("&lt;script&gt;"));

        // and the escaped layout still parses and rasterizes
        let chart = PngChartAdapter::new()
            .render_series("<script> & \"quotes\"", &[point(2024, 1, 1, 1.0)])
            .unwrap();
        assert!(chart.bytes.starts_with(b"\x89PNG"));
    }

    #[test]
    fn long_ranges_are_thinned_to_a_handful_of_ticks() {
        let bounds = ChartBounds::from_points(&[
            point(2024, 1, 1, 1.0),
            point(2024, 12, 31, 2.0),
        ])
        .unwrap();
        let ticks = x_ticks(&bounds);
        assert!(ticks.len() <= MAX_X_TICKS as usize + 1);
        assert_eq!(ticks[0], bounds.min_date);
    }

    #[test]
    fn tick_labels_drop_trailing_zeros() {
        assert_eq!(format_tick(30.0), "30");
        assert_eq!(format_tick(12.5), "12.5");
        assert_eq!(format_tick(0.126), "0.13");
    }
}
