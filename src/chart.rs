//! Funnel bar chart rendering.
//!
//! The chart is laid out as plain geometry ([`BarChart`]), serialized to SVG,
//! rasterized headlessly with `resvg` and encoded as a PNG. The PNG is then
//! base64 encoded so the reporter can inline it as a `data:` URI.

use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use base64::Engine;
use png::{BitDepth, ColorType, Encoder};
use resvg::tiny_skia::{Pixmap, Transform};
use resvg::usvg::{Options, Tree};
use std::fmt::Write;

use crate::config::ReportOptions;
use crate::errors::{ReportError, ReportResult};
use crate::models::FunnelMetrics;
use crate::utils::escape_html;

const MARGIN_LEFT: f64 = 70.0;
const MARGIN_RIGHT: f64 = 20.0;
const MARGIN_TOP: f64 = 50.0;
const MARGIN_BOTTOM: f64 = 45.0;
/// Fraction of each category slot covered by its bar.
const BAR_FILL: f64 = 0.8;
const TARGET_TICKS: f64 = 5.0;
const FONT_FAMILY: &str = "DejaVu Sans, Arial, Helvetica, sans-serif";
const BAR_COLOR: &str = "#1f77b4";

const DIGIT_WIDTH: f64 = 6.0;
const DIGIT_HEIGHT: f64 = 10.0;
const DIGIT_ADVANCE: f64 = 9.0;
/// Seven-segment masks for 0-9; bit order matches `SEGMENT_LINES`.
const DIGIT_SEGMENTS: [u8; 10] = [0x3f, 0x06, 0x5b, 0x4f, 0x66, 0x6d, 0x7d, 0x07, 0x7f, 0x6f];
/// Top, upper right, lower right, bottom, lower left, upper left, middle,
/// as fractions of the digit box.
const SEGMENT_LINES: [((f64, f64), (f64, f64)); 7] = [
    ((0.0, 0.0), (1.0, 0.0)),
    ((1.0, 0.0), (1.0, 0.5)),
    ((1.0, 0.5), (1.0, 1.0)),
    ((0.0, 1.0), (1.0, 1.0)),
    ((0.0, 0.5), (0.0, 1.0)),
    ((0.0, 0.0), (0.0, 0.5)),
    ((0.0, 0.5), (1.0, 0.5)),
];

/// Encoded chart ready for embedding.
#[derive(Debug, Clone)]
pub struct ChartImage {
    pub png: Vec<u8>,
    pub base64: String,
}

/// `data:` URI for base64-encoded PNG text.
pub fn png_data_uri(base64: &str) -> String {
    format!("data:image/png;base64,{}", base64)
}

#[derive(Debug, Clone, PartialEq)]
pub struct Bar {
    pub label: &'static str,
    pub value: u64,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Bar {
    fn center(&self) -> f64 {
        self.x + self.width / 2.0
    }
}

/// Resolved chart geometry in pixel coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct BarChart {
    pub width: u32,
    pub height: u32,
    pub title: String,
    pub y_label: String,
    pub bars: Vec<Bar>,
    pub axis_max: u64,
    pub ticks: Vec<u64>,
    /// Draw value annotations as stroked outlines instead of font text
    pub outline_values: bool,
}

impl BarChart {
    fn plot_top(&self) -> f64 {
        MARGIN_TOP
    }

    fn plot_bottom(&self) -> f64 {
        self.height as f64 - MARGIN_BOTTOM
    }

    fn plot_right(&self) -> f64 {
        self.width as f64 - MARGIN_RIGHT
    }

    fn y_for(&self, value: u64) -> f64 {
        let span = self.plot_bottom() - self.plot_top();
        self.plot_bottom() - span * value as f64 / self.axis_max as f64
    }

    /// Value annotations in bar order, as drawn above each bar.
    pub fn annotations(&self) -> Vec<String> {
        self.bars.iter().map(|bar| bar.value.to_string()).collect()
    }

    pub fn to_svg(&self) -> String {
        let mut svg = String::new();
        let bottom = self.plot_bottom();
        let right = self.plot_right();

        let _ = writeln!(
            svg,
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}" font-family="{FONT_FAMILY}">"#,
            w = self.width,
            h = self.height
        );
        let _ = writeln!(svg, r##"  <rect width="100%" height="100%" fill="#ffffff"/>"##);

        // Grid lines and tick labels
        for &tick in &self.ticks {
            let y = self.y_for(tick);
            let _ = writeln!(
                svg,
                r##"  <line x1="{MARGIN_LEFT}" y1="{y:.1}" x2="{right}" y2="{y:.1}" stroke="#e5e5e5" stroke-width="1"/>"##
            );
            let _ = writeln!(
                svg,
                r##"  <text x="{:.1}" y="{:.1}" font-size="11" text-anchor="end" fill="#333333">{}</text>"##,
                MARGIN_LEFT - 6.0,
                y + 4.0,
                tick
            );
        }

        for bar in &self.bars {
            let _ = writeln!(
                svg,
                r#"  <rect x="{:.1}" y="{:.1}" width="{:.1}" height="{:.1}" fill="{BAR_COLOR}"/>"#,
                bar.x, bar.y, bar.width, bar.height
            );
            if self.outline_values {
                let _ = writeln!(
                    svg,
                    r##"  <path class="value" d="{}" fill="none" stroke="#000000" stroke-width="1.5" stroke-linecap="round"/>"##,
                    digit_outline(bar.value, bar.center(), bar.y - 5.0)
                );
            } else {
                let _ = writeln!(
                    svg,
                    r##"  <text class="value" x="{:.1}" y="{:.1}" font-size="12" text-anchor="middle" fill="#000000">{}</text>"##,
                    bar.center(),
                    bar.y - 5.0,
                    bar.value
                );
            }
            let _ = writeln!(
                svg,
                r##"  <text class="category" x="{:.1}" y="{:.1}" font-size="12" text-anchor="middle" fill="#000000">{}</text>"##,
                bar.center(),
                bottom + 18.0,
                bar.label
            );
        }

        // Axes
        let _ = writeln!(
            svg,
            r##"  <line x1="{MARGIN_LEFT}" y1="{:.1}" x2="{MARGIN_LEFT}" y2="{bottom:.1}" stroke="#000000" stroke-width="1"/>"##,
            self.plot_top()
        );
        let _ = writeln!(
            svg,
            r##"  <line x1="{MARGIN_LEFT}" y1="{bottom:.1}" x2="{right}" y2="{bottom:.1}" stroke="#000000" stroke-width="1"/>"##
        );

        let mid_y = (self.plot_top() + bottom) / 2.0;
        let _ = writeln!(
            svg,
            r##"  <text x="20" y="{mid_y:.1}" font-size="13" text-anchor="middle" fill="#000000" transform="rotate(-90 20 {mid_y:.1})">{}</text>"##,
            escape_html(&self.y_label)
        );
        let _ = writeln!(
            svg,
            r##"  <text x="{:.1}" y="30" font-size="15" text-anchor="middle" fill="#000000">{}</text>"##,
            (MARGIN_LEFT + right) / 2.0,
            escape_html(&self.title)
        );

        let _ = writeln!(svg, "</svg>");
        svg
    }
}

/// Headless chart renderer. Construction loads the font database once.
pub struct ChartRenderer {
    options: Options<'static>,
    report_options: ReportOptions,
}

impl ChartRenderer {
    /// Loads system fonts plus any fonts in `report_options.font_dir`.
    pub fn new(report_options: ReportOptions) -> Self {
        let mut options = Options::default();
        options.fontdb_mut().load_system_fonts();
        if let Some(dir) = &report_options.font_dir {
            options.fontdb_mut().load_fonts_dir(dir);
            log::debug!("Loaded fonts from {}", dir.display());
        }
        Self::with_options(options, report_options)
    }

    fn with_options(options: Options<'static>, report_options: ReportOptions) -> Self {
        log::debug!("Chart renderer has {} font faces", options.fontdb.len());
        if options.fontdb.is_empty() {
            log::warn!("No fonts found; chart labels will be missing, values drawn as outlines");
        }

        Self {
            options,
            report_options,
        }
    }

    /// Lay out the four funnel bars.
    pub fn layout(&self, metrics: &FunnelMetrics) -> BarChart {
        let width = self.report_options.chart_width;
        let height = self.report_options.chart_height;

        let max_value = metrics.values().into_iter().max().unwrap_or(0);
        // Headroom for the value labels above the tallest bar
        let wanted = ((max_value as f64) * 1.1).ceil().max(1.0);
        let step = nice_step(wanted / TARGET_TICKS);
        let axis_max = ((wanted / step as f64).ceil() as u64).max(1) * step;
        let ticks: Vec<u64> = (0..=axis_max / step).map(|i| i * step).collect();

        let mut chart = BarChart {
            width,
            height,
            title: self.report_options.chart_title.clone(),
            y_label: self.report_options.y_axis_label.clone(),
            bars: Vec::with_capacity(FunnelMetrics::LABELS.len()),
            axis_max,
            ticks,
            outline_values: self.options.fontdb.is_empty(),
        };

        let slot = (chart.plot_right() - MARGIN_LEFT) / FunnelMetrics::LABELS.len() as f64;
        let bar_width = slot * BAR_FILL;
        let bottom = chart.plot_bottom();
        for (idx, (label, value)) in metrics.stages().enumerate() {
            let y = chart.y_for(value);
            chart.bars.push(Bar {
                label,
                value,
                x: MARGIN_LEFT + slot * idx as f64 + (slot - bar_width) / 2.0,
                y,
                width: bar_width,
                height: bottom - y,
            });
        }
        chart
    }

    /// Render the funnel chart to PNG and its base64 text.
    pub fn render(&self, metrics: &FunnelMetrics) -> ReportResult<ChartImage> {
        let chart = self.layout(metrics);
        let png = self.rasterize(&chart.to_svg(), chart.width, chart.height)?;
        let base64 = BASE64_STANDARD.encode(&png);
        log::info!(
            "Rendered {}x{} funnel chart ({} PNG bytes)",
            chart.width,
            chart.height,
            png.len()
        );
        Ok(ChartImage { png, base64 })
    }

    fn rasterize(&self, svg: &str, width: u32, height: u32) -> ReportResult<Vec<u8>> {
        let tree = Tree::from_data(svg.as_bytes(), &self.options)
            .map_err(|err| ReportError::chart(format!("SVG parse failed: {err}")))?;

        let mut pixmap = Pixmap::new(width, height)
            .ok_or_else(|| ReportError::chart(format!("cannot allocate {width}x{height} pixmap")))?;
        resvg::render(&tree, Transform::default(), &mut pixmap.as_mut());

        let mut out = Vec::new();
        {
            let mut encoder = Encoder::new(&mut out, width, height);
            encoder.set_color(ColorType::Rgba);
            encoder.set_depth(BitDepth::Eight);
            let mut writer = encoder.write_header().map_err(ReportError::chart)?;
            writer
                .write_image_data(pixmap.data())
                .map_err(ReportError::chart)?;
            writer.finish().map_err(ReportError::chart)?;
        }
        Ok(out)
    }
}

/// Stroke path spelling `value` in seven-segment digits, centered on
/// `center_x` with the digit bottoms on `baseline`.
fn digit_outline(value: u64, center_x: f64, baseline: f64) -> String {
    let digits: Vec<usize> = value
        .to_string()
        .chars()
        .filter_map(|c| c.to_digit(10))
        .map(|d| d as usize)
        .collect();
    let total_width = digits.len() as f64 * DIGIT_ADVANCE - (DIGIT_ADVANCE - DIGIT_WIDTH);
    let left = center_x - total_width / 2.0;
    let top = baseline - DIGIT_HEIGHT;

    let mut path = String::new();
    for (idx, digit) in digits.into_iter().enumerate() {
        let x = left + idx as f64 * DIGIT_ADVANCE;
        for (segment, ((x1, y1), (x2, y2))) in SEGMENT_LINES.iter().enumerate() {
            if DIGIT_SEGMENTS[digit] & (1 << segment) == 0 {
                continue;
            }
            let _ = write!(
                path,
                "M{:.1} {:.1}L{:.1} {:.1}",
                x + x1 * DIGIT_WIDTH,
                top + y1 * DIGIT_HEIGHT,
                x + x2 * DIGIT_WIDTH,
                top + y2 * DIGIT_HEIGHT
            );
        }
    }
    path
}

/// Smallest 1/2/5 x 10^k step that is at least `raw` (and at least 1).
fn nice_step(raw: f64) -> u64 {
    if raw <= 1.0 {
        return 1;
    }
    let magnitude = 10f64.powf(raw.log10().floor());
    let normalized = raw / magnitude;
    let nice = if normalized <= 1.0 {
        1.0
    } else if normalized <= 2.0 {
        2.0
    } else if normalized <= 5.0 {
        5.0
    } else {
        10.0
    };
    (nice * magnitude).round() as u64
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn metrics(sent: u64, opened: u64, clicked: u64, submitted: u64) -> FunnelMetrics {
        FunnelMetrics {
            sent,
            opened,
            clicked,
            submitted,
        }
    }

    #[test]
    fn test_layout_orders_bars_and_annotates_values() {
        let renderer = ChartRenderer::new(ReportOptions::default());
        let chart = renderer.layout(&metrics(120, 64, 17, 5));

        let labels: Vec<_> = chart.bars.iter().map(|b| b.label).collect();
        assert_eq!(labels, vec!["Sent", "Opened", "Clicked", "Submitted"]);
        assert_eq!(chart.annotations(), vec!["120", "64", "17", "5"]);
        assert!(chart.axis_max >= 120);

        // Taller value, taller bar
        assert!(chart.bars[0].height > chart.bars[1].height);
        assert!(chart.bars[1].height > chart.bars[3].height);
    }

    #[test]
    fn test_svg_contains_labels_and_values() {
        let renderer = ChartRenderer::new(ReportOptions::default());
        let mut chart = renderer.layout(&metrics(40, 22, 9, 3));
        chart.outline_values = false;
        let svg = chart.to_svg();

        assert!(svg.contains("Phishing Campaign Funnel"));
        assert!(svg.contains(">Count</text>"));
        for value in ["40", "22", "9", "3"] {
            assert!(
                svg.contains(&format!(r##"fill="#000000">{value}</text>"##)),
                "missing annotation {value}"
            );
        }
        let sent = svg.find(">Sent<").unwrap_or(usize::MAX);
        let submitted = svg.find(">Submitted<").unwrap_or(0);
        assert!(sent < submitted);
    }

    #[test]
    fn test_all_zero_metrics_have_nonzero_axis() {
        let renderer = ChartRenderer::new(ReportOptions::default());
        let chart = renderer.layout(&metrics(0, 0, 0, 0));
        assert!(chart.axis_max >= 1);
        assert!(chart.bars.iter().all(|b| b.height == 0.0));
    }

    #[test]
    fn test_values_outlined_without_fonts() -> Result<(), Box<dyn std::error::Error>> {
        let renderer = ChartRenderer::with_options(Options::default(), ReportOptions::default());
        let chart = renderer.layout(&metrics(18, 8, 1, 0));
        assert!(chart.outline_values);

        let svg = chart.to_svg();
        assert_eq!(svg.matches(r#"<path class="value""#).count(), 4);
        assert!(!svg.contains(r#"<text class="value""#));
        assert!(svg.contains(&digit_outline(18, chart.bars[0].center(), chart.bars[0].y - 5.0)));

        let image = renderer.render(&metrics(18, 8, 1, 0))?;
        let reader = png::Decoder::new(Cursor::new(image.png)).read_info()?;
        assert_eq!(reader.info().width, 600);
        Ok(())
    }

    #[test]
    fn test_digit_outline_segments() {
        let strokes = |value| digit_outline(value, 0.0, 10.0).matches('M').count();
        assert_eq!(strokes(1), 2);
        assert_eq!(strokes(8), 7);
        assert_eq!(strokes(10), 8);
        assert_eq!(strokes(247), 5 + 4 + 3);

        // "1" is the right-hand vertical pair of a digit box centered on 0
        assert_eq!(digit_outline(1, 0.0, 10.0), "M3.0 0.0L3.0 5.0M3.0 5.0L3.0 10.0");
    }

    #[test]
    fn test_nice_step() {
        assert_eq!(nice_step(0.4), 1);
        assert_eq!(nice_step(1.5), 2);
        assert_eq!(nice_step(3.0), 5);
        assert_eq!(nice_step(7.0), 10);
        assert_eq!(nice_step(26.4), 50);
    }

    #[test]
    fn test_render_produces_decodable_png() -> Result<(), Box<dyn std::error::Error>> {
        let renderer = ChartRenderer::new(ReportOptions::default());
        let image = renderer.render(&metrics(3, 1, 1, 1))?;

        assert!(png_data_uri(&image.base64).starts_with("data:image/png;base64,"));
        let decoded = BASE64_STANDARD.decode(&image.base64)?;
        assert_eq!(decoded, image.png);

        let decoder = png::Decoder::new(Cursor::new(decoded));
        let reader = decoder.read_info()?;
        assert_eq!(reader.info().width, 600);
        assert_eq!(reader.info().height, 400);
        Ok(())
    }
}
