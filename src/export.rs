//! Raster and PDF export of 2D charts.
//!
//! Charts are drawn with plotters into an in-memory RGB buffer, encoded as
//! PNG, and from there either saved directly, turned into a data URI, or
//! embedded in a one-page A4 PDF.

use crate::dataset::{BAR_ALPHA, ChartConfig, PIE_ALPHA, Rgb};
use crate::error::ExportError;
use crate::options::{ChartOptions, pie_percentage_labels};
use crate::selection::ChartType;
use crate::sheet::display_value;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use flate2::Compression;
use flate2::write::ZlibEncoder;
use image::{GenericImageView, ImageBuffer, ImageFormat};
use log::{info, warn};
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use std::error::Error;
use std::f64::consts::{FRAC_PI_2, TAU};
use std::io::{Cursor, Write};
use std::path::{Path, PathBuf};

/// A4 portrait, in PDF points
pub const PAGE_WIDTH: f64 = 595.28;
pub const PAGE_HEIGHT: f64 = 841.89;

/// A rendered chart
#[derive(Debug, Clone, PartialEq)]
pub struct ChartSnapshot {
    pub chart_type: ChartType,
    pub width: u32,
    pub height: u32,
    /// PNG encoded pixels
    pub png: Vec<u8>,
}

impl ChartSnapshot {
    /// Wrap already encoded PNG bytes, reading the dimensions from them.
    pub fn from_png(chart_type: ChartType, png: Vec<u8>) -> Result<Self, ExportError> {
        let (width, height) = image::load_from_memory_with_format(&png, ImageFormat::Png)
            .map_err(|e| ExportError::Image(e.to_string()))?
            .dimensions();
        Ok(Self {
            chart_type,
            width,
            height,
            png,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Png,
    Pdf,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Png => "png",
            ExportFormat::Pdf => "pdf",
        }
    }
}

/// "{chart type}-chart.{ext}", e.g. `Bar-chart.png`
pub fn export_file_name(chart_type: ChartType, format: ExportFormat) -> String {
    format!("{}-chart.{}", chart_type, format.extension())
}

/// Encode the snapshot as a `data:image/png;base64,...` URI.
pub fn png_data_uri(snapshot: &ChartSnapshot) -> String {
    format!("data:image/png;base64,{}", STANDARD.encode(&snapshot.png))
}

/// Draw `config` and return it as a PNG snapshot.
///
/// # Arguments
/// * `config` - Labels and values to draw
/// * `options` - Title and axis options of the chart
/// * `chart_type` - Bar, Line or Pie
/// * `width`, `height` - Size of the image in pixels
///
/// # Errors
/// * `ExportError::Unsupported` for 3D column charts
/// * `ExportError::Render` if plotters fails, e.g. when no font is available
pub fn render_chart(
    config: &ChartConfig,
    options: &ChartOptions,
    chart_type: ChartType,
    width: u32,
    height: u32,
) -> Result<ChartSnapshot, ExportError> {
    if !chart_type.is_exportable() {
        return Err(ExportError::Unsupported(chart_type.to_string()));
    }
    if width == 0 || height == 0 {
        return Err(ExportError::Render(format!(
            "invalid canvas size {}x{}",
            width, height
        )));
    }

    let mut buffer = vec![0u8; rgb_buffer_len(width, height)];
    {
        let root = BitMapBackend::with_buffer(&mut buffer, (width, height)).into_drawing_area();
        let drawn = match chart_type {
            ChartType::Pie => draw_pie(&root, config, options),
            _ => draw_cartesian(&root, config, options, chart_type),
        };
        drawn
            .and_then(|()| root.present().map_err(|e| Box::new(e) as Box<dyn Error>))
            .map_err(|e| ExportError::Render(e.to_string()))?;
    }

    let png = encode_png(buffer, width, height)?;
    info!(
        "rendered {} chart {}x{} ({} bytes)",
        chart_type,
        width,
        height,
        png.len()
    );
    Ok(ChartSnapshot {
        chart_type,
        width,
        height,
        png,
    })
}

/// Bytes of an RGB canvas, computed in `usize` so large canvases do not wrap.
fn rgb_buffer_len(width: u32, height: u32) -> usize {
    width as usize * height as usize * 3
}

fn encode_png(buffer: Vec<u8>, width: u32, height: u32) -> Result<Vec<u8>, ExportError> {
    let img: ImageBuffer<image::Rgb<u8>, _> = ImageBuffer::from_raw(width, height, buffer)
        .ok_or_else(|| ExportError::Image("pixel buffer has the wrong size".to_string()))?;

    let mut png = Vec::new();
    img.write_to(&mut Cursor::new(&mut png), ImageFormat::Png)
        .map_err(|e| ExportError::Image(e.to_string()))?;
    Ok(png)
}

fn color(rgb: Rgb) -> RGBColor {
    RGBColor(rgb.0, rgb.1, rgb.2)
}

/// Y range covering every value and zero, with some headroom.
fn value_bounds(values: &[f64]) -> (f64, f64) {
    let low = values.iter().copied().fold(0.0, f64::min);
    let high = values.iter().copied().fold(0.0, f64::max);
    let span = if high > low { high - low } else { 1.0 };
    let low = if low < 0.0 { low - span * 0.1 } else { low };
    (low, high + span * 0.1)
}

fn draw_cartesian<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    config: &ChartConfig,
    options: &ChartOptions,
    chart_type: ChartType,
) -> Result<(), Box<dyn Error>>
where
    DB::ErrorType: 'static,
{
    area.fill(&WHITE)?;

    let values = &config.dataset.data;
    let labels: Vec<String> = config.labels.iter().map(display_value).collect();
    let (low, high) = value_bounds(values);

    let mut chart = ChartBuilder::on(area)
        .caption(&options.title, ("sans-serif", 24))
        .margin(16)
        .x_label_area_size(48)
        .y_label_area_size(64)
        .build_cartesian_2d((0..values.len() as i32).into_segmented(), low..high)?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(labels.len())
        .x_label_formatter(&|x| match x {
            SegmentValue::CenterOf(i) | SegmentValue::Exact(i) => {
                labels.get(*i as usize).cloned().unwrap_or_default()
            }
            SegmentValue::Last => String::new(),
        })
        .y_desc(&config.dataset.label)
        .draw()?;

    let style = &config.dataset.style;
    if chart_type == ChartType::Line {
        let accent = color(style.color_at(0));
        let points: Vec<_> = values
            .iter()
            .enumerate()
            .map(|(i, v)| (SegmentValue::CenterOf(i as i32), *v))
            .collect();
        chart
            .draw_series(LineSeries::new(points.clone(), accent.stroke_width(2)))?
            .label(config.dataset.label.clone())
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 16, y)], accent));
        chart.draw_series(
            points
                .into_iter()
                .map(|p| Circle::new(p, 4, accent.filled())),
        )?;
    } else {
        let first = color(style.color_at(0));
        chart
            .draw_series(values.iter().enumerate().map(|(i, v)| {
                let fill = color(style.color_at(i));
                let mut bar = Rectangle::new(
                    [
                        (SegmentValue::Exact(i as i32), 0.0),
                        (SegmentValue::Exact(i as i32 + 1), *v),
                    ],
                    fill.mix(BAR_ALPHA).filled(),
                );
                bar.set_margin(0, 0, 6, 6);
                bar
            }))?
            .label(config.dataset.label.clone())
            .legend(move |(x, y)| {
                Rectangle::new([(x, y - 5), (x + 12, y + 5)], first.mix(BAR_ALPHA).filled())
            });
    }

    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperMiddle)
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()?;

    Ok(())
}

fn on_circle(center: (i32, i32), radius: f64, angle: f64) -> (i32, i32) {
    (
        center.0 + (radius * angle.cos()).round() as i32,
        center.1 + (radius * angle.sin()).round() as i32,
    )
}

struct PieSlice {
    /// Position in the series, for the palette
    index: usize,
    sweep: f64,
    label: String,
}

/// Slices of a pie over `values`.
///
/// Zero and negative values get no slice. Percentages are taken over the
/// drawn values only, so every label matches the angle of its slice.
fn pie_slices(values: &[f64]) -> Vec<PieSlice> {
    let drawn: Vec<f64> = values.iter().map(|v| v.max(0.0)).collect();
    let total: f64 = drawn.iter().sum();
    if total <= 0.0 {
        return Vec::new();
    }
    drawn
        .iter()
        .zip(pie_percentage_labels(&drawn))
        .enumerate()
        .filter(|(_, (value, _))| **value > 0.0)
        .map(|(index, (value, label))| PieSlice {
            index,
            sweep: value / total * TAU,
            label,
        })
        .collect()
}

fn draw_pie<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    config: &ChartConfig,
    options: &ChartOptions,
) -> Result<(), Box<dyn Error>>
where
    DB::ErrorType: 'static,
{
    area.fill(&WHITE)?;
    let area = area.titled(&options.title, ("sans-serif", 24))?;

    let (w, h) = area.dim_in_pixel();
    let center = (w as i32 / 2, h as i32 / 2);
    let radius = f64::from(w.min(h)) * 0.4;

    let slices = pie_slices(&config.dataset.data);
    let font_size = options.data_labels.as_ref().map_or(14, |l| l.font_size);

    // Slices run clockwise from twelve o'clock.
    let mut start = -FRAC_PI_2;
    for slice in slices {
        let sweep = slice.sweep;
        let steps = ((sweep / TAU) * 120.0).ceil().max(2.0) as usize;

        let mut outline = vec![center];
        outline.extend(
            (0..=steps).map(|s| on_circle(center, radius, start + sweep * s as f64 / steps as f64)),
        );
        outline.push(center);

        let fill = color(config.dataset.style.color_at(slice.index));
        area.draw(&Polygon::new(outline.clone(), fill.mix(PIE_ALPHA).filled()))?;
        area.draw(&PathElement::new(outline, WHITE.stroke_width(2)))?;

        let label_style = ("sans-serif", font_size)
            .into_font()
            .style(FontStyle::Bold)
            .color(&WHITE)
            .pos(Pos::new(HPos::Center, VPos::Center));
        area.draw(&Text::new(
            slice.label,
            on_circle(center, radius * 0.65, start + sweep / 2.0),
            label_style,
        ))?;

        start += sweep;
    }

    Ok(())
}

/// Size of the image on the page: full page width, aspect ratio kept.
pub fn fit_to_page(width: u32, height: u32) -> (f64, f64) {
    if width == 0 {
        return (PAGE_WIDTH, 0.0);
    }
    (
        PAGE_WIDTH,
        f64::from(height) * PAGE_WIDTH / f64::from(width),
    )
}

/// Minimal PDF object writer that records byte offsets for the xref table.
struct PdfWriter {
    out: Vec<u8>,
    offsets: Vec<usize>,
}

impl PdfWriter {
    fn new() -> Self {
        let mut out = Vec::new();
        out.extend_from_slice(b"%PDF-1.4\n%\xE2\xE3\xCF\xD3\n");
        Self {
            out,
            offsets: Vec::new(),
        }
    }

    fn begin(&mut self) {
        self.offsets.push(self.out.len());
        let id = self.offsets.len();
        self.out.extend_from_slice(format!("{} 0 obj\n", id).as_bytes());
    }

    fn object(&mut self, dict: &str) {
        self.begin();
        self.out.extend_from_slice(dict.as_bytes());
        self.out.extend_from_slice(b"\nendobj\n");
    }

    fn stream(&mut self, dict: &str, data: &[u8]) {
        self.begin();
        self.out.extend_from_slice(dict.as_bytes());
        self.out.extend_from_slice(b"\nstream\n");
        self.out.extend_from_slice(data);
        self.out.extend_from_slice(b"\nendstream\nendobj\n");
    }

    fn finish(mut self) -> Vec<u8> {
        let xref = self.out.len();
        let size = self.offsets.len() + 1;
        self.out
            .extend_from_slice(format!("xref\n0 {}\n0000000000 65535 f \n", size).as_bytes());
        for offset in &self.offsets {
            self.out
                .extend_from_slice(format!("{:010} 00000 n \n", offset).as_bytes());
        }
        self.out.extend_from_slice(
            format!(
                "trailer\n<< /Size {} /Root 1 0 R >>\nstartxref\n{}\n%%EOF\n",
                size, xref
            )
            .as_bytes(),
        );
        self.out
    }
}

/// Build a one-page A4 PDF with the snapshot at the top-left, full width.
pub fn pdf_document(snapshot: &ChartSnapshot) -> Result<Vec<u8>, ExportError> {
    let pixels = image::load_from_memory_with_format(&snapshot.png, ImageFormat::Png)
        .map_err(|e| ExportError::Image(e.to_string()))?
        .to_rgb8();
    let (img_w, img_h) = pixels.dimensions();

    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(pixels.as_raw())?;
    let compressed = encoder.finish()?;

    let (draw_w, draw_h) = fit_to_page(img_w, img_h);
    let content = format!(
        "q {:.2} 0 0 {:.2} 0 {:.2} cm /Im0 Do Q",
        draw_w,
        draw_h,
        PAGE_HEIGHT - draw_h
    );

    let mut pdf = PdfWriter::new();
    pdf.object("<< /Type /Catalog /Pages 2 0 R >>");
    pdf.object("<< /Type /Pages /Kids [3 0 R] /Count 1 >>");
    pdf.object(&format!(
        "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 {} {}] \
         /Resources << /XObject << /Im0 4 0 R >> >> /Contents 5 0 R >>",
        PAGE_WIDTH, PAGE_HEIGHT
    ));
    pdf.stream(
        &format!(
            "<< /Type /XObject /Subtype /Image /Width {} /Height {} /ColorSpace /DeviceRGB \
             /BitsPerComponent 8 /Filter /FlateDecode /Length {} >>",
            img_w,
            img_h,
            compressed.len()
        ),
        &compressed,
    );
    pdf.stream(&format!("<< /Length {} >>", content.len()), content.as_bytes());
    Ok(pdf.finish())
}

/// Save the snapshot as `{type}-chart.png` in `dir`.
///
/// Without a snapshot nothing is written and `Ok(None)` is returned.
pub fn download_png(
    snapshot: Option<&ChartSnapshot>,
    dir: &Path,
) -> Result<Option<PathBuf>, ExportError> {
    let Some(snapshot) = snapshot else {
        warn!("no chart available for PNG export");
        return Ok(None);
    };
    let path = dir.join(export_file_name(snapshot.chart_type, ExportFormat::Png));
    std::fs::write(&path, &snapshot.png)?;
    info!("saved {}", path.display());
    Ok(Some(path))
}

/// Save the snapshot as a PDF named `{type}-chart.pdf` in `dir`.
///
/// Without a snapshot nothing is written and `Ok(None)` is returned.
pub fn download_pdf(
    snapshot: Option<&ChartSnapshot>,
    dir: &Path,
) -> Result<Option<PathBuf>, ExportError> {
    let Some(snapshot) = snapshot else {
        warn!("no chart available for PDF export");
        return Ok(None);
    };
    let path = dir.join(export_file_name(snapshot.chart_type, ExportFormat::Pdf));
    std::fs::write(&path, pdf_document(snapshot)?)?;
    info!("saved {}", path.display());
    Ok(Some(path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::build_chart_config;
    use crate::normalize::{NormalizedSeries, SeriesPoint};
    use crate::options::build_chart_options;
    use serde_json::json;

    fn snapshot(width: u32, height: u32) -> ChartSnapshot {
        let img: ImageBuffer<image::Rgb<u8>, _> =
            ImageBuffer::from_pixel(width, height, image::Rgb([255, 0, 0]));
        let mut png = Vec::new();
        img.write_to(&mut Cursor::new(&mut png), ImageFormat::Png)
            .unwrap();
        ChartSnapshot::from_png(ChartType::Bar, png).unwrap()
    }

    fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
        haystack.windows(needle.len()).position(|w| w == needle)
    }

    #[test]
    fn file_names_follow_chart_type() {
        assert_eq!(export_file_name(ChartType::Bar, ExportFormat::Png), "Bar-chart.png");
        assert_eq!(export_file_name(ChartType::Pie, ExportFormat::Pdf), "Pie-chart.pdf");
    }

    #[test]
    fn snapshot_reads_dimensions() {
        let snap = snapshot(8, 3);
        assert_eq!((snap.width, snap.height), (8, 3));
        assert!(png_data_uri(&snap).starts_with("data:image/png;base64,iVBORw0KGgo"));
    }

    #[test]
    fn image_scaled_to_page_width() {
        let (w, h) = fit_to_page(800, 400);
        assert_eq!(w, PAGE_WIDTH);
        assert!((h - PAGE_WIDTH / 2.0).abs() < 1e-9);
    }

    #[test]
    fn pdf_has_one_page_and_valid_xref() {
        let pdf = pdf_document(&snapshot(4, 2)).unwrap();
        assert!(pdf.starts_with(b"%PDF-1.4"));
        assert!(pdf.ends_with(b"%%EOF\n"));
        assert!(find(&pdf, b"/Count 1").is_some());
        assert!(find(&pdf, b"/Width 4 /Height 2").is_some());
        assert!(find(&pdf, b"q 595.28 0 0 297.64 0 544.25 cm /Im0 Do Q").is_some());

        let xref = find(&pdf, b"xref\n").unwrap();
        let startxref = find(&pdf, b"startxref\n").unwrap();
        let tail = std::str::from_utf8(&pdf[startxref + 10..]).unwrap();
        assert_eq!(tail.lines().next().unwrap(), xref.to_string());

        let table = std::str::from_utf8(&pdf[xref..startxref]).unwrap();
        for (id, line) in table.lines().skip(3).take(5).enumerate() {
            let offset: usize = line[..10].parse().unwrap();
            let header = format!("{} 0 obj", id + 1);
            assert!(pdf[offset..].starts_with(header.as_bytes()));
        }
    }

    #[test]
    fn missing_snapshot_is_a_no_op() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(download_png(None, dir.path()).unwrap(), None);
        assert_eq!(download_pdf(None, dir.path()).unwrap(), None);
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn downloads_write_named_files() {
        let dir = tempfile::tempdir().unwrap();
        let snap = snapshot(4, 4);
        let png = download_png(Some(&snap), dir.path()).unwrap().unwrap();
        assert_eq!(png.file_name().unwrap(), "Bar-chart.png");
        assert_eq!(std::fs::read(&png).unwrap(), snap.png);

        let pdf = download_pdf(Some(&snap), dir.path()).unwrap().unwrap();
        assert!(std::fs::read(pdf).unwrap().starts_with(b"%PDF"));
    }

    #[test]
    fn column3d_has_no_raster_export() {
        let series: NormalizedSeries = vec![SeriesPoint {
            label: json!("Jan"),
            value: 3.0,
        }]
        .into_iter()
        .collect();
        let config = build_chart_config(&series, ChartType::Column3D, "Sales").unwrap();
        let options = build_chart_options("Month", "Sales", ChartType::Column3D);
        assert!(matches!(
            render_chart(&config, &options, ChartType::Column3D, 400, 300),
            Err(ExportError::Unsupported(_))
        ));
    }

    #[test]
    fn pie_labels_match_drawn_slices() {
        let slices = pie_slices(&[3.0, -2.0, 1.0, 0.0]);
        assert_eq!(slices.len(), 2);
        assert_eq!(slices[0].index, 0);
        assert_eq!(slices[1].index, 2);
        assert_eq!(slices[0].label, "75.0%");
        assert_eq!(slices[1].label, "25.0%");
        assert!((slices[0].sweep - TAU * 0.75).abs() < 1e-9);

        assert!(pie_slices(&[-1.0, 0.0]).is_empty());
    }

    #[test]
    fn renders_every_exportable_type() {
        let series: NormalizedSeries = [("Jan", 12.0), ("Feb", 30.0), ("Mar", 18.0)]
            .into_iter()
            .map(|(label, value)| SeriesPoint {
                label: json!(label),
                value,
            })
            .collect();

        for chart_type in [ChartType::Bar, ChartType::Line, ChartType::Pie] {
            let config = build_chart_config(&series, chart_type, "Sales").unwrap();
            let options = build_chart_options("Month", "Sales", chart_type);
            let snap = render_chart(&config, &options, chart_type, 320, 240).unwrap();
            assert_eq!((snap.width, snap.height), (320, 240));
            let decoded = ChartSnapshot::from_png(chart_type, snap.png.clone()).unwrap();
            assert_eq!((decoded.width, decoded.height), (320, 240));
        }
    }

    #[test]
    fn zero_sized_canvas_is_rejected() {
        let series: NormalizedSeries = vec![SeriesPoint {
            label: json!("Jan"),
            value: 3.0,
        }]
        .into_iter()
        .collect();
        let config = build_chart_config(&series, ChartType::Bar, "Sales").unwrap();
        let options = build_chart_options("Month", "Sales", ChartType::Bar);
        assert!(matches!(
            render_chart(&config, &options, ChartType::Bar, 0, 240),
            Err(ExportError::Render(_))
        ));
    }

    #[cfg(target_pointer_width = "64")]
    #[test]
    fn large_canvas_size_does_not_wrap() {
        assert_eq!(rgb_buffer_len(40_000, 40_000), 4_800_000_000);
        assert_eq!(rgb_buffer_len(800, 600), 1_440_000);
    }

    #[test]
    fn bounds_include_zero() {
        assert_eq!(value_bounds(&[10.0, 20.0]), (0.0, 22.0));
        let (low, high) = value_bounds(&[-5.0, 5.0]);
        assert!(low < -5.0 && high > 5.0);
        assert_eq!(value_bounds(&[]), (0.0, 0.1));
    }
}
