use crate::normalize::NormalizedSeries;
use crate::selection::ChartType;
use serde::Serialize;
use serde_json::Value;

/// An opaque RGB colour; alpha is supplied when formatting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    /// CSS `rgba(...)` notation, e.g. `rgba(75, 192, 192, 0.7)`.
    pub fn css(&self, alpha: f64) -> String {
        format!("rgba({}, {}, {}, {})", self.0, self.1, self.2, alpha)
    }

    /// Build from a packed `0xRRGGBB` value.
    pub const fn from_hex(hex: u32) -> Self {
        Rgb((hex >> 16) as u8, (hex >> 8) as u8, hex as u8)
    }
}

pub const BAR_PALETTE: [Rgb; 10] = [
    Rgb(75, 192, 192),
    Rgb(153, 102, 255),
    Rgb(255, 159, 64),
    Rgb(255, 99, 132),
    Rgb(54, 162, 235),
    Rgb(255, 206, 86),
    Rgb(75, 192, 192),
    Rgb(199, 199, 199),
    Rgb(83, 102, 255),
    Rgb(10, 200, 100),
];
pub const BAR_ALPHA: f64 = 0.7;

pub const PIE_PALETTE: [Rgb; 10] = [
    Rgb(255, 99, 132),
    Rgb(54, 162, 235),
    Rgb(255, 206, 86),
    Rgb(75, 192, 192),
    Rgb(153, 102, 255),
    Rgb(255, 159, 64),
    Rgb(201, 203, 207),
    Rgb(100, 150, 200),
    Rgb(200, 100, 150),
    Rgb(150, 200, 100),
];
pub const PIE_ALPHA: f64 = 0.8;

/// Accent colour of line charts
pub const LINE_ACCENT: Rgb = Rgb(54, 162, 235);

/// Fill used by chart types without a dedicated scheme
pub const FALLBACK_FILL: Rgb = Rgb(75, 192, 192);

const WHITE: &str = "#fff";

/// Chart-type specific styling of a dataset.
///
/// Per-point colours are already expanded to the length of the data, reusing
/// the palette cyclically.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum DatasetStyle {
    #[serde(rename_all = "camelCase")]
    Bar {
        background_colors: Vec<String>,
        border_colors: Vec<String>,
        border_width: u32,
    },
    #[serde(rename_all = "camelCase")]
    Line {
        fill: bool,
        tension: f64,
        background_color: String,
        border_color: String,
        point_background_color: String,
        point_border_color: String,
        point_hover_background_color: String,
        point_hover_border_color: String,
        border_width: u32,
    },
    #[serde(rename_all = "camelCase")]
    Pie {
        background_colors: Vec<String>,
        border_color: String,
        border_width: u32,
    },
    #[serde(rename_all = "camelCase")]
    Solid {
        background_color: String,
        border_color: String,
        border_width: u32,
    },
}

impl DatasetStyle {
    /// Styling for `len` points of a `chart_type` chart.
    pub fn for_chart(chart_type: ChartType, len: usize) -> Self {
        match chart_type {
            ChartType::Bar => DatasetStyle::Bar {
                background_colors: cycle(&BAR_PALETTE, len, BAR_ALPHA),
                border_colors: cycle(&BAR_PALETTE, len, 1.0),
                border_width: 1,
            },
            ChartType::Line => DatasetStyle::Line {
                fill: false,
                tension: 0.4,
                background_color: LINE_ACCENT.css(0.2),
                border_color: LINE_ACCENT.css(1.0),
                point_background_color: LINE_ACCENT.css(1.0),
                point_border_color: WHITE.to_string(),
                point_hover_background_color: WHITE.to_string(),
                point_hover_border_color: LINE_ACCENT.css(1.0),
                border_width: 2,
            },
            ChartType::Pie => DatasetStyle::Pie {
                background_colors: cycle(&PIE_PALETTE, len, PIE_ALPHA),
                border_color: WHITE.to_string(),
                border_width: 2,
            },
            ChartType::Column3D => DatasetStyle::Solid {
                background_color: FALLBACK_FILL.css(0.6),
                border_color: FALLBACK_FILL.css(1.0),
                border_width: 1,
            },
        }
    }

    /// Fill colour of the point at `index`, used by the raster renderer.
    pub fn color_at(&self, index: usize) -> Rgb {
        match self {
            DatasetStyle::Bar { .. } => BAR_PALETTE[index % BAR_PALETTE.len()],
            DatasetStyle::Pie { .. } => PIE_PALETTE[index % PIE_PALETTE.len()],
            DatasetStyle::Line { .. } => LINE_ACCENT,
            DatasetStyle::Solid { .. } => FALLBACK_FILL,
        }
    }
}

fn cycle(palette: &[Rgb], len: usize, alpha: f64) -> Vec<String> {
    palette.iter().cycle().take(len).map(|c| c.css(alpha)).collect()
}

/// The single dataset of a chart
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dataset {
    /// Legend label, the Y column name
    pub label: String,
    pub data: Vec<f64>,
    #[serde(flatten)]
    pub style: DatasetStyle,
}

/// Render-ready structure handed to a charting component
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartConfig {
    pub labels: Vec<Value>,
    pub dataset: Dataset,
}

impl ChartConfig {
    pub fn len(&self) -> usize {
        self.dataset.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dataset.data.is_empty()
    }
}

/// Build the chart config for `series`.
///
/// Returns `None` for an empty series: there is nothing to render, which is
/// not an error.
pub fn build_chart_config(
    series: &NormalizedSeries,
    chart_type: ChartType,
    y_label: &str,
) -> Option<ChartConfig> {
    if series.is_empty() {
        return None;
    }

    Some(ChartConfig {
        labels: series.labels(),
        dataset: Dataset {
            label: y_label.to_string(),
            data: series.values(),
            style: DatasetStyle::for_chart(chart_type, series.len()),
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::SeriesPoint;
    use serde_json::json;

    fn series(values: &[f64]) -> NormalizedSeries {
        values
            .iter()
            .enumerate()
            .map(|(i, v)| SeriesPoint {
                label: json!(format!("r{}", i)),
                value: *v,
            })
            .collect()
    }

    #[test]
    fn empty_series_has_no_config() {
        assert!(build_chart_config(&NormalizedSeries::default(), ChartType::Bar, "Sales").is_none());
    }

    #[test]
    fn dataset_length_matches_series() {
        let s = series(&[1.0, 2.0, 3.0]);
        for chart_type in ChartType::ALL {
            let config = build_chart_config(&s, chart_type, "Sales").unwrap();
            assert_eq!(config.len(), s.len());
            assert_eq!(config.labels.len(), s.len());
            assert_eq!(config.dataset.label, "Sales");
        }
    }

    #[test]
    fn changing_chart_type_only_changes_style() {
        let s = series(&[4.0, 5.0]);
        let bar = build_chart_config(&s, ChartType::Bar, "Sales").unwrap();
        let pie = build_chart_config(&s, ChartType::Pie, "Sales").unwrap();
        assert_eq!(bar.labels, pie.labels);
        assert_eq!(bar.dataset.data, pie.dataset.data);
        assert_ne!(bar.dataset.style, pie.dataset.style);
    }

    #[test]
    fn bar_palette_cycles_by_position() {
        let s = series(&[1.0; 12]);
        let config = build_chart_config(&s, ChartType::Bar, "v").unwrap();
        match &config.dataset.style {
            DatasetStyle::Bar {
                background_colors,
                border_colors,
                border_width,
            } => {
                assert_eq!(background_colors.len(), 12);
                assert_eq!(background_colors[0], "rgba(75, 192, 192, 0.7)");
                assert_eq!(background_colors[10], background_colors[0]);
                assert_eq!(border_colors[1], "rgba(153, 102, 255, 1)");
                assert_eq!(*border_width, 1);
            }
            other => panic!("unexpected style {:?}", other),
        }
        assert_eq!(config.dataset.style.color_at(11), BAR_PALETTE[1]);
    }

    #[test]
    fn line_uses_single_accent() {
        let style = DatasetStyle::for_chart(ChartType::Line, 3);
        match style {
            DatasetStyle::Line {
                fill,
                border_color,
                background_color,
                ..
            } => {
                assert!(!fill);
                assert_eq!(border_color, "rgba(54, 162, 235, 1)");
                assert_eq!(background_color, "rgba(54, 162, 235, 0.2)");
            }
            other => panic!("unexpected style {:?}", other),
        }
    }

    #[test]
    fn serializes_like_a_chart_dataset() {
        let config = build_chart_config(&series(&[1.0]), ChartType::Pie, "Share").unwrap();
        let json = serde_json::to_value(&config).unwrap();
        assert_eq!(json["dataset"]["kind"], "pie");
        assert_eq!(json["dataset"]["borderColor"], "#fff");
        assert_eq!(json["dataset"]["data"], json!([1.0]));
    }

    #[test]
    fn hex_colours() {
        assert_eq!(Rgb::from_hex(0x36A2EB), Rgb(54, 162, 235));
    }
}
