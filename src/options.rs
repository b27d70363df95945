use crate::selection::ChartType;
use serde::Serialize;

/// Display options of a 2D chart
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartOptions {
    pub responsive: bool,
    pub maintain_aspect_ratio: bool,
    pub animation: Animation,
    pub legend_position: &'static str,
    pub title: String,
    /// `None` for pie charts, which have no axes at all
    pub scales: Option<Scales>,
    /// Percentage labels drawn on pie slices
    pub data_labels: Option<PieLabels>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Animation {
    pub duration_ms: u32,
    pub easing: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Scales {
    pub x: AxisScale,
    pub y: AxisScale,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AxisScale {
    pub display: bool,
    pub begin_at_zero: bool,
    pub auto_skip: bool,
    pub min_rotation: u32,
    pub max_rotation: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PieLabels {
    pub color: &'static str,
    pub font_size: u32,
    pub bold: bool,
    pub shadow_blur: u32,
    pub shadow_color: &'static str,
}

impl ChartOptions {
    pub fn shows_scales(&self) -> bool {
        self.scales.as_ref().is_some_and(|s| s.x.display && s.y.display)
    }
}

/// Title shown above a chart: `"{y} by {x}"`.
pub fn chart_title(x_label: &str, y_label: &str) -> String {
    let x = if x_label.is_empty() { "X-Axis" } else { x_label };
    let y = if y_label.is_empty() { "Y-Axis" } else { y_label };
    format!("{} by {}", y, x)
}

/// Derive the display options for the current axis labels and chart type.
pub fn build_chart_options(x_label: &str, y_label: &str, chart_type: ChartType) -> ChartOptions {
    let is_pie = chart_type == ChartType::Pie;

    let scales = (!is_pie).then(|| Scales {
        x: AxisScale {
            display: true,
            begin_at_zero: false,
            auto_skip: true,
            min_rotation: 0,
            max_rotation: 45,
        },
        y: AxisScale {
            display: true,
            begin_at_zero: true,
            auto_skip: false,
            min_rotation: 0,
            max_rotation: 0,
        },
    });

    let data_labels = is_pie.then_some(PieLabels {
        color: "#fff",
        font_size: 14,
        bold: true,
        shadow_blur: 2,
        shadow_color: "rgba(0,0,0,0.6)",
    });

    ChartOptions {
        responsive: true,
        maintain_aspect_ratio: false,
        animation: Animation {
            duration_ms: 750,
            easing: "easeOutQuart",
        },
        legend_position: "top",
        title: chart_title(x_label, y_label),
        scales,
        data_labels,
    }
}

/// Percentage label of one pie slice.
///
/// `value / sum(values) * 100` with one decimal. A zero total gives `"0%"`
/// instead of dividing by zero.
pub fn pie_percentage_label(value: f64, values: &[f64]) -> String {
    let total: f64 = values.iter().sum();
    if total == 0.0 {
        return "0%".to_string();
    }
    format!("{:.1}%", value / total * 100.0)
}

/// Percentage labels for every slice of `values`, in order.
pub fn pie_percentage_labels(values: &[f64]) -> Vec<String> {
    values
        .iter()
        .map(|v| pie_percentage_label(*v, values))
        .collect()
}
