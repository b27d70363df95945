//! The chart derivation pipeline.
//!
//! `sheet + selection -> normalized series -> chart config + options + 3D
//! scene`, recomputed from scratch on every change.

use crate::column3d::{ColumnScene, build_scene, column_records};
use crate::dataset::{ChartConfig, build_chart_config};
use crate::normalize::{NormalizedSeries, normalize_series};
use crate::options::{ChartOptions, build_chart_options};
use crate::selection::{AxisSelection, ChartType, SelectionState};
use crate::sheet::Sheet;
use log::debug;

pub const NO_CHART_MESSAGE: &str =
    "Select axes and chart type to generate a chart or No valid data for chart.";

/// Everything the chart area renders for one selection
#[derive(Debug, Clone, PartialEq)]
pub struct DerivedChart {
    pub state: SelectionState,
    pub series: NormalizedSeries,
    /// `None` unless the selection is ready
    pub config: Option<ChartConfig>,
    pub options: ChartOptions,
    /// Empty unless the selection is ready
    pub scene: ColumnScene,
}

impl DerivedChart {
    /// Nothing to show for `selection`.
    pub fn empty(selection: &AxisSelection) -> Self {
        Self {
            state: selection.state(0),
            series: NormalizedSeries::default(),
            config: None,
            options: build_chart_options(&selection.x_axis, &selection.y_axis, selection.chart_type),
            scene: ColumnScene::default(),
        }
    }

    pub fn is_ready(&self) -> bool {
        self.state == SelectionState::Ready
    }

    /// Message for the chart area when there is nothing to draw.
    pub fn placeholder(&self) -> Option<&'static str> {
        match self.state {
            SelectionState::Ready => None,
            SelectionState::Empty | SelectionState::PartiallySelected => Some(NO_CHART_MESSAGE),
        }
    }
}

/// Derive the chart for `selection` over `sheet`.
///
/// An unknown sheet, a missing or invalid axis, or a series with no numeric
/// rows all yield a chart with no config and an empty scene.
pub fn derive_chart(sheet: Option<Sheet<'_>>, selection: &AxisSelection) -> DerivedChart {
    let Some(sheet) = sheet.filter(|s| selection.is_valid_for(s)) else {
        return DerivedChart::empty(selection);
    };

    let series = normalize_series(sheet.rows, &selection.x_axis, &selection.y_axis);
    debug!(
        "derived {} of {} rows for {} by {} on sheet {}",
        series.len(),
        sheet.rows.len(),
        selection.y_axis,
        selection.x_axis,
        sheet.name
    );

    let state = selection.state(series.len());
    let config = build_chart_config(&series, selection.chart_type, &selection.y_axis);
    let scene = if config.is_some() {
        build_scene(&column_records(&series), &selection.x_axis, &selection.y_axis)
    } else {
        ColumnScene::default()
    };

    DerivedChart {
        state,
        series,
        config,
        options: build_chart_options(&selection.x_axis, &selection.y_axis, selection.chart_type),
        scene,
    }
}

/// Whether `chart_type` draws from the 2D config or the 3D scene.
pub fn uses_scene(chart_type: ChartType) -> bool {
    chart_type == ChartType::Column3D
}
