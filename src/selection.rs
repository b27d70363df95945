use crate::error::UnknownChartType;
use crate::sheet::Sheet;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Chart types offered by the chart configuration form
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ChartType {
    /// Vertical bars, one colour per category
    #[default]
    Bar,

    /// A single accent-coloured line through all points
    Line,

    /// Slices with percentage labels
    Pie,

    /// Interactive 3D columns
    #[serde(rename = "3DColumn")]
    Column3D,
}

impl ChartType {
    pub const ALL: [ChartType; 4] = [
        ChartType::Bar,
        ChartType::Line,
        ChartType::Pie,
        ChartType::Column3D,
    ];

    /// The name used on the wire and in export file names.
    pub fn as_str(&self) -> &'static str {
        match self {
            ChartType::Bar => "Bar",
            ChartType::Line => "Line",
            ChartType::Pie => "Pie",
            ChartType::Column3D => "3DColumn",
        }
    }

    /// Whether the chart is drawn on a 2D canvas that can be snapshotted.
    pub fn is_exportable(&self) -> bool {
        !matches!(self, ChartType::Column3D)
    }
}

impl fmt::Display for ChartType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ChartType {
    type Err = UnknownChartType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ChartType::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(s.trim()))
            .or_else(|| {
                s.trim()
                    .eq_ignore_ascii_case("column3d")
                    .then_some(ChartType::Column3D)
            })
            .ok_or_else(|| UnknownChartType(s.to_string()))
    }
}

/// The user's current choice of sheet, X column, Y column and chart type.
///
/// An empty string means "nothing chosen yet".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AxisSelection {
    pub sheet: String,
    pub x_axis: String,
    pub y_axis: String,
    pub chart_type: ChartType,
}

/// Progress of an [`AxisSelection`] towards a renderable chart
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionState {
    /// Nothing has been chosen, or every input is chosen but the columns
    /// produce no numeric data
    Empty,

    /// Some but not all inputs are chosen
    PartiallySelected,

    /// Every input is chosen and the derived series is non-empty
    Ready,
}

impl AxisSelection {
    pub fn new(sheet: &str, x_axis: &str, y_axis: &str, chart_type: ChartType) -> Self {
        Self {
            sheet: sheet.to_string(),
            x_axis: x_axis.to_string(),
            y_axis: y_axis.to_string(),
            chart_type,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.sheet.is_empty() && self.x_axis.is_empty() && self.y_axis.is_empty()
    }

    /// Sheet and both axes are chosen. The chart type always has a value.
    pub fn is_complete(&self) -> bool {
        !self.sheet.is_empty() && !self.x_axis.is_empty() && !self.y_axis.is_empty()
    }

    /// Both chosen columns exist in `sheet`.
    pub fn is_valid_for(&self, sheet: &Sheet<'_>) -> bool {
        self.is_complete()
            && sheet.name == self.sheet
            && sheet.has_column(&self.x_axis)
            && sheet.has_column(&self.y_axis)
    }

    /// Switch to another sheet, keeping only the axes that also exist there.
    pub fn switch_sheet(&mut self, sheet: &Sheet<'_>) {
        self.sheet = sheet.name.to_string();
        if !sheet.has_column(&self.x_axis) {
            self.x_axis.clear();
        }
        if !sheet.has_column(&self.y_axis) {
            self.y_axis.clear();
        }
    }

    /// Select `sheet` and forget both axes.
    pub fn reset_to(&mut self, sheet: &str) {
        self.sheet = sheet.to_string();
        self.x_axis.clear();
        self.y_axis.clear();
    }

    /// State of this selection given the length of the series it produced.
    pub fn state(&self, series_len: usize) -> SelectionState {
        match (self.is_complete(), series_len) {
            (true, 0) => SelectionState::Empty,
            (true, _) => SelectionState::Ready,
            (false, _) if self.is_empty() => SelectionState::Empty,
            (false, _) => SelectionState::PartiallySelected,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chart_type_names() {
        assert_eq!("bar".parse::<ChartType>().unwrap(), ChartType::Bar);
        assert_eq!("3DColumn".parse::<ChartType>().unwrap(), ChartType::Column3D);
        assert_eq!("column3d".parse::<ChartType>().unwrap(), ChartType::Column3D);
        assert_eq!(
            "Scatter".parse::<ChartType>(),
            Err(UnknownChartType("Scatter".into()))
        );
        assert_eq!(
            serde_json::to_string(&ChartType::Column3D).unwrap(),
            "\"3DColumn\""
        );
        assert!(!ChartType::Column3D.is_exportable());
    }

    #[test]
    fn selection_states() {
        let mut selection = AxisSelection::default();
        assert_eq!(selection.state(0), SelectionState::Empty);

        selection.sheet = "Q1".into();
        assert_eq!(selection.state(0), SelectionState::PartiallySelected);

        selection.x_axis = "Month".into();
        selection.y_axis = "Sales".into();
        assert_eq!(selection.state(3), SelectionState::Ready);
        assert_eq!(selection.state(0), SelectionState::Empty);
    }

    #[test]
    fn switching_sheet_drops_unknown_axes() {
        let columns = vec!["Month".to_string(), "Units".to_string()];
        let sheet = Sheet {
            name: "Q2",
            columns: &columns,
            rows: &[],
        };
        let mut selection = AxisSelection::new("Q1", "Month", "Sales", ChartType::Line);
        selection.switch_sheet(&sheet);
        assert_eq!(selection.sheet, "Q2");
        assert_eq!(selection.x_axis, "Month");
        assert!(selection.y_axis.is_empty());
        assert_eq!(selection.chart_type, ChartType::Line);
    }
}
