//! Layout of the 3D column view.
//!
//! The scene itself is drawn by the presentation layer; this module decides
//! which bars exist, where they sit and how tall they are.

use crate::dataset::Rgb;
use crate::normalize::NormalizedSeries;
use serde::Serialize;
use serde_json::Value;

/// Height of the tallest bar in scene units
pub const VISUAL_MAX_HEIGHT: f64 = 5.0;
/// Extra vertical scale applied to a hovered bar
pub const HOVER_SCALE: f64 = 1.1;
pub const BAR_SPACING: f64 = 2.0;
pub const BAR_WIDTH: f64 = 1.5;
const TICK_COUNT: usize = 5;

pub const COLUMN_PALETTE: [Rgb; 7] = [
    Rgb::from_hex(0xFF9984),
    Rgb::from_hex(0x36A2EB),
    Rgb::from_hex(0xFFCE56),
    Rgb::from_hex(0x4BC0C0),
    Rgb::from_hex(0x9966FF),
    Rgb::from_hex(0xFF9F40),
    Rgb::from_hex(0xC9CBCF),
];

/// A (label, value) record of the 3D view
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnRecord {
    pub label: Value,
    pub value: f64,
}

/// One drawable column
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnBar {
    /// Position of the record in the series, also drives the colour
    pub index: usize,
    pub label: Value,
    pub value: f64,
    /// Horizontal centre of the column
    pub x: f64,
    pub height: f64,
    pub color: Rgb,
}

impl ColumnBar {
    pub fn display_height(&self, hovered: bool) -> f64 {
        if hovered {
            self.height * HOVER_SCALE
        } else {
            self.height
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AxisTick {
    pub value: f64,
    pub y: f64,
}

/// Everything needed to draw the 3D column chart
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ColumnScene {
    pub bars: Vec<ColumnBar>,
    pub y_ticks: Vec<AxisTick>,
    pub camera: [f64; 3],
    pub grid_size: f64,
    pub x_axis_label: String,
    pub y_axis_label: String,
}

/// Map a normalized series to the records of the 3D view.
pub fn column_records(series: &NormalizedSeries) -> Vec<ColumnRecord> {
    series
        .points()
        .iter()
        .map(|p| ColumnRecord {
            label: p.label.clone(),
            value: p.value,
        })
        .collect()
}

/// Lay out the 3D column scene for `records`.
///
/// Heights are `value / max * VISUAL_MAX_HEIGHT`, with a divisor of 1 when
/// the maximum is not positive. Records with a value `<= 0` (or a non-finite
/// one) get no column, but the remaining columns keep their slot so gaps stay
/// visible. An empty input yields an empty scene.
pub fn build_scene(records: &[ColumnRecord], x_label: &str, y_label: &str) -> ColumnScene {
    if records.is_empty() {
        return ColumnScene::default();
    }

    let max_value = records.iter().map(|r| r.value).fold(f64::MIN, f64::max);
    let divisor = if max_value > 0.0 { max_value } else { 1.0 };
    let x_offset = (records.len() as f64 - 1.0) * BAR_SPACING / 2.0;

    let bars = records
        .iter()
        .enumerate()
        .filter(|(_, r)| r.value.is_finite() && r.value > 0.0)
        .map(|(index, r)| ColumnBar {
            index,
            label: r.label.clone(),
            value: r.value,
            x: index as f64 * BAR_SPACING - x_offset,
            height: r.value / divisor * VISUAL_MAX_HEIGHT,
            color: COLUMN_PALETTE[index % COLUMN_PALETTE.len()],
        })
        .collect();

    let y_ticks = (0..TICK_COUNT)
        .map(|i| {
            let value = i as f64 / (TICK_COUNT - 1) as f64 * max_value;
            AxisTick {
                value,
                y: value / divisor * VISUAL_MAX_HEIGHT - 0.1,
            }
        })
        .collect();

    let scene_width = records.len() as f64 * BAR_SPACING;
    ColumnScene {
        bars,
        y_ticks,
        camera: [
            0.0,
            (VISUAL_MAX_HEIGHT * 0.5 + 1.0).max(5.0),
            (scene_width * 0.8).max(10.0),
        ],
        grid_size: (scene_width + 5.0).max(20.0),
        x_axis_label: x_label.to_string(),
        y_axis_label: y_label.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn records(values: &[f64]) -> Vec<ColumnRecord> {
        values
            .iter()
            .enumerate()
            .map(|(i, v)| ColumnRecord {
                label: json!(i),
                value: *v,
            })
            .collect()
    }

    #[test]
    fn heights_scale_to_visual_max() {
        let scene = build_scene(&records(&[10.0, 5.0, 2.5]), "x", "y");
        let heights: Vec<f64> = scene.bars.iter().map(|b| b.height).collect();
        assert_eq!(heights, vec![5.0, 2.5, 1.25]);
        assert!((scene.bars[0].display_height(true) - 5.5).abs() < 1e-9);
        assert_eq!(scene.bars[1].display_height(false), 2.5);
    }

    #[test]
    fn non_positive_values_are_omitted() {
        let scene = build_scene(&records(&[3.0, 0.0, -2.0, 6.0]), "x", "y");
        let indices: Vec<usize> = scene.bars.iter().map(|b| b.index).collect();
        assert_eq!(indices, vec![0, 3]);
        // slots are kept: four records centred around zero
        assert_eq!(scene.bars[0].x, -3.0);
        assert_eq!(scene.bars[1].x, 3.0);
        assert_eq!(scene.bars[1].color, COLUMN_PALETTE[3]);
    }

    #[test]
    fn all_negative_uses_unit_divisor() {
        let scene = build_scene(&records(&[-1.0, -4.0]), "x", "y");
        assert!(scene.bars.is_empty());
        assert_eq!(scene.y_ticks.len(), 5);
        assert!(scene.y_ticks.iter().all(|t| t.y.is_finite()));
    }

    #[test]
    fn ticks_and_camera() {
        let scene = build_scene(&records(&[8.0]), "Month", "Sales");
        let values: Vec<f64> = scene.y_ticks.iter().map(|t| t.value).collect();
        assert_eq!(values, vec![0.0, 2.0, 4.0, 6.0, 8.0]);
        assert_eq!(scene.camera, [0.0, 5.0, 10.0]);
        assert_eq!(scene.grid_size, 20.0);
        assert_eq!(scene.y_axis_label, "Sales");

        let wide = build_scene(&records(&[1.0; 10]), "x", "y");
        assert_eq!(wide.camera[2], 16.0);
        assert_eq!(wide.grid_size, 25.0);
    }

    #[test]
    fn empty_records_give_empty_scene() {
        assert_eq!(build_scene(&[], "x", "y"), ColumnScene::default());
    }
}
