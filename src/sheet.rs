use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// One parsed spreadsheet row: column header to raw cell value.
pub type Row = serde_json::Map<String, Value>;

/// Parsed contents of an uploaded file, as returned by the backend's
/// file data endpoint.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileData {
    /// Name of the file as it was uploaded
    pub original_file_name: String,

    /// Sheet names in workbook order
    #[serde(default)]
    pub sheet_names: Vec<String>,

    /// Column headers per sheet, in column order
    #[serde(default)]
    pub column_headers: HashMap<String, Vec<String>>,

    /// Row data per sheet
    #[serde(default)]
    pub parsed_data: HashMap<String, Vec<Row>>,
}

/// A borrowed view of one sheet inside a [`FileData`].
#[derive(Debug, Clone, Copy)]
pub struct Sheet<'a> {
    pub name: &'a str,
    pub columns: &'a [String],
    pub rows: &'a [Row],
}

impl<'a> Sheet<'a> {
    pub fn has_column(&self, column: &str) -> bool {
        self.columns.iter().any(|c| c == column)
    }
}

impl FileData {
    /// Look up a sheet by name.
    ///
    /// A sheet listed in `sheet_names` but missing from the header or row
    /// maps is returned with empty columns or rows.
    pub fn sheet(&self, name: &str) -> Option<Sheet<'_>> {
        let name = self.sheet_names.iter().find(|s| *s == name)?;
        Some(Sheet {
            name,
            columns: self
                .column_headers
                .get(name)
                .map(Vec::as_slice)
                .unwrap_or(&[]),
            rows: self.parsed_data.get(name).map(Vec::as_slice).unwrap_or(&[]),
        })
    }

    pub fn first_sheet(&self) -> Option<&str> {
        self.sheet_names.first().map(String::as_str)
    }

    pub fn has_sheet(&self, name: &str) -> bool {
        self.sheet_names.iter().any(|s| s == name)
    }
}

/// One entry of the upload history list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileSummary {
    #[serde(rename = "_id")]
    pub id: String,
    pub original_file_name: String,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub sheet_names: Vec<String>,
}

impl FileSummary {
    /// "report.xlsx (Uploaded on: 2024-03-01)"
    pub fn caption(&self) -> String {
        format!(
            "{} (Uploaded on: {})",
            self.original_file_name,
            self.created_at.format("%Y-%m-%d")
        )
    }
}

/// Render a raw cell value the way it is shown as a chart label.
///
/// Strings are shown verbatim, integral numbers without a fractional part
/// and a missing value as an empty string.
pub fn display_value(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Number(n) => match n.as_f64() {
            Some(f) if f.fract() == 0.0 && f.abs() < 1e15 => format!("{}", f as i64),
            _ => n.to_string(),
        },
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> FileData {
        serde_json::from_value(json!({
            "originalFileName": "sales.xlsx",
            "sheetNames": ["Q1", "Q2"],
            "columnHeaders": { "Q1": ["Month", "Sales"] },
            "parsedData": { "Q1": [{ "Month": "Jan", "Sales": 10 }] }
        }))
        .unwrap()
    }

    #[test]
    fn sheet_lookup_tolerates_missing_maps() {
        let file = sample();
        let q1 = file.sheet("Q1").unwrap();
        assert_eq!(q1.rows.len(), 1);
        assert!(q1.has_column("Sales"));

        let q2 = file.sheet("Q2").unwrap();
        assert!(q2.columns.is_empty());
        assert!(q2.rows.is_empty());

        assert!(file.sheet("Q3").is_none());
        assert_eq!(file.first_sheet(), Some("Q1"));
    }

    #[test]
    fn display_values() {
        assert_eq!(display_value(&json!("Jan")), "Jan");
        assert_eq!(display_value(&json!(2024)), "2024");
        assert_eq!(display_value(&json!(2024.0)), "2024");
        assert_eq!(display_value(&json!(1.5)), "1.5");
        assert_eq!(display_value(&Value::Null), "");
        assert_eq!(display_value(&json!(true)), "true");
    }

    #[test]
    fn history_entry_wire_format() {
        let entry: FileSummary = serde_json::from_value(json!({
            "_id": "f1",
            "originalFileName": "sales.xlsx",
            "createdAt": "2024-03-01T10:00:00Z",
            "sheetNames": ["Q1"]
        }))
        .unwrap();
        assert_eq!(entry.id, "f1");
        assert_eq!(entry.caption(), "sales.xlsx (Uploaded on: 2024-03-01)");
    }
}
