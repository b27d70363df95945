use crate::access::Route;
use crate::backend::{Backend, UploadFile};
use crate::session::AppContext;
use log::{error, info};
use std::path::Path;

pub const ACCEPTED_EXTENSIONS: [&str; 2] = ["xls", "xlsx"];

/// Whether `file_name` looks like an Excel workbook
pub fn is_spreadsheet(file_name: &str) -> bool {
    Path::new(file_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| {
            ACCEPTED_EXTENSIONS
                .iter()
                .any(|accepted| ext.eq_ignore_ascii_case(accepted))
        })
}

/// State of the upload form
#[derive(Debug, Default)]
pub struct UploadForm {
    selected: Option<UploadFile>,
    pub message: String,
    pub loading: bool,
}

impl UploadForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn selected(&self) -> Option<&UploadFile> {
        self.selected.as_ref()
    }

    /// Pick a file. Clears any previous message.
    pub fn select(&mut self, file: UploadFile) {
        self.selected = Some(file);
        self.message.clear();
    }

    /// Pick a file from disk.
    pub fn select_path(&mut self, path: &Path) -> std::io::Result<()> {
        let bytes = std::fs::read(path)?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        self.select(UploadFile { file_name, bytes });
        Ok(())
    }

    /// Send the selected file to the backend.
    ///
    /// Returns the dashboard route when the upload succeeded; otherwise
    /// `message` explains what went wrong.
    pub async fn submit<B: Backend>(&mut self, ctx: &AppContext, backend: &B) -> Option<Route> {
        let Some(file) = self.selected.as_ref() else {
            self.message = "Please select an Excel file to upload.".to_string();
            return None;
        };
        if !is_spreadsheet(&file.file_name) {
            self.message = "Only .xls and .xlsx files can be uploaded.".to_string();
            return None;
        }
        let Some(token) = ctx.token() else {
            self.message = "User not authenticated. Please log in.".to_string();
            return None;
        };

        self.loading = true;
        let result = backend.upload(token, file).await;
        self.loading = false;

        match result {
            Ok(()) => {
                info!("uploaded {}", file.file_name);
                self.message = "File uploaded and parsed successfully!".to_string();
                Some(Route::Dashboard)
            }
            Err(e) => {
                error!("upload of {} failed: {}", file.file_name, e);
                self.message = e
                    .backend_message()
                    .unwrap_or("Error uploading file.")
                    .to_string();
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_excel_extensions_only() {
        assert!(is_spreadsheet("report.xlsx"));
        assert!(is_spreadsheet("OLD.XLS"));
        assert!(!is_spreadsheet("data.csv"));
        assert!(!is_spreadsheet("xlsx"));
        assert!(!is_spreadsheet(""));
    }

    #[test]
    fn selecting_clears_message() {
        let mut form = UploadForm::new();
        form.message = "Please select an Excel file to upload.".into();
        form.select(UploadFile {
            file_name: "a.xlsx".into(),
            bytes: vec![1, 2, 3],
        });
        assert!(form.message.is_empty());
        assert_eq!(form.selected().unwrap().bytes.len(), 3);
    }

    #[test]
    fn select_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("budget.xlsx");
        std::fs::write(&path, b"PK").unwrap();
        let mut form = UploadForm::new();
        form.select_path(&path).unwrap();
        assert_eq!(form.selected().unwrap().file_name, "budget.xlsx");
    }
}
