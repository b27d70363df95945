use crate::backend::Backend;
use crate::session::AppContext;
use crate::sheet::FileSummary;
use log::{error, info};
use std::collections::HashSet;

/// Something the user asked to delete from the history list
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeleteTarget {
    File {
        file_id: String,
        file_name: String,
    },
    Sheet {
        file_id: String,
        file_name: String,
        sheet: String,
    },
}

impl DeleteTarget {
    /// Question shown in the confirmation dialog
    pub fn prompt(&self) -> String {
        match self {
            DeleteTarget::File { file_name, .. } => {
                format!("Are you sure you want to delete the entire file \"{}\"?", file_name)
            }
            DeleteTarget::Sheet { sheet, .. } => {
                format!("Are you sure you want to delete the sheet \"{}\"?", sheet)
            }
        }
    }
}

/// The upload history screen
#[derive(Debug, Default)]
pub struct HistoryView {
    entries: Vec<FileSummary>,
    expanded: HashSet<String>,
    pending: Option<DeleteTarget>,
    pub error: Option<String>,
    pub loading: bool,
}

impl HistoryView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> &[FileSummary] {
        &self.entries
    }

    pub fn entry(&self, file_id: &str) -> Option<&FileSummary> {
        self.entries.iter().find(|f| f.id == file_id)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Reload the whole list from the backend.
    pub async fn refresh<B: Backend>(&mut self, ctx: &AppContext, backend: &B) {
        let Some(token) = ctx.token() else {
            self.entries.clear();
            self.error = Some("User not authenticated. Please log in.".to_string());
            return;
        };

        self.loading = true;
        let result = backend.upload_history(token).await;
        self.loading = false;

        match result {
            Ok(entries) => {
                self.expanded.retain(|id| entries.iter().any(|f| &f.id == id));
                self.entries = entries;
                self.error = None;
            }
            Err(e) => {
                error!("fetching upload history failed: {}", e);
                self.error = Some("Failed to fetch upload history. Please try again.".to_string());
            }
        }
    }

    pub fn toggle_expanded(&mut self, file_id: &str) {
        if !self.expanded.remove(file_id) {
            self.expanded.insert(file_id.to_string());
        }
    }

    pub fn is_expanded(&self, file_id: &str) -> bool {
        self.expanded.contains(file_id)
    }

    /// Ask for confirmation before deleting `target`.
    ///
    /// Deleting the only sheet of a file is turned into deleting the file.
    pub fn request_delete(&mut self, target: DeleteTarget) -> &DeleteTarget {
        let target = match target {
            DeleteTarget::Sheet {
                file_id,
                file_name,
                sheet,
            } => match self.entry(&file_id) {
                Some(file) if file.sheet_names.len() <= 1 => DeleteTarget::File {
                    file_id,
                    file_name: file.original_file_name.clone(),
                },
                _ => DeleteTarget::Sheet {
                    file_id,
                    file_name,
                    sheet,
                },
            },
            file => file,
        };
        self.pending.insert(target)
    }

    pub fn pending(&self) -> Option<&DeleteTarget> {
        self.pending.as_ref()
    }

    pub fn cancel(&mut self) {
        self.pending = None;
    }

    /// Carry out the pending deletion, then reload the list.
    ///
    /// Returns `true` when the backend accepted the deletion.
    pub async fn confirm<B: Backend>(&mut self, ctx: &AppContext, backend: &B) -> bool {
        let Some(target) = self.pending.take() else {
            return false;
        };

        let what = match target {
            DeleteTarget::File { .. } => "file",
            DeleteTarget::Sheet { .. } => "sheet",
        };
        let Some(token) = ctx.token() else {
            self.error = Some(format!("Authentication required to delete {}.", what));
            return false;
        };

        let result = match &target {
            DeleteTarget::File { file_id, .. } => backend.delete_file(token, file_id).await,
            DeleteTarget::Sheet { file_id, sheet, .. } => {
                backend.delete_sheet(token, file_id, sheet).await
            }
        };

        match result {
            Ok(()) => {
                self.refresh(ctx, backend).await;
                if self.error.is_none() {
                    info!("deleted {:?}", target);
                }
                true
            }
            Err(e) => {
                error!("deleting {:?} failed: {}", target, e);
                self.error = Some(format!("Failed to delete {}: {}", what, e.detail()));
                false
            }
        }
    }
}
