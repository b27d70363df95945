use crate::access::Route;
use crate::backend::{Backend, SummaryRequest};
use crate::error::ApiError;
use crate::pipeline::{DerivedChart, derive_chart};
use crate::selection::{AxisSelection, ChartType};
use crate::session::AppContext;
use crate::sheet::{FileData, Sheet};
use log::{debug, error, info};

const LOAD_FAILED: &str =
    "Failed to load file data. Please ensure the file exists and you are authorized.";

/// The analysis screen for one uploaded file.
///
/// Every change to the selection re-derives the chart from scratch.
#[derive(Debug)]
pub struct AnalyzeView {
    file_id: String,
    file: Option<FileData>,
    selection: AxisSelection,
    derived: DerivedChart,
    pending_sheet_delete: Option<String>,
    pub error: Option<String>,
    pub loading: bool,
    /// Summary text, or the reason there is none
    pub ai_summary: String,
    pub ai_loading: bool,
}

impl AnalyzeView {
    pub fn new(file_id: &str) -> Self {
        let selection = AxisSelection::default();
        Self {
            file_id: file_id.to_string(),
            file: None,
            derived: DerivedChart::empty(&selection),
            selection,
            pending_sheet_delete: None,
            error: None,
            loading: false,
            ai_summary: String::new(),
            ai_loading: false,
        }
    }

    pub fn file_id(&self) -> &str {
        &self.file_id
    }

    pub fn file(&self) -> Option<&FileData> {
        self.file.as_ref()
    }

    pub fn selection(&self) -> &AxisSelection {
        &self.selection
    }

    pub fn chart(&self) -> &DerivedChart {
        &self.derived
    }

    pub fn sheet_names(&self) -> &[String] {
        self.file.as_ref().map(|f| f.sheet_names.as_slice()).unwrap_or(&[])
    }

    /// The sheet currently selected, if it is part of the loaded file
    pub fn active_sheet(&self) -> Option<Sheet<'_>> {
        self.file.as_ref()?.sheet(&self.selection.sheet)
    }

    /// Columns of the selected sheet, offered for both axes
    pub fn column_headers(&self) -> &[String] {
        self.active_sheet().map(|s| s.columns).unwrap_or(&[])
    }

    /// Fetch the file and re-derive the chart.
    ///
    /// Returns the route to navigate to when the file has no sheets left.
    pub async fn load<B: Backend>(&mut self, ctx: &AppContext, backend: &B) -> Option<Route> {
        if self.file_id.is_empty() {
            self.error = Some(
                "No file selected for analysis. Please go to your dashboard and select a file."
                    .to_string(),
            );
            return None;
        }

        match self.fetch(ctx, backend).await {
            Ok(route) => route,
            Err(ApiError::NotAuthenticated) => {
                self.error = Some("User not authenticated. Please log in.".to_string());
                None
            }
            Err(e) => {
                error!("loading file {} failed: {}", self.file_id, e);
                self.error = Some(LOAD_FAILED.to_string());
                None
            }
        }
    }

    async fn fetch<B: Backend>(
        &mut self,
        ctx: &AppContext,
        backend: &B,
    ) -> Result<Option<Route>, ApiError> {
        let token = ctx.token().ok_or(ApiError::NotAuthenticated)?;

        self.loading = true;
        let result = backend.file_data(token, &self.file_id).await;
        self.loading = false;

        let file = result?;
        self.error = None;
        Ok(self.install(file))
    }

    fn install(&mut self, file: FileData) -> Option<Route> {
        let Some(first) = file.first_sheet().map(str::to_string) else {
            info!("file {} has no sheets left", self.file_id);
            self.file = Some(file);
            self.selection.reset_to("");
            self.recompute();
            return Some(Route::History);
        };

        if self.selection.sheet.is_empty() || !file.has_sheet(&self.selection.sheet) {
            self.selection.reset_to(&first);
        }
        self.file = Some(file);
        self.recompute();
        None
    }

    fn recompute(&mut self) {
        let sheet = self.file.as_ref().and_then(|f| f.sheet(&self.selection.sheet));
        self.derived = derive_chart(sheet, &self.selection);
        debug!("chart state for {:?}: {:?}", self.selection, self.derived.state);
    }

    /// Switch sheets, keeping the axes the new sheet also has.
    pub fn select_sheet(&mut self, name: &str) {
        match self.file.as_ref().and_then(|f| f.sheet(name)) {
            Some(sheet) => self.selection.switch_sheet(&sheet),
            None => self.selection.reset_to(name),
        }
        self.recompute();
    }

    pub fn set_x_axis(&mut self, column: &str) {
        self.selection.x_axis = column.to_string();
        self.recompute();
    }

    pub fn set_y_axis(&mut self, column: &str) {
        self.selection.y_axis = column.to_string();
        self.recompute();
    }

    pub fn set_chart_type(&mut self, chart_type: ChartType) {
        self.selection.chart_type = chart_type;
        self.recompute();
    }

    /// Ask the backend to summarize the first rows of the active sheet.
    ///
    /// The outcome, success or failure, ends up in `ai_summary`. No request
    /// is sent without a credential or a complete selection.
    pub async fn request_summary<B: Backend>(&mut self, ctx: &AppContext, backend: &B) {
        self.ai_summary.clear();

        let Some(token) = ctx.token() else {
            self.ai_summary = "Please log in to get AI insights.".to_string();
            return;
        };
        let request = self
            .active_sheet()
            .filter(|sheet| self.selection.is_valid_for(sheet))
            .map(|sheet| {
                SummaryRequest::new(
                    sheet.rows,
                    &self.selection.x_axis,
                    &self.selection.y_axis,
                    self.selection.chart_type,
                )
            });
        let Some(request) = request else {
            self.ai_summary = "Please select a file, sheet, X-axis, Y-axis, and Chart Type \
                               before getting AI insights."
                .to_string();
            return;
        };

        self.ai_loading = true;
        let result = backend.ai_summary(token, &request).await;
        self.ai_loading = false;

        self.ai_summary = match result {
            Ok(summary) => summary,
            Err(ApiError::QuotaExceeded) => {
                error!("AI summary quota exceeded");
                "AI quota exceeded. Please check your OpenAI billing details on platform.openai.com."
                    .to_string()
            }
            Err(e) => {
                error!("AI summary failed: {}", e);
                match e.backend_message() {
                    Some(message) => format!("Failed to get AI summary: {}", message),
                    None => "Failed to get AI summary. Please try again.".to_string(),
                }
            }
        };
    }

    /// Ask for confirmation before deleting `sheet`.
    pub fn request_sheet_delete(&mut self, sheet: &str) {
        self.pending_sheet_delete = Some(sheet.to_string());
    }

    pub fn pending_sheet_delete(&self) -> Option<&str> {
        self.pending_sheet_delete.as_deref()
    }

    /// Whether confirming the pending deletion removes the whole file.
    pub fn deletes_file(&self) -> bool {
        self.pending_sheet_delete.is_some() && self.sheet_names().len() <= 1
    }

    pub fn confirmation_prompt(&self) -> Option<String> {
        let sheet = self.pending_sheet_delete.as_deref()?;
        if self.deletes_file() {
            let name = self
                .file
                .as_ref()
                .map(|f| f.original_file_name.as_str())
                .unwrap_or(sheet);
            Some(format!(
                "\"{}\" is the last sheet. Are you sure you want to delete the entire file \"{}\"?",
                sheet, name
            ))
        } else {
            Some(format!(
                "Are you sure you want to delete the sheet \"{}\"?",
                sheet
            ))
        }
    }

    pub fn cancel_sheet_delete(&mut self) {
        self.pending_sheet_delete = None;
    }

    /// Delete the pending sheet and re-fetch the file.
    ///
    /// The last sheet is removed by deleting the file. Whether or not the
    /// backend cascades, the re-fetch decides: a missing file or a file with
    /// no sheets navigates to the history list.
    pub async fn confirm_sheet_delete<B: Backend>(
        &mut self,
        ctx: &AppContext,
        backend: &B,
    ) -> Option<Route> {
        let deletes_file = self.deletes_file();
        let sheet = self.pending_sheet_delete.take()?;
        let Some(token) = ctx.token() else {
            self.error = Some("Authentication required to delete sheet.".to_string());
            return None;
        };

        let result = if deletes_file {
            backend.delete_file(token, &self.file_id).await
        } else {
            backend.delete_sheet(token, &self.file_id, &sheet).await
        };
        if let Err(e) = result {
            error!("deleting sheet {} of {} failed: {}", sheet, self.file_id, e);
            self.error = Some(format!("Failed to delete sheet: {}", e.detail()));
            return None;
        }
        info!("deleted sheet {} of {}", sheet, self.file_id);

        match self.fetch(ctx, backend).await {
            Ok(route) => route,
            Err(e) if e.is_not_found() => {
                self.file = None;
                Some(Route::History)
            }
            Err(e) => {
                error!("reloading file {} failed: {}", self.file_id, e);
                self.error = Some(LOAD_FAILED.to_string());
                None
            }
        }
    }

    /// Render the current chart to a PNG snapshot for export.
    ///
    /// `None` when nothing is ready to draw.
    #[cfg(feature = "web")]
    pub fn snapshot(
        &self,
        width: u32,
        height: u32,
    ) -> Result<Option<crate::export::ChartSnapshot>, crate::error::ExportError> {
        let Some(config) = self.derived.config.as_ref() else {
            return Ok(None);
        };
        crate::export::render_chart(
            config,
            &self.derived.options,
            self.selection.chart_type,
            width,
            height,
        )
        .map(Some)
    }
}
