//! The remote backend as seen by the client.
//!
//! Views are generic over [`Backend`] so they can run against the HTTP client
//! or an in-process stand-in.
//!
//! Consistency contract: the backend may cascade deletes (removing the last
//! sheet of a file may remove the file). Views therefore never patch their
//! local lists after a mutation; every successful mutating call is followed by
//! a full re-fetch of the affected collection.

use crate::error::ApiResult;
use crate::selection::ChartType;
use crate::session::{AuthUser, Role};
use crate::sheet::{FileData, FileSummary, Row};
use serde::{Deserialize, Serialize};

/// Rows sent to the AI summary endpoint at most
pub const SUMMARY_ROW_LIMIT: usize = 100;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

/// Body of the AI summary request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryRequest {
    pub data_to_summarize: Vec<Row>,
    pub x_axis: String,
    pub y_axis: String,
    pub chart_type: ChartType,
}

impl SummaryRequest {
    /// Build a request from the active sheet rows, keeping only the first
    /// [`SUMMARY_ROW_LIMIT`] of them.
    pub fn new(rows: &[Row], x_axis: &str, y_axis: &str, chart_type: ChartType) -> Self {
        Self {
            data_to_summarize: rows.iter().take(SUMMARY_ROW_LIMIT).cloned().collect(),
            x_axis: x_axis.to_string(),
            y_axis: y_axis.to_string(),
            chart_type,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryResponse {
    pub summary: String,
}

/// A row of the admin user table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserRecord {
    #[serde(rename = "_id")]
    pub id: String,
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub role: Role,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoleUpdate {
    pub role: Role,
}

/// A spreadsheet picked for upload
#[derive(Debug, Clone, PartialEq)]
pub struct UploadFile {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

/// Operations offered by the backend.
///
/// Every method except `register` and `login` takes the bearer token of the
/// current session.
#[allow(async_fn_in_trait)]
pub trait Backend {
    async fn register(&self, request: &RegisterRequest) -> ApiResult<AuthUser>;

    async fn login(&self, request: &LoginRequest) -> ApiResult<AuthUser>;

    async fn upload(&self, token: &str, file: &UploadFile) -> ApiResult<()>;

    async fn upload_history(&self, token: &str) -> ApiResult<Vec<FileSummary>>;

    async fn file_data(&self, token: &str, file_id: &str) -> ApiResult<FileData>;

    async fn delete_sheet(&self, token: &str, file_id: &str, sheet: &str) -> ApiResult<()>;

    async fn delete_file(&self, token: &str, file_id: &str) -> ApiResult<()>;

    async fn ai_summary(&self, token: &str, request: &SummaryRequest) -> ApiResult<String>;

    async fn list_users(&self, token: &str) -> ApiResult<Vec<UserRecord>>;

    async fn delete_user(&self, token: &str, user_id: &str) -> ApiResult<()>;

    async fn update_role(&self, token: &str, user_id: &str, role: Role) -> ApiResult<()>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn summary_request_is_truncated() {
        let rows: Vec<Row> = (0..150)
            .map(|i| serde_json::from_value(json!({ "n": i })).unwrap())
            .collect();
        let request = SummaryRequest::new(&rows, "n", "n", ChartType::Column3D);
        assert_eq!(request.data_to_summarize.len(), SUMMARY_ROW_LIMIT);

        let body = serde_json::to_value(&request).unwrap();
        assert_eq!(body["chartType"], "3DColumn");
        assert_eq!(body["xAxis"], "n");
        assert_eq!(body["dataToSummarize"][99]["n"], 99);
    }
}
