//! [`Backend`] over HTTP.
//!
//! JSON in and out, bearer token in the `Authorization` header, error
//! payloads of the form `{"message": "..."}`.

use crate::backend::{
    Backend, LoginRequest, RegisterRequest, RoleUpdate, SummaryRequest, SummaryResponse,
    UploadFile, UserRecord,
};
use crate::config::ClientConfig;
use crate::error::{ApiError, ApiResult};
use crate::session::{AuthUser, Role};
use crate::sheet::{FileData, FileSummary};
use log::{debug, warn};
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::json;

/// Multipart field carrying the uploaded workbook
pub const UPLOAD_FIELD: &str = "excelFile";

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

/// HTTP client for the chartsheet backend
#[derive(Debug, Clone)]
pub struct HttpBackend {
    http: Client,
    base_url: String,
}

impl From<reqwest::Error> for ApiError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            ApiError::Decode(e.to_string())
        } else {
            ApiError::Network(e.to_string())
        }
    }
}

impl HttpBackend {
    /// Build a client for `config.api_url` with the configured timeout.
    pub fn new(config: &ClientConfig) -> ApiResult<Self> {
        let http = Client::builder().timeout(config.request_timeout).build()?;
        Ok(Self {
            http,
            base_url: config.api_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn request(&self, method: Method, path: &str, token: Option<&str>) -> RequestBuilder {
        debug!("{} {}", method, path);
        let builder = self.http.request(method, self.url(path));
        match token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    /// Send the request and turn a non-success status into an [`ApiError`].
    async fn send(builder: RequestBuilder) -> ApiResult<Response> {
        let response = builder.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.bytes().await.unwrap_or_default();
        let message = serde_json::from_slice::<ErrorBody>(&body)
            .ok()
            .and_then(|b| b.message);
        warn!("backend responded {}: {:?}", status, message);
        Err(ApiError::from_status(status.as_u16(), message))
    }

    async fn json<T: DeserializeOwned>(builder: RequestBuilder) -> ApiResult<T> {
        let response = Self::send(builder).await?;
        let body = response.bytes().await?;
        serde_json::from_slice(&body).map_err(|e| ApiError::Decode(e.to_string()))
    }

    async fn empty(builder: RequestBuilder) -> ApiResult<()> {
        Self::send(builder).await.map(|_| ())
    }
}

fn segment(value: &str) -> String {
    urlencoding::encode(value).into_owned()
}

impl Backend for HttpBackend {
    async fn register(&self, request: &RegisterRequest) -> ApiResult<AuthUser> {
        Self::json(
            self.request(Method::POST, "/api/auth/register", None)
                .json(request),
        )
        .await
    }

    async fn login(&self, request: &LoginRequest) -> ApiResult<AuthUser> {
        Self::json(self.request(Method::POST, "/api/auth/login", None).json(request)).await
    }

    async fn upload(&self, token: &str, file: &UploadFile) -> ApiResult<()> {
        let part = Part::bytes(file.bytes.clone()).file_name(file.file_name.clone());
        let form = Form::new().part(UPLOAD_FIELD, part);
        Self::empty(
            self.request(Method::POST, "/api/upload", Some(token))
                .multipart(form),
        )
        .await
    }

    async fn upload_history(&self, token: &str) -> ApiResult<Vec<FileSummary>> {
        Self::json(self.request(Method::GET, "/api/upload/history", Some(token))).await
    }

    async fn file_data(&self, token: &str, file_id: &str) -> ApiResult<FileData> {
        let path = format!("/api/upload/{}/data", segment(file_id));
        Self::json(self.request(Method::GET, &path, Some(token))).await
    }

    async fn delete_sheet(&self, token: &str, file_id: &str, sheet: &str) -> ApiResult<()> {
        let path = format!("/api/upload/{}/sheet/{}", segment(file_id), segment(sheet));
        Self::empty(
            self.request(Method::PUT, &path, Some(token))
                .json(&json!({})),
        )
        .await
    }

    async fn delete_file(&self, token: &str, file_id: &str) -> ApiResult<()> {
        let path = format!("/api/upload/{}", segment(file_id));
        Self::empty(self.request(Method::DELETE, &path, Some(token))).await
    }

    async fn ai_summary(&self, token: &str, request: &SummaryRequest) -> ApiResult<String> {
        let response: SummaryResponse = Self::json(
            self.request(Method::POST, "/api/ai/summary", Some(token))
                .json(request),
        )
        .await
        .map_err(ApiError::for_ai_summary)?;
        Ok(response.summary)
    }

    async fn list_users(&self, token: &str) -> ApiResult<Vec<UserRecord>> {
        Self::json(self.request(Method::GET, "/api/admin/users", Some(token))).await
    }

    async fn delete_user(&self, token: &str, user_id: &str) -> ApiResult<()> {
        let path = format!("/api/admin/users/{}", segment(user_id));
        Self::empty(self.request(Method::DELETE, &path, Some(token))).await
    }

    async fn update_role(&self, token: &str, user_id: &str, role: Role) -> ApiResult<()> {
        let path = format!("/api/admin/users/{}/role", segment(user_id));
        Self::empty(
            self.request(Method::PUT, &path, Some(token))
                .json(&RoleUpdate { role }),
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn base_url_is_normalized() {
        let config = ClientConfig {
            api_url: "http://localhost:5000/".into(),
            session_path: "session.json".into(),
            request_timeout: Duration::from_secs(5),
        };
        let backend = HttpBackend::new(&config).unwrap();
        assert_eq!(backend.base_url(), "http://localhost:5000");
        assert_eq!(backend.url("/api/upload"), "http://localhost:5000/api/upload");
    }

    #[test]
    fn path_segments_are_encoded() {
        assert_eq!(segment("Q1 Sales/2024"), "Q1%20Sales%2F2024");
    }
}
