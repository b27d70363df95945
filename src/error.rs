//! Error types shared across the client.
//!
//! Backend failures, session persistence failures and export failures each
//! get their own enum so callers can tell a quota problem from a broken disk.

use thiserror::Error;

/// Failures of a call to the remote backend.
#[derive(Debug, Error)]
pub enum ApiError {
    /// No credential is present; the request was never sent.
    #[error("not authenticated")]
    NotAuthenticated,

    /// The AI endpoint answered 429.
    #[error("AI quota exceeded")]
    QuotaExceeded,

    /// The backend answered 404.
    #[error("resource not found")]
    NotFound { message: Option<String> },

    /// Any other non-success status.
    #[error("backend responded with status {status}")]
    Backend { status: u16, message: Option<String> },

    /// The request never produced a response.
    #[error("network error: {0}")]
    Network(String),

    /// The response body did not have the expected shape.
    #[error("invalid response: {0}")]
    Decode(String),
}

/// Result type alias for backend calls
pub type ApiResult<T> = Result<T, ApiError>;

impl ApiError {
    /// Classify a non-success HTTP status together with the `message` field
    /// of the backend's error payload, if there was one.
    pub fn from_status(status: u16, message: Option<String>) -> Self {
        match status {
            404 => ApiError::NotFound { message },
            _ => ApiError::Backend { status, message },
        }
    }

    /// A 429 from the AI summary endpoint means the AI quota is used up.
    pub fn for_ai_summary(self) -> Self {
        match self {
            ApiError::Backend { status: 429, .. } => ApiError::QuotaExceeded,
            other => other,
        }
    }

    /// The human readable message the backend attached to its error payload.
    pub fn backend_message(&self) -> Option<&str> {
        match self {
            ApiError::NotFound { message } | ApiError::Backend { message, .. } => {
                message.as_deref().filter(|m| !m.is_empty())
            }
            _ => None,
        }
    }

    /// The backend's message when present, otherwise this error's own text.
    pub fn detail(&self) -> String {
        self.backend_message()
            .map(str::to_string)
            .unwrap_or_else(|| self.to_string())
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, ApiError::NotFound { .. })
    }
}

/// Failures reading or writing the persisted credential.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("session I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("session file is malformed: {0}")]
    Json(#[from] serde_json::Error),
}

/// Failures of login, registration and logout.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("{0}")]
    Invalid(String),

    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Session(#[from] SessionError),
}

impl AuthError {
    /// Message shown on the login and register screens.
    pub fn user_message(&self) -> String {
        match self {
            AuthError::Api(err) => err.detail(),
            other => other.to_string(),
        }
    }
}

/// Failures while rendering or exporting a chart snapshot.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("chart rendering failed: {0}")]
    Render(String),

    #[error("image encoding failed: {0}")]
    Image(String),

    #[error("{0} charts have no image export")]
    Unsupported(String),

    #[error("export I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// A chart type name that is not one of the four known variants.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown chart type: {0}")]
pub struct UnknownChartType(pub String);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_classification() {
        let throttled = ApiError::from_status(429, Some("slow down".into()));
        assert_eq!(throttled.detail(), "slow down");
        assert!(matches!(throttled.for_ai_summary(), ApiError::QuotaExceeded));
        assert!(ApiError::from_status(404, None).for_ai_summary().is_not_found());
        assert!(ApiError::from_status(404, None).is_not_found());
        assert!(matches!(
            ApiError::from_status(500, None),
            ApiError::Backend { status: 500, .. }
        ));
    }

    #[test]
    fn detail_prefers_backend_message() {
        let err = ApiError::from_status(400, Some("Sheet not found".into()));
        assert_eq!(err.detail(), "Sheet not found");

        let err = ApiError::from_status(502, Some(String::new()));
        assert_eq!(err.detail(), "backend responded with status 502");

        let err = ApiError::Network("connection refused".into());
        assert_eq!(err.detail(), "network error: connection refused");
    }
}
