//! Error types for the registry

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

/// Result type for registry operations
pub type RegistryResult<T> = Result<T, RegistryError>;

/// Error types for registry operations
///
/// Every error is surfaced to the client as a JSON body carrying the status,
/// a short code, and a message, with the body status equal to the HTTP
/// status line.
#[derive(Debug, Clone, thiserror::Error)]
pub enum RegistryError {
    /// Repository name is missing its namespace/name pair
    #[error("no chart name specified")]
    InvalidParams,

    /// Reference still absent after the preparer reported success
    #[error("chart prepare error")]
    ManifestNotFound,

    /// Path matched none of the served endpoints
    #[error("unknown path: {0}")]
    PathUnknown(String),

    /// HTTP method not supported on this endpoint
    #[error("we don't understand your method + url")]
    MethodUnknown,

    /// Unparsable pagination parameter on the tags endpoint
    #[error("parsing n: {0}")]
    InvalidPagination(String),

    /// Error reported by a chart preparer, forwarded untouched
    #[error("{message}")]
    Prepare {
        /// HTTP status chosen by the preparer
        status: u16,
        /// Error code chosen by the preparer
        code: String,
        /// Human-readable detail
        message: String,
    },

    /// The preparer missed its configured deadline
    #[error("chart preparation deadline exceeded")]
    DeadlineExceeded,
}

impl RegistryError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            RegistryError::InvalidParams
            | RegistryError::MethodUnknown
            | RegistryError::InvalidPagination(_) => StatusCode::BAD_REQUEST,
            RegistryError::ManifestNotFound | RegistryError::PathUnknown(_) => {
                StatusCode::NOT_FOUND
            }
            RegistryError::Prepare { status, .. } => {
                StatusCode::from_u16(*status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
            }
            RegistryError::DeadlineExceeded => StatusCode::GATEWAY_TIMEOUT,
        }
    }

    /// Get the error code carried in the response body
    pub fn error_code(&self) -> &str {
        match self {
            RegistryError::InvalidParams => "INVALID PARAMS",
            RegistryError::ManifestNotFound | RegistryError::PathUnknown(_) => "NOT FOUND",
            RegistryError::MethodUnknown => "METHOD_UNKNOWN",
            RegistryError::InvalidPagination(_) => "BAD_REQUEST",
            RegistryError::Prepare { code, .. } => code,
            RegistryError::DeadlineExceeded => "DEADLINE_EXCEEDED",
        }
    }
}

/// Wire shape shared by all error responses
#[derive(Debug, serde::Serialize)]
struct ErrorBody {
    status: u16,
    code: String,
    message: String,
}

impl IntoResponse for RegistryError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = ErrorBody {
            status: status.as_u16(),
            code: self.error_code().to_string(),
            message: self.to_string(),
        };

        (status, axum::Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preparer_errors_keep_their_status_and_code() {
        let err = RegistryError::Prepare {
            status: 502,
            code: "CHART_PULL_FAILED".to_string(),
            message: "upstream unreachable".to_string(),
        };
        assert_eq!(err.status_code(), StatusCode::BAD_GATEWAY);
        assert_eq!(err.error_code(), "CHART_PULL_FAILED");
        assert_eq!(err.to_string(), "upstream unreachable");
    }

    #[test]
    fn bogus_preparer_status_falls_back_to_internal_error() {
        let err = RegistryError::Prepare {
            status: 99,
            code: "X".to_string(),
            message: "y".to_string(),
        };
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
