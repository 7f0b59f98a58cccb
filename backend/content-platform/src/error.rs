/// Error types for the content platform
///
/// Every handler returns [`Result`]; errors render as a JSON body
/// `{ "error": ..., "status": ... }` with the matching HTTP status.
use actix_web::{error::ResponseError, http::header, http::StatusCode, HttpResponse};
use media_core::MediaError;
use std::fmt;

pub type Result<T> = std::result::Result<T, AppError>;

#[derive(Debug)]
pub enum AppError {
    /// Database operation failed
    DatabaseError(String),

    NotFound(String),

    Unauthorized(String),

    /// Requested byte range cannot be served from a resource of `total` bytes
    RangeNotSatisfiable { total: u64, reason: String },

    Internal(String),

    /// Malformed query string or path segment
    BadRequest(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::DatabaseError(msg) => write!(f, "Database error: {}", msg),
            AppError::NotFound(msg) => write!(f, "Not found: {}", msg),
            AppError::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
            AppError::RangeNotSatisfiable { reason, .. } => {
                write!(f, "Range not satisfiable: {}", reason)
            }
            AppError::Internal(msg) => write!(f, "Internal error: {}", msg),
            AppError::BadRequest(msg) => write!(f, "Bad request: {}", msg),
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::DatabaseError(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::RangeNotSatisfiable { .. } => StatusCode::RANGE_NOT_SATISFIABLE,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();

        // Internal details stay in the logs
        let error_msg = match self {
            AppError::DatabaseError(_) | AppError::Internal(_) => {
                tracing::error!(error = %self, "request failed");
                "Internal server error".to_string()
            }
            _ => self.to_string(),
        };

        let mut builder = HttpResponse::build(status);
        if let AppError::RangeNotSatisfiable { total, .. } = self {
            builder.insert_header((header::CONTENT_RANGE, format!("bytes */{}", total)));
            builder.insert_header((header::ACCEPT_RANGES, "bytes"));
        }

        builder.json(serde_json::json!({
            "error": error_msg,
            "status": status.as_u16(),
        }))
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        AppError::DatabaseError(err.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Internal(err.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::Internal(err.to_string())
    }
}

impl From<MediaError> for AppError {
    fn from(err: MediaError) -> Self {
        match err {
            MediaError::NotFound(path) => {
                tracing::warn!(path = %path.display(), "media file missing from storage");
                AppError::NotFound("Media file not found".to_string())
            }
            MediaError::RangeNotSatisfiable { total, reason } => AppError::RangeNotSatisfiable {
                total,
                reason: reason.to_string(),
            },
            MediaError::Io(e) => AppError::Internal(e.to_string()),
        }
    }
}
