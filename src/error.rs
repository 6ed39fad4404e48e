use axum::{
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

/// The application's error type.
#[derive(Error, Debug)]
pub enum AppError {
    /// A database error.
    #[error("Database error: {0}")]
    Database(#[from] tokio_postgres::Error),

    /// A connection pool error.
    #[error("Pool error: {0}")]
    Pool(#[from] deadpool_postgres::PoolError),

    /// A Redis error.
    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    /// The uploaded bytes could not be decoded as the declared format.
    #[error("Failed to parse file: {0}")]
    Parse(String),

    /// The upload is neither CSV nor XLSX.
    #[error("Unsupported file format: {0}")]
    UnsupportedFormat(String),

    /// One or more rows failed validation; nothing was committed.
    #[error("Validation failed for {} row(s)", .0.len())]
    ImportRejected(Vec<String>),

    /// The file parsed cleanly but contained no data rows.
    #[error("No valid data found in file")]
    EmptyBatch,

    /// A request payload validation error.
    #[error("Validation error: {0}")]
    Validation(String),

    /// A multipart error.
    #[error("Multipart error: {0}")]
    Multipart(String),

    /// The upload exceeds the configured size limit.
    #[error("File exceeds the maximum upload size of {0} bytes")]
    PayloadTooLarge(usize),

    /// Unknown username or wrong password.
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// Missing, unknown or expired session token.
    #[error("Authentication required")]
    Unauthenticated,

    /// A resource not found error.
    #[error("{0} not found")]
    NotFound(&'static str),

    /// An internal server error.
    #[error("Internal server error: {0}")]
    Internal(String),
}

/// The JSON body returned for every failed request.
#[derive(Serialize)]
struct ErrorBody {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<Vec<String>>,
}

/// A `Result` type that uses `AppError` as the error type.
pub type Result<T> = std::result::Result<T, AppError>;

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let mut details: Option<Vec<String>> = None;

        let (status, message) = match self {
            AppError::Database(ref e) => {
                tracing::error!("Database error: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Database error".to_string())
            }

            AppError::Pool(ref e) => {
                tracing::error!("Pool error: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Database error".to_string())
            }

            AppError::Redis(ref e) => {
                tracing::error!("Redis error: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Session store error".to_string())
            }

            AppError::Parse(ref msg) => {
                tracing::debug!("Parse error: {}", msg);
                (StatusCode::BAD_REQUEST, self.to_string())
            }

            AppError::UnsupportedFormat(ref msg) => {
                tracing::debug!("Unsupported format: {}", msg);
                (
                    StatusCode::BAD_REQUEST,
                    "Only CSV and XLSX files are allowed".to_string(),
                )
            }

            AppError::ImportRejected(errors) => {
                tracing::debug!("Import rejected with {} row error(s)", errors.len());
                details = Some(errors);
                (StatusCode::BAD_REQUEST, "Validation failed".to_string())
            }

            AppError::EmptyBatch => {
                tracing::debug!("Import rejected: empty batch");
                (StatusCode::BAD_REQUEST, "No valid data found in file".to_string())
            }

            AppError::Validation(ref msg) => {
                tracing::debug!("Validation error: {}", msg);
                (StatusCode::BAD_REQUEST, msg.clone())
            }

            AppError::Multipart(ref msg) => {
                tracing::warn!("Multipart error: {}", msg);
                (StatusCode::BAD_REQUEST, msg.clone())
            }

            AppError::PayloadTooLarge(limit) => {
                tracing::warn!("Upload rejected: larger than {} bytes", limit);
                (StatusCode::PAYLOAD_TOO_LARGE, self.to_string())
            }

            AppError::InvalidCredentials => {
                tracing::warn!("Login failed: invalid credentials");
                (StatusCode::UNAUTHORIZED, "Invalid credentials".to_string())
            }

            AppError::Unauthenticated => {
                tracing::warn!("Rejected request without a valid admin session");
                (StatusCode::UNAUTHORIZED, "Authentication required".to_string())
            }

            AppError::NotFound(what) => {
                tracing::debug!("{} not found", what);
                (StatusCode::NOT_FOUND, format!("{} not found", what))
            }

            AppError::Internal(ref msg) => {
                tracing::error!("Internal error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error".to_string())
            }
        };

        let payload = ErrorBody {
            error: message,
            details,
        };

        let body = sonic_rs::to_string(&payload)
            .unwrap_or_else(|_| r#"{"error":"Internal server error"}"#.to_string());

        (status, [(header::CONTENT_TYPE, "application/json")], body).into_response()
    }
}
