use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;

pub const INVALID_URL_MESSAGE: &str = "Please enter a valid URL";
pub const ENCODING_FAILED_MESSAGE: &str = "Failed to generate QR code";

#[derive(Debug, Error)]
pub enum QrError {
    #[error("{0}")]
    Validation(String),

    #[error("Failed to generate QR code: {0}")]
    Encoding(String),

    #[error("Logo file size must be less than {max} bytes (got {size})")]
    OversizedAsset { size: u64, max: u64 },

    #[error("Not found")]
    NotFound,

    #[error("Unauthorized")]
    Unauthorized,

    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl QrError {
    pub fn invalid_url() -> Self {
        QrError::Validation(INVALID_URL_MESSAGE.into())
    }
}

/// Failures of the persistence backend itself. Unreadable stored history is
/// not one of these; it is recovered inside the history store.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

impl IntoResponse for QrError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            QrError::Validation(_) => (StatusCode::BAD_REQUEST, self.to_string()),
            QrError::Encoding(reason) => {
                tracing::error!("QR encoding failed: {}", reason);
                (
                    StatusCode::UNPROCESSABLE_ENTITY,
                    ENCODING_FAILED_MESSAGE.to_string(),
                )
            }
            QrError::OversizedAsset { .. } => (StatusCode::PAYLOAD_TOO_LARGE, self.to_string()),
            QrError::NotFound => (StatusCode::NOT_FOUND, self.to_string()),
            QrError::Unauthorized => (StatusCode::UNAUTHORIZED, self.to_string()),
            QrError::Storage(err) => {
                tracing::error!("{}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };
        (status, Json(serde_json::json!({ "error": message }))).into_response()
    }
}
