use crate::error::QrError;
use crate::utils::get_header;
use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::IntoResponse;
use sha3::{Digest, Sha3_256};

pub const API_KEY_HEADER: &str = "x-api-key";

/// Guards destructive routes. `encrypted_api_key` is the SHA3-256 hex digest of the expected key.
pub async fn auth(
    State(encrypted_api_key): State<String>,
    request: Request,
    next: Next,
) -> Result<impl IntoResponse, QrError> {
    let api_key = get_header(API_KEY_HEADER, request.headers()).ok_or_else(|| {
        tracing::warn!("Unauthorized call to {}", request.uri());
        QrError::Unauthorized
    })?;

    if hash_api_key(&api_key) != encrypted_api_key {
        tracing::warn!("Unauthorized call to {} (invalid key)", request.uri());
        return Err(QrError::Unauthorized);
    }
    Ok(next.run(request).await)
}

pub fn hash_api_key(api_key: &str) -> String {
    let mut hasher = Sha3_256::new();
    hasher.update(api_key.as_bytes());
    format!("{:x}", hasher.finalize())
}
