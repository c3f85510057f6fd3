use crate::encoder::{decode_data_url, ImageFormat};
use crate::error::QrError;
use crate::logo::{check_declared_size, logo_ref_from_upload, MAX_LOGO_BYTES};
use crate::model::{CodeSpecification, GeneratedCodeRecord, HistoryEntry, LogoUpload};
use crate::service::QrService;
use crate::storage::Storage;
use crate::utils::get_header;
use axum::body::{to_bytes, Body};
use axum::extract::{Path, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::Json;
use chrono::Utc;

pub async fn create_code<S: Storage>(
    State(service): State<QrService<S>>,
    Json(code_specification): Json<CodeSpecification>,
) -> Result<(StatusCode, Json<GeneratedCodeRecord>), QrError> {
    let record = service.generate(code_specification, Utc::now()).await?;
    Ok((StatusCode::CREATED, Json(record)))
}

/// Accepts raw image bytes and returns them as a logo reference for `create_code`.
pub async fn upload_logo(headers: HeaderMap, body: Body) -> Result<Json<LogoUpload>, QrError> {
    let declared_size = get_header(header::CONTENT_LENGTH.as_str(), &headers)
        .and_then(|value| value.parse::<u64>().ok());
    if let Some(size) = declared_size {
        check_declared_size(size)?;
    }
    let content_type = get_header(header::CONTENT_TYPE.as_str(), &headers).unwrap_or_default();
    // The limit also catches bodies sent without a Content-Length.
    let bytes = to_bytes(body, MAX_LOGO_BYTES as usize).await.map_err(|err| {
        tracing::warn!("Logo upload rejected while reading: {}", err);
        QrError::OversizedAsset {
            size: declared_size.unwrap_or(MAX_LOGO_BYTES + 1),
            max: MAX_LOGO_BYTES,
        }
    })?;
    let logo_ref = logo_ref_from_upload(&content_type, &bytes)?;
    Ok(Json(LogoUpload { logo_ref }))
}

pub async fn list_history<S: Storage>(
    State(service): State<QrService<S>>,
) -> Result<Json<Vec<HistoryEntry>>, QrError> {
    let now = Utc::now();
    let entries = service
        .history()
        .load()
        .await?
        .into_iter()
        .map(|record| HistoryEntry::new(record, now))
        .collect();
    Ok(Json(entries))
}

pub async fn clear_history<S: Storage>(
    State(service): State<QrService<S>>,
) -> Result<StatusCode, QrError> {
    service.history().clear().await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn download_image<S: Storage>(
    State(service): State<QrService<S>>,
    Path(record_id): Path<String>,
) -> Result<impl IntoResponse, QrError> {
    let record = service
        .history()
        .find(&record_id)
        .await?
        .ok_or(QrError::NotFound)?;
    let image = decode_data_url(&record.image).ok_or_else(|| {
        tracing::error!("Stored image of {} is not a data URL", record.id);
        QrError::NotFound
    })?;
    let extension = ImageFormat::from_mime_type(&image.mime_type)
        .unwrap_or_default()
        .extension();
    let disposition = format!("attachment; filename=\"qr-code-{}.{}\"", record.id, extension);
    Ok((
        [
            (header::CONTENT_TYPE, image.mime_type),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        image.bytes,
    ))
}

pub async fn health() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}
