use crate::error::QrError;
use crate::expiry::{resolve, ExpirySelection};
use crate::model::GeneratedCodeRecord;
use crate::normalizer::{brand, normalize};
use crate::utils::generate_id;
use chrono::{DateTime, Utc};

/// Builds the record for one generation. Nothing is persisted here.
pub fn assemble(
    raw_url: &str,
    image: String,
    logo_ref: Option<String>,
    expiry: ExpirySelection,
    now: DateTime<Utc>,
) -> Result<GeneratedCodeRecord, QrError> {
    let url = brand(&normalize(raw_url)?);
    Ok(GeneratedCodeRecord {
        id: generate_id(now),
        url: url.into(),
        image,
        created_at: now,
        expires_at: resolve(expiry, now),
        logo_ref,
    })
}
