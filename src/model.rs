use crate::expiry::{format_created_at, is_expired, time_remaining, ExpirySelection};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedCodeRecord {
    pub id: String,
    pub url: String,
    #[serde(alias = "qrCodeDataUrl")]
    pub image: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: Option<DateTime<Utc>>,
    #[serde(default, alias = "logoUrl", skip_serializing_if = "Option::is_none")]
    pub logo_ref: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CodeSpecification {
    pub url: String,
    #[serde(default)]
    pub expiry: ExpirySelection,
    #[serde(default)]
    pub logo_ref: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LogoUpload {
    pub logo_ref: String,
}

/// A stored record together with its expiry state at listing time.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    #[serde(flatten)]
    pub record: GeneratedCodeRecord,
    pub expired: bool,
    pub time_remaining: String,
    pub created_at_label: String,
}

impl HistoryEntry {
    pub fn new(record: GeneratedCodeRecord, now: DateTime<Utc>) -> Self {
        Self {
            expired: is_expired(record.expires_at, now),
            time_remaining: time_remaining(record.expires_at, now),
            created_at_label: format_created_at(record.created_at),
            record,
        }
    }
}
