use crate::assembler::assemble;
use crate::encoder::{encode, EncodeOptions};
use crate::error::QrError;
use crate::history::HistoryStore;
use crate::logo::validate_logo_ref;
use crate::model::{CodeSpecification, GeneratedCodeRecord};
use crate::normalizer::{brand, normalize, validate};
use crate::storage::Storage;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tokio::sync::Mutex;

#[derive(Clone)]
pub struct QrService<S> {
    history: HistoryStore<S>,
    encode_options: EncodeOptions,
    in_flight: Arc<Mutex<()>>,
}

impl<S: Storage> QrService<S> {
    pub fn new(history: HistoryStore<S>, encode_options: EncodeOptions) -> Self {
        Self {
            history,
            encode_options,
            in_flight: Arc::new(Mutex::new(())),
        }
    }

    pub fn history(&self) -> &HistoryStore<S> {
        &self.history
    }

    /// Validates, encodes and records one code. Generations run one at a time;
    /// a failure at any step leaves the history untouched.
    pub async fn generate(
        &self,
        specification: CodeSpecification,
        now: DateTime<Utc>,
    ) -> Result<GeneratedCodeRecord, QrError> {
        if !validate(&specification.url) {
            return Err(QrError::invalid_url());
        }
        let _guard = self.in_flight.lock().await;
        let branded_url = brand(&normalize(&specification.url)?);
        if let Some(logo_ref) = &specification.logo_ref {
            validate_logo_ref(logo_ref)?;
        }
        let image = encode(branded_url.as_str(), &self.encode_options)?;
        let record = assemble(
            &specification.url,
            image,
            specification.logo_ref,
            specification.expiry,
            now,
        )?;
        self.history.insert(record.clone()).await?;
        tracing::info!("Generated QR code {} for {}", record.id, record.url);
        Ok(record)
    }
}
