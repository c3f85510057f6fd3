//! Bounded, newest-first history of generated codes.

use crate::error::{QrError, StorageError};
use crate::model::GeneratedCodeRecord;
use crate::storage::Storage;
use std::sync::Arc;
use tokio::sync::Mutex;

pub const HISTORY_CAPACITY: usize = 5;
pub const HISTORY_KEY: &str = "qr-history";

#[derive(Clone)]
pub struct HistoryStore<S> {
    storage: S,
    // Serializes read-modify-write cycles on the stored list.
    write_lock: Arc<Mutex<()>>,
}

impl<S: Storage> HistoryStore<S> {
    pub fn new(storage: S) -> Self {
        Self {
            storage,
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    /// Stored records, newest first. Unreadable data is logged and treated as
    /// an empty history.
    pub async fn load(&self) -> Result<Vec<GeneratedCodeRecord>, QrError> {
        let Some(stored) = self.storage.get(HISTORY_KEY).await? else {
            return Ok(Vec::new());
        };
        match serde_json::from_str(&stored) {
            Ok(records) => Ok(records),
            Err(err) => {
                tracing::warn!("Stored history is unreadable, treating it as empty: {}", err);
                Ok(Vec::new())
            }
        }
    }

    pub async fn insert(&self, record: GeneratedCodeRecord) -> Result<(), QrError> {
        let _guard = self.write_lock.lock().await;
        let mut records = self.load().await?;
        records.insert(0, record);
        records.truncate(HISTORY_CAPACITY);
        let serialized = serde_json::to_string(&records).map_err(StorageError::from)?;
        self.storage.set(HISTORY_KEY, &serialized).await?;
        tracing::debug!("History now holds {} record(s)", records.len());
        Ok(())
    }

    /// Drops every stored record. Callers confirm with the user first.
    pub async fn clear(&self) -> Result<(), QrError> {
        let _guard = self.write_lock.lock().await;
        self.storage.remove(HISTORY_KEY).await?;
        tracing::info!("History cleared");
        Ok(())
    }

    pub async fn find(&self, id: &str) -> Result<Option<GeneratedCodeRecord>, QrError> {
        Ok(self
            .load()
            .await?
            .into_iter()
            .find(|record| record.id == id))
    }
}
