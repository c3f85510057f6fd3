use crate::error::StorageError;
use crate::storage::Storage;
use sqlx::{Error, Pool, Postgres};

/// Postgres-backed key/value entries.
#[derive(Clone)]
pub struct PgStorage {
    db_connection_pool: Pool<Postgres>,
}

impl PgStorage {
    pub fn new(db_connection_pool: Pool<Postgres>) -> Self {
        Self { db_connection_pool }
    }

    pub async fn ensure_schema(&self) -> Result<(), Error> {
        sqlx::query(
            r#"
              create table if not exists kv_entries (
                  key text primary key,
                  value text not null
              )
            "#,
        )
        .execute(&self.db_connection_pool)
        .await?;
        Ok(())
    }
}

impl Storage for PgStorage {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let value: Option<(String,)> = sqlx::query_as("select value from kv_entries where key = $1")
            .bind(key)
            .fetch_optional(&self.db_connection_pool)
            .await?;
        Ok(value.map(|(value,)| value))
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        sqlx::query(
            r#"
              insert into kv_entries(key, value) values ($1, $2)
              on conflict (key) do update set value = excluded.value
            "#,
        )
        .bind(key)
        .bind(value)
        .execute(&self.db_connection_pool)
        .await?;
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), StorageError> {
        sqlx::query("delete from kv_entries where key = $1")
            .bind(key)
            .execute(&self.db_connection_pool)
            .await?;
        Ok(())
    }
}
