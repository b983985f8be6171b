//! Embedded libSQL key/value storage (offline mode).
//!
//! The [`Storage`] struct wraps a libSQL database holding a flat
//! `key → value` table. formfill keeps its entire form data mapping under a
//! single key (see [`formfill_shared::FORM_DATA_KEY`]) as one serialized JSON
//! object; nothing is sharded per entry.

mod migrations;

use std::path::Path;

use chrono::{DateTime, Utc};
use formfill_shared::{FormFillError, Result};
use libsql::{Connection, Database, params};

/// Primary storage handle wrapping a libSQL database.
pub struct Storage {
    #[allow(dead_code)]
    db: Database,
    conn: Connection,
}

/// A stored value together with the time it was last written.
#[derive(Debug, Clone)]
pub struct StoredValue {
    pub value: String,
    pub updated_at: DateTime<Utc>,
}

impl Storage {
    /// Open or create a database at `path` and apply pending migrations.
    pub async fn open(path: &Path) -> Result<Self> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| FormFillError::io(parent, e))?;
        }

        let db = libsql::Builder::new_local(path)
            .build()
            .await
            .map_err(|e| FormFillError::Storage(e.to_string()))?;

        let conn = db
            .connect()
            .map_err(|e| FormFillError::Storage(e.to_string()))?;

        let storage = Self { db, conn };
        storage.run_migrations().await?;
        tracing::debug!(path = %path.display(), "storage opened");
        Ok(storage)
    }

    /// Run pending schema migrations.
    async fn run_migrations(&self) -> Result<()> {
        let current_version = self.get_schema_version().await;

        for migration in migrations::all_migrations() {
            if migration.version > current_version {
                tracing::info!(
                    version = migration.version,
                    description = migration.description,
                    "applying migration"
                );
                self.conn.execute_batch(migration.sql).await.map_err(|e| {
                    FormFillError::Storage(format!(
                        "migration v{} failed: {e}",
                        migration.version
                    ))
                })?;
            }
        }
        Ok(())
    }

    /// Get the current schema version, or 0 if no migrations have been applied.
    async fn get_schema_version(&self) -> u32 {
        let result = self
            .conn
            .query("SELECT MAX(version) FROM schema_migrations", params![])
            .await;

        match result {
            Ok(mut rows) => {
                if let Ok(Some(row)) = rows.next().await {
                    row.get::<u32>(0).unwrap_or(0)
                } else {
                    0
                }
            }
            Err(_) => 0, // Table doesn't exist yet
        }
    }

    // -----------------------------------------------------------------------
    // Key/value operations
    // -----------------------------------------------------------------------

    /// Get the value stored under `key`, or `None` when absent.
    pub async fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.get_entry(key).await?.map(|stored| stored.value))
    }

    /// Get the value stored under `key` along with its last write time.
    pub async fn get_entry(&self, key: &str) -> Result<Option<StoredValue>> {
        let mut rows = self
            .conn
            .query(
                "SELECT value, updated_at FROM kv_store WHERE key = ?1",
                params![key],
            )
            .await
            .map_err(|e| FormFillError::Storage(e.to_string()))?;

        match rows.next().await {
            Ok(Some(row)) => {
                let value: String = row
                    .get(0)
                    .map_err(|e| FormFillError::Storage(e.to_string()))?;
                let updated_at: String = row
                    .get(1)
                    .map_err(|e| FormFillError::Storage(e.to_string()))?;
                let updated_at = DateTime::parse_from_rfc3339(&updated_at)
                    .map(|dt| dt.with_timezone(&Utc))
                    .map_err(|e| FormFillError::Storage(format!("invalid date: {e}")))?;
                Ok(Some(StoredValue { value, updated_at }))
            }
            Ok(None) => Ok(None),
            Err(e) => Err(FormFillError::Storage(e.to_string())),
        }
    }

    /// Store `value` under `key`, replacing any previous value.
    pub async fn set(&self, key: &str, value: &str) -> Result<()> {
        let now = Utc::now().to_rfc3339();
        self.conn
            .execute(
                "INSERT INTO kv_store (key, value, updated_at) VALUES (?1, ?2, ?3)
                 ON CONFLICT(key) DO UPDATE SET
                   value = excluded.value,
                   updated_at = excluded.updated_at",
                params![key, value, now.as_str()],
            )
            .await
            .map_err(|e| FormFillError::Storage(e.to_string()))?;
        tracing::debug!(key, bytes = value.len(), "value stored");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    /// Create a temp file storage for testing.
    async fn test_storage() -> Storage {
        let tmp = std::env::temp_dir().join(format!("ff_test_{}.db", Uuid::now_v7()));
        Storage::open(&tmp).await.expect("open test db")
    }

    #[tokio::test]
    async fn open_and_migrate() {
        let storage = test_storage().await;
        let version = storage.get_schema_version().await;
        assert_eq!(version, 1);
    }

    #[tokio::test]
    async fn idempotent_migration() {
        let tmp = std::env::temp_dir().join(format!("ff_test_{}.db", Uuid::now_v7()));
        let s1 = Storage::open(&tmp).await.expect("first open");
        s1.set("formData", "{}").await.expect("set");
        drop(s1);

        let s2 = Storage::open(&tmp).await.expect("second open");
        assert_eq!(s2.get_schema_version().await, 1);
        assert_eq!(s2.get("formData").await.unwrap().as_deref(), Some("{}"));
    }

    #[tokio::test]
    async fn get_missing_key_is_none() {
        let storage = test_storage().await;
        assert!(storage.get("formData").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn set_replaces_previous_value() {
        let storage = test_storage().await;
        storage.set("formData", r#"{"a":"1"}"#).await.unwrap();
        let first = storage.get_entry("formData").await.unwrap().expect("entry");

        storage.set("formData", r#"{"a":"2"}"#).await.unwrap();
        let second = storage.get_entry("formData").await.unwrap().expect("entry");

        assert_eq!(second.value, r#"{"a":"2"}"#);
        assert!(second.updated_at >= first.updated_at);
    }
}
