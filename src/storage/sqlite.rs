use async_trait::async_trait;
use chrono::Utc;
use log::debug;
use rusqlite::{params, Connection, ErrorCode, OptionalExtension};
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use super::DocumentStore;
use crate::api::deserializers::value_to_string;
use crate::error::{Result, TourError};

const URI_SCHEME: &str = "sqlite://";

/// SQLite-backed document store: one `(id, doc, updated_at)` table per collection.
///
/// The connection is held from `open` until `close`.
#[derive(Debug, Clone)]
pub struct SqliteStore {
    db_path: PathBuf,
    conn: Arc<Mutex<Option<Connection>>>,
}

/// Resolve a connection string to a database file.
///
/// `sqlite://<path>` and bare paths are accepted; a directory gets
/// `<database>.sqlite3` inside it.
pub fn resolve_path(uri: &str, database: &str) -> PathBuf {
    let raw = uri.strip_prefix(URI_SCHEME).unwrap_or(uri);
    let path = PathBuf::from(raw);
    if raw.ends_with('/') || path.is_dir() {
        path.join(format!("{}.sqlite3", database))
    } else {
        path
    }
}

fn store_error(context: &str, e: rusqlite::Error) -> TourError {
    if let rusqlite::Error::SqliteFailure(failure, _) = &e {
        if matches!(
            failure.code,
            ErrorCode::DatabaseBusy | ErrorCode::DatabaseLocked
        ) {
            return TourError::StoreDisconnected(format!("{}: {}", context, e));
        }
    }
    TourError::Store(format!("{}: {}", context, e))
}

/// Collection names become table names, so only `[A-Za-z0-9_]` is allowed
fn validate_collection(collection: &str) -> Result<()> {
    let valid = !collection.is_empty()
        && collection
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_');
    if valid {
        Ok(())
    } else {
        Err(TourError::Store(format!(
            "Invalid collection name '{}'",
            collection
        )))
    }
}

fn table_exists(conn: &Connection, table: &str) -> Result<bool> {
    conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?1)",
        params![table],
        |row| row.get(0),
    )
    .map_err(|e| store_error("Failed to inspect store", e))
}

fn document_rows(documents: &[Value]) -> Result<Vec<(String, String)>> {
    documents
        .iter()
        .map(|doc| {
            let id = doc.get("id").map(value_to_string).unwrap_or_default();
            if id.is_empty() {
                return Err(TourError::Store("Document without id".to_string()));
            }
            Ok((id, serde_json::to_string(doc)?))
        })
        .collect()
}

impl SqliteStore {
    /// Open (creating if needed) the database named by a connection string
    pub async fn open(uri: &str, database: &str) -> Result<Self> {
        let db_path = resolve_path(uri, database);
        let path = db_path.clone();

        let conn = tokio::task::spawn_blocking(move || -> Result<Connection> {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent)?;
            }
            let conn = Connection::open(&path)
                .map_err(|e| store_error("Failed to open store database", e))?;
            conn.busy_timeout(std::time::Duration::from_secs(5))
                .map_err(|e| store_error("Failed to configure store database", e))?;
            Ok(conn)
        })
        .await
        .map_err(|e| TourError::Other(format!("Failed to spawn store open: {}", e)))??;

        debug!("Opened store at {}", db_path.display());
        Ok(Self {
            db_path,
            conn: Arc::new(Mutex::new(Some(conn))),
        })
    }

    pub fn path(&self) -> &Path {
        &self.db_path
    }

    /// Fetch one stored document by id
    pub async fn get(&self, collection: &str, id: &str) -> Result<Option<Value>> {
        validate_collection(collection)?;
        let table = collection.to_string();
        let id = id.to_string();
        self.with_connection(move |conn| {
            if !table_exists(conn, &table)? {
                return Ok(None);
            }
            let text: Option<String> = conn
                .query_row(
                    &format!("SELECT doc FROM {} WHERE id = ?1", table),
                    params![id],
                    |row| row.get(0),
                )
                .optional()
                .map_err(|e| store_error("Failed to read document", e))?;
            Ok(text.map(|t| serde_json::from_str(&t)).transpose()?)
        })
        .await
    }

    async fn with_connection<T, F>(&self, f: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&mut Connection) -> Result<T> + Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || -> Result<T> {
            let mut guard = conn
                .lock()
                .map_err(|_| TourError::Store("Store connection poisoned".to_string()))?;
            let conn = guard
                .as_mut()
                .ok_or_else(|| TourError::Store("Store is closed".to_string()))?;
            f(conn)
        })
        .await
        .map_err(|e| TourError::Other(format!("Failed to spawn store operation: {}", e)))?
    }
}

#[async_trait]
impl DocumentStore for SqliteStore {
    async fn bulk_upsert(&self, collection: &str, documents: &[Value]) -> Result<u64> {
        validate_collection(collection)?;
        let rows = document_rows(documents)?;
        let table = collection.to_string();

        self.with_connection(move |conn| {
            conn.execute(
                &format!(
                    "CREATE TABLE IF NOT EXISTS {} (
                        id TEXT PRIMARY KEY,
                        doc TEXT NOT NULL,
                        updated_at TEXT NOT NULL
                    )",
                    table
                ),
                [],
            )
            .map_err(|e| store_error("Failed to create collection", e))?;

            let tx = conn
                .transaction()
                .map_err(|e| store_error("Failed to begin batch", e))?;
            let now = Utc::now().to_rfc3339();
            let mut changed = 0u64;
            {
                let mut stmt = tx
                    .prepare(&format!(
                        "INSERT INTO {table} (id, doc, updated_at) VALUES (?1, ?2, ?3)
                         ON CONFLICT(id) DO UPDATE SET doc = excluded.doc, updated_at = excluded.updated_at
                         WHERE {table}.doc <> excluded.doc",
                        table = table
                    ))
                    .map_err(|e| store_error("Failed to prepare upsert", e))?;
                for (id, doc) in &rows {
                    changed += stmt
                        .execute(params![id, doc, now])
                        .map_err(|e| store_error("Failed to upsert document", e))?
                        as u64;
                }
            }
            tx.commit()
                .map_err(|e| store_error("Failed to commit batch", e))?;
            Ok(changed)
        })
        .await
    }

    async fn close(&self) -> Result<()> {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || -> Result<()> {
            let mut guard = conn
                .lock()
                .map_err(|_| TourError::Store("Store connection poisoned".to_string()))?;
            if let Some(conn) = guard.take() {
                conn.close()
                    .map_err(|(_, e)| store_error("Failed to close store", e))?;
            }
            Ok(())
        })
        .await
        .map_err(|e| TourError::Other(format!("Failed to spawn store close: {}", e)))?
    }
}
