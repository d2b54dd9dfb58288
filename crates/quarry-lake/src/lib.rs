//! # quarry-lake
//!
//! Local `DuckDB` storage for Quarry, covering three collaborator ports:
//!
//! - [`PartitionCatalog`](quarry_core::PartitionCatalog): relations ingested
//!   from CSV, labeled with an owning role in `tables_metadata`
//! - [`TabularEngine`](quarry_core::TabularEngine): read-only statement
//!   execution on a blocking worker
//! - [`RetrievalStore`](quarry_core::RetrievalStore): chunked documents with
//!   lexical term scoring

pub mod catalog;
pub mod documents;
pub mod engine;
pub mod error;
pub mod schemas;

pub use error::LakeError;

use std::path::Path;
use std::sync::Arc;

use duckdb::Connection;
use parking_lot::Mutex;

/// Shared handle to the lake database.
///
/// Clones share one connection; every statement runs under its mutex, so
/// callers on async tasks go through `spawn_blocking`.
#[derive(Clone)]
pub struct QuarryLake {
    conn: Arc<Mutex<Connection>>,
}

impl QuarryLake {
    /// Open or create a lake file, creating parent directories as needed.
    ///
    /// # Errors
    ///
    /// Returns [`LakeError::Io`] if the parent directory cannot be created and
    /// [`LakeError::DuckDb`] if the file cannot be opened or schema creation
    /// fails.
    pub fn open_local(path: impl AsRef<Path>) -> Result<Self, LakeError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let lake = Self::from_connection(Connection::open(path)?);
        lake.init_schema()?;
        tracing::debug!(path = %path.display(), "lake opened");
        Ok(lake)
    }

    /// Open an in-memory lake (for testing).
    ///
    /// # Errors
    ///
    /// Returns [`LakeError::DuckDb`] if schema creation fails.
    pub fn open_in_memory() -> Result<Self, LakeError> {
        let lake = Self::from_connection(Connection::open_in_memory()?);
        lake.init_schema()?;
        Ok(lake)
    }

    fn from_connection(conn: Connection) -> Self {
        Self {
            conn: Arc::new(Mutex::new(conn)),
        }
    }

    fn init_schema(&self) -> Result<(), LakeError> {
        let conn = self.conn.lock();
        conn.execute_batch(schemas::CREATE_TABLES_METADATA)?;
        conn.execute_batch(schemas::CREATE_DOCUMENTS)?;
        conn.execute_batch(schemas::CREATE_INDEXES)?;
        Ok(())
    }

    /// Run `f` with this lake on a blocking worker thread.
    async fn blocking<T, F>(&self, f: F) -> Result<T, LakeError>
    where
        T: Send + 'static,
        F: FnOnce(&Self) -> Result<T, LakeError> + Send + 'static,
    {
        let lake = self.clone();
        tokio::task::spawn_blocking(move || f(&lake))
            .await
            .map_err(|e| LakeError::Worker(e.to_string()))?
    }
}

impl std::fmt::Debug for QuarryLake {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QuarryLake").finish_non_exhaustive()
    }
}
