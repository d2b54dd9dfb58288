//! Partition catalog: CSV ingestion and role labels.

use std::path::Path;

use async_trait::async_trait;
use duckdb::params;
use quarry_core::role::canonicalize;
use quarry_core::{Partition, PartitionCatalog, ServiceError};

use crate::{LakeError, QuarryLake};

/// Relation name for a CSV file: lower-cased stem with `-` and spaces
/// replaced by `_`.
///
/// # Errors
///
/// Returns [`LakeError::InvalidTableName`] if the result is empty, starts
/// with a digit, or contains anything but ASCII letters, digits, and `_`.
pub fn table_name_for(path: &Path) -> Result<String, LakeError> {
    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or_default();
    let name = stem.trim().to_lowercase().replace(['-', ' '], "_");
    let valid = !name.is_empty()
        && !name.starts_with(|c: char| c.is_ascii_digit())
        && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
    if valid {
        Ok(name)
    } else {
        Err(LakeError::InvalidTableName(path.display().to_string()))
    }
}

impl QuarryLake {
    /// Create or replace a relation from a CSV file and label it with `role`.
    ///
    /// # Errors
    ///
    /// Returns [`LakeError::InvalidTableName`] for an unusable file name and
    /// [`LakeError::DuckDb`] if the file cannot be read.
    pub fn register_csv(&self, path: &Path, role: &str) -> Result<Partition, LakeError> {
        let table = table_name_for(path)?;
        let label = canonicalize(role);
        let literal = path.display().to_string().replace('\'', "''");

        let conn = self.conn.lock();
        conn.execute_batch(&format!(
            "CREATE OR REPLACE TABLE \"{table}\" AS SELECT * FROM read_csv_auto('{literal}')"
        ))?;

        let columns: Vec<String> = {
            let mut stmt = conn.prepare(
                "SELECT column_name FROM information_schema.columns
                 WHERE table_schema = 'main' AND table_name = ?
                 ORDER BY ordinal_position",
            )?;
            stmt.query_map(params![table], |row| row.get(0))?
                .collect::<Result<Vec<_>, _>>()?
        };
        let columns_json = serde_json::to_string(&columns).unwrap_or_else(|_| "[]".to_string());

        conn.execute(
            "INSERT OR REPLACE INTO tables_metadata (table_name, role, columns) VALUES (?, ?, ?)",
            params![table, label, columns_json],
        )?;

        tracing::info!(table = %table, role = %label, columns = columns.len(), "partition registered");
        Ok(Partition::new(table, &label, columns))
    }

    /// Every registered partition, ordered by name.
    ///
    /// # Errors
    ///
    /// Returns [`LakeError::DuckDb`] if the catalog cannot be read.
    pub fn list_partitions(&self) -> Result<Vec<Partition>, LakeError> {
        let conn = self.conn.lock();
        let mut stmt = conn
            .prepare("SELECT table_name, role, columns FROM tables_metadata ORDER BY table_name")?;
        let rows = stmt
            .query_map([], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                ))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(rows
            .into_iter()
            .map(|(name, role, columns)| {
                let columns: Vec<String> = serde_json::from_str(&columns).unwrap_or_default();
                Partition::new(name, &role, columns)
            })
            .collect())
    }

    /// Move every partition and document labeled `from` to `to`.
    ///
    /// Returns the number of relabeled partitions and document chunks.
    ///
    /// # Errors
    ///
    /// Returns [`LakeError::DuckDb`] if an update fails.
    pub fn relabel_role(&self, from: &str, to: &str) -> Result<usize, LakeError> {
        let (from, to) = (canonicalize(from), canonicalize(to));
        let mut conn = self.conn.lock();
        let tx = conn.transaction()?;
        let tables = tx.execute(
            "UPDATE tables_metadata SET role = ? WHERE role = ?",
            params![to, from],
        )?;
        let documents = tx.execute(
            "UPDATE documents SET role = ? WHERE role = ?",
            params![to, from],
        )?;
        tx.commit()?;
        tracing::info!(from = %from, to = %to, tables, documents, "role relabeled");
        Ok(tables + documents)
    }
}

#[async_trait]
impl PartitionCatalog for QuarryLake {
    async fn partitions(&self) -> Result<Vec<Partition>, ServiceError> {
        Ok(self.blocking(Self::list_partitions).await?)
    }
}
