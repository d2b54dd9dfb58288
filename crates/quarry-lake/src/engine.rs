//! Read-only statement execution.

use async_trait::async_trait;
use duckdb::types::Value;
use quarry_core::{QueryRows, ServiceError, TabularEngine};

use crate::{LakeError, QuarryLake};

impl QuarryLake {
    /// Run a SELECT statement and render every cell as text.
    ///
    /// # Errors
    ///
    /// Returns [`LakeError::NotReadOnly`] unless the statement starts with
    /// `select`, and [`LakeError::DuckDb`] if it fails to run.
    pub fn execute_select(&self, statement: &str) -> Result<QueryRows, LakeError> {
        if !statement.trim_start().to_lowercase().starts_with("select") {
            return Err(LakeError::NotReadOnly);
        }

        let conn = self.conn.lock();
        let mut stmt = conn.prepare(statement)?;
        let mut rows = stmt.query([])?;
        let columns: Vec<String> = rows
            .as_ref()
            .map(|s| s.column_names())
            .unwrap_or_default();

        let mut out = Vec::new();
        while let Some(row) = rows.next()? {
            let mut cells = Vec::with_capacity(columns.len());
            for i in 0..columns.len() {
                cells.push(render(row.get::<_, Value>(i)?));
            }
            out.push(cells);
        }

        Ok(QueryRows { columns, rows: out })
    }
}

fn render(value: Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::Boolean(b) => b.to_string(),
        Value::TinyInt(n) => n.to_string(),
        Value::SmallInt(n) => n.to_string(),
        Value::Int(n) => n.to_string(),
        Value::BigInt(n) => n.to_string(),
        Value::HugeInt(n) => n.to_string(),
        Value::UTinyInt(n) => n.to_string(),
        Value::USmallInt(n) => n.to_string(),
        Value::UInt(n) => n.to_string(),
        Value::UBigInt(n) => n.to_string(),
        Value::Float(n) => n.to_string(),
        Value::Double(n) => n.to_string(),
        Value::Decimal(d) => d.to_string(),
        Value::Text(s) => s,
        other => format!("{other:?}"),
    }
}

#[async_trait]
impl TabularEngine for QuarryLake {
    async fn execute(&self, statement: &str) -> Result<QueryRows, ServiceError> {
        let statement = statement.to_string();
        Ok(self
            .blocking(move |lake| lake.execute_select(&statement))
            .await?)
    }
}
