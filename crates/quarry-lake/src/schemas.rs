//! `DuckDB` table DDL for the lake's bookkeeping tables.

/// Partition catalog: one row per ingested relation.
///
/// `columns` holds a JSON array of column names in table order.
pub const CREATE_TABLES_METADATA: &str = "
CREATE TABLE IF NOT EXISTS tables_metadata (
    table_name TEXT NOT NULL,
    role TEXT NOT NULL,
    columns TEXT NOT NULL DEFAULT '[]',
    registered_at TIMESTAMP DEFAULT current_timestamp,
    PRIMARY KEY (table_name)
);
";

/// Chunked documents with their visibility label.
pub const CREATE_DOCUMENTS: &str = "
CREATE TABLE IF NOT EXISTS documents (
    id TEXT NOT NULL,
    source TEXT NOT NULL,
    role TEXT NOT NULL,
    chunk_index INTEGER NOT NULL,
    content TEXT NOT NULL,
    PRIMARY KEY (id)
);
";

pub const CREATE_INDEXES: &str = "
CREATE INDEX IF NOT EXISTS idx_documents_role ON documents(role);
CREATE INDEX IF NOT EXISTS idx_tables_metadata_role ON tables_metadata(role);
";
