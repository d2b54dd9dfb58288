//! Local `DuckDB` lake configuration.

use serde::{Deserialize, Serialize};

fn default_path() -> String {
    String::from(".quarry/lake.duckdb")
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LakeConfig {
    /// Database file holding partitions, metadata, and documents.
    #[serde(default = "default_path")]
    pub path: String,
}

impl Default for LakeConfig {
    fn default() -> Self {
        Self {
            path: default_path(),
        }
    }
}
