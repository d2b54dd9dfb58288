//! Partitions: named tabular relations owned by a role label.

use serde::{Deserialize, Serialize};

use crate::role::canonicalize;

/// A structured-data relation visible to one role label.
///
/// Created by ingestion (outside this workspace's core) and read-only to the
/// router. `columns` keeps header order and may be empty when unknown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Partition {
    /// Relation name as the tabular engine knows it.
    pub name: String,
    /// Owning-role label in canonical form.
    pub label: String,
    /// Ordered column names.
    #[serde(default)]
    pub columns: Vec<String>,
}

impl Partition {
    /// Build a partition, canonicalizing the owning label.
    #[must_use]
    pub fn new(name: impl Into<String>, label: &str, columns: Vec<String>) -> Self {
        Self {
            name: name.into(),
            label: canonicalize(label),
            columns,
        }
    }

    /// Whether the partition carries `label` (canonical comparison).
    #[must_use]
    pub fn is_labeled(&self, label: &str) -> bool {
        self.label == canonicalize(label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn label_is_canonicalized() {
        let partition = Partition::new("hr_data", " HR ", vec!["id".into()]);
        assert_eq!(partition.label, "hr");
        assert!(partition.is_labeled("Hr"));
        assert!(!partition.is_labeled("general"));
    }
}
