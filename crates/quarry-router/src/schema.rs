//! Schema descriptions handed to the reasoning service.

use std::sync::Arc;
use std::time::Duration;

use quarry_cache::{Clock, Ttl, TtlCache};
use quarry_core::Partition;

/// Per-partition description cache with a fixed lifetime.
#[derive(Debug)]
pub struct SchemaCache {
    descriptions: TtlCache<String, String>,
    ttl: Duration,
}

impl SchemaCache {
    #[must_use]
    pub fn new(ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            descriptions: TtlCache::with_clock(clock),
            ttl,
        }
    }

    /// Describe exactly the given partitions, one block each.
    #[must_use]
    pub fn describe(&self, partitions: &[Partition]) -> String {
        partitions
            .iter()
            .map(|p| {
                if let Some(hit) = self.descriptions.get(&p.name) {
                    return hit;
                }
                let text = describe_partition(p);
                self.descriptions
                    .put(p.name.clone(), text.clone(), Ttl::For(self.ttl));
                text
            })
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    pub fn invalidate_all(&self) {
        self.descriptions.invalidate_all();
    }

    #[must_use]
    pub fn entry_count(&self) -> usize {
        self.descriptions.entry_count()
    }
}

/// `Table: <name>\nColumns: <c1>, <c2>`; unknown columns are marked.
#[must_use]
pub fn describe_partition(partition: &Partition) -> String {
    let columns = if partition.columns.is_empty() {
        "(unknown)".to_string()
    } else {
        partition.columns.join(", ")
    };
    format!("Table: {}\nColumns: {columns}", partition.name)
}
