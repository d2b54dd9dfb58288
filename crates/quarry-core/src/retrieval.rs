//! Document visibility filters, retrieved documents, and user records.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::role::canonicalize;

/// Which document-role labels a request may read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "scope", content = "labels", rename_all = "snake_case")]
pub enum VisibilityFilter {
    /// Every label (administrative role).
    All,
    /// Only the listed canonical labels.
    Labels(BTreeSet<String>),
}

impl VisibilityFilter {
    /// Filter over the given labels, canonicalized.
    #[must_use]
    pub fn labels<I, S>(labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self::Labels(
            labels
                .into_iter()
                .map(|l| canonicalize(l.as_ref()))
                .filter(|l| !l.is_empty())
                .collect(),
        )
    }

    /// Whether a document carrying `label` is visible.
    #[must_use]
    pub fn allows(&self, label: &str) -> bool {
        match self {
            Self::All => true,
            Self::Labels(allowed) => allowed.contains(&canonicalize(label)),
        }
    }
}

/// A ranked document returned by the retrieval store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetrievedDocument {
    /// Source identifier (file name, URL, chunk id).
    pub source: String,
    /// Visibility label the document carries.
    pub label: String,
    pub content: String,
    /// Store-specific relevance, higher is better.
    pub score: f64,
}

/// A user as the directory stores it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    pub username: String,
    /// Lower-case hex SHA-256 of the password.
    pub password_hash: String,
    /// Raw role identifier; canonicalized by the access layer.
    pub role: String,
}
