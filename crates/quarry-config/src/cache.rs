//! Cache lifetimes and bounds.

use std::time::Duration;

use serde::{Deserialize, Serialize};

const fn default_credential_ttl_secs() -> u64 {
    300
}

const fn default_answer_ttl_secs() -> u64 {
    300
}

const fn default_schema_ttl_secs() -> u64 {
    600
}

const fn default_classifier_capacity() -> u64 {
    1024
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CacheConfig {
    /// How long a verified user record is trusted.
    #[serde(default = "default_credential_ttl_secs")]
    pub credential_ttl_secs: u64,

    /// How long a per-question answer is served from cache.
    #[serde(default = "default_answer_ttl_secs")]
    pub answer_ttl_secs: u64,

    /// How long a partition's schema description is reused.
    #[serde(default = "default_schema_ttl_secs")]
    pub schema_ttl_secs: u64,

    /// Maximum number of cached classification verdicts.
    #[serde(default = "default_classifier_capacity")]
    pub classifier_capacity: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            credential_ttl_secs: default_credential_ttl_secs(),
            answer_ttl_secs: default_answer_ttl_secs(),
            schema_ttl_secs: default_schema_ttl_secs(),
            classifier_capacity: default_classifier_capacity(),
        }
    }
}

impl CacheConfig {
    #[must_use]
    pub const fn credential_ttl(&self) -> Duration {
        Duration::from_secs(self.credential_ttl_secs)
    }

    #[must_use]
    pub const fn answer_ttl(&self) -> Duration {
        Duration::from_secs(self.answer_ttl_secs)
    }

    #[must_use]
    pub const fn schema_ttl(&self) -> Duration {
        Duration::from_secs(self.schema_ttl_secs)
    }
}
