//! Reasoning service configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

fn default_base_url() -> String {
    String::from("http://localhost:11434")
}

fn default_model() -> String {
    String::from("llama3.1")
}

const fn default_num_predict() -> u32 {
    256
}

const fn default_classify_timeout_secs() -> u64 {
    30
}

const fn default_long_timeout_secs() -> u64 {
    120
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ReasoningConfig {
    /// Base URL of the generate endpoint host.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Model name passed with every request.
    #[serde(default = "default_model")]
    pub model: String,

    /// Sampling temperature. Zero keeps verdicts deterministic.
    #[serde(default)]
    pub temperature: f32,

    /// Upper bound on generated tokens.
    #[serde(default = "default_num_predict")]
    pub num_predict: u32,

    /// Deadline for the classification escape hatch.
    #[serde(default = "default_classify_timeout_secs")]
    pub classify_timeout_secs: u64,

    /// Deadline for query generation.
    #[serde(default = "default_long_timeout_secs")]
    pub generate_timeout_secs: u64,

    /// Deadline for answer generation.
    #[serde(default = "default_long_timeout_secs")]
    pub answer_timeout_secs: u64,
}

impl Default for ReasoningConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            model: default_model(),
            temperature: 0.0,
            num_predict: default_num_predict(),
            classify_timeout_secs: default_classify_timeout_secs(),
            generate_timeout_secs: default_long_timeout_secs(),
            answer_timeout_secs: default_long_timeout_secs(),
        }
    }
}

impl ReasoningConfig {
    /// Check if the config names an endpoint and a model.
    #[must_use]
    pub fn is_configured(&self) -> bool {
        !self.base_url.is_empty() && !self.model.is_empty()
    }

    #[must_use]
    pub const fn classify_timeout(&self) -> Duration {
        Duration::from_secs(self.classify_timeout_secs)
    }

    #[must_use]
    pub const fn generate_timeout(&self) -> Duration {
        Duration::from_secs(self.generate_timeout_secs)
    }

    #[must_use]
    pub const fn answer_timeout(&self) -> Duration {
        Duration::from_secs(self.answer_timeout_secs)
    }
}
