//! Routing policy and collaborator deadlines.

use std::time::Duration;

use quarry_core::Route;
use serde::{Deserialize, Serialize};

const fn default_inconclusive_route() -> Route {
    Route::Unstructured
}

const fn default_timeout_secs() -> u64 {
    30
}

const fn default_brief_top_k() -> usize {
    2
}

const fn default_extended_top_k() -> usize {
    3
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RoutingConfig {
    /// Route used when the rule pass is inconclusive and the reasoning
    /// service cannot answer.
    #[serde(default = "default_inconclusive_route")]
    pub inconclusive_route: Route,

    /// Deadline for the tabular engine.
    #[serde(default = "default_timeout_secs")]
    pub execution_timeout_secs: u64,

    /// Deadline for the retrieval store.
    #[serde(default = "default_timeout_secs")]
    pub search_timeout_secs: u64,

    /// Documents retrieved for brief answers.
    #[serde(default = "default_brief_top_k")]
    pub brief_top_k: usize,

    /// Documents retrieved for extended answers.
    #[serde(default = "default_extended_top_k")]
    pub extended_top_k: usize,

    /// Documents retrieved for the administrative role.
    #[serde(default = "default_extended_top_k")]
    pub admin_top_k: usize,
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            inconclusive_route: default_inconclusive_route(),
            execution_timeout_secs: default_timeout_secs(),
            search_timeout_secs: default_timeout_secs(),
            brief_top_k: default_brief_top_k(),
            extended_top_k: default_extended_top_k(),
            admin_top_k: default_extended_top_k(),
        }
    }
}

impl RoutingConfig {
    #[must_use]
    pub const fn execution_timeout(&self) -> Duration {
        Duration::from_secs(self.execution_timeout_secs)
    }

    #[must_use]
    pub const fn search_timeout(&self) -> Duration {
        Duration::from_secs(self.search_timeout_secs)
    }
}
