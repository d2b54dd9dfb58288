use std::sync::Arc;

use anyhow::Context;
use quarry_config::QuarryConfig;
use quarry_core::{PartitionCatalog, ReasoningService, RetrievalStore, TabularEngine};
use quarry_lake::QuarryLake;
use quarry_llm::OllamaClient;
use quarry_router::{Router, RouterDeps};

/// Shared application resources initialized once at startup.
pub struct AppContext {
    pub lake: QuarryLake,
    pub router: Router,
}

impl AppContext {
    /// Open the lake and wire it, with the reasoning client, into a router.
    pub fn init(config: &QuarryConfig, lake_override: Option<&str>) -> anyhow::Result<Self> {
        let lake_path = lake_override.unwrap_or(&config.lake.path).to_string();
        let lake = QuarryLake::open_local(&lake_path)
            .with_context(|| format!("failed to open lake at {lake_path}"))?;
        let reasoning = OllamaClient::from_config(&config.reasoning)
            .context("failed to build reasoning service client")?;

        let shared = Arc::new(lake.clone());
        let deps = RouterDeps {
            reasoning: Arc::new(reasoning) as Arc<dyn ReasoningService>,
            engine: Arc::clone(&shared) as Arc<dyn TabularEngine>,
            store: Arc::clone(&shared) as Arc<dyn RetrievalStore>,
            catalog: shared as Arc<dyn PartitionCatalog>,
        };
        let router = Router::new(deps, config);
        tracing::debug!(lake = %lake_path, "application context ready");

        Ok(Self {
            lake,
            router,
        })
    }
}
