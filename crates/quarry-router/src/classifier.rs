//! Structured vs. unstructured intent detection.

use std::sync::{Arc, LazyLock};
use std::time::Duration;

use quarry_cache::BoundedCache;
use quarry_core::{ClassificationResult, Provenance, ReasoningService, Route};
use regex::Regex;
use sha2::{Digest, Sha256};

use crate::{normalize_question, rules};

/// Cardinality phrasings that always force the structured route.
static COUNTING: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\bhow\s+many\b|\bcount\s").expect("counting pattern is valid regex")
});

/// Whether the counting override applies to `question`.
#[must_use]
pub fn is_counting_question(question: &str) -> bool {
    COUNTING.is_match(question)
}

/// Classifier with a bounded verdict cache for reasoning-service calls.
pub struct QueryClassifier {
    reasoning: Arc<dyn ReasoningService>,
    verdicts: BoundedCache<String, Route>,
    timeout: Duration,
    inconclusive_route: Route,
}

impl QueryClassifier {
    pub fn new(
        reasoning: Arc<dyn ReasoningService>,
        capacity: u64,
        timeout: Duration,
        inconclusive_route: Route,
    ) -> Self {
        Self {
            reasoning,
            verdicts: BoundedCache::new(capacity),
            timeout,
            inconclusive_route,
        }
    }

    /// Classify `question`. Never fails.
    ///
    /// 1. The rule table decides when it can.
    /// 2. Otherwise a cached or fresh reasoning-service verdict is used.
    ///    A failed or timed-out call falls back to the configured
    ///    inconclusive route and is not cached.
    /// 3. Counting phrasings then force [`Route::Structured`].
    pub async fn classify(&self, question: &str) -> ClassificationResult {
        let mut result = match rules::rule_pass(question) {
            Some(route) => {
                tracing::debug!(route = %route, "rule pass decided");
                ClassificationResult::new(route, Provenance::RuleBased)
            }
            None => self.ask_reasoning(question).await,
        };

        if result.route != Route::Structured && is_counting_question(question) {
            tracing::debug!(from = %result.route, "counting override");
            result.route = Route::Structured;
            result.counting_override = true;
        }
        result
    }

    async fn ask_reasoning(&self, question: &str) -> ClassificationResult {
        let key = cache_key(question);
        if let Some(route) = self.verdicts.get(&key) {
            tracing::debug!(route = %route, "cached reasoning verdict");
            return ClassificationResult::new(route, Provenance::ReasoningService);
        }

        match tokio::time::timeout(self.timeout, self.reasoning.classify(question)).await {
            Ok(Ok(route)) => {
                self.verdicts.insert(key, route);
                tracing::debug!(route = %route, "reasoning verdict");
                ClassificationResult::new(route, Provenance::ReasoningService)
            }
            Ok(Err(e)) => {
                tracing::warn!(%e, default = %self.inconclusive_route, "classification failed, using default route");
                ClassificationResult::new(self.inconclusive_route, Provenance::DefaultPolicy)
            }
            Err(_) => {
                tracing::warn!(
                    timeout_ms = u64::try_from(self.timeout.as_millis()).unwrap_or(u64::MAX),
                    default = %self.inconclusive_route,
                    "classification timed out, using default route"
                );
                ClassificationResult::new(self.inconclusive_route, Provenance::DefaultPolicy)
            }
        }
    }

    /// Forget every cached reasoning verdict.
    pub fn invalidate_verdicts(&self) {
        self.verdicts.invalidate_all();
    }

    #[must_use]
    pub fn cached_verdicts(&self) -> u64 {
        self.verdicts.entry_count()
    }
}

impl std::fmt::Debug for QueryClassifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueryClassifier")
            .field("timeout", &self.timeout)
            .field("inconclusive_route", &self.inconclusive_route)
            .finish_non_exhaustive()
    }
}

fn cache_key(question: &str) -> String {
    hex::encode(Sha256::digest(normalize_question(question).as_bytes()))
}
