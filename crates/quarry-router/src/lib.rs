//! # quarry-router
//!
//! Decides how each question is answered and enforces the structured-data
//! boundary while doing so.
//!
//! - [`rules`]: the ordered, data-driven rule table used before any
//!   reasoning-service call
//! - [`QueryClassifier`]: rule pass, cached reasoning verdicts, counting
//!   override
//! - [`validate`]: read-only, in-scope, placeholder-free checks for generated
//!   statements
//! - [`Router`]: the request state machine with structured-to-unstructured
//!   and role-to-general fallback, plus the cache invalidation surface
//! - [`AdminEvent`]: administrative mutations mapped to invalidations

pub mod classifier;
pub mod events;
pub mod orchestrator;
pub mod plan;
pub mod rules;
pub mod schema;
pub mod validator;

pub use classifier::QueryClassifier;
pub use events::AdminEvent;
pub use orchestrator::{Router, RouterDeps};
pub use plan::RetrievalPlan;
pub use validator::validate;

/// Lower-case, whitespace-collapsed form of a question, used in cache keys.
#[must_use]
pub fn normalize_question(question: &str) -> String {
    question
        .split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join(" ")
}
