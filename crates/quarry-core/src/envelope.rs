//! Classification results and the answer envelope returned to callers.

use serde::{Deserialize, Serialize};

use crate::enums::{AnswerMode, Outcome, Provenance, Route};
use crate::query::Rejection;
use crate::role::Role;

/// Reply given when no document answers the question.
pub const NO_ANSWER: &str = "I couldn't find an answer in the documents.";

/// Reply given when a structured query succeeds with zero rows.
pub const NO_ROWS: &str = "Query executed, but no results found.";

/// Verdict of the query classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassificationResult {
    pub route: Route,
    pub provenance: Provenance,
    /// The counting-phrase correction forced `Structured` after classification.
    #[serde(default)]
    pub counting_override: bool,
}

impl ClassificationResult {
    #[must_use]
    pub const fn new(route: Route, provenance: Provenance) -> Self {
        Self {
            route,
            provenance,
            counting_override: false,
        }
    }
}

/// Why the structured path was abandoned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FallbackReason {
    /// The role may not read any partition.
    NoAccessiblePartitions,
    /// The generated query failed validation.
    Rejected { rejection: Rejection },
    /// The reasoning service or the tabular engine failed.
    ServiceFailure { service: String, message: String },
}

/// The unit returned to the caller for every question.
///
/// `mode` always names the path that produced `answer`; `used_fallback` is
/// set only when that path differs from the one the classifier chose.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnswerEnvelope {
    pub role: Role,
    pub answer: String,
    pub mode: AnswerMode,
    pub used_fallback: bool,
    pub outcome: Outcome,
    /// Route selected by classification (before any fallback).
    pub attempted: Route,
    pub classification: ClassificationResult,
    /// The validated statement, for structured answers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_query: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fallback_reason: Option<FallbackReason>,
    /// Source identifiers of the documents behind an unstructured answer.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sources: Vec<String>,
    /// Served from the answer cache.
    #[serde(default)]
    pub cached: bool,
}

impl AnswerEnvelope {
    /// The route that actually produced the answer.
    #[must_use]
    pub const fn route(&self) -> Route {
        self.mode.route()
    }

    #[must_use]
    pub fn is_answered(&self) -> bool {
        self.outcome == Outcome::Answered
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn envelope_serializes_mode_and_skips_empty_fields() {
        let envelope = AnswerEnvelope {
            role: Role::new("Finance").unwrap(),
            answer: "42".into(),
            mode: AnswerMode::StructuredFallback,
            used_fallback: true,
            outcome: Outcome::Answered,
            attempted: Route::Structured,
            classification: ClassificationResult::new(Route::Structured, Provenance::RuleBased),
            source_query: None,
            fallback_reason: Some(FallbackReason::NoAccessiblePartitions),
            sources: Vec::new(),
            cached: false,
        };
        let json = serde_json::to_value(&envelope).unwrap();
        assert_eq!(json["mode"], "structured_fallback");
        assert_eq!(json["role"], "finance");
        assert_eq!(json["fallback_reason"]["kind"], "no_accessible_partitions");
        assert!(json.get("source_query").is_none());
        assert!(json.get("sources").is_none());
        assert_eq!(envelope.route(), Route::Unstructured);
    }
}
