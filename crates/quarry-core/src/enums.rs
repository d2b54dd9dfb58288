//! Routing enums, classification provenance, and answer modes.
//!
//! All enums use `snake_case` serialization via `#[serde(rename_all = "snake_case")]`
//! and expose `as_str()` for logs and display.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::CoreError;

// ---------------------------------------------------------------------------
// Route
// ---------------------------------------------------------------------------

/// The two answer paths.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Route {
    /// Tabular engine over role-scoped partitions.
    Structured,
    /// Retrieval over role-scoped documents plus a generated answer.
    Unstructured,
}

impl Route {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Structured => "structured",
            Self::Unstructured => "unstructured",
        }
    }

    /// The path name the reasoning service uses for this route.
    #[must_use]
    pub const fn verdict(self) -> &'static str {
        match self {
            Self::Structured => "SQL",
            Self::Unstructured => "RAG",
        }
    }

    /// Interpret a free-form verdict from the reasoning service.
    ///
    /// Anything mentioning `SQL` is structured; everything else is unstructured.
    #[must_use]
    pub fn from_verdict(raw: &str) -> Self {
        if raw.to_uppercase().contains("SQL") {
            Self::Structured
        } else {
            Self::Unstructured
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Route {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "structured" | "sql" => Ok(Self::Structured),
            "unstructured" | "rag" => Ok(Self::Unstructured),
            _ => Err(CoreError::UnknownValue {
                kind: "route",
                value: s.to_string(),
            }),
        }
    }
}

// ---------------------------------------------------------------------------
// Provenance
// ---------------------------------------------------------------------------

/// Which stage of the classifier produced a verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Provenance {
    /// The deterministic rule table decided.
    RuleBased,
    /// The reasoning service decided (fresh or cached verdict).
    ReasoningService,
    /// Rules were inconclusive and the reasoning service failed; the
    /// configured default route was used.
    DefaultPolicy,
}

impl Provenance {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::RuleBased => "rule_based",
            Self::ReasoningService => "reasoning_service",
            Self::DefaultPolicy => "default_policy",
        }
    }
}

impl fmt::Display for Provenance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// AnswerDetail
// ---------------------------------------------------------------------------

/// Verbosity requested for unstructured answers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnswerDetail {
    #[default]
    Brief,
    Extended,
}

impl AnswerDetail {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Brief => "brief",
            Self::Extended => "extended",
        }
    }
}

impl fmt::Display for AnswerDetail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AnswerDetail {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "brief" => Ok(Self::Brief),
            "extended" => Ok(Self::Extended),
            _ => Err(CoreError::UnknownValue {
                kind: "answer detail",
                value: s.to_string(),
            }),
        }
    }
}

// ---------------------------------------------------------------------------
// AnswerMode
// ---------------------------------------------------------------------------

/// The path that actually produced an answer.
///
/// ```text
/// Structured                 classified structured, answered structured
/// Unstructured               classified unstructured, answered from role scope
/// GeneralFallback            classified unstructured, answered from general scope
/// StructuredFallback         classified structured, answered from role scope
/// StructuredGeneralFallback  classified structured, answered from general scope
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnswerMode {
    Structured,
    Unstructured,
    GeneralFallback,
    StructuredFallback,
    StructuredGeneralFallback,
}

impl AnswerMode {
    /// Mode for an unstructured answer given the classified route and
    /// whether the general scope produced it.
    #[must_use]
    pub const fn unstructured(attempted: Route, via_general: bool) -> Self {
        match (attempted, via_general) {
            (Route::Structured, false) => Self::StructuredFallback,
            (Route::Structured, true) => Self::StructuredGeneralFallback,
            (Route::Unstructured, false) => Self::Unstructured,
            (Route::Unstructured, true) => Self::GeneralFallback,
        }
    }

    /// The route that produced the answer.
    #[must_use]
    pub const fn route(self) -> Route {
        match self {
            Self::Structured => Route::Structured,
            Self::Unstructured
            | Self::GeneralFallback
            | Self::StructuredFallback
            | Self::StructuredGeneralFallback => Route::Unstructured,
        }
    }

    /// Human-readable label shown to callers.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Structured => "SQL",
            Self::Unstructured => "RAG",
            Self::GeneralFallback => "RAG → general fallback",
            Self::StructuredFallback => "SQL → RAG fallback",
            Self::StructuredGeneralFallback => "SQL → RAG → general fallback",
        }
    }
}

impl fmt::Display for AnswerMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ---------------------------------------------------------------------------
// Outcome
// ---------------------------------------------------------------------------

/// Whether the envelope carries a real answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Answered,
    /// Every applicable path ran and none produced an answer.
    Empty,
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case("SQL", Route::Structured)]
    #[case("  sql\n", Route::Structured)]
    #[case("The answer is SQL.", Route::Structured)]
    #[case("RAG", Route::Unstructured)]
    #[case("I am not sure", Route::Unstructured)]
    #[case("", Route::Unstructured)]
    fn verdict_parsing(#[case] raw: &str, #[case] expected: Route) {
        assert_eq!(Route::from_verdict(raw), expected);
    }

    #[test]
    fn route_from_str_accepts_aliases() {
        assert_eq!("SQL".parse::<Route>().unwrap(), Route::Structured);
        assert_eq!("unstructured".parse::<Route>().unwrap(), Route::Unstructured);
        assert!("maybe".parse::<Route>().is_err());
    }

    #[rstest]
    #[case(Route::Structured, false, AnswerMode::StructuredFallback)]
    #[case(Route::Structured, true, AnswerMode::StructuredGeneralFallback)]
    #[case(Route::Unstructured, false, AnswerMode::Unstructured)]
    #[case(Route::Unstructured, true, AnswerMode::GeneralFallback)]
    fn unstructured_modes_never_name_structured(
        #[case] attempted: Route,
        #[case] via_general: bool,
        #[case] expected: AnswerMode,
    ) {
        let mode = AnswerMode::unstructured(attempted, via_general);
        assert_eq!(mode, expected);
        assert_eq!(mode.route(), Route::Unstructured);
        assert_ne!(mode.label(), AnswerMode::Structured.label());
    }

    #[test]
    fn structured_fallback_label() {
        assert_eq!(AnswerMode::StructuredFallback.to_string(), "SQL → RAG fallback");
    }

    #[test]
    fn detail_defaults_to_brief() {
        assert_eq!(AnswerDetail::default(), AnswerDetail::Brief);
        assert_eq!("Extended".parse::<AnswerDetail>().unwrap(), AnswerDetail::Extended);
    }
}
