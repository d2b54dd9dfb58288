//! The deterministic classification rule table.
//!
//! Rules are evaluated in order; the first whose `any_of` list matches and
//! whose `none_of` list does not match decides the route. Every entry is a
//! regex fragment matched case-insensitively on word boundaries.
//!
//! When no rule fires, the question is scored against two keyword lists;
//! see [`keyword_scores`].

use std::sync::LazyLock;

use quarry_core::Route;
use regex::Regex;

/// Phrasing that asks for prose from documents.
pub const DOCUMENT_PHRASES: &[&str] = &[
    "summari[sz]e",
    "summary of",
    "explain",
    "overview of",
    "describe",
    "tell me about",
    "what does .+ say",
    "according to",
    "guidelines? (?:for|on)",
];

/// Nouns that signal a record or numeric field, vetoing document phrasing.
pub const TABULAR_ENTITY_TERMS: &[&str] = &[
    "records?",
    "fields?",
    "columns?",
    "rows?",
    "salary",
    "salaries",
    "ratings?",
    "amounts?",
    "revenue",
    "budgets?",
    "percentage",
    "numeric",
    "figures",
];

/// Comparisons in words, record lookups, and aggregates.
pub const TABULAR_PHRASES: &[&str] = &[
    "greater than",
    "less than",
    "more than",
    "fewer than",
    "above",
    "below",
    "at least",
    "at most",
    "between \\d+",
    "equal to",
    "top \\d+",
    "how many",
    "counts?",
    "sum of",
    "average",
    "avg",
    "total",
    "minimum",
    "maximum",
    "min",
    "max",
    "highest",
    "lowest",
    "details of",
    "list all",
    "show me all",
    "show all",
    "employees (?:with|in|whose)",
];

/// Words that lean towards tabular data, for scoring.
pub const TABULAR_KEYWORDS: &[&str] = &[
    "employees?",
    "departments?",
    "salary",
    "salaries",
    "ratings?",
    "performance",
    "revenue",
    "sales",
    "budget",
    "expenses?",
    "quarter(?:ly)?",
    "numbers?",
    "data",
    "table",
    "list",
    "rank(?:ed|ing)?",
];

/// Words that lean towards documents, for scoring.
pub const DOCUMENT_KEYWORDS: &[&str] = &[
    "polic(?:y|ies)",
    "handbook",
    "guidelines?",
    "procedures?",
    "process",
    "mission",
    "vision",
    "values",
    "benefits",
    "culture",
    "leave",
    "onboarding",
    "conduct",
    "documents?",
    "reports?",
    "strategy",
];

/// A rule from the ordered table.
#[derive(Debug)]
pub struct Rule {
    pub name: &'static str,
    pub any_of: &'static [&'static str],
    pub none_of: &'static [&'static str],
    pub verdict: Route,
}

pub const RULES: &[Rule] = &[
    Rule {
        name: "document_phrasing",
        any_of: DOCUMENT_PHRASES,
        none_of: TABULAR_ENTITY_TERMS,
        verdict: Route::Unstructured,
    },
    Rule {
        name: "tabular_phrasing",
        any_of: TABULAR_PHRASES,
        none_of: &[],
        verdict: Route::Structured,
    },
];

/// Minimum keyword score that can decide a route.
pub const DECISIVE_SCORE: usize = 2;

struct CompiledRule {
    rule: &'static Rule,
    any_of: Regex,
    none_of: Option<Regex>,
}

fn alternation(fragments: &[&str]) -> Regex {
    let pattern = format!(r"(?i)\b(?:{})\b", fragments.join("|"));
    Regex::new(&pattern).expect("rule table patterns are valid regex")
}

fn words(fragments: &[&str]) -> Vec<Regex> {
    fragments
        .iter()
        .map(|f| Regex::new(&format!(r"(?i)\b(?:{f})\b")).expect("keyword patterns are valid regex"))
        .collect()
}

static COMPILED: LazyLock<Vec<CompiledRule>> = LazyLock::new(|| {
    RULES
        .iter()
        .map(|rule| CompiledRule {
            rule,
            any_of: alternation(rule.any_of),
            none_of: (!rule.none_of.is_empty()).then(|| alternation(rule.none_of)),
        })
        .collect()
});

static TABULAR_WORDS: LazyLock<Vec<Regex>> = LazyLock::new(|| words(TABULAR_KEYWORDS));
static DOCUMENT_WORDS: LazyLock<Vec<Regex>> = LazyLock::new(|| words(DOCUMENT_KEYWORDS));

/// The first rule that fires for `question`.
#[must_use]
pub fn matching_rule(question: &str) -> Option<&'static Rule> {
    COMPILED
        .iter()
        .find(|c| {
            c.any_of.is_match(question) && c.none_of.as_ref().is_none_or(|n| !n.is_match(question))
        })
        .map(|c| c.rule)
}

/// Number of distinct tabular and document keywords in `question`.
#[must_use]
pub fn keyword_scores(question: &str) -> (usize, usize) {
    let count = |set: &[Regex]| set.iter().filter(|re| re.is_match(question)).count();
    (count(&TABULAR_WORDS), count(&DOCUMENT_WORDS))
}

/// The rule pass: ordered rules, then keyword scoring.
///
/// `None` means inconclusive.
#[must_use]
pub fn rule_pass(question: &str) -> Option<Route> {
    if let Some(rule) = matching_rule(question) {
        return Some(rule.verdict);
    }
    match keyword_scores(question) {
        (tabular, document) if tabular >= DECISIVE_SCORE && tabular > document => {
            Some(Route::Structured)
        }
        (tabular, document) if document >= DECISIVE_SCORE && document > tabular => {
            Some(Route::Unstructured)
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;

    #[test]
    fn every_fragment_compiles() {
        for list in [
            DOCUMENT_PHRASES,
            TABULAR_ENTITY_TERMS,
            TABULAR_PHRASES,
            TABULAR_KEYWORDS,
            DOCUMENT_KEYWORDS,
        ] {
            assert_eq!(words(list).len(), list.len());
        }
        assert_eq!(COMPILED.len(), RULES.len());
    }

    #[rstest]
    #[case("Summarize the employee handbook", Some("document_phrasing"))]
    #[case("Explain the leave policy", Some("document_phrasing"))]
    #[case("Tell me about employee benefits", Some("document_phrasing"))]
    #[case("Give me an overview of the onboarding process", Some("document_phrasing"))]
    #[case("Explain the salary bands", None)]
    #[case("How many employees have performance rating above 4?", Some("tabular_phrasing"))]
    #[case("Show me all employees in the Finance department", Some("tabular_phrasing"))]
    #[case("What is the highest performance rating?", Some("tabular_phrasing"))]
    #[case("List all employees whose rating is at least 4", Some("tabular_phrasing"))]
    #[case("Summarize total revenue by quarter", Some("tabular_phrasing"))]
    #[case("What is the company's mission?", None)]
    fn rule_table(#[case] question: &str, #[case] expected: Option<&str>) {
        assert_eq!(matching_rule(question).map(|r| r.name), expected);
    }

    #[rstest]
    #[case("Explain the leave policy", Some(Route::Unstructured))]
    #[case("What is the average salary?", Some(Route::Structured))]
    #[case("Which department has the best sales numbers", Some(Route::Structured))]
    #[case("What are our values and culture?", Some(Route::Unstructured))]
    #[case("What is the company's mission?", None)]
    #[case("Explain the salary bands", None)]
    #[case("Hello there", None)]
    fn rule_pass_outcomes(#[case] question: &str, #[case] expected: Option<Route>) {
        assert_eq!(rule_pass(question), expected);
    }

    #[test]
    fn word_boundaries_prevent_partial_matches() {
        assert!(matching_rule("Who maintains the accounting handbook?").is_none());
        assert_eq!(keyword_scores("maximal minions"), (0, 0));
    }
}
