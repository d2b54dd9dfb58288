//! Candidate queries, query results, and validator rejections.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

/// A structured query that passed validation.
///
/// `text` is the normalized statement (formatting stripped, trailing `;`
/// removed); `declared_tables` are the lower-cased relation names it reads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateQuery {
    pub text: String,
    pub declared_tables: BTreeSet<String>,
}

/// Why a candidate query was refused.
///
/// Rejections always route the request to the unstructured path; they are
/// values, never surfaced to the caller as faults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Rejection {
    /// No statement beginning with `SELECT` was found in the output.
    NoQueryFound,
    /// The statement contains a mutating keyword.
    UnsafeStatement { keyword: String },
    /// The statement reads a relation outside the role's allow-set.
    ScopeViolation { table: String },
    /// The statement still contains an unresolved table placeholder.
    PlaceholderTable { placeholder: String },
}

impl Rejection {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::NoQueryFound => "no_query_found",
            Self::UnsafeStatement { .. } => "unsafe_statement",
            Self::ScopeViolation { .. } => "scope_violation",
            Self::PlaceholderTable { .. } => "placeholder_table",
        }
    }
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoQueryFound => f.write_str("no SELECT statement found"),
            Self::UnsafeStatement { keyword } => {
                write!(f, "statement contains mutating keyword '{keyword}'")
            }
            Self::ScopeViolation { table } => write!(f, "access denied to table: {table}"),
            Self::PlaceholderTable { placeholder } => {
                write!(f, "statement contains placeholder '{placeholder}'")
            }
        }
    }
}

/// Rows returned by the tabular engine, every cell rendered as text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryRows {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl QueryRows {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Render as a GitHub-flavoured markdown table.
    #[must_use]
    pub fn to_markdown(&self) -> String {
        use std::fmt::Write;

        let mut out = String::new();
        let header: Vec<String> = self.columns.iter().map(|c| escape_cell(c)).collect();
        let _ = writeln!(out, "| {} |", header.join(" | "));
        let rule: Vec<&str> = self.columns.iter().map(|_| "---").collect();
        let _ = write!(out, "| {} |", rule.join(" | "));
        for row in &self.rows {
            let cells: Vec<String> = row.iter().map(|c| escape_cell(c)).collect();
            let _ = write!(out, "\n| {} |", cells.join(" | "));
        }
        out
    }
}

fn escape_cell(cell: &str) -> String {
    cell.replace('|', "\\|").replace('\n', " ")
}
