//! Prompt builders for the three reasoning calls.

use std::fmt::Write;

use quarry_core::{AnswerDetail, NO_ANSWER, RetrievedDocument};

/// Ask for a one-word routing verdict.
#[must_use]
pub fn classify(question: &str) -> String {
    format!(
        "You route questions for a company knowledge assistant.\n\
         Reply with exactly one word.\n\
         SQL: the question needs numbers, filters, counts, rankings or records from data tables.\n\
         RAG: the question needs information from policies, handbooks, reports or other documents.\n\n\
         Question: {question}\n\
         Verdict:"
    )
}

/// Ask for a single read-only statement over the described tables.
#[must_use]
pub fn generate_query(question: &str, schema_description: &str, allowed_tables: &[String]) -> String {
    format!(
        "You write DuckDB SQL for a company data assistant.\n\
         You may use only these tables: {tables}.\n\n\
         {schema_description}\n\n\
         Rules:\n\
         - Return one SELECT statement and nothing else.\n\
         - Use column names exactly as listed above.\n\
         - Never modify data.\n\
         - Do not combine aggregate functions with SELECT *.\n\n\
         Question: {question}\n\
         SQL:",
        tables = allowed_tables.join(", "),
    )
}

/// Ask for an answer grounded only in `context`.
#[must_use]
pub fn answer(question: &str, context: &[RetrievedDocument], detail: AnswerDetail) -> String {
    let instructions = match detail {
        AnswerDetail::Brief => {
            "Answer briefly using only the context below. Use at most 100 words.".to_string()
        }
        AnswerDetail::Extended => format!(
            "Answer thoroughly using only the context below. Give details, examples or steps \
             where they apply. Cite the source of every substantive claim. Do not invent facts. \
             If the context does not contain the answer, reply exactly: '{NO_ANSWER}' \
             Use at most 400 words."
        ),
    };

    let mut out = instructions;
    out.push_str("\n\nContext:\n");
    for doc in context {
        let _ = writeln!(out, "[{}] {}\n", doc.source, doc.content.trim());
    }
    let _ = write!(out, "Question: {question}\nAnswer:");
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(source: &str, content: &str) -> RetrievedDocument {
        RetrievedDocument {
            source: source.into(),
            label: "general".into(),
            content: content.into(),
            score: 1.0,
        }
    }

    #[test]
    fn query_prompt_lists_only_allowed_tables() {
        let prompt = generate_query(
            "How many employees?",
            "Table: hr_data\nColumns: name, rating",
            &["hr_data".to_string()],
        );
        assert!(prompt.contains("only these tables: hr_data."));
        assert!(prompt.contains("Columns: name, rating"));
        assert!(prompt.ends_with("SQL:"));
    }

    #[test]
    fn answer_prompt_varies_with_detail() {
        let ctx = [doc("handbook.md", "Leave is 20 days.")];
        let brief = answer("Leave policy?", &ctx, AnswerDetail::Brief);
        let extended = answer("Leave policy?", &ctx, AnswerDetail::Extended);

        assert!(brief.contains("at most 100 words"));
        assert!(!brief.contains(NO_ANSWER));
        assert!(extended.contains("at most 400 words"));
        assert!(extended.contains(NO_ANSWER));
        assert!(extended.contains("[handbook.md] Leave is 20 days."));
    }
}
