//! Safety and scope checks for generated statements.
//!
//! Checks run in a fixed order and the first failure wins:
//!
//! 1. extract the first `SELECT` statement from the raw output
//! 2. reject mutating keywords anywhere in the lowered output, including
//!    text after the extracted statement
//! 3. reject any relation reference outside the allow-set
//! 4. reject unresolved table placeholders
//!
//! Step 2 is plain substring containment and will also refuse harmless
//! statements such as one reading a `created_at` column. Step 3 runs on
//! every call with the caller's allow-set; results are never cached.

use std::collections::BTreeSet;
use std::sync::LazyLock;

use quarry_core::{CandidateQuery, Rejection};
use regex::Regex;

/// Keywords that make a statement unsafe wherever they appear.
pub const MUTATING_KEYWORDS: &[&str] = &["insert", "update", "delete", "drop", "alter", "create"];

/// Words that can follow `FROM`/`JOIN` without naming a relation.
const NOT_A_TABLE: &[&str] = &[
    "table", "where", "group", "select", "order", "by", "on", "as", "lateral", "with", "values",
];

/// Functions whose argument list may contain a non-relational `FROM`.
const FROM_FUNCTIONS: &[&str] = &["extract", "trim", "substring", "overlay"];

/// Words that end a `FROM` item, so they are never taken as an alias.
const CLAUSE_WORDS: &[&str] = &[
    "where", "join", "inner", "left", "right", "full", "outer", "cross", "natural", "on",
    "using", "group", "order", "limit", "offset", "having", "union", "except", "intersect",
    "window", "qualify", "positional", "asof", "anti", "semi", "sample", "tablesample",
];

static SELECT_KEYWORD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bselect\b").expect("select pattern is valid regex"));

static BLANK_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n[ \t]*\n").expect("blank line pattern is valid regex"));

static PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\{\{?[^}]*\}\}?|<\s*table[_ ]?name\s*>|\[\s*table[_ ]?name\s*\]|\byour_table(?:_name)?\b|\btable_name\b",
    )
    .expect("placeholder pattern is valid regex")
});

/// Validate raw reasoning-service output against `allowed` relation names.
///
/// On success the returned statement has formatting and any trailing `;`
/// removed, and its referenced relations listed in lower case.
///
/// # Errors
///
/// Returns the first [`Rejection`] that applies.
pub fn validate(candidate: &str, allowed: &BTreeSet<String>) -> Result<CandidateQuery, Rejection> {
    let statement = extract_statement(candidate).ok_or(Rejection::NoQueryFound)?;

    let lowered = candidate.to_lowercase();
    if let Some(keyword) = MUTATING_KEYWORDS.iter().find(|k| lowered.contains(*k)) {
        return Err(Rejection::UnsafeStatement {
            keyword: (*keyword).to_string(),
        });
    }

    let tables = referenced_tables(&statement);
    let allowed: BTreeSet<String> = allowed.iter().map(|t| t.to_lowercase()).collect();
    if let Some(table) = tables.iter().find(|t| !allowed.contains(*t)) {
        return Err(Rejection::ScopeViolation {
            table: table.clone(),
        });
    }

    if let Some(found) = PLACEHOLDER.find(&statement) {
        return Err(Rejection::PlaceholderTable {
            placeholder: found.as_str().to_string(),
        });
    }

    Ok(CandidateQuery {
        text: statement,
        declared_tables: tables,
    })
}

/// Pull the first `SELECT` statement out of free-form output.
///
/// Code fences are dropped, the statement ends at the first `;` or blank
/// line, and the result is trimmed.
#[must_use]
pub fn extract_statement(raw: &str) -> Option<String> {
    let unfenced: String = raw
        .lines()
        .filter(|line| !line.trim_start().starts_with("```"))
        .collect::<Vec<_>>()
        .join("\n");
    let unfenced = unfenced.replace('`', " ");

    let start = SELECT_KEYWORD.find(&unfenced)?.start();
    let rest = &unfenced[start..];
    let mut end = rest.find(';').unwrap_or(rest.len());
    if let Some(blank) = BLANK_LINE.find(&rest[..end]) {
        end = blank.start();
    }
    let statement = rest[..end].trim();
    (!statement.is_empty()).then(|| statement.to_string())
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    Word(String),
    Quoted(String),
    Literal(String),
    Punct(char),
}

fn tokenize(sql: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut chars = sql.chars().peekable();
    while let Some(&c) = chars.peek() {
        if c.is_whitespace() {
            chars.next();
        } else if c == '-' && second_char_is(&mut chars.clone(), '-') {
            for c in chars.by_ref() {
                if c == '\n' {
                    break;
                }
            }
        } else if c == '/' && second_char_is(&mut chars.clone(), '*') {
            chars.next();
            chars.next();
            let mut previous = ' ';
            for c in chars.by_ref() {
                if previous == '*' && c == '/' {
                    break;
                }
                previous = c;
            }
        } else if c == '"' || c == '\'' {
            chars.next();
            let mut text = String::new();
            while let Some(next) = chars.next() {
                if next == c {
                    if chars.peek() == Some(&c) {
                        text.push(c);
                        chars.next();
                        continue;
                    }
                    break;
                }
                text.push(next);
            }
            tokens.push(if c == '"' {
                Token::Quoted(text)
            } else {
                Token::Literal(text)
            });
        } else if c.is_alphanumeric() || c == '_' {
            let mut word = String::new();
            while let Some(&next) = chars.peek() {
                if next.is_alphanumeric() || next == '_' || next == '$' {
                    word.push(next);
                    chars.next();
                } else {
                    break;
                }
            }
            tokens.push(Token::Word(word));
        } else {
            tokens.push(Token::Punct(c));
            chars.next();
        }
    }
    tokens
}

fn second_char_is(chars: &mut std::iter::Peekable<std::str::Chars<'_>>, expected: char) -> bool {
    chars.next();
    chars.peek() == Some(&expected)
}

fn is_word(token: Option<&Token>, word: &str) -> bool {
    matches!(token, Some(Token::Word(w)) if w.eq_ignore_ascii_case(word))
}

/// Every relation a statement reads, lower-cased.
///
/// Covers comma-separated `FROM` lists, joins, `TABLE name`, quoted and
/// `main.`-qualified names, string-literal file scans, table functions, and
/// subqueries anywhere in the statement, including inside function arguments
/// and column-alias lists. Only a `FROM` directly inside the arguments of
/// `EXTRACT`, `TRIM`, `SUBSTRING` or `OVERLAY` is not read as a relation.
#[must_use]
pub fn referenced_tables(statement: &str) -> BTreeSet<String> {
    let tokens = tokenize(statement);
    let mut tables = BTreeSet::new();
    collect(&tokens, &mut tables);
    tables
}

fn collect(tokens: &[Token], tables: &mut BTreeSet<String>) {
    // One entry per open parenthesis: true when it holds an expression
    // whose own `FROM` names no relation.
    let mut parens: Vec<bool> = Vec::new();
    let mut i = 0;

    while i < tokens.len() {
        match &tokens[i] {
            Token::Punct('(') => {
                parens.push(opens_from_function(tokens, i));
                i += 1;
            }
            Token::Punct(')') => {
                parens.pop();
                i += 1;
            }
            Token::Word(w) if w.eq_ignore_ascii_case("table") => {
                i += 1;
                if let Some((name, next)) = relation_at(tokens, i) {
                    tables.insert(name);
                    i = next;
                }
            }
            Token::Word(w) if w.eq_ignore_ascii_case("from") || w.eq_ignore_ascii_case("join") => {
                let in_expression = parens.last().copied().unwrap_or(false);
                let is_from = w.eq_ignore_ascii_case("from");
                i += 1;
                if in_expression {
                    continue;
                }
                loop {
                    let Some((name, next)) = relation_at(tokens, i) else {
                        break;
                    };
                    tables.insert(name);
                    i = skip_item(tokens, next, tables);
                    if is_from && matches!(tokens.get(i), Some(Token::Punct(','))) {
                        i += 1;
                    } else {
                        break;
                    }
                }
            }
            _ => i += 1,
        }
    }
}

fn opens_from_function(tokens: &[Token], i: usize) -> bool {
    let previous = i.checked_sub(1).and_then(|p| tokens.get(p));
    matches!(previous, Some(Token::Word(w)) if FROM_FUNCTIONS.contains(&w.to_lowercase().as_str()))
}

/// Read one `FROM` item at `i` and return its relation name and the index
/// after it. `None` when the item is a subquery or a keyword.
fn relation_at(tokens: &[Token], i: usize) -> Option<(String, usize)> {
    match tokens.get(i)? {
        Token::Literal(path) => Some((path.to_lowercase(), i + 1)),
        Token::Quoted(name) => Some(qualified(tokens, name, i + 1)),
        Token::Word(word) => {
            let lower = word.to_lowercase();
            if NOT_A_TABLE.contains(&lower.as_str()) {
                return None;
            }
            Some(qualified(tokens, word, i + 1))
        }
        Token::Punct(_) => None,
    }
}

/// Join `schema.name` pairs; only the `main` schema is dropped.
fn qualified(tokens: &[Token], first: &str, mut i: usize) -> (String, usize) {
    let mut parts = vec![first.to_lowercase()];
    while matches!(tokens.get(i), Some(Token::Punct('.'))) {
        match tokens.get(i + 1) {
            Some(Token::Word(w) | Token::Quoted(w)) => {
                parts.push(w.to_lowercase());
                i += 2;
            }
            _ => break,
        }
    }
    if parts.len() > 1 && parts[0] == "main" {
        parts.remove(0);
    }
    (parts.join("."), i)
}

/// Skip what may follow a relation inside a `FROM` item: table-function
/// arguments, an alias, and a column-alias list. Relations read inside the
/// skipped parentheses are still collected.
fn skip_item(tokens: &[Token], i: usize, tables: &mut BTreeSet<String>) -> usize {
    let mut i = skip_group(tokens, i, tables);
    if is_word(tokens.get(i), "as") {
        i += 1;
    }
    match tokens.get(i) {
        Some(Token::Word(w)) if !CLAUSE_WORDS.contains(&w.to_lowercase().as_str()) => {
            skip_group(tokens, i + 1, tables)
        }
        Some(Token::Quoted(_)) => skip_group(tokens, i + 1, tables),
        _ => i,
    }
}

/// Skip a balanced parenthesized group at `i`, collecting from its contents.
fn skip_group(tokens: &[Token], i: usize, tables: &mut BTreeSet<String>) -> usize {
    if !matches!(tokens.get(i), Some(Token::Punct('('))) {
        return i;
    }
    let mut depth = 0_usize;
    let mut end = i;
    while let Some(token) = tokens.get(end) {
        match token {
            Token::Punct('(') => depth += 1,
            Token::Punct(')') => {
                depth -= 1;
                if depth == 0 {
                    break;
                }
            }
            _ => {}
        }
        end += 1;
    }
    collect(&tokens[i + 1..end], tables);
    (end + 1).min(tokens.len())
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;

    fn set(items: &[&str]) -> BTreeSet<String> {
        items.iter().map(|s| (*s).to_string()).collect()
    }

    #[rstest]
    #[case("SELECT * FROM hr_data", &["hr_data"])]
    #[case("select a.x from hr_data a join finance_data b on a.id = b.id", &["finance_data", "hr_data"])]
    #[case("SELECT * FROM hr_data AS h, holidays h2 WHERE h.d = h2.d", &["holidays", "hr_data"])]
    #[case("SELECT * FROM \"HR_Data\"", &["hr_data"])]
    #[case("SELECT * FROM main.hr_data", &["hr_data"])]
    #[case("SELECT * FROM information_schema.tables", &["information_schema.tables"])]
    #[case("SELECT * FROM 'secrets.csv'", &["secrets.csv"])]
    #[case("SELECT * FROM read_csv('x.csv') t", &["read_csv"])]
    #[case("SELECT EXTRACT(YEAR FROM hired) FROM hr_data", &["hr_data"])]
    #[case("SELECT * FROM (SELECT name FROM finance_data) sub", &["finance_data"])]
    #[case("SELECT 1", &[])]
    #[case("SELECT name FROM hr_data -- FROM finance_data\nWHERE x = 1", &["hr_data"])]
    #[case("SELECT * FROM finance_data AS f(a, b), hr_data", &["finance_data", "hr_data"])]
    #[case("SELECT * FROM finance_data f (q, r) JOIN hr_data h ON f.q = h.name", &["finance_data", "hr_data"])]
    #[case("SELECT name, (FROM hr_data SELECT max(x)) FROM finance_data", &["finance_data", "hr_data"])]
    #[case("SELECT * FROM (TABLE hr_data)", &["hr_data"])]
    #[case("SELECT * FROM range((SELECT count(*) FROM hr_data))", &["hr_data", "range"])]
    #[case("SELECT * FROM finance_data /* note */, hr_data", &["finance_data", "hr_data"])]
    #[case("SELECT EXTRACT(YEAR FROM (SELECT max(d) FROM hr_data))", &["hr_data"])]
    #[case("SELECT TRIM(BOTH ' ' FROM name) FROM holidays", &["holidays"])]
    fn extracts_relations(#[case] sql: &str, #[case] expected: &[&str]) {
        assert_eq!(referenced_tables(sql), set(expected));
    }

    #[rstest]
    #[case("```sql\nSELECT * FROM hr_data;\n```", "SELECT * FROM hr_data")]
    #[case("Here is the query: SELECT name FROM hr_data; -- done", "SELECT name FROM hr_data")]
    #[case("SELECT name\nFROM hr_data\n\nThis returns all names.", "SELECT name\nFROM hr_data")]
    #[case("`SELECT 1`", "SELECT 1")]
    fn statement_extraction(#[case] raw: &str, #[case] expected: &str) {
        assert_eq!(extract_statement(raw).as_deref(), Some(expected));
    }

    #[test]
    fn prose_without_select_is_rejected() {
        assert_eq!(
            validate("I cannot answer that from the tables.", &set(&["hr_data"])),
            Err(Rejection::NoQueryFound)
        );
    }
}
