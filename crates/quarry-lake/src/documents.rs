//! Chunked document storage with lexical retrieval.
//!
//! Documents are split into overlapping character windows. Search scores
//! each visible chunk by how often the query's terms occur in it.

use async_trait::async_trait;
use duckdb::params_from_iter;
use quarry_core::role::canonicalize;
use quarry_core::{RetrievalStore, RetrievedDocument, ServiceError, VisibilityFilter};

use crate::{LakeError, QuarryLake};

pub const CHUNK_SIZE: usize = 800;
pub const CHUNK_OVERLAP: usize = 150;

const STOPWORDS: &[&str] = &[
    "the", "and", "for", "are", "was", "what", "who", "how", "does", "did", "with", "about",
    "from", "that", "this", "have", "has", "our", "your", "tell", "give", "can", "you", "any",
];

/// Split `content` into windows of `size` characters overlapping by
/// `overlap` characters. Blank input yields no chunks.
#[must_use]
pub fn chunk_text(content: &str, size: usize, overlap: usize) -> Vec<String> {
    let chars: Vec<char> = content.chars().collect();
    if content.trim().is_empty() || size == 0 {
        return Vec::new();
    }
    let step = size.saturating_sub(overlap).max(1);
    let mut chunks = Vec::new();
    let mut start = 0;
    loop {
        let end = (start + size).min(chars.len());
        let chunk: String = chars[start..end].iter().collect();
        if !chunk.trim().is_empty() {
            chunks.push(chunk);
        }
        if end == chars.len() {
            break;
        }
        start += step;
    }
    chunks
}

/// Lower-cased search terms of three or more characters, stopwords removed.
#[must_use]
pub fn query_terms(query: &str) -> Vec<String> {
    let mut terms: Vec<String> = query
        .split(|c: char| !c.is_alphanumeric())
        .map(str::to_lowercase)
        .filter(|t| t.chars().count() >= 3 && !STOPWORDS.contains(&t.as_str()))
        .collect();
    terms.sort();
    terms.dedup();
    terms
}

#[allow(clippy::cast_precision_loss)]
fn score(content: &str, terms: &[String]) -> f64 {
    let haystack = content.to_lowercase();
    terms
        .iter()
        .map(|t| haystack.matches(t.as_str()).count())
        .sum::<usize>() as f64
}

impl QuarryLake {
    /// Replace any chunks previously stored for `source` with a fresh split
    /// of `content` labeled `role`. Returns the number of chunks written.
    ///
    /// # Errors
    ///
    /// Returns [`LakeError::DuckDb`] if a write fails.
    pub fn add_document(&self, source: &str, role: &str, content: &str) -> Result<usize, LakeError> {
        let label = canonicalize(role);
        let chunks = chunk_text(content, CHUNK_SIZE, CHUNK_OVERLAP);

        let mut conn = self.conn.lock();
        let tx = conn.transaction()?;
        tx.execute("DELETE FROM documents WHERE source = ?", [source])?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO documents (id, source, role, chunk_index, content) VALUES (?, ?, ?, ?, ?)",
            )?;
            for (index, chunk) in chunks.iter().enumerate() {
                let id = format!("{source}#{index}");
                let index = i32::try_from(index).unwrap_or(i32::MAX);
                stmt.execute(duckdb::params![id, source, label, index, chunk])?;
            }
        }
        tx.commit()?;

        tracing::info!(source, role = %label, chunks = chunks.len(), "document stored");
        Ok(chunks.len())
    }

    /// Top `limit` chunks visible under `filter`, best first.
    ///
    /// Chunks sharing no term with the query are never returned.
    ///
    /// # Errors
    ///
    /// Returns [`LakeError::DuckDb`] if the documents cannot be read.
    pub fn search_documents(
        &self,
        query: &str,
        filter: &VisibilityFilter,
        limit: usize,
    ) -> Result<Vec<RetrievedDocument>, LakeError> {
        let terms = query_terms(query);
        if terms.is_empty() || limit == 0 {
            return Ok(Vec::new());
        }

        let (sql, labels): (String, Vec<String>) = match filter {
            VisibilityFilter::All => (
                "SELECT id, role, content FROM documents".to_string(),
                Vec::new(),
            ),
            VisibilityFilter::Labels(labels) if labels.is_empty() => return Ok(Vec::new()),
            VisibilityFilter::Labels(labels) => {
                let placeholders = vec!["?"; labels.len()].join(", ");
                (
                    format!("SELECT id, role, content FROM documents WHERE role IN ({placeholders})"),
                    labels.iter().cloned().collect(),
                )
            }
        };

        let conn = self.conn.lock();
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
            .query_map(params_from_iter(labels.iter()), |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                ))
            })?
            .collect::<Result<Vec<_>, _>>()?;
        drop(stmt);
        drop(conn);

        let mut ranked: Vec<RetrievedDocument> = rows
            .into_iter()
            .filter_map(|(id, label, content)| {
                let score = score(&content, &terms);
                (score > 0.0).then_some(RetrievedDocument {
                    source: id,
                    label,
                    content,
                    score,
                })
            })
            .collect();
        ranked.sort_by(|a, b| {
            b.score
                .total_cmp(&a.score)
                .then_with(|| a.source.cmp(&b.source))
        });
        ranked.truncate(limit);
        Ok(ranked)
    }
}

#[async_trait]
impl RetrievalStore for QuarryLake {
    async fn search(
        &self,
        query: &str,
        filter: &VisibilityFilter,
        limit: usize,
    ) -> Result<Vec<RetrievedDocument>, ServiceError> {
        let (query, filter) = (query.to_string(), filter.clone());
        Ok(self
            .blocking(move |lake| lake.search_documents(&query, &filter, limit))
            .await?)
    }
}
