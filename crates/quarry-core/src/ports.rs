//! Async ports for the external collaborators.
//!
//! Every method crosses a network or process boundary and may block for
//! hundreds of milliseconds to tens of seconds. Implementations report
//! failures as [`ServiceError`]; deadlines are applied by the caller.

use async_trait::async_trait;

use crate::enums::{AnswerDetail, Route};
use crate::errors::ServiceError;
use crate::partition::Partition;
use crate::query::QueryRows;
use crate::retrieval::{RetrievedDocument, UserRecord, VisibilityFilter};

/// The natural-language reasoning service.
#[async_trait]
pub trait ReasoningService: Send + Sync {
    /// Single-word verdict: structured (`SQL`) or unstructured (`RAG`).
    async fn classify(&self, question: &str) -> Result<Route, ServiceError>;

    /// Propose a read-only query over the described tables. The raw output
    /// may contain prose or code fences; it is validated before use.
    async fn generate_query(
        &self,
        question: &str,
        schema_description: &str,
        allowed_tables: &[String],
    ) -> Result<String, ServiceError>;

    /// Answer from the retrieved context only.
    async fn answer(
        &self,
        question: &str,
        context: &[RetrievedDocument],
        detail: AnswerDetail,
    ) -> Result<String, ServiceError>;
}

/// Executes validated, read-only statements.
#[async_trait]
pub trait TabularEngine: Send + Sync {
    async fn execute(&self, statement: &str) -> Result<QueryRows, ServiceError>;
}

/// Similarity search over indexed documents.
#[async_trait]
pub trait RetrievalStore: Send + Sync {
    /// Ranked documents whose label passes `filter`, best first.
    async fn search(
        &self,
        query: &str,
        filter: &VisibilityFilter,
        limit: usize,
    ) -> Result<Vec<RetrievedDocument>, ServiceError>;
}

/// Lists every known partition with its owning label.
#[async_trait]
pub trait PartitionCatalog: Send + Sync {
    async fn partitions(&self) -> Result<Vec<Partition>, ServiceError>;
}

/// Looks up stored credentials.
#[async_trait]
pub trait UserDirectory: Send + Sync {
    async fn lookup(&self, username: &str) -> Result<Option<UserRecord>, ServiceError>;
}
