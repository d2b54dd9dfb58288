//! # quarry-core
//!
//! Core types, collaborator ports, and error types for Quarry.
//!
//! This crate provides the foundational types shared across all Quarry crates:
//! - Role identifiers with canonical comparison
//! - Partitions (named tabular relations with an owning-role label)
//! - Routing enums (structured vs. unstructured) and classification provenance
//! - Candidate queries, query rows, and validator rejections
//! - The answer envelope returned to callers
//! - Document visibility filters and retrieved documents
//! - Async ports for the external collaborators (reasoning service, tabular
//!   engine, retrieval store, partition catalog, user directory)
//! - The soft-failure taxonomy for external calls

pub mod enums;
pub mod envelope;
pub mod errors;
pub mod partition;
pub mod ports;
pub mod query;
pub mod retrieval;
pub mod role;

pub use enums::{AnswerDetail, AnswerMode, Outcome, Provenance, Route};
pub use envelope::{AnswerEnvelope, ClassificationResult, FallbackReason, NO_ANSWER, NO_ROWS};
pub use errors::{CoreError, ServiceError};
pub use partition::Partition;
pub use ports::{PartitionCatalog, ReasoningService, RetrievalStore, TabularEngine, UserDirectory};
pub use query::{CandidateQuery, QueryRows, Rejection};
pub use retrieval::{RetrievedDocument, UserRecord, VisibilityFilter};
pub use role::Role;
