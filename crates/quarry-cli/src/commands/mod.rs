pub mod ask;
pub mod classify;
pub mod dispatch;
pub mod ingest;
pub mod partitions;
pub mod validate;
