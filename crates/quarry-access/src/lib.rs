//! # quarry-access
//!
//! The access control boundary for Quarry.
//!
//! - [`AccessGate`] resolves a role to the partitions it may query and the
//!   document labels it may read. Results are cached per role until
//!   [`AccessGate::invalidate_access`] is called.
//! - [`CredentialVerifier`] checks username/password pairs against a
//!   [`UserDirectory`](quarry_core::UserDirectory) behind a short-lived cache.

mod credentials;
mod error;
mod gate;

pub use credentials::{CredentialVerifier, hash_password};
pub use error::AccessError;
pub use gate::{AccessGate, AccessScope};
