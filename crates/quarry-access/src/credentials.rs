//! Username/password verification with a short-lived record cache.

use std::sync::Arc;
use std::time::Duration;

use quarry_cache::{Ttl, TtlCache};
use quarry_core::{Role, UserDirectory, UserRecord};
use sha2::{Digest, Sha256};

use crate::error::AccessError;

/// Lower-case hex SHA-256 of `password`, the stored credential format.
#[must_use]
pub fn hash_password(password: &str) -> String {
    hex::encode(Sha256::digest(password.as_bytes()))
}

pub struct CredentialVerifier {
    directory: Arc<dyn UserDirectory>,
    records: TtlCache<String, UserRecord>,
    ttl: Duration,
}

impl CredentialVerifier {
    pub fn new(directory: Arc<dyn UserDirectory>, ttl: Duration) -> Self {
        Self {
            directory,
            records: TtlCache::new(),
            ttl,
        }
    }

    /// Construct with an explicit cache, for deterministic expiry in tests.
    pub fn with_cache(
        directory: Arc<dyn UserDirectory>,
        ttl: Duration,
        records: TtlCache<String, UserRecord>,
    ) -> Self {
        Self {
            directory,
            records,
            ttl,
        }
    }

    /// Verify a credential pair and return the user's canonical role.
    ///
    /// # Errors
    ///
    /// - [`AccessError::InvalidCredentials`] for an unknown user or a wrong
    ///   password.
    /// - [`AccessError::Directory`] if the directory lookup fails. Failures
    ///   are not cached.
    /// - [`AccessError::InvalidRole`] if the stored role is blank.
    pub async fn verify(&self, username: &str, password: &str) -> Result<Role, AccessError> {
        let record = match self.records.get(&username.to_string()) {
            Some(record) => record,
            None => {
                let generation = self.records.generation();
                let Some(record) = self.directory.lookup(username).await? else {
                    tracing::debug!(username, "unknown user");
                    return Err(AccessError::InvalidCredentials);
                };
                self.records.put_if_current(
                    username.to_string(),
                    record.clone(),
                    Ttl::For(self.ttl),
                    generation,
                );
                record
            }
        };

        let supplied = hash_password(password);
        if !constant_time_eq(supplied.as_bytes(), record.password_hash.to_lowercase().as_bytes()) {
            tracing::debug!(username, "password mismatch");
            return Err(AccessError::InvalidCredentials);
        }
        Ok(Role::new(&record.role)?)
    }

    pub fn invalidate(&self, username: &str) {
        self.records.invalidate(&username.to_string());
    }

    pub fn invalidate_all(&self) {
        self.records.invalidate_all();
    }
}

impl std::fmt::Debug for CredentialVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialVerifier")
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0_u8, |acc, (x, y)| acc | (x ^ y)) == 0
}
