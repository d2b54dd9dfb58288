use quarry_core::{CoreError, ServiceError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AccessError {
    /// Unknown user or wrong password. The two are deliberately not
    /// distinguished.
    #[error("invalid username or password")]
    InvalidCredentials,

    /// The user directory could not be consulted.
    #[error("user directory error: {0}")]
    Directory(#[from] ServiceError),

    /// The stored record carries an unusable role.
    #[error("stored role is invalid: {0}")]
    InvalidRole(#[from] CoreError),
}
