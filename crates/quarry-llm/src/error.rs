//! Reasoning client error types.

use quarry_core::ServiceError;
use thiserror::Error;

const SERVICE: &str = "reasoning";

#[derive(Debug, Error)]
pub enum LlmError {
    /// HTTP transport error.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The service returned a non-success status code.
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// The response body could not be decoded.
    #[error("parse error: {0}")]
    Parse(String),
}

impl From<LlmError> for ServiceError {
    fn from(error: LlmError) -> Self {
        match error {
            LlmError::Http(e) => Self::Unavailable {
                service: SERVICE,
                reason: e.to_string(),
            },
            LlmError::Api { status, message } => Self::Status {
                service: SERVICE,
                status,
                message,
            },
            LlmError::Parse(reason) => Self::Malformed {
                service: SERVICE,
                reason,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_error_maps_to_status() {
        let err: ServiceError = LlmError::Api {
            status: 503,
            message: "model loading".into(),
        }
        .into();
        assert_eq!(
            err,
            ServiceError::Status {
                service: "reasoning",
                status: 503,
                message: "model loading".into(),
            }
        );
    }

    #[test]
    fn parse_error_maps_to_malformed() {
        let err: ServiceError = LlmError::Parse("missing field".into()).into();
        assert!(matches!(err, ServiceError::Malformed { .. }));
    }
}
