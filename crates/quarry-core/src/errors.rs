//! Cross-cutting error types for Quarry.
//!
//! [`ServiceError`] is the soft-failure taxonomy for every call that crosses a
//! network or process boundary. The orchestrator absorbs these: they feed
//! classification defaults and fallback decisions and never reach the caller.
//! Adapter crates define their own errors (`LlmError`, `LakeError`) and
//! convert into [`ServiceError`] at the port boundary.

use std::time::Duration;

use thiserror::Error;

/// Failure of an external collaborator call.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ServiceError {
    /// The call did not complete within its deadline.
    #[error("{service} timed out after {after:?}")]
    Timeout {
        service: &'static str,
        after: Duration,
    },

    /// Connection refused, DNS failure, or another transport problem.
    #[error("{service} unavailable: {reason}")]
    Unavailable {
        service: &'static str,
        reason: String,
    },

    /// The collaborator answered with a non-success status.
    #[error("{service} returned status {status}: {message}")]
    Status {
        service: &'static str,
        status: u16,
        message: String,
    },

    /// The collaborator answered, but the payload could not be used.
    #[error("{service} returned a malformed response: {reason}")]
    Malformed {
        service: &'static str,
        reason: String,
    },
}

impl ServiceError {
    /// Name of the collaborator that failed.
    #[must_use]
    pub const fn service(&self) -> &'static str {
        match self {
            Self::Timeout { service, .. }
            | Self::Unavailable { service, .. }
            | Self::Status { service, .. }
            | Self::Malformed { service, .. } => service,
        }
    }

    /// Whether this failure was a deadline expiry.
    #[must_use]
    pub const fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }
}

/// Errors raised while constructing core values.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A role identifier was empty after trimming.
    #[error("role identifier must not be empty")]
    EmptyRole,

    /// A textual enum value could not be parsed.
    #[error("unknown {kind} value: {value}")]
    UnknownValue { kind: &'static str, value: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn service_name_is_reported_for_every_variant() {
        let errors = [
            ServiceError::Timeout {
                service: "reasoning",
                after: Duration::from_secs(1),
            },
            ServiceError::Unavailable {
                service: "reasoning",
                reason: "refused".into(),
            },
            ServiceError::Status {
                service: "reasoning",
                status: 503,
                message: String::new(),
            },
            ServiceError::Malformed {
                service: "reasoning",
                reason: "no field".into(),
            },
        ];
        for error in errors {
            assert_eq!(error.service(), "reasoning");
        }
    }

    #[test]
    fn only_timeout_is_timeout() {
        let timeout = ServiceError::Timeout {
            service: "engine",
            after: Duration::from_millis(10),
        };
        let status = ServiceError::Status {
            service: "engine",
            status: 500,
            message: "boom".into(),
        };
        assert!(timeout.is_timeout());
        assert!(!status.is_timeout());
        assert_eq!(timeout.to_string(), "engine timed out after 10ms");
    }
}
