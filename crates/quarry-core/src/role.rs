//! Role identifiers.
//!
//! Roles are opaque strings supplied by the authentication layer. Every
//! comparison in Quarry happens on the canonical form: trimmed and
//! lower-cased, so `"Finance"`, `" finance "` and `"FINANCE"` are one role.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::errors::CoreError;

/// A role in canonical form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Role(String);

impl Role {
    /// Build a role from a raw identifier.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::EmptyRole`] if the identifier is blank.
    pub fn new(raw: impl AsRef<str>) -> Result<Self, CoreError> {
        let canonical = canonicalize(raw.as_ref());
        if canonical.is_empty() {
            return Err(CoreError::EmptyRole);
        }
        Ok(Self(canonical))
    }

    /// The canonical (trimmed, lower-case) identifier.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether `label` names this role once canonicalized.
    #[must_use]
    pub fn matches_label(&self, label: &str) -> bool {
        canonicalize(label) == self.0
    }
}

/// Canonical form of a role or visibility label.
#[must_use]
pub fn canonicalize(raw: &str) -> String {
    raw.trim().to_lowercase()
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for Role {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Role> for String {
    fn from(role: Role) -> Self {
        role.0
    }
}

impl std::str::FromStr for Role {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case("Finance", "finance")]
    #[case("  C-Level ", "c-level")]
    #[case("GENERAL", "general")]
    fn canonical_form(#[case] raw: &str, #[case] expected: &str) {
        assert_eq!(Role::new(raw).unwrap().as_str(), expected);
    }

    #[test]
    fn blank_role_is_rejected() {
        assert!(matches!(Role::new("   "), Err(CoreError::EmptyRole)));
    }

    #[test]
    fn label_matching_ignores_case() {
        let role = Role::new("HR").unwrap();
        assert!(role.matches_label("hr"));
        assert!(role.matches_label(" Hr "));
        assert!(!role.matches_label("general"));
    }

    #[test]
    fn serde_uses_canonical_string() {
        let role: Role = serde_json::from_str("\"Marketing\"").unwrap();
        assert_eq!(role.as_str(), "marketing");
        assert_eq!(serde_json::to_string(&role).unwrap(), "\"marketing\"");
        assert!(serde_json::from_str::<Role>("\"\"").is_err());
    }
}
