//! Role names with special visibility rules.

use serde::{Deserialize, Serialize};

fn default_admin_role() -> String {
    String::from("c-level")
}

fn default_general_role() -> String {
    String::from("general")
}

fn default_roles() -> Vec<String> {
    ["engineering", "marketing", "finance", "hr"]
        .into_iter()
        .map(String::from)
        .collect()
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AccessConfig {
    /// Role that sees every partition and document.
    #[serde(default = "default_admin_role")]
    pub admin_role: String,

    /// Shared label every role can read.
    #[serde(default = "default_general_role")]
    pub general_role: String,

    /// Other roles that may read their own label. Any role outside this
    /// list and the two above is denied.
    #[serde(default = "default_roles")]
    pub roles: Vec<String>,
}

impl Default for AccessConfig {
    fn default() -> Self {
        Self {
            admin_role: default_admin_role(),
            general_role: default_general_role(),
            roles: default_roles(),
        }
    }
}
