use quarry_core::{Rejection, Role};
use serde::Serialize;

use crate::cli::GlobalFlags;
use crate::cli::root_commands::ValidateArgs;
use crate::context::AppContext;
use crate::output::output;

#[derive(Debug, Serialize)]
struct ValidationReport {
    role: Role,
    accepted: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    statement: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tables: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    rejection: Option<Rejection>,
}

/// Handle `qry validate`.
pub async fn handle(args: &ValidateArgs, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let role = Role::new(&args.role)?;
    let report = match ctx.router.validate_for_role(&args.sql, &role).await {
        Ok(accepted) => ValidationReport {
            role,
            accepted: true,
            statement: Some(accepted.text),
            tables: accepted.declared_tables.into_iter().collect(),
            rejection: None,
        },
        Err(rejection) => ValidationReport {
            role,
            accepted: false,
            statement: None,
            tables: Vec::new(),
            rejection: Some(rejection),
        },
    };
    output(&report, flags.format)
}
