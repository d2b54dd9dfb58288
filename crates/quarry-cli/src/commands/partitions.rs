use quarry_core::Role;
use serde::Serialize;

use crate::cli::GlobalFlags;
use crate::cli::root_commands::PartitionsArgs;
use crate::context::AppContext;
use crate::output::output;

#[derive(Debug, Serialize)]
struct PartitionsResponse {
    role: Role,
    partitions: Vec<String>,
}

/// Handle `qry partitions`.
pub async fn handle(args: &PartitionsArgs, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let role = Role::new(&args.role)?;
    let partitions = ctx.router.allowed_partitions(&role).await.into_iter().collect();
    output(&PartitionsResponse { role, partitions }, flags.format)
}
