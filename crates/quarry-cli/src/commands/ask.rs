use quarry_core::Role;

use crate::cli::GlobalFlags;
use crate::cli::root_commands::AskArgs;
use crate::context::AppContext;
use crate::output::output;

/// Handle `qry ask`.
pub async fn handle(args: &AskArgs, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let role = Role::new(&args.role)?;
    let envelope = ctx
        .router
        .ask(&args.question, &role, args.detail.into())
        .await;
    output(&envelope, flags.format)
}
