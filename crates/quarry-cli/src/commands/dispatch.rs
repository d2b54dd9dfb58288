use crate::cli::GlobalFlags;
use crate::cli::root_commands::Commands;
use crate::commands;
use crate::context::AppContext;

/// Dispatch a parsed command to the corresponding handler module.
pub async fn dispatch(command: Commands, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    match command {
        Commands::Ask(args) => commands::ask::handle(&args, ctx, flags).await,
        Commands::Classify(args) => commands::classify::handle(&args, ctx, flags).await,
        Commands::Validate(args) => commands::validate::handle(&args, ctx, flags).await,
        Commands::Partitions(args) => commands::partitions::handle(&args, ctx, flags).await,
        Commands::IngestCsv(args) => commands::ingest::handle_csv(&args, ctx, flags),
        Commands::IngestDoc(args) => commands::ingest::handle_doc(&args, ctx, flags),
    }
}
