use std::path::Path;

use anyhow::Context;
use quarry_core::Role;
use quarry_router::AdminEvent;
use serde::Serialize;

use crate::cli::GlobalFlags;
use crate::cli::root_commands::IngestArgs;
use crate::context::AppContext;
use crate::output::output;

#[derive(Debug, Serialize)]
struct IngestResponse {
    role: Role,
    source: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    table: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    columns: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    chunks: Option<usize>,
}

/// Handle `qry ingest-csv`.
pub fn handle_csv(args: &IngestArgs, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let role = Role::new(&args.role)?;
    let path = Path::new(&args.path);
    let partition = ctx
        .lake
        .register_csv(path, role.as_str())
        .with_context(|| format!("failed to ingest {}", path.display()))?;

    ctx.router
        .apply_admin_event(&AdminEvent::PartitionIngested(role.clone()));

    output(
        &IngestResponse {
            role,
            source: args.path.clone(),
            table: Some(partition.name),
            columns: Some(partition.columns),
            chunks: None,
        },
        flags.format,
    )
}

/// Handle `qry ingest-doc`.
pub fn handle_doc(args: &IngestArgs, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let role = Role::new(&args.role)?;
    let path = Path::new(&args.path);
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let source = path
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or(&args.path)
        .to_string();

    let chunks = ctx
        .lake
        .add_document(&source, role.as_str(), &content)
        .with_context(|| format!("failed to ingest {}", path.display()))?;

    ctx.router
        .apply_admin_event(&AdminEvent::DocumentIngested(role.clone()));

    output(
        &IngestResponse {
            role,
            source,
            table: None,
            columns: None,
            chunks: Some(chunks),
        },
        flags.format,
    )
}
