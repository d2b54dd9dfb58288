use clap::{Args, Subcommand, ValueEnum};
use quarry_core::AnswerDetail;

/// Top-level command tree.
#[derive(Clone, Debug, Subcommand)]
pub enum Commands {
    /// Answer a question as a role.
    Ask(AskArgs),
    /// Show which path a question would take.
    Classify(ClassifyArgs),
    /// Check a SELECT statement against a role's partitions.
    Validate(ValidateArgs),
    /// List the partitions a role may query.
    Partitions(PartitionsArgs),
    /// Load a CSV file as a partition owned by a role.
    IngestCsv(IngestArgs),
    /// Load a text document visible to a role.
    IngestDoc(IngestArgs),
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, ValueEnum)]
pub enum DetailArg {
    #[default]
    Brief,
    Extended,
}

impl From<DetailArg> for AnswerDetail {
    fn from(value: DetailArg) -> Self {
        match value {
            DetailArg::Brief => Self::Brief,
            DetailArg::Extended => Self::Extended,
        }
    }
}

#[derive(Clone, Debug, Args)]
pub struct AskArgs {
    /// Question text.
    pub question: String,
    #[arg(long)]
    pub role: String,
    #[arg(long, value_enum, default_value_t)]
    pub detail: DetailArg,
}

#[derive(Clone, Debug, Args)]
pub struct ClassifyArgs {
    pub question: String,
}

#[derive(Clone, Debug, Args)]
pub struct ValidateArgs {
    /// Statement to check, as the reasoning service would emit it.
    pub sql: String,
    #[arg(long)]
    pub role: String,
}

#[derive(Clone, Debug, Args)]
pub struct PartitionsArgs {
    #[arg(long)]
    pub role: String,
}

#[derive(Clone, Debug, Args)]
pub struct IngestArgs {
    pub path: String,
    /// Owning role label.
    #[arg(long)]
    pub role: String,
}
