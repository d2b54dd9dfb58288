use clap::Parser;

pub mod global;
pub mod root_commands;

pub use global::{GlobalFlags, OutputFormat};
pub use root_commands::Commands;

/// Top-level CLI parser for the `qry` binary.
#[derive(Debug, Parser)]
#[command(name = "qry", version, about = "Quarry - role-scoped question routing")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output format: json, raw
    #[arg(short, long, global = true, default_value = "json")]
    pub format: OutputFormat,

    /// Quiet mode (errors only)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Verbose mode (debug logging)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Lake database path (overrides `lake.path`)
    #[arg(long, global = true)]
    pub lake: Option<String>,
}

impl Cli {
    #[must_use]
    pub fn global_flags(&self) -> GlobalFlags {
        GlobalFlags {
            format: self.format,
            quiet: self.quiet,
            verbose: self.verbose,
            lake: self.lake.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use clap::{CommandFactory, Parser};
    use pretty_assertions::assert_eq;

    use super::root_commands::DetailArg;
    use super::{Cli, Commands, OutputFormat};

    #[test]
    fn clap_command_tree_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn ask_parses_role_and_detail() {
        let cli = Cli::try_parse_from([
            "qry",
            "--format",
            "raw",
            "ask",
            "--role",
            "Finance",
            "--detail",
            "extended",
            "How many employees are there?",
        ])
        .expect("cli should parse");

        assert_eq!(cli.format, OutputFormat::Raw);
        match cli.command {
            Commands::Ask(args) => {
                assert_eq!(args.role, "Finance");
                assert_eq!(args.detail, DetailArg::Extended);
                assert_eq!(args.question, "How many employees are there?");
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn detail_defaults_to_brief() {
        let cli = Cli::try_parse_from(["qry", "ask", "--role", "hr", "Explain leave"])
            .expect("cli should parse");
        assert!(matches!(cli.command, Commands::Ask(args) if args.detail == DetailArg::Brief));
    }

    #[test]
    fn global_flags_parse_after_subcommand() {
        let cli = Cli::try_parse_from([
            "qry",
            "partitions",
            "--role",
            "hr",
            "--lake",
            "/tmp/lake.duckdb",
            "--quiet",
        ])
        .expect("cli should parse");

        let flags = cli.global_flags();
        assert_eq!(flags.lake.as_deref(), Some("/tmp/lake.duckdb"));
        assert!(flags.quiet);
        assert_eq!(flags.format, OutputFormat::Json);
    }

    #[test]
    fn ingest_requires_a_role() {
        assert!(Cli::try_parse_from(["qry", "ingest-csv", "data/hr.csv"]).is_err());
        assert!(Cli::try_parse_from(["qry", "ingest-doc", "--role", "hr", "handbook.md"]).is_ok());
    }

    #[test]
    fn output_format_rejects_invalid_value() {
        let parsed = Cli::try_parse_from(["qry", "--format", "table", "classify", "x"]);
        assert!(parsed.is_err());
    }
}
