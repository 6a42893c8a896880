//! CLI command definitions and argument parsing.

use clap::{ArgGroup, Args, Parser, Subcommand};
use std::path::PathBuf;

/// Celltyper - Annotate single-cell clusters with cell types using a chat model.
#[derive(Debug, Parser)]
#[command(name = "celltyper")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Output format
    #[arg(short, long, value_enum, global = true)]
    pub format: Option<CliFormat>,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Configuration file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// Output format options.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum CliFormat {
    /// Tab-separated `group<TAB>label` lines (default)
    Text,
    /// Table format
    Table,
    /// JSON format
    Json,
}

/// CLI commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Annotate groups by querying the chat model
    Annotate(AnnotateArgs),

    /// Print the prompt without querying any model
    Prompt(InputArgs),

    /// Manage the configuration file
    Config(ConfigArgs),
}

/// Where groups come from.
#[derive(Debug, Args)]
#[command(group(ArgGroup::new("source").required(true).args(["table", "markers"])))]
pub struct InputArgs {
    /// Differential-expression table (CSV/TSV with gene, cluster, avg_log2FC, p_val_adj)
    #[arg(long)]
    pub table: Option<PathBuf>,

    /// Marker-gene lists (JSON object or array)
    #[arg(long)]
    pub markers: Option<PathBuf>,

    /// Table delimiter; defaults to tab for .tsv/.txt and comma otherwise
    #[arg(short, long)]
    pub delimiter: Option<char>,

    /// Tissue the cells come from (e.g. "human PBMC")
    #[arg(short, long)]
    pub tissue: Option<String>,

    /// Top marker genes per cluster in table mode
    #[arg(long)]
    pub top_genes: Option<usize>,
}

/// Arguments for the annotate command.
#[derive(Debug, Args)]
pub struct AnnotateArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// API key; without one the prompt is printed instead
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Model name
    #[arg(short, long)]
    pub model: Option<String>,

    /// API base URL
    #[arg(long)]
    pub base_url: Option<String>,

    /// Give up on a batch after this many requests (the first included)
    #[arg(long)]
    pub max_attempts: Option<u32>,

    /// Batches queried at once
    #[arg(long)]
    pub concurrency: Option<usize>,
}

/// Arguments for configuration management.
#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

/// Configuration actions.
#[derive(Debug, Subcommand)]
pub enum ConfigAction {
    /// Print the effective configuration as TOML
    Show,

    /// Write the default configuration file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

impl From<CliFormat> for crate::config::OutputFormat {
    fn from(format: CliFormat) -> Self {
        match format {
            CliFormat::Text => crate::config::OutputFormat::Text,
            CliFormat::Table => crate::config::OutputFormat::Table,
            CliFormat::Json => crate::config::OutputFormat::Json,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_annotate_with_table() {
        let cli = Cli::try_parse_from([
            "celltyper",
            "annotate",
            "--table",
            "markers.csv",
            "--tissue",
            "blood",
            "--api-key",
            "sk-test",
        ])
        .unwrap();
        match cli.command {
            Command::Annotate(args) => {
                assert_eq!(args.input.table, Some(PathBuf::from("markers.csv")));
                assert_eq!(args.input.tissue.as_deref(), Some("blood"));
                assert_eq!(args.api_key.as_deref(), Some("sk-test"));
            }
            _ => panic!("Expected Annotate command"),
        }
    }

    #[test]
    fn test_prompt_with_markers() {
        let cli = Cli::try_parse_from(["celltyper", "prompt", "--markers", "sets.json", "-v"]).unwrap();
        assert_eq!(cli.verbose, 1);
        assert!(matches!(cli.command, Command::Prompt(ref args) if args.markers.is_some()));
    }

    #[test]
    fn test_input_source_is_required() {
        assert!(Cli::try_parse_from(["celltyper", "prompt"]).is_err());
    }

    #[test]
    fn test_input_sources_are_exclusive() {
        let result = Cli::try_parse_from([
            "celltyper",
            "prompt",
            "--table",
            "a.csv",
            "--markers",
            "b.json",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_verbosity_and_attempt_cap() {
        let cli = Cli::try_parse_from([
            "celltyper",
            "annotate",
            "--markers",
            "sets.json",
            "--max-attempts",
            "3",
            "-vvv",
        ])
        .unwrap();
        assert_eq!(cli.verbose, 3);
        match cli.command {
            Command::Annotate(args) => assert_eq!(args.max_attempts, Some(3)),
            _ => panic!("Expected Annotate command"),
        }
    }

    #[test]
    fn test_config_show() {
        let cli = Cli::try_parse_from(["celltyper", "config", "show"]).unwrap();
        assert!(matches!(
            cli.command,
            Command::Config(ConfigArgs {
                action: ConfigAction::Show
            })
        ));
    }
}
