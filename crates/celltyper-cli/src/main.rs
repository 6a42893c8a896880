//! Celltyper CLI - Label single-cell clusters with cell types using a chat model.

use celltyper_cli::cli::ConfigAction;
use celltyper_cli::commands;
use celltyper_cli::{Cli, Command, Config, Formatter};
use clap::Parser;
use tracing::Level;
use tracing_subscriber::EnvFilter;

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run() -> celltyper_cli::Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Logs go to stderr so stdout stays clean for labels and prompts.
    // RUST_LOG wins over -v.
    let level = match cli.verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.as_str().to_lowercase()));
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .with_target(false)
        .init();

    // `config init` must work before any file exists
    let config = match &cli.command {
        Command::Config(args) if matches!(args.action, ConfigAction::Init { .. }) => {
            Config::default()
        }
        _ => Config::load(cli.config.as_deref())?,
    };

    // Determine output format
    let format = cli
        .format
        .map(Into::into)
        .unwrap_or(config.settings.format);

    // Determine color setting
    let color_enabled = !cli.no_color && config.settings.color;

    // Create formatter
    let formatter = Formatter::new(format, color_enabled);

    // Handle commands
    match cli.command {
        Command::Annotate(args) => commands::execute_annotate(args, &config, &formatter)?,
        Command::Prompt(args) => commands::execute_prompt(args, &config)?,
        Command::Config(args) => {
            commands::execute_config(args, &config, cli.config.as_deref(), &formatter)?
        }
    }

    Ok(())
}
