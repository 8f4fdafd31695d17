use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::*;

mod commands;
mod config;
mod utils;

use config::CliConfig;
use personas_core::{Profile, RedactedLoggerBuilder};

#[derive(Parser)]
#[command(name = "personas")]
#[command(about = "Create, browse and maintain Persona records through the Personas API")]
#[command(version = "0.1.0")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Configuration file path
    #[arg(short, long, global = true)]
    config: Option<std::path::PathBuf>,

    /// API profile (development, production)
    #[arg(short, long, global = true)]
    profile: Option<Profile>,
}

#[derive(Subcommand)]
enum Commands {
    /// List personas
    List(commands::list::ListArgs),

    /// Show one persona
    Show(commands::show::ShowArgs),

    /// Create a persona
    Add(commands::add::AddArgs),

    /// Edit a persona
    Edit(commands::edit::EditArgs),

    /// Delete a persona
    Remove(commands::remove::RemoveArgs),

    /// Search personas by nombre, apellido or email
    Search(commands::search::SearchArgs),

    /// Check that the API is reachable
    Ping(commands::ping::PingArgs),
}

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("{} {:#}", "✗".red().bold(), err);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    // A missing .env is fine
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    // Load configuration
    let config = CliConfig::load(cli.config.as_deref(), cli.profile)?;
    if !config.ui.color_enabled {
        colored::control::set_override(false);
    }

    init_logging(cli.verbose, &config)?;

    match cli.command {
        Commands::List(args) => commands::list::execute(args, &config).await,
        Commands::Show(args) => commands::show::execute(args, &config).await,
        Commands::Add(args) => commands::add::execute(args, &config).await,
        Commands::Edit(args) => commands::edit::execute(args, &config).await,
        Commands::Remove(args) => commands::remove::execute(args, &config).await,
        Commands::Search(args) => commands::search::execute(args, &config).await,
        Commands::Ping(args) => commands::ping::execute(args, &config).await,
    }
}

/// Initialize logging based on verbosity level
fn init_logging(verbose: bool, config: &CliConfig) -> Result<()> {
    let level = if verbose {
        tracing::Level::DEBUG
    } else {
        config.logging.level()
    };

    RedactedLoggerBuilder::new(level)
        .directives("hyper=warn,hyper_util=warn")
        .include_target(verbose)
        .init()?;

    Ok(())
}
