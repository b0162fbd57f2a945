use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod commands;
mod common;

#[derive(Parser)]
#[command(name = "signalroom", version, about = "Signalroom CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile a daily brief from provider payload files
    Brief(commands::brief::BriefArgs),
    /// Assess how much of your work the connected tools cover
    Coverage(commands::coverage::CoverageArgs),
    /// Show each intent mode and what it lets through
    Modes(commands::modes::ModesArgs),
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_ansi(false),
        )
        .with(filter)
        .init();
}

fn main() {
    init_tracing();

    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Brief(args) => commands::brief::run(args),
        Commands::Coverage(args) => commands::coverage::run(args),
        Commands::Modes(args) => commands::modes::run(args),
        Commands::Config { action } => commands::config::run(action),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
