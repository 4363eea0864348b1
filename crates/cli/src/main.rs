//! ReAgent CLI — the main entry point.
//!
//! Commands:
//! - `onboard` — Initialize config & workspace
//! - `chat`    — Run a single message through the agent
//! - `serve`   — Start the HTTP gateway server

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(
    name = "reagent",
    about = "ReAgent — a ReAct agent execution engine",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize configuration and workspace
    Onboard,

    /// Run a single message through the agent
    Chat {
        /// The message to send
        message: String,

        /// Stream step output as it is produced
        #[arg(short, long)]
        stream: bool,
    },

    /// Start the HTTP gateway server
    Serve {
        /// Override the port
        #[arg(short, long)]
        port: Option<u16>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_target(false)
        .init();

    match cli.command {
        Commands::Onboard => commands::onboard::run().await?,
        Commands::Chat { message, stream } => commands::chat::run(&message, stream).await?,
        Commands::Serve { port } => commands::serve::run(port).await?,
    }

    Ok(())
}
