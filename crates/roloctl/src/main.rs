//! Rolo Control - CLI client for the Rolo daemon.

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};

const DEFAULT_ADDR: &str = "http://127.0.0.1:8080";

#[derive(Parser)]
#[command(name = "roloctl")]
#[command(about = "Rolo phone book - command-line client", version)]
struct Cli {
    /// Daemon address, e.g. http://127.0.0.1:8080 (or set ROLO_ADDR)
    #[arg(long)]
    addr: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Send a free-text request to the phone-book assistant
    Chat {
        /// The request, e.g. "add Adam 555-1234"
        prompt: Vec<String>,
    },

    /// List all contacts
    List,

    /// Show daemon health
    Status,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let addr = cli
        .addr
        .or_else(|| std::env::var("ROLO_ADDR").ok())
        .unwrap_or_else(|| DEFAULT_ADDR.to_string());

    match cli.command {
        Commands::Chat { prompt } => commands::chat(&addr, &prompt.join(" ")).await,
        Commands::List => commands::list(&addr).await,
        Commands::Status => commands::status(&addr).await,
    }
}
