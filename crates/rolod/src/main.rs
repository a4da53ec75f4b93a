//! Rolo daemon - a phone book managed through natural language.

use anyhow::{Context, Result};
use clap::Parser;
use rolo_common::llm::{HttpLlmClient, LlmClient};
use rolod::config::{Config, API_KEY_ENV};
use rolod::server::{self, AppState};
use rolod::store::ContactStore;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "rolod")]
#[command(about = "Rolo - phone book with a natural-language front end", version)]
struct Args {
    /// Path to a TOML config file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Listen address, e.g. 127.0.0.1:8080
    #[arg(long)]
    listen: Option<String>,

    /// SQLite database path
    #[arg(long)]
    db: Option<PathBuf>,

    /// Directory with the web front-end assets
    #[arg(long)]
    static_dir: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    let mut config = Config::load(args.config.as_deref())?;
    if let Some(listen) = args.listen {
        config.listen_addr = listen;
    }
    if let Some(db) = args.db {
        config.db_path = db;
    }
    if let Some(static_dir) = args.static_dir {
        config.static_dir = static_dir;
    }

    info!("rolod v{} starting", env!("CARGO_PKG_VERSION"));

    let store = Arc::new(
        ContactStore::open(&config.db_path).context("failed to open the contact store")?,
    );

    if config.llm.api_key.is_none() {
        warn!("no model API key configured; set {API_KEY_ENV} or llm.api_key");
    }
    let llm: Arc<dyn LlmClient> =
        Arc::new(HttpLlmClient::new(config.llm.clone()).context("failed to create LLM client")?);

    let state = AppState::new(llm, store);
    server::run(state, &config.listen_addr, &config.static_dir).await
}
