use clap::Parser;
use std::path::PathBuf;

use goals_service::prelude::*;

/// goals-service - create, list and delete goals over HTTP
#[derive(Parser)]
#[command(name = "goals-service")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Load configuration from this file instead of the search path
    #[arg(short, long, env = "GOALS_CONFIG")]
    config: Option<PathBuf>,

    /// Port to listen on, overriding configuration
    #[arg(short, long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let mut config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };

    if let Some(port) = cli.port {
        config.service.port = port;
    }

    let _guard = init_tracing(&config)?;

    let state = AppState::builder().config(config.clone()).build();

    Server::new(config).serve(state).await
}
