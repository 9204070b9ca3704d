use anyhow::Result;
use clap::Parser;

use loghub_api::{config::load_config, init_tracing, server::start_server};

/// Central log ingestion and query API
#[derive(Debug, Parser)]
#[command(name = "loghub-api", version, about)]
struct Cli {
    /// Configuration file (without extension), e.g. "config" for config.toml
    #[arg(short, long, default_value = "config", env = "LOGHUB_CONFIG")]
    config: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Cli::parse();

    let config = load_config(&args.config)?;
    init_tracing(
        &config.server.log_level,
        config.server.log_format == "json",
    );

    start_server(config).await
}
