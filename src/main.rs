use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;

use storefront::adapter::inbound::cli::command::Cli;
use storefront::adapter::inbound::cli::output::{self, OutputConfig};
use storefront::adapter::inbound::cli::dispatch;
use storefront::infrastructure::config::settings::{Config, DEFAULT_CONFIG_PATH};

#[tokio::main]
async fn main() -> ExitCode {
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();
    output::configure(OutputConfig::new(cli.json, cli.quiet));

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            output::error(&format!("{e:#}"));
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = match &cli.config {
        Some(path) => Config::load(path)
            .with_context(|| format!("failed to load config from {}", path.display()))?,
        None => Config::load_or_default(DEFAULT_CONFIG_PATH)
            .with_context(|| format!("failed to load config from {DEFAULT_CONFIG_PATH}"))?,
    };
    config.init_logging();

    dispatch(cli.command, config, cli.ephemeral).await?;
    Ok(())
}
