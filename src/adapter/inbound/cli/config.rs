//! Handler for the `config` command group.

use serde_json::json;

use crate::adapter::inbound::cli::command::ConfigCommand;
use crate::adapter::inbound::cli::output;
use crate::error::Result;
use crate::infrastructure::config::settings::Config;

/// Execute a `config` subcommand against an already loaded and validated config.
pub fn execute(command: &ConfigCommand, config: &Config) -> Result<()> {
    match command {
        ConfigCommand::Show => execute_show(config),
        ConfigCommand::Validate => execute_validate(config),
    }
}

fn execute_show(config: &Config) -> Result<()> {
    if output::is_json() {
        output::json_output(json!({
            "command": "config.show",
            "database": config.database,
            "catalog": {
                "base_url": config.catalog.base_url,
                "timeout_ms": config.catalog.timeout_ms,
                "connect_timeout_ms": config.catalog.connect_timeout_ms,
            },
            "cart": { "channel_capacity": config.cart.channel_capacity },
            "checkout": { "processing_delay_ms": config.checkout.processing_delay_ms },
            "logging": {
                "level": config.logging.level,
                "format": config.logging.format,
            },
        }));
        return Ok(());
    }

    output::section("Effective Configuration");
    output::field("Database", &config.database);

    output::section("Catalog");
    output::field("Base URL", &config.catalog.base_url);
    output::field("Timeout", format!("{}ms", config.catalog.timeout_ms));
    output::field("Connect", format!("{}ms", config.catalog.connect_timeout_ms));

    output::section("Cart");
    output::field("Buffer", config.cart.channel_capacity);
    output::field(
        "Checkout delay",
        format!("{}ms", config.checkout.processing_delay_ms),
    );

    output::section("Logging");
    output::field("Level", &config.logging.level);
    output::field("Format", &config.logging.format);
    Ok(())
}

fn execute_validate(config: &Config) -> Result<()> {
    config.validate()?;

    if output::is_json() {
        output::json_output(json!({
            "command": "config.validate",
            "valid": true,
        }));
        return Ok(());
    }

    output::success("Configuration is valid");
    Ok(())
}
