//! CLI module graph and command dispatch.

pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod command;
pub mod config;
pub mod output;

use tracing::debug;

use crate::error::Result;
use crate::infrastructure::bootstrap::Storefront;
use crate::infrastructure::config::settings::Config;
use command::{CartCommand, Commands};

/// Run one command to completion.
///
/// Config commands never open the database or touch the network.
pub async fn dispatch(command: Commands, config: Config, ephemeral: bool) -> Result<()> {
    if let Commands::Config(cmd) = &command {
        return config::execute(cmd, &config);
    }

    let app = Storefront::build(config, ephemeral)?;
    debug!(?command, "Dispatching command");
    let result = match command {
        Commands::Products(args) => catalog::execute_products(&app, args.category).await,
        Commands::Categories => catalog::execute_categories(&app).await,
        Commands::Product(args) => catalog::execute_product(&app, args.id).await,
        Commands::Cart(CartCommand::Show) => cart::execute_show(&app).await,
        Commands::Cart(CartCommand::Add(args)) => {
            cart::execute_add(&app, args.id, args.quantity).await
        }
        Commands::Cart(CartCommand::Set(args)) => {
            cart::execute_set(&app, args.id, args.quantity).await
        }
        Commands::Cart(CartCommand::Remove(args)) => cart::execute_remove(&app, args.id).await,
        Commands::Cart(CartCommand::Clear) => cart::execute_clear(&app).await,
        Commands::Checkout(args) => checkout::execute(&app, args).await,
        Commands::Config(cmd) => config::execute(&cmd, app.config()),
    };
    app.shutdown();
    result
}
