//! Command-line interface definitions.
//!
//! Defines the CLI structure for the storefront using `clap`: catalog
//! browsing, cart management against the persisted cart, a simulated
//! checkout, and configuration utilities.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::domain::ProductId;

/// Browse the catalog and manage a persisted shopping cart
#[derive(Parser, Debug)]
#[command(name = "storefront")]
#[command(version)]
pub struct Cli {
    /// Path to the configuration file [default: storefront.toml if present]
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// JSON output for scripting
    #[arg(long, global = true)]
    pub json: bool,

    /// Decrease output verbosity
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Keep the cart in memory for this run instead of the database
    #[arg(long, global = true)]
    pub ephemeral: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level subcommands for the storefront CLI.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List products, optionally filtered by category
    Products(ProductsArgs),

    /// List product categories
    Categories,

    /// Show one product
    Product(ProductArgs),

    /// Inspect and change the cart
    #[command(subcommand)]
    Cart(CartCommand),

    /// Place an order for everything in the cart
    Checkout(CheckoutArgs),

    /// Manage configuration
    #[command(subcommand)]
    Config(ConfigCommand),
}

/// Subcommands for `storefront cart`.
#[derive(Subcommand, Debug)]
pub enum CartCommand {
    /// Show cart lines and the total
    Show,
    /// Add a product, merging with an existing line
    Add(CartAddArgs),
    /// Set a line's quantity; zero or less removes it
    Set(CartSetArgs),
    /// Remove a product's line
    Remove(ProductArgs),
    /// Remove every line
    Clear,
}

/// Subcommands for `storefront config`.
#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Display the effective configuration with defaults applied.
    Show,
    /// Validate the configuration.
    Validate,
}

#[derive(Args, Debug)]
pub struct ProductsArgs {
    /// Only list products in this category ("All" lists everything)
    #[arg(long)]
    pub category: Option<String>,
}

#[derive(Args, Debug)]
pub struct ProductArgs {
    /// Catalog product id
    pub id: ProductId,
}

#[derive(Args, Debug)]
pub struct CartAddArgs {
    /// Catalog product id
    pub id: ProductId,

    /// Units to add
    #[arg(short = 'n', long, default_value_t = 1)]
    pub quantity: u32,
}

#[derive(Args, Debug)]
pub struct CartSetArgs {
    /// Catalog product id
    pub id: ProductId,

    /// New quantity
    #[arg(allow_negative_numbers = true)]
    pub quantity: i64,
}

#[derive(Args, Debug)]
pub struct CheckoutArgs {
    #[arg(long)]
    pub name: String,
    #[arg(long)]
    pub address: String,
    #[arg(long)]
    pub city: String,
    #[arg(long = "zip")]
    pub zip_code: String,
    #[arg(long = "card")]
    pub card_number: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_products_with_category() {
        let cli =
            Cli::try_parse_from(["storefront", "products", "--category", "jewelery"]).unwrap();
        if let Commands::Products(args) = cli.command {
            assert_eq!(args.category.as_deref(), Some("jewelery"));
        } else {
            panic!("Expected Products command");
        }
    }

    #[test]
    fn test_cart_add_defaults_to_one() {
        let cli = Cli::try_parse_from(["storefront", "cart", "add", "7"]).unwrap();
        if let Commands::Cart(CartCommand::Add(args)) = cli.command {
            assert_eq!(args.id, ProductId::new(7));
            assert_eq!(args.quantity, 1);
        } else {
            panic!("Expected Cart Add command");
        }
    }

    #[test]
    fn test_cart_add_rejects_negative_quantity() {
        assert!(Cli::try_parse_from(["storefront", "cart", "add", "7", "-n", "-2"]).is_err());
    }

    #[test]
    fn test_cart_set_accepts_negative_quantity() {
        let cli = Cli::try_parse_from(["storefront", "cart", "set", "3", "-1"]).unwrap();
        if let Commands::Cart(CartCommand::Set(args)) = cli.command {
            assert_eq!(args.quantity, -1);
        } else {
            panic!("Expected Cart Set command");
        }
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["storefront", "cart", "show", "--json", "--ephemeral"])
            .unwrap();
        assert!(cli.json);
        assert!(cli.ephemeral);
        assert!(matches!(cli.command, Commands::Cart(CartCommand::Show)));
    }

    #[test]
    fn test_checkout_requires_all_fields() {
        assert!(Cli::try_parse_from(["storefront", "checkout", "--name", "Ada"]).is_err());
    }

    #[test]
    fn test_config_validate_command() {
        let cli = Cli::try_parse_from(["storefront", "config", "validate"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Config(ConfigCommand::Validate)
        ));
    }

    #[test]
    fn test_invalid_product_id() {
        assert!(Cli::try_parse_from(["storefront", "product", "abc"]).is_err());
    }
}
