//! Saved Cart CLI - Database migrations and inspection tools.
//!
//! # Usage
//!
//! ```bash
//! # Run database migrations
//! saved-cart migrate
//!
//! # Print a customer's saved cart as JSON
//! saved-cart carts show 123
//! ```
//!
//! # Commands
//!
//! - `migrate` - Run database migrations
//! - `carts show` - Print a saved cart

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "saved-cart")]
#[command(author, version, about = "Saved cart CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Inspect saved carts
    Carts {
        #[command(subcommand)]
        action: CartsAction,
    },
}

#[derive(Subcommand)]
enum CartsAction {
    /// Print the cart saved for a customer
    Show {
        /// Customer ID (trailing segment of the customer GID)
        customer_id: String,
    },
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Migrate => commands::migrate::run().await?,
        Commands::Carts { action } => match action {
            CartsAction::Show { customer_id } => commands::carts::show(&customer_id).await?,
        },
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_carts_show() {
        let cli = Cli::try_parse_from(["saved-cart", "carts", "show", "123"]);
        assert!(matches!(
            cli.map(|c| c.command),
            Ok(Commands::Carts {
                action: CartsAction::Show { customer_id }
            }) if customer_id == "123"
        ));
    }

    #[test]
    fn test_parse_migrate() {
        let cli = Cli::try_parse_from(["saved-cart", "migrate"]);
        assert!(matches!(cli.map(|c| c.command), Ok(Commands::Migrate)));
    }
}
