//! Imagify CLI - Database migrations and operator tools.
//!
//! # Usage
//!
//! ```bash
//! # Run database migrations
//! imagify-cli migrate
//!
//! # Show the plan table
//! imagify-cli plans --currency INR
//!
//! # Look up a user's balance
//! imagify-cli user credits -e asha@example.com
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};
use imagify_core::CurrencyCode;

mod commands;

#[derive(Parser)]
#[command(name = "imagify-cli")]
#[command(author, version, about = "Imagify CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Show plans with their credits and prices
    Plans {
        /// Currency to quote prices in
        #[arg(short, long, default_value = "INR")]
        currency: CurrencyCode,
    },
    /// Inspect user accounts
    User {
        #[command(subcommand)]
        action: UserAction,
    },
}

#[derive(Subcommand)]
enum UserAction {
    /// Show a user's credit balance
    Credits {
        /// User email address
        #[arg(short, long)]
        email: String,
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
        Commands::Plans { currency } => commands::plans::print(currency),
        Commands::User { action } => match action {
            UserAction::Credits { email } => commands::user::credits(&email).await?,
        },
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_user_credits() {
        let cli = Cli::try_parse_from(["imagify-cli", "user", "credits", "-e", "a@example.com"]);
        assert!(matches!(
            cli.map(|c| c.command),
            Ok(Commands::User {
                action: UserAction::Credits { .. }
            })
        ));
    }

    #[test]
    fn test_plans_rejects_unknown_currency() {
        assert!(Cli::try_parse_from(["imagify-cli", "plans", "-c", "XYZ"]).is_err());
    }
}
