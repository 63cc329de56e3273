//! Harbormaster CLI - Database migrations and management tools.
//!
//! # Usage
//!
//! ```bash
//! # Run database migrations (schema + session table)
//! hm-cli migrate
//!
//! # Replace all berths and reservations with the contents of two JSON files
//! hm-cli seed --catways data/catways.json --reservations data/reservations.json
//!
//! # Create a user
//! hm-cli user create -u capitainerie -e office@port.example -p 'long-passphrase'
//! ```
//!
//! # Environment Variables
//!
//! - `HARBORMASTER_DATABASE_URL` - `PostgreSQL` connection string (falls back to `DATABASE_URL`)

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "hm-cli")]
#[command(author, version, about = "Harbormaster CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Replace berths and reservations with JSON fixtures
    Seed {
        /// JSON array of catways
        #[arg(long, default_value = "data/catways.json")]
        catways: PathBuf,

        /// JSON array of reservations, each naming its `catwayNumber`
        #[arg(long, default_value = "data/reservations.json")]
        reservations: PathBuf,
    },
    /// Manage users
    User {
        #[command(subcommand)]
        action: UserAction,
    },
}

#[derive(Subcommand)]
enum UserAction {
    /// Create a new user
    Create {
        /// Display name (min 3 characters)
        #[arg(short, long)]
        username: String,

        /// Email address, used to log in
        #[arg(short, long)]
        email: String,

        /// Password (min 6 characters)
        #[arg(short, long)]
        password: String,
    },
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), commands::CommandError> {
    match cli.command {
        Commands::Migrate => commands::migrate::run().await?,
        Commands::Seed {
            catways,
            reservations,
        } => {
            commands::seed::run(&catways, &reservations).await?;
        }
        Commands::User { action } => match action {
            UserAction::Create {
                username,
                email,
                password,
            } => {
                commands::user::create(username, email, password).await?;
            }
        },
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_seed_defaults() {
        let cli = Cli::parse_from(["hm-cli", "seed"]);
        let Commands::Seed {
            catways,
            reservations,
        } = cli.command
        else {
            panic!("expected seed");
        };
        assert_eq!(catways, PathBuf::from("data/catways.json"));
        assert_eq!(reservations, PathBuf::from("data/reservations.json"));
    }
}
