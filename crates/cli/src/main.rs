//! Tamarind CLI - database migrations and management tools.
//!
//! # Usage
//!
//! ```bash
//! # Run database migrations
//! tam-cli migrate
//!
//! # Create a manager account
//! tam-cli manager create -e staff@example.com -n "Staff Name" -p <password>
//!
//! # Seed a demo manager and starter catalog
//! tam-cli seed
//! ```
//!
//! # Commands
//!
//! - `migrate` - Run database migrations
//! - `manager create` - Create manager accounts
//! - `seed` - Seed database with demo data

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "tam-cli")]
#[command(author, version, about = "Tamarind CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Manage manager accounts
    Manager {
        #[command(subcommand)]
        action: ManagerAction,
    },
    /// Seed the database with a demo manager and starter catalog
    Seed,
}

#[derive(Subcommand)]
enum ManagerAction {
    /// Create a new manager account
    Create {
        /// Manager email address
        #[arg(short, long)]
        email: String,

        /// Manager display name
        #[arg(short, long)]
        name: String,

        /// Manager password (at least 8 characters)
        #[arg(short, long)]
        password: String,
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
        Commands::Manager { action } => match action {
            ManagerAction::Create {
                email,
                name,
                password,
            } => {
                commands::manager::create(&email, &name, &password).await?;
            }
        },
        Commands::Seed => commands::seed::run().await?,
    }
    Ok(())
}
