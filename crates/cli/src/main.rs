//! Emporium CLI - database and account management tools.
//!
//! # Usage
//!
//! ```bash
//! # Create the unique indexes on Users and Products
//! emporium-cli db indexes
//!
//! # Create an admin account (password from EMPORIUM_ADMIN_PASSWORD)
//! emporium-cli admin create -e admin@example.com -p 9876543210 --first-name Ada --last-name Admin
//!
//! # Insert products listed in a YAML file
//! emporium-cli seed products --file products.yaml
//! ```
//!
//! Every command reads the same environment as the server
//! (`EMPORIUM_MONGODB_URL`, `EMPORIUM_TOKEN_SECRET`, ...) and needs
//! `EMPORIUM_STORE=mongodb`.

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;

use clap::{Parser, Subcommand};

mod commands;

use commands::CliError;

#[derive(Parser)]
#[command(name = "emporium-cli")]
#[command(author, version, about = "Emporium CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Database maintenance
    Db {
        #[command(subcommand)]
        action: DbAction,
    },
    /// Manage admin accounts
    Admin {
        #[command(subcommand)]
        action: AdminAction,
    },
    /// Load data from files
    Seed {
        #[command(subcommand)]
        target: SeedTarget,
    },
}

#[derive(Subcommand)]
enum DbAction {
    /// Create the unique indexes (idempotent)
    Indexes,
}

#[derive(Subcommand)]
enum AdminAction {
    /// Create a new admin account
    Create {
        /// Admin email address
        #[arg(short, long)]
        email: String,

        /// Admin phone number
        #[arg(short, long)]
        phone: String,

        #[arg(long)]
        first_name: String,

        #[arg(long)]
        last_name: String,
    },
}

#[derive(Subcommand)]
enum SeedTarget {
    /// Insert products from a YAML file
    Products {
        /// Path to the YAML file
        #[arg(short, long)]
        file: PathBuf,
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

async fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        Commands::Db { action } => match action {
            DbAction::Indexes => commands::db::indexes().await?,
        },
        Commands::Admin { action } => match action {
            AdminAction::Create {
                email,
                phone,
                first_name,
                last_name,
            } => {
                commands::admin::create_user(&email, &phone, &first_name, &last_name).await?;
            }
        },
        Commands::Seed { target } => match target {
            SeedTarget::Products { file } => commands::seed::products(&file).await?,
        },
    }
    Ok(())
}
