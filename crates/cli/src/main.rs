//! ShopTax CLI - Account seeding and operational checks.
//!
//! # Usage
//!
//! ```bash
//! # Create the first admin (tax officer) account
//! shoptax-cli seed-admin -e officer@example.gov -n "A. Officer" -p <password> -c PK
//!
//! # Check that an account signs in and resolves a role
//! shoptax-cli check-login -e officer@example.gov -p <password>
//!
//! # Try the address search interactively
//! shoptax-cli geocode
//!
//! # Validate the environment configuration without starting the server
//! shoptax-cli check-config
//! ```
//!
//! # Commands
//!
//! - `seed-admin` - Create an admin account against the identity backend
//! - `check-login` - Sign in and report how the session resolves
//! - `geocode` - Interactive address search against the configured geocoder
//! - `check-config` - Load and report the configuration

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "shoptax-cli")]
#[command(author, version, about = "ShopTax CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create an admin (tax officer) account
    SeedAdmin {
        /// Admin email address
        #[arg(short, long)]
        email: String,

        /// Admin display name
        #[arg(short, long)]
        name: String,

        /// Initial password
        #[arg(short, long)]
        password: String,

        /// ISO country code (e.g. PK)
        #[arg(short, long, default_value = "PK")]
        country: String,
    },
    /// Sign in and report how the session resolves
    CheckLogin {
        /// Account email address
        #[arg(short, long)]
        email: String,

        /// Account password
        #[arg(short, long)]
        password: String,
    },
    /// Interactive address search against the configured geocoder
    Geocode,
    /// Load and report the configuration
    CheckConfig,
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
        Commands::SeedAdmin {
            email,
            name,
            password,
            country,
        } => {
            commands::seed::seed_admin(&email, &name, &password, &country).await?;
        }
        Commands::CheckLogin { email, password } => {
            commands::login::check_login(&email, &password).await?;
        }
        Commands::Geocode => {
            commands::geocode::interactive().await?;
        }
        Commands::CheckConfig => {
            commands::config::check()?;
        }
    }
    Ok(())
}
