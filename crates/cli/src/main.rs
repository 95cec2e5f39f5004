//! Chaldal CLI - Database migrations, seed data and account management.
//!
//! # Usage
//!
//! ```bash
//! # Apply storefront migrations
//! chaldal-cli migrate
//!
//! # Load categories, delivery areas and a demo seller catalog
//! chaldal-cli seed
//! chaldal-cli seed --file my-catalog.yaml
//!
//! # Create an account of any role
//! chaldal-cli person create -e rider@example.com -n "Rider One" -p secret123 -r rider --vehicle bicycle
//! ```
//!
//! # Environment Variables
//!
//! - `CHALDAL_DATABASE_URL` - `PostgreSQL` connection string (falls back to `DATABASE_URL`)

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "chaldal-cli")]
#[command(author, version, about = "Chaldal storefront CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Insert default categories, areas and a demo seller catalog
    Seed {
        /// YAML file to load instead of the built-in catalog
        #[arg(short, long)]
        file: Option<String>,

        /// Password for the demo seller account
        #[arg(long, env = "CHALDAL_SEED_PASSWORD", default_value = "seller123")]
        seller_password: String,
    },
    /// Manage accounts
    Person {
        #[command(subcommand)]
        action: PersonAction,
    },
}

#[derive(Subcommand)]
enum PersonAction {
    /// Create an account
    Create {
        /// Email address
        #[arg(short, long)]
        email: String,

        /// Full name
        #[arg(short, long)]
        name: String,

        /// Password (at least 6 characters)
        #[arg(short, long)]
        password: String,

        /// Role (`user`, `seller`, `admin`, `rider`)
        #[arg(short, long, default_value = "user")]
        role: String,

        /// Phone number
        #[arg(long)]
        phone: Option<String>,

        /// Delivery address, saved as the default `Home` address
        #[arg(long)]
        address: Option<String>,

        /// Company name (sellers)
        #[arg(long)]
        company: Option<String>,

        /// Vehicle type (riders)
        #[arg(long)]
        vehicle: Option<String>,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "chaldal_cli=info,chaldal_storefront=info".into()),
        )
        .init();

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
            file,
            seller_password,
        } => {
            commands::seed::run(file.as_deref(), &seller_password).await?;
        }
        Commands::Person { action } => match action {
            PersonAction::Create {
                email,
                name,
                password,
                role,
                phone,
                address,
                company,
                vehicle,
            } => {
                let account = commands::person::NewAccount {
                    email,
                    name,
                    password,
                    role,
                    phone,
                    address,
                    company,
                    vehicle,
                };
                commands::person::create(account).await?;
            }
        },
    }
    Ok(())
}
