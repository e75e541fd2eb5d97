//! Marigold CLI - a terminal storefront client.
//!
//! # Usage
//!
//! ```bash
//! # Browse the catalog
//! marigold catalog list
//! marigold catalog show prd_123
//! marigold catalog search "linen shirt" --max-price 50
//!
//! # Manage the cart
//! marigold cart show
//! marigold cart add prd_123 var_456 --quantity 2
//!
//! # Sign in and check out
//! marigold auth login -e shopper@example.com -p <password>
//! marigold order place --name "A. Shopper" --line1 "1 Main St" ...
//! ```
//!
//! Configuration comes from the environment (see `MARIGOLD_API_URL` and
//! friends in `marigold-client`); durable state lives in the state file at
//! `MARIGOLD_STATE_FILE`.

#![cfg_attr(not(test), forbid(unsafe_code))]
#![allow(clippy::print_stdout, clippy::print_stderr)]

use clap::{Parser, Subcommand};

mod commands;

use commands::context::Context;

#[derive(Parser)]
#[command(name = "marigold")]
#[command(author, version, about = "Marigold storefront client")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Browse products, categories, and reviews
    Catalog {
        #[command(subcommand)]
        action: commands::catalog::CatalogAction,
    },
    /// Inspect and mutate the cart
    Cart {
        #[command(subcommand)]
        action: commands::cart::CartAction,
    },
    /// Sign in, register, and inspect the session
    Auth {
        #[command(subcommand)]
        action: commands::auth::AuthAction,
    },
    /// Place and inspect orders
    Order {
        #[command(subcommand)]
        action: commands::order::OrderAction,
    },
    /// Get or set the persisted locale and currency
    Prefs {
        #[command(subcommand)]
        action: commands::prefs::PrefsAction,
    },
}

#[tokio::main]
async fn main() {
    // Load .env before reading RUST_LOG or any MARIGOLD_* variable
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), commands::CliError> {
    let ctx = Context::load()?;

    match cli.command {
        Commands::Catalog { action } => commands::catalog::run(&ctx, action).await,
        Commands::Cart { action } => commands::cart::run(&ctx, action).await,
        Commands::Auth { action } => commands::auth::run(&ctx, action).await,
        Commands::Order { action } => commands::order::run(&ctx, action).await,
        Commands::Prefs { action } => commands::prefs::run(&ctx, &action),
    }
}
