//! Nyraa CLI - headless storefront client.
//!
//! # Usage
//!
//! ```bash
//! # Log in with an emailed one-time password
//! nyraa login otp asha@example.com
//! nyraa login verify asha@example.com 123456
//!
//! # Fill the cart and check out
//! nyraa cart add --id 7 --name "Solitaire Ring" --price 4999.00 --color gold
//! nyraa checkout status
//! nyraa checkout confirm --coupon SAVE10
//!
//! # Order history
//! nyraa orders list
//! nyraa orders cancel <id> --notes "changed my mind"
//! ```
//!
//! # Environment Variables
//!
//! - `NYRAA_API_BASE_URL` - backend REST API base URL (required)
//! - `NYRAA_STATE_PATH` - client state file location
//! - `NYRAA_LOG` / `RUST_LOG` - tracing filter

#![cfg_attr(not(test), forbid(unsafe_code))]
// Terminal output is the product of this crate.
#![allow(clippy::print_stdout)]
#![allow(clippy::print_stderr)]

use clap::{Parser, Subcommand};
use nyraa_storefront::config::StorefrontConfig;
use nyraa_storefront::{AppError, Storefront};

mod commands;

use commands::{address, auth, cart, checkout, orders, wishlist};

#[derive(Parser)]
#[command(name = "nyraa")]
#[command(author, version, about = "Nyraa storefront client")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Log in or manage credentials
    Login {
        #[command(subcommand)]
        action: auth::LoginAction,
    },
    /// Clear the local session
    Logout,
    /// Show the logged-in profile (verifies the session)
    Profile,
    /// Manage the cart
    Cart {
        #[command(subcommand)]
        action: cart::CartAction,
    },
    /// Manage the wishlist
    Wishlist {
        #[command(subcommand)]
        action: wishlist::WishlistAction,
    },
    /// Checkout readiness and order submission
    Checkout {
        #[command(subcommand)]
        action: checkout::CheckoutAction,
    },
    /// Order history
    Orders {
        #[command(subcommand)]
        action: orders::OrdersAction,
    },
    /// Manage the address book
    Address {
        #[command(subcommand)]
        action: address::AddressAction,
    },
}

#[tokio::main]
async fn main() {
    // Default to warnings only; command output goes to stdout, not the log.
    let env_filter = tracing_subscriber::EnvFilter::try_from_env("NYRAA_LOG")
        .or_else(|_| tracing_subscriber::EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| "nyraa=warn".into());

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        eprintln!("error: {}", e.user_message());
        tracing::debug!(error = %e, "command failed");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), AppError> {
    let config = StorefrontConfig::from_env()?;
    let app = Storefront::init(config)?;

    match cli.command {
        Commands::Login { action } => auth::login(&app, action).await,
        Commands::Logout => auth::logout(&app),
        Commands::Profile => auth::profile(&app).await,
        Commands::Cart { action } => cart::run(&app, action),
        Commands::Wishlist { action } => wishlist::run(&app, action),
        Commands::Checkout { action } => checkout::run(&app, action).await,
        Commands::Orders { action } => orders::run(&app, action).await,
        Commands::Address { action } => address::run(&app, action).await,
    }
}
