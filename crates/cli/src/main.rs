//! Emirates Souq CLI - browse the catalog, manage the cart, check out.
//!
//! # Usage
//!
//! ```bash
//! # List the catalog, optionally by category
//! souq catalog list --category fans
//!
//! # Add a product and review the cart
//! souq cart add P1
//! souq cart show
//!
//! # Print the WhatsApp checkout link
//! souq checkout
//! ```
//!
//! # Commands
//!
//! - `catalog list|show|ask` - Browse products
//! - `cart show|add|inc|dec|remove|set|clear` - Manage the persisted cart
//! - `checkout` - Build the WhatsApp order link

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};
use sentry::integrations::tracing as sentry_tracing;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use souq_storefront::config::StorefrontConfig;
use souq_storefront::error::StorefrontError;

mod commands;

#[derive(Parser)]
#[command(name = "souq")]
#[command(author, version, about = "Emirates Souq storefront CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Browse the product catalog
    Catalog {
        #[command(subcommand)]
        action: CatalogAction,
    },
    /// Manage the shopping cart
    Cart {
        #[command(subcommand)]
        action: CartAction,
    },
    /// Print the WhatsApp link that sends the order
    Checkout {
        /// Also print the order message
        #[arg(short, long)]
        message: bool,
    },
}

#[derive(Subcommand)]
enum CatalogAction {
    /// List products
    List {
        /// Only show products in this category
        #[arg(short, long)]
        category: Option<String>,
    },
    /// Show one product
    Show {
        /// Product ID
        id: String,
    },
    /// Print a WhatsApp link asking about one product
    Ask {
        /// Product ID
        id: String,
    },
}

#[derive(Subcommand)]
enum CartAction {
    /// Show cart lines and totals
    Show,
    /// Add one unit of a product
    Add {
        /// Product ID
        id: String,
    },
    /// Add one to a line already in the cart
    Inc {
        /// Product ID
        id: String,
    },
    /// Take one off a line (a line at one is removed)
    Dec {
        /// Product ID
        id: String,
    },
    /// Remove a product's line
    Remove {
        /// Product ID
        id: String,
    },
    /// Set a line's quantity (zero or less removes it)
    Set {
        /// Product ID
        id: String,
        /// New quantity
        #[arg(allow_negative_numbers = true)]
        quantity: i64,
    },
    /// Remove every line
    Clear,
}

/// Initialize Sentry error tracking and return guard that must be kept alive.
fn init_sentry(config: &StorefrontConfig) -> Option<sentry::ClientInitGuard> {
    let dsn = config.sentry_dsn.as_ref()?;

    let guard = sentry::init((
        dsn.as_str(),
        sentry::ClientOptions {
            release: sentry::release_name!(),
            attach_stacktrace: true,
            ..Default::default()
        },
    ));

    tracing::info!("Sentry initialized");
    Some(guard)
}

/// Filter tracing events to Sentry event types.
fn sentry_event_filter(metadata: &tracing::Metadata<'_>) -> sentry_tracing::EventFilter {
    match *metadata.level() {
        tracing::Level::ERROR | tracing::Level::WARN => sentry_tracing::EventFilter::Event,
        tracing::Level::INFO | tracing::Level::DEBUG => sentry_tracing::EventFilter::Breadcrumb,
        _ => sentry_tracing::EventFilter::Ignore,
    }
}

#[tokio::main]
#[allow(clippy::print_stderr)]
async fn main() {
    let cli = Cli::parse();

    // Configuration comes first: the Sentry DSN lives there
    let config = match StorefrontConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            let e = StorefrontError::from(e);
            eprintln!("{e}");
            std::process::exit(e.exit_code());
        }
    };

    // Initialize Sentry (must be done before tracing subscriber)
    let _sentry_guard = init_sentry(&config);

    // Logs go to stderr so command output stays pipeable
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "souq_storefront=info,souq_cli=info".into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .init();

    if let Err(e) = run(cli, &config).await {
        tracing::error!("Command failed: {e}");
        std::process::exit(e.exit_code());
    }
}

async fn run(cli: Cli, config: &StorefrontConfig) -> Result<(), StorefrontError> {
    match cli.command {
        Commands::Catalog { action } => match action {
            CatalogAction::List { category } => {
                commands::catalog::list(config, category.as_deref()).await?;
            }
            CatalogAction::Show { id } => commands::catalog::show(config, &id).await?,
            CatalogAction::Ask { id } => commands::catalog::ask(config, &id).await?,
        },
        Commands::Cart { action } => match action {
            CartAction::Show => commands::cart::show(config),
            CartAction::Add { id } => commands::cart::add(config, &id).await?,
            CartAction::Inc { id } => commands::cart::increment(config, &id)?,
            CartAction::Dec { id } => commands::cart::decrement(config, &id)?,
            CartAction::Remove { id } => commands::cart::remove(config, &id)?,
            CartAction::Set { id, quantity } => commands::cart::set(config, &id, quantity)?,
            CartAction::Clear => commands::cart::clear(config)?,
        },
        Commands::Checkout { message } => commands::checkout::run(config, message)?,
    }
    Ok(())
}
