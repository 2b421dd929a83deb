//! GearUp CLI - browse the catalog, manage the cart and check out.
//!
//! Every invocation is one execution context attached to the storage file,
//! so two shells act like two open tabs of the storefront.
//!
//! # Usage
//!
//! ```bash
//! # List categories and products
//! gearup categories
//! gearup products backpacks
//!
//! # Manage the cart
//! gearup cart add 880RR --category tents
//! gearup cart set 880RR 3
//! gearup cart adjust 880RR -1
//! gearup cart show
//!
//! # Submit the mocked order and view the confirmation
//! gearup checkout --name "Ada Trail" --email ada@trail.example --phone 555-0100 \
//!     --address "1 Summit Rd" --city Bend --state OR --zip 97701
//! gearup order
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};
use gearup_storefront::config::StorefrontConfig;
use gearup_storefront::error::Result;
use gearup_storefront::state::AppState;
use sentry::integrations::tracing as sentry_tracing;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

#[derive(Parser)]
#[command(name = "gearup")]
#[command(author, version, about = "GearUp outdoor gear storefront")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List product categories
    Categories,
    /// List the products of a category
    Products {
        /// Category slug (defaults to the configured category)
        category: Option<String>,
    },
    /// Show one product
    Product {
        /// Product id
        id: String,

        /// Category the product is listed in
        #[arg(short, long)]
        category: Option<String>,
    },
    /// Inspect or change the cart
    Cart {
        #[command(subcommand)]
        action: CartAction,
    },
    /// Submit the cart as an order
    Checkout(commands::checkout::CheckoutArgs),
    /// Show the last submitted order
    Order,
}

#[derive(Subcommand)]
enum CartAction {
    /// Show cart contents and total
    Show,
    /// Add one unit of a product
    Add {
        /// Product id
        id: String,

        /// Category the product is listed in
        #[arg(short, long)]
        category: Option<String>,
    },
    /// Remove a product
    Remove {
        /// Product id
        id: String,
    },
    /// Set a product's quantity
    Set {
        /// Product id
        id: String,

        /// New quantity; anything below 1 or unparseable becomes 1
        #[arg(allow_hyphen_values = true)]
        quantity: String,
    },
    /// Change a product's quantity by a delta
    Adjust {
        /// Product id
        id: String,

        /// Amount to add; a result below 1 removes the product
        #[arg(allow_negative_numbers = true)]
        delta: i64,
    },
    /// Remove everything
    Clear,
}

/// Initialize Sentry error tracking and return guard that must be kept alive.
fn init_sentry(config: &StorefrontConfig) -> Option<sentry::ClientInitGuard> {
    let dsn = config.sentry_dsn.as_ref()?;

    let guard = sentry::init((
        dsn.as_str(),
        sentry::ClientOptions {
            release: sentry::release_name!(),
            environment: config
                .sentry_environment
                .clone()
                .map(std::borrow::Cow::Owned),
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
async fn main() {
    let cli = Cli::parse();

    let config = match StorefrontConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing_subscriber::fmt().with_writer(std::io::stderr).init();
            tracing::error!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    // Initialize Sentry (must be done before tracing subscriber)
    let _sentry_guard = init_sentry(&config);

    // Logs go to stderr so command output stays clean
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "gearup_storefront=info,gearup_cli=info".into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .init();

    if let Err(e) = run(cli, config).await {
        e.capture();
        std::process::exit(1);
    }
}

async fn run(cli: Cli, config: StorefrontConfig) -> Result<()> {
    let state = AppState::new(config)?;

    match cli.command {
        Commands::Categories => commands::catalog::categories(),
        Commands::Products { category } => {
            commands::catalog::products(&state, category.as_deref()).await?;
        }
        Commands::Product { id, category } => {
            commands::catalog::product(&state, &id, category.as_deref()).await?;
        }
        Commands::Cart { action } => match action {
            CartAction::Show => commands::cart::show(&state),
            CartAction::Add { id, category } => {
                commands::cart::add(&state, &id, category.as_deref()).await?;
            }
            CartAction::Remove { id } => commands::cart::remove(&state, &id),
            CartAction::Set { id, quantity } => commands::cart::set(&state, &id, &quantity),
            CartAction::Adjust { id, delta } => commands::cart::adjust(&state, &id, delta),
            CartAction::Clear => commands::cart::clear(&state),
        },
        Commands::Checkout(args) => commands::checkout::submit(&state, args).await?,
        Commands::Order => commands::checkout::order(&state),
    }
    Ok(())
}
