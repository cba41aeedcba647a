//! # Items Application
//!
//! Binary that wires together all the components:
//! - Load configuration from environment
//! - Initialize the repository adapter
//! - Create the item service and auth gate
//! - Start the HTTP server

mod config;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use items_hex::{AuthGate, ItemService, inbound::HttpServer};
use items_repo::build_repo;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize tracing subscriber
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,items_app=debug,items_hex=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = config::Config::from_env()?;

    tracing::info!("Starting items server on {}", config.bind_addr());
    tracing::info!("Using database: {}", config.database_url);

    // Build repository (handles connection and migration)
    let repo = build_repo(&config.database_url).await?;

    let service = ItemService::new(repo);
    let auth = AuthGate::new(config.credentials.clone());

    // Create and run the HTTP server
    let server = HttpServer::new(service, auth).with_allowed_origin(&config.allowed_origin)?;

    server.run(&config.bind_addr()).await?;

    Ok(())
}
