//! # SAML metadata proxy
//!
//! Main entry point for the metadata proxy server.

#![forbid(unsafe_code)]
#![deny(warnings)]

use smp_server::{Config, Server};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("SAML metadata proxy starting");

    let config = Config::from_env()?;
    Server::new(config)?.run().await
}
