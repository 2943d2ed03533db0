//! # smp-server
//!
//! HTTP server for the SAML metadata proxy.
//!
//! Serves `GET /{federation}?entityId=...`: the single entity descriptor
//! named by `entityId`, carved out of the federation's verified aggregate.
//! Health probes live under `/health`.
//!
//! ## Usage
//!
//! ```ignore
//! use smp_server::{Config, Server};
//!
//! let config = Config::from_env()?;
//! Server::new(config)?.run().await?;
//! ```

#![forbid(unsafe_code)]
#![deny(warnings)]
#![deny(missing_docs)]

pub mod config;
pub mod error;
pub mod handlers;
pub mod router;
pub mod state;

pub use config::{Config, ServerConfig};
pub use error::{ApiError, ApiResult};
pub use router::create_router;
pub use state::AppState;

use std::future::Future;
use std::sync::Arc;

use anyhow::Context;
use axum::Router;
use smp_cache::{HttpMetadataFetcher, MetadataCache};
use smp_federation::FederationRegistry;
use tokio::net::TcpListener;

/// The metadata proxy server.
pub struct Server {
    config: Config,
    cache: Arc<MetadataCache>,
}

impl Server {
    /// Creates a new server instance.
    ///
    /// Builds the federation registry, loading every pinned certificate, so
    /// configuration errors surface here and not on the first request.
    pub fn new(config: Config) -> anyhow::Result<Self> {
        if config.federations.is_empty() {
            anyhow::bail!("no federations configured");
        }

        let registry = FederationRegistry::from_config(&config.federations)
            .context("invalid federation configuration")?;
        tracing::info!(
            federations = ?registry.names().collect::<Vec<_>>(),
            "Federation registry built"
        );

        let fetcher = HttpMetadataFetcher::with_timeout(config.server.fetch_timeout())?;
        let cache = MetadataCache::new(Arc::new(registry), Arc::new(fetcher));

        Ok(Self {
            config,
            cache: Arc::new(cache),
        })
    }

    /// Runs the server.
    ///
    /// This binds the configured address and blocks until it receives a
    /// shutdown signal.
    pub async fn run(self) -> anyhow::Result<()> {
        let server = &self.config.server;
        let listener = TcpListener::bind((server.host.as_str(), server.port))
            .await
            .with_context(|| format!("cannot bind {}", server.bind_address()))?;
        self.serve(listener, shutdown_signal()).await
    }

    /// Serves on an already bound listener until `shutdown` completes.
    pub async fn serve(
        self,
        listener: TcpListener,
        shutdown: impl Future<Output = ()> + Send + 'static,
    ) -> anyhow::Result<()> {
        tracing::info!("Server listening on http://{}", listener.local_addr()?);

        axum::serve(listener, self.router())
            .with_graceful_shutdown(shutdown)
            .await?;

        tracing::info!("Server shutdown complete");
        Ok(())
    }

    /// Creates the router without starting the server.
    ///
    /// This is useful for integration testing.
    pub fn router(&self) -> Router {
        create_router(AppState::new(self.cache.clone()))
    }

    /// Returns the metadata cache.
    #[must_use]
    pub const fn cache(&self) -> &Arc<MetadataCache> {
        &self.cache
    }

    /// Returns the server configuration.
    #[must_use]
    pub const fn config(&self) -> &Config {
        &self.config
    }
}

/// Waits for a shutdown signal.
///
/// A signal handler that cannot be installed never fires; the other one
/// still does.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
