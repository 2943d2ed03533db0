//! Common test utilities and fixtures.

use std::io::Write;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::Router;
use chrono::{DateTime, TimeDelta, Utc};
use parking_lot::Mutex;
use reqwest::Client;
use smp_federation::FederationConfigEntry;
use smp_metadata::testing::{aggregate_xml, TestSigner};
use smp_server::{Config, Server, ServerConfig};
use tempfile::NamedTempFile;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use url::Url;

/// Entity IDs present in the default aggregate.
pub const ENTITY_IDS: [&str; 2] = ["https://sp.example.test/shibboleth", "urn:example:sp:two"];

/// Initializes tracing once for the test binary.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("smp_server=debug,smp_cache=debug,smp_metadata=debug")
        .with_test_writer()
        .try_init();
}

#[derive(Clone)]
struct UpstreamState {
    response: Arc<Mutex<(StatusCode, String)>>,
    hits: Arc<AtomicUsize>,
}

async fn serve_aggregate(State(state): State<UpstreamState>) -> impl IntoResponse {
    state.hits.fetch_add(1, Ordering::SeqCst);
    let (status, body) = state.response.lock().clone();
    (status, [(header::CONTENT_TYPE, "application/samlmetadata+xml")], body)
}

/// An HTTP server publishing one aggregate at `/aggregate.xml`.
pub struct Upstream {
    /// Where the aggregate is published.
    pub url: Url,
    state: UpstreamState,
    _shutdown_tx: oneshot::Sender<()>,
}

impl Upstream {
    /// Starts serving `body` with status 200.
    pub async fn start(body: String) -> anyhow::Result<Self> {
        let state = UpstreamState {
            response: Arc::new(Mutex::new((StatusCode::OK, body))),
            hits: Arc::new(AtomicUsize::new(0)),
        };
        let app = Router::new()
            .route("/aggregate.xml", get(serve_aggregate))
            .with_state(state.clone());

        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let url = Url::parse(&format!("http://{}/aggregate.xml", listener.local_addr()?))?;
        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
        tokio::spawn(async move {
            let _ = axum::serve(listener, app)
                .with_graceful_shutdown(async move {
                    let _ = shutdown_rx.await;
                })
                .await;
        });

        Ok(Self {
            url,
            state,
            _shutdown_tx: shutdown_tx,
        })
    }

    /// Replaces the published aggregate.
    pub fn publish(&self, body: String) {
        *self.state.response.lock() = (StatusCode::OK, body);
    }

    /// Makes every request fail with `status`.
    pub fn fail_with(&self, status: StatusCode) {
        *self.state.response.lock() = (status, "upstream unavailable".to_string());
    }

    /// Number of requests served so far.
    pub fn hits(&self) -> usize {
        self.state.hits.load(Ordering::SeqCst)
    }
}

/// Writes a PEM certificate to a temporary pinned-certificate file.
pub fn pinned_certificate(signer: &TestSigner) -> anyhow::Result<NamedTempFile> {
    let mut file = NamedTempFile::new()?;
    file.write_all(signer.certificate_pem().as_bytes())?;
    Ok(file)
}

/// A signed aggregate of `entity_ids` valid until `valid_until`.
pub fn signed_aggregate(
    signer: &TestSigner,
    valid_until: DateTime<Utc>,
    entity_ids: &[&str],
) -> String {
    signer.sign_aggregate(&aggregate_xml(valid_until, entity_ids))
}

/// Test environment: an upstream, and a proxy with three federations on it.
///
/// `fed` validates signatures and `alias` shares its source URI. `lenient`
/// skips signature validation and reads the same aggregate through a
/// distinct URI, so it has a cache entry of its own.
pub struct TestEnv {
    /// The aggregate publisher.
    pub upstream: Upstream,
    /// The key whose certificate is pinned for every federation.
    pub signer: TestSigner,
    /// Base URL of the running proxy.
    pub base_url: String,
    /// HTTP client for testing.
    pub client: Client,
    _pinned: NamedTempFile,
    _shutdown_tx: oneshot::Sender<()>,
}

impl TestEnv {
    /// Starts an environment serving the default aggregate.
    pub async fn new() -> anyhow::Result<Self> {
        let signer = TestSigner::generate();
        let aggregate = signed_aggregate(&signer, Utc::now() + TimeDelta::hours(1), &ENTITY_IDS);
        Self::with_aggregate(signer, aggregate).await
    }

    /// Starts an environment whose upstream initially serves `aggregate`.
    pub async fn with_aggregate(signer: TestSigner, aggregate: String) -> anyhow::Result<Self> {
        init_tracing();

        let upstream = Upstream::start(aggregate).await?;
        let pinned = pinned_certificate(&signer)?;
        let source = upstream.url.as_str();
        let lenient_source = format!("{source}?lenient");

        let config = Config {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 0,
                fetch_timeout_secs: 5,
            },
            federations: vec![
                FederationConfigEntry::new("fed", source, pinned.path()),
                FederationConfigEntry::new("alias", source, pinned.path()),
                FederationConfigEntry::new("lenient", lenient_source, pinned.path())
                    .with_skip_signature_validation(true),
            ],
        };

        let server = Server::new(config)?;
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let base_url = format!("http://{}", listener.local_addr()?);

        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
        tokio::spawn(async move {
            let shutdown = async move {
                let _ = shutdown_rx.await;
            };
            if let Err(e) = server.serve(listener, shutdown).await {
                tracing::error!("Server error: {}", e);
            }
        });

        let client = Client::builder().timeout(Duration::from_secs(30)).build()?;

        Ok(Self {
            upstream,
            signer,
            base_url,
            client,
            _pinned: pinned,
            _shutdown_tx: shutdown_tx,
        })
    }

    /// `GET /{federation}` with an optional `entityId`.
    pub async fn get_entity(
        &self,
        federation: &str,
        entity_id: Option<&str>,
    ) -> anyhow::Result<reqwest::Response> {
        let mut request = self.client.get(format!("{}/{federation}", self.base_url));
        if let Some(entity_id) = entity_id {
            request = request.query(&[("entityId", entity_id)]);
        }
        Ok(request.send().await?)
    }
}
