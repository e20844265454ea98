//! Axum server setup
//!
//! Server skeleton with:
//! - Localhost-only CORS by default
//! - Tracing and timeout middleware
//! - Graceful shutdown on SIGTERM/Ctrl+C

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::http::{HeaderValue, StatusCode};
use axum::middleware::{from_fn, from_fn_with_state};
use axum::Router;
use repoapi_core::{FsRepoOpener, FsRepoStore, RepoOpener, RepoStore, Settings};
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use super::middleware::{api_contexter, contexter};
use super::routes;

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to bind to (default: 127.0.0.1:3000)
    pub bind_addr: SocketAddr,

    /// Allow permissive CORS (default: false = localhost only)
    pub cors_permissive: bool,

    /// Per-request timeout
    pub timeout: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 3000)),
            cors_permissive: false,
            timeout: Duration::from_secs(30),
        }
    }
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    settings: Arc<Settings>,
    store: Arc<dyn RepoStore>,
    opener: Arc<dyn RepoOpener>,
}

impl AppState {
    pub fn new(settings: Settings, store: Arc<dyn RepoStore>, opener: Arc<dyn RepoOpener>) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                settings: Arc::new(settings),
                store,
                opener,
            }),
        }
    }

    /// State backed by the filesystem under `settings.repo_root`
    pub fn from_settings(settings: Settings) -> Self {
        let store = Arc::new(FsRepoStore::new(settings.repo_root.clone()));
        Self::new(settings, store, Arc::new(FsRepoOpener))
    }

    pub fn settings(&self) -> &Settings {
        &self.inner.settings
    }

    pub(crate) fn settings_arc(&self) -> Arc<Settings> {
        self.inner.settings.clone()
    }

    pub fn store(&self) -> &dyn RepoStore {
        self.inner.store.as_ref()
    }

    pub fn opener(&self) -> &dyn RepoOpener {
        self.inner.opener.as_ref()
    }
}

/// Build the application router.
///
/// API routes get the request contexts; `/health` does not.
pub fn build_router(state: AppState) -> Router {
    let api = routes::repos::router(state.clone())
        .merge(routes::orgs::router(state.clone()))
        .route_layer(from_fn(api_contexter))
        .route_layer(from_fn_with_state(state.clone(), contexter));

    Router::new()
        .merge(routes::health::router())
        .merge(api)
        .with_state(state)
}

/// Run the HTTP server until a shutdown signal arrives.
pub async fn run_server(state: AppState, config: ServerConfig) -> Result<(), ServerError> {
    tracing::info!(
        repo_root = %state.settings().repo_root.display(),
        app_url = %state.settings().app_url,
        "settings loaded"
    );

    let app = with_service_layers(build_router(state), &config)?;

    let listener = TcpListener::bind(config.bind_addr).await?;
    tracing::info!("Server listening on {}", config.bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

/// Wrap a router in tracing, the request timeout, and CORS.
///
/// Requests that outlive `config.timeout` are answered with 408.
fn with_service_layers(router: Router, config: &ServerConfig) -> Result<Router, ServerError> {
    let cors = if config.cors_permissive {
        tracing::warn!("CORS: Permissive mode enabled - all origins allowed");
        CorsLayer::permissive()
    } else {
        CorsLayer::new()
            .allow_origin([
                "http://localhost:3000".parse::<HeaderValue>()?,
                "http://127.0.0.1:3000".parse::<HeaderValue>()?,
            ])
            .allow_methods(Any)
            .allow_headers(Any)
    };

    let middleware = ServiceBuilder::new()
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            config.timeout,
        ))
        .layer(cors);

    Ok(router.layer(middleware))
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, starting shutdown");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, starting shutdown");
        }
    }
}

/// Server error type
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid CORS origin: {0}")]
    InvalidOrigin(#[from] axum::http::header::InvalidHeaderValue),
}
