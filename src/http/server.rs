//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum Router (content endpoint, console, static assets, fallback)
//! - Wire up middleware (request id, tracing, timeout, rate limit, access gate)
//! - Start background tasks (rate window sweeper)
//! - Serve until the shutdown signal fires

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Body,
    http::{Request, StatusCode},
    middleware,
    response::{IntoResponse, Response},
    routing::{any, get},
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower::ServiceBuilder;
use tower_http::{
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::admin::setup_console_router;
use crate::audit::{open_store, AuditClock, AuditLogger, AuditStore, StoreError};
use crate::config::GateConfig;
use crate::http::content::{serve_file, ContentDir};
use crate::http::request::{request_id_of, UuidRequestId};
use crate::http::response::GateError;
use crate::lifecycle::shutdown;
use crate::reputation::{IpApiClient, LookupError, ReputationLookup};
use crate::security::access_control::access_gate_middleware;
use crate::security::rate_limit::{rate_limit_middleware, RateLimiter};

/// Error raised while assembling the server.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("invalid UTC offset: {0} minutes")]
    InvalidOffset(i32),

    #[error("audit store: {0}")]
    Store(#[from] StoreError),

    #[error("reputation client: {0}")]
    Reputation(#[from] LookupError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Application state injected into handlers and middleware.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<GateConfig>,
    pub limiter: Arc<RateLimiter>,
    pub reputation: Arc<dyn ReputationLookup>,
    pub audit: AuditLogger,
    pub content: ContentDir,
}

impl AppState {
    pub fn new(
        config: GateConfig,
        store: Arc<dyn AuditStore>,
        reputation: Arc<dyn ReputationLookup>,
    ) -> Result<Self, ServerError> {
        let clock = AuditClock::new(config.audit.utc_offset_minutes)
            .ok_or(ServerError::InvalidOffset(config.audit.utc_offset_minutes))?;
        let audit = AuditLogger::new(
            store,
            clock,
            Duration::from_millis(config.audit.write_timeout_ms),
        );

        Ok(Self {
            limiter: Arc::new(RateLimiter::new(&config.rate_limit)),
            content: ContentDir::new(&config.content.directory),
            reputation,
            audit,
            config: Arc::new(config),
        })
    }
}

/// HTTP server for the gate.
pub struct HttpServer {
    router: Router,
    state: AppState,
}

impl HttpServer {
    /// Create a server from explicit collaborators.
    pub fn new(
        config: GateConfig,
        store: Arc<dyn AuditStore>,
        reputation: Arc<dyn ReputationLookup>,
    ) -> Result<Self, ServerError> {
        let state = AppState::new(config, store, reputation)?;
        let router = Self::build_router(state.clone());
        Ok(Self { router, state })
    }

    /// Create a server with the configured audit store and ip-api client.
    pub async fn from_config(config: GateConfig) -> Result<Self, ServerError> {
        let store = open_store(&config.audit).await?;
        let reputation = Arc::new(IpApiClient::new(&config.reputation)?);
        Self::new(config, store, reputation)
    }

    /// Build the Axum router with all middleware layers.
    ///
    /// Layer order, outermost first: request id, trace, timeout,
    /// rate limit, access gate, handlers.
    #[allow(deprecated)]
    fn build_router(state: AppState) -> Router {
        let config = state.config.clone();
        let content_route = format!("{}/{{filename}}", config.content.route_prefix);

        let mut router = Router::new()
            .route(&content_route, get(serve_file))
            .merge(setup_console_router(&config.console));
        for path in &config.audit.static_paths {
            router = router.route(path, any(static_asset));
        }

        router
            .fallback(not_found)
            .layer(middleware::from_fn_with_state(
                state.clone(),
                access_gate_middleware,
            ))
            .layer(middleware::from_fn_with_state(
                state.clone(),
                rate_limit_middleware,
            ))
            .with_state(state)
            .layer(
                ServiceBuilder::new()
                    .layer(SetRequestIdLayer::x_request_id(UuidRequestId))
                    .layer(TraceLayer::new_for_http().make_span_with(
                        |request: &Request<Body>| {
                            tracing::info_span!(
                                "request",
                                method = %request.method(),
                                uri = %request.uri(),
                                request_id = %request_id_of(request),
                            )
                        },
                    ))
                    .layer(PropagateRequestIdLayer::x_request_id())
                    .layer(TimeoutLayer::new(Duration::from_secs(
                        config.timeouts.request_secs,
                    ))),
            )
    }

    /// Run the server, accepting connections on the given listener.
    pub async fn run(
        self,
        listener: TcpListener,
        shutdown_rx: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            content_prefix = %self.state.config.content.route_prefix,
            "HTTP server starting"
        );

        if self.state.config.rate_limit.enabled {
            let every = Duration::from_secs(self.state.config.rate_limit.sweep_interval_secs);
            tokio::spawn(
                self.state
                    .limiter
                    .clone()
                    .run_sweeper(every, shutdown_rx.resubscribe()),
            );
        }

        let app = self
            .router
            .into_make_service_with_connect_info::<SocketAddr>();

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown::wait(shutdown_rx))
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

async fn static_asset() -> StatusCode {
    StatusCode::NO_CONTENT
}

async fn not_found() -> Response {
    GateError::NotFound.into_response()
}
