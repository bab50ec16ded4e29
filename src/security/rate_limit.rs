//! Fixed-window rate limiting keyed by client IP.

use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    body::Body,
    extract::{ConnectInfo, State},
    http::Request,
    middleware::Next,
    response::{IntoResponse, Response},
};
use dashmap::DashMap;
use tokio::sync::broadcast;

use crate::config::RateLimitConfig;
use crate::http::response::GateError;
use crate::http::server::AppState;
use crate::observability::metrics;
use crate::security::headers::CallerContext;

/// Request count for one IP within the current window.
#[derive(Debug)]
struct RateWindow {
    count: u32,
    started: Instant,
}

/// Per-IP request counters.
///
/// Each IP's window is updated under its own map-shard lock, so concurrent
/// requests from the same IP are counted exactly.
pub struct RateLimiter {
    windows: DashMap<IpAddr, RateWindow>,
    window: Duration,
    max_requests: u32,
    enabled: bool,
}

impl RateLimiter {
    pub fn new(config: &RateLimitConfig) -> Self {
        Self {
            windows: DashMap::new(),
            window: Duration::from_secs(config.window_secs),
            max_requests: config.max_requests,
            enabled: config.enabled,
        }
    }

    /// Count this request and report whether it is within the quota.
    /// Trusted callers are never counted or throttled.
    pub fn allow(&self, ip: IpAddr, trusted: bool) -> bool {
        self.allow_at(ip, trusted, Instant::now())
    }

    fn allow_at(&self, ip: IpAddr, trusted: bool, now: Instant) -> bool {
        if trusted || !self.enabled {
            return true;
        }

        let mut entry = self.windows.entry(ip).or_insert_with(|| RateWindow {
            count: 0,
            started: now,
        });
        if now.duration_since(entry.started) >= self.window {
            entry.count = 0;
            entry.started = now;
        }
        entry.count = entry.count.saturating_add(1);
        entry.count <= self.max_requests
    }

    /// Drop windows that have elapsed. Returns how many were removed.
    pub fn sweep(&self) -> usize {
        self.sweep_at(Instant::now())
    }

    fn sweep_at(&self, now: Instant) -> usize {
        let before = self.windows.len();
        self.windows
            .retain(|_, w| now.duration_since(w.started) < self.window);
        before.saturating_sub(self.windows.len())
    }

    /// Number of IPs with a live window.
    pub fn tracked(&self) -> usize {
        self.windows.len()
    }

    /// Periodically sweep elapsed windows until shutdown.
    pub async fn run_sweeper(self: Arc<Self>, every: Duration, mut shutdown: broadcast::Receiver<()>) {
        let mut ticker = tokio::time::interval(every);
        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let removed = self.sweep();
                    metrics::record_rate_windows(self.tracked());
                    if removed > 0 {
                        tracing::debug!(removed, tracked = self.tracked(), "Swept rate windows");
                    }
                }
                _ = shutdown.recv() => {
                    tracing::debug!("Rate window sweeper stopping");
                    break;
                }
            }
        }
    }
}

/// Resolve the caller, then apply the per-IP quota before anything else runs.
pub async fn rate_limit_middleware(
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    State(state): State<AppState>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    let start = Instant::now();
    let method = request.method().to_string();
    let ctx = CallerContext::from_headers(request.headers(), addr, &state.config);

    let response = if state.limiter.allow(ctx.ip, ctx.trusted) {
        request.extensions_mut().insert(ctx);
        next.run(request).await
    } else {
        tracing::warn!(client_ip = %ctx.ip, path = %request.uri().path(), "Rate limit exceeded");
        metrics::record_rate_limited();
        GateError::RateLimited.into_response()
    };

    metrics::record_request(&method, response.status().as_u16(), start);
    response
}
