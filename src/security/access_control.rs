//! Access gate.
//!
//! Decides, per request, whether to serve, echo reputation data back, or
//! refuse. Runs after the rate limiter, which has already attached a
//! [`CallerContext`].
//!
//! # Order of evaluation
//! ```text
//! static asset path  → pass through (no lookup, no audit)
//! console path       → best-effort lookup, audit, pass through
//! any other path     → lookup (failure: audit degraded record, 502)
//!                    → audit
//!                    → decide(): browser block / trusted serve / echo / forbid
//! ```

use axum::{
    body::Body,
    extract::State,
    http::{Method, Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};

use crate::audit::AuditEntry;
use crate::config::GateConfig;
use crate::http::response::GateError;
use crate::http::server::AppState;
use crate::observability::metrics;
use crate::reputation::Geolocation;
use crate::security::headers::CallerContext;

/// Where a request path falls for gating purposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathClass {
    /// Favicon and similar: never looked up or logged.
    Static,
    /// The audit console's own routes.
    Console,
    /// `{route_prefix}/{filename}`.
    Content,
    Other,
}

pub fn classify_path(path: &str, config: &GateConfig) -> PathClass {
    if config.audit.static_paths.iter().any(|p| p == path) {
        return PathClass::Static;
    }
    if config.console.is_console_path(path) {
        return PathClass::Console;
    }
    let is_content = path
        .strip_prefix(config.content.route_prefix.as_str())
        .and_then(|rest| rest.strip_prefix('/'))
        .map(|name| !name.is_empty() && !name.contains('/'))
        .unwrap_or(false);
    if is_content {
        PathClass::Content
    } else {
        PathClass::Other
    }
}

/// Outcome for a gated (non-static, non-console) request whose lookup succeeded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// Continue to routing (content endpoint or 404).
    Serve,
    /// Answer with the reputation payload itself.
    EchoReputation,
    /// 403 with an empty body.
    Forbid,
}

impl Decision {
    fn label(&self, class: PathClass) -> &'static str {
        match (self, class) {
            (Decision::Serve, PathClass::Content) => "serve_content",
            (Decision::Serve, _) => "pass_through",
            (Decision::EchoReputation, _) => "echo",
            (Decision::Forbid, _) => "forbid",
        }
    }
}

/// Inputs to [`decide`].
#[derive(Debug, Clone, Copy)]
pub struct GateInput<'a> {
    pub method: &'a Method,
    pub trusted: bool,
    pub browser_like: bool,
    pub block_browsers: bool,
}

pub fn decide(input: GateInput<'_>) -> Decision {
    if input.block_browsers && input.browser_like {
        return Decision::Forbid;
    }
    if input.trusted {
        return Decision::Serve;
    }
    if *input.method == Method::GET {
        Decision::EchoReputation
    } else {
        Decision::Forbid
    }
}

pub async fn access_gate_middleware(
    State(state): State<AppState>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let expose = state.config.security.expose_error_details;
    let class = classify_path(request.uri().path(), &state.config);
    if class == PathClass::Static {
        return next.run(request).await;
    }

    let Some(ctx) = request.extensions().get::<CallerContext>().cloned() else {
        return GateError::Internal("caller context missing".to_string()).into_response_with(expose);
    };
    let url = request
        .uri()
        .path_and_query()
        .map(|pq| pq.as_str().to_string())
        .unwrap_or_else(|| request.uri().path().to_string());
    let method = request.method().clone();

    let audit = |location: Geolocation| {
        let state = state.clone();
        let ctx = ctx.clone();
        let url = url.clone();
        let method = method.clone();
        async move {
            // Failures are logged and counted inside the logger.
            let _ = state
                .audit
                .record(AuditEntry {
                    location: &location,
                    method: method.as_str(),
                    credential: ctx.credential.as_deref(),
                    client_ip: ctx.ip.to_string(),
                    url: &url,
                    source: ctx.source,
                })
                .await;
        }
    };

    if class == PathClass::Console {
        let location = match state.reputation.lookup(ctx.ip).await {
            Ok(rep) => rep.location,
            Err(_) => Geolocation::unknown(),
        };
        audit(location).await;
        return next.run(request).await;
    }

    let reputation = match state.reputation.lookup(ctx.ip).await {
        Ok(rep) => rep,
        Err(e) => {
            audit(Geolocation::unknown()).await;
            metrics::record_decision("lookup_failed");
            return GateError::ReputationLookupFailed(e).into_response_with(expose);
        }
    };
    audit(reputation.location.clone()).await;

    let decision = decide(GateInput {
        method: &method,
        trusted: ctx.trusted,
        browser_like: ctx.browser_like,
        block_browsers: state.config.security.block_browsers,
    });
    metrics::record_decision(decision.label(class));
    tracing::debug!(
        client_ip = %ctx.ip,
        method = %method,
        url = %url,
        trusted = ctx.trusted,
        decision = ?decision,
        "Gate decision"
    );

    match decision {
        Decision::Serve => next.run(request).await,
        Decision::EchoReputation => Json(reputation.raw).into_response(),
        Decision::Forbid => StatusCode::FORBIDDEN.into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(method: &Method, trusted: bool, browser_like: bool, block: bool) -> GateInput<'_> {
        GateInput {
            method,
            trusted,
            browser_like,
            block_browsers: block,
        }
    }

    #[test]
    fn test_classify_path() {
        let config = GateConfig::default();
        assert_eq!(classify_path("/favicon.ico", &config), PathClass::Static);
        assert_eq!(classify_path("/mine/list", &config), PathClass::Console);
        assert_eq!(classify_path("/mine/delete", &config), PathClass::Console);
        assert_eq!(classify_path("/api/ipcheck/logo.svg", &config), PathClass::Content);
        assert_eq!(classify_path("/api/ipcheck/", &config), PathClass::Other);
        assert_eq!(classify_path("/api/ipcheck/a/b", &config), PathClass::Other);
        assert_eq!(classify_path("/api/ipcheckx/a", &config), PathClass::Other);
        assert_eq!(classify_path("/", &config), PathClass::Other);
    }

    #[test]
    fn test_decision_table() {
        let get = Method::GET;
        let post = Method::POST;

        assert_eq!(decide(input(&get, true, false, false)), Decision::Serve);
        assert_eq!(decide(input(&post, true, false, false)), Decision::Serve);
        assert_eq!(decide(input(&get, false, false, false)), Decision::EchoReputation);
        assert_eq!(decide(input(&post, false, false, false)), Decision::Forbid);
    }

    #[test]
    fn test_browser_block_overrides_credential() {
        let get = Method::GET;
        assert_eq!(decide(input(&get, true, true, true)), Decision::Forbid);
        assert_eq!(decide(input(&get, false, true, true)), Decision::Forbid);
        // Only when enabled.
        assert_eq!(decide(input(&get, true, true, false)), Decision::Serve);
    }
}
