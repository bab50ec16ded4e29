//! Caller context extracted from request headers.
//!
//! # Responsibilities
//! - Resolve the client IP (peer address, or X-Forwarded-For when trusted)
//! - Compare the credential header against the configured secret
//! - Detect browser-originated requests (user-agent marker plus Origin)

use std::net::{IpAddr, SocketAddr};

use axum::http::{header, HeaderMap};

use crate::audit::Source;
use crate::config::GateConfig;

pub const X_FORWARDED_FOR: &str = "x-forwarded-for";

/// Who is calling, attached to request extensions before any gating.
#[derive(Debug, Clone)]
pub struct CallerContext {
    pub ip: IpAddr,
    /// Credential header value as supplied, correct or not.
    pub credential: Option<String>,
    /// Credential present and equal to the configured secret.
    pub trusted: bool,
    /// User-agent carries the browser marker and an Origin header is present.
    pub browser_like: bool,
    pub source: Source,
}

impl CallerContext {
    pub fn from_headers(headers: &HeaderMap, peer: SocketAddr, config: &GateConfig) -> Self {
        let ip = if config.security.trust_forwarded_for {
            forwarded_ip(headers).unwrap_or_else(|| peer.ip())
        } else {
            peer.ip()
        };

        let credential = headers
            .get(config.credential.header_name.as_str())
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let trusted = credential.as_deref() == Some(config.credential.value.as_str());

        let ua_is_browser = headers
            .get(header::USER_AGENT)
            .and_then(|v| v.to_str().ok())
            .map(|ua| ua.contains(config.security.browser_marker.as_str()))
            .unwrap_or(false);
        let browser_like = ua_is_browser && headers.contains_key(header::ORIGIN);

        let source = if !trusted && ua_is_browser {
            Source::Browser
        } else {
            Source::Tool
        };

        Self {
            ip,
            credential,
            trusted,
            browser_like,
            source,
        }
    }
}

/// First entry of X-Forwarded-For, if it parses as an IP.
fn forwarded_ip(headers: &HeaderMap) -> Option<IpAddr> {
    headers
        .get(X_FORWARDED_FOR)?
        .to_str()
        .ok()?
        .split(',')
        .next()?
        .trim()
        .parse()
        .ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn peer() -> SocketAddr {
        "10.0.0.1:5555".parse().unwrap()
    }

    fn config() -> GateConfig {
        let mut config = GateConfig::default();
        config.credential.value = "s3cret".into();
        config
    }

    #[test]
    fn test_untrusted_tool() {
        let ctx = CallerContext::from_headers(&HeaderMap::new(), peer(), &config());
        assert_eq!(ctx.ip, peer().ip());
        assert!(!ctx.trusted);
        assert!(ctx.credential.is_none());
        assert_eq!(ctx.source, Source::Tool);
    }

    #[test]
    fn test_credential_must_match() {
        let mut headers = HeaderMap::new();
        headers.insert("x-ipcheck-key", HeaderValue::from_static("wrong"));
        let ctx = CallerContext::from_headers(&headers, peer(), &config());
        assert!(!ctx.trusted);
        assert_eq!(ctx.credential.as_deref(), Some("wrong"));

        // Header name lookup is case-insensitive.
        let mut cfg = config();
        cfg.credential.header_name = "X-IpCheck-Key".into();
        headers.insert("x-ipcheck-key", HeaderValue::from_static("s3cret"));
        let ctx = CallerContext::from_headers(&headers, peer(), &cfg);
        assert!(ctx.trusted);
    }

    #[test]
    fn test_browser_detection_needs_origin() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::USER_AGENT,
            HeaderValue::from_static("Mozilla/5.0 (X11; Linux x86_64)"),
        );
        let ctx = CallerContext::from_headers(&headers, peer(), &config());
        assert!(!ctx.browser_like);
        assert_eq!(ctx.source, Source::Browser);

        headers.insert(header::ORIGIN, HeaderValue::from_static("https://example.com"));
        let ctx = CallerContext::from_headers(&headers, peer(), &config());
        assert!(ctx.browser_like);
    }

    #[test]
    fn test_forwarded_for_only_when_trusted() {
        let mut headers = HeaderMap::new();
        headers.insert(X_FORWARDED_FOR, HeaderValue::from_static("1.2.3.4, 10.0.0.7"));

        let ctx = CallerContext::from_headers(&headers, peer(), &config());
        assert_eq!(ctx.ip, peer().ip());

        let mut cfg = config();
        cfg.security.trust_forwarded_for = true;
        let ctx = CallerContext::from_headers(&headers, peer(), &cfg);
        assert_eq!(ctx.ip, "1.2.3.4".parse::<IpAddr>().unwrap());

        headers.insert(X_FORWARDED_FOR, HeaderValue::from_static("garbage"));
        let ctx = CallerContext::from_headers(&headers, peer(), &cfg);
        assert_eq!(ctx.ip, peer().ip());
    }
}
