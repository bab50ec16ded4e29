//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, window > 0)
//! - Validate addresses, URLs and header names
//! - Detect colliding routes
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: GateConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use axum::http::HeaderName;

use crate::config::schema::GateConfig;

/// A single semantic problem with the configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("{field} must be greater than zero")]
    Zero { field: &'static str },

    #[error("{field} is not a valid socket address: {value}")]
    BadAddress { field: &'static str, value: String },

    #[error("reputation.base_url is not a valid URL: {0}")]
    BadUrl(String),

    #[error("credential.header_name is not a valid header name: {0}")]
    BadHeaderName(String),

    #[error("credential.value must not be empty")]
    EmptyCredential,

    #[error("{field} must start with '/': {value}")]
    RelativePath { field: &'static str, value: String },

    #[error("route {0} is used more than once")]
    DuplicateRoute(String),

    #[error("static path {0} falls under the content route")]
    ShadowedContent(String),

    #[error("audit.utc_offset_minutes out of range: {0}")]
    BadOffset(i32),
}

/// Check `config` and return every violation found.
pub fn validate_config(config: &GateConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    let positive = [
        ("timeouts.request_secs", config.timeouts.request_secs),
        ("rate_limit.window_secs", config.rate_limit.window_secs),
        ("rate_limit.max_requests", u64::from(config.rate_limit.max_requests)),
        ("rate_limit.sweep_interval_secs", config.rate_limit.sweep_interval_secs),
        ("reputation.timeout_ms", config.reputation.timeout_ms),
        ("audit.write_timeout_ms", config.audit.write_timeout_ms),
        ("audit.max_connections", u64::from(config.audit.max_connections)),
    ];
    for (field, value) in positive {
        if value == 0 {
            errors.push(ValidationError::Zero { field });
        }
    }

    check_address(&mut errors, "listener.bind_address", &config.listener.bind_address);
    if config.observability.metrics_enabled {
        check_address(
            &mut errors,
            "observability.metrics_address",
            &config.observability.metrics_address,
        );
    }

    if url::Url::parse(&config.reputation.base_url).is_err() {
        errors.push(ValidationError::BadUrl(config.reputation.base_url.clone()));
    }

    if HeaderName::from_bytes(config.credential.header_name.as_bytes()).is_err() {
        errors.push(ValidationError::BadHeaderName(
            config.credential.header_name.clone(),
        ));
    }
    if config.credential.value.is_empty() {
        errors.push(ValidationError::EmptyCredential);
    }

    let routes = [
        ("content.route_prefix", &config.content.route_prefix),
        ("console.list_path", &config.console.list_path),
        ("console.records_path", &config.console.records_path),
        ("console.delete_path", &config.console.delete_path),
    ];
    let mut seen: Vec<&str> = Vec::new();
    for (field, value) in routes {
        if !value.starts_with('/') {
            errors.push(ValidationError::RelativePath {
                field,
                value: value.clone(),
            });
        }
        if seen.contains(&value.as_str()) {
            errors.push(ValidationError::DuplicateRoute(value.clone()));
        }
        seen.push(value);
    }

    let content_scope = format!("{}/", config.content.route_prefix);
    for path in &config.audit.static_paths {
        if !path.starts_with('/') {
            errors.push(ValidationError::RelativePath {
                field: "audit.static_paths",
                value: path.clone(),
            });
        }
        if seen.contains(&path.as_str()) {
            errors.push(ValidationError::DuplicateRoute(path.clone()));
        } else if path.starts_with(&content_scope) {
            errors.push(ValidationError::ShadowedContent(path.clone()));
        }
        seen.push(path);
    }

    if config.audit.utc_offset_minutes.abs() > 18 * 60 {
        errors.push(ValidationError::BadOffset(config.audit.utc_offset_minutes));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_address(errors: &mut Vec<ValidationError>, field: &'static str, value: &str) {
    if value.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::BadAddress {
            field,
            value: value.to_string(),
        });
    }
}
