//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the gate.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the gate.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct GateConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Per-IP rate limiting.
    pub rate_limit: RateLimitConfig,

    /// IP reputation (geolocation) service.
    pub reputation: ReputationConfig,

    /// Trusted-caller credential.
    pub credential: CredentialConfig,

    /// Content endpoint.
    pub content: ContentConfig,

    /// Audit console routes.
    pub console: ConsoleConfig,

    /// Audit store and logger.
    pub audit: AuditConfig,

    /// Security hardening.
    pub security: SecurityConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
        }
    }
}

/// Timeout configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Request timeout (total time for request/response) in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_secs: 30 }
    }
}

/// Rate limiting configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RateLimitConfig {
    /// Enable rate limiting.
    pub enabled: bool,

    /// Fixed window length in seconds.
    pub window_secs: u64,

    /// Maximum requests per IP within one window.
    pub max_requests: u32,

    /// How often elapsed windows are swept from memory, in seconds.
    pub sweep_interval_secs: u64,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            window_secs: 15 * 60,
            max_requests: 1000,
            sweep_interval_secs: 60,
        }
    }
}

/// IP reputation service configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ReputationConfig {
    /// Base URL of the lookup service; requests go to `{base_url}/json/{ip}`.
    pub base_url: String,

    /// Lookup timeout in milliseconds.
    pub timeout_ms: u64,
}

impl Default for ReputationConfig {
    fn default() -> Self {
        Self {
            base_url: "http://ip-api.com".to_string(),
            timeout_ms: 3000,
        }
    }
}

/// Trusted-caller credential: a fixed header carrying a fixed secret.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CredentialConfig {
    /// Header name (case-insensitive).
    pub header_name: String,

    /// Secret value.
    pub value: String,
}

impl Default for CredentialConfig {
    fn default() -> Self {
        Self {
            header_name: "x-ipcheck-key".to_string(),
            // WARNING: This is a placeholder! Change this in production.
            value: "CHANGE_ME_IN_PRODUCTION".to_string(),
        }
    }
}

/// Content endpoint configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ContentConfig {
    /// Route prefix; files are served at `{route_prefix}/{filename}`.
    pub route_prefix: String,

    /// Directory the files are read from.
    pub directory: String,
}

impl Default for ContentConfig {
    fn default() -> Self {
        Self {
            route_prefix: "/api/ipcheck".to_string(),
            directory: "./15".to_string(),
        }
    }
}

/// Audit console routes.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ConsoleConfig {
    /// HTML listing.
    pub list_path: String,

    /// JSON listing.
    pub records_path: String,

    /// Bulk delete.
    pub delete_path: String,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            list_path: "/mine/list".to_string(),
            records_path: "/mine/records".to_string(),
            delete_path: "/mine/delete".to_string(),
        }
    }
}

impl ConsoleConfig {
    /// Returns true if `path` is one of the console's own routes.
    pub fn is_console_path(&self, path: &str) -> bool {
        path == self.list_path || path == self.records_path || path == self.delete_path
    }
}

/// Which audit store backs the logger.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum AuditBackend {
    Sqlite,
    Memory,
}

/// Audit store and logger configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AuditConfig {
    /// Store backend.
    pub backend: AuditBackend,

    /// SQLite connection URL (ignored by the memory backend).
    pub database_url: String,

    /// Pool size for the SQLite backend.
    pub max_connections: u32,

    /// Upper bound on a single audit insert, in milliseconds.
    pub write_timeout_ms: u64,

    /// Fixed UTC offset, in minutes, used for record timestamps.
    pub utc_offset_minutes: i32,

    /// Static asset paths that are never looked up or logged.
    pub static_paths: Vec<String>,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            backend: AuditBackend::Sqlite,
            database_url: "sqlite://audit.db".to_string(),
            max_connections: 5,
            write_timeout_ms: 2000,
            utc_offset_minutes: 9 * 60,
            static_paths: vec!["/favicon.ico".to_string(), "/favicon.png".to_string()],
        }
    }
}

/// Security hardening configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SecurityConfig {
    /// Reject browser-originated requests (user-agent marker plus Origin) with 403.
    pub block_browsers: bool,

    /// User-agent substring identifying a browser.
    pub browser_marker: String,

    /// Take the client IP from the first X-Forwarded-For entry.
    pub trust_forwarded_for: bool,

    /// Include underlying error text in error responses.
    pub expose_error_details: bool,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            block_browsers: false,
            browser_marker: "Mozilla".to_string(),
            trust_forwarded_for: false,
            expose_error_details: false,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Emit JSON log lines instead of the human-readable format.
    pub json_logs: bool,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            json_logs: false,
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}
