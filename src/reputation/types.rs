//! Reputation lookup results.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Placeholder stored when a location field is missing or the lookup failed.
pub const UNKNOWN: &str = "unknown";

/// Location data for one client IP.
///
/// Every field is always populated; absent data is [`UNKNOWN`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Geolocation {
    pub country: String,
    pub region: String,
    pub city: String,
}

impl Geolocation {
    /// All fields unknown.
    pub fn unknown() -> Self {
        Self {
            country: UNKNOWN.to_string(),
            region: UNKNOWN.to_string(),
            city: UNKNOWN.to_string(),
        }
    }

    /// Build from an ip-api style payload (`country`, `regionName`, `city`).
    pub fn from_payload(payload: &Value) -> Self {
        Self {
            country: field_or_unknown(payload, "country"),
            region: field_or_unknown(payload, "regionName"),
            city: field_or_unknown(payload, "city"),
        }
    }

    /// True when no field had to be substituted.
    pub fn is_complete(&self) -> bool {
        self.country != UNKNOWN && self.region != UNKNOWN && self.city != UNKNOWN
    }
}

fn field_or_unknown(payload: &Value, key: &str) -> String {
    match payload.get(key).and_then(Value::as_str) {
        Some(s) if !s.trim().is_empty() => s.to_string(),
        _ => UNKNOWN.to_string(),
    }
}

/// A successful lookup: the parsed location plus the service's own answer.
#[derive(Debug, Clone, PartialEq)]
pub struct Reputation {
    pub location: Geolocation,
    /// Body returned by the lookup service, echoed to untrusted callers.
    pub raw: Value,
}

impl Reputation {
    pub fn from_payload(raw: Value) -> Self {
        Self {
            location: Geolocation::from_payload(&raw),
            raw,
        }
    }
}

/// Why a lookup produced no answer.
///
/// Distinct from a successful lookup whose fields are all [`UNKNOWN`].
#[derive(Debug, thiserror::Error)]
pub enum LookupError {
    #[error("lookup timed out after {0} ms")]
    Timeout(u64),

    #[error("lookup transport error: {0}")]
    Transport(String),

    #[error("lookup service returned status {0}")]
    Status(u16),

    #[error("lookup service returned a malformed payload: {0}")]
    Malformed(String),
}

impl LookupError {
    /// Metric label for this failure.
    pub fn outcome(&self) -> &'static str {
        match self {
            LookupError::Timeout(_) => "timeout",
            LookupError::Transport(_) => "transport",
            LookupError::Status(_) => "status",
            LookupError::Malformed(_) => "malformed",
        }
    }
}

/// Outcome of one reputation lookup.
pub type ReputationResult = Result<Reputation, LookupError>;
