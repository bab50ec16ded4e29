//! Audit record types and timestamp handling.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, FixedOffset, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::reputation::Geolocation;

/// Display format of [`AuditRecord::timestamp`].
pub const TIMESTAMP_FORMAT: &str = "%Y/%m/%d %H:%M:%S";

/// Store-assigned record identifier. Never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, sqlx::Type)]
#[serde(transparent)]
#[sqlx(transparent)]
pub struct RecordId(pub i64);

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for RecordId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse().map(RecordId)
    }
}

// Accept both `3` and `"3"`: HTML forms and scripts disagree on id types.
impl<'de> Deserialize<'de> for RecordId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Int(i64),
            Text(String),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Int(id) => Ok(RecordId(id)),
            Raw::Text(s) => s.parse().map_err(serde::de::Error::custom),
        }
    }
}

/// How the caller was classified, from user-agent and credential.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    Tool,
    Browser,
}

impl Source {
    pub fn as_str(&self) -> &'static str {
        match self {
            Source::Tool => "tool",
            Source::Browser => "browser",
        }
    }
}

/// A record about to be inserted (no id yet).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewAuditRecord {
    pub country: String,
    pub region: String,
    pub city: String,
    pub method: String,
    pub client_ip: String,
    pub url: String,
    pub timestamp: String,
    pub source: String,
}

impl NewAuditRecord {
    /// Method column: the verb, suffixed with the supplied credential if any.
    pub fn annotate_method(method: &str, credential: Option<&str>) -> String {
        match credential {
            Some(value) => format!("{} {}", method, value),
            None => method.to_string(),
        }
    }

    pub fn new(
        location: &Geolocation,
        method: String,
        client_ip: String,
        url: String,
        timestamp: String,
        source: Source,
    ) -> Self {
        Self {
            country: location.country.clone(),
            region: location.region.clone(),
            city: location.city.clone(),
            method,
            client_ip,
            url,
            timestamp,
            source: source.as_str().to_string(),
        }
    }
}

/// One persisted audit entry. Immutable after insert.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct AuditRecord {
    pub id: RecordId,
    pub country: String,
    pub region: String,
    pub city: String,
    pub method: String,
    #[serde(rename = "clientIp")]
    pub client_ip: String,
    pub url: String,
    pub timestamp: String,
    pub source: String,
}

impl AuditRecord {
    pub fn from_new(id: RecordId, new: NewAuditRecord) -> Self {
        Self {
            id,
            country: new.country,
            region: new.region,
            city: new.city,
            method: new.method,
            client_ip: new.client_ip,
            url: new.url,
            timestamp: new.timestamp,
            source: new.source,
        }
    }

    /// Parsed timestamp, `None` if the stored text is not in [`TIMESTAMP_FORMAT`].
    pub fn parsed_timestamp(&self) -> Option<NaiveDateTime> {
        NaiveDateTime::parse_from_str(&self.timestamp, TIMESTAMP_FORMAT).ok()
    }
}

/// Sort newest first. Ties (same second) fall back to id, newest first;
/// unparseable timestamps sort last.
pub fn sort_newest_first(records: &mut [AuditRecord]) {
    records.sort_by(|a, b| {
        b.parsed_timestamp()
            .cmp(&a.parsed_timestamp())
            .then_with(|| b.id.cmp(&a.id))
    });
}

/// Wall clock pinned to one UTC offset.
#[derive(Debug, Clone, Copy)]
pub struct AuditClock {
    offset: FixedOffset,
}

impl AuditClock {
    /// `None` if the offset is out of chrono's range (±24h).
    pub fn new(utc_offset_minutes: i32) -> Option<Self> {
        FixedOffset::east_opt(utc_offset_minutes * 60).map(|offset| Self { offset })
    }

    pub fn now(&self) -> String {
        self.format(Utc::now())
    }

    pub fn format(&self, instant: DateTime<Utc>) -> String {
        instant
            .with_timezone(&self.offset)
            .format(TIMESTAMP_FORMAT)
            .to_string()
    }
}
