//! IP reputation (geolocation) subsystem.
//!
//! # Data Flow
//! ```text
//! Access gate
//!     → client.rs (GET {base_url}/json/{ip}, bounded by timeout)
//!     → types.rs (Reputation with "unknown" substitutions, or LookupError)
//!     → gate decision + audit record
//! ```

pub mod client;
pub mod types;

pub use client::{IpApiClient, ReputationLookup};
pub use types::{Geolocation, LookupError, Reputation, ReputationResult, UNKNOWN};
