//! Security subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming request:
//!     → headers.rs (resolve client IP, credential, browser heuristic)
//!     → rate_limit.rs (fixed-window quota per IP; trusted callers exempt)
//!     → access_control.rs (lookup, audit, serve / echo / forbid)
//!     → Pass to routing
//! ```
//!
//! # Design Decisions
//! - Fail closed: a failed reputation lookup never reaches content
//! - Trusted callers are identified by a single shared secret header

pub mod access_control;
pub mod headers;
pub mod rate_limit;

pub use access_control::{access_gate_middleware, decide, Decision, PathClass};
pub use headers::CallerContext;
pub use rate_limit::{rate_limit_middleware, RateLimiter};
