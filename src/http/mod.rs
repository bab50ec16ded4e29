//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware stack)
//!     → request.rs (request ID)
//!     → security (rate limit, access gate)
//!     → content.rs | admin console | static asset | fallback
//!     → response.rs (errors mapped to status + JSON body)
//!     → Send to client
//! ```

pub mod content;
pub mod request;
pub mod response;
pub mod server;

pub use request::X_REQUEST_ID;
pub use response::GateError;
pub use server::{AppState, HttpServer, ServerError};
