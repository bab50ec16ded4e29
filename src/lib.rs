//! IP-check gate: rate limiting, IP reputation lookup, access gating and
//! request auditing in front of a small JSON content endpoint.

pub mod admin;
pub mod audit;
pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod reputation;
pub mod security;

pub use config::GateConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
