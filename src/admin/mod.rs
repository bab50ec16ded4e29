//! Audit console: list and bulk-delete audit records.

pub mod handlers;
pub mod view;

use axum::{
    routing::{get, post},
    Router,
};

use self::handlers::*;
use crate::config::ConsoleConfig;
use crate::http::server::AppState;

pub fn setup_console_router(console: &ConsoleConfig) -> Router<AppState> {
    Router::new()
        .route(&console.list_path, get(list_page))
        .route(&console.records_path, get(list_records))
        .route(&console.delete_path, post(delete_records))
}
