//! Request-scoped errors and their HTTP responses.
//!
//! # Design Decisions
//! - Every error maps to one status and a JSON body `{ "error": ... }`
//! - Underlying causes appear as `detail` only when details are exposed
//! - Audit write failures never reach this type; they are swallowed upstream

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::audit::{RecordId, StoreError};
use crate::reputation::LookupError;

#[derive(Debug, thiserror::Error)]
pub enum GateError {
    #[error("Rate limit exceeded")]
    RateLimited,

    #[error("Reputation lookup failed")]
    ReputationLookupFailed(#[source] LookupError),

    #[error("File not found.")]
    NotFound,

    #[error("Unable to read the file.")]
    ContentUnreadable(#[source] std::io::Error),

    #[error("{0}")]
    BadRequest(String),

    #[error("Failed to delete record {id}")]
    AdminDeleteFailed {
        id: RecordId,
        #[source]
        source: StoreError,
    },

    #[error("Failed to load audit records")]
    Store(#[source] StoreError),

    #[error("Internal error")]
    Internal(String),
}

impl GateError {
    pub fn status(&self) -> StatusCode {
        match self {
            GateError::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            GateError::ReputationLookupFailed(_) => StatusCode::BAD_GATEWAY,
            GateError::NotFound => StatusCode::NOT_FOUND,
            GateError::BadRequest(_) => StatusCode::BAD_REQUEST,
            GateError::ContentUnreadable(_)
            | GateError::AdminDeleteFailed { .. }
            | GateError::Store(_)
            | GateError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn detail(&self) -> Option<String> {
        match self {
            GateError::ReputationLookupFailed(e) => Some(e.to_string()),
            GateError::ContentUnreadable(e) => Some(e.to_string()),
            GateError::AdminDeleteFailed { source, .. } => Some(source.to_string()),
            GateError::Store(e) => Some(e.to_string()),
            GateError::Internal(msg) => Some(msg.clone()),
            _ => None,
        }
    }

    /// Build the response, appending the cause when `expose_details` is set.
    pub fn into_response_with(self, expose_details: bool) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(status = %status, error = %self, detail = ?self.detail(), "Request failed");
        }

        let mut body = json!({ "error": self.to_string() });
        if expose_details {
            if let Some(detail) = self.detail() {
                body["detail"] = json!(detail);
            }
        }
        (status, Json(body)).into_response()
    }
}

impl IntoResponse for GateError {
    fn into_response(self) -> Response {
        self.into_response_with(false)
    }
}
