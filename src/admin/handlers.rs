use askama::Template;
use axum::{
    body::Bytes,
    extract::State,
    http::{header, HeaderMap},
    response::{Html, IntoResponse, Redirect, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::admin::view::ConsolePage;
use crate::audit::{sort_newest_first, AuditRecord, RecordId};
use crate::http::response::GateError;
use crate::http::server::AppState;
use crate::observability::metrics;

/// Form/JSON field carrying the ids to delete.
pub const DELETE_IDS_FIELD: &str = "deleteIds";

#[derive(Serialize)]
pub struct RecordListing {
    pub records: Vec<AuditRecord>,
    pub failed_writes: u64,
}

#[derive(Deserialize)]
struct DeleteRequest {
    #[serde(rename = "deleteIds", default)]
    delete_ids: Vec<RecordId>,
}

async fn load_sorted(state: &AppState) -> Result<Vec<AuditRecord>, GateError> {
    let mut records = state.audit.store().list().await.map_err(GateError::Store)?;
    sort_newest_first(&mut records);
    Ok(records)
}

pub async fn list_page(State(state): State<AppState>) -> Response {
    let expose = state.config.security.expose_error_details;
    let records = match load_sorted(&state).await {
        Ok(records) => records,
        Err(e) => return e.into_response_with(expose),
    };

    let page = ConsolePage::new(
        &records,
        &state.config.console.list_path,
        &state.config.console.delete_path,
        state.audit.failed_writes(),
    );
    match page.render() {
        Ok(html) => Html(html).into_response(),
        Err(e) => GateError::Internal(e.to_string()).into_response_with(expose),
    }
}

pub async fn list_records(State(state): State<AppState>) -> Response {
    match load_sorted(&state).await {
        Ok(records) => Json(RecordListing {
            records,
            failed_writes: state.audit.failed_writes(),
        })
        .into_response(),
        Err(e) => e.into_response_with(state.config.security.expose_error_details),
    }
}

pub async fn delete_records(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let expose = state.config.security.expose_error_details;
    let ids = match parse_delete_ids(&headers, &body) {
        Ok(ids) if ids.is_empty() => {
            return GateError::BadRequest("No records selected".to_string())
                .into_response_with(expose)
        }
        Ok(ids) => ids,
        Err(e) => return e.into_response_with(expose),
    };

    let report = state.audit.store().delete_by_ids(&ids).await;
    metrics::record_audit_delete("ok", report.deleted.len());
    metrics::record_audit_delete("error", report.failed.len());
    tracing::info!(
        requested = ids.len(),
        deleted = report.deleted.len(),
        failed = report.failed.len(),
        "Audit records deleted"
    );

    // Earlier deletions are not rolled back.
    if let Some((id, source)) = report.failed.into_iter().next() {
        return GateError::AdminDeleteFailed { id, source }.into_response_with(expose);
    }
    Redirect::to(&state.config.console.list_path).into_response()
}

/// Ids from a JSON body (`{"deleteIds": [...]}`) or a urlencoded form with
/// repeated `deleteIds` fields. Duplicates are dropped, order is kept.
fn parse_delete_ids(headers: &HeaderMap, body: &[u8]) -> Result<Vec<RecordId>, GateError> {
    let is_json = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .and_then(|ct| ct.split(';').next())
        .map(|media| media.trim().eq_ignore_ascii_case("application/json"))
        .unwrap_or(false);

    let ids: Vec<RecordId> = if is_json {
        if body.is_empty() {
            Vec::new()
        } else {
            serde_json::from_slice::<DeleteRequest>(body)
                .map_err(|e| GateError::BadRequest(format!("Invalid delete request: {}", e)))?
                .delete_ids
        }
    } else {
        url::form_urlencoded::parse(body)
            .filter(|(key, _)| key == DELETE_IDS_FIELD || key == "deleteIds[]")
            .map(|(_, value)| {
                value
                    .parse::<RecordId>()
                    .map_err(|_| GateError::BadRequest(format!("Invalid record id: {}", value)))
            })
            .collect::<Result<_, _>>()?
    };

    let mut unique = Vec::with_capacity(ids.len());
    for id in ids {
        if !unique.contains(&id) {
            unique.push(id);
        }
    }
    Ok(unique)
}
