//! HTTP request handlers for web adapter.

use axum::{
    extract::{Query, State},
    response::{IntoResponse, Response},
    Json,
};
use chrono::NaiveDate;
use std::sync::Arc;

use crate::domain::summary::get_summary;

use super::{status_for_summary, AppState, WebError};

pub async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "ok": true }))
}

#[derive(Debug, Default, serde::Deserialize)]
pub struct PredictQuery {
    #[serde(default)]
    pub symbol: String,
    #[serde(default)]
    pub start: String,
}

pub async fn predict(
    State(state): State<Arc<AppState>>,
    Query(query): Query<PredictQuery>,
) -> Result<Response, WebError> {
    let symbol = query.symbol.trim().to_string();
    let start = query.start.trim();
    if symbol.is_empty() || start.is_empty() {
        return Err(WebError::bad_request("Missing 'symbol' or 'start'"));
    }

    let start = NaiveDate::parse_from_str(start, "%Y-%m-%d")
        .map_err(|_| WebError::bad_request("Invalid 'start' date (expected YYYY-MM-DD)"))?;

    let data_port = Arc::clone(&state.data_port);
    let summary = tokio::task::spawn_blocking(move || {
        get_summary(data_port.as_ref(), &symbol, start)
    })
    .await
    .map_err(|e| WebError::internal(format!("summary task failed: {}", e)))?;

    Ok((status_for_summary(&summary), Json(summary)).into_response())
}

pub async fn not_found() -> WebError {
    WebError::not_found("not found")
}
