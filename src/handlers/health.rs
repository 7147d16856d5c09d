use axum::{Json, extract::State, http::StatusCode};
use serde_json::{Value, json};
use std::sync::Arc;

use crate::status::PollerStatus;

pub async fn health(State(status): State<Arc<PollerStatus>>) -> (StatusCode, Json<Value>) {
    (
        StatusCode::OK,
        Json(json!({
            "status": "im ready",
            "UTC_time": chrono::Utc::now().to_rfc2822(),
            "poller": status.snapshot(),
        })),
    )
}
