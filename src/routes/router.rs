use anyhow::{Context, Result};
use axum::{Router, routing::get};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::handlers::health;
use crate::status::PollerStatus;

pub fn create_router(status: Arc<PollerStatus>) -> Router {
    Router::new()
        .route("/health", get(health))
        .with_state(status)
        .layer(TraceLayer::new_for_http())
}

/// Поднимает HTTP эндпоинт состояния на `listen`
pub async fn serve(listen: &str, status: Arc<PollerStatus>) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(listen)
        .await
        .context(format!("Не удалось слушать {}", listen))?;
    tracing::info!(listen, "Эндпоинт состояния запущен");

    axum::serve(listener, create_router(status))
        .await
        .context("HTTP сервер состояния остановился с ошибкой")
}
