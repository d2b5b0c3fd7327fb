use crate::services::get_metrics;
use crate::startup::AppState;
use axum::{
    extract::State,
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use serde_json::json;

/// Liveness probe. Never touches the upstream model.
pub async fn health_check() -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "service": "convert-service",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// Readiness probe: the vision provider must be configured and reachable.
pub async fn readiness_check(State(state): State<AppState>) -> impl IntoResponse {
    let provider = state.converter.provider();

    match provider.health_check().await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({
                "status": "ready",
                "provider": provider.name()
            })),
        ),
        Err(e) => {
            tracing::warn!(provider = provider.name(), error = %e, "Readiness check failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "status": "unavailable",
                    "provider": provider.name(),
                    "error": e.kind()
                })),
            )
        }
    }
}

/// Prometheus scrape endpoint.
pub async fn metrics_endpoint() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        get_metrics(),
    )
}
