use std::time::Instant;

use axum::extract::State;
use axum::http::StatusCode;
use axum::{routing::get, Json, Router};
use serde::Serialize;

use crate::state::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    /// `ok` when every probe passes, `degraded` otherwise.
    pub status: &'static str,
    pub version: &'static str,
    pub db_healthy: bool,
    /// Round-trip of `SELECT 1`, absent when the probe failed.
    pub db_latency_ms: Option<u128>,
    /// Whether the image upload directory exists.
    pub uploads_ready: bool,
}

async fn probe_database(state: &AppState) -> Option<u128> {
    let started = Instant::now();
    match folio_db::health_check(&state.pool).await {
        Ok(()) => Some(started.elapsed().as_millis()),
        Err(e) => {
            tracing::warn!(error = %e, "Database health probe failed");
            None
        }
    }
}

/// GET /health
///
/// Answers 503 when the database is unreachable so load balancers stop
/// routing to the instance.
async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let db_latency_ms = probe_database(&state).await;
    let db_healthy = db_latency_ms.is_some();
    let uploads_ready = tokio::fs::metadata(&state.config.upload_dir)
        .await
        .map(|m| m.is_dir())
        .unwrap_or(false);

    let (code, status) = match (db_healthy, uploads_ready) {
        (true, true) => (StatusCode::OK, "ok"),
        (true, false) => (StatusCode::OK, "degraded"),
        (false, _) => (StatusCode::SERVICE_UNAVAILABLE, "degraded"),
    };

    (
        code,
        Json(HealthResponse {
            status,
            version: env!("CARGO_PKG_VERSION"),
            db_healthy,
            db_latency_ms,
            uploads_ready,
        }),
    )
}

pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}
