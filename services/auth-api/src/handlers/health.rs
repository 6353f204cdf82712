//! Liveness and readiness probes

use std::time::Instant;

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;

use crate::state::AppState;

const SERVICE: &str = "warden-auth-api";

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
    pub version: &'static str,
}

#[derive(Debug, Serialize)]
pub struct ReadyResponse {
    pub status: &'static str,
    pub service: &'static str,
    pub database: DatabaseCheck,
}

#[derive(Debug, Serialize)]
pub struct DatabaseCheck {
    pub ok: bool,
    pub latency_ms: u64,
}

/// GET /health - process is up, no dependencies touched
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        service: SERVICE,
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// GET /ready - the database answers a trivial query
pub async fn ready(State(state): State<AppState>) -> (StatusCode, Json<ReadyResponse>) {
    let start = Instant::now();
    let result = sqlx::query("SELECT 1").execute(&*state.pool).await;
    let latency_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);

    if let Err(e) = &result {
        tracing::warn!("Readiness check failed: {}", e);
    }

    let ok = result.is_ok();
    let status = if ok { StatusCode::OK } else { StatusCode::SERVICE_UNAVAILABLE };

    (
        status,
        Json(ReadyResponse {
            status: if ok { "ready" } else { "unavailable" },
            service: SERVICE,
            database: DatabaseCheck { ok, latency_ms },
        }),
    )
}
