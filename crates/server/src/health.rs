use std::time::Instant;

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use serde::Serialize;

use lodgr_db::DbPool;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Ready,
    Degraded,
}

#[derive(Clone, Debug, Serialize)]
pub struct DatabaseProbe {
    pub status: HealthStatus,
    pub latency_ms: u128,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Clone, Debug, Serialize)]
pub struct HealthResponse {
    pub status: HealthStatus,
    pub database: DatabaseProbe,
    pub checked_at: DateTime<Utc>,
}

#[derive(Clone)]
pub struct HealthState {
    db_pool: DbPool,
}

pub fn router(db_pool: DbPool) -> Router {
    Router::new().route("/health", get(health)).with_state(HealthState { db_pool })
}

pub async fn health(State(state): State<HealthState>) -> (StatusCode, Json<HealthResponse>) {
    let database = probe_database(&state.db_pool).await;
    let status = database.status;

    let code = match status {
        HealthStatus::Ready => StatusCode::OK,
        HealthStatus::Degraded => StatusCode::SERVICE_UNAVAILABLE,
    };
    (code, Json(HealthResponse { status, database, checked_at: Utc::now() }))
}

async fn probe_database(pool: &DbPool) -> DatabaseProbe {
    let started = Instant::now();
    let outcome = sqlx::query_scalar::<_, i64>("SELECT 1").fetch_one(pool).await;
    let latency_ms = started.elapsed().as_millis();

    match outcome {
        Ok(_) => DatabaseProbe { status: HealthStatus::Ready, latency_ms, error: None },
        Err(error) => DatabaseProbe {
            status: HealthStatus::Degraded,
            latency_ms,
            error: Some(error.to_string()),
        },
    }
}
