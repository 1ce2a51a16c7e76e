use axum::{extract::State, routing::get, Json, Router};
use http::StatusCode;
use serde_json::{json, Value};

use crate::state::AppState;

pub fn create_health_router() -> Router<AppState> {
    Router::new()
        .route("/liveness", get(liveness))
        .route("/readiness", get(readiness))
}

async fn liveness() -> Json<Value> {
    Json(json!({
        "status": "up",
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}

// Listo solo si el store responde
async fn readiness(State(state): State<AppState>) -> (StatusCode, Json<Value>) {
    match state.store.ping().await {
        Ok(()) => (StatusCode::OK, Json(json!({ "status": "up", "db": "up" }))),
        Err(e) => {
            tracing::warn!(error = %e, "Readiness: DB nicht erreichbar");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({ "status": "down", "db": "down" })),
            )
        }
    }
}
