//! Supervisor status and restart endpoints.

use axum::{extract::State, Json};
use serde_json::{json, Value};

use crate::supervisor::StatusSnapshot;
use crate::web::AppState;

/// Current connection status.
pub async fn status(State(state): State<AppState>) -> Json<StatusSnapshot> {
    Json(state.supervisor.snapshot().await)
}

/// Trigger a restart without waiting for it.
pub async fn restart(State(state): State<AppState>) -> Json<Value> {
    let supervisor = state.supervisor.clone();
    tokio::spawn(async move {
        if let Err(e) = supervisor.restart().await {
            tracing::error!("Dashboard restart failed: {}", e);
        }
    });
    tracing::info!("Restart requested from dashboard");
    Json(json!({ "status": "restarting" }))
}
