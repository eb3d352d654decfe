//! Log tail endpoint.

use axum::{extract::State, Json};
use serde_json::{json, Value};

use crate::logging;
use crate::web::AppState;

/// Lines returned by the log endpoint.
pub const LOG_TAIL_LINES: usize = 50;

pub async fn recent_logs(State(state): State<AppState>) -> Json<Value> {
    let Some(dir) = state.log_dir.clone() else {
        return Json(json!({ "error": "file logging is disabled", "logs": [] }));
    };

    let result = tokio::task::spawn_blocking(move || logging::tail(&dir, LOG_TAIL_LINES)).await;
    match result {
        Ok(Ok(lines)) => Json(json!({ "logs": lines })),
        Ok(Err(e)) => Json(json!({ "error": e.to_string(), "logs": [] })),
        Err(e) => Json(json!({ "error": e.to_string(), "logs": [] })),
    }
}
