//! Route definitions for web server.

use axum::{
    response::Html,
    routing::{get, post},
    Router,
};

use super::api;
use super::AppState;

/// Create the API router.
pub fn create_api_router() -> Router<AppState> {
    Router::new()
        .route("/status", get(api::status))
        .route("/restart", post(api::restart))
        .route("/logs", get(api::recent_logs))
}

/// Create the full app router.
pub fn create_app_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .nest("/api", create_api_router())
        .route("/health", get(health_check))
        .with_state(state)
}

async fn index() -> Html<&'static str> {
    Html(include_str!("dashboard.html"))
}

/// Health check endpoint.
async fn health_check() -> &'static str {
    "OK"
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Result;
    use crate::supervisor::{ConnectionProbe, Connector, Supervisor, SupervisorOptions, Worker};
    use async_trait::async_trait;
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use serde_json::Value;
    use std::path::PathBuf;
    use std::sync::Arc;
    use tempfile::TempDir;
    use tower::ServiceExt;

    struct IdleProbe;

    #[async_trait]
    impl ConnectionProbe for IdleProbe {
        fn is_connected(&self) -> bool {
            true
        }

        fn guild_count(&self) -> usize {
            2
        }

        async fn disconnect(&self) {}
    }

    struct IdleConnector;

    #[async_trait]
    impl Connector for IdleConnector {
        async fn launch(&self) -> Result<Worker> {
            Ok(Worker {
                task: tokio::spawn(async {}),
                probe: Arc::new(IdleProbe),
            })
        }
    }

    fn state(log_dir: Option<PathBuf>) -> AppState {
        AppState {
            supervisor: Supervisor::new(Arc::new(IdleConnector), SupervisorOptions::default()),
            log_dir,
        }
    }

    async fn get_json(app: Router, uri: &str) -> Value {
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&body).unwrap()
    }

    #[tokio::test]
    async fn status_of_stopped_supervisor() {
        let json = get_json(create_app_router(state(None)), "/api/status").await;
        assert_eq!(json["is_running"], false);
        assert_eq!(json["state"], "stopped");
        assert_eq!(json["uptime"], "Not started");
        assert_eq!(json["last_restart"], "Never restarted");
        assert_eq!(json["restart_count"], 0);
        assert_eq!(json["bot_guilds"], 0);
        assert!(json["server_time"].as_str().unwrap().len() == 19);
    }

    #[tokio::test]
    async fn status_of_running_supervisor() {
        let s = state(None);
        s.supervisor.start().await.unwrap();
        let json = get_json(create_app_router(s.clone()), "/api/status").await;
        assert_eq!(json["is_running"], true);
        assert_eq!(json["state"], "running");
        assert_eq!(json["bot_guilds"], 2);
        s.supervisor.stop().await;
    }

    #[tokio::test]
    async fn restart_responds_immediately() {
        let app = create_app_router(state(None));
        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/restart")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["status"], "restarting");
    }

    #[tokio::test]
    async fn logs_return_tail() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("rosterbot.log.2024-05-01"), "one\ntwo\n").unwrap();
        let json = get_json(
            create_app_router(state(Some(dir.path().to_path_buf()))),
            "/api/logs",
        )
        .await;
        assert_eq!(json["logs"], serde_json::json!(["one", "two"]));
        assert!(json.get("error").is_none());
    }

    #[tokio::test]
    async fn logs_report_errors_with_empty_list() {
        let dir = TempDir::new().unwrap();
        let json = get_json(
            create_app_router(state(Some(dir.path().to_path_buf()))),
            "/api/logs",
        )
        .await;
        assert!(json["error"].is_string());
        assert_eq!(json["logs"], serde_json::json!([]));
    }

    #[tokio::test]
    async fn health_and_index() {
        let app = create_app_router(state(None));
        let response = app
            .clone()
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&body[..], b"OK");

        let response = app
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
