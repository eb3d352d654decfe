//! Web dashboard (Axum + JSON API).

pub mod api;
pub mod router;
pub mod server;

use std::path::PathBuf;

use crate::supervisor::Supervisor;

pub use server::{run_server, WebServerConfig};

/// State shared by all handlers.
#[derive(Clone)]
pub struct AppState {
    pub supervisor: Supervisor,
    /// Directory holding the process log, if file logging is active.
    pub log_dir: Option<PathBuf>,
}
