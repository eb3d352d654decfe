//! rosterbot library root.

pub mod cli;
pub mod config;
pub mod discord;
pub mod error;
pub mod logging;
pub mod roster;
pub mod supervisor;
pub mod web;

pub use cli::Commands;
pub use config::{load_settings, Settings};
pub use error::{Error, Result};
pub use roster::{RosterService, Transport};
pub use supervisor::{Supervisor, SupervisorOptions};
pub use web::run_server;
