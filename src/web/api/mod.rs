//! API endpoints module.

pub mod logs;
pub mod status;

pub use logs::recent_logs;
pub use status::{restart, status};
