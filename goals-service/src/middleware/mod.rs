//! HTTP middleware

pub mod access_log;
pub mod cors;

pub use access_log::{access_log, AccessRecord, ACCESS_LOG_TARGET};
pub use cors::{apply_cors_headers, preflight_layer};
