//! HTTP handlers

pub mod health;
pub mod warranty;

pub use health::health_check;
pub use warranty::{export_client_warranties, get_client_summary, get_client_warranties};
