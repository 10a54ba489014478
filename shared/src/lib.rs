//! Shared types and logic for the Battery Service Console
//!
//! Warranty evaluation, grouping and export, normalisation of upstream
//! records, and form validation. Used by the backend and, through WASM, by
//! the browser.

pub mod error;
pub mod export;
pub mod models;
pub mod normalize;
pub mod types;
pub mod validation;
pub mod warranty;

pub use error::*;
pub use export::*;
pub use models::*;
pub use types::*;
pub use validation::*;
pub use warranty::*;
