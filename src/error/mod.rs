//! Error handling
//!
//! Defines error types and their mapping onto transfer status.

pub mod handlers;
pub mod types;

pub use handlers::{error_description, error_to_status_code};
pub use types::*;
