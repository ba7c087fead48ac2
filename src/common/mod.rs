// Common module - shared types and utilities across all modules

pub mod config;
pub mod error;
pub mod extract;
pub mod helpers;
pub mod id_generator;
pub mod migrations;
pub mod response;
pub mod state;
pub mod validation;

#[cfg(test)]
pub mod test_support;

// Re-export commonly used types for convenience
pub use config::AppConfig;
pub use error::ApiError;
pub use extract::AppJson;
pub use helpers::{redact_secrets, safe_email_log, safe_token_log};
pub use id_generator::*;
pub use response::MessageResponse;
pub use state::AppState;
pub use validation::{is_valid_email, ValidationResult, Validator};
