//! # Companies Module
//!
//! Companies and their members:
//! - Company creation and search
//! - Membership with Admin/Write/Read access levels
//! - The per-company authorization check every protected endpoint uses

pub mod authorization;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;
pub mod validators;

#[cfg(test)]
mod tests;

pub use authorization::{is_authorized, require_access};
pub use models::AccessLevel;
pub use routes::companies_routes;
