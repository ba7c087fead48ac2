//! # Auth Module
//!
//! Accounts and sessions:
//! - Signup and login with bcrypt-hashed passwords
//! - HS256 session tokens carried in the `token` cookie
//! - Sliding refresh of the cookie on protected routes
//! - `AuthedUser` extractor for protected routes

pub mod extractors;
pub mod handlers;
pub mod models;
pub mod password;
pub mod routes;
pub mod services;
pub mod session;
pub mod tokens;
pub mod validators;


pub use extractors::AuthedUser;
pub use routes::auth_routes;
pub use session::refresh_session;
