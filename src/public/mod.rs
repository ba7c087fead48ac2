//! # Public Module
//!
//! Unauthenticated endpoints: liveness probe and the contact form.

pub mod handlers;
pub mod routes;


pub use routes::public_routes;
