//! # Feedback Module
//!
//! Feedback items posted inside a company, with comments and claps.
//! Served over REST and over a per-company WebSocket.

pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;
pub mod validators;
pub mod websocket;


pub use routes::feedback_routes;
