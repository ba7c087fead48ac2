use super::handlers;
use axum::{
    routing::{get, post},
    Router,
};

/// Creates the public router
///
/// # Routes
/// - `GET /v0/health` - Liveness probe
/// - `POST /v0/public/contact-us` - Contact form, forwarded by mail
pub fn public_routes() -> Router {
    Router::new()
        .route("/v0/health", get(handlers::health))
        .route("/v0/public/contact-us", post(handlers::contact_us))
}
