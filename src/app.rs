// src/app.rs
//! Router composition shared by the binary and the HTTP tests.

use axum::{extract::Extension, middleware, Router};
use std::sync::Arc;

use crate::auth::auth_routes;
use crate::common::AppState;
use crate::companies::companies_routes;
use crate::feedback::feedback_routes;
use crate::logging_middleware::log_request_response;
use crate::public::public_routes;

/// Every route with body logging and the shared state attached.
/// CORS and HTTP tracing are layered on top by `main`.
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        // ====================================================================
        // AUTHENTICATION ROUTES
        // ====================================================================
        .merge(auth_routes())
        // ====================================================================
        // COMPANY ROUTES
        // ====================================================================
        .merge(companies_routes())
        // ====================================================================
        // FEEDBACK ROUTES (REST and WebSocket)
        // ====================================================================
        .merge(feedback_routes())
        // ====================================================================
        // PUBLIC ROUTES
        // ====================================================================
        .merge(public_routes())
        .layer(middleware::from_fn(log_request_response))
        .layer(Extension(state))
}
