//! Authentication routes

use axum::{
    middleware,
    routing::{get, post},
    Router,
};

use super::handlers;
use super::session::refresh_session;

/// Creates and returns the authentication router
///
/// # Routes
/// - `POST /v0/auth/user/signup` - Create an account (optionally with a company)
/// - `POST /v0/auth/user/login` - Check credentials and set the session cookie
/// - `POST /v0/auth/user/refresh` - Extend a still-valid session
/// - `GET /v0/auth/user/logout` - Clear the session cookie
/// - `GET /v0/auth/user/me` - Current session user
pub fn auth_routes() -> Router {
    let session = Router::new()
        .route("/v0/auth/user/me", get(handlers::me))
        .route_layer(middleware::from_fn(refresh_session));

    Router::new()
        .route("/v0/auth/user/signup", post(handlers::signup))
        .route("/v0/auth/user/login", post(handlers::login))
        .route("/v0/auth/user/refresh", post(handlers::refresh))
        .route("/v0/auth/user/logout", get(handlers::logout))
        .merge(session)
}
