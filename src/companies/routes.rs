use super::handlers;
use crate::auth::refresh_session;
use axum::{
    middleware,
    routing::{delete, get, post},
    Router,
};

/// Creates the companies router with all company-related routes
pub fn companies_routes() -> Router {
    Router::new()
        .route("/v0/company/create", post(handlers::create_company))
        .route("/v0/company/search/:query", get(handlers::search_companies))
        // Membership management (Admin only)
        .route("/v0/company/:company/adduser", post(handlers::add_member))
        .route("/v0/company/:company/permission", post(handlers::change_permission))
        .route("/v0/company/:company/users", get(handlers::list_members))
        .route(
            "/v0/company/:company/user/:userid",
            delete(handlers::remove_member),
        )
        .route("/v0/user/companies", get(handlers::my_companies))
        .route_layer(middleware::from_fn(refresh_session))
}
