use super::{handlers, websocket};
use crate::auth::refresh_session;
use axum::{
    middleware,
    routing::{delete, get, post},
    Router,
};

/// Creates the feedback router
///
/// # Routes
/// - `POST /v0/user/:company/feedback` - Post feedback (Write)
/// - `GET /v0/user/:company/feedback` - Company feedback (Read)
/// - `GET /v0/user/feedback` - Caller's own feedback
/// - `DELETE /v0/feedback/:fid` - Soft-delete own feedback
/// - `PUT /v0/feedback/:fid` - Edit own feedback
/// - `POST /v0/user/feedback/:fid/clap` - Toggle a clap
/// - `POST /v0/user/feedback/:fid/comment` - Add or edit a comment
/// - `GET /v0/ws/:company/feedback` - Live feedback socket
pub fn feedback_routes() -> Router {
    Router::new()
        .route(
            "/v0/user/:company/feedback",
            post(handlers::create_feedback).get(handlers::list_company_feedback),
        )
        .route("/v0/user/feedback", get(handlers::list_my_feedback))
        .route(
            "/v0/feedback/:fid",
            delete(handlers::delete_feedback).put(handlers::update_feedback),
        )
        .route("/v0/user/feedback/:fid/clap", post(handlers::toggle_clap))
        .route("/v0/user/feedback/:fid/comment", post(handlers::comment))
        .route("/v0/ws/:company/feedback", get(websocket::feedback_socket))
        .route_layer(middleware::from_fn(refresh_session))
}
