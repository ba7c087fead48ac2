// JSON body extractor whose rejections render as ApiError

use axum::extract::{rejection::JsonRejection, FromRequest};
use tracing::debug;

use super::error::ApiError;

/// `axum::Json` with our error body. A body that is missing, not JSON, or the
/// wrong shape is a 400 with a generic message; serde's text stays in the logs.
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct AppJson<T>(pub T);

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        debug!(
            status = %rejection.status(),
            detail = %rejection.body_text(),
            "Rejected request body"
        );
        let message = match rejection {
            JsonRejection::MissingJsonContentType(_) => "request body must be JSON",
            JsonRejection::JsonSyntaxError(_) => "request body is not valid JSON",
            JsonRejection::JsonDataError(_) => "request body has missing or invalid fields",
            _ => "invalid request body",
        };
        ApiError::BadRequest(message.to_string())
    }
}
