use axum::{extract::Extension, Json};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{error, info};

use crate::common::validation::require_non_empty;
use crate::common::{
    is_valid_email, safe_email_log, ApiError, AppJson, AppState, MessageResponse, ValidationResult,
    Validator,
};
use crate::services::email::{Address, MailError, OutgoingMail};

const CONTACT_SENDER_NAME: &str = "Contact Us";
const CONTACT_SUBJECT: &str = "Contact us";

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct ContactRequest {
    pub email: String,
    pub content: String,
}

impl Validator<ContactRequest> for ContactRequest {
    fn validate(&self, data: &ContactRequest) -> ValidationResult {
        let mut result = ValidationResult::new();

        require_non_empty(&mut result, "email", &data.email, "email cannot be empty");
        if !result.has_error("email") && !is_valid_email(&data.email) {
            result.add_error("email", "invalid email format");
        }
        require_non_empty(&mut result, "content", &data.content, "content cannot be empty");

        result
    }
}

/// GET /v0/health - Liveness probe
pub async fn health() -> &'static str {
    "ok"
}

/// POST /v0/public/contact-us - Forward a visitor's message to the contact inbox
pub async fn contact_us(
    Extension(state): Extension<Arc<AppState>>,
    AppJson(request): AppJson<ContactRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    request.validate(&request).into_result()?;

    let mail = OutgoingMail {
        from: Address::new(request.email.trim(), Some(CONTACT_SENDER_NAME)),
        to: Address::new(state.config.contact_email.clone(), None),
        subject: CONTACT_SUBJECT.to_string(),
        content: request.content.trim().to_string(),
    };

    match state.mailer.send(mail).await {
        Ok(()) => {
            info!(from = %safe_email_log(&request.email), "Contact message forwarded");
            Ok(Json(MessageResponse::new("message sent")))
        }
        Err(MailError::NotConfigured) => Err(ApiError::ServiceUnavailable(
            "contact form is not available".to_string(),
        )),
        Err(e) => {
            error!(error = %e, "Contact message could not be delivered");
            Err(ApiError::InternalServer(e.to_string()))
        }
    }
}
