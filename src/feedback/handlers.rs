use axum::{
    extract::{Extension, Path},
    Json,
};
use serde::Serialize;
use std::sync::Arc;
use tracing::warn;

use super::models::{ClapState, CommentRequest, Feedback, FeedbackRequest};
use super::services::{FeedbackRecord, FeedbackService};
use crate::auth::AuthedUser;
use crate::common::{ApiError, AppJson, AppState, MessageResponse};
use crate::companies::{require_access, AccessLevel};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackCreated {
    pub message: String,
    pub feedback_id: String,
}

// ============================================================================
// Shared by the REST handlers and the feedback socket
// ============================================================================

/// Posts feedback in a company; needs Write access.
pub(crate) async fn post_feedback(
    state: &AppState,
    user_id: &str,
    company_id: &str,
    request: &FeedbackRequest,
) -> Result<String, ApiError> {
    require_access(&state.db, user_id, company_id, AccessLevel::Write).await?;
    FeedbackService::new(state.db.clone())
        .create(user_id, company_id, request)
        .await
}

/// Toggles the caller's clap; needs Read access in the feedback's company.
pub(crate) async fn clap_feedback(
    state: &AppState,
    user_id: &str,
    feedback: &FeedbackRecord,
) -> Result<ClapState, ApiError> {
    require_access(&state.db, user_id, &feedback.company_id, AccessLevel::Read).await?;
    FeedbackService::new(state.db.clone())
        .toggle_clap(user_id, &feedback.id)
        .await
}

/// Adds a comment; needs Read access in the feedback's company.
pub(crate) async fn comment_feedback(
    state: &AppState,
    user_id: &str,
    feedback: &FeedbackRecord,
    text: &str,
) -> Result<String, ApiError> {
    require_access(&state.db, user_id, &feedback.company_id, AccessLevel::Read).await?;
    FeedbackService::new(state.db.clone())
        .add_comment(&feedback.id, user_id, text)
        .await
}

/// Edits a comment. Only its author may, and only while still a member
/// of the company the feedback belongs to.
pub(crate) async fn edit_comment(
    state: &AppState,
    user_id: &str,
    comment_id: &str,
    text: &str,
    scope: Option<&FeedbackRecord>,
) -> Result<FeedbackRecord, ApiError> {
    let service = FeedbackService::new(state.db.clone());

    let comment = service
        .find_comment(comment_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("comment not found".to_string()))?;

    if let Some(feedback) = scope {
        if comment.feedback_id != feedback.id {
            return Err(ApiError::NotFound("comment not found".to_string()));
        }
    }

    let feedback = service.get_active(&comment.feedback_id).await?;
    require_access(&state.db, user_id, &feedback.company_id, AccessLevel::Read).await?;

    if comment.user_id != user_id {
        warn!(
            user_id = %user_id,
            comment_id = %comment_id,
            "Attempt to edit someone else's comment"
        );
        return Err(ApiError::Forbidden(
            "only the author can edit a comment".to_string(),
        ));
    }

    service.update_comment(comment_id, text).await?;
    Ok(feedback)
}

// ============================================================================
// REST handlers
// ============================================================================

/// POST /v0/user/:company/feedback - Post feedback (Write)
pub async fn create_feedback(
    Extension(state): Extension<Arc<AppState>>,
    user: AuthedUser,
    Path(company_id): Path<String>,
    AppJson(request): AppJson<FeedbackRequest>,
) -> Result<Json<FeedbackCreated>, ApiError> {
    let feedback_id = post_feedback(&state, &user.id, &company_id, &request).await?;
    Ok(Json(FeedbackCreated {
        message: "feedback created".to_string(),
        feedback_id,
    }))
}

/// GET /v0/user/:company/feedback - Company feedback with comments and claps (Read)
pub async fn list_company_feedback(
    Extension(state): Extension<Arc<AppState>>,
    user: AuthedUser,
    Path(company_id): Path<String>,
) -> Result<Json<Vec<Feedback>>, ApiError> {
    require_access(&state.db, &user.id, &company_id, AccessLevel::Read).await?;

    let feedback_service = FeedbackService::new(state.db.clone());
    Ok(Json(feedback_service.list_for_company(&company_id).await?))
}

/// GET /v0/user/feedback - The caller's own feedback across companies
pub async fn list_my_feedback(
    Extension(state): Extension<Arc<AppState>>,
    user: AuthedUser,
) -> Result<Json<Vec<Feedback>>, ApiError> {
    let feedback_service = FeedbackService::new(state.db.clone());
    Ok(Json(feedback_service.list_for_user(&user.id).await?))
}

/// DELETE /v0/feedback/:fid - Soft-delete own feedback (owner with Write)
pub async fn delete_feedback(
    Extension(state): Extension<Arc<AppState>>,
    user: AuthedUser,
    Path(feedback_id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    let feedback_service = FeedbackService::new(state.db.clone());
    let feedback = feedback_service.get_active(&feedback_id).await?;

    if !feedback.is_owned_by(&user.id) {
        return Err(ApiError::Forbidden(
            "only the author can delete feedback".to_string(),
        ));
    }
    require_access(&state.db, &user.id, &feedback.company_id, AccessLevel::Write).await?;

    if !feedback_service.delete(&feedback_id).await? {
        return Err(ApiError::NotFound("feedback not found".to_string()));
    }

    Ok(Json(MessageResponse::new("feedback deleted")))
}

/// PUT /v0/feedback/:fid - Edit own feedback (owner with Write)
pub async fn update_feedback(
    Extension(state): Extension<Arc<AppState>>,
    user: AuthedUser,
    Path(feedback_id): Path<String>,
    AppJson(request): AppJson<FeedbackRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    let feedback_service = FeedbackService::new(state.db.clone());
    let feedback = feedback_service.get_active(&feedback_id).await?;

    if !feedback.is_owned_by(&user.id) {
        return Err(ApiError::Forbidden(
            "only the author can edit feedback".to_string(),
        ));
    }
    require_access(&state.db, &user.id, &feedback.company_id, AccessLevel::Write).await?;

    feedback_service.update(&feedback_id, &request).await?;
    Ok(Json(MessageResponse::new("feedback updated")))
}

/// POST /v0/user/feedback/:fid/clap - Toggle a clap (Read); returns the company's feedback
pub async fn toggle_clap(
    Extension(state): Extension<Arc<AppState>>,
    user: AuthedUser,
    Path(feedback_id): Path<String>,
) -> Result<Json<Vec<Feedback>>, ApiError> {
    let feedback_service = FeedbackService::new(state.db.clone());
    let feedback = feedback_service.get_active(&feedback_id).await?;

    clap_feedback(&state, &user.id, &feedback).await?;

    Ok(Json(
        feedback_service.list_for_company(&feedback.company_id).await?,
    ))
}

/// POST /v0/user/feedback/:fid/comment - Comment (Read), or edit own comment
/// when the body has an `id`; returns the company's feedback
pub async fn comment(
    Extension(state): Extension<Arc<AppState>>,
    user: AuthedUser,
    Path(feedback_id): Path<String>,
    AppJson(request): AppJson<CommentRequest>,
) -> Result<Json<Vec<Feedback>>, ApiError> {
    let feedback_service = FeedbackService::new(state.db.clone());
    let feedback = feedback_service.get_active(&feedback_id).await?;

    match request.id.as_deref().map(str::trim).filter(|id| !id.is_empty()) {
        Some(comment_id) => {
            edit_comment(&state, &user.id, comment_id, &request.comment, Some(&feedback)).await?;
        }
        None => {
            comment_feedback(&state, &user.id, &feedback, &request.comment).await?;
        }
    }

    Ok(Json(
        feedback_service.list_for_company(&feedback.company_id).await?,
    ))
}
