//! Feedback socket: push the company's feedback, apply one client action, repeat.

use axum::{
    extract::{
        ws::{Message, WebSocket},
        Path, WebSocketUpgrade,
    },
    response::IntoResponse,
    Extension,
};
use futures_util::{Sink, SinkExt, Stream, StreamExt};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

use super::handlers::{clap_feedback, comment_feedback, edit_comment, post_feedback};
use super::models::{FeedbackAction, FeedbackEvent, FeedbackRequest};
use super::services::{FeedbackRecord, FeedbackService};
use crate::auth::AuthedUser;
use crate::common::{generate_connection_id, ApiError, AppState};
use crate::companies::{require_access, AccessLevel};

/// GET /v0/ws/:company/feedback - WebSocket upgrade (Read)
pub async fn feedback_socket(
    ws: WebSocketUpgrade,
    Extension(state): Extension<Arc<AppState>>,
    user: AuthedUser,
    Path(company_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    require_access(&state.db, &user.id, &company_id, AccessLevel::Read).await?;

    info!(
        user_id = %user.id,
        company_id = %company_id,
        "Feedback socket authorized"
    );

    Ok(ws.on_upgrade(move |socket| handle_socket(socket, state, user, company_id)))
}

async fn handle_socket(
    socket: WebSocket,
    state: Arc<AppState>,
    user: AuthedUser,
    company_id: String,
) {
    let connection_id = generate_connection_id();
    info!(
        user_id = %user.id,
        company_id = %company_id,
        connection_id = %connection_id,
        "Feedback socket connected"
    );

    let (mut sender, mut receiver) = socket.split();
    let feedback_service = FeedbackService::new(state.db.clone());

    loop {
        // SEND
        let feedback = match feedback_service.list_for_company(&company_id).await {
            Ok(feedback) => feedback,
            Err(e) => {
                error!(connection_id = %connection_id, error = %e, "Could not load feedback");
                break;
            }
        };
        if send_event(&mut sender, &FeedbackEvent::Feedback { feedback })
            .await
            .is_err()
        {
            break;
        }

        // RECEIVE
        let payload = match next_payload(&mut receiver).await {
            Some(payload) => payload,
            None => break,
        };

        let outcome = match serde_json::from_slice::<FeedbackAction>(&payload) {
            Ok(action) => apply_action(&state, &user.id, &company_id, action).await,
            Err(e) => Err(ApiError::BadRequest(format!("unreadable action: {}", e))),
        };

        if let Err(e) = outcome {
            warn!(
                connection_id = %connection_id,
                user_id = %user.id,
                error = %e,
                "Feedback socket action failed"
            );
            e.log();
            let event = FeedbackEvent::Error {
                code: e.code().to_string(),
                message: e.public_message(),
            };
            if send_event(&mut sender, &event).await.is_err() {
                break;
            }
        }
    }

    info!(connection_id = %connection_id, "Feedback socket closed");
}

async fn send_event<S>(sender: &mut S, event: &FeedbackEvent) -> Result<(), ()>
where
    S: Sink<Message> + Unpin,
{
    let json = serde_json::to_string(event).map_err(|e| {
        error!(error = %e, "Could not serialize socket event");
    })?;
    sender.send(Message::Text(json)).await.map_err(|_| {
        debug!("Socket write failed");
    })
}

/// Next text or binary frame. `None` on close or read error.
async fn next_payload<R>(receiver: &mut R) -> Option<Vec<u8>>
where
    R: Stream<Item = Result<Message, axum::Error>> + Unpin,
{
    loop {
        match receiver.next().await? {
            Ok(Message::Text(text)) => return Some(text.into_bytes()),
            Ok(Message::Binary(bytes)) => return Some(bytes),
            Ok(Message::Close(_)) => return None,
            Ok(Message::Ping(_)) | Ok(Message::Pong(_)) => continue,
            Err(e) => {
                debug!(error = %e, "Socket read failed");
                return None;
            }
        }
    }
}

/// Loads active feedback that belongs to the socket's company.
async fn feedback_in_company(
    state: &AppState,
    company_id: &str,
    feedback_id: &str,
) -> Result<FeedbackRecord, ApiError> {
    let feedback = FeedbackService::new(state.db.clone())
        .get_active(feedback_id)
        .await?;
    if feedback.company_id != company_id {
        return Err(ApiError::NotFound("feedback not found".to_string()));
    }
    Ok(feedback)
}

pub(crate) async fn apply_action(
    state: &AppState,
    user_id: &str,
    company_id: &str,
    action: FeedbackAction,
) -> Result<(), ApiError> {
    match action {
        FeedbackAction::Create { title, description } => {
            let request = FeedbackRequest { title, description };
            post_feedback(state, user_id, company_id, &request).await?;
        }
        FeedbackAction::Clap { feedback_id } => {
            let feedback = feedback_in_company(state, company_id, &feedback_id).await?;
            clap_feedback(state, user_id, &feedback).await?;
        }
        FeedbackAction::Comment {
            feedback_id,
            comment,
        } => {
            let feedback = feedback_in_company(state, company_id, &feedback_id).await?;
            comment_feedback(state, user_id, &feedback, &comment).await?;
        }
        FeedbackAction::UpdateComment {
            comment_id,
            comment,
        } => {
            let found = FeedbackService::new(state.db.clone())
                .find_comment(&comment_id)
                .await?
                .ok_or_else(|| ApiError::NotFound("comment not found".to_string()))?;
            let feedback = feedback_in_company(state, company_id, &found.feedback_id).await?;
            edit_comment(state, user_id, &comment_id, &comment, Some(&feedback)).await?;
        }
    }
    Ok(())
}
