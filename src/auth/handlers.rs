//! Session handlers

use axum::extract::{Extension, Json};
use axum_extra::extract::cookie::CookieJar;
use std::sync::Arc;
use tracing::{info, warn};

use super::extractors::AuthedUser;
use super::models::{LoginRequest, SessionUser, SignupRequest};
use super::services::UsersService;
use super::session::{issue_session, removal_cookie, session_cookie, SESSION_COOKIE};
use super::tokens::validate_token;
use crate::common::{ApiError, AppJson, AppState, MessageResponse, Validator};

/// POST /v0/auth/user/signup
pub async fn signup(
    Extension(state): Extension<Arc<AppState>>,
    AppJson(request): AppJson<SignupRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    let users = UsersService::new(state.db.clone());
    users.signup(request, state.config.bcrypt_cost).await?;
    Ok(Json(MessageResponse::new("user created")))
}

/// POST /v0/auth/user/login
///
/// Sets the `token` cookie and returns the session user.
pub async fn login(
    Extension(state): Extension<Arc<AppState>>,
    jar: CookieJar,
    AppJson(request): AppJson<LoginRequest>,
) -> Result<(CookieJar, Json<SessionUser>), ApiError> {
    request.validate(&request).into_result()?;

    let users = UsersService::new(state.db.clone());
    let user = users.login(&request.email, &request.password).await?;

    let session = issue_session(&user.id, &state.config)?;
    let jar = jar.add(session_cookie(&session, &state.config));

    Ok((jar, Json(SessionUser::from(user))))
}

/// POST /v0/auth/user/refresh
///
/// Re-issues the cookie while the current token is still valid.
pub async fn refresh(
    Extension(state): Extension<Arc<AppState>>,
    jar: CookieJar,
) -> Result<(CookieJar, Json<MessageResponse>), ApiError> {
    let token = jar
        .get(SESSION_COOKIE)
        .map(|c| c.value().to_string())
        .ok_or_else(|| ApiError::BadRequest("cookie not found".to_string()))?;

    let claims = validate_token(&token, &state.config.token_secret).map_err(|e| {
        warn!(error = %e, "Refresh with unusable token");
        ApiError::BadRequest(format!("invalid cookie: {}", e))
    })?;

    let session = issue_session(&claims.sub, &state.config)?;
    info!(user_id = %claims.sub, "Session refreshed on request");

    Ok((
        jar.add(session_cookie(&session, &state.config)),
        Json(MessageResponse::new("ok")),
    ))
}

/// GET /v0/auth/user/logout
pub async fn logout(
    Extension(state): Extension<Arc<AppState>>,
    jar: CookieJar,
) -> (CookieJar, Json<MessageResponse>) {
    (
        jar.add(removal_cookie(&state.config)),
        Json(MessageResponse::new("old cookie deleted, logged out")),
    )
}

/// GET /v0/auth/user/me
pub async fn me(authed: AuthedUser) -> Json<SessionUser> {
    Json(SessionUser {
        id: authed.id,
        firstname: authed.firstname,
        lastname: authed.lastname,
        email: authed.email,
    })
}
