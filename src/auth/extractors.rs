//! Authentication extractors for Axum

use async_trait::async_trait;
use axum::{
    extract::{Extension, FromRequestParts},
    http::{header::AUTHORIZATION, request::Parts},
};
use axum_extra::extract::cookie::CookieJar;
use std::sync::Arc;
use tracing::{debug, error, warn};

use super::services::UsersService;
use super::session::SESSION_COOKIE;
use super::tokens::{validate_token, TokenError};
use crate::common::{safe_email_log, safe_token_log, ApiError, AppState};

/// Authenticated user extractor
///
/// Reads the session token from the `token` cookie, falling back to an
/// `Authorization: Bearer` header, validates it and loads the user.
/// The identity lives only in this per-request value.
#[derive(Debug, Clone)]
pub struct AuthedUser {
    pub id: String,
    pub email: String,
    pub firstname: String,
    pub lastname: String,
}

fn bearer_token(parts: &Parts) -> Option<String> {
    parts
        .headers
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthedUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Extension(app_state): Extension<Arc<AppState>> =
            Extension::from_request_parts(parts, state)
                .await
                .map_err(|_| ApiError::InternalServer("missing app state".to_string()))?;

        let jar = CookieJar::from_headers(&parts.headers);
        let token = jar
            .get(SESSION_COOKIE)
            .map(|c| c.value().to_string())
            .filter(|v| !v.is_empty())
            .or_else(|| bearer_token(parts));

        let token = match token {
            Some(t) => t,
            None => {
                warn!("Authentication failed: no session cookie or bearer token");
                return Err(ApiError::Unauthorized("missing token".into()));
            }
        };

        let claims = match validate_token(&token, &app_state.config.token_secret) {
            Ok(claims) => claims,
            Err(TokenError::Expired) => {
                debug!(token = %safe_token_log(&token), "Session token expired");
                return Err(ApiError::Unauthorized("session expired".into()));
            }
            Err(e) => {
                warn!(error = %e, token = %safe_token_log(&token), "Token validation failed");
                return Err(ApiError::Unauthorized("invalid token".into()));
            }
        };

        let users = UsersService::new(app_state.db.clone());
        match users.find_by_id(&claims.sub).await {
            Ok(u) => {
                debug!(
                    user_id = %u.id,
                    email = %safe_email_log(&u.email),
                    "User authenticated"
                );
                Ok(AuthedUser {
                    id: u.id,
                    email: u.email,
                    firstname: u.firstname,
                    lastname: u.lastname,
                })
            }
            Err(ApiError::NotFound(_)) => {
                warn!(user_id = %claims.sub, "Authentication failed: user not found in database");
                Err(ApiError::Unauthorized("user not found".into()))
            }
            Err(e) => {
                error!(
                    error = %e,
                    user_id = %claims.sub,
                    "Database error during user lookup in authentication"
                );
                Err(e)
            }
        }
    }
}
