//! Session cookie construction and sliding refresh

use axum::{
    extract::{Extension, Request},
    middleware::Next,
    response::{IntoResponse, Response},
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use time::OffsetDateTime;
use tracing::{debug, error};

use super::tokens::{issue_token, session_expiry, validate_token};
use crate::common::{ApiError, AppConfig, AppState};

pub const SESSION_COOKIE: &str = "token";
pub const COOKIE_PATH: &str = "/v0";

/// A signed token and the moment it stops being accepted.
#[derive(Debug, Clone)]
pub struct IssuedSession {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

/// Issues a token for `user_id` that expires the configured number of minutes from now.
pub fn issue_session(user_id: &str, config: &AppConfig) -> Result<IssuedSession, ApiError> {
    let expires_at = session_expiry(config.token_expiration_minutes);
    let token = issue_token(user_id, expires_at, &config.token_secret).map_err(|e| {
        error!(error = %e, user_id = %user_id, "Token issuance failed");
        ApiError::InternalServer("could not issue session token".to_string())
    })?;
    Ok(IssuedSession { token, expires_at })
}

fn base_cookie(value: String, config: &AppConfig) -> Cookie<'static> {
    let mut cookie = Cookie::new(SESSION_COOKIE, value);
    cookie.set_path(COOKIE_PATH);
    cookie.set_http_only(true);
    if config.is_production() {
        cookie.set_secure(true);
        cookie.set_same_site(SameSite::None);
    }
    if let Some(domain) = &config.cookie_domain {
        cookie.set_domain(domain.clone());
    }
    cookie
}

/// The `token` cookie carrying `session`; expires with the token.
pub fn session_cookie(session: &IssuedSession, config: &AppConfig) -> Cookie<'static> {
    let mut cookie = base_cookie(session.token.clone(), config);
    if let Ok(expires) = OffsetDateTime::from_unix_timestamp(session.expires_at.timestamp()) {
        cookie.set_expires(expires);
    }
    cookie
}

/// An already-expired `token` cookie that makes the browser drop the session.
pub fn removal_cookie(config: &AppConfig) -> Cookie<'static> {
    let mut cookie = base_cookie(String::new(), config);
    cookie.set_max_age(time::Duration::ZERO);
    cookie.set_expires(OffsetDateTime::UNIX_EPOCH);
    cookie
}

/// Middleware for protected routes: when the request carries a valid
/// session cookie, the response carries a fresh one expiring from now.
pub async fn refresh_session(
    Extension(state): Extension<Arc<AppState>>,
    jar: CookieJar,
    request: Request,
    next: Next,
) -> Response {
    let user_id = jar
        .get(SESSION_COOKIE)
        .and_then(|cookie| validate_token(cookie.value(), &state.config.token_secret).ok())
        .map(|claims| claims.sub);

    let response = next.run(request).await;

    let Some(user_id) = user_id else {
        return response;
    };

    match issue_session(&user_id, &state.config) {
        Ok(session) => {
            debug!(user_id = %user_id, "Session refreshed");
            let jar = CookieJar::new().add(session_cookie(&session, &state.config));
            (jar, response).into_response()
        }
        Err(_) => response,
    }
}
