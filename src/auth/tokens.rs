//! Session token issuance and validation (HS256 JWT)

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use thiserror::Error;

use super::models::Claims;

pub const ISSUER: &str = "feedback_api";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TokenError {
    #[error("token signing key is empty")]
    EmptySecret,
    #[error("token signature does not match")]
    InvalidSignature,
    #[error("token has expired")]
    Expired,
    #[error("token is malformed")]
    Malformed,
    #[error("token could not be encoded: {0}")]
    Encoding(String),
}

/// Expiry for a session issued now.
pub fn session_expiry(minutes: i64) -> DateTime<Utc> {
    Utc::now() + Duration::minutes(minutes)
}

pub fn issue_token(
    user_id: &str,
    expires_at: DateTime<Utc>,
    secret: &str,
) -> Result<String, TokenError> {
    if secret.is_empty() {
        return Err(TokenError::EmptySecret);
    }

    let claims = Claims {
        sub: user_id.to_string(),
        iss: ISSUER.to_string(),
        iat: Utc::now().timestamp(),
        exp: expires_at.timestamp(),
    };

    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| TokenError::Encoding(e.to_string()))
}

/// Decodes and checks a token. Expiry is exact: no leeway.
pub fn validate_token(token: &str, secret: &str) -> Result<Claims, TokenError> {
    if secret.is_empty() {
        return Err(TokenError::EmptySecret);
    }

    let mut validation = Validation::new(Algorithm::HS256);
    validation.leeway = 0;
    validation.set_issuer(&[ISSUER]);

    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )
    .map(|data| data.claims)
    .map_err(|e| match e.kind() {
        ErrorKind::InvalidSignature => TokenError::InvalidSignature,
        ErrorKind::ExpiredSignature => TokenError::Expired,
        _ => TokenError::Malformed,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test_secret_key";

    #[test]
    fn test_issue_and_validate() {
        let token = issue_token("U_12345678", session_expiry(20), SECRET).unwrap();
        let claims = validate_token(&token, SECRET).unwrap();

        assert_eq!(claims.sub, "U_12345678");
        assert_eq!(claims.iss, ISSUER);
        assert!(claims.exp > Utc::now().timestamp());
    }

    #[test]
    fn test_expired_token_is_distinct_from_bad_signature() {
        let expired = issue_token("U_1", Utc::now() - Duration::minutes(5), SECRET).unwrap();
        assert_eq!(validate_token(&expired, SECRET), Err(TokenError::Expired));

        let valid = issue_token("U_1", session_expiry(5), SECRET).unwrap();
        assert_eq!(
            validate_token(&valid, "wrong_secret_key"),
            Err(TokenError::InvalidSignature)
        );
    }

    #[test]
    fn test_garbage_is_malformed() {
        assert_eq!(validate_token("not.a.jwt", SECRET), Err(TokenError::Malformed));
        assert_eq!(validate_token("", SECRET), Err(TokenError::Malformed));
    }

    #[test]
    fn test_foreign_issuer_rejected() {
        let claims = Claims {
            sub: "U_1".to_string(),
            iss: "someone-else".to_string(),
            iat: Utc::now().timestamp(),
            exp: session_expiry(5).timestamp(),
        };
        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .unwrap();

        assert_eq!(validate_token(&token, SECRET), Err(TokenError::Malformed));
    }

    #[test]
    fn test_empty_secret() {
        assert_eq!(
            issue_token("U_1", session_expiry(5), ""),
            Err(TokenError::EmptySecret)
        );
        assert_eq!(validate_token("x", ""), Err(TokenError::EmptySecret));
    }
}
