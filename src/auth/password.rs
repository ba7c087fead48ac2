//! bcrypt password hashing

use thiserror::Error;
use tracing::error;

use crate::common::ApiError;

/// bcrypt ignores everything past this many bytes.
pub const MAX_PASSWORD_BYTES: usize = 72;

#[derive(Debug, Error)]
pub enum PasswordError {
    #[error("password exceeds 72 bytes")]
    TooLong,
    #[error("password hashing failed: {0}")]
    Hash(#[from] bcrypt::BcryptError),
}

pub fn hash_password(plain: &str, cost: u32) -> Result<String, PasswordError> {
    if plain.len() > MAX_PASSWORD_BYTES {
        return Err(PasswordError::TooLong);
    }
    Ok(bcrypt::hash(plain, cost)?)
}

pub fn verify_password(plain: &str, hash: &str) -> Result<bool, PasswordError> {
    if plain.len() > MAX_PASSWORD_BYTES {
        return Ok(false);
    }
    Ok(bcrypt::verify(plain, hash)?)
}

/// Runs `hash_password` on the blocking pool.
pub async fn hash_password_blocking(plain: String, cost: u32) -> Result<String, ApiError> {
    tokio::task::spawn_blocking(move || hash_password(&plain, cost))
        .await
        .map_err(|e| ApiError::InternalServer(format!("hash task failed: {}", e)))?
        .map_err(|e| match e {
            PasswordError::TooLong => {
                ApiError::BadRequest("password must be at most 72 bytes".to_string())
            }
            PasswordError::Hash(e) => {
                error!(error = %e, "Password hashing failed");
                ApiError::InternalServer("could not hash password".to_string())
            }
        })
}

/// Runs `verify_password` on the blocking pool. A corrupt stored hash
/// counts as a mismatch.
pub async fn verify_password_blocking(plain: String, hash: String) -> Result<bool, ApiError> {
    let outcome = tokio::task::spawn_blocking(move || verify_password(&plain, &hash))
        .await
        .map_err(|e| ApiError::InternalServer(format!("verify task failed: {}", e)))?;

    match outcome {
        Ok(matches) => Ok(matches),
        Err(e) => {
            error!(error = %e, "Stored password hash could not be checked");
            Ok(false)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_then_verify() {
        let hash = hash_password("olol", 4).unwrap();
        assert_ne!(hash, "olol");
        assert!(verify_password("olol", &hash).unwrap());
        assert!(!verify_password("lolo", &hash).unwrap());
    }

    #[test]
    fn test_rejects_overlong_password() {
        let long = "a".repeat(MAX_PASSWORD_BYTES + 1);
        assert!(matches!(hash_password(&long, 4), Err(PasswordError::TooLong)));
        assert!(hash_password(&"a".repeat(MAX_PASSWORD_BYTES), 4).is_ok());
    }

    #[tokio::test]
    async fn test_blocking_wrappers() {
        let hash = hash_password_blocking("secret".to_string(), 4).await.unwrap();
        assert!(verify_password_blocking("secret".to_string(), hash.clone())
            .await
            .unwrap());
        assert!(!verify_password_blocking("nope".to_string(), hash).await.unwrap());
        assert!(!verify_password_blocking("x".to_string(), "not-a-hash".to_string())
            .await
            .unwrap());
    }
}
