//! Per-company access check

use sqlx::SqlitePool;
use tracing::{error, warn};

use super::models::AccessLevel;
use crate::common::ApiError;

/// True when `user_id` is a member of `company_id` at `required` or higher.
///
/// `Ok(false)` is a normal denial; `Err` means the lookup itself failed.
pub async fn is_authorized(
    db: &SqlitePool,
    user_id: &str,
    company_id: &str,
    required: AccessLevel,
) -> Result<bool, sqlx::Error> {
    let held: Option<(i64,)> = sqlx::query_as(
        "SELECT access_id FROM user_companies WHERE company_id = ? AND user_id = ?",
    )
    .bind(company_id)
    .bind(user_id)
    .fetch_optional(db)
    .await?;

    Ok(held
        .and_then(|(id,)| AccessLevel::from_id(id))
        .map_or(false, |held| held.permits(required)))
}

/// `is_authorized` for handlers: denial becomes 401, lookup failure 500.
pub async fn require_access(
    db: &SqlitePool,
    user_id: &str,
    company_id: &str,
    required: AccessLevel,
) -> Result<(), ApiError> {
    match is_authorized(db, user_id, company_id, required).await {
        Ok(true) => Ok(()),
        Ok(false) => {
            warn!(
                user_id = %user_id,
                company_id = %company_id,
                required = %required,
                "Access denied"
            );
            Err(ApiError::Unauthorized(format!(
                "{} access required for this company",
                required
            )))
        }
        Err(e) => {
            error!(
                error = %e,
                user_id = %user_id,
                company_id = %company_id,
                "Authorization lookup failed"
            );
            Err(ApiError::DatabaseError(e))
        }
    }
}
