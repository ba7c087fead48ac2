use chrono::Utc;
use sqlx::{FromRow, QueryBuilder, Sqlite, SqlitePool};
use std::collections::HashMap;
use tracing::{debug, info};

use super::models::{
    Clap, ClapState, Comment, CommentRow, Feedback, FeedbackRequest, FeedbackRow,
};
use crate::common::validation::require_non_empty;
use crate::common::{
    generate_clap_id, generate_comment_id, generate_feedback_id, ApiError, ValidationResult,
    Validator,
};

/// Ownership and scope of an active feedback item.
#[derive(Debug, Clone, FromRow, PartialEq, Eq)]
pub struct FeedbackRecord {
    pub id: String,
    pub user_id: String,
    pub company_id: String,
}

impl FeedbackRecord {
    pub fn is_owned_by(&self, user_id: &str) -> bool {
        self.user_id == user_id
    }
}

#[derive(Debug, Clone, FromRow, PartialEq, Eq)]
pub struct CommentRecord {
    pub id: String,
    pub feedback_id: String,
    pub user_id: String,
}

/// Feedback ids bound per enrichment query, well under SQLite's bind limit.
const ENRICH_BATCH_SIZE: usize = 500;

const FEEDBACK_SELECT: &str = r#"
    SELECT f.id, f.user_id, f.company_id, u.firstname, u.lastname,
           f.title, f.description, f.created_at, f.updated_at
    FROM feedback f
    JOIN users u ON u.id = f.user_id
"#;

/// Timestamp in the same shape as the schema's column defaults.
fn now_timestamp() -> String {
    Utc::now().format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string()
}

pub fn validate_comment(text: &str) -> Result<(), ApiError> {
    let mut result = ValidationResult::new();
    require_non_empty(&mut result, "comment", text, "comment cannot be empty");
    result.into_result().map_err(ApiError::from)
}

pub struct FeedbackService {
    db: SqlitePool,
}

impl FeedbackService {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    /// Stores a new feedback item. Validation failures never reach the database.
    pub async fn create(
        &self,
        user_id: &str,
        company_id: &str,
        request: &FeedbackRequest,
    ) -> Result<String, ApiError> {
        request.validate(request).into_result()?;

        let feedback_id = generate_feedback_id();
        let mut tx = self.db.begin().await?;

        let result = sqlx::query(
            r#"
            INSERT INTO feedback (id, user_id, company_id, title, description)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(&feedback_id)
        .bind(user_id)
        .bind(company_id)
        .bind(request.title.trim())
        .bind(request.description.trim())
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(ApiError::Persistence(format!(
                "feedback insert for company {} affected no rows",
                company_id
            )));
        }
        tx.commit().await?;

        info!(
            feedback_id = %feedback_id,
            user_id = %user_id,
            company_id = %company_id,
            "Feedback created"
        );
        Ok(feedback_id)
    }

    /// The feedback item if it exists and is not deleted.
    pub async fn find_active(&self, feedback_id: &str) -> Result<Option<FeedbackRecord>, ApiError> {
        let record = sqlx::query_as::<_, FeedbackRecord>(
            "SELECT id, user_id, company_id FROM feedback WHERE id = ? AND deleted_at IS NULL",
        )
        .bind(feedback_id)
        .fetch_optional(&self.db)
        .await?;

        Ok(record)
    }

    /// `find_active` that treats absence as `NotFound`.
    pub async fn get_active(&self, feedback_id: &str) -> Result<FeedbackRecord, ApiError> {
        self.find_active(feedback_id)
            .await?
            .ok_or_else(|| ApiError::NotFound("feedback not found".to_string()))
    }

    /// Soft-deletes the item. Returns false when it was already deleted or
    /// never existed. Ownership is the caller's job.
    pub async fn delete(&self, feedback_id: &str) -> Result<bool, ApiError> {
        let result = sqlx::query(
            "UPDATE feedback SET deleted_at = ? WHERE id = ? AND deleted_at IS NULL",
        )
        .bind(now_timestamp())
        .bind(feedback_id)
        .execute(&self.db)
        .await?;

        let deleted = result.rows_affected() > 0;
        if deleted {
            info!(feedback_id = %feedback_id, "Feedback deleted");
        }
        Ok(deleted)
    }

    /// Overwrites title and description. Ownership is the caller's job.
    pub async fn update(&self, feedback_id: &str, request: &FeedbackRequest) -> Result<(), ApiError> {
        request.validate(request).into_result()?;

        let result = sqlx::query(
            r#"
            UPDATE feedback SET title = ?, description = ?, updated_at = ?
            WHERE id = ? AND deleted_at IS NULL
            "#,
        )
        .bind(request.title.trim())
        .bind(request.description.trim())
        .bind(now_timestamp())
        .bind(feedback_id)
        .execute(&self.db)
        .await?;

        if result.rows_affected() == 0 {
            return Err(ApiError::Persistence(format!(
                "feedback {} update affected no rows",
                feedback_id
            )));
        }

        info!(feedback_id = %feedback_id, "Feedback updated");
        Ok(())
    }

    /// Flips the caller's clap on a feedback item.
    ///
    /// The transaction opens with the write so concurrent toggles from the
    /// same user serialize on SQLite's writer lock.
    pub async fn toggle_clap(&self, user_id: &str, feedback_id: &str) -> Result<ClapState, ApiError> {
        let now = now_timestamp();
        let mut tx = self.db.begin().await?;

        let unclapped = sqlx::query(
            r#"
            UPDATE claps SET deleted_at = ?
            WHERE user_id = ? AND feedback_id = ? AND deleted_at IS NULL
            "#,
        )
        .bind(&now)
        .bind(user_id)
        .bind(feedback_id)
        .execute(&mut *tx)
        .await?;

        let state = if unclapped.rows_affected() > 0 {
            ClapState::Unclapped
        } else {
            sqlx::query("INSERT INTO claps (id, user_id, feedback_id) VALUES (?, ?, ?)")
                .bind(generate_clap_id())
                .bind(user_id)
                .bind(feedback_id)
                .execute(&mut *tx)
                .await?;
            ClapState::Clapped
        };

        tx.commit().await?;

        debug!(user_id = %user_id, feedback_id = %feedback_id, state = ?state, "Clap toggled");
        Ok(state)
    }

    pub async fn add_comment(
        &self,
        feedback_id: &str,
        user_id: &str,
        text: &str,
    ) -> Result<String, ApiError> {
        validate_comment(text)?;

        let comment_id = generate_comment_id();
        sqlx::query("INSERT INTO comments (id, feedback_id, user_id, comment) VALUES (?, ?, ?, ?)")
            .bind(&comment_id)
            .bind(feedback_id)
            .bind(user_id)
            .bind(text.trim())
            .execute(&self.db)
            .await?;

        info!(
            comment_id = %comment_id,
            feedback_id = %feedback_id,
            user_id = %user_id,
            "Comment added"
        );
        Ok(comment_id)
    }

    pub async fn find_comment(&self, comment_id: &str) -> Result<Option<CommentRecord>, ApiError> {
        let record = sqlx::query_as::<_, CommentRecord>(
            "SELECT id, feedback_id, user_id FROM comments WHERE id = ?",
        )
        .bind(comment_id)
        .fetch_optional(&self.db)
        .await?;

        Ok(record)
    }

    /// Rewrites a comment's text. Ownership is the caller's job.
    pub async fn update_comment(&self, comment_id: &str, text: &str) -> Result<(), ApiError> {
        validate_comment(text)?;

        let result = sqlx::query("UPDATE comments SET comment = ?, updated_at = ? WHERE id = ?")
            .bind(text.trim())
            .bind(now_timestamp())
            .bind(comment_id)
            .execute(&self.db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(ApiError::NotFound("comment not found".to_string()));
        }

        info!(comment_id = %comment_id, "Comment updated");
        Ok(())
    }

    /// Active feedback in a company, oldest first.
    pub async fn list_for_company(&self, company_id: &str) -> Result<Vec<Feedback>, ApiError> {
        let rows = sqlx::query_as::<_, FeedbackRow>(&format!(
            "{} WHERE f.company_id = ? AND f.deleted_at IS NULL ORDER BY f.created_at ASC, f.rowid ASC",
            FEEDBACK_SELECT
        ))
        .bind(company_id)
        .fetch_all(&self.db)
        .await?;

        self.enrich(rows.into_iter().map(FeedbackRow::into_feedback).collect())
            .await
    }

    /// Active feedback written by a user across all companies, oldest first.
    pub async fn list_for_user(&self, user_id: &str) -> Result<Vec<Feedback>, ApiError> {
        let rows = sqlx::query_as::<_, FeedbackRow>(&format!(
            "{} WHERE f.user_id = ? AND f.deleted_at IS NULL ORDER BY f.created_at ASC, f.rowid ASC",
            FEEDBACK_SELECT
        ))
        .bind(user_id)
        .fetch_all(&self.db)
        .await?;

        self.enrich(rows.into_iter().map(FeedbackRow::into_feedback).collect())
            .await
    }

    /// Attaches comments and active claps, one batched query each per
    /// `ENRICH_BATCH_SIZE` items.
    pub async fn enrich(&self, feedback: Vec<Feedback>) -> Result<Vec<Feedback>, ApiError> {
        self.enrich_in_batches(feedback, ENRICH_BATCH_SIZE).await
    }

    pub(crate) async fn enrich_in_batches(
        &self,
        mut feedback: Vec<Feedback>,
        batch_size: usize,
    ) -> Result<Vec<Feedback>, ApiError> {
        if feedback.is_empty() {
            return Ok(feedback);
        }

        let ids: Vec<String> = feedback.iter().map(|f| f.id.clone()).collect();
        let mut comment_rows = Vec::new();
        let mut claps = Vec::new();

        for batch in ids.chunks(batch_size.max(1)) {
            let mut comments_query = QueryBuilder::<Sqlite>::new(
                r#"
                SELECT c.id, c.feedback_id, c.user_id, u.firstname, u.lastname,
                       c.comment, c.created_at, c.updated_at
                FROM comments c
                JOIN users u ON u.id = c.user_id
                WHERE c.feedback_id IN (
                "#,
            );
            let mut separated = comments_query.separated(", ");
            for id in batch {
                separated.push_bind(id.clone());
            }
            separated.push_unseparated(") ORDER BY c.created_at ASC, c.rowid ASC");
            comment_rows.extend(
                comments_query
                    .build_query_as::<CommentRow>()
                    .fetch_all(&self.db)
                    .await?,
            );

            let mut claps_query = QueryBuilder::<Sqlite>::new(
                "SELECT id, user_id, feedback_id FROM claps WHERE deleted_at IS NULL AND feedback_id IN (",
            );
            let mut separated = claps_query.separated(", ");
            for id in batch {
                separated.push_bind(id.clone());
            }
            separated.push_unseparated(") ORDER BY created_at ASC, rowid ASC");
            claps.extend(
                claps_query
                    .build_query_as::<Clap>()
                    .fetch_all(&self.db)
                    .await?,
            );
        }

        let mut comments_by_feedback: HashMap<String, Vec<Comment>> = HashMap::new();
        for row in comment_rows {
            comments_by_feedback
                .entry(row.feedback_id.clone())
                .or_default()
                .push(row.into());
        }

        let mut claps_by_feedback: HashMap<String, Vec<Clap>> = HashMap::new();
        for clap in claps {
            claps_by_feedback
                .entry(clap.feedback_id.clone())
                .or_default()
                .push(clap);
        }

        for item in feedback.iter_mut() {
            item.comments = comments_by_feedback.remove(&item.id).unwrap_or_default();
            item.claps = claps_by_feedback.remove(&item.id).unwrap_or_default();
        }

        Ok(feedback)
    }
}
