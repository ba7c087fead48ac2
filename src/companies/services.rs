use sqlx::{SqliteConnection, SqlitePool};
use tracing::{error, info, warn};

use super::models::{AccessLevel, Company, CreateCompanyRequest, Member, MemberRow};
use crate::auth::services::UsersService;
use crate::common::{generate_company_id, safe_email_log, ApiError, Validator};

/// How an invited user is identified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MemberIdentifier {
    Email(String),
    Username(String),
}

pub struct CompaniesService {
    db: SqlitePool,
}

/// Inserts a company and its first Admin member on an open connection.
/// Callers own the transaction.
pub(crate) async fn insert_company_with_admin(
    conn: &mut SqliteConnection,
    name: &str,
    user_id: &str,
) -> Result<String, sqlx::Error> {
    let company_id = generate_company_id();

    sqlx::query("INSERT INTO companies (id, name) VALUES (?, ?)")
        .bind(&company_id)
        .bind(name.trim())
        .execute(&mut *conn)
        .await?;

    sqlx::query("INSERT INTO user_companies (company_id, user_id, access_id) VALUES (?, ?, ?)")
        .bind(&company_id)
        .bind(user_id)
        .bind(AccessLevel::Admin.id())
        .execute(&mut *conn)
        .await?;

    Ok(company_id)
}

/// Escapes LIKE wildcards so a search matches them literally.
fn escape_like(query: &str) -> String {
    let mut escaped = String::with_capacity(query.len());
    for c in query.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

impl CompaniesService {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    /// Creates a company with `user_id` as its Admin. Both rows or neither.
    pub async fn create_company_and_add_user(
        &self,
        request: CreateCompanyRequest,
        user_id: &str,
    ) -> Result<String, ApiError> {
        request.validate(&request).into_result()?;

        let mut tx = self.db.begin().await?;
        let company_id = insert_company_with_admin(&mut tx, &request.name, user_id)
            .await
            .map_err(|e| {
                error!(error = %e, user_id = %user_id, "Failed to create company");
                ApiError::DatabaseError(e)
            })?;
        tx.commit().await?;

        info!(company_id = %company_id, user_id = %user_id, "Created company");
        Ok(company_id)
    }

    /// Companies whose name contains `query`.
    pub async fn search(&self, query: &str) -> Result<Vec<Company>, ApiError> {
        let companies = sqlx::query_as::<_, Company>(
            r#"
            SELECT id, name
            FROM companies
            WHERE name LIKE '%' || ? || '%' ESCAPE '\'
            ORDER BY name ASC, rowid ASC
            "#,
        )
        .bind(escape_like(query.trim()))
        .fetch_all(&self.db)
        .await?;

        Ok(companies)
    }

    pub async fn companies_for_user(&self, user_id: &str) -> Result<Vec<Company>, ApiError> {
        let companies = sqlx::query_as::<_, Company>(
            r#"
            SELECT c.id, c.name
            FROM companies c
            JOIN user_companies uc ON uc.company_id = c.id
            WHERE uc.user_id = ?
            ORDER BY uc.created_at ASC, uc.rowid ASC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.db)
        .await?;

        Ok(companies)
    }

    /// Resolves the identifier to a user and adds them at `level`.
    /// Returns the added user's id.
    pub async fn add_member(
        &self,
        company_id: &str,
        identifier: &MemberIdentifier,
        level: AccessLevel,
    ) -> Result<String, ApiError> {
        let users = UsersService::new(self.db.clone());
        let user = match identifier {
            MemberIdentifier::Email(email) => users.find_by_email(email).await?,
            MemberIdentifier::Username(username) => users.find_by_username(username).await?,
        };

        let result = sqlx::query(
            "INSERT OR IGNORE INTO user_companies (company_id, user_id, access_id) VALUES (?, ?, ?)",
        )
        .bind(company_id)
        .bind(&user.id)
        .bind(level.id())
        .execute(&self.db)
        .await?;

        if result.rows_affected() == 0 {
            warn!(
                company_id = %company_id,
                user_id = %user.id,
                "Member already in company"
            );
            return Err(ApiError::Conflict(
                "user is already a member of this company".to_string(),
            ));
        }

        info!(
            company_id = %company_id,
            user_id = %user.id,
            email = %safe_email_log(&user.email),
            access_level = %level,
            "Added member to company"
        );
        Ok(user.id)
    }

    pub async fn change_member_access(
        &self,
        company_id: &str,
        user_id: &str,
        level: AccessLevel,
    ) -> Result<(), ApiError> {
        let result = sqlx::query(
            "UPDATE user_companies SET access_id = ? WHERE company_id = ? AND user_id = ?",
        )
        .bind(level.id())
        .bind(company_id)
        .bind(user_id)
        .execute(&self.db)
        .await?;

        if result.rows_affected() == 0 {
            return Err(ApiError::NotFound(
                "user is not a member of this company".to_string(),
            ));
        }

        info!(
            company_id = %company_id,
            user_id = %user_id,
            access_level = %level,
            "Changed member access"
        );
        Ok(())
    }

    pub async fn remove_member(&self, company_id: &str, user_id: &str) -> Result<(), ApiError> {
        let result = sqlx::query("DELETE FROM user_companies WHERE company_id = ? AND user_id = ?")
            .bind(company_id)
            .bind(user_id)
            .execute(&self.db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(ApiError::NotFound(
                "user is not a member of this company".to_string(),
            ));
        }

        info!(company_id = %company_id, user_id = %user_id, "Removed member from company");
        Ok(())
    }

    pub async fn list_members(&self, company_id: &str) -> Result<Vec<Member>, ApiError> {
        let rows = sqlx::query_as::<_, MemberRow>(
            r#"
            SELECT u.id AS user_id, u.username, u.firstname, u.lastname, uc.access_id
            FROM user_companies uc
            JOIN users u ON u.id = uc.user_id
            WHERE uc.company_id = ?
            ORDER BY uc.created_at ASC, uc.rowid ASC
            "#,
        )
        .bind(company_id)
        .fetch_all(&self.db)
        .await?;

        rows.into_iter()
            .map(|row| {
                let access_level = AccessLevel::from_id(row.access_id).ok_or_else(|| {
                    ApiError::InternalServer(format!("unknown access id {}", row.access_id))
                })?;
                Ok(Member {
                    user_id: row.user_id,
                    username: row.username,
                    firstname: row.firstname,
                    lastname: row.lastname,
                    access_level,
                })
            })
            .collect()
    }
}
