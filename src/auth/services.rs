//! User directory: lookups, signup and credential checks

use sqlx::SqlitePool;
use tracing::{info, warn};

use super::models::{NewUser, SignupRequest, User};
use super::password::{hash_password_blocking, verify_password_blocking};
use crate::common::error::is_unique_violation;
use crate::common::{generate_user_id, safe_email_log, ApiError, Validator};
use crate::companies::services::insert_company_with_admin;

const USER_COLUMNS: &str =
    "id, firstname, lastname, username, email, password, birthday, created_at";

/// What a successful signup created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignupOutcome {
    pub user_id: String,
    pub company_id: Option<String>,
}

pub struct UsersService {
    db: SqlitePool,
}

impl UsersService {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    async fn find_by(&self, column: &str, value: &str) -> Result<Option<User>, sqlx::Error> {
        sqlx::query_as::<_, User>(&format!(
            "SELECT {} FROM users WHERE {} = ?",
            USER_COLUMNS, column
        ))
        .bind(value)
        .fetch_optional(&self.db)
        .await
    }

    pub async fn find_by_email(&self, email: &str) -> Result<User, ApiError> {
        self.find_by("email", email.trim())
            .await?
            .ok_or_else(|| ApiError::NotFound("no user with that email".to_string()))
    }

    pub async fn find_by_username(&self, username: &str) -> Result<User, ApiError> {
        self.find_by("username", username.trim())
            .await?
            .ok_or_else(|| ApiError::NotFound("no user with that username".to_string()))
    }

    pub async fn find_by_id(&self, user_id: &str) -> Result<User, ApiError> {
        self.find_by("id", user_id)
            .await?
            .ok_or_else(|| ApiError::NotFound("user not found".to_string()))
    }

    /// Validates and stores a new account. A non-empty `companyName` also
    /// creates that company with the new user as Admin, in the same transaction.
    pub async fn signup(&self, request: SignupRequest, cost: u32) -> Result<SignupOutcome, ApiError> {
        request.validate(&request).into_result()?;

        let password_hash = hash_password_blocking(request.password.clone(), cost).await?;
        let new_user = NewUser {
            firstname: request.firstname.trim().to_string(),
            lastname: request.lastname.trim().to_string(),
            username: request.username.trim().to_string(),
            email: request.email.trim().to_string(),
            password_hash,
            birthday: request.birthday.clone().filter(|b| !b.trim().is_empty()),
        };

        let mut tx = self.db.begin().await?;
        let user_id = insert_user(&mut tx, &new_user).await?;

        let company_id = match request.company_name.as_deref().map(str::trim) {
            Some(name) if !name.is_empty() => {
                Some(insert_company_with_admin(&mut tx, name, &user_id).await?)
            }
            _ => None,
        };
        tx.commit().await?;

        info!(
            user_id = %user_id,
            email = %safe_email_log(&new_user.email),
            company_id = ?company_id,
            "User signed up"
        );

        Ok(SignupOutcome {
            user_id,
            company_id,
        })
    }

    /// Checks credentials. Unknown email and wrong password look the same to the caller.
    pub async fn login(&self, email: &str, password: &str) -> Result<User, ApiError> {
        let rejected = || ApiError::BadRequest("invalid email or password".to_string());

        let user = match self.find_by("email", email.trim()).await? {
            Some(user) => user,
            None => {
                warn!(email = %safe_email_log(email), "Login for unknown email");
                return Err(rejected());
            }
        };

        if !verify_password_blocking(password.to_string(), user.password.clone()).await? {
            warn!(user_id = %user.id, "Login with wrong password");
            return Err(rejected());
        }

        info!(user_id = %user.id, "User logged in");
        Ok(user)
    }
}

/// Inserts an already-hashed user. Duplicate email or username is a conflict.
pub(crate) async fn insert_user(
    conn: &mut sqlx::SqliteConnection,
    user: &NewUser,
) -> Result<String, ApiError> {
    let user_id = generate_user_id();

    sqlx::query(
        r#"
        INSERT INTO users (id, firstname, lastname, username, email, password, birthday)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&user_id)
    .bind(&user.firstname)
    .bind(&user.lastname)
    .bind(&user.username)
    .bind(&user.email)
    .bind(&user.password_hash)
    .bind(&user.birthday)
    .execute(&mut *conn)
    .await
    .map_err(|e| {
        if is_unique_violation(&e) {
            warn!(email = %safe_email_log(&user.email), "Signup with taken email or username");
            ApiError::Conflict("could not create user: email or username already taken".to_string())
        } else {
            ApiError::DatabaseError(e)
        }
    })?;

    Ok(user_id)
}
