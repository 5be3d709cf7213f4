//! User repository.

use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::AppError;
use crate::models::user::{User, UserRole};

const SELECT_COLUMNS: &str =
    "id, username, password_hash, full_name, role, department, created_at, updated_at";

#[derive(Debug, Default, Clone, Copy)]
pub struct UserRepository;

impl UserRepository {
    pub fn new() -> Self {
        Self
    }

    pub async fn create(
        &self,
        db: &PgPool,
        username: &str,
        password_hash: &str,
        full_name: &str,
        role: UserRole,
        department: Option<&str>,
    ) -> Result<User, AppError> {
        let now = Utc::now();
        let query = format!(
            "INSERT INTO users (id, username, password_hash, full_name, role, department, created_at, updated_at)
            VALUES ($1,$2,$3,$4,$5,$6,$7,$8)
            RETURNING {SELECT_COLUMNS}"
        );
        let user = sqlx::query_as::<_, User>(&query)
            .bind(Uuid::new_v4().to_string())
            .bind(username)
            .bind(password_hash)
            .bind(full_name)
            .bind(role)
            .bind(department)
            .bind(now)
            .bind(now)
            .fetch_one(db)
            .await
            .map_err(|e| match &e {
                sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                    AppError::InvalidArgument("Username is already taken".into())
                }
                _ => e.into(),
            })?;
        Ok(user)
    }

    pub async fn find_by_id(&self, db: &PgPool, id: &str) -> Result<User, AppError> {
        let query = format!("SELECT {SELECT_COLUMNS} FROM users WHERE id = $1");
        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .fetch_optional(db)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".into()))
    }

    pub async fn find_by_username(
        &self,
        db: &PgPool,
        username: &str,
    ) -> Result<Option<User>, AppError> {
        let query = format!("SELECT {SELECT_COLUMNS} FROM users WHERE username = $1");
        Ok(sqlx::query_as::<_, User>(&query)
            .bind(username)
            .fetch_optional(db)
            .await?)
    }

    pub async fn list(
        &self,
        db: &PgPool,
        role: Option<UserRole>,
        page: i64,
        per_page: i64,
    ) -> Result<Vec<User>, AppError> {
        let offset = (page - 1).max(0) * per_page;
        let query = format!(
            "SELECT {SELECT_COLUMNS} FROM users
            WHERE ($1::text IS NULL OR role = $1)
            ORDER BY created_at ASC
            LIMIT $2 OFFSET $3"
        );
        Ok(sqlx::query_as::<_, User>(&query)
            .bind(role)
            .bind(per_page)
            .bind(offset)
            .fetch_all(db)
            .await?)
    }
}
