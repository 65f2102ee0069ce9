use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use super::UserStore;
use crate::error::AppError;
use crate::models::{NewUser, Role, User};

const USER_COLUMNS: &str = "id, fullname, username, email, phone_number, password, user_type, \
     is_active, domisili, image_profile_url, created_at, updated_at";

#[derive(sqlx::FromRow)]
struct UserRow {
    id: i64,
    fullname: String,
    username: String,
    email: String,
    phone_number: Option<String>,
    password: String,
    user_type: String,
    is_active: bool,
    domisili: Option<String>,
    image_profile_url: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for User {
    type Error = AppError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let user_type = row
            .user_type
            .parse::<Role>()
            .map_err(|e| AppError::Internal(format!("Invalid user row {}: {}", row.id, e)))?;

        Ok(User {
            id: row.id,
            fullname: row.fullname,
            username: row.username,
            email: row.email,
            phone_number: row.phone_number,
            password_hash: row.password,
            user_type,
            is_active: row.is_active,
            domisili: row.domisili,
            image_profile_url: row.image_profile_url,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// `UserStore` over the `users` table
#[derive(Clone)]
pub struct PgUserStore {
    pool: PgPool,
}

impl PgUserStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn fetch_one_where(&self, condition: &str, value: &str) -> Result<Option<User>, AppError> {
        let query = format!("SELECT {} FROM users WHERE {} = $1", USER_COLUMNS, condition);

        sqlx::query_as::<_, UserRow>(&query)
            .bind(value)
            .fetch_optional(&self.pool)
            .await?
            .map(User::try_from)
            .transpose()
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn insert(&self, user: NewUser) -> Result<User, AppError> {
        let query = format!(
            r#"
            INSERT INTO users (fullname, username, email, phone_number, password, user_type,
                               domisili, image_profile_url, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $9)
            RETURNING {}
            "#,
            USER_COLUMNS
        );

        let row = sqlx::query_as::<_, UserRow>(&query)
            .bind(&user.fullname)
            .bind(&user.username)
            .bind(&user.email)
            .bind(&user.phone_number)
            .bind(&user.password_hash)
            .bind(user.user_type.as_str())
            .bind(&user.domisili)
            .bind(&user.image_profile_url)
            .bind(Utc::now())
            .fetch_one(&self.pool)
            .await?;

        User::try_from(row)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<User>, AppError> {
        let query = format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS);

        sqlx::query_as::<_, UserRow>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .map(User::try_from)
            .transpose()
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        self.fetch_one_where("email", email).await
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, AppError> {
        self.fetch_one_where("username", username).await
    }

    async fn find_by_identifier(&self, identifier: &str) -> Result<Option<User>, AppError> {
        let query = format!(
            r#"
            SELECT {}
            FROM users
            WHERE email = $1
               OR username = $1
               OR (phone_number = $1
                   AND (SELECT COUNT(*) FROM users WHERE phone_number = $1) = 1)
            ORDER BY (email = $1) DESC, (username = $1) DESC, id
            LIMIT 1
            "#,
            USER_COLUMNS
        );

        sqlx::query_as::<_, UserRow>(&query)
            .bind(identifier)
            .fetch_optional(&self.pool)
            .await?
            .map(User::try_from)
            .transpose()
    }

    async fn list(&self) -> Result<Vec<User>, AppError> {
        let query = format!(
            "SELECT {} FROM users ORDER BY created_at DESC, id DESC",
            USER_COLUMNS
        );

        sqlx::query_as::<_, UserRow>(&query)
            .fetch_all(&self.pool)
            .await?
            .into_iter()
            .map(User::try_from)
            .collect()
    }

    async fn delete(&self, id: i64) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
