use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

use super::{PgStore, UserStore};
use crate::error::{AppError, Result};
use crate::models::User;

const USER_COLUMNS: &str = "id, username, contact, email, password_hash, account_type, \
    govt_id_type, govt_id_number, created_at";

/// Enum columns come back as text and are parsed into the model.
#[derive(Debug, FromRow)]
struct UserRow {
    id: Uuid,
    username: String,
    contact: Option<String>,
    email: String,
    password_hash: String,
    account_type: String,
    govt_id_type: String,
    govt_id_number: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for User {
    type Error = AppError;

    fn try_from(row: UserRow) -> Result<Self> {
        Ok(User {
            id: row.id,
            username: row.username,
            contact: row.contact,
            email: row.email,
            password_hash: row.password_hash,
            account_type: row.account_type.parse().map_err(AppError::Internal)?,
            govt_id_type: row.govt_id_type.parse().map_err(AppError::Internal)?,
            govt_id_number: row.govt_id_number,
            created_at: row.created_at,
        })
    }
}

#[async_trait]
impl UserStore for PgStore {
    async fn insert(&self, user: &User) -> Result<User> {
        let sql = format!(
            "INSERT INTO users ({USER_COLUMNS}) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) \
             RETURNING {USER_COLUMNS}"
        );
        let row = sqlx::query_as::<_, UserRow>(&sql)
            .bind(user.id)
            .bind(&user.username)
            .bind(&user.contact)
            .bind(&user.email)
            .bind(&user.password_hash)
            .bind(user.account_type.as_str())
            .bind(user.govt_id_type.as_str())
            .bind(&user.govt_id_number)
            .bind(user.created_at)
            .fetch_one(self.pool())
            .await?;
        row.try_into()
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE LOWER(email) = LOWER($1)");
        sqlx::query_as::<_, UserRow>(&sql)
            .bind(email)
            .fetch_optional(self.pool())
            .await?
            .map(User::try_from)
            .transpose()
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1");
        sqlx::query_as::<_, UserRow>(&sql)
            .bind(id)
            .fetch_optional(self.pool())
            .await?
            .map(User::try_from)
            .transpose()
    }

    async fn saved_listing_ids(&self, user_id: Uuid) -> Result<Vec<Uuid>> {
        let ids: Vec<Uuid> = sqlx::query_scalar(
            "SELECT listing_id FROM saved_listings WHERE user_id = $1 ORDER BY saved_at, listing_id",
        )
        .bind(user_id)
        .fetch_all(self.pool())
        .await?;
        Ok(ids)
    }

    async fn toggle_saved(&self, user_id: Uuid, listing_id: Uuid) -> Result<Vec<Uuid>> {
        let mut tx = self.pool().begin().await?;

        let removed = sqlx::query("DELETE FROM saved_listings WHERE user_id = $1 AND listing_id = $2")
            .bind(user_id)
            .bind(listing_id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        if removed == 0 {
            sqlx::query(
                "INSERT INTO saved_listings (user_id, listing_id) VALUES ($1, $2) \
                 ON CONFLICT DO NOTHING",
            )
            .bind(user_id)
            .bind(listing_id)
            .execute(&mut *tx)
            .await?;
        }

        let ids: Vec<Uuid> = sqlx::query_scalar(
            "SELECT listing_id FROM saved_listings WHERE user_id = $1 ORDER BY saved_at, listing_id",
        )
        .bind(user_id)
        .fetch_all(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(ids)
    }
}
