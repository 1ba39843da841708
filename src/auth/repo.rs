use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::auth::dto::Role;

const USER_COLUMNS: &str = "id, name, phone_number, email, password_hash, role, \
                            masjid_info, student_info, is_active, created_at";

/// Class/section facet stored on student-role users.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StudentInfo {
    pub class: Option<String>,
    pub section: Option<String>,
}

/// User record in the database.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub phone_number: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String, // Argon2 hash, never exposed in JSON
    pub role: Role,
    pub masjid_info: Option<serde_json::Value>,
    pub student_info: Option<sqlx::types::Json<StudentInfo>>,
    pub is_active: bool,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

#[derive(Debug)]
pub struct NewUser {
    pub name: String,
    pub phone_number: String,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
    pub masjid_info: Option<serde_json::Value>,
    pub student_info: Option<StudentInfo>,
}

impl User {
    pub async fn create(db: &PgPool, new: NewUser) -> anyhow::Result<User> {
        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            INSERT INTO users (name, phone_number, email, password_hash, role, masjid_info, student_info)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(&new.name)
        .bind(&new.phone_number)
        .bind(&new.email)
        .bind(&new.password_hash)
        .bind(new.role)
        .bind(&new.masjid_info)
        .bind(new.student_info.map(sqlx::types::Json))
        .fetch_one(db)
        .await?;
        Ok(user)
    }

    pub async fn find_by_id(db: &PgPool, id: Uuid) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(db)
        .await?;
        Ok(user)
    }

    pub async fn find_by_email(db: &PgPool, email: &str) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(db)
        .await?;
        Ok(user)
    }

    pub async fn find_by_email_and_role(
        db: &PgPool,
        email: &str,
        role: Role,
    ) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = $1 AND role = $2"
        ))
        .bind(email)
        .bind(role)
        .fetch_optional(db)
        .await?;
        Ok(user)
    }

    pub async fn find_by_phone_and_role(
        db: &PgPool,
        phone_number: &str,
        role: Role,
    ) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE phone_number = $1 AND role = $2"
        ))
        .bind(phone_number)
        .bind(role)
        .fetch_optional(db)
        .await?;
        Ok(user)
    }

    pub async fn find_by_email_or_phone(
        db: &PgPool,
        email: &str,
        phone_number: &str,
    ) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = $1 OR phone_number = $2"
        ))
        .bind(email)
        .bind(phone_number)
        .fetch_optional(db)
        .await?;
        Ok(user)
    }

    pub async fn find_any_admin(db: &PgPool) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE role = 'admin' LIMIT 1"
        ))
        .fetch_optional(db)
        .await?;
        Ok(user)
    }

    pub async fn phone_exists(db: &PgPool, phone_number: &str) -> anyhow::Result<bool> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM users WHERE phone_number = $1)")
                .bind(phone_number)
                .fetch_one(db)
                .await?;
        Ok(exists)
    }

    pub async fn email_taken_by_other(
        db: &PgPool,
        email: &str,
        id: Uuid,
    ) -> anyhow::Result<bool> {
        let taken: bool = sqlx::query_scalar(
            "SELECT EXISTS (SELECT 1 FROM users WHERE email = $1 AND id <> $2)",
        )
        .bind(email)
        .bind(id)
        .fetch_one(db)
        .await?;
        Ok(taken)
    }

    pub async fn list_active(
        db: &PgPool,
        role: Option<Role>,
        limit: i64,
        offset: i64,
    ) -> anyhow::Result<Vec<User>> {
        let users = match role {
            Some(role) => {
                sqlx::query_as::<_, User>(&format!(
                    r#"
                    SELECT {USER_COLUMNS} FROM users
                    WHERE is_active AND role = $1
                    ORDER BY created_at DESC
                    LIMIT $2 OFFSET $3
                    "#
                ))
                .bind(role)
                .bind(limit)
                .bind(offset)
                .fetch_all(db)
                .await?
            }
            None => {
                sqlx::query_as::<_, User>(&format!(
                    r#"
                    SELECT {USER_COLUMNS} FROM users
                    WHERE is_active
                    ORDER BY created_at DESC
                    LIMIT $1 OFFSET $2
                    "#
                ))
                .bind(limit)
                .bind(offset)
                .fetch_all(db)
                .await?
            }
        };
        Ok(users)
    }

    pub async fn count_active(db: &PgPool, role: Option<Role>) -> anyhow::Result<i64> {
        let total: i64 = match role {
            Some(role) => {
                sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE is_active AND role = $1")
                    .bind(role)
                    .fetch_one(db)
                    .await?
            }
            None => {
                sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE is_active")
                    .fetch_one(db)
                    .await?
            }
        };
        Ok(total)
    }

    /// Soft delete. Returns false when the id is unknown.
    pub async fn deactivate(db: &PgPool, id: Uuid) -> anyhow::Result<bool> {
        let result = sqlx::query("UPDATE users SET is_active = FALSE, updated_at = now() WHERE id = $1")
            .bind(id)
            .execute(db)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn update_credentials(
        db: &PgPool,
        id: Uuid,
        email: &str,
        password_hash: &str,
    ) -> anyhow::Result<()> {
        sqlx::query(
            "UPDATE users SET email = $2, password_hash = $3, updated_at = now() WHERE id = $1",
        )
        .bind(id)
        .bind(email)
        .bind(password_hash)
        .execute(db)
        .await?;
        Ok(())
    }
}
