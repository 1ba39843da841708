use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

/// Class record. Unlike users and students, classes are hard-deleted.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Class {
    pub id: Uuid,
    pub name: String,
    pub sections: Vec<String>,
    pub created_by: Uuid,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl Class {
    pub async fn create(
        db: &PgPool,
        name: &str,
        sections: &[String],
        created_by: Uuid,
    ) -> anyhow::Result<Class> {
        let class = sqlx::query_as::<_, Class>(
            r#"
            INSERT INTO classes (name, sections, created_by)
            VALUES ($1, $2, $3)
            RETURNING id, name, sections, created_by, created_at
            "#,
        )
        .bind(name)
        .bind(sections)
        .bind(created_by)
        .fetch_one(db)
        .await?;
        Ok(class)
    }

    pub async fn find_by_name(db: &PgPool, name: &str) -> anyhow::Result<Option<Class>> {
        let class = sqlx::query_as::<_, Class>(
            "SELECT id, name, sections, created_by, created_at FROM classes WHERE name = $1",
        )
        .bind(name)
        .fetch_optional(db)
        .await?;
        Ok(class)
    }

    pub async fn list(db: &PgPool) -> anyhow::Result<Vec<Class>> {
        let classes = sqlx::query_as::<_, Class>(
            "SELECT id, name, sections, created_by, created_at FROM classes ORDER BY created_at DESC",
        )
        .fetch_all(db)
        .await?;
        Ok(classes)
    }

    pub async fn count(db: &PgPool) -> anyhow::Result<i64> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM classes")
            .fetch_one(db)
            .await?;
        Ok(total)
    }

    /// Hard delete. Returns false when the id is unknown.
    pub async fn delete(db: &PgPool, id: Uuid) -> anyhow::Result<bool> {
        let result = sqlx::query("DELETE FROM classes WHERE id = $1")
            .bind(id)
            .execute(db)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
