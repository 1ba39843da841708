use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

/// Planned per-recitation homework representation with its own collection.
/// Not part of the latest-assignment flow; kept alongside it until the
/// richer schema takes over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "homework_type", rename_all = "lowercase")]
pub enum HomeworkType {
    Sabak,
    Revision,
    Manzil,
    New,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "homework_status", rename_all = "lowercase")]
pub enum HomeworkStatus {
    Pending,
    Completed,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct HomeworkRecord {
    pub id: Uuid,
    pub student_id: Uuid,
    pub teacher_id: Uuid,
    #[serde(rename = "type")]
    pub kind: HomeworkType,
    pub surah: Option<String>,
    pub start_verse: Option<i32>,
    pub end_verse: Option<i32>,
    pub mistakes: i32,
    pub qualities: String,
    pub status: HomeworkStatus,
    #[serde(with = "time::serde::rfc3339")]
    pub date_assigned: OffsetDateTime,
}

impl HomeworkRecord {
    pub async fn list(db: &PgPool) -> anyhow::Result<Vec<HomeworkRecord>> {
        let rows = sqlx::query_as::<_, HomeworkRecord>(
            r#"
            SELECT id, student_id, teacher_id, kind, surah, start_verse, end_verse,
                   mistakes, qualities, status, date_assigned
            FROM homework
            ORDER BY date_assigned DESC
            "#,
        )
        .fetch_all(db)
        .await?;
        Ok(rows)
    }
}
