use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::homework::dto::Assignment;

const STUDENT_COLUMNS: &str = "id, name, urdu_name, class_name, section, student_id, \
                               teacher_id, created_by, is_active, latest_assignment, created_at";

/// Roster record for a student, distinct from the credential record of the
/// same person. Carries at most one latest-assignment snapshot; assigning
/// new homework replaces it entirely.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Student {
    pub id: Uuid,
    pub name: String,
    pub urdu_name: String,
    #[serde(rename = "class")]
    pub class_name: String,
    pub section: String,
    pub student_id: String,
    pub teacher_id: Option<Uuid>,
    pub created_by: Uuid,
    pub is_active: bool,
    pub latest_assignment: Option<sqlx::types::Json<Assignment>>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

#[derive(Debug)]
pub struct NewStudent {
    pub name: String,
    pub urdu_name: String,
    pub class_name: String,
    pub section: String,
    pub student_id: String,
    pub teacher_id: Option<Uuid>,
    pub created_by: Uuid,
}

impl Student {
    pub async fn create(db: &PgPool, new: NewStudent) -> anyhow::Result<Student> {
        let student = sqlx::query_as::<_, Student>(&format!(
            r#"
            INSERT INTO students (name, urdu_name, class_name, section, student_id, teacher_id, created_by)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {STUDENT_COLUMNS}
            "#
        ))
        .bind(&new.name)
        .bind(&new.urdu_name)
        .bind(&new.class_name)
        .bind(&new.section)
        .bind(&new.student_id)
        .bind(new.teacher_id)
        .bind(new.created_by)
        .fetch_one(db)
        .await?;
        Ok(student)
    }

    pub async fn find_by_student_id(
        db: &PgPool,
        student_id: &str,
    ) -> anyhow::Result<Option<Student>> {
        let student = sqlx::query_as::<_, Student>(&format!(
            "SELECT {STUDENT_COLUMNS} FROM students WHERE student_id = $1"
        ))
        .bind(student_id)
        .fetch_optional(db)
        .await?;
        Ok(student)
    }

    pub async fn student_id_exists(db: &PgPool, student_id: &str) -> anyhow::Result<bool> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM students WHERE student_id = $1)")
                .bind(student_id)
                .fetch_one(db)
                .await?;
        Ok(exists)
    }

    pub async fn list_by_class_section(
        db: &PgPool,
        class_name: &str,
        section: &str,
    ) -> anyhow::Result<Vec<Student>> {
        let students = sqlx::query_as::<_, Student>(&format!(
            r#"
            SELECT {STUDENT_COLUMNS} FROM students
            WHERE is_active AND class_name = $1 AND section = $2
            ORDER BY name
            "#
        ))
        .bind(class_name)
        .bind(section)
        .fetch_all(db)
        .await?;
        Ok(students)
    }

    /// Atomically replaces the latest-assignment snapshot in a single keyed
    /// update; concurrent writers resolve last-write-wins. Returns None when
    /// the student identifier is unknown.
    pub async fn set_latest_assignment(
        db: &PgPool,
        student_id: &str,
        assignment: &Assignment,
    ) -> anyhow::Result<Option<Student>> {
        let student = sqlx::query_as::<_, Student>(&format!(
            r#"
            UPDATE students
            SET latest_assignment = $2, updated_at = now()
            WHERE student_id = $1
            RETURNING {STUDENT_COLUMNS}
            "#
        ))
        .bind(student_id)
        .bind(sqlx::types::Json(assignment))
        .fetch_optional(db)
        .await?;
        Ok(student)
    }
}
