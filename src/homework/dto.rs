use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::homework::repo::HomeworkRecord;

/// Incoming assignment payload. Clients have shipped several shapes over
/// time: a bare `selectedSurah` code, separate start/end surah objects with a
/// name or a numeric code, and two different type fields. All of them are
/// accepted here and collapsed into one [`Assignment`].
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignmentPayload {
    pub student_id: Option<String>,
    pub teacher_id: Option<Uuid>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub due_date: Option<String>,
    pub activity_type: Option<String>,
    #[serde(rename = "type")]
    pub legacy_type: Option<String>,
    pub selected_surah: Option<String>,
    pub start_surah: Option<SurahPayload>,
    pub end_surah: Option<SurahPayload>,
    pub start_verse: Option<i64>,
    pub end_verse: Option<i64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SurahPayload {
    pub name: Option<String>,
    pub number: Option<i64>,
}

/// Canonical assignment record: the single shape persisted as the student's
/// latest-assignment snapshot and pushed over the realtime channel. Absent
/// verse bounds serialize as null rather than being omitted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Assignment {
    pub student_id: String,
    pub teacher_id: Option<Uuid>,
    pub title: String,
    #[serde(rename = "type")]
    pub activity_type: String,
    pub description: Option<String>,
    pub due_date: Option<String>,
    pub start_surah: SurahRef,
    pub end_surah: SurahRef,
    pub start_verse: Option<i64>,
    pub end_verse: Option<i64>,
    pub status: String,
    pub created_at: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SurahRef {
    pub name: String,
}

#[derive(Debug, Serialize)]
pub struct AssignmentData {
    pub assignment: Assignment,
}

#[derive(Debug, Serialize)]
pub struct AssignmentsData {
    pub assignments: Vec<Assignment>,
}

#[derive(Debug, Deserialize)]
pub struct StatusQuery {
    #[serde(default)]
    pub status: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignmentsQuery {
    pub student_id: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct HomeworkData {
    pub homework: Vec<HomeworkRecord>,
}
