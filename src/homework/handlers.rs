use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use time::OffsetDateTime;
use tracing::{debug, info, instrument};

use crate::auth::services::CurrentUser;
use crate::error::{ApiError, ApiResponse};
use crate::homework::dto::{
    AssignmentData, AssignmentPayload, AssignmentsData, AssignmentsQuery, HomeworkData,
    StatusQuery,
};
use crate::homework::repo::HomeworkRecord;
use crate::homework::services::{normalize_assignment, snapshot_assignments};
use crate::state::AppState;
use crate::students::repo::Student;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/homework", get(list_homework).post(create_assignment))
        .route("/homework/student/:student_id", get(student_assignments))
        .route(
            "/homework/student-assignments",
            get(student_assignments_query),
        )
}

#[instrument(skip(state, user, payload))]
async fn create_assignment(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(payload): Json<AssignmentPayload>,
) -> Result<(StatusCode, Json<ApiResponse<AssignmentData>>), ApiError> {
    let student_id = payload
        .student_id
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .ok_or_else(|| ApiError::Validation("studentId is required".into()))?;

    let assignment = normalize_assignment(
        &payload,
        &student_id,
        Some(user.id),
        OffsetDateTime::now_utc(),
    );

    let student = Student::set_latest_assignment(&state.db, &student_id, &assignment)
        .await?
        .ok_or_else(|| ApiError::NotFound("Student not found".into()))?;

    // The response is decided by the persisted write; delivery is
    // best-effort and a publish problem only gets logged.
    let delivered = state.hub.publish_new_assignment(&student_id, &assignment);
    debug!(student_id = %student_id, delivered, "new_task published");

    info!(student_id = %student.student_id, teacher_id = %user.id, title = %assignment.title, "assignment created");
    Ok((
        StatusCode::CREATED,
        ApiResponse::with_message("Assignment created successfully", AssignmentData { assignment }),
    ))
}

#[instrument(skip(state, _user))]
async fn student_assignments(
    State(state): State<AppState>,
    CurrentUser(_user): CurrentUser,
    Path(student_id): Path<String>,
    Query(query): Query<StatusQuery>,
) -> Result<Json<ApiResponse<AssignmentsData>>, ApiError> {
    latest_assignments(&state, &student_id, query.status.as_deref()).await
}

/// Same lookup keyed by query parameter, kept for the second client
/// generation.
#[instrument(skip(state, _user))]
async fn student_assignments_query(
    State(state): State<AppState>,
    CurrentUser(_user): CurrentUser,
    Query(query): Query<AssignmentsQuery>,
) -> Result<Json<ApiResponse<AssignmentsData>>, ApiError> {
    let student_id = query
        .student_id
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| ApiError::Validation("studentId is required".into()))?;
    latest_assignments(&state, student_id, query.status.as_deref()).await
}

async fn latest_assignments(
    state: &AppState,
    student_id: &str,
    status: Option<&str>,
) -> Result<Json<ApiResponse<AssignmentsData>>, ApiError> {
    let student = Student::find_by_student_id(&state.db, student_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Student not found".into()))?;

    let assignments = snapshot_assignments(student.latest_assignment.map(|json| json.0), status);

    Ok(ApiResponse::data(AssignmentsData { assignments }))
}

#[instrument(skip(state, _user))]
async fn list_homework(
    State(state): State<AppState>,
    CurrentUser(_user): CurrentUser,
) -> Result<Json<ApiResponse<HomeworkData>>, ApiError> {
    let homework = HomeworkRecord::list(&state.db).await?;
    Ok(ApiResponse::data(HomeworkData { homework }))
}
