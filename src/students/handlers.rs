use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use serde::Serialize;
use tracing::instrument;

use crate::auth::services::CurrentUser;
use crate::error::{ApiError, ApiResponse};
use crate::state::AppState;
use crate::students::repo::Student;

pub fn routes() -> Router<AppState> {
    Router::new().route(
        "/attendance/students/:class_name/:section",
        get(list_class_students),
    )
}

#[derive(Debug, Serialize)]
struct StudentsData {
    students: Vec<Student>,
}

#[instrument(skip(state, _user))]
async fn list_class_students(
    State(state): State<AppState>,
    CurrentUser(_user): CurrentUser,
    Path((class_name, section)): Path<(String, String)>,
) -> Result<Json<ApiResponse<StudentsData>>, ApiError> {
    let students = Student::list_by_class_section(&state.db, &class_name, &section).await?;
    Ok(ApiResponse::data(StudentsData { students }))
}
