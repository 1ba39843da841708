use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{delete, get, post, put},
    Json, Router,
};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::admin::dto::{
    AddStudentData, AddStudentRequest, AddTeacherData, AddTeacherRequest, DashboardStats,
    UpdateCredentialsRequest, UsersData, UsersQuery,
};
use crate::auth::dto::{PublicUser, Role};
use crate::auth::repo::{NewUser, StudentInfo, User};
use crate::auth::services::{generate_unique_phone, hash_password, verify_password, AdminUser};
use crate::classes::repo::Class;
use crate::error::{ApiError, ApiResponse};
use crate::state::AppState;
use crate::students::repo::{NewStudent, Student};

const DEFAULT_TEACHER_PASSWORD: &str = "default123";
const DEFAULT_STUDENT_PASSWORD: &str = "student123";
const STUDENT_EMAIL_DOMAIN: &str = "student.hifztracker.com";

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/admin/login", post(crate::auth::handlers::admin_login))
        .route("/admin/update-credentials", put(update_credentials))
        .route("/admin/dashboard-stats", get(dashboard_stats))
        .route("/admin/add-teacher", post(add_teacher))
        .route("/admin/add-student", post(add_student))
        .route("/admin/users", get(list_users))
        .route("/admin/users/:id", delete(delete_user))
}

#[instrument(skip(state, admin, payload))]
async fn update_credentials(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Json(payload): Json<UpdateCredentialsRequest>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    if payload.new_username.trim().is_empty() || payload.new_password.len() < 6 {
        return Err(ApiError::Validation(
            "New username and a password of at least 6 characters required".into(),
        ));
    }
    if admin.email != payload.old_username {
        return Err(ApiError::Validation("Invalid old username".into()));
    }
    if !verify_password(&payload.old_password, &admin.password_hash)? {
        warn!(user_id = %admin.id, "credential update with invalid old password");
        return Err(ApiError::Validation("Invalid old password".into()));
    }
    if User::email_taken_by_other(&state.db, &payload.new_username, admin.id).await? {
        return Err(ApiError::Validation("Username already exists".into()));
    }

    let password_hash = hash_password(&payload.new_password)?;
    User::update_credentials(&state.db, admin.id, &payload.new_username, &password_hash).await?;

    info!(user_id = %admin.id, "admin credentials updated");
    Ok(ApiResponse::message("Admin credentials updated successfully"))
}

#[instrument(skip(state, _admin))]
async fn dashboard_stats(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
) -> Result<Json<ApiResponse<DashboardStats>>, ApiError> {
    let total_teachers = User::count_active(&state.db, Some(Role::Teacher)).await?;
    let total_students = User::count_active(&state.db, Some(Role::Student)).await?;
    let total_classes = Class::count(&state.db).await?;
    Ok(ApiResponse::data(DashboardStats {
        total_teachers,
        total_students,
        total_classes,
    }))
}

#[instrument(skip(state, _admin, payload))]
async fn add_teacher(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
    Json(payload): Json<AddTeacherRequest>,
) -> Result<(StatusCode, Json<ApiResponse<AddTeacherData>>), ApiError> {
    if payload.name.trim().is_empty() || payload.email.trim().is_empty() {
        return Err(ApiError::Validation("Name and email are required".into()));
    }

    if User::find_by_email_or_phone(&state.db, &payload.email, &payload.phone_number)
        .await?
        .is_some()
    {
        return Err(ApiError::Validation(
            "User with this email or phone number already exists".into(),
        ));
    }

    let password = payload
        .password
        .filter(|p| !p.is_empty())
        .unwrap_or_else(|| DEFAULT_TEACHER_PASSWORD.to_string());
    let password_hash = hash_password(&password)?;

    let teacher = User::create(
        &state.db,
        NewUser {
            name: payload.name,
            phone_number: payload.phone_number,
            email: payload.email,
            password_hash,
            role: Role::Teacher,
            masjid_info: None,
            student_info: None,
        },
    )
    .await?;

    info!(user_id = %teacher.id, email = %teacher.email, "teacher added");
    Ok((
        StatusCode::CREATED,
        ApiResponse::with_message(
            "Teacher added successfully",
            AddTeacherData {
                user: PublicUser::from_user(&teacher),
            },
        ),
    ))
}

#[instrument(skip(state, admin, payload))]
async fn add_student(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Json(payload): Json<AddStudentRequest>,
) -> Result<(StatusCode, Json<ApiResponse<AddStudentData>>), ApiError> {
    let name = payload.name.trim().to_string();
    let student_id = payload.phone_number.trim().to_string();
    if name.is_empty() || student_id.is_empty() {
        return Err(ApiError::Validation("Name and student ID are required".into()));
    }

    let info = payload.student_info.unwrap_or_default();
    let class = info
        .class
        .clone()
        .filter(|c| !c.is_empty())
        .ok_or_else(|| ApiError::Validation("Class and section are required".into()))?;
    let section = info
        .section
        .clone()
        .filter(|s| !s.is_empty())
        .ok_or_else(|| ApiError::Validation("Class and section are required".into()))?;

    if Student::student_id_exists(&state.db, &student_id).await? {
        return Err(ApiError::Validation(
            "Student with this ID already exists".into(),
        ));
    }

    // The credential record carries a generated synthetic phone number; the
    // human-assigned id keys the roster record instead.
    let phone_number = generate_unique_phone(&state.db).await?;
    let email = student_email(&name);
    let password = payload
        .password
        .filter(|p| !p.is_empty())
        .unwrap_or_else(|| DEFAULT_STUDENT_PASSWORD.to_string());
    let password_hash = hash_password(&password)?;

    let user = User::create(
        &state.db,
        NewUser {
            name: name.clone(),
            phone_number,
            email,
            password_hash,
            role: Role::Student,
            masjid_info: None,
            student_info: Some(StudentInfo {
                class: Some(class.clone()),
                section: Some(section.clone()),
            }),
        },
    )
    .await?;

    let student = Student::create(
        &state.db,
        NewStudent {
            name: name.clone(),
            urdu_name: info.urdu_name.filter(|u| !u.is_empty()).unwrap_or(name),
            class_name: class,
            section,
            student_id,
            teacher_id: info.teacher_id,
            created_by: info.teacher_id.unwrap_or(admin.id),
        },
    )
    .await?;

    info!(user_id = %user.id, student_id = %student.student_id, "student added");
    Ok((
        StatusCode::CREATED,
        ApiResponse::with_message(
            "Student added successfully",
            AddStudentData { user, student },
        ),
    ))
}

fn student_email(name: &str) -> String {
    let local: String = name
        .trim()
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(".");
    format!("{local}@{STUDENT_EMAIL_DOMAIN}")
}

#[instrument(skip(state, _admin))]
async fn list_users(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
    Query(query): Query<UsersQuery>,
) -> Result<Json<ApiResponse<UsersData>>, ApiError> {
    let page = query.page.max(1);
    let limit = query.limit.clamp(1, 100);
    let offset = (page - 1) * limit;

    let users = User::list_active(&state.db, query.role, limit, offset).await?;
    let total = User::count_active(&state.db, query.role).await?;
    let total_pages = (total + limit - 1) / limit;

    Ok(ApiResponse::data(UsersData {
        users,
        total_pages,
        current_page: page,
        total,
    }))
}

#[instrument(skip(state, admin))]
async fn delete_user(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    if id == admin.id {
        return Err(ApiError::Validation("Cannot delete your own account".into()));
    }
    if User::find_by_id(&state.db, id).await?.is_none() {
        return Err(ApiError::NotFound("User not found".into()));
    }
    User::deactivate(&state.db, id).await?;

    info!(user_id = %id, "user deactivated");
    Ok(ApiResponse::message("User deleted successfully"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn student_email_from_name() {
        assert_eq!(
            student_email("Ahmed Raza Khan"),
            "ahmed.raza.khan@student.hifztracker.com"
        );
        assert_eq!(student_email("  Bilal "), "bilal@student.hifztracker.com");
    }
}
