use axum::{
    extract::{FromRef, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tracing::{info, instrument, warn};

use crate::{
    auth::{
        dto::{
            AdminLoginRequest, AuthData, LoginRequest, MeData, PublicUser, RegisterRequest, Role,
            StudentAuthData, StudentLoginRequest, StudentProfile,
        },
        repo::{NewUser, User},
        services::{hash_password, is_valid_email, verify_password, CurrentUser, JwtKeys},
    },
    error::{ApiError, ApiResponse},
    state::AppState,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/auth/student-login", post(student_login))
        .route("/auth/admin-login", post(admin_login))
        .route("/auth/me", get(get_me))
}

#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    Json(mut payload): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<ApiResponse<AuthData>>), ApiError> {
    payload.email = payload.email.trim().to_lowercase();

    if !is_valid_email(&payload.email) {
        warn!(email = %payload.email, "invalid email");
        return Err(ApiError::Validation("Invalid email".into()));
    }
    if payload.password.len() < 6 {
        return Err(ApiError::Validation("Password too short".into()));
    }

    if User::find_by_email_or_phone(&state.db, &payload.email, &payload.phone_number)
        .await?
        .is_some()
    {
        warn!(email = %payload.email, "duplicate registration");
        return Err(ApiError::Validation(
            "User with this email or phone number already exists".into(),
        ));
    }

    let password_hash = hash_password(&payload.password)?;
    let user = User::create(
        &state.db,
        NewUser {
            name: payload.name,
            phone_number: payload.phone_number,
            email: payload.email,
            password_hash,
            role: Role::Teacher,
            masjid_info: payload.masjid_info,
            student_info: None,
        },
    )
    .await?;

    let keys = JwtKeys::from_ref(&state);
    let token = keys.sign(user.id, None)?;

    info!(user_id = %user.id, email = %user.email, "user registered");
    Ok((
        StatusCode::CREATED,
        ApiResponse::with_message(
            "User registered successfully",
            AuthData {
                user: PublicUser::from_user(&user),
                token,
            },
        ),
    ))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    Json(mut payload): Json<LoginRequest>,
) -> Result<Json<ApiResponse<AuthData>>, ApiError> {
    payload.email = payload.email.trim().to_lowercase();

    let user = User::find_by_email(&state.db, &payload.email)
        .await?
        .ok_or_else(|| ApiError::Unauthorized("Invalid credentials".into()))?;

    if !verify_password(&payload.password, &user.password_hash)? {
        warn!(user_id = %user.id, "login invalid password");
        return Err(ApiError::Unauthorized("Invalid credentials".into()));
    }
    if !user.is_active {
        return Err(ApiError::Validation("Account is deactivated".into()));
    }

    let keys = JwtKeys::from_ref(&state);
    let token = keys.sign(user.id, None)?;

    info!(user_id = %user.id, email = %user.email, "user logged in");
    Ok(ApiResponse::with_message(
        "Login successful",
        AuthData {
            user: PublicUser::from_user(&user),
            token,
        },
    ))
}

#[instrument(skip(state, payload))]
pub async fn student_login(
    State(state): State<AppState>,
    Json(payload): Json<StudentLoginRequest>,
) -> Result<Json<ApiResponse<StudentAuthData>>, ApiError> {
    let password = payload
        .password
        .filter(|p| !p.is_empty())
        .ok_or_else(|| ApiError::Validation("Password is required".into()))?;

    // The student identifier doubles as the phone number on the credential
    // record.
    let student = User::find_by_phone_and_role(&state.db, &payload.student_id, Role::Student)
        .await?
        .ok_or_else(|| ApiError::Unauthorized("Invalid student ID".into()))?;

    if !verify_password(&password, &student.password_hash)? {
        warn!(user_id = %student.id, "student login invalid password");
        return Err(ApiError::Unauthorized("Invalid password".into()));
    }
    if !student.is_active {
        return Err(ApiError::Validation(
            "Student account is deactivated".into(),
        ));
    }

    let keys = JwtKeys::from_ref(&state);
    let token = keys.sign(student.id, Some(Role::Student))?;

    let info = student.student_info.as_ref().map(|j| j.0.clone());
    info!(user_id = %student.id, "student logged in");
    Ok(ApiResponse::with_message(
        "Student login successful",
        StudentAuthData {
            student: StudentProfile {
                id: student.id,
                student_id: student.phone_number.clone(),
                name: student.name.clone(),
                class: info.as_ref().and_then(|i| i.class.clone()),
                section: info.as_ref().and_then(|i| i.section.clone()),
                role: student.role,
            },
            token,
        },
    ))
}

#[instrument(skip(state, payload))]
pub async fn admin_login(
    State(state): State<AppState>,
    Json(payload): Json<AdminLoginRequest>,
) -> Result<Json<ApiResponse<AuthData>>, ApiError> {
    // Admin usernames live in the email column.
    let admin = User::find_by_email_and_role(&state.db, &payload.username, Role::Admin)
        .await?
        .ok_or_else(|| ApiError::Unauthorized("Invalid admin credentials".into()))?;

    if !verify_password(&payload.password, &admin.password_hash)? {
        warn!(user_id = %admin.id, "admin login invalid password");
        return Err(ApiError::Unauthorized("Invalid admin credentials".into()));
    }
    if !admin.is_active {
        return Err(ApiError::Validation("Admin account is deactivated".into()));
    }

    let keys = JwtKeys::from_ref(&state);
    let token = keys.sign(admin.id, Some(Role::Admin))?;

    info!(user_id = %admin.id, "admin logged in");
    Ok(ApiResponse::with_message(
        "Admin login successful",
        AuthData {
            user: PublicUser::from_user(&admin),
            token,
        },
    ))
}

#[instrument(skip_all)]
pub async fn get_me(
    CurrentUser(user): CurrentUser,
) -> Result<Json<ApiResponse<MeData>>, ApiError> {
    Ok(ApiResponse::data(MeData { user }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn public_user_hides_password_hash() {
        let user = User {
            id: uuid::Uuid::new_v4(),
            name: "Ustadh Kareem".into(),
            phone_number: "1234567890".into(),
            email: "kareem@example.com".into(),
            password_hash: "$argon2id$secret".into(),
            role: Role::Teacher,
            masjid_info: None,
            student_info: None,
            is_active: true,
            created_at: time::OffsetDateTime::now_utc(),
        };
        let json = serde_json::to_value(PublicUser::from_user(&user)).unwrap();
        assert_eq!(json["email"], "kareem@example.com");
        assert_eq!(json["phoneNumber"], "1234567890");
        assert!(json.get("passwordHash").is_none());

        // The full record serialization skips the hash too.
        let json = serde_json::to_value(&user).unwrap();
        assert!(json.get("passwordHash").is_none());
        assert!(!json.to_string().contains("argon2id"));
    }
}
