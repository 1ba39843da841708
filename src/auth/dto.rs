use jsonwebtoken::{DecodingKey, EncodingKey};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use uuid::Uuid;

use crate::auth::repo::User;

/// Account role. Tokens carry it only for the non-default roles; the default
/// (teacher) is implied by its absence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "user_role", rename_all = "lowercase")]
pub enum Role {
    Teacher,
    Admin,
    Student,
}

/// JWT payload used for authentication.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid, // user ID
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>, // present for student/admin tokens only
    pub iat: usize, // issued at (unix timestamp)
    pub exp: usize, // expires at (unix timestamp)
    pub iss: String, // issuer
}

/// Holds JWT signing and verification keys with config data.
#[derive(Clone)]
pub struct JwtKeys {
    pub encoding: EncodingKey,
    pub decoding: DecodingKey,
    pub issuer: String,
    pub ttl: Duration,
}

/// Request body for teacher registration.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub name: String,
    pub phone_number: String,
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub masjid_info: Option<serde_json::Value>,
}

/// Request body for email/password login.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Request body for student login by student identifier.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentLoginRequest {
    pub student_id: String,
    #[serde(default)]
    pub password: Option<String>,
}

/// Request body for admin login (username travels in the email field).
#[derive(Debug, Deserialize)]
pub struct AdminLoginRequest {
    pub username: String,
    pub password: String,
}

/// Public part of a user returned to the client.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicUser {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub phone_number: String,
    pub role: Role,
    pub masjid_info: Option<serde_json::Value>,
}

impl PublicUser {
    pub fn from_user(user: &User) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            email: user.email.clone(),
            phone_number: user.phone_number.clone(),
            role: user.role,
            masjid_info: user.masjid_info.clone(),
        }
    }
}

/// Response returned after register/login.
#[derive(Debug, Serialize)]
pub struct AuthData {
    pub user: PublicUser,
    pub token: String,
}

/// Student-facing profile returned by the student login.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentProfile {
    pub id: Uuid,
    pub student_id: String,
    pub name: String,
    pub class: Option<String>,
    pub section: Option<String>,
    pub role: Role,
}

#[derive(Debug, Serialize)]
pub struct StudentAuthData {
    pub student: StudentProfile,
    pub token: String,
}

#[derive(Debug, Serialize)]
pub struct MeData {
    pub user: User,
}
