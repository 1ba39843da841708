use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::dto::PublicUser;
use crate::auth::repo::User;
use crate::students::repo::Student;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCredentialsRequest {
    pub old_username: String,
    pub old_password: String,
    pub new_username: String,
    pub new_password: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_teachers: i64,
    pub total_students: i64,
    pub total_classes: i64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddTeacherRequest {
    pub name: String,
    pub email: String,
    pub phone_number: String,
    #[serde(default)]
    pub password: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct AddTeacherData {
    pub user: PublicUser,
}

/// Add-student request. `phoneNumber` carries the human-assigned student
/// identifier, a quirk of the first client generation that the roster key
/// inherits.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddStudentRequest {
    pub name: String,
    pub phone_number: String,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub student_info: Option<AddStudentInfo>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddStudentInfo {
    pub class: Option<String>,
    pub section: Option<String>,
    pub urdu_name: Option<String>,
    pub teacher_id: Option<Uuid>,
}

#[derive(Debug, Serialize)]
pub struct AddStudentData {
    pub user: User,
    pub student: Student,
}

#[derive(Debug, Deserialize)]
pub struct UsersQuery {
    #[serde(default)]
    pub role: Option<crate::auth::Role>,
    #[serde(default = "default_page")]
    pub page: i64,
    #[serde(default = "default_limit")]
    pub limit: i64,
}

fn default_page() -> i64 {
    1
}

fn default_limit() -> i64 {
    10
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UsersData {
    pub users: Vec<User>,
    pub total_pages: i64,
    pub current_page: i64,
    pub total: i64,
}
