use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get},
    Json, Router,
};
use serde::Deserialize;
use tracing::{debug, info, instrument};
use uuid::Uuid;

use crate::auth::services::AdminUser;
use crate::classes::repo::Class;
use crate::error::{ApiError, ApiResponse};
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/classes", get(list_classes).post(create_class))
        .route("/classes/:id", delete(delete_class))
}

#[derive(Debug, Deserialize)]
pub struct CreateClassRequest {
    pub name: String,
    #[serde(default)]
    pub sections: Vec<String>,
}

#[instrument(skip(state, admin, payload))]
async fn create_class(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Json(payload): Json<CreateClassRequest>,
) -> Result<(StatusCode, Json<ApiResponse<Class>>), ApiError> {
    let name = payload.name.trim();
    if name.is_empty() || payload.sections.is_empty() {
        return Err(ApiError::Validation(
            "Class name and at least one section required".into(),
        ));
    }

    if Class::find_by_name(&state.db, name).await?.is_some() {
        return Err(ApiError::Validation("Class already exists".into()));
    }

    let class = Class::create(&state.db, name, &payload.sections, admin.id).await?;

    // Best-effort push; class creation already succeeded.
    let delivered = state.hub.broadcast_new_class(&class);
    debug!(class = %class.name, delivered, "new_class broadcast");

    info!(class_id = %class.id, name = %class.name, "class created");
    Ok((
        StatusCode::CREATED,
        ApiResponse::with_message("Class created successfully", class),
    ))
}

#[instrument(skip(state, _admin))]
async fn list_classes(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
) -> Result<Json<ApiResponse<Vec<Class>>>, ApiError> {
    let classes = Class::list(&state.db).await?;
    Ok(ApiResponse::data(classes))
}

#[instrument(skip(state, _admin))]
async fn delete_class(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    if !Class::delete(&state.db, id).await? {
        return Err(ApiError::NotFound("Class not found".into()));
    }
    info!(class_id = %id, "class deleted");
    Ok(ApiResponse::message("Class deleted successfully"))
}
