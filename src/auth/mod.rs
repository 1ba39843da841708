use crate::state::AppState;
use axum::Router;

pub mod dto;
pub mod handlers;
pub mod repo;
pub mod services;

pub use dto::Role;

pub fn router() -> Router<AppState> {
    handlers::auth_routes()
}
