use crate::state::AppState;
use axum::Router;

mod claims;
pub mod credentials;
mod dto;
pub mod handlers;
pub mod jwt;
pub mod memory_repo;
pub mod repo;
pub mod repo_types;

pub fn router() -> Router<AppState> {
    handlers::auth_routes()
}
