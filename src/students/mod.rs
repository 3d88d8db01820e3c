use axum::Router;

use crate::state::AppState;

pub mod forms;
pub mod handlers;
pub mod password;
pub mod repo;
pub mod views;

pub fn router() -> Router<AppState> {
    handlers::routes()
}
