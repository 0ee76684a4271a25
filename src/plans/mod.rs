mod dto;
pub mod handlers;
pub(crate) mod repo;

use crate::state::AppState;
use axum::{
    routing::{delete, get, post},
    Router,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/planes", post(handlers::create_plan))
        .route("/planes/asignados", get(handlers::list_assigned_plans))
        .route("/planes/:plan_id", delete(handlers::delete_plan))
        .route(
            "/nutricionista/todos-los-planes",
            get(handlers::list_all_plans),
        )
}
