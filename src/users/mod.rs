mod dto;
pub mod handlers;
pub(crate) mod repo;

pub use repo::USERS_COLLECTION;

use crate::state::AppState;
use axum::{routing::get, Router};

pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/perfil",
            get(handlers::get_profile).put(handlers::update_profile),
        )
        .route("/nutricionista/pacientes", get(handlers::list_patients))
}
