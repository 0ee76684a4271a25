pub mod handlers;
mod repo;

pub use repo::{fetch_food_profiles, FoodProfile, DEFAULT_BASE_QUANTITY, FOOD_COLLECTION};

use crate::state::AppState;
use axum::{routing::get, Router};

pub fn router() -> Router<AppState> {
    Router::new().route("/alimentos", get(handlers::list_foods))
}
