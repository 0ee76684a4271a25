use axum::{extract::State, http::StatusCode, Json};
use tracing::{error, info, instrument};

use super::repo::{fetch_food_profiles, FoodProfile};
use crate::{auth::AuthUser, state::AppState};

#[instrument(skip(state))]
pub async fn list_foods(
    State(state): State<AppState>,
    AuthUser(identity): AuthUser,
) -> Result<Json<Vec<FoodProfile>>, (StatusCode, String)> {
    let profiles = match fetch_food_profiles(state.store.as_ref(), None).await {
        Ok(map) => map,
        Err(e) => {
            error!(error = %e, "failed to load food catalog");
            return Err((StatusCode::INTERNAL_SERVER_ERROR, "Error interno.".into()));
        }
    };

    let mut list: Vec<FoodProfile> = profiles.into_values().collect();
    list.sort_by(|a, b| a.nombre.cmp(&b.nombre));

    info!(uid = %identity.uid, count = list.len(), "alimentos returned");
    Ok(Json(list))
}
