use axum::{extract::State, http::StatusCode, Json};
use serde_json::Value;
use tracing::{info, instrument};

use super::dto::{PatientSummary, UpdateProfileRequest};
use super::repo;
use crate::{auth::AuthUser, state::AppState};

#[instrument(skip(state))]
pub async fn get_profile(
    State(state): State<AppState>,
    AuthUser(identity): AuthUser,
) -> Result<Json<Value>, (StatusCode, String)> {
    let profile = repo::get_or_create_profile(state.store.as_ref(), &identity)
        .await
        .map_err(internal)?;
    info!(uid = %identity.uid, "perfil returned");
    Ok(Json(profile))
}

#[instrument(skip(state, payload))]
pub async fn update_profile(
    State(state): State<AppState>,
    AuthUser(identity): AuthUser,
    Json(payload): Json<UpdateProfileRequest>,
) -> Result<Json<Value>, (StatusCode, String)> {
    let profile = repo::update_profile(state.store.as_ref(), &identity.uid, &payload)
        .await
        .map_err(internal)?;
    info!(uid = %identity.uid, "perfil updated");
    Ok(Json(profile))
}

#[instrument(skip(state))]
pub async fn list_patients(
    State(state): State<AppState>,
    AuthUser(identity): AuthUser,
) -> Result<Json<Vec<PatientSummary>>, (StatusCode, String)> {
    let patients = repo::list_patients(state.store.as_ref(), &identity.uid)
        .await
        .map_err(internal)?;
    info!(uid = %identity.uid, count = patients.len(), "pacientes returned");
    Ok(Json(patients))
}

fn internal<E: std::fmt::Display>(e: E) -> (StatusCode, String) {
    (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
}
