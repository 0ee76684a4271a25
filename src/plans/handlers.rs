use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use tracing::{error, info, instrument, warn};

use super::dto::{
    AssignedPlan, CreatePlanRequest, CreatedPlanResponse, DeletePlanQuery, GlobalPlan,
};
use super::repo;
use crate::{
    auth::AuthUser,
    catalog::fetch_food_profiles,
    nutrition::aggregate_plan,
    state::AppState,
};

#[instrument(skip(state, payload))]
pub async fn create_plan(
    State(state): State<AppState>,
    AuthUser(identity): AuthUser,
    Json(payload): Json<CreatePlanRequest>,
) -> Result<(StatusCode, Json<CreatedPlanResponse>), (StatusCode, String)> {
    if payload.paciente_id.trim().is_empty() {
        warn!("create_plan without pacienteId");
        return Err((
            StatusCode::BAD_REQUEST,
            "Se requiere un 'pacienteId' para crear el plan.".into(),
        ));
    }
    if payload.nombre.trim().is_empty() || payload.tipo.trim().is_empty() {
        return Err((
            StatusCode::BAD_REQUEST,
            "Datos del plan incompletos (nombre, tipo, comidas).".into(),
        ));
    }

    // Each request resolves its own catalog mapping; nothing is cached.
    let referenced: Vec<String> = payload
        .comidas
        .iter()
        .flat_map(|meal| meal.alimentos.iter())
        .map(|item| item.ref_alimento.clone())
        .collect();
    let catalog = fetch_food_profiles(state.store.as_ref(), Some(&referenced))
        .await
        .map_err(internal)?;

    let aggregation = aggregate_plan(&payload.comidas, &catalog)
        .into_valid()
        .map_err(|e| {
            warn!(uid = %identity.uid, "plan rejected: no valid content");
            (StatusCode::BAD_REQUEST, e.to_string())
        })?;

    let doc = repo::build_plan_doc(
        &payload.nombre,
        &payload.tipo,
        payload.descripcion_plan.as_deref(),
        payload.objetivo.as_deref(),
        &identity.uid,
        &aggregation,
    )
    .map_err(internal)?;

    let plan_id = repo::insert(state.store.as_ref(), &payload.paciente_id, doc)
        .await
        .map_err(internal)?;

    info!(
        plan_id = %plan_id,
        paciente_id = %payload.paciente_id,
        nutricionista = %identity.uid,
        kcal = aggregation.totales_diarios.kcal,
        "plan created"
    );
    Ok((
        StatusCode::CREATED,
        Json(CreatedPlanResponse {
            id: plan_id,
            message: "Plan creado exitosamente".into(),
        }),
    ))
}

#[instrument(skip(state))]
pub async fn list_assigned_plans(
    State(state): State<AppState>,
    AuthUser(identity): AuthUser,
) -> Result<Json<Vec<AssignedPlan>>, (StatusCode, String)> {
    let plans = repo::list_assigned(state.store.as_ref(), &identity.uid)
        .await
        .map_err(internal)?;
    info!(uid = %identity.uid, count = plans.len(), "assigned plans returned");
    Ok(Json(plans))
}

#[instrument(skip(state))]
pub async fn delete_plan(
    State(state): State<AppState>,
    AuthUser(identity): AuthUser,
    Path(plan_id): Path<String>,
    Query(query): Query<DeletePlanQuery>,
) -> Result<Json<serde_json::Value>, (StatusCode, String)> {
    // Default target is the requester's own plan; a nutritionist passes
    // ?pacienteId= to delete a patient's plan.
    let target_uid = match query.paciente_id {
        Some(paciente_id) => {
            info!(nutricionista = %identity.uid, paciente = %paciente_id, "deleting patient plan");
            paciente_id
        }
        None => identity.uid.clone(),
    };

    repo::delete(state.store.as_ref(), &target_uid, &plan_id)
        .await
        .map_err(internal)?;

    info!(%plan_id, %target_uid, "plan deleted");
    Ok(Json(serde_json::json!({ "message": "Plan eliminado exitosamente." })))
}

#[instrument(skip(state))]
pub async fn list_all_plans(
    State(state): State<AppState>,
    AuthUser(identity): AuthUser,
) -> Result<Json<Vec<GlobalPlan>>, (StatusCode, String)> {
    let plans = match repo::list_all(state.store.as_ref()).await {
        Ok(p) => p,
        Err(e) => {
            error!(error = %e, "global plan listing failed");
            return Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                "Error al cargar planes globales.".into(),
            ));
        }
    };
    info!(uid = %identity.uid, count = plans.len(), "global plans returned");
    Ok(Json(plans))
}

fn internal<E: std::fmt::Display>(e: E) -> (StatusCode, String) {
    (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
}
