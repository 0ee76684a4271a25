use anyhow::Context;
use serde_json::{json, Value};

use super::dto::{AssignedPlan, GlobalPlan};
use crate::nutrition::PlanAggregation;
use crate::store::{now_millis, timestamp_millis, Document, DocumentStore, Fields};

pub const PLANS_COLLECTION: &str = "planes";

pub fn plans_path(uid: &str) -> String {
    format!("usuarios/{uid}/{PLANS_COLLECTION}")
}

/// Version keys are the variant name lowercased with the accent folded
/// ("Recomposición" -> "recomposicion").
pub fn version_key(tipo: &str) -> String {
    tipo.to_lowercase().replace('ó', "o")
}

/// Builds the plan document persisted under `usuarios/{paciente}/planes`:
/// one named version holding the enriched meals and daily totals, with
/// `calorias` derived from the aggregated kcal.
pub fn build_plan_doc(
    nombre: &str,
    tipo: &str,
    descripcion: Option<&str>,
    objetivo: Option<&str>,
    nutricionista_uid: &str,
    aggregation: &PlanAggregation,
) -> anyhow::Result<Fields> {
    let version = json!({
        "tipo": tipo,
        "calorias": aggregation.totales_diarios.kcal,
        "objetivo": objetivo.unwrap_or("Objetivo no especificado"),
        "comidas": serde_json::to_value(&aggregation.comidas)?,
        "totales_diarios": serde_json::to_value(aggregation.totales_diarios)?,
    });
    let descripcion = descripcion
        .map(str::to_string)
        .unwrap_or_else(|| format!("Plan {tipo} creado por Nutricionista {nutricionista_uid}"));

    let doc = json!({
        "nombre": nombre.trim(),
        "descripcion": descripcion,
        "fecha_asignacion": now_millis(),
        "versiones": { version_key(tipo): version },
    });
    doc.as_object().cloned().context("plan doc is an object")
}

pub async fn insert(
    store: &dyn DocumentStore,
    paciente_id: &str,
    doc: Fields,
) -> anyhow::Result<String> {
    store.add(&plans_path(paciente_id), doc).await
}

fn assigned_from_doc(doc: Document) -> AssignedPlan {
    AssignedPlan {
        fecha_asignacion: timestamp_millis(doc.data.get("fecha_asignacion")),
        nombre: doc.str_field("nombre").map(str::to_string),
        descripcion: doc.str_field("descripcion").map(str::to_string),
        versiones: doc.data.get("versiones").cloned().unwrap_or(Value::Null),
        id: doc.id,
    }
}

pub async fn list_assigned(
    store: &dyn DocumentStore,
    uid: &str,
) -> anyhow::Result<Vec<AssignedPlan>> {
    let docs = store.list(&plans_path(uid)).await?;
    Ok(docs.into_iter().map(assigned_from_doc).collect())
}

pub async fn delete(store: &dyn DocumentStore, uid: &str, plan_id: &str) -> anyhow::Result<()> {
    store.delete(&plans_path(uid), plan_id).await
}

pub async fn list_all(store: &dyn DocumentStore) -> anyhow::Result<Vec<GlobalPlan>> {
    let docs = store.query_group(PLANS_COLLECTION).await?;
    Ok(docs
        .into_iter()
        .map(|doc| GlobalPlan {
            paciente_id: doc.parent.clone().unwrap_or_else(|| "Desconocido".into()),
            fecha_asignacion: timestamp_millis(doc.data.get("fecha_asignacion")),
            nombre: doc.str_field("nombre").map(str::to_string),
            descripcion: doc.str_field("descripcion").map(str::to_string),
            versiones: doc
                .data
                .get("versiones")
                .cloned()
                .unwrap_or_else(|| json!({})),
            id: doc.id,
        })
        .collect())
}
