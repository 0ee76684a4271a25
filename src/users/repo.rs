use serde_json::{json, Map, Value};

use super::dto::{PatientSummary, UpdateProfileRequest};
use crate::auth::Identity;
use crate::store::{fetch_by_ids, now_millis, timestamp_millis, Document, DocumentStore, Fields};

pub const USERS_COLLECTION: &str = "usuarios";

/// Patient role marker in user documents (1 = nutritionist, 2 = patient).
pub const TIPO_PACIENTE: i64 = 2;

fn normalized_profile(doc: Document) -> Value {
    let mut data = doc.data;
    let creado = timestamp_millis(data.get("creadoEn"));
    let actualizado = timestamp_millis(data.get("actualizadoEn"));
    data.insert("creadoEn".into(), json!(creado));
    data.insert("actualizadoEn".into(), json!(actualizado));
    Value::Object(data)
}

/// Fetches the caller's user document, creating a default one on first
/// access (clients may reach the API before the profile write lands).
pub async fn get_or_create_profile(
    store: &dyn DocumentStore,
    identity: &Identity,
) -> anyhow::Result<Value> {
    if let Some(doc) = store.get(USERS_COLLECTION, &identity.uid).await? {
        return Ok(normalized_profile(doc));
    }

    let nombre = identity
        .email
        .as_deref()
        .and_then(|e| e.split('@').next())
        .unwrap_or(identity.uid.as_str());
    let now = now_millis();
    let defaults = json!({
        "uid": identity.uid,
        "email": identity.email,
        "nombre": nombre,
        "creadoEn": now,
        "actualizadoEn": now,
    });
    let fields: Fields = defaults.as_object().cloned().unwrap_or_default();
    store.set(USERS_COLLECTION, &identity.uid, fields).await?;
    Ok(defaults)
}

pub async fn update_profile(
    store: &dyn DocumentStore,
    uid: &str,
    req: &UpdateProfileRequest,
) -> anyhow::Result<Value> {
    let mut patch: Fields = Map::new();
    patch.insert("actualizadoEn".into(), json!(now_millis()));
    if let Some(nombre) = &req.nombre {
        patch.insert("nombre".into(), json!(nombre));
    }
    if let Some(perfil) = &req.perfil_nutricional {
        if let Some(peso) = perfil.peso {
            patch.insert("perfil_nutricional.peso".into(), json!(peso));
        }
        if let Some(altura) = perfil.altura {
            patch.insert("perfil_nutricional.altura".into(), json!(altura));
        }
        if let Some(objetivo) = &perfil.objetivo {
            patch.insert("perfil_nutricional.objetivo".into(), json!(objetivo));
        }
    }

    store.update(USERS_COLLECTION, uid, patch).await?;
    let doc = store
        .get(USERS_COLLECTION, uid)
        .await?
        .ok_or_else(|| anyhow::anyhow!("user {uid} disappeared during update"))?;
    Ok(normalized_profile(doc))
}

fn patient_from_doc(doc: Document) -> PatientSummary {
    PatientSummary {
        nombre: doc.str_field("nombre").map(str::to_string),
        email: doc.str_field("email").map(str::to_string),
        tipo: doc
            .data
            .get("tipo")
            .and_then(Value::as_i64)
            .unwrap_or(TIPO_PACIENTE),
        perfil_nutricional: doc
            .data
            .get("perfil_nutricional")
            .cloned()
            .unwrap_or_else(|| json!({})),
        uid: doc.id,
    }
}

/// Patient roster for a nutritionist. A non-empty `pacientes` id array on
/// the nutritionist's document is resolved with the batched membership
/// lookup; without a roster the whole patient set (`tipo == 2`) is listed.
pub async fn list_patients(
    store: &dyn DocumentStore,
    nutricionista_uid: &str,
) -> anyhow::Result<Vec<PatientSummary>> {
    let assigned: Vec<String> = store
        .get(USERS_COLLECTION, nutricionista_uid)
        .await?
        .and_then(|doc| doc.data.get("pacientes").cloned())
        .and_then(|v| serde_json::from_value(v).ok())
        .unwrap_or_default();

    let docs = if assigned.is_empty() {
        store
            .query_eq(USERS_COLLECTION, "tipo", &json!(TIPO_PACIENTE))
            .await?
    } else {
        fetch_by_ids(store, USERS_COLLECTION, &assigned).await?
    };

    Ok(docs.into_iter().map(patient_from_doc).collect())
}
