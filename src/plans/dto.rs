use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::nutrition::MealInput;

/// Plan-creation request body, as sent by the creator UI.
#[derive(Debug, Deserialize)]
pub struct CreatePlanRequest {
    #[serde(rename = "pacienteId")]
    pub paciente_id: String,
    pub nombre: String,
    /// Variant name ("Volumen", "Recomposición"); normalized into the
    /// version key on persist.
    pub tipo: String,
    #[serde(rename = "descripcionPlan")]
    pub descripcion_plan: Option<String>,
    pub objetivo: Option<String>,
    pub comidas: Vec<MealInput>,
}

#[derive(Debug, Serialize)]
pub struct CreatedPlanResponse {
    pub id: String,
    pub message: String,
}

/// One plan as returned to its owning patient.
#[derive(Debug, Serialize)]
pub struct AssignedPlan {
    pub id: String,
    pub nombre: Option<String>,
    pub descripcion: Option<String>,
    pub versiones: Value,
    /// Always epoch milliseconds, whatever shape the store returned.
    pub fecha_asignacion: i64,
}

/// One plan in the nutritionist's global view, tagged with its owner.
#[derive(Debug, Serialize)]
pub struct GlobalPlan {
    pub id: String,
    #[serde(rename = "pacienteId")]
    pub paciente_id: String,
    pub nombre: Option<String>,
    pub descripcion: Option<String>,
    pub versiones: Value,
    pub fecha_asignacion: i64,
}

#[derive(Debug, Deserialize)]
pub struct DeletePlanQuery {
    #[serde(rename = "pacienteId")]
    pub paciente_id: Option<String>,
}
