use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Deserialize)]
pub struct UpdateProfileRequest {
    pub nombre: Option<String>,
    pub perfil_nutricional: Option<ProfileFieldsUpdate>,
}

/// Partial update of the nested nutritional profile; absent fields are left
/// untouched.
#[derive(Debug, Deserialize)]
pub struct ProfileFieldsUpdate {
    pub peso: Option<f64>,
    pub altura: Option<f64>,
    pub objetivo: Option<String>,
}

/// Patient entry in the nutritionist's roster view.
#[derive(Debug, Serialize)]
pub struct PatientSummary {
    pub uid: String,
    pub nombre: Option<String>,
    pub email: Option<String>,
    pub tipo: i64,
    pub perfil_nutricional: Value,
}
