use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::quantity::parse_quantity;
use super::scaler::{scale, Macros};
use crate::catalog::FoodProfile;

/// One authored food line: a catalog reference plus the requested quantity
/// as written (`"150g"`, `"1 unidad"`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FoodItemInput {
    #[serde(rename = "refAlimento")]
    pub ref_alimento: String,
    pub cantidad: String,
}

/// One meal as received from the plan-creation request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MealInput {
    pub nombre: String,
    pub alimentos: Vec<FoodItemInput>,
}

/// Computed contribution of one food line. Unresolved references keep their
/// id and are marked `encontrado = false` so clients can render them as
/// "not found"; they contribute zero to every total.
#[derive(Debug, Clone, Serialize)]
pub struct ItemBreakdown {
    #[serde(rename = "refAlimento")]
    pub ref_alimento: String,
    pub nombre: String,
    pub categoria: String,
    pub cantidad: String,
    pub macros: Macros,
    pub encontrado: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct MealBreakdown {
    pub nombre: String,
    pub alimentos: Vec<ItemBreakdown>,
    pub macros: Macros,
    #[serde(skip)]
    pub resolved_items: usize,
}

/// Sums item contributions into one meal's totals. A bad food reference or
/// an unparseable quantity never fails the meal; totals accumulate
/// unrounded, rounding is left to presentation.
pub fn aggregate_meal(meal: &MealInput, catalog: &HashMap<String, FoodProfile>) -> MealBreakdown {
    let mut totals = Macros::default();
    let mut resolved_items = 0;
    let mut alimentos = Vec::with_capacity(meal.alimentos.len());

    for item in &meal.alimentos {
        match catalog.get(&item.ref_alimento) {
            Some(profile) => {
                let macros = scale(profile, parse_quantity(&item.cantidad));
                totals += macros;
                resolved_items += 1;
                alimentos.push(ItemBreakdown {
                    ref_alimento: item.ref_alimento.clone(),
                    nombre: profile.nombre.clone(),
                    categoria: profile.categoria.clone(),
                    cantidad: item.cantidad.clone(),
                    macros,
                    encontrado: true,
                });
            }
            None => {
                alimentos.push(ItemBreakdown {
                    ref_alimento: item.ref_alimento.clone(),
                    nombre: "No encontrado".into(),
                    categoria: String::new(),
                    cantidad: item.cantidad.clone(),
                    macros: Macros::default(),
                    encontrado: false,
                });
            }
        }
    }

    MealBreakdown {
        nombre: meal.nombre.clone(),
        alimentos,
        macros: totals,
        resolved_items,
    }
}
