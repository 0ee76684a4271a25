use std::collections::{BTreeSet, HashMap};

use serde::Serialize;
use serde_json::Value;

use crate::store::{fetch_by_ids, Document, DocumentStore};

pub const FOOD_COLLECTION: &str = "alimentos";

/// Substituted whenever a catalog record is missing its base quantity or
/// stores zero, so scaling never divides by zero.
pub const DEFAULT_BASE_QUANTITY: f64 = 100.0;

/// Reference nutritional profile of one catalog food: macro grams per
/// `cantidad_base` of product. Calories are never read from the catalog;
/// they are always derived from the macros.
#[derive(Debug, Clone, Serialize)]
pub struct FoodProfile {
    pub id: String,
    pub nombre: String,
    pub categoria: String,
    pub cantidad_base: f64,
    pub proteinas: f64,
    pub carbohidratos: f64,
    pub grasas: f64,
}

// Older catalog records use singular field names; newer ones plural. The
// normalization table below tries each alias in order.
const PROTEIN_FIELDS: &[&str] = &["proteinas", "proteina"];
const CARB_FIELDS: &[&str] = &["carbohidratos", "carbohidrato", "carbos"];
const FAT_FIELDS: &[&str] = &["grasas", "grasa"];
const BASE_FIELDS: &[&str] = &["cantidad_base", "base"];

fn coerce_number(value: Option<&Value>) -> f64 {
    match value {
        Some(Value::Number(n)) => n.as_f64().unwrap_or(0.0),
        Some(Value::String(s)) => s.trim().parse::<f64>().unwrap_or(0.0),
        _ => 0.0,
    }
}

fn first_of(doc: &Document, names: &[&str]) -> f64 {
    names
        .iter()
        .find_map(|name| doc.data.get(*name))
        .map(|v| coerce_number(Some(v)))
        .unwrap_or(0.0)
}

impl FoodProfile {
    pub fn from_doc(doc: &Document) -> Self {
        let base = first_of(doc, BASE_FIELDS);
        Self {
            id: doc.id.clone(),
            nombre: doc
                .str_field("nombre")
                .unwrap_or(doc.id.as_str())
                .to_string(),
            categoria: doc.str_field("categoria").unwrap_or_default().to_string(),
            cantidad_base: if base > 0.0 { base } else { DEFAULT_BASE_QUANTITY },
            proteinas: first_of(doc, PROTEIN_FIELDS),
            carbohidratos: first_of(doc, CARB_FIELDS),
            grasas: first_of(doc, FAT_FIELDS),
        }
    }
}

/// Resolves food ids against the catalog. `Some(ids)` fetches just those
/// documents (deduplicated, batched under the store's membership-query
/// limit); `None` loads the whole catalog. Unknown ids are simply absent
/// from the returned map.
pub async fn fetch_food_profiles(
    store: &dyn DocumentStore,
    ids: Option<&[String]>,
) -> anyhow::Result<HashMap<String, FoodProfile>> {
    let docs = match ids {
        Some(ids) => {
            let distinct: Vec<String> = ids
                .iter()
                .cloned()
                .collect::<BTreeSet<_>>()
                .into_iter()
                .collect();
            fetch_by_ids(store, FOOD_COLLECTION, &distinct).await?
        }
        None => store.list(FOOD_COLLECTION).await?,
    };
    Ok(docs
        .iter()
        .map(|doc| (doc.id.clone(), FoodProfile::from_doc(doc)))
        .collect())
}
