use std::collections::HashMap;

use serde::Serialize;
use thiserror::Error;

use super::meal::{aggregate_meal, MealBreakdown, MealInput};
use super::scaler::Macros;
use crate::catalog::FoodProfile;

#[derive(Debug, Error)]
pub enum AggregationError {
    /// Every meal was empty or every food reference failed to resolve.
    /// Plan creation must be rejected rather than persisting an empty plan.
    #[error("el plan debe contener al menos un alimento válido")]
    NoValidContent,
}

/// Whole-plan aggregation result: enriched meals ready to persist plus the
/// daily totals derived from them.
#[derive(Debug, Clone, Serialize)]
pub struct PlanAggregation {
    pub comidas: Vec<MealBreakdown>,
    pub totales_diarios: Macros,
    #[serde(skip)]
    pub resolved_items: usize,
}

impl PlanAggregation {
    /// A plan is valid when at least one food reference resolved somewhere.
    /// Individual bad references are tolerated and only flagged.
    pub fn has_valid_content(&self) -> bool {
        self.resolved_items > 0
    }

    /// The one validation gate of the pipeline, used by the create-plan flow.
    pub fn into_valid(self) -> Result<Self, AggregationError> {
        if self.has_valid_content() {
            Ok(self)
        } else {
            Err(AggregationError::NoValidContent)
        }
    }
}

/// Pure single pass over (meals, catalog): aggregates each meal and sums the
/// meal totals into daily totals. Performs no I/O and holds no state; the
/// catalog mapping is built per request by the caller.
pub fn aggregate_plan(
    comidas: &[MealInput],
    catalog: &HashMap<String, FoodProfile>,
) -> PlanAggregation {
    let mut totales_diarios = Macros::default();
    let mut resolved_items = 0;

    let comidas = comidas
        .iter()
        .map(|meal| {
            let breakdown = aggregate_meal(meal, catalog);
            totales_diarios += breakdown.macros;
            resolved_items += breakdown.resolved_items;
            breakdown
        })
        .collect();

    PlanAggregation {
        comidas,
        totales_diarios,
        resolved_items,
    }
}
