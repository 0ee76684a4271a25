//! Meal-plan macro aggregation engine. Pure and synchronous: the resolved
//! catalog mapping comes in as an argument, results go back to the plan
//! handlers, which persist or render them.

mod meal;
mod plan;
mod quantity;
mod scaler;

pub use meal::{aggregate_meal, FoodItemInput, ItemBreakdown, MealBreakdown, MealInput};
pub use plan::{aggregate_plan, AggregationError, PlanAggregation};
pub use quantity::parse_quantity;
pub use scaler::{scale, Macros, KCAL_PER_G_CARBS, KCAL_PER_G_FAT, KCAL_PER_G_PROTEIN};
