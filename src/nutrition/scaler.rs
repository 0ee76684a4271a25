use std::ops::{Add, AddAssign};

use serde::{Deserialize, Serialize};

use crate::catalog::FoodProfile;

// Atwater energy factors, kcal per gram.
pub const KCAL_PER_G_PROTEIN: f64 = 4.0;
pub const KCAL_PER_G_CARBS: f64 = 4.0;
pub const KCAL_PER_G_FAT: f64 = 9.0;

/// Macro totals in grams plus derived kilocalories. Field names follow the
/// persisted wire contract (`macros` / `totales_diarios` objects).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Macros {
    pub proteinas: f64,
    pub carbohidratos: f64,
    pub grasas: f64,
    pub kcal: f64,
}

impl Add for Macros {
    type Output = Macros;

    fn add(self, rhs: Macros) -> Macros {
        Macros {
            proteinas: self.proteinas + rhs.proteinas,
            carbohidratos: self.carbohidratos + rhs.carbohidratos,
            grasas: self.grasas + rhs.grasas,
            kcal: self.kcal + rhs.kcal,
        }
    }
}

impl AddAssign for Macros {
    fn add_assign(&mut self, rhs: Macros) {
        *self = *self + rhs;
    }
}

/// Proportional macro contribution of one food at the requested quantity.
/// Calories are always derived here via Atwater (4/4/9) and never read from
/// a stored field, so stored and computed energy cannot diverge.
pub fn scale(profile: &FoodProfile, cantidad: f64) -> Macros {
    let factor = cantidad / profile.cantidad_base;
    let proteinas = profile.proteinas * factor;
    let carbohidratos = profile.carbohidratos * factor;
    let grasas = profile.grasas * factor;
    Macros {
        proteinas,
        carbohidratos,
        grasas,
        kcal: proteinas * KCAL_PER_G_PROTEIN
            + carbohidratos * KCAL_PER_G_CARBS
            + grasas * KCAL_PER_G_FAT,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chicken() -> FoodProfile {
        FoodProfile {
            id: "pollo".into(),
            nombre: "Pechuga de pollo".into(),
            categoria: "Carnes".into(),
            cantidad_base: 100.0,
            proteinas: 31.0,
            carbohidratos: 0.0,
            grasas: 3.6,
        }
    }

    #[test]
    fn scales_proportionally_to_base_quantity() {
        let macros = scale(&chicken(), 200.0);
        assert!((macros.proteinas - 62.0).abs() < 1e-9);
        assert!((macros.carbohidratos - 0.0).abs() < 1e-9);
        assert!((macros.grasas - 7.2).abs() < 1e-9);
        assert!((macros.kcal - 312.8).abs() < 1e-9);
    }

    #[test]
    fn kcal_is_exactly_atwater() {
        let macros = scale(&chicken(), 137.0);
        let expected = macros.proteinas * 4.0 + macros.carbohidratos * 4.0 + macros.grasas * 9.0;
        assert_eq!(macros.kcal, expected);
    }

    #[test]
    fn zero_quantity_contributes_nothing() {
        assert_eq!(scale(&chicken(), 0.0), Macros::default());
    }

    #[test]
    fn scaling_is_linear() {
        let once = scale(&chicken(), 75.0);
        let twice = scale(&chicken(), 150.0);
        assert!((twice.proteinas - 2.0 * once.proteinas).abs() < 1e-9);
        assert!((twice.kcal - 2.0 * once.kcal).abs() < 1e-9);
    }

    #[test]
    fn macros_sum_fieldwise() {
        let a = scale(&chicken(), 100.0);
        let mut total = Macros::default();
        total += a;
        total += a;
        assert!((total.kcal - 2.0 * a.kcal).abs() < 1e-9);
        assert!((total.grasas - 2.0 * a.grasas).abs() < 1e-9);
    }
}
