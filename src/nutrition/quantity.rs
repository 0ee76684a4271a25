use lazy_static::lazy_static;
use regex::Regex;

/// Normalizes a free-form quantity expression (`"150g"`, `"1.5 unidad"`, a
/// bare number) into its numeric magnitude. Anything that is not a digit or
/// a decimal point is stripped before parsing; if nothing parseable remains
/// the quantity is `0.0` — a zero-quantity item contributes zero macros
/// without destabilizing the aggregate sum.
pub fn parse_quantity(raw: &str) -> f64 {
    lazy_static! {
        static ref NON_NUMERIC: Regex = Regex::new(r"[^0-9.]").expect("valid regex");
    }
    NON_NUMERIC
        .replace_all(raw, "")
        .parse::<f64>()
        .unwrap_or(0.0)
}
