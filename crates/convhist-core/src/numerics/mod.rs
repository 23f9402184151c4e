use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct NumericTolerance {
    #[serde(rename = "absTol")]
    pub abs_tol: f64,
    #[serde(rename = "relTol")]
    pub rel_tol: f64,
    #[serde(rename = "relativeFloor")]
    pub relative_floor: f64,
}

impl Default for NumericTolerance {
    fn default() -> Self {
        Self {
            abs_tol: 1.0e-6,
            rel_tol: 1.0e-4,
            relative_floor: 1.0e-12,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ToleranceComparison {
    pub abs_diff: f64,
    pub rel_diff: f64,
    pub passes: bool,
}

pub fn compare_with_tolerance(
    reference: f64,
    actual: f64,
    tolerance: NumericTolerance,
) -> ToleranceComparison {
    let abs_diff = (actual - reference).abs();
    let rel_denominator = reference.abs().max(tolerance.relative_floor);
    let rel_diff = abs_diff / rel_denominator;
    let passes = abs_diff <= tolerance.abs_tol || abs_diff <= tolerance.rel_tol * rel_denominator;

    ToleranceComparison {
        abs_diff,
        rel_diff,
        passes,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ColumnStats {
    pub first: f64,
    pub last: f64,
    pub min: f64,
    pub max: f64,
}

impl ColumnStats {
    /// NaN entries are skipped for `min`/`max`; `first`/`last` are taken as-is.
    pub fn from_values(values: &[f64]) -> Option<Self> {
        let first = *values.first()?;
        let last = *values.last()?;
        let (min, max) = values
            .iter()
            .copied()
            .filter(|value| !value.is_nan())
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(min, max), value| {
                (min.min(value), max.max(value))
            });

        Some(Self {
            first,
            last,
            min,
            max,
        })
    }
}

/// Signed ratio `first / last`, `None` when `last` is zero or either value is not
/// finite.
pub fn reduction_ratio(first: f64, last: f64) -> Option<f64> {
    if !first.is_finite() || !last.is_finite() || last == 0.0 {
        return None;
    }
    Some(first / last)
}

/// `lift / drag`, `None` when drag is zero or the quotient is not finite.
pub fn lift_drag_ratio(lift: f64, drag: f64) -> Option<f64> {
    if drag == 0.0 {
        return None;
    }
    let ratio = lift / drag;
    ratio.is_finite().then_some(ratio)
}
