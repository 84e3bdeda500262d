use std::collections::BTreeMap;

use serde_json::Value;

use super::super::domain::ScoringCriterion;

/// Reads a form value as a number. Numbers pass through, strings are parsed
/// after dropping thousands separators, and everything else counts as zero.
pub(crate) fn coerce_field_value(value: Option<&Value>) -> f64 {
    let coerced = match value {
        Some(Value::Number(number)) => number.as_f64().unwrap_or(0.0),
        Some(Value::String(raw)) => raw.trim().replace(',', "").parse::<f64>().unwrap_or(0.0),
        _ => 0.0,
    };

    if coerced.is_finite() {
        coerced
    } else {
        0.0
    }
}

/// Rounds half away from zero to two decimal places.
pub(crate) fn round_score(value: f64) -> f64 {
    let scaled = value * 100.0;
    // magnitudes this large carry no fractional digits
    if !scaled.is_finite() {
        return value;
    }
    let rounded = scaled.round() / 100.0;
    // fold -0.0 so it sorts level with zero
    if rounded == 0.0 {
        0.0
    } else {
        rounded
    }
}

/// Weighted contribution of every criterion and the rounded total.
pub(crate) fn score_application(
    criteria: &[ScoringCriterion],
    application_data: &BTreeMap<String, Value>,
) -> (BTreeMap<String, f64>, f64) {
    let mut breakdown = BTreeMap::new();
    let mut total = 0.0;

    for criterion in criteria {
        let value = coerce_field_value(application_data.get(&criterion.field_name));
        let contribution = finite_or_zero(value * (criterion.weight / 100.0));
        total += contribution;
        breakdown.insert(criterion.field_name.clone(), contribution);
    }

    let total = if total.is_finite() {
        total
    } else {
        f64::MAX.copysign(total)
    };
    (breakdown, round_score(total))
}

fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        0.0
    }
}
