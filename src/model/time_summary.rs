use once_cell::sync::Lazy;
use serde_json::{Value, json};

static DEFAULT_TIME_SUMMARY: Lazy<Value> = Lazy::new(|| {
    json!({
        "totalWorkDays": 250,
        "onTime": 240,
        "late": 8,
        "absent": 2,
        "leave": 0,
        "totalHours": "2,000 ชม.",
        "avgCheckIn": "08:00",
        "avgCheckOut": "17:30"
    })
});

/// Summary attached to records that were stored without one.
pub fn default_time_summary() -> Value {
    DEFAULT_TIME_SUMMARY.clone()
}

/// Whether a stored `timeSummary` counts as present. Anything but `null`,
/// `false`, `0` and `""` does, whatever its shape.
pub fn summary_is_set(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_summary_has_dashboard_keys() {
        let summary = default_time_summary();
        assert_eq!(summary["totalWorkDays"], json!(250));
        assert_eq!(summary["totalHours"], json!("2,000 ชม."));
        assert_eq!(summary.as_object().map(|o| o.len()), Some(8));
    }

    #[test]
    fn any_truthy_value_counts_as_set() {
        assert!(summary_is_set(&json!({})));
        assert!(summary_is_set(&json!({ "totalWorkDays": "250" })));
        assert!(summary_is_set(&json!("n/a")));
        assert!(!summary_is_set(&json!(null)));
        assert!(!summary_is_set(&json!(0)));
        assert!(!summary_is_set(&json!("")));
    }
}
