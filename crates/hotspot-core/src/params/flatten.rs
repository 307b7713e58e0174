//! Numeric-leaf flattening for change records and CSV export.

use std::collections::BTreeMap;

use serde_json::Value;

use super::adaptive::AdaptiveParameters;

/// Flatten the parameter tree into dotted-path numeric leaves, e.g.
/// `sensitivity.percent_threshold -> 50.0`. BTreeMap keeps the path order
/// stable, which the change-log CSV schema relies on.
pub fn flatten_numeric(params: &AdaptiveParameters) -> BTreeMap<String, f64> {
    let mut leaves = BTreeMap::new();
    if let Ok(root) = serde_json::to_value(params) {
        flatten_value("", &root, &mut leaves);
    }
    leaves
}

fn flatten_value(prefix: &str, value: &Value, out: &mut BTreeMap<String, f64>) {
    match value {
        Value::Object(map) => {
            for (key, child) in map {
                let path = if prefix.is_empty() {
                    key.clone()
                } else {
                    format!("{prefix}.{key}")
                };
                flatten_value(&path, child, out);
            }
        }
        Value::Number(n) => {
            if let Some(v) = n.as_f64() {
                out.insert(prefix.to_string(), v);
            }
        }
        _ => {}
    }
}
