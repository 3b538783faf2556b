use serde_json::Value;

/// Key answers, most useful first. Responses use camelCase, envelopes
/// snake_case.
const PRIORITY_KEYS: [&str; 5] = [
    "periodicPayment",
    "periodic_payment",
    "approvalStatus",
    "approval_status",
    "summary",
];

/// Print the payment and status, or the single best answer available.
pub fn print_minimal(value: &Value) {
    let result_obj = value
        .as_object()
        .and_then(|m| m.get("result"))
        .unwrap_or(value);

    let Value::Object(map) = result_obj else {
        println!("{}", format_minimal(result_obj));
        return;
    };

    let found: Vec<String> = PRIORITY_KEYS
        .iter()
        .filter_map(|key| map.get(*key))
        .filter(|val| !val.is_null())
        .map(format_minimal)
        .collect();

    if !found.is_empty() {
        println!("{}", found.join(" "));
    } else if let Some((key, val)) = map.iter().next() {
        println!("{}: {}", key, format_minimal(val));
    }
}

fn format_minimal(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => "null".to_string(),
        _ => serde_json::to_string(value).unwrap_or_default(),
    }
}
