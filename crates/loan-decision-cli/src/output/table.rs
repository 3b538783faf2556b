use serde_json::{Map, Value};
use tabled::{builder::Builder, Table};

/// Keys rendered as their own section instead of a table cell.
const EXPLANATION_KEYS: [&str; 2] = ["explanation", "explanationPoints"];

/// Format a response or envelope as tables.
pub fn print_table(value: &Value) {
    match value {
        Value::Object(map) => match map.get("result") {
            Some(Value::Object(result)) => print_envelope(result, map),
            _ => print_response(map),
        },
        Value::Array(arr) => print_array_table(arr),
        _ => println!("{}", value),
    }
}

fn print_response(map: &Map<String, Value>) {
    print_fields(map);
    for key in EXPLANATION_KEYS {
        if let Some(Value::Array(items)) = map.get(key) {
            print_explanation(items);
        }
    }
}

fn print_envelope(result: &Map<String, Value>, envelope: &Map<String, Value>) {
    print_response(result);

    if let Some(Value::Array(warnings)) = envelope.get("warnings") {
        if !warnings.is_empty() {
            println!("\nWarnings:");
            for w in warnings.iter().filter_map(Value::as_str) {
                println!("  - {}", w);
            }
        }
    }

    if let Some(Value::String(meth)) = envelope.get("methodology") {
        println!("\nMethodology: {}", meth);
    }
}

fn print_fields(map: &Map<String, Value>) {
    let mut builder = Builder::default();
    builder.push_record(["Field", "Value"]);
    for (key, val) in map {
        if EXPLANATION_KEYS.contains(&key.as_str()) {
            continue;
        }
        builder.push_record([key.as_str(), &format_value(val)]);
    }
    println!("{}", Table::from(builder));
}

/// Entries are either `{title, description}` objects or bare sentences.
fn print_explanation(items: &[Value]) {
    if items.is_empty() {
        return;
    }
    println!();
    if items.iter().all(Value::is_object) {
        let mut builder = Builder::default();
        builder.push_record(["Title", "Description"]);
        for item in items {
            let title = item.get("title").and_then(Value::as_str).unwrap_or_default();
            let description = item
                .get("description")
                .and_then(Value::as_str)
                .unwrap_or_default();
            builder.push_record([title, description]);
        }
        println!("{}", Table::from(builder));
    } else {
        println!("Explanation:");
        for item in items {
            println!("  - {}", format_value(item));
        }
    }
}

fn print_array_table(arr: &[Value]) {
    let Some(Value::Object(first)) = arr.first() else {
        for item in arr {
            println!("{}", format_value(item));
        }
        return;
    };

    let headers: Vec<String> = first.keys().cloned().collect();
    let mut builder = Builder::default();
    builder.push_record(&headers);
    for map in arr.iter().filter_map(Value::as_object) {
        let row: Vec<String> = headers
            .iter()
            .map(|h| map.get(h.as_str()).map(format_value).unwrap_or_default())
            .collect();
        builder.push_record(row);
    }
    println!("{}", Table::from(builder));
}

fn format_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => "null".to_string(),
        Value::Array(arr) => arr.iter().map(format_value).collect::<Vec<_>>().join(", "),
        Value::Object(_) => serde_json::to_string(value).unwrap_or_default(),
    }
}
