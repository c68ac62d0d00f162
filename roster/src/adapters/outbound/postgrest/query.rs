use serde_json::Value;

use crate::domain::ports::outbound::{RowKey, SelectQuery, TextSearch};

/// PostgREST query parameters for a select, in a fixed order.
pub(crate) fn select_params(query: &SelectQuery) -> Vec<(String, String)> {
    let mut params = vec![("select".to_string(), "*".to_string())];

    if let Some((column, value)) = &query.filter {
        params.push((column.to_string(), format!("eq.{}", literal(value))));
    }
    if let Some(search) = &query.search {
        params.push(("or".to_string(), search_clause(search)));
    }
    if let Some(column) = query.order_by {
        params.push(("order".to_string(), format!("{column}.asc")));
    }

    params
}

pub(crate) fn key_param(key: RowKey) -> (String, String) {
    (key.column.to_string(), format!("eq.{}", key.value))
}

/// `(a.ilike.*text*,b.ilike.*text*)`; text with reserved characters is quoted.
pub(crate) fn search_clause(search: &TextSearch) -> String {
    let pattern = format!("*{}*", search.text);
    let pattern = if pattern.contains([',', '(', ')', '"', '\\']) {
        format!("\"{}\"", pattern.replace('\\', "\\\\").replace('"', "\\\""))
    } else {
        pattern
    };

    let clauses: Vec<String> = search
        .columns
        .iter()
        .map(|column| format!("{column}.ilike.{pattern}"))
        .collect();
    format!("({})", clauses.join(","))
}

fn literal(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Best human-readable message from an error body.
pub(crate) fn rejection_message(status: u16, body: &str) -> String {
    let parsed: Option<Value> = serde_json::from_str(body).ok();
    let field = parsed.as_ref().and_then(|v| {
        ["message", "error", "hint"]
            .iter()
            .find_map(|key| v.get(key).and_then(Value::as_str))
            .map(str::to_string)
    });

    match field {
        Some(message) => message,
        None if !body.trim().is_empty() && parsed.is_none() => body.trim().to_string(),
        None => format!("HTTP {status}"),
    }
}
