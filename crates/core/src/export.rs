//! CSV export of entries.
//!
//! Zero database dependencies: the API layer loads the entries and field
//! definitions and hands them over.

use crate::entry::Entry;
use crate::field::FieldDefinition;
use crate::value::decode_field_value;

/// Fixed leading columns of every export.
pub const BASE_COLUMNS: [&str; 5] = [
    "id",
    "status",
    "created_at",
    "publisher_name",
    "publisher_email",
];

/// Wrap a value in quotes when it contains a comma, quote, or line break.
fn csv_escape(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

/// Render one stored value for a cell. Values that do not decode for their
/// field type are written as their raw JSON text.
fn cell_text(field: &FieldDefinition, value: Option<&serde_json::Value>) -> String {
    let Some(value) = value else {
        return String::new();
    };
    match decode_field_value(field.field_type, value) {
        Ok(decoded) => decoded.display_text(),
        Err(_) => match value {
            serde_json::Value::String(s) => s.clone(),
            other => other.to_string(),
        },
    }
}

/// Build a CSV document: one header row, then one row per entry with a
/// column per field in definition order.
pub fn build_entries_csv(entries: &[Entry], fields: &[FieldDefinition]) -> String {
    let mut lines = Vec::with_capacity(entries.len() + 1);

    let header: Vec<String> = BASE_COLUMNS
        .iter()
        .map(|c| c.to_string())
        .chain(fields.iter().map(|f| csv_escape(f.display_label())))
        .collect();
    lines.push(header.join(","));

    for entry in entries {
        let publisher = entry.publisher.as_ref();
        let mut row = vec![
            entry.id.to_string(),
            entry.status.as_str().to_string(),
            entry.created_at.to_rfc3339(),
            csv_escape(publisher.and_then(|p| p.name.as_deref()).unwrap_or_default()),
            csv_escape(publisher.and_then(|p| p.email.as_deref()).unwrap_or_default()),
        ];
        for field in fields {
            row.push(csv_escape(&cell_text(field, entry.values.get(&field.id))));
        }
        lines.push(row.join(","));
    }

    lines.join("\n")
}
