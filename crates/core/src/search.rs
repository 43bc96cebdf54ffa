//! Page-local entry search.
//!
//! Search runs after the page has been fetched and only narrows that page:
//! matches on other pages are not pulled in, and `total_items` still counts
//! the unsearched result set. Only text-typed field values are scanned,
//! case-insensitively. Values of fields without a definition are scanned
//! when they are plain strings.

use crate::entry::Entry;
use crate::field::{find_field, FieldDefinition};

/// Normalize a raw search term; blank input means "no search".
pub fn normalize_term(term: Option<&str>) -> Option<String> {
    term.map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_lowercase)
}

fn searchable_text(value: &serde_json::Value) -> Option<String> {
    match value {
        serde_json::Value::String(s) => Some(s.to_lowercase()),
        serde_json::Value::Array(items) => {
            let joined = items
                .iter()
                .filter_map(|item| item.as_str())
                .collect::<Vec<_>>()
                .join(" ");
            (!joined.is_empty()).then(|| joined.to_lowercase())
        }
        _ => None,
    }
}

/// Whether any text-typed value of `entry` contains `term` (already
/// normalized with [`normalize_term`]).
pub fn entry_matches(entry: &Entry, fields: &[FieldDefinition], term: &str) -> bool {
    entry.values.iter().any(|(field_id, value)| {
        let searchable = match find_field(fields, *field_id) {
            Some(field) => field.field_type.is_text_searchable(),
            None => value.is_string(),
        };
        searchable && searchable_text(value).is_some_and(|text| text.contains(term))
    })
}

/// Keep the entries of one page that match the search term.
pub fn filter_page(entries: Vec<Entry>, fields: &[FieldDefinition], term: Option<&str>) -> Vec<Entry> {
    match normalize_term(term) {
        None => entries,
        Some(term) => entries
            .into_iter()
            .filter(|entry| entry_matches(entry, fields, &term))
            .collect(),
    }
}
