//! Sort configuration for entry tables.
//!
//! Fixed entry attributes sort on the server. Per-form field values live in a
//! separate table with a form-specific shape, so they cannot be expressed as
//! one `ORDER BY` column; those sort client-side with a comparator chosen by
//! the field's type. Missing values always sort last, in either direction.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::entry::Entry;
use crate::field::{find_field, FieldDefinition};
use crate::pricing::extract_price;
use crate::types::DbId;
use crate::value::parse_number;

// ---------------------------------------------------------------------------
// Direction & state
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    pub fn toggled(self) -> Self {
        match self {
            Self::Asc => Self::Desc,
            Self::Desc => Self::Asc,
        }
    }

    pub fn as_sql(self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

/// Active sort column of a table and its direction.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SortState {
    pub field: Option<String>,
    pub direction: SortDirection,
}

impl SortState {
    /// Apply a click on a column header.
    ///
    /// Clicking the active field flips its direction; clicking another field
    /// activates it with `initial` as its direction.
    pub fn toggle(&mut self, field: &str, initial: SortDirection) {
        if self.field.as_deref() == Some(field) {
            self.direction = self.direction.toggled();
        } else {
            self.field = Some(field.to_string());
            self.direction = initial;
        }
    }

    pub fn is_active(&self, field: &str) -> bool {
        self.field.as_deref() == Some(field)
    }
}

// ---------------------------------------------------------------------------
// Targets
// ---------------------------------------------------------------------------

/// Entry attributes the server can order by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum EntryColumn {
    #[default]
    CreatedAt,
    UpdatedAt,
    Status,
}

impl EntryColumn {
    pub fn as_sql(self) -> &'static str {
        match self {
            Self::CreatedAt => "created_at",
            Self::UpdatedAt => "updated_at",
            Self::Status => "status",
        }
    }

    fn from_name(name: &str) -> Option<Self> {
        match name {
            "created_at" | "createdAt" => Some(Self::CreatedAt),
            "updated_at" | "updatedAt" => Some(Self::UpdatedAt),
            "status" => Some(Self::Status),
            _ => None,
        }
    }
}

/// Comparator family for client-side sorting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SortKind {
    Numeric,
    Price,
    Text,
}

/// Where and how a sort field is applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortTarget {
    Server(EntryColumn),
    Client { field_id: DbId, kind: SortKind },
}

impl SortTarget {
    /// Column sent to the server. Client-sorted fields keep the default
    /// server order and are re-ordered after fetch.
    pub fn server_column(self) -> EntryColumn {
        match self {
            Self::Server(column) => column,
            Self::Client { .. } => EntryColumn::CreatedAt,
        }
    }
}

/// Resolve a sort field identifier against a form's fields.
///
/// Unknown identifiers fall back to `created_at`.
pub fn resolve_sort(sort_field: Option<&str>, fields: &[FieldDefinition]) -> SortTarget {
    let Some(name) = sort_field.map(str::trim).filter(|s| !s.is_empty()) else {
        return SortTarget::Server(EntryColumn::CreatedAt);
    };

    if let Some(column) = EntryColumn::from_name(name) {
        return SortTarget::Server(column);
    }

    name.parse::<DbId>()
        .ok()
        .and_then(|id| find_field(fields, id))
        .map(|field| SortTarget::Client {
            field_id: field.id,
            kind: field.field_type.sort_kind(),
        })
        .unwrap_or(SortTarget::Server(EntryColumn::CreatedAt))
}

// ---------------------------------------------------------------------------
// Client comparators
// ---------------------------------------------------------------------------

#[derive(Debug, PartialEq, PartialOrd)]
enum SortKey {
    Number(f64),
    Text(String),
}

fn sort_key(value: Option<&serde_json::Value>, kind: SortKind) -> Option<SortKey> {
    let value = value.filter(|v| !v.is_null())?;
    match kind {
        SortKind::Numeric => parse_number(value).map(SortKey::Number),
        SortKind::Price => extract_price(value).map(SortKey::Number),
        SortKind::Text => {
            let text = match value {
                serde_json::Value::String(s) => s.trim().to_lowercase(),
                other => other.to_string().to_lowercase(),
            };
            (!text.is_empty()).then_some(SortKey::Text(text))
        }
    }
}

/// Compare two stored values; missing values go last regardless of direction.
pub fn compare_values(
    a: Option<&serde_json::Value>,
    b: Option<&serde_json::Value>,
    kind: SortKind,
    direction: SortDirection,
) -> Ordering {
    match (sort_key(a, kind), sort_key(b, kind)) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Greater,
        (Some(_), None) => Ordering::Less,
        (Some(ka), Some(kb)) => {
            let ord = ka.partial_cmp(&kb).unwrap_or(Ordering::Equal);
            match direction {
                SortDirection::Asc => ord,
                SortDirection::Desc => ord.reverse(),
            }
        }
    }
}

/// Stable in-place sort of entries by one dynamic field.
pub fn sort_entries(entries: &mut [Entry], field_id: DbId, kind: SortKind, direction: SortDirection) {
    entries.sort_by(|a, b| {
        compare_values(
            a.values.get(&field_id),
            b.values.get(&field_id),
            kind,
            direction,
        )
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::{FieldSettings, FieldType};
    use serde_json::json;

    fn field(id: u128, field_type: FieldType) -> FieldDefinition {
        FieldDefinition {
            id: DbId::from_u128(id),
            field_type,
            label: format!("field {id}"),
            settings: FieldSettings::default(),
        }
    }

    #[test]
    fn toggle_activates_then_flips_then_moves() {
        let mut state = SortState::default();

        state.toggle("a", SortDirection::Asc);
        assert!(state.is_active("a"));
        assert_eq!(state.direction, SortDirection::Asc);

        state.toggle("a", SortDirection::Asc);
        assert_eq!(state.direction, SortDirection::Desc);

        state.toggle("b", SortDirection::Asc);
        assert!(state.is_active("b"));
        assert!(!state.is_active("a"));
        assert_eq!(state.direction, SortDirection::Asc);
    }

    #[test]
    fn toggle_honours_descending_initial_direction() {
        let mut state = SortState::default();
        state.toggle("price", SortDirection::Desc);
        assert_eq!(state.direction, SortDirection::Desc);
    }

    #[test]
    fn resolve_maps_columns_fields_and_fallback() {
        let fields = vec![field(1, FieldType::Product), field(2, FieldType::Brand)];

        assert_eq!(resolve_sort(None, &fields), SortTarget::Server(EntryColumn::CreatedAt));
        assert_eq!(
            resolve_sort(Some("updated_at"), &fields),
            SortTarget::Server(EntryColumn::UpdatedAt)
        );
        assert_eq!(
            resolve_sort(Some(&DbId::from_u128(1).to_string()), &fields),
            SortTarget::Client { field_id: DbId::from_u128(1), kind: SortKind::Price }
        );
        assert_eq!(
            resolve_sort(Some("nonsense"), &fields),
            SortTarget::Server(EntryColumn::CreatedAt)
        );
        assert_eq!(
            resolve_sort(Some(&DbId::from_u128(9).to_string()), &fields),
            SortTarget::Server(EntryColumn::CreatedAt)
        );
    }

    #[test]
    fn client_target_keeps_default_server_order() {
        let target = SortTarget::Client { field_id: DbId::nil(), kind: SortKind::Text };
        assert_eq!(target.server_column(), EntryColumn::CreatedAt);
    }

    #[test]
    fn numeric_compare_parses_strings() {
        let a = json!("10");
        let b = json!(9);
        assert_eq!(
            compare_values(Some(&a), Some(&b), SortKind::Numeric, SortDirection::Asc),
            Ordering::Greater
        );
    }

    #[test]
    fn numeric_compare_accepts_percent_strings() {
        let low = json!("1,0%");
        let high = json!("4,5%");
        assert_eq!(
            compare_values(Some(&low), Some(&high), SortKind::Numeric, SortDirection::Asc),
            Ordering::Less
        );
        assert_eq!(
            compare_values(Some(&json!("12%")), Some(&high), SortKind::Numeric, SortDirection::Desc),
            Ordering::Less
        );
    }

    #[test]
    fn engagement_fields_sort_by_percent_value() {
        assert_eq!(FieldType::Engagement.sort_kind(), SortKind::Numeric);
        let field_id = DbId::from_u128(5);
        let entry = |id: u128, value: &str| Entry {
            id: DbId::from_u128(id),
            form_id: DbId::nil(),
            status: crate::status::EntryStatus::EmAnalise,
            created_at: chrono::Utc::now(),
            updated_at: chrono::Utc::now(),
            created_by: None,
            values: [(field_id, json!(value))].into_iter().collect(),
            notes: Vec::new(),
            publisher: None,
        };
        let mut entries = vec![entry(1, "4,5%"), entry(2, "10%"), entry(3, "0,5%")];

        sort_entries(&mut entries, field_id, SortKind::Numeric, SortDirection::Asc);

        let ids: Vec<DbId> = entries.iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![DbId::from_u128(3), DbId::from_u128(1), DbId::from_u128(2)]);
    }

    #[test]
    fn missing_values_sort_last_in_both_directions() {
        let present = json!("abc");
        for direction in [SortDirection::Asc, SortDirection::Desc] {
            assert_eq!(
                compare_values(None, Some(&present), SortKind::Text, direction),
                Ordering::Greater
            );
            assert_eq!(
                compare_values(Some(&json!(null)), Some(&present), SortKind::Text, direction),
                Ordering::Greater
            );
        }
    }

    #[test]
    fn price_compare_uses_effective_price() {
        let cheap = json!({"price": 100, "promotional_price": 50});
        let pricey = json!({"price": 80});
        assert_eq!(
            compare_values(Some(&cheap), Some(&pricey), SortKind::Price, SortDirection::Asc),
            Ordering::Less
        );
    }

    #[test]
    fn text_compare_ignores_case() {
        let a = json!("apple");
        let b = json!("Banana");
        assert_eq!(
            compare_values(Some(&a), Some(&b), SortKind::Text, SortDirection::Desc),
            Ordering::Greater
        );
    }
}
