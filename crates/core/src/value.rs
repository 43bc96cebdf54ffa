//! Stored field value normalization.
//!
//! Each entry value row has two storage slots: `value` (raw text) and
//! `value_json` (structured). [`process_entry_value`] picks the
//! authoritative one leniently and never fails. [`decode_field_value`] is the
//! strict counterpart: it decodes a processed value into a [`FieldValue`]
//! according to the field's declared type and reports shape mismatches.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::field::FieldType;
use crate::pricing::{format_currency, parse_amount, PriceValue};
use crate::types::DbId;

// ---------------------------------------------------------------------------
// Lenient processing
// ---------------------------------------------------------------------------

/// One stored value slot pair, as read from `form_entry_values`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawEntryValue {
    pub field_id: DbId,
    pub value: Option<String>,
    pub value_json: Option<serde_json::Value>,
}

/// Resolve the authoritative value of one slot pair.
///
/// - A non-null `value_json` wins and is returned as-is.
/// - Otherwise `value` is parsed as JSON. An object holding both `price` and
///   `promotional_price` is returned whole; one holding only
///   `promotional_price` collapses to that scalar.
/// - Anything else, including parse failures, is the raw string unchanged.
pub fn process_entry_value(raw: &RawEntryValue) -> serde_json::Value {
    if let Some(structured) = raw.value_json.as_ref().filter(|v| !v.is_null()) {
        return structured.clone();
    }

    let Some(text) = raw.value.as_deref() else {
        return serde_json::Value::Null;
    };

    if let Ok(serde_json::Value::Object(map)) = serde_json::from_str::<serde_json::Value>(text) {
        let has = |key: &str| map.get(key).is_some_and(|v| !v.is_null());
        match (has("price"), has("promotional_price")) {
            (true, true) => return serde_json::Value::Object(map),
            (false, true) => {
                if let Some(promotional) = map.get("promotional_price") {
                    return promotional.clone();
                }
            }
            _ => {}
        }
    }

    serde_json::Value::String(text.to_string())
}

/// Process every slot pair of one entry into a `field_id -> value` map.
///
/// When the same field appears twice the later row wins.
pub fn process_entry_values<'a>(
    raws: impl IntoIterator<Item = &'a RawEntryValue>,
) -> BTreeMap<DbId, serde_json::Value> {
    raws.into_iter()
        .map(|raw| (raw.field_id, process_entry_value(raw)))
        .collect()
}

// ---------------------------------------------------------------------------
// Typed decoding
// ---------------------------------------------------------------------------

/// A processed value decoded according to its field type.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum FieldValue {
    Empty,
    Text(String),
    Number(f64),
    Price(PriceValue),
    Flag(bool),
    Choices(Vec<String>),
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValueDecodeError {
    #[error("{field_type} field expects {expected}, found {found}")]
    ShapeMismatch {
        field_type: FieldType,
        expected: &'static str,
        found: &'static str,
    },

    #[error("{field_type} field holds a non-numeric value '{raw}'")]
    InvalidNumber { field_type: FieldType, raw: String },

    #[error("product field has no valid price")]
    MissingPrice,
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "boolean",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}

/// Decode a processed value for a field of the given type.
///
/// `null` and blank strings decode to [`FieldValue::Empty`] for every type.
pub fn decode_field_value(
    field_type: FieldType,
    value: &serde_json::Value,
) -> Result<FieldValue, ValueDecodeError> {
    if value.is_null() || value.as_str().is_some_and(|s| s.trim().is_empty()) {
        return Ok(FieldValue::Empty);
    }

    let mismatch = |expected: &'static str| ValueDecodeError::ShapeMismatch {
        field_type,
        expected,
        found: json_kind(value),
    };

    match field_type {
        FieldType::Text
        | FieldType::Textarea
        | FieldType::Email
        | FieldType::Phone
        | FieldType::Url
        | FieldType::Date
        | FieldType::Select
        | FieldType::Radio
        | FieldType::Country
        | FieldType::BrazilianStates
        | FieldType::Brand => value
            .as_str()
            .map(|s| FieldValue::Text(s.to_string()))
            .ok_or_else(|| mismatch("a string")),

        FieldType::Number
        | FieldType::Commission
        | FieldType::SubscriberCount
        | FieldType::Engagement => decode_number(field_type, value).map(FieldValue::Number),

        FieldType::Product => match value {
            serde_json::Value::Object(_)
            | serde_json::Value::Number(_)
            | serde_json::Value::String(_) => PriceValue::from_json(value)
                .map(FieldValue::Price)
                .ok_or(ValueDecodeError::MissingPrice),
            _ => Err(mismatch("a price object")),
        },

        FieldType::File => match value {
            serde_json::Value::String(s) => Ok(FieldValue::Text(s.clone())),
            serde_json::Value::Object(map) => map
                .get("name")
                .or_else(|| map.get("url"))
                .and_then(|v| v.as_str())
                .map(|s| FieldValue::Text(s.to_string()))
                .ok_or_else(|| mismatch("a file reference with a name or url")),
            _ => Err(mismatch("a file reference")),
        },

        FieldType::Toggle => decode_flag(value).ok_or_else(|| mismatch("a boolean")),

        FieldType::Checkbox => match value {
            serde_json::Value::Array(_) => {
                decode_choices(value).ok_or_else(|| mismatch("a list of strings"))
            }
            _ => decode_flag(value).ok_or_else(|| mismatch("a boolean or a list of strings")),
        },

        FieldType::Multiselect => match value {
            serde_json::Value::Array(_) => {
                decode_choices(value).ok_or_else(|| mismatch("a list of strings"))
            }
            serde_json::Value::String(s) => {
                if let Ok(parsed @ serde_json::Value::Array(_)) =
                    serde_json::from_str::<serde_json::Value>(s)
                {
                    return decode_choices(&parsed).ok_or_else(|| mismatch("a list of strings"));
                }
                Ok(FieldValue::Choices(
                    s.split(',')
                        .map(str::trim)
                        .filter(|c| !c.is_empty())
                        .map(String::from)
                        .collect(),
                ))
            }
            _ => Err(mismatch("a list of strings")),
        },
    }
}

/// Parse a loosely formatted number: a JSON number, or a string in plain or
/// Brazilian notation, optionally with a trailing `%`.
pub fn parse_number(value: &serde_json::Value) -> Option<f64> {
    match value {
        serde_json::Value::Number(n) => n.as_f64(),
        serde_json::Value::String(s) => {
            let cleaned = s.trim().trim_end_matches('%').trim_end();
            parse_amount(&serde_json::Value::String(cleaned.to_string()))
                .or_else(|| cleaned.parse::<f64>().ok().filter(|n| n.is_finite()))
        }
        _ => None,
    }
}

fn decode_number(field_type: FieldType, value: &serde_json::Value) -> Result<f64, ValueDecodeError> {
    match value {
        serde_json::Value::Number(n) => n.as_f64().ok_or_else(|| ValueDecodeError::InvalidNumber {
            field_type,
            raw: n.to_string(),
        }),
        serde_json::Value::String(s) => {
            parse_number(value).ok_or_else(|| ValueDecodeError::InvalidNumber {
                field_type,
                raw: s.clone(),
            })
        }
        other => Err(ValueDecodeError::ShapeMismatch {
            field_type,
            expected: "a number",
            found: json_kind(other),
        }),
    }
}

fn decode_flag(value: &serde_json::Value) -> Option<FieldValue> {
    match value {
        serde_json::Value::Bool(b) => Some(FieldValue::Flag(*b)),
        serde_json::Value::String(s) => match s.trim().to_lowercase().as_str() {
            "true" | "sim" | "1" | "on" => Some(FieldValue::Flag(true)),
            "false" | "nao" | "não" | "0" | "off" => Some(FieldValue::Flag(false)),
            _ => None,
        },
        _ => None,
    }
}

fn decode_choices(value: &serde_json::Value) -> Option<FieldValue> {
    value
        .as_array()?
        .iter()
        .map(|item| item.as_str().map(String::from))
        .collect::<Option<Vec<_>>>()
        .map(FieldValue::Choices)
}

impl FieldValue {
    /// Human-readable rendering used by search and CSV export.
    pub fn display_text(&self) -> String {
        match self {
            Self::Empty => String::new(),
            Self::Text(s) => s.clone(),
            Self::Number(n) => {
                if n.fract() == 0.0 && n.abs() < 1e15 {
                    format!("{}", *n as i64)
                } else {
                    n.to_string()
                }
            }
            Self::Price(price) => match price.promotional_price {
                Some(promo) => format!(
                    "{} (de {})",
                    format_currency(promo),
                    format_currency(price.price)
                ),
                None => format_currency(price.price),
            },
            Self::Flag(true) => "Sim".to_string(),
            Self::Flag(false) => "Não".to_string(),
            Self::Choices(items) => items.join("; "),
        }
    }

    /// Numeric sort key, when the value has one.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            Self::Price(price) => Some(price.effective_price()),
            _ => None,
        }
    }
}
