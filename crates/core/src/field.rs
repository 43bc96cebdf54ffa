//! Form field definitions.
//!
//! Forms are configured elsewhere; the review pipeline only consumes
//! `{id, field_type, label, settings}`. Every place that behaves differently
//! per field type matches on [`FieldType`] exhaustively, so adding a type is
//! a compile error at each dispatch site until it is handled.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::sorting::SortKind;
use crate::types::DbId;

// ---------------------------------------------------------------------------
// FieldType
// ---------------------------------------------------------------------------

/// The input kind of a form field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldType {
    Text,
    Textarea,
    Email,
    Phone,
    Url,
    Number,
    Date,
    Select,
    Radio,
    /// Price payload (`{price, promotional_price?, old_price?, ...}`).
    Product,
    /// Commission percentage.
    Commission,
    Country,
    BrazilianStates,
    Brand,
    /// Stored file reference (URL or `{url, name}`).
    File,
    Checkbox,
    Multiselect,
    Toggle,
    SubscriberCount,
    Engagement,
}

impl FieldType {
    pub const ALL: [FieldType; 20] = [
        FieldType::Text,
        FieldType::Textarea,
        FieldType::Email,
        FieldType::Phone,
        FieldType::Url,
        FieldType::Number,
        FieldType::Date,
        FieldType::Select,
        FieldType::Radio,
        FieldType::Product,
        FieldType::Commission,
        FieldType::Country,
        FieldType::BrazilianStates,
        FieldType::Brand,
        FieldType::File,
        FieldType::Checkbox,
        FieldType::Multiselect,
        FieldType::Toggle,
        FieldType::SubscriberCount,
        FieldType::Engagement,
    ];

    /// The tag stored in `form_fields.field_type`.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Textarea => "textarea",
            Self::Email => "email",
            Self::Phone => "phone",
            Self::Url => "url",
            Self::Number => "number",
            Self::Date => "date",
            Self::Select => "select",
            Self::Radio => "radio",
            Self::Product => "product",
            Self::Commission => "commission",
            Self::Country => "country",
            Self::BrazilianStates => "brazilian_states",
            Self::Brand => "brand",
            Self::File => "file",
            Self::Checkbox => "checkbox",
            Self::Multiselect => "multiselect",
            Self::Toggle => "toggle",
            Self::SubscriberCount => "subscriber_count",
            Self::Engagement => "engagement",
        }
    }

    /// Whether page-local search scans values of this field type.
    pub fn is_text_searchable(self) -> bool {
        match self {
            Self::Text
            | Self::Textarea
            | Self::Email
            | Self::Phone
            | Self::Url
            | Self::Select
            | Self::Radio
            | Self::Country
            | Self::BrazilianStates
            | Self::Brand => true,
            Self::Number
            | Self::Date
            | Self::Product
            | Self::Commission
            | Self::File
            | Self::Checkbox
            | Self::Multiselect
            | Self::Toggle
            | Self::SubscriberCount
            | Self::Engagement => false,
        }
    }

    /// How values of this type are compared when sorting client-side.
    pub fn sort_kind(self) -> SortKind {
        match self {
            Self::Number | Self::Commission | Self::SubscriberCount | Self::Engagement => {
                SortKind::Numeric
            }
            Self::Product => SortKind::Price,
            Self::Text
            | Self::Textarea
            | Self::Email
            | Self::Phone
            | Self::Url
            | Self::Date
            | Self::Select
            | Self::Radio
            | Self::Country
            | Self::BrazilianStates
            | Self::Brand
            | Self::File
            | Self::Checkbox
            | Self::Multiselect
            | Self::Toggle => SortKind::Text,
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FieldType {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|ft| ft.as_str() == s)
            .ok_or_else(|| CoreError::Validation(format!("Unknown field type '{s}'")))
    }
}

// ---------------------------------------------------------------------------
// FieldDefinition
// ---------------------------------------------------------------------------

/// Optional per-field settings, stored as JSON next to the field.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldSettings {
    /// Default commission percentage applied when simulating prices.
    pub commission_rate: Option<f64>,
    /// Whether the field is offered as a sortable table column.
    pub sort_by: bool,
    /// Column header override.
    pub display_label: Option<String>,
}

/// One typed input slot of a form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDefinition {
    pub id: DbId,
    pub field_type: FieldType,
    pub label: String,
    #[serde(default)]
    pub settings: FieldSettings,
}

impl FieldDefinition {
    /// Header text for tables and CSV exports.
    pub fn display_label(&self) -> &str {
        self.settings
            .display_label
            .as_deref()
            .filter(|label| !label.trim().is_empty())
            .unwrap_or(&self.label)
    }
}

/// Look up a field definition by id.
pub fn find_field(fields: &[FieldDefinition], id: DbId) -> Option<&FieldDefinition> {
    fields.iter().find(|f| f.id == id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_field_type_round_trips() {
        for ft in FieldType::ALL {
            assert_eq!(ft.as_str().parse::<FieldType>().unwrap(), ft);
            let json = serde_json::to_string(&ft).unwrap();
            assert_eq!(json, format!("\"{}\"", ft.as_str()));
        }
    }

    #[test]
    fn unknown_field_type_is_rejected() {
        assert!("signature".parse::<FieldType>().is_err());
    }

    #[test]
    fn product_sorts_by_price_and_is_not_searched() {
        assert_eq!(FieldType::Product.sort_kind(), SortKind::Price);
        assert!(!FieldType::Product.is_text_searchable());
        assert_eq!(FieldType::SubscriberCount.sort_kind(), SortKind::Numeric);
        assert!(FieldType::Brand.is_text_searchable());
    }

    #[test]
    fn display_label_prefers_non_blank_override() {
        let mut field = FieldDefinition {
            id: DbId::nil(),
            field_type: FieldType::Text,
            label: "Nome".into(),
            settings: FieldSettings::default(),
        };
        assert_eq!(field.display_label(), "Nome");

        field.settings.display_label = Some("  ".into());
        assert_eq!(field.display_label(), "Nome");

        field.settings.display_label = Some("Nome do canal".into());
        assert_eq!(field.display_label(), "Nome do canal");
    }

    #[test]
    fn settings_default_when_missing() {
        let json = serde_json::json!({
            "id": DbId::nil(),
            "field_type": "commission",
            "label": "Comissão",
        });
        let field: FieldDefinition = serde_json::from_value(json).unwrap();
        assert_eq!(field.settings, FieldSettings::default());
    }
}
