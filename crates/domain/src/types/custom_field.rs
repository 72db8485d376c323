//! Organization-defined custom fields

use serde::{Deserialize, Serialize};

use crate::impl_wire_enum_conversions;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CustomFieldType {
    Number,
    String,
    Date,
    SingleOption,
    MultiOption,
    #[serde(other)]
    Unknown,
}

impl_wire_enum_conversions!(CustomFieldType {
    Number => "number",
    String => "string",
    Date => "date",
    SingleOption => "single-option",
    MultiOption => "multi-option",
    Unknown => "unknown",
});

impl CustomFieldType {
    pub fn has_options(self) -> bool {
        matches!(self, Self::SingleOption | Self::MultiOption)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomFieldOption {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomField {
    pub id: i64,
    pub name: String,
    /// Identifier used as the form field name on upload
    #[serde(alias = "api_id")]
    pub code: String,
    #[serde(rename = "type", alias = "field_type")]
    pub field_type: CustomFieldType,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub options: Vec<CustomFieldOption>,
}

impl CustomField {
    /// Check a raw value against the field type and option list
    pub fn accepts(&self, value: &str) -> bool {
        match self.field_type {
            CustomFieldType::Number => value.trim().parse::<f64>().is_ok(),
            CustomFieldType::Date => chrono::NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").is_ok(),
            CustomFieldType::SingleOption => self.options.iter().any(|option| option.name == value),
            CustomFieldType::MultiOption => value
                .split(',')
                .map(str::trim)
                .all(|part| self.options.iter().any(|option| option.name == part)),
            CustomFieldType::String | CustomFieldType::Unknown => true,
        }
    }
}
