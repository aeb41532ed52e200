//! OCR template descriptors. Matching and extraction run server-side; these
//! types only carry the definition the backend consumes.

use std::{collections::BTreeMap, fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::common::*;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct TemplateMarker {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub required: bool,
}

impl TemplateMarker {
    pub fn new(text: impl Into<String>, required: bool) -> Self {
        Self {
            text: text.into(),
            required,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct TemplateIdentification {
    #[serde(default)]
    pub markers: Vec<TemplateMarker>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct FieldExtraction {
    #[serde(default)]
    pub regex: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alternative_regex: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct FieldValidation {
    #[serde(default)]
    pub required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_length: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_length: Option<u32>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum FieldDataType {
    #[default]
    String,
    Date,
    Currency,
    Integer,
    Float,
    Boolean,
    Address,
}

impl FieldDataType {
    pub const ALL: [FieldDataType; 7] = [
        FieldDataType::String,
        FieldDataType::Date,
        FieldDataType::Currency,
        FieldDataType::Integer,
        FieldDataType::Float,
        FieldDataType::Boolean,
        FieldDataType::Address,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            FieldDataType::String => "string",
            FieldDataType::Date => "date",
            FieldDataType::Currency => "currency",
            FieldDataType::Integer => "integer",
            FieldDataType::Float => "float",
            FieldDataType::Boolean => "boolean",
            FieldDataType::Address => "address",
        }
    }
}

impl fmt::Display for FieldDataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FieldDataType {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        FieldDataType::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| format!("unknown data type `{}`", value))
    }
}

/// One field the backend should extract from a matching document.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct TemplateField {
    #[serde(default)]
    pub field_name: String,
    #[serde(default)]
    pub display_name: String,
    #[serde(default)]
    pub data_type: FieldDataType,
    #[serde(default)]
    pub extraction: FieldExtraction,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validation: Option<FieldValidation>,
}

impl TemplateField {
    pub fn new(field_name: impl Into<String>, regex: impl Into<String>) -> Self {
        let field_name = field_name.into();
        Self {
            display_name: field_name.clone(),
            field_name,
            extraction: FieldExtraction {
                regex: regex.into(),
                alternative_regex: None,
            },
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct TemplateData {
    #[serde(default)]
    pub identification: TemplateIdentification,
    #[serde(default)]
    pub fields: Vec<TemplateField>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct Template {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template_id: Option<i64>,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vendor: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub template_data: TemplateData,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

impl Template {
    pub fn markers(&self) -> &[TemplateMarker] {
        &self.template_data.identification.markers
    }

    pub fn fields(&self) -> &[TemplateField] {
        &self.template_data.fields
    }
}

impl NamedEntity for Template {
    fn name(&self) -> &str {
        &self.name
    }
}

/// Outcome of running a template against an uploaded invoice.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct TemplateTestResult {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub match_score: f64,
    #[serde(default)]
    pub fields_matched: u32,
    #[serde(default)]
    pub fields_total: u32,
    #[serde(default)]
    pub extracted_data: BTreeMap<String, serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<String>>,
}
