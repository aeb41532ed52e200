use std::collections::HashSet;

use regex::Regex;
use tracker_domain::{
    FieldDataType, FieldExtraction, FieldValidation, Template, TemplateData, TemplateField,
    TemplateIdentification, TemplateMarker,
};

const DEFAULT_VERSION: &str = "1.0";
const UNNAMED: &str = "Unnamed Template";

/// Client-side shaping and validation of OCR template definitions.
pub struct TemplateService;

impl TemplateService {
    /// Blank form state: version `1.0` and one required, empty marker.
    pub fn empty_template() -> Template {
        Template {
            version: Some(DEFAULT_VERSION.into()),
            template_data: TemplateData {
                identification: TemplateIdentification {
                    markers: vec![TemplateMarker::new("", true)],
                },
                fields: Vec::new(),
            },
            ..Template::default()
        }
    }

    pub fn empty_field() -> TemplateField {
        TemplateField {
            field_name: String::new(),
            display_name: String::new(),
            data_type: FieldDataType::String,
            extraction: FieldExtraction::default(),
            validation: Some(FieldValidation {
                required: false,
                ..FieldValidation::default()
            }),
        }
    }

    /// Fills the gaps an older or partial template may have before editing.
    pub fn normalize(template: &Template) -> Template {
        let mut normalized = template.clone();
        if normalized
            .version
            .as_deref()
            .map_or(true, |value| value.trim().is_empty())
        {
            normalized.version = Some(DEFAULT_VERSION.into());
        }
        if normalized.template_data.identification.markers.is_empty() {
            normalized
                .template_data
                .identification
                .markers
                .push(TemplateMarker::new("", true));
        }
        normalized
    }

    /// Returns every problem found, in a stable order. Empty means valid.
    pub fn validate(template: &Template) -> Vec<String> {
        let mut errors = Vec::new();

        if template.name.trim().is_empty() {
            errors.push("Template name is required".to_string());
        }

        let markers = template.markers();
        if markers.is_empty() {
            errors.push("At least one identification marker is required".to_string());
        } else if markers
            .iter()
            .any(|marker| marker.required && marker.text.trim().is_empty())
        {
            errors.push("All required markers must have text".to_string());
        }

        let fields = template.fields();
        if fields.is_empty() {
            errors.push("At least one field is required".to_string());
            return errors;
        }

        if fields.iter().any(|field| field.field_name.trim().is_empty()) {
            errors.push("All fields must have a field name".to_string());
        }

        let named: Vec<&str> = fields
            .iter()
            .map(|field| field.field_name.as_str())
            .filter(|name| !name.is_empty())
            .collect();
        let unique: HashSet<&str> = named.iter().copied().collect();
        if unique.len() != named.len() {
            errors.push("Field names must be unique".to_string());
        }

        if fields
            .iter()
            .any(|field| field.extraction.regex.trim().is_empty())
        {
            errors.push("All fields must have an extraction regex pattern".to_string());
        }

        for field in fields {
            let patterns = std::iter::once(field.extraction.regex.as_str())
                .chain(field.extraction.alternative_regex.as_deref())
                .filter(|pattern| !pattern.trim().is_empty());
            for pattern in patterns {
                if let Err(err) = Regex::new(pattern) {
                    errors.push(format!(
                        "Field `{}` has an invalid extraction regex: {}",
                        field.field_name, err
                    ));
                }
            }
        }

        errors
    }

    /// `Amazon (Amazon.com) v1.0`
    pub fn display_name(template: &Template) -> String {
        let mut label = if template.name.is_empty() {
            UNNAMED.to_string()
        } else {
            template.name.clone()
        };
        if let Some(vendor) = template.vendor.as_deref().filter(|v| !v.is_empty()) {
            label.push_str(&format!(" ({})", vendor));
        }
        if let Some(version) = template.version.as_deref().filter(|v| !v.is_empty()) {
            label.push_str(&format!(" v{}", version));
        }
        label
    }
}
