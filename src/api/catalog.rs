use serde::Deserialize;
use serde_json::json;

use super::{segment, ApiClient, ApiError};

/// Reply to category and tag mutations.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq, Default)]
pub struct CatalogAck {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub tag: Option<String>,
}

impl ApiClient {
    pub fn list_categories(&self) -> Result<Vec<String>, ApiError> {
        self.get_json("/categories/", &[])
    }

    pub fn add_category(&self, name: &str) -> Result<CatalogAck, ApiError> {
        self.post_json("/categories/", &json!({ "category": name }))
    }

    pub fn delete_category(&self, name: &str) -> Result<CatalogAck, ApiError> {
        let value = self.delete(&format!("/categories/{}", segment(name)))?;
        ack(value)
    }

    pub fn list_tags(&self) -> Result<Vec<String>, ApiError> {
        self.get_json("/tags/", &[])
    }

    pub fn add_tag(&self, tag: &str) -> Result<CatalogAck, ApiError> {
        self.post_json("/tags/", &json!({ "tag": tag }))
    }

    pub fn delete_tag(&self, tag: &str) -> Result<CatalogAck, ApiError> {
        let value = self.delete(&format!("/tags/{}", segment(tag)))?;
        ack(value)
    }
}

fn ack(value: serde_json::Value) -> Result<CatalogAck, ApiError> {
    if value.is_null() {
        return Ok(CatalogAck {
            success: true,
            ..CatalogAck::default()
        });
    }
    serde_json::from_value(value).map_err(|err| ApiError::Decode(err.to_string()))
}
