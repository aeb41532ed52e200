use std::{fs, path::Path};

use serde::Deserialize;
use serde_json::json;
use tracing::info;
use tracker_domain::{Invoice, InvoiceDraft, InvoiceMutation, InvoiceStatus};

use super::{segment, ApiClient, ApiError};

/// Server-side filters for `GET /invoices/`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InvoiceFilter {
    pub skip: Option<u32>,
    pub limit: Option<u32>,
    pub status: Option<InvoiceStatus>,
    pub category: Option<String>,
    pub search: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub tag: Option<String>,
    pub min_amount: Option<f64>,
    pub max_amount: Option<f64>,
}

impl InvoiceFilter {
    pub fn page(skip: u32, limit: u32) -> Self {
        Self {
            skip: Some(skip),
            limit: Some(limit),
            ..Self::default()
        }
    }

    fn query(&self) -> Vec<(&'static str, Option<String>)> {
        vec![
            ("skip", self.skip.map(|v| v.to_string())),
            ("limit", self.limit.map(|v| v.to_string())),
            ("status", self.status.map(|s| s.label().to_string())),
            ("category", self.category.clone()),
            ("search", self.search.clone()),
            ("start_date", self.start_date.clone()),
            ("end_date", self.end_date.clone()),
            ("tag", self.tag.clone()),
            ("min_amount", self.min_amount.map(|v| v.to_string())),
            ("max_amount", self.max_amount.map(|v| v.to_string())),
        ]
    }
}

/// The list endpoint answers with a bare array or a paged envelope.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum InvoicePage {
    List(Vec<Invoice>),
    Paged {
        #[serde(default)]
        invoices: Vec<Invoice>,
    },
}

impl InvoicePage {
    pub fn into_invoices(self) -> Vec<Invoice> {
        match self {
            InvoicePage::List(invoices) => invoices,
            InvoicePage::Paged { invoices } => invoices,
        }
    }
}

/// Extra form fields sent with an uploaded invoice file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UploadOptions {
    pub category: Option<String>,
    pub tags: Vec<String>,
}

impl ApiClient {
    pub fn list_invoices(&self, filter: &InvoiceFilter) -> Result<Vec<Invoice>, ApiError> {
        let query = filter.query();
        let page: InvoicePage = self.get_json("/invoices/", &query)?;
        Ok(page.into_invoices())
    }

    pub fn get_invoice(&self, id: i64) -> Result<Invoice, ApiError> {
        self.get_json(&format!("/invoice/{}", id), &[])
    }

    pub fn create_invoice(&self, draft: &InvoiceDraft) -> Result<InvoiceMutation, ApiError> {
        let ack: InvoiceMutation = self.post_json("/add-entry/", draft)?;
        info!(invoice_id = ?ack.invoice_id, "invoice entry created");
        Ok(ack)
    }

    pub fn update_invoice(&self, id: i64, draft: &InvoiceDraft) -> Result<InvoiceMutation, ApiError> {
        self.put_json(&format!("/update/{}", id), draft)
    }

    pub fn delete_invoice(&self, id: i64) -> Result<InvoiceMutation, ApiError> {
        let value = self.delete(&format!("/delete/{}", id))?;
        let mut ack: InvoiceMutation = if value.is_null() {
            InvoiceMutation {
                invoice_id: Some(id),
                message: String::new(),
                success: true,
            }
        } else {
            serde_json::from_value(value).map_err(|err| ApiError::Decode(err.to_string()))?
        };
        ack.invoice_id.get_or_insert(id);
        Ok(ack)
    }

    pub fn batch_delete_invoices(&self, ids: &[i64]) -> Result<InvoiceMutation, ApiError> {
        self.post_json("/batch-delete/", &json!({ "invoice_ids": ids }))
    }

    /// Sends the file as multipart field `file`; tags are repeated `tags`
    /// fields.
    pub fn upload_invoice(
        &self,
        path: &Path,
        options: &UploadOptions,
    ) -> Result<InvoiceMutation, ApiError> {
        let bytes = fs::read(path)?;
        let file_name = file_name(path);
        let mut fields = Vec::new();
        if let Some(category) = options.category.as_ref().filter(|c| !c.is_empty()) {
            fields.push(("category".to_string(), category.clone()));
        }
        for tag in options.tags.iter().filter(|tag| !tag.is_empty()) {
            fields.push(("tags".to_string(), tag.clone()));
        }
        let ack: InvoiceMutation = self.post_multipart("/upload/", &file_name, bytes, fields)?;
        info!(file = %file_name, invoice_id = ?ack.invoice_id, "invoice uploaded");
        Ok(ack)
    }

    pub fn invoices_in_category(&self, category: &str) -> Result<Vec<Invoice>, ApiError> {
        self.get_json(&format!("/categories/{}/invoices", segment(category)), &[])
    }

    pub fn invoices_with_tag(&self, tag: &str) -> Result<Vec<Invoice>, ApiError> {
        self.get_json(&format!("/tags/{}/invoices", segment(tag)), &[])
    }
}

pub(crate) fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "upload".to_string())
}
