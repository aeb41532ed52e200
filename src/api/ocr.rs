use std::{fs, path::Path};

use serde::{Deserialize, Serialize};

use super::{invoices::file_name, ApiClient, ApiError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OcrOptions {
    pub language: String,
    pub dpi: u32,
    pub preprocess: bool,
    pub page_start: Option<u32>,
    pub page_end: Option<u32>,
}

impl Default for OcrOptions {
    fn default() -> Self {
        Self {
            language: "eng".into(),
            dpi: 300,
            preprocess: false,
            page_start: None,
            page_end: None,
        }
    }
}

impl OcrOptions {
    fn fields(&self) -> Vec<(String, String)> {
        let mut fields = vec![
            ("language".to_string(), self.language.clone()),
            ("dpi".to_string(), self.dpi.to_string()),
            ("preprocess".to_string(), self.preprocess.to_string()),
        ];
        if let Some(start) = self.page_start {
            fields.push(("page_start".to_string(), start.to_string()));
        }
        if let Some(end) = self.page_end {
            fields.push(("page_end".to_string(), end.to_string()));
        }
        fields
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct OcrExtraction {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub confidence: f64,
    #[serde(default)]
    pub pages: u32,
    #[serde(default)]
    pub processing_time: f64,
    #[serde(default)]
    pub language: String,
}

impl ApiClient {
    /// Only PDFs are accepted by the extraction endpoint.
    pub fn extract_text(&self, path: &Path, options: &OcrOptions) -> Result<OcrExtraction, ApiError> {
        let name = file_name(path);
        if !name.to_ascii_lowercase().ends_with(".pdf") {
            return Err(ApiError::Status {
                status: 415,
                message: "Only PDF files are supported.".into(),
            });
        }
        let bytes = fs::read(path)?;
        self.post_multipart("/ocr/extract/", &name, bytes, options.fields())
    }
}
