//! File selection for invoice uploads.
//!
//! [`UploadArea`] turns a list of paths into a selection and hands it to a
//! callback in one go. Size limits are applied afterwards by
//! [`UploadArea::split_oversized`] so the caller can report what was skipped.

use std::{
    fs,
    path::{Path, PathBuf},
};

use thiserror::Error;
use tracing::{debug, warn};
use tracker_config::Config;
use tracker_core::format_file_size;

pub const ACCEPTED_EXTENSIONS: [&str; 4] = ["pdf", "png", "jpg", "jpeg"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedFile {
    pub path: PathBuf,
    pub name: String,
    pub size: u64,
}

impl SelectedFile {
    pub fn size_label(&self) -> String {
        format_file_size(self.size)
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum UploadError {
    #[error("`{0}` is empty")]
    Empty(String),
    #[error("`{name}` is {size}; the maximum file size is {max}")]
    TooLarge {
        name: String,
        size: String,
        max: String,
    },
    #[error("`{0}` is not a PDF or image (accepted: .pdf, .png, .jpg, .jpeg)")]
    UnsupportedType(String),
    #[error("`{0}` could not be read: {1}")]
    Unreadable(String, String),
}

/// Outcome of applying the size limit to a selection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SizeCheck {
    pub accepted: Vec<SelectedFile>,
    pub oversized: Vec<SelectedFile>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UploadArea {
    max_bytes: u64,
}

impl UploadArea {
    pub fn new(max_bytes: u64) -> Self {
        Self { max_bytes }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.max_upload_bytes)
    }

    pub fn max_bytes(&self) -> u64 {
        self.max_bytes
    }

    /// "Maximum file size: 10 MB"
    pub fn limit_hint(&self) -> String {
        format!("Maximum file size: {}", format_file_size(self.max_bytes))
    }

    pub fn is_accepted(path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ACCEPTED_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
            .unwrap_or(false)
    }

    pub fn inspect(path: &Path) -> Result<SelectedFile, UploadError> {
        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        if !Self::is_accepted(path) {
            return Err(UploadError::UnsupportedType(name));
        }
        let metadata =
            fs::metadata(path).map_err(|err| UploadError::Unreadable(name.clone(), err.to_string()))?;
        if !metadata.is_file() {
            return Err(UploadError::Unreadable(name, "not a regular file".into()));
        }
        Ok(SelectedFile {
            path: path.to_path_buf(),
            name,
            size: metadata.len(),
        })
    }

    /// Collects the usable files among `paths` and calls `on_files_selected`
    /// exactly once with all of them. An empty selection never calls it.
    /// Returns the paths that were rejected.
    pub fn select_files<F>(&self, paths: &[PathBuf], on_files_selected: F) -> Vec<UploadError>
    where
        F: FnOnce(Vec<SelectedFile>),
    {
        let mut selected = Vec::new();
        let mut rejected = Vec::new();
        for path in paths {
            match Self::inspect(path) {
                Ok(file) => selected.push(file),
                Err(err) => {
                    warn!(path = %path.display(), error = %err, "file skipped");
                    rejected.push(err);
                }
            }
        }
        if !selected.is_empty() {
            debug!(count = selected.len(), "files selected");
            on_files_selected(selected);
        }
        rejected
    }

    /// Full check of one file: type, non-empty and within the limit.
    pub fn validate(&self, file: &SelectedFile) -> Result<(), UploadError> {
        if !Self::is_accepted(&file.path) {
            return Err(UploadError::UnsupportedType(file.name.clone()));
        }
        if file.size == 0 {
            return Err(UploadError::Empty(file.name.clone()));
        }
        if file.size > self.max_bytes {
            return Err(UploadError::TooLarge {
                name: file.name.clone(),
                size: format_file_size(file.size),
                max: format_file_size(self.max_bytes),
            });
        }
        Ok(())
    }

    pub fn split_oversized(&self, files: Vec<SelectedFile>) -> SizeCheck {
        let (accepted, oversized) = files
            .into_iter()
            .partition(|file| file.size <= self.max_bytes);
        SizeCheck {
            accepted,
            oversized,
        }
    }

    /// Warning for skipped files, `None` when nothing was skipped.
    pub fn oversized_message(&self, check: &SizeCheck) -> Option<String> {
        if check.oversized.is_empty() {
            return None;
        }
        Some(format!(
            "{} file(s) exceed the maximum size limit of {} and were skipped.",
            check.oversized.len(),
            format_file_size(self.max_bytes)
        ))
    }
}

impl Default for UploadArea {
    fn default() -> Self {
        Self::new(Config::default_max_upload_bytes())
    }
}
