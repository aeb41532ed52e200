use thiserror::Error;
use tracker_config::ConfigError;
use tracker_core::CoreError;

use crate::api::ApiError;

/// Error type surfaced by the library facade.
#[derive(Debug, Error)]
pub enum TrackerError {
    #[error(transparent)]
    Core(#[from] CoreError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    Auth(String),
}

impl TrackerError {
    /// Text suitable for a toast or shell error line.
    pub fn user_message(&self) -> String {
        match self {
            TrackerError::Api(err) => err.user_message(),
            other => other.to_string(),
        }
    }
}
