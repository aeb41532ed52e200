//! tracker-config
//!
//! User-editable settings for the invoice tracker client.
//! Owns the Config data structure plus disk persistence and backups.

pub mod error;
pub mod manager;
pub mod model;

pub use error::ConfigError;
pub use manager::{BackupEntry, ConfigManager, MAX_BACKUPS};
pub use model::Config;
