//! Configuration wiring for the client: where the config lives and which
//! environment variables override it.

use std::{env, path::Path};

use tracing::debug;

pub use tracker_config::{Config, ConfigError, ConfigManager};

pub const API_URL_ENV: &str = "TRACKER_API_URL";

pub fn manager_in(base: &Path) -> Result<ConfigManager, ConfigError> {
    ConfigManager::with_base_dir(base.to_path_buf())
}

/// Loads the stored config and applies environment overrides. Overrides are
/// not written back.
pub fn load_effective(manager: &ConfigManager) -> Result<Config, ConfigError> {
    let mut config = manager.load()?;
    apply_api_override(&mut config, env::var(API_URL_ENV).ok());
    Ok(config)
}

pub fn apply_api_override(config: &mut Config, value: Option<String>) {
    let Some(url) = value.map(|raw| raw.trim().to_string()) else {
        return;
    };
    if url.is_empty() {
        return;
    }
    debug!(url = %url, "api base url overridden from environment");
    config.api_base_url = url;
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn blank_override_is_ignored() {
        let mut config = Config::default();
        apply_api_override(&mut config, Some("   ".into()));
        assert_eq!(config.api_base_url, Config::default_api_base_url());

        apply_api_override(&mut config, Some("https://api.example.com/".into()));
        assert_eq!(config.api_base(), "https://api.example.com");
    }

    #[test]
    fn manager_in_creates_backup_directory() {
        let dir = tempdir().expect("tempdir");
        let manager = manager_in(dir.path()).expect("manager");
        assert!(manager.backups_dir().exists());
        assert_eq!(manager.config_path(), dir.path().join("config").join("config.json"));
    }
}
