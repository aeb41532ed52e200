use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::ConfigError;

/// Client settings: API location, display preferences and view defaults.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Config {
    #[serde(default = "Config::default_locale")]
    pub locale: String,
    #[serde(default = "Config::default_currency")]
    pub currency: String,
    #[serde(default = "Config::default_api_base_url")]
    pub api_base_url: String,
    #[serde(default = "Config::default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    #[serde(default = "Config::default_notification_duration_ms")]
    pub notification_duration_ms: u64,
    #[serde(default = "Config::default_group_by")]
    pub default_group_by: String,
    #[serde(default = "Config::default_top_limit")]
    pub top_limit: usize,
    #[serde(default = "Config::default_max_upload_bytes")]
    pub max_upload_bytes: u64,
    #[serde(default = "Config::default_ui_color_enabled")]
    pub ui_color_enabled: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    /// Optional directory the `upload` command resolves relative paths against.
    pub default_upload_dir: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            locale: Self::default_locale(),
            currency: Self::default_currency(),
            api_base_url: Self::default_api_base_url(),
            request_timeout_secs: Self::default_request_timeout_secs(),
            notification_duration_ms: Self::default_notification_duration_ms(),
            default_group_by: Self::default_group_by(),
            top_limit: Self::default_top_limit(),
            max_upload_bytes: Self::default_max_upload_bytes(),
            ui_color_enabled: Self::default_ui_color_enabled(),
            default_upload_dir: None,
        }
    }
}

impl Config {
    pub const KEYS: [&'static str; 10] = [
        "locale",
        "currency",
        "api_base_url",
        "request_timeout_secs",
        "notification_duration_ms",
        "default_group_by",
        "top_limit",
        "max_upload_bytes",
        "ui_color_enabled",
        "default_upload_dir",
    ];

    pub fn default_locale() -> String {
        "en-US".into()
    }

    pub fn default_currency() -> String {
        "USD".into()
    }

    pub fn default_api_base_url() -> String {
        "http://localhost:8000".into()
    }

    /// One day; longer timeouts overflow the HTTP client's deadline.
    pub const MAX_REQUEST_TIMEOUT_SECS: u64 = 86_400;

    /// Timeout actually used for requests, whatever the file holds.
    pub fn request_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(
            self.request_timeout_secs
                .clamp(1, Self::MAX_REQUEST_TIMEOUT_SECS),
        )
    }

    pub fn default_request_timeout_secs() -> u64 {
        30
    }

    pub fn default_notification_duration_ms() -> u64 {
        5000
    }

    pub fn default_group_by() -> String {
        "itemType".into()
    }

    pub fn default_top_limit() -> usize {
        3
    }

    pub fn default_max_upload_bytes() -> u64 {
        10 * 1024 * 1024
    }

    pub fn default_ui_color_enabled() -> bool {
        true
    }

    /// Base URL without a trailing slash.
    pub fn api_base(&self) -> &str {
        self.api_base_url.trim_end_matches('/')
    }

    pub fn resolve_upload_dir(&self) -> PathBuf {
        if let Some(path) = &self.default_upload_dir {
            return path.clone();
        }

        dirs::download_dir()
            .or_else(dirs::home_dir)
            .unwrap_or_else(|| PathBuf::from("."))
    }

    /// `(key, value)` pairs in display order.
    pub fn entries(&self) -> Vec<(&'static str, String)> {
        Self::KEYS
            .iter()
            .map(|key| (*key, self.get(key).unwrap_or_default()))
            .collect()
    }

    pub fn get(&self, key: &str) -> Option<String> {
        let value = match key {
            "locale" => self.locale.clone(),
            "currency" => self.currency.clone(),
            "api_base_url" => self.api_base_url.clone(),
            "request_timeout_secs" => self.request_timeout_secs.to_string(),
            "notification_duration_ms" => self.notification_duration_ms.to_string(),
            "default_group_by" => self.default_group_by.clone(),
            "top_limit" => self.top_limit.to_string(),
            "max_upload_bytes" => self.max_upload_bytes.to_string(),
            "ui_color_enabled" => self.ui_color_enabled.to_string(),
            "default_upload_dir" => self
                .default_upload_dir
                .as_ref()
                .map(|path| path.display().to_string())
                .unwrap_or_default(),
            _ => return None,
        };
        Some(value)
    }

    /// Updates one setting from its textual form.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let value = value.trim();
        match key {
            "locale" => self.locale = non_empty(key, value)?,
            "currency" => self.currency = non_empty(key, value)?.to_ascii_uppercase(),
            "api_base_url" => {
                let url = non_empty(key, value)?;
                if !(url.starts_with("http://") || url.starts_with("https://")) {
                    return Err(invalid(key, "must start with http:// or https://"));
                }
                self.api_base_url = url;
            }
            "request_timeout_secs" => {
                let secs: u64 = parse_positive(key, value)?;
                if secs > Self::MAX_REQUEST_TIMEOUT_SECS {
                    return Err(invalid(key, "must be at most 86400 seconds"));
                }
                self.request_timeout_secs = secs;
            }
            "notification_duration_ms" => {
                self.notification_duration_ms = parse_positive(key, value)?
            }
            "default_group_by" => match value {
                "itemType" | "store" | "date" | "card" | "all" => {
                    self.default_group_by = value.to_string()
                }
                _ => return Err(invalid(key, "expected itemType, store, date, card or all")),
            },
            "top_limit" => self.top_limit = parse_positive::<u64>(key, value)? as usize,
            "max_upload_bytes" => self.max_upload_bytes = parse_positive(key, value)?,
            "ui_color_enabled" => {
                self.ui_color_enabled = match value.to_ascii_lowercase().as_str() {
                    "true" | "on" | "yes" | "1" => true,
                    "false" | "off" | "no" | "0" => false,
                    _ => return Err(invalid(key, "expected true or false")),
                }
            }
            "default_upload_dir" => {
                self.default_upload_dir = if value.is_empty() {
                    None
                } else {
                    Some(PathBuf::from(value))
                }
            }
            other => return Err(ConfigError::UnknownKey(other.to_string())),
        }
        Ok(())
    }
}

fn non_empty(key: &str, value: &str) -> Result<String, ConfigError> {
    if value.is_empty() {
        Err(invalid(key, "must not be empty"))
    } else {
        Ok(value.to_string())
    }
}

fn parse_positive<T>(key: &str, value: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr + PartialOrd + Default,
{
    match value.parse::<T>() {
        Ok(parsed) if parsed > T::default() => Ok(parsed),
        _ => Err(invalid(key, "expected a positive whole number")),
    }
}

fn invalid(key: &str, reason: &str) -> ConfigError {
    ConfigError::InvalidValue {
        key: key.to_string(),
        reason: reason.to_string(),
    }
}
