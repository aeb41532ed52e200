use std::{
    fs,
    path::{Path, PathBuf},
};

use chrono::{DateTime, NaiveDateTime, Utc};
use tracing::{debug, warn};

use crate::{Config, ConfigError};

const CONFIG_FILE: &str = "config.json";
const BACKUP_PREFIX: &str = "settings_";
const BACKUP_SUFFIX: &str = ".json";
const STAMP_FORMAT: &str = "%Y%m%d_%H%M%S";
const STAMP_LEN: usize = 15;

/// Backups beyond this count are pruned oldest first.
pub const MAX_BACKUPS: usize = 20;

/// A settings snapshot on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackupEntry {
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub note: Option<String>,
}

impl BackupEntry {
    fn from_file_name(name: &str) -> Option<Self> {
        let body = name.strip_prefix(BACKUP_PREFIX)?.strip_suffix(BACKUP_SUFFIX)?;
        let stamp = body.get(..STAMP_LEN)?;
        let created_at = NaiveDateTime::parse_from_str(stamp, STAMP_FORMAT)
            .ok()?
            .and_utc();
        let note = body
            .get(STAMP_LEN..)
            .and_then(|rest| rest.strip_prefix('_'))
            .map(str::to_string);
        Some(Self {
            name: name.to_string(),
            created_at,
            note,
        })
    }
}

/// Reads and writes the tracker settings file and its snapshots.
#[derive(Debug, Clone)]
pub struct ConfigManager {
    config_path: PathBuf,
    backups_dir: PathBuf,
}

impl ConfigManager {
    pub fn new(config_path: PathBuf, backups_dir: PathBuf) -> Self {
        Self {
            config_path,
            backups_dir,
        }
    }

    /// `<base>/config/config.json` with snapshots in `<base>/config/backups`.
    pub fn with_base_dir(base: PathBuf) -> Result<Self, ConfigError> {
        let config_dir = base.join("config");
        let manager = Self::new(config_dir.join(CONFIG_FILE), config_dir.join("backups"));
        fs::create_dir_all(&manager.backups_dir)?;
        Ok(manager)
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    pub fn backups_dir(&self) -> &Path {
        &self.backups_dir
    }

    /// Missing file means defaults; missing fields take their defaults too.
    pub fn load(&self) -> Result<Config, ConfigError> {
        if !self.config_path.exists() {
            return Ok(Config::default());
        }
        read_config(&self.config_path).map_err(|err| {
            warn!(path = %self.config_path.display(), error = %err, "settings file unreadable");
            err
        })
    }

    pub fn save(&self, config: &Config) -> Result<(), ConfigError> {
        write_config(&self.config_path, config)?;
        debug!(path = %self.config_path.display(), "settings saved");
        Ok(())
    }

    pub fn backup(&self, config: &Config, note: Option<&str>) -> Result<String, ConfigError> {
        self.backup_at(config, note, Utc::now())
    }

    /// Writes `settings_<YYYYmmdd>_<HHMMSS>[_note].json`, prunes past
    /// [`MAX_BACKUPS`] and returns the new name.
    pub fn backup_at(
        &self,
        config: &Config,
        note: Option<&str>,
        at: DateTime<Utc>,
    ) -> Result<String, ConfigError> {
        let mut name = format!("{BACKUP_PREFIX}{}", at.format(STAMP_FORMAT));
        if let Some(slug) = note.and_then(slug) {
            name = format!("{name}_{slug}");
        }
        name.push_str(BACKUP_SUFFIX);
        write_config(&self.backups_dir.join(&name), config)?;
        self.prune()?;
        Ok(name)
    }

    /// Loads a snapshot and makes it the active settings.
    pub fn restore(&self, backup_name: &str) -> Result<Config, ConfigError> {
        let path = self.backups_dir.join(backup_name);
        if BackupEntry::from_file_name(backup_name).is_none() || !path.is_file() {
            return Err(ConfigError::BackupNotFound(backup_name.to_string()));
        }
        let config = read_config(&path)?;
        self.save(&config)?;
        Ok(config)
    }

    /// Snapshots, newest first. Files that do not follow the naming scheme are ignored.
    pub fn list_backups(&self) -> Result<Vec<BackupEntry>, ConfigError> {
        if !self.backups_dir.exists() {
            return Ok(Vec::new());
        }
        let mut entries = Vec::new();
        for entry in fs::read_dir(&self.backups_dir)? {
            let file_name = entry?.file_name();
            if let Some(backup) = file_name.to_str().and_then(BackupEntry::from_file_name) {
                entries.push(backup);
            }
        }
        entries.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.name.cmp(&a.name)));
        Ok(entries)
    }

    fn prune(&self) -> Result<(), ConfigError> {
        for stale in self.list_backups()?.into_iter().skip(MAX_BACKUPS) {
            debug!(backup = %stale.name, "pruning settings backup");
            fs::remove_file(self.backups_dir.join(&stale.name))?;
        }
        Ok(())
    }
}

/// Lower-case ascii words joined by single dashes.
fn slug(note: &str) -> Option<String> {
    let words: Vec<String> = note
        .split(|ch: char| !ch.is_ascii_alphanumeric())
        .filter(|word| !word.is_empty())
        .map(str::to_ascii_lowercase)
        .collect();
    (!words.is_empty()).then(|| words.join("-"))
}

fn read_config(path: &Path) -> Result<Config, ConfigError> {
    let data = fs::read_to_string(path)?;
    serde_json::from_str(&data).map_err(|err| ConfigError::Serde(err.to_string()))
}

fn write_config(path: &Path, config: &Config) -> Result<(), ConfigError> {
    let json =
        serde_json::to_string_pretty(config).map_err(|err| ConfigError::Serde(err.to_string()))?;
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, json)?;
    fs::rename(&tmp, path)?;
    Ok(())
}
