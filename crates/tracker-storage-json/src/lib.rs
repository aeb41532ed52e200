//! tracker-storage-json
//!
//! File-backed [`PreferenceStore`]: one JSON object mapping each key to
//! `{ "value": ..., "expiry": <epoch ms | null> }`.

use std::{
    collections::BTreeMap,
    fs::{self, File},
    io::Write,
    path::{Path, PathBuf},
    sync::{Arc, Mutex},
};

use chrono::Duration;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};
use tracker_core::{Clock, CoreError, PreferenceEntry, PreferenceStore};

pub const PREFERENCES_FILE: &str = "preferences.json";
const TMP_SUFFIX: &str = "tmp";

/// Entries written by older clients may be bare values without the wrapper.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
enum StoredEntry {
    Wrapped(PreferenceEntry),
    Bare(Value),
}

impl StoredEntry {
    fn into_entry(self) -> PreferenceEntry {
        match self {
            StoredEntry::Wrapped(entry) => entry,
            StoredEntry::Bare(value) => PreferenceEntry {
                value,
                expiry: None,
            },
        }
    }
}

type Entries = BTreeMap<String, PreferenceEntry>;

/// Persists preferences under the app data directory. Every call reads the
/// file and mutations rewrite it atomically.
pub struct JsonPreferenceStore {
    path: PathBuf,
    clock: Arc<dyn Clock>,
    guard: Mutex<()>,
}

impl JsonPreferenceStore {
    pub fn new(path: PathBuf, clock: Arc<dyn Clock>) -> Result<Self, CoreError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        Ok(Self {
            path,
            clock,
            guard: Mutex::new(()),
        })
    }

    /// `<dir>/preferences.json`
    pub fn in_dir(dir: &Path, clock: Arc<dyn Clock>) -> Result<Self, CoreError> {
        Self::new(dir.join(PREFERENCES_FILE), clock)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read(&self) -> Entries {
        let data = match fs::read_to_string(&self.path) {
            Ok(data) => data,
            Err(_) => return Entries::new(),
        };
        match serde_json::from_str::<BTreeMap<String, StoredEntry>>(&data) {
            Ok(raw) => raw
                .into_iter()
                .map(|(key, stored)| (key, stored.into_entry()))
                .collect(),
            Err(err) => {
                warn!(path = %self.path.display(), error = %err, "ignoring unreadable preferences file");
                Entries::new()
            }
        }
    }

    fn write(&self, entries: &Entries) -> Result<(), CoreError> {
        let json = serde_json::to_string_pretty(entries)?;
        let tmp = self.path.with_extension(format!("json.{}", TMP_SUFFIX));
        let mut file = File::create(&tmp)?;
        file.write_all(json.as_bytes())?;
        file.flush()?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }

    fn with_entries<T>(
        &self,
        mutate: impl FnOnce(&mut Entries) -> (T, bool),
    ) -> Result<T, CoreError> {
        let _lock = self
            .guard
            .lock()
            .map_err(|_| CoreError::Storage("preferences lock poisoned".into()))?;
        let mut entries = self.read();
        let (result, dirty) = mutate(&mut entries);
        if dirty {
            self.write(&entries)?;
        }
        Ok(result)
    }
}

impl PreferenceStore for JsonPreferenceStore {
    fn get(&self, key: &str) -> Result<Option<Value>, CoreError> {
        let now = self.clock.now();
        self.with_entries(|entries| match entries.get(key) {
            Some(entry) if entry.is_expired(now) => {
                debug!(key, "preference expired");
                entries.remove(key);
                (None, true)
            }
            Some(entry) => (Some(entry.value.clone()), false),
            None => (None, false),
        })
    }

    fn set(&self, key: &str, value: Value, ttl: Option<Duration>) -> Result<(), CoreError> {
        let entry = PreferenceEntry::new(value, self.clock.now(), ttl);
        self.with_entries(|entries| {
            entries.insert(key.to_string(), entry);
            ((), true)
        })
    }

    fn remove(&self, key: &str) -> Result<(), CoreError> {
        self.with_entries(|entries| {
            let removed = entries.remove(key).is_some();
            ((), removed)
        })
    }

    fn clear(&self) -> Result<(), CoreError> {
        self.with_entries(|entries| {
            let dirty = !entries.is_empty();
            entries.clear();
            ((), dirty)
        })
    }
}
