use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{time::Clock, CoreError};

/// Well-known preference keys.
pub mod keys {
    pub const TOKEN: &str = "token";
    pub const DARK_MODE: &str = "darkMode";
    pub const WIDTH_MODE: &str = "widthMode";
}

/// Stored value plus optional expiry, in epoch milliseconds.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PreferenceEntry {
    pub value: Value,
    #[serde(default)]
    pub expiry: Option<i64>,
}

impl PreferenceEntry {
    pub fn new(value: Value, now: DateTime<Utc>, ttl: Option<Duration>) -> Self {
        Self {
            value,
            expiry: ttl.map(|ttl| (now + ttl).timestamp_millis()),
        }
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expiry
            .is_some_and(|expiry| now.timestamp_millis() > expiry)
    }
}

/// Key/value store for client-side preferences (token, theme, layout).
/// Expired entries read as absent and are removed on access.
pub trait PreferenceStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<Value>, CoreError>;
    fn set(&self, key: &str, value: Value, ttl: Option<Duration>) -> Result<(), CoreError>;
    fn remove(&self, key: &str) -> Result<(), CoreError>;
    fn clear(&self) -> Result<(), CoreError>;

    fn get_string(&self, key: &str) -> Result<Option<String>, CoreError> {
        Ok(self
            .get(key)?
            .and_then(|value| value.as_str().map(str::to_string)))
    }

    fn get_bool(&self, key: &str) -> Result<Option<bool>, CoreError> {
        Ok(self.get(key)?.and_then(|value| value.as_bool()))
    }
}

/// In-process store for tests and sessions that should not touch disk.
pub struct MemoryPreferenceStore {
    entries: Mutex<HashMap<String, PreferenceEntry>>,
    clock: Arc<dyn Clock>,
}

impl MemoryPreferenceStore {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            clock,
        }
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, PreferenceEntry>>, CoreError> {
        self.entries
            .lock()
            .map_err(|_| CoreError::Storage("preference store lock poisoned".into()))
    }
}

impl PreferenceStore for MemoryPreferenceStore {
    fn get(&self, key: &str) -> Result<Option<Value>, CoreError> {
        let now = self.clock.now();
        let mut entries = self.lock()?;
        match entries.get(key) {
            Some(entry) if entry.is_expired(now) => {
                entries.remove(key);
                Ok(None)
            }
            Some(entry) => Ok(Some(entry.value.clone())),
            None => Ok(None),
        }
    }

    fn set(&self, key: &str, value: Value, ttl: Option<Duration>) -> Result<(), CoreError> {
        let entry = PreferenceEntry::new(value, self.clock.now(), ttl);
        self.lock()?.insert(key.to_string(), entry);
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), CoreError> {
        self.lock()?.remove(key);
        Ok(())
    }

    fn clear(&self) -> Result<(), CoreError> {
        self.lock()?.clear();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::FixedClock;
    use chrono::TimeZone;
    use serde_json::json;

    #[test]
    fn entries_expire_after_ttl() {
        let clock = Arc::new(FixedClock::new(
            Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap(),
        ));
        let store = MemoryPreferenceStore::new(clock.clone());
        store
            .set(keys::TOKEN, json!("abc"), Some(Duration::hours(1)))
            .unwrap();
        store.set(keys::DARK_MODE, json!(true), None).unwrap();

        assert_eq!(store.get_string(keys::TOKEN).unwrap().as_deref(), Some("abc"));

        clock.advance(Duration::minutes(61));
        assert_eq!(store.get(keys::TOKEN).unwrap(), None);
        assert_eq!(store.get_bool(keys::DARK_MODE).unwrap(), Some(true));
    }

    #[test]
    fn clear_drops_everything() {
        let store = MemoryPreferenceStore::new(Arc::new(crate::time::SystemClock));
        store.set("a", json!(1), None).unwrap();
        store.clear().unwrap();
        assert_eq!(store.get("a").unwrap(), None);
    }
}
