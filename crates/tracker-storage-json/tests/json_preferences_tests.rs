use std::{fs, sync::Arc};

use chrono::{Duration, TimeZone, Utc};
use serde_json::json;
use tempfile::tempdir;
use tracker_core::{keys, Clock, FixedClock, PreferenceStore};
use tracker_storage_json::JsonPreferenceStore;

fn clock() -> Arc<FixedClock> {
    Arc::new(FixedClock::new(
        Utc.with_ymd_and_hms(2024, 3, 1, 8, 0, 0).unwrap(),
    ))
}

#[test]
fn values_survive_a_new_store_instance() {
    let dir = tempdir().expect("tempdir");
    let clock = clock();
    let store = JsonPreferenceStore::in_dir(dir.path(), clock.clone()).expect("store");
    store
        .set(keys::DARK_MODE, json!(true), None)
        .expect("set dark mode");
    store
        .set(keys::WIDTH_MODE, json!("wide"), None)
        .expect("set width");

    let reopened = JsonPreferenceStore::in_dir(dir.path(), clock).expect("reopen");
    assert_eq!(reopened.get_bool(keys::DARK_MODE).expect("get"), Some(true));
    assert_eq!(
        reopened.get_string(keys::WIDTH_MODE).expect("get").as_deref(),
        Some("wide")
    );
}

#[test]
fn file_uses_value_and_expiry_wrapper() {
    let dir = tempdir().expect("tempdir");
    let clock = clock();
    let store = JsonPreferenceStore::in_dir(dir.path(), clock.clone()).expect("store");
    store
        .set(keys::TOKEN, json!("abc"), Some(Duration::hours(24)))
        .expect("set token");

    let raw: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(store.path()).expect("read")).expect("json");
    assert_eq!(raw["token"]["value"], json!("abc"));
    let expected = (clock.now() + Duration::hours(24)).timestamp_millis();
    assert_eq!(raw["token"]["expiry"], json!(expected));
}

#[test]
fn expired_entries_are_dropped_from_disk() {
    let dir = tempdir().expect("tempdir");
    let clock = clock();
    let store = JsonPreferenceStore::in_dir(dir.path(), clock.clone()).expect("store");
    store
        .set(keys::TOKEN, json!("abc"), Some(Duration::hours(1)))
        .expect("set token");

    clock.advance(Duration::hours(2));
    assert_eq!(store.get(keys::TOKEN).expect("get"), None);

    let raw = fs::read_to_string(store.path()).expect("read");
    assert!(!raw.contains("abc"));
}

#[test]
fn bare_and_corrupt_files_are_tolerated() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("preferences.json");
    fs::write(&path, r#"{"darkMode": false}"#).expect("write bare");
    let store = JsonPreferenceStore::new(path.clone(), clock()).expect("store");
    assert_eq!(store.get_bool(keys::DARK_MODE).expect("get"), Some(false));

    fs::write(&path, "not json").expect("write corrupt");
    assert_eq!(store.get(keys::DARK_MODE).expect("get"), None);

    store.set("fresh", json!(1), None).expect("overwrite corrupt file");
    assert_eq!(store.get("fresh").expect("get"), Some(json!(1)));
}

#[test]
fn remove_and_clear() {
    let dir = tempdir().expect("tempdir");
    let store = JsonPreferenceStore::in_dir(dir.path(), clock()).expect("store");
    store.set("a", json!(1), None).expect("set a");
    store.set("b", json!(2), None).expect("set b");

    store.remove("a").expect("remove");
    assert_eq!(store.get("a").expect("get"), None);
    assert_eq!(store.get("b").expect("get"), Some(json!(2)));

    store.clear().expect("clear");
    assert_eq!(store.get("b").expect("get"), None);
}
