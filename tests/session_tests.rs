mod common;

use std::sync::{Arc, Mutex};

use chrono::Duration;
use common::{client_with, fixed_clock, memory_store, ok};
use invoice_tracker::api::{ApiError, ApiResponse, Method};
use invoice_tracker::session::auth::{INVALID_CREDENTIALS, SESSION_EXPIRED};
use invoice_tracker::session::{
    AuthSession, FixedColorScheme, NotificationCenter, NotificationPosition, ThemeState,
    ToastVariant, WidthMode, LOGIN_ROUTE,
};
use tracker_core::{keys, PreferenceStore};

const USER: &str = r#"{"id": 4, "username": "dana", "email": "dana@example.com"}"#;

#[test]
fn login_stores_token_and_unauthorized_clears_it() {
    let clock = fixed_clock(2024, 6, 15);
    let store = memory_store(clock);
    let (client, transport) = client_with(vec![
        ok(r#"{"access_token": "t-1", "token_type": "bearer"}"#),
        ok(USER),
    ]);
    let mut auth = AuthSession::new(client, store.clone());

    let user = auth.login("dana@example.com", "secret-pass").unwrap();
    assert_eq!(user.username, "dana");
    assert!(auth.is_authenticated());
    assert_eq!(store.get_string(keys::TOKEN).unwrap().as_deref(), Some("t-1"));

    let requests = transport.requests();
    assert_eq!(requests[0].method, Method::Post);
    assert_eq!(requests[0].url, "http://api.test/auth/login");
    assert_eq!(requests[0].bearer, None);
    assert_eq!(requests[1].bearer.as_deref(), Some("t-1"));

    let result: Result<(), ApiError> = auth.check(Err(ApiError::Unauthorized));
    assert!(result.is_err());
    assert!(!auth.is_authenticated());
    assert_eq!(auth.error(), Some(SESSION_EXPIRED));
    assert_eq!(store.get(keys::TOKEN).unwrap(), None);
    assert!(!auth.client().has_token());
}

#[test]
fn login_falls_back_to_email_when_profile_is_unavailable() {
    let store = memory_store(fixed_clock(2024, 6, 15));
    let (client, _) = client_with(vec![
        ok(r#"{"access_token": "t-2"}"#),
        ApiResponse::new(500, ""),
    ]);
    let mut auth = AuthSession::new(client, store);
    let user = auth.login("sam@example.com", "secret-pass").unwrap();
    assert_eq!(user.email, "sam@example.com");
    assert!(auth.is_authenticated());
}

#[test]
fn rejected_credentials_leave_session_signed_out() {
    let store = memory_store(fixed_clock(2024, 6, 15));
    let (client, _) = client_with(vec![ApiResponse::new(401, r#"{"detail": "bad"}"#)]);
    let mut auth = AuthSession::new(client, store.clone());

    let err = auth.login("dana@example.com", "wrong-pass").unwrap_err();
    assert!(err.to_string().contains(INVALID_CREDENTIALS));
    assert!(!auth.is_authenticated());
    assert_eq!(auth.error(), Some(INVALID_CREDENTIALS));
    assert_eq!(store.get(keys::TOKEN).unwrap(), None);

    auth.clear_error();
    assert_eq!(auth.error(), None);
}

#[test]
fn restore_uses_stored_token() {
    let store = memory_store(fixed_clock(2024, 6, 15));
    store
        .set(keys::TOKEN, serde_json::json!("saved"), None)
        .unwrap();
    let (client, transport) = client_with(vec![ok(USER)]);
    let mut auth = AuthSession::new(client, store);

    assert!(auth.restore());
    assert_eq!(auth.user().map(|u| u.email.as_str()), Some("dana@example.com"));
    let request = transport.last_request();
    assert_eq!(request.url, "http://api.test/auth/me");
    assert_eq!(request.bearer.as_deref(), Some("saved"));
}

#[test]
fn restore_without_token_never_calls_backend() {
    let store = memory_store(fixed_clock(2024, 6, 15));
    let (client, transport) = client_with(Vec::new());
    let mut auth = AuthSession::new(client, store);
    assert!(!auth.restore());
    assert!(transport.requests().is_empty());
    assert_eq!(auth.error(), None);
}

#[test]
fn expired_token_is_not_restored() {
    let clock = fixed_clock(2024, 6, 15);
    let store = memory_store(clock.clone());
    let (client, _) = client_with(vec![ok(r#"{"access_token": "short"}"#), ok(USER)]);
    let mut auth = AuthSession::new(client, store.clone()).with_token_ttl(Duration::hours(1));
    auth.login("dana@example.com", "secret-pass").unwrap();

    clock.advance(Duration::hours(2));
    let (client, transport) = client_with(Vec::new());
    let mut later = AuthSession::new(client, store);
    assert!(!later.restore());
    assert!(transport.requests().is_empty());
}

#[test]
fn handle_unauthorized_points_to_login() {
    let store = memory_store(fixed_clock(2024, 6, 15));
    let (client, _) = client_with(Vec::new());
    let mut auth = AuthSession::new(client, store);
    assert_eq!(auth.handle_unauthorized(), LOGIN_ROUTE);
    assert_eq!(auth.error(), Some(SESSION_EXPIRED));
}

#[test]
fn stored_theme_wins_over_probe_and_survives_reload() {
    let store = memory_store(fixed_clock(2024, 6, 15));
    let mut theme = ThemeState::new(store.clone(), &FixedColorScheme(true));
    assert!(theme.dark_mode());

    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = seen.clone();
    let subscription = theme.subscribe(move |dark| sink.lock().unwrap().push(dark));
    assert_eq!(theme.listener_count(), 1);
    assert!(!theme.toggle().unwrap());
    assert!(theme.root_classes().is_empty());
    assert!(!theme.system_preference_changed(true).unwrap());
    drop(subscription);
    assert_eq!(theme.listener_count(), 0);
    theme.set_dark_mode(true).unwrap();
    assert_eq!(*seen.lock().unwrap(), vec![false]);

    let reloaded = ThemeState::new(store, &FixedColorScheme(false));
    assert!(reloaded.dark_mode());
    assert_eq!(reloaded.root_classes(), &["dark", "bootstrap-dark"]);
}

#[test]
fn width_mode_cycles_and_persists() {
    let store = memory_store(fixed_clock(2024, 6, 15));
    let mut theme = ThemeState::new(store.clone(), &FixedColorScheme(false));
    assert_eq!(theme.width_mode(), WidthMode::Compact);
    assert_eq!(theme.cycle_width_mode().unwrap(), WidthMode::Full);
    assert_eq!(theme.cycle_width_mode().unwrap(), WidthMode::Standard);

    let reloaded = ThemeState::new(store, &FixedColorScheme(false));
    assert_eq!(reloaded.width_mode(), WidthMode::Standard);
}

#[test]
fn notifications_expire_on_the_clock() {
    let clock = fixed_clock(2024, 6, 15);
    let mut center = NotificationCenter::new(clock.clone());
    let short = center.show_success("Saved");
    let sticky = center.add(
        "Read me",
        ToastVariant::Warning,
        Some(1000),
        Some(NotificationPosition::BottomCenter),
        Some(false),
    );
    let long = center.show_toast("Uploading", ToastVariant::Info, Some(20_000));
    assert_eq!(center.len(), 3);

    clock.advance(Duration::milliseconds(4_999));
    assert_eq!(center.active().len(), 3);

    clock.advance(Duration::milliseconds(1));
    let ids: Vec<_> = center.active().iter().map(|n| n.id).collect();
    assert_eq!(ids, vec![sticky, long]);
    assert!(!ids.contains(&short));

    assert!(center.remove(sticky));
    assert!(!center.remove(sticky));

    center.show_warning("Low disk");
    center.show_info("Synced");
    let variants: Vec<_> = center.active().iter().map(|n| n.variant).collect();
    assert_eq!(variants, vec![ToastVariant::Info, ToastVariant::Warning, ToastVariant::Info]);
    center.clear_all();
    assert!(center.is_empty());
}

#[test]
fn huge_durations_never_expire() {
    let clock = fixed_clock(2024, 6, 15);
    let mut center = NotificationCenter::new(clock.clone());
    let forever = center.show_toast("long", ToastVariant::Info, Some(u64::MAX));
    let far = center.show_toast("far", ToastVariant::Info, Some(i64::MAX as u64));

    clock.advance(Duration::days(365 * 100));
    let ids: Vec<_> = center.active().iter().map(|n| n.id).collect();
    assert_eq!(ids, vec![forever, far]);
    assert_eq!(center.active()[0].expires_at(), None);
}
