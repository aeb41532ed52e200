use std::{
    env, fmt,
    str::FromStr,
    sync::{Arc, Mutex, Weak},
};

use serde_json::json;
use tracing::{debug, warn};
use tracker_core::{keys, CoreError, PreferenceStore};

pub const DARK_ROOT_CLASSES: [&str; 2] = ["dark", "bootstrap-dark"];
pub const COLOR_SCHEME_ENV: &str = "TRACKER_COLOR_SCHEME";

/// Source of the operating system's light/dark preference.
pub trait ColorSchemeProbe {
    fn prefers_dark(&self) -> bool;
}

/// Probe with a fixed answer.
#[derive(Debug, Clone, Copy, Default)]
pub struct FixedColorScheme(pub bool);

impl ColorSchemeProbe for FixedColorScheme {
    fn prefers_dark(&self) -> bool {
        self.0
    }
}

/// Reads `TRACKER_COLOR_SCHEME` (`dark`/`light`), then the terminal's
/// `COLORFGBG` background colour.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnvColorScheme;

impl ColorSchemeProbe for EnvColorScheme {
    fn prefers_dark(&self) -> bool {
        if let Ok(value) = env::var(COLOR_SCHEME_ENV) {
            return value.trim().eq_ignore_ascii_case("dark");
        }
        env::var("COLORFGBG")
            .ok()
            .and_then(|value| value.rsplit(';').next().map(str::to_string))
            .and_then(|bg| bg.trim().parse::<u8>().ok())
            .map(|bg| bg < 7 || bg == 8)
            .unwrap_or(false)
    }
}

/// Content width of the main layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum WidthMode {
    Standard,
    #[default]
    Compact,
    Full,
}

impl WidthMode {
    pub const ALL: [WidthMode; 3] = [WidthMode::Standard, WidthMode::Compact, WidthMode::Full];

    pub fn as_str(self) -> &'static str {
        match self {
            WidthMode::Standard => "standard",
            WidthMode::Compact => "compact",
            WidthMode::Full => "full",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            WidthMode::Standard => "Standard Width",
            WidthMode::Compact => "Compact Width",
            WidthMode::Full => "Full Width",
        }
    }

    /// standard -> compact -> full -> standard
    pub fn next(self) -> Self {
        match self {
            WidthMode::Standard => WidthMode::Compact,
            WidthMode::Compact => WidthMode::Full,
            WidthMode::Full => WidthMode::Standard,
        }
    }

    /// Terminal columns a table may use in this mode.
    pub fn max_columns(self) -> usize {
        match self {
            WidthMode::Standard => 120,
            WidthMode::Compact => 90,
            WidthMode::Full => usize::MAX,
        }
    }
}

impl fmt::Display for WidthMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WidthMode {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "standard" => Ok(WidthMode::Standard),
            "compact" => Ok(WidthMode::Compact),
            "full" => Ok(WidthMode::Full),
            other => Err(format!("unknown width mode `{}`", other)),
        }
    }
}

type Listener = Box<dyn Fn(bool) + Send>;

#[derive(Default)]
struct Listeners {
    next_id: u64,
    entries: Vec<(u64, Listener)>,
}

/// Removes its listener when dropped.
#[must_use = "dropping the subscription unsubscribes immediately"]
pub struct Subscription {
    id: u64,
    listeners: Weak<Mutex<Listeners>>,
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(listeners) = self.listeners.upgrade() {
            if let Ok(mut guard) = listeners.lock() {
                guard.entries.retain(|(id, _)| *id != self.id);
            }
        }
    }
}

/// Dark mode and layout width, persisted under `darkMode` / `widthMode`.
pub struct ThemeState {
    store: Arc<dyn PreferenceStore>,
    dark_mode: bool,
    width_mode: WidthMode,
    listeners: Arc<Mutex<Listeners>>,
}

impl ThemeState {
    /// A stored `darkMode` wins over the probe.
    pub fn new(store: Arc<dyn PreferenceStore>, probe: &dyn ColorSchemeProbe) -> Self {
        let stored = store.get_bool(keys::DARK_MODE).unwrap_or_else(|err| {
            warn!(error = %err, "could not read dark mode preference");
            None
        });
        let dark_mode = stored.unwrap_or_else(|| probe.prefers_dark());
        let width_mode = store
            .get_string(keys::WIDTH_MODE)
            .ok()
            .flatten()
            .and_then(|raw| raw.parse().ok())
            .unwrap_or_default();
        debug!(dark_mode, width = %width_mode, from_store = stored.is_some(), "theme loaded");
        Self {
            store,
            dark_mode,
            width_mode,
            listeners: Arc::new(Mutex::new(Listeners::default())),
        }
    }

    pub fn dark_mode(&self) -> bool {
        self.dark_mode
    }

    pub fn width_mode(&self) -> WidthMode {
        self.width_mode
    }

    /// Classes the root element carries for the current mode.
    pub fn root_classes(&self) -> &'static [&'static str] {
        if self.dark_mode {
            &DARK_ROOT_CLASSES
        } else {
            &[]
        }
    }

    pub fn toggle(&mut self) -> Result<bool, CoreError> {
        let next = !self.dark_mode;
        self.set_dark_mode(next)?;
        Ok(next)
    }

    pub fn set_dark_mode(&mut self, dark: bool) -> Result<(), CoreError> {
        self.store.set(keys::DARK_MODE, json!(dark), None)?;
        self.apply(dark);
        Ok(())
    }

    /// OS preference changed. Ignored once the user picked a mode explicitly.
    pub fn system_preference_changed(&mut self, prefers_dark: bool) -> Result<bool, CoreError> {
        if self.store.get(keys::DARK_MODE)?.is_some() {
            return Ok(false);
        }
        self.apply(prefers_dark);
        Ok(true)
    }

    pub fn set_width_mode(&mut self, mode: WidthMode) -> Result<(), CoreError> {
        self.store.set(keys::WIDTH_MODE, json!(mode.as_str()), None)?;
        self.width_mode = mode;
        Ok(())
    }

    pub fn cycle_width_mode(&mut self) -> Result<WidthMode, CoreError> {
        let next = self.width_mode.next();
        self.set_width_mode(next)?;
        Ok(next)
    }

    /// `listener` receives the new dark mode flag on every change.
    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn(bool) + Send + 'static,
    {
        let mut id = 0;
        if let Ok(mut guard) = self.listeners.lock() {
            guard.next_id += 1;
            id = guard.next_id;
            guard.entries.push((id, Box::new(listener)));
        }
        Subscription {
            id,
            listeners: Arc::downgrade(&self.listeners),
        }
    }

    pub fn listener_count(&self) -> usize {
        self.listeners
            .lock()
            .map(|guard| guard.entries.len())
            .unwrap_or(0)
    }

    fn apply(&mut self, dark: bool) {
        if self.dark_mode == dark {
            return;
        }
        self.dark_mode = dark;
        if let Ok(guard) = self.listeners.lock() {
            for (_, listener) in &guard.entries {
                listener(dark);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn width_modes_cycle_through_all_three() {
        let mut mode = WidthMode::Standard;
        let mut seen = Vec::new();
        for _ in 0..3 {
            mode = mode.next();
            seen.push(mode);
        }
        assert_eq!(seen, vec![WidthMode::Compact, WidthMode::Full, WidthMode::Standard]);
        assert_eq!("FULL".parse::<WidthMode>(), Ok(WidthMode::Full));
        assert!("wide".parse::<WidthMode>().is_err());
        assert_eq!(WidthMode::default().label(), "Compact Width");
    }
}
