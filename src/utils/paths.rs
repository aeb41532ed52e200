use dirs::home_dir;
use std::{env, path::PathBuf};

pub const HOME_ENV: &str = "TRACKER_HOME";
const DEFAULT_DIR_NAME: &str = ".invoice_tracker";
const HISTORY_FILE: &str = "history.txt";

/// Returns the application data directory, defaulting to `~/.invoice_tracker`.
pub fn app_data_dir() -> PathBuf {
    if let Some(custom) = env::var_os(HOME_ENV) {
        return PathBuf::from(custom);
    }
    home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(DEFAULT_DIR_NAME)
}

/// Shell history for the interactive prompt.
pub fn history_file() -> PathBuf {
    app_data_dir().join(HISTORY_FILE)
}
