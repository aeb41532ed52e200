//! Shell context, dispatch, and the error types shared by command handlers.

use std::{io, path::Path, sync::Arc};

use chrono::NaiveDate;
use dialoguer::theme::ColorfulTheme;
use rustyline::error::ReadlineError;
use tracing::debug;
use tracker_config::{Config, ConfigError, ConfigManager};
use tracker_core::{Clock, CoreError, PreferenceStore, SystemClock};
use tracker_domain::{ExpenseQuery, GroupBy};
use tracker_storage_json::JsonPreferenceStore;

use crate::api::{ApiClient, ApiError};
use crate::cli::commands;
use crate::cli::io as cli_io;
use crate::cli::output;
use crate::cli::registry::CommandRegistry;
use crate::config;
use crate::errors::TrackerError;
use crate::session::{
    AuthSession, ColorSchemeProbe, EnvColorScheme, NotificationCenter, Subscription, ThemeState,
    ToastVariant, LOGIN_ROUTE,
};
use crate::upload::UploadArea;
use crate::utils::paths;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CliMode {
    Interactive,
    Script,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LoopControl {
    Continue,
    Exit,
}

pub type CommandResult = Result<(), CommandError>;

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error(transparent)]
    Tracker(#[from] TrackerError),
    #[error("Input error: {0}")]
    Input(#[from] ReadlineError),
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        CliError::Tracker(err.into())
    }
}

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        CliError::Tracker(err.into())
    }
}

impl From<ApiError> for CliError {
    fn from(err: ApiError) -> Self {
        CliError::Tracker(err.into())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    #[error("Not signed in. Use `login <email>` first.")]
    NotAuthenticated,
    #[error("{0}")]
    InvalidArguments(String),
    #[error("{0}")]
    Message(String),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Serde(#[from] serde_json::Error),
    #[error(transparent)]
    Core(#[from] CoreError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("{}", .0.user_message())]
    Api(#[from] ApiError),
    #[error(transparent)]
    Dialoguer(#[from] dialoguer::Error),
    #[error("exit requested")]
    ExitRequested,
}

impl From<TrackerError> for CommandError {
    fn from(err: TrackerError) -> Self {
        match err {
            TrackerError::Core(err) => CommandError::Core(err),
            TrackerError::Config(err) => CommandError::Config(err),
            TrackerError::Api(err) => CommandError::Api(err),
            TrackerError::Io(err) => CommandError::Io(err),
            TrackerError::Validation(message) => CommandError::InvalidArguments(message),
            TrackerError::Auth(message) => CommandError::Message(message),
        }
    }
}

/// State shared by every command for the lifetime of one shell.
pub struct ShellContext {
    pub(crate) mode: CliMode,
    pub(crate) registry: CommandRegistry,
    pub(crate) config_manager: ConfigManager,
    pub(crate) config: Config,
    pub(crate) clock: Arc<dyn Clock>,
    pub(crate) auth: AuthSession,
    pub(crate) theme: ThemeState,
    _theme_listener: Subscription,
    pub(crate) notifications: NotificationCenter,
    pub(crate) uploads: UploadArea,
    /// Filters and sort remembered between `expenses` invocations.
    pub(crate) query: ExpenseQuery,
    pub(crate) prompt_theme: ColorfulTheme,
    pub last_command: Option<String>,
    pub running: bool,
}

impl ShellContext {
    pub fn new(mode: CliMode) -> Result<Self, CliError> {
        let base = paths::app_data_dir();
        Self::with_parts(mode, &base, Arc::new(SystemClock), &EnvColorScheme)
    }

    pub fn with_parts(
        mode: CliMode,
        base: &Path,
        clock: Arc<dyn Clock>,
        probe: &dyn ColorSchemeProbe,
    ) -> Result<Self, CliError> {
        let mut registry = CommandRegistry::new();
        commands::register_all(&mut registry);

        let config_manager = config::manager_in(base)?;
        let config = config::load_effective(&config_manager)?;
        output::set_plain_mode(!config.ui_color_enabled);

        let store: Arc<dyn PreferenceStore> =
            Arc::new(JsonPreferenceStore::in_dir(base, clock.clone())?);
        let mut auth = AuthSession::new(ApiClient::from_config(&config)?, store.clone());
        if auth.restore() {
            debug!("stored session restored");
        }
        let theme = ThemeState::new(store, probe);
        let theme_listener = theme.subscribe(|dark| debug!(dark, "theme changed"));
        let notifications =
            NotificationCenter::with_default_duration(clock.clone(), config.notification_duration_ms);
        let uploads = UploadArea::from_config(&config);
        let query = ExpenseQuery {
            group_by: GroupBy::from_name(&config.default_group_by),
            ..ExpenseQuery::default()
        };

        Ok(Self {
            mode,
            registry,
            config_manager,
            config,
            clock,
            auth,
            theme,
            _theme_listener: theme_listener,
            notifications,
            uploads,
            query,
            prompt_theme: ColorfulTheme::default(),
            last_command: None,
            running: true,
        })
    }

    pub(crate) fn mode(&self) -> CliMode {
        self.mode
    }

    pub(crate) fn command_names(&self) -> Vec<&'static str> {
        self.registry.names().collect()
    }

    pub(crate) fn prompt(&self) -> String {
        match self.auth.user() {
            Some(user) if !user.username.is_empty() => format!("tracker({})> ", user.username),
            Some(user) => format!("tracker({})> ", user.email),
            None => "tracker> ".to_string(),
        }
    }

    pub(crate) fn today(&self) -> NaiveDate {
        self.clock.today()
    }

    /// Column budget for tables under the current width mode.
    pub(crate) fn table_width(&self) -> usize {
        let limit = self.theme.width_mode().max_columns();
        match crossterm::terminal::size() {
            Ok((columns, _)) if columns > 0 => limit.min(usize::from(columns)),
            _ => limit,
        }
    }

    pub(crate) fn dispatch(
        &mut self,
        command: &str,
        raw: &str,
        args: &[&str],
    ) -> Result<LoopControl, CommandError> {
        if let Some(handler) = self.registry.handler(command) {
            match handler(self, args) {
                Ok(()) => Ok(LoopControl::Continue),
                Err(CommandError::ExitRequested) => Ok(LoopControl::Exit),
                Err(err) => Err(err),
            }
        } else {
            self.suggest_command(raw);
            Ok(LoopControl::Continue)
        }
    }

    pub(crate) fn suggest_command(&self, input: &str) {
        output::warning(format!(
            "Unknown command `{}`. Type `help` to see available commands.",
            input
        ));
        if let Some(name) = self.registry.closest(input) {
            output::info(format!("Suggestion: `{}`?", name));
        }
    }

    pub(crate) fn confirm_exit(&self) -> Result<bool, CliError> {
        if self.mode == CliMode::Script {
            return Ok(true);
        }
        cli_io::confirm_action(&self.prompt_theme, "Exit shell?", true).map_err(|err| match err {
            CommandError::Io(err) => CliError::Io(err),
            other => CliError::Io(io::Error::new(io::ErrorKind::Other, other.to_string())),
        })
    }

    pub(crate) fn report_error(&mut self, err: CommandError) -> Result<(), CliError> {
        match err {
            CommandError::ExitRequested => {}
            CommandError::InvalidArguments(message) => {
                output::error(&message);
                output::hint("Use `help <command>` for usage details.");
            }
            CommandError::NotAuthenticated => {
                output::error(CommandError::NotAuthenticated);
                output::hint("Create an account with `register <username> <email>`.");
            }
            other => {
                let message = other.to_string();
                self.notifications.show_error(message.clone());
                output::error(message);
            }
        }
        Ok(())
    }

    /// Runs a backend call. A 401 ends the session before the error surfaces.
    pub(crate) fn call<T>(
        &mut self,
        request: impl FnOnce(&ApiClient) -> Result<T, ApiError>,
    ) -> Result<T, CommandError> {
        let result = request(self.auth.client());
        self.auth.check(result).map_err(|err| {
            if err.is_unauthorized() {
                output::hint(format!(
                    "Session ended; continue at {} with `login <email>`.",
                    LOGIN_ROUTE
                ));
            }
            CommandError::Api(err)
        })
    }

    pub(crate) fn require_login(&self) -> CommandResult {
        if self.auth.is_authenticated() {
            Ok(())
        } else {
            Err(CommandError::NotAuthenticated)
        }
    }

    /// Prints a message and records it as a toast.
    pub(crate) fn notify(&mut self, variant: ToastVariant, message: impl Into<String>) {
        let message = message.into();
        match variant {
            ToastVariant::Success => output::success(&message),
            ToastVariant::Error => output::error(&message),
            ToastVariant::Warning => output::warning(&message),
            ToastVariant::Info => output::info(&message),
        }
        self.notifications.show_toast(message, variant, None);
    }

    pub(crate) fn persist_config(&self) -> CommandResult {
        self.config_manager.save(&self.config)?;
        Ok(())
    }

    /// Applies settings that other components captured at startup.
    pub(crate) fn refresh_from_config(&mut self) -> CommandResult {
        output::set_plain_mode(!self.config.ui_color_enabled);
        self.uploads = UploadArea::from_config(&self.config);
        self.notifications = NotificationCenter::with_default_duration(
            self.clock.clone(),
            self.config.notification_duration_ms,
        );
        let mut client = ApiClient::from_config(&self.config)?;
        if let Some(token) = self.auth.client().token() {
            client.set_token(token.to_string());
        }
        self.auth.replace_client(client);
        Ok(())
    }

    #[cfg(test)]
    pub(crate) fn process_line(&mut self, line: &str) -> Result<LoopControl, CommandError> {
        let tokens = match crate::cli::shell::parse_command_line(line) {
            Ok(tokens) => tokens,
            Err(err) => {
                output::warning(err);
                return Ok(LoopControl::Continue);
            }
        };
        let Some(raw) = tokens.first() else {
            return Ok(LoopControl::Continue);
        };
        let args: Vec<&str> = tokens.iter().skip(1).map(String::as_str).collect();
        self.dispatch(&raw.to_lowercase(), raw, &args)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::{FixedColorScheme, WidthMode};
    use tempfile::TempDir;
    use tracker_core::FixedClock;

    fn context(dir: &TempDir) -> ShellContext {
        let clock = Arc::new(FixedClock::on(
            NaiveDate::from_ymd_opt(2024, 6, 15).unwrap(),
        ));
        ShellContext::with_parts(CliMode::Script, dir.path(), clock, &FixedColorScheme(false))
            .unwrap()
    }

    #[test]
    fn unknown_commands_continue_the_loop() {
        let dir = TempDir::new().unwrap();
        let mut ctx = context(&dir);
        assert_eq!(ctx.process_line("sumary").unwrap(), LoopControl::Continue);
    }

    #[test]
    fn exit_stops_the_loop() {
        let dir = TempDir::new().unwrap();
        let mut ctx = context(&dir);
        assert_eq!(ctx.process_line("exit").unwrap(), LoopControl::Exit);
    }

    #[test]
    fn width_command_persists_between_sessions() {
        let dir = TempDir::new().unwrap();
        {
            let mut ctx = context(&dir);
            ctx.process_line("width full").unwrap();
        }
        let ctx = context(&dir);
        assert_eq!(ctx.theme.width_mode(), WidthMode::Full);
    }

    #[test]
    fn backend_commands_require_login() {
        let dir = TempDir::new().unwrap();
        let mut ctx = context(&dir);
        let err = ctx.process_line("invoices list").unwrap_err();
        assert!(matches!(err, CommandError::NotAuthenticated));
    }

    #[test]
    fn default_group_by_comes_from_config() {
        let dir = TempDir::new().unwrap();
        let ctx = context(&dir);
        assert_eq!(ctx.query.group_by, GroupBy::ItemType);
        assert_eq!(ctx.prompt(), "tracker> ");
    }
}
