use std::{fs, path::Path, str::FromStr};

use serde::de::DeserializeOwned;

use crate::cli::core::CommandError;
use crate::cli::registry::CommandRegistry;

pub mod cards;
pub mod config;
pub mod display;
pub mod expenses;
pub mod invoices;
pub mod session;
pub mod system;
pub mod templates;
pub mod upload;

pub fn register_all(registry: &mut CommandRegistry) {
    for entry in system::definitions()
        .into_iter()
        .chain(session::definitions())
        .chain(expenses::definitions())
        .chain(invoices::definitions())
        .chain(upload::definitions())
        .chain(templates::definitions())
        .chain(cards::definitions())
        .chain(display::definitions())
        .chain(config::definitions())
    {
        registry.register(entry);
    }
    registry.alias("quit", "exit");
    registry.alias("?", "help");
    registry.alias("signin", "login");
    registry.alias("signout", "logout");
}

/// Second-word completions for the interactive shell.
pub fn subcommands(command: &str) -> &'static [&'static str] {
    match command {
        "invoices" => invoices::INVOICE_ACTIONS,
        "categories" | "tags" => invoices::CATALOG_ACTIONS,
        "expense" => expenses::FORM_ACTIONS,
        "chart" => expenses::CHART_KINDS,
        "templates" => templates::ACTIONS,
        "cards" => cards::ACTIONS,
        "theme" => display::THEME_ACTIONS,
        "width" => display::WIDTH_ACTIONS,
        "toasts" => display::TOAST_ACTIONS,
        "notify" => display::TOAST_VARIANTS,
        "config" => config::ACTIONS,
        _ => &[],
    }
}

/// Positional words plus `--name value` / `--name=value` options.
#[derive(Debug, Default)]
pub(crate) struct ParsedArgs<'a> {
    pub positional: Vec<&'a str>,
    values: Vec<(&'a str, &'a str)>,
    switches: Vec<&'a str>,
}

impl<'a> ParsedArgs<'a> {
    /// Names listed in `switches` take no value.
    pub fn parse(args: &[&'a str], switches: &[&str]) -> Result<Self, CommandError> {
        let mut parsed = ParsedArgs::default();
        let mut iter = args.iter().copied();
        while let Some(arg) = iter.next() {
            let Some(option) = arg.strip_prefix("--") else {
                parsed.positional.push(arg);
                continue;
            };
            if let Some((name, value)) = option.split_once('=') {
                parsed.values.push((name, value));
            } else if switches.contains(&option) {
                parsed.switches.push(option);
            } else {
                let value = iter.next().ok_or_else(|| {
                    CommandError::InvalidArguments(format!("`--{}` needs a value", option))
                })?;
                parsed.values.push((option, value));
            }
        }
        Ok(parsed)
    }

    pub fn value(&self, name: &str) -> Option<&'a str> {
        self.values
            .iter()
            .rev()
            .find(|(key, _)| *key == name)
            .map(|(_, value)| *value)
    }

    pub fn values(&self, name: &str) -> Vec<&'a str> {
        self.values
            .iter()
            .filter(|(key, _)| *key == name)
            .map(|(_, value)| *value)
            .collect()
    }

    pub fn flag(&self, name: &str) -> bool {
        self.switches.contains(&name)
    }

    pub fn number<T: FromStr>(&self, name: &str) -> Result<Option<T>, CommandError> {
        self.value(name)
            .map(|raw| {
                raw.parse::<T>().map_err(|_| {
                    CommandError::InvalidArguments(format!("`--{}` expects a number, got `{}`", name, raw))
                })
            })
            .transpose()
    }
}

pub(crate) fn parse_id(raw: Option<&&str>, what: &str) -> Result<i64, CommandError> {
    let raw = raw.ok_or_else(|| CommandError::InvalidArguments(format!("Missing {}.", what)))?;
    raw.parse::<i64>()
        .map_err(|_| CommandError::InvalidArguments(format!("`{}` is not a valid {}.", raw, what)))
}

pub(crate) fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, CommandError> {
    let text = fs::read_to_string(path).map_err(|err| {
        CommandError::Message(format!("Could not read `{}`: {}", path.display(), err))
    })?;
    Ok(serde_json::from_str(&text)?)
}
