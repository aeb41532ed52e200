use tracker_config::Config;

use crate::cli::core::{CommandError, CommandResult, ShellContext};
use crate::cli::output;
use crate::cli::table::Table;
use crate::cli::registry::CommandEntry;

pub(crate) const ACTIONS: &[&str] = &["show", "set", "reset", "backup", "backups", "restore"];

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![CommandEntry::new(
        "config",
        "View and manage client settings",
        "config [show|set <key> <value>|reset|backup [note]|backups|restore <name>]",
        cmd_config,
    )]
}

fn cmd_config(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let action = args.first().map(|a| a.to_lowercase()).unwrap_or_else(|| "show".into());
    match action.as_str() {
        "show" => show(context),
        "set" => {
            let (Some(key), true) = (args.get(1), args.len() >= 3) else {
                return Err(CommandError::InvalidArguments(format!(
                    "usage: config set <{}> <value>",
                    Config::KEYS.join("|")
                )));
            };
            let value = args[2..].join(" ");
            context.config.set(key, value.trim())?;
            context.persist_config()?;
            context.refresh_from_config()?;
            output::success(format!("`{}` updated.", key));
            Ok(())
        }
        "reset" => {
            context.config = Config::default();
            context.persist_config()?;
            context.refresh_from_config()?;
            output::success("Settings reset to defaults.");
            Ok(())
        }
        "backup" => {
            let note = (args.len() > 1).then(|| args[1..].join(" "));
            let name = context
                .config_manager
                .backup(&context.config, note.as_deref())?;
            output::success(format!("Settings backed up as `{}`.", name));
            Ok(())
        }
        "backups" => {
            let backups = context.config_manager.list_backups()?;
            if backups.is_empty() {
                output::info("No settings backups yet.");
            } else {
                output::section("Settings backups");
                for backup in backups {
                    let note = backup.note.map(|note| format!("  ({note})")).unwrap_or_default();
                    output::raw(format!(
                        "  {}  {}{}",
                        backup.created_at.format("%Y-%m-%d %H:%M:%S"),
                        backup.name,
                        note
                    ));
                }
            }
            Ok(())
        }
        "restore" => {
            let name = args.get(1).ok_or_else(|| {
                CommandError::InvalidArguments("usage: config restore <name>".into())
            })?;
            context.config = context.config_manager.restore(name)?;
            context.refresh_from_config()?;
            output::success(format!("Settings restored from `{}`.", name));
            Ok(())
        }
        other => Err(CommandError::InvalidArguments(format!(
            "Unknown config action `{}`.",
            other
        ))),
    }
}

fn show(context: &ShellContext) -> CommandResult {
    output::section("Settings");
    let mut table = Table::new(&["Key", "Value"]);
    for (key, value) in context.config.entries() {
        table.push(vec![key.to_string(), value]);
    }
    output::raw(table.render_within(context.table_width()));
    output::raw(format!(
        "  file: {}",
        context.config_manager.config_path().display()
    ));
    Ok(())
}
