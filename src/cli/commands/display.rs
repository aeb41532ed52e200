use uuid::Uuid;

use crate::cli::core::{CommandError, CommandResult, ShellContext};
use crate::cli::output;
use crate::cli::registry::CommandEntry;
use crate::cli::table::Table;
use crate::session::{NotificationPosition, ToastVariant, WidthMode};

pub(crate) const THEME_ACTIONS: &[&str] = &["show", "toggle", "dark", "light", "system"];
pub(crate) const WIDTH_ACTIONS: &[&str] = &["show", "cycle", "standard", "compact", "full"];
pub(crate) const TOAST_ACTIONS: &[&str] = &["list", "dismiss", "clear"];
pub(crate) const TOAST_VARIANTS: &[&str] = &["success", "error", "warning", "info"];

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![
        CommandEntry::new(
            "theme",
            "Show or change the colour scheme",
            "theme [show|toggle|dark|light|system <dark|light>]",
            cmd_theme,
        ),
        CommandEntry::new(
            "width",
            "Show or change the layout width",
            "width [show|cycle|standard|compact|full]",
            cmd_width,
        ),
        CommandEntry::new(
            "notify",
            "Raise a notification",
            "notify <success|error|warning|info> <message> [--duration ms] [--position pos] [--sticky]",
            cmd_notify,
        ),
        CommandEntry::new(
            "toasts",
            "List or dismiss active notifications",
            "toasts [list|dismiss <id>|clear]",
            cmd_toasts,
        ),
    ]
}

fn cmd_theme(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let action = args.first().map(|a| a.to_lowercase()).unwrap_or_else(|| "show".into());
    match action.as_str() {
        "show" => {}
        "toggle" => {
            context.theme.toggle()?;
        }
        "dark" => context.theme.set_dark_mode(true)?,
        "light" => context.theme.set_dark_mode(false)?,
        "system" => {
            let prefers_dark = match args.get(1).map(|v| v.to_lowercase()).as_deref() {
                Some("dark") => true,
                Some("light") => false,
                _ => {
                    return Err(CommandError::InvalidArguments(
                        "usage: theme system <dark|light>".into(),
                    ))
                }
            };
            if !context.theme.system_preference_changed(prefers_dark)? {
                output::info("An explicit theme choice is stored; system change ignored.");
            }
        }
        other => {
            return Err(CommandError::InvalidArguments(format!(
                "Unknown theme action `{}`.",
                other
            )))
        }
    }

    let mode = if context.theme.dark_mode() { "dark" } else { "light" };
    output::info(format!("Theme: {}", mode));
    let classes = context.theme.root_classes();
    if !classes.is_empty() {
        output::raw(format!("  root classes: {}", classes.join(" ")));
    }
    Ok(())
}

fn cmd_width(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    match args.first().map(|a| a.to_lowercase()).as_deref() {
        None | Some("show") => {}
        Some("cycle") => {
            context.theme.cycle_width_mode()?;
        }
        Some(name) => {
            let mode: WidthMode = name.parse().map_err(CommandError::InvalidArguments)?;
            context.theme.set_width_mode(mode)?;
        }
    }
    let mode = context.theme.width_mode();
    output::info(format!("Layout: {} ({})", mode.label(), mode));
    Ok(())
}

fn parse_variant(raw: &str) -> Result<ToastVariant, CommandError> {
    match raw.to_lowercase().as_str() {
        "success" => Ok(ToastVariant::Success),
        "error" => Ok(ToastVariant::Error),
        "warning" => Ok(ToastVariant::Warning),
        "info" => Ok(ToastVariant::Info),
        other => Err(CommandError::InvalidArguments(format!(
            "Unknown notification type `{}`.",
            other
        ))),
    }
}

fn parse_position(raw: &str) -> Result<NotificationPosition, CommandError> {
    NotificationPosition::ALL
        .into_iter()
        .find(|position| position.as_str() == raw)
        .ok_or_else(|| CommandError::InvalidArguments(format!("Unknown position `{}`.", raw)))
}

fn cmd_notify(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let parsed = super::ParsedArgs::parse(args, &["sticky"])?;
    let [variant, words @ ..] = parsed.positional.as_slice() else {
        return Err(CommandError::InvalidArguments(
            "usage: notify <success|error|warning|info> <message>".into(),
        ));
    };
    let variant = parse_variant(variant)?;
    let message = words.join(" ");
    if message.trim().is_empty() {
        return Err(CommandError::InvalidArguments("A message is required.".into()));
    }
    let duration = parsed.number::<u64>("duration")?;
    let position = parsed.value("position").map(parse_position).transpose()?;
    let auto_close = parsed.flag("sticky").then_some(false);

    let id = context
        .notifications
        .add(message, variant, duration, position, auto_close);
    output::success(format!("Notification {} added.", id));
    Ok(())
}

fn cmd_toasts(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    match args.first().map(|a| a.to_lowercase()).as_deref() {
        None | Some("list") => {
            let width = context.table_width();
            let active = context.notifications.active();
            if active.is_empty() {
                output::info("No active notifications.");
                return Ok(());
            }
            let mut table = Table::new(&["Id", "Type", "Position", "Message"]);
            for toast in active {
                table.push(vec![
                    toast.id.to_string(),
                    toast.variant.as_str().to_string(),
                    toast.position.as_str().to_string(),
                    toast.message.clone(),
                ]);
            }
            output::raw(table.render_within(width));
        }
        Some("dismiss") => {
            let id = args
                .get(1)
                .and_then(|raw| Uuid::parse_str(raw).ok())
                .ok_or_else(|| CommandError::InvalidArguments("usage: toasts dismiss <id>".into()))?;
            if context.notifications.remove(id) {
                output::success("Notification dismissed.");
            } else {
                output::warning("No notification with that id.");
            }
        }
        Some("clear") => {
            context.notifications.clear_all();
            output::success("Notifications cleared.");
        }
        Some(other) => {
            return Err(CommandError::InvalidArguments(format!(
                "Unknown toasts action `{}`.",
                other
            )))
        }
    }
    Ok(())
}
