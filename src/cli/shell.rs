use std::{
    borrow::Cow,
    io::{self, BufRead},
};

use rustyline::{
    completion::{Completer, Pair},
    error::ReadlineError,
    highlight::Highlighter,
    hint::Hinter,
    history::DefaultHistory,
    validate::Validator,
    Cmd, Context as ReadlineContext, Editor, Helper, KeyEvent,
};
use tracing::{debug, warn};

use crate::cli::commands;
use crate::cli::core::{CliError, CliMode, CommandError, LoopControl, ShellContext};
use crate::cli::output;
use crate::utils::paths;

pub const SCRIPT_ENV: &str = "TRACKER_CLI_SCRIPT";

impl CliMode {
    /// Script mode reads commands from stdin when `TRACKER_CLI_SCRIPT` is set.
    pub fn detect() -> Self {
        match std::env::var_os(SCRIPT_ENV) {
            Some(_) => CliMode::Script,
            None => CliMode::Interactive,
        }
    }
}

pub fn run_cli() -> Result<(), CliError> {
    let mode = CliMode::detect();
    let mut context = ShellContext::new(mode)?;
    match mode {
        CliMode::Interactive => run_interactive(&mut context),
        CliMode::Script => run_script(&mut context),
    }
}

fn run_interactive(context: &mut ShellContext) -> Result<(), CliError> {
    let mut editor = Editor::<CommandHelper, DefaultHistory>::new()?;
    editor.set_helper(Some(CommandHelper::new(context.command_names())));
    editor.bind_sequence(KeyEvent::from('?'), Cmd::Complete);

    let history = paths::history_file();
    if editor.load_history(&history).is_err() {
        debug!(path = %history.display(), "no shell history yet");
    }

    output::info("Invoice tracker shell. Type `help` to list commands.");
    if let Some(message) = context.auth.error() {
        output::warning(message);
    }

    while context.running {
        let line = match editor.readline(&context.prompt()) {
            Ok(line) => line,
            Err(ReadlineError::Interrupted) => {
                if context.confirm_exit()? {
                    break;
                }
                continue;
            }
            Err(ReadlineError::Eof) => {
                output::info("Exiting shell.");
                break;
            }
            Err(err) => return Err(err.into()),
        };
        if !line.trim().is_empty() {
            editor.add_history_entry(line.trim()).ok();
        }
        if step(context, &line)? == LoopControl::Exit {
            break;
        }
    }

    if let Err(err) = editor.save_history(&history) {
        warn!(error = %err, "could not save shell history");
    }
    Ok(())
}

fn run_script(context: &mut ShellContext) -> Result<(), CliError> {
    for line in io::stdin().lock().lines() {
        if !context.running || step(context, &line?)? == LoopControl::Exit {
            break;
        }
    }
    Ok(())
}

/// Runs one input line. Command failures are reported and the shell keeps going.
fn step(context: &mut ShellContext, line: &str) -> Result<LoopControl, CliError> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return Ok(LoopControl::Continue);
    }
    match handle_line(context, line) {
        Ok(control) => Ok(control),
        Err(err) => {
            context.report_error(err)?;
            Ok(LoopControl::Continue)
        }
    }
}

fn handle_line(context: &mut ShellContext, line: &str) -> Result<LoopControl, CommandError> {
    let tokens = match parse_command_line(line) {
        Ok(tokens) => tokens,
        Err(err) => {
            output::warning(err);
            return Ok(LoopControl::Continue);
        }
    };

    let Some((raw, rest)) = tokens.split_first() else {
        return Ok(LoopControl::Continue);
    };
    let args: Vec<&str> = rest.iter().map(String::as_str).collect();

    context.last_command = Some(line.to_string());
    context.notifications.prune_expired();

    let outcome = context.dispatch(&raw.to_lowercase(), raw, &args);
    if let Ok(LoopControl::Exit) = outcome {
        context.running = false;
    }
    outcome
}

pub(crate) fn parse_command_line(input: &str) -> Result<Vec<String>, shell_words::ParseError> {
    shell_words::split(input)
}

/// Completes command names in the first position and known subcommands in
/// the second.
struct CommandHelper {
    commands: Vec<String>,
}

impl CommandHelper {
    fn new(names: Vec<&'static str>) -> Self {
        let mut commands: Vec<String> = names.into_iter().map(str::to_ascii_lowercase).collect();
        commands.sort();
        commands.dedup();
        Self { commands }
    }

    fn candidates<'a>(&'a self, words: &[&str], needle: &str) -> Vec<&'a str> {
        match words {
            [] => self
                .commands
                .iter()
                .map(String::as_str)
                .filter(|name| name.starts_with(needle))
                .collect(),
            [command] => commands::subcommands(command)
                .iter()
                .copied()
                .filter(|name| name.starts_with(needle))
                .collect(),
            _ => Vec::new(),
        }
    }
}

impl Helper for CommandHelper {}

impl Completer for CommandHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &ReadlineContext<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        let prefix = &line[..pos];
        let start = prefix
            .rfind(char::is_whitespace)
            .map(|idx| idx + 1)
            .unwrap_or(0);
        let words: Vec<String> = prefix[..start]
            .split_whitespace()
            .map(str::to_ascii_lowercase)
            .collect();
        let words: Vec<&str> = words.iter().map(String::as_str).collect();
        let needle = prefix[start..].to_ascii_lowercase();

        let pairs = self
            .candidates(&words, &needle)
            .into_iter()
            .map(|name| Pair {
                display: name.to_string(),
                replacement: name.to_string(),
            })
            .collect();
        Ok((start, pairs))
    }
}

impl Hinter for CommandHelper {
    type Hint = String;

    /// Greys in the rest of a command name once the prefix is unambiguous.
    fn hint(&self, line: &str, pos: usize, _ctx: &ReadlineContext<'_>) -> Option<String> {
        let prefix = line.get(..pos)?;
        if prefix.is_empty() || pos < line.len() || prefix.contains(char::is_whitespace) {
            return None;
        }
        match self.candidates(&[], &prefix.to_ascii_lowercase()).as_slice() {
            [only] => only.get(prefix.len()..).map(str::to_string),
            _ => None,
        }
    }
}

impl Highlighter for CommandHelper {
    fn highlight<'l>(&self, line: &'l str, _pos: usize) -> Cow<'l, str> {
        Cow::Borrowed(line)
    }
}

impl Validator for CommandHelper {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quoted_arguments_stay_together() {
        let tokens = parse_command_line(r#"notify success "Invoice saved""#).unwrap();
        assert_eq!(tokens, vec!["notify", "success", "Invoice saved"]);
        assert!(parse_command_line("login \"unterminated").is_err());
    }

    #[test]
    fn completes_commands_then_subcommands() {
        let helper = CommandHelper::new(vec!["invoices", "help", "ocr"]);
        assert_eq!(helper.candidates(&[], "in"), vec!["invoices"]);
        assert!(helper.candidates(&["invoices"], "up").contains(&"update"));
        assert!(helper.candidates(&["invoices", "list"], "").is_empty());
    }
}
