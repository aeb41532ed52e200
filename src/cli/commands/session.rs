use tracker_core::ValidationService;

use crate::cli::core::{CliMode, CommandError, CommandResult, ShellContext};
use crate::cli::io;
use crate::cli::output;
use crate::cli::registry::CommandEntry;
use crate::session::ToastVariant;

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![
        CommandEntry::new(
            "login",
            "Sign in with email and password",
            "login <email> [password]",
            cmd_login,
        ),
        CommandEntry::new(
            "register",
            "Create an account and sign in",
            "register <username> <email> [password]",
            cmd_register,
        ),
        CommandEntry::new("logout", "Sign out and forget the token", "logout", cmd_logout),
        CommandEntry::new("whoami", "Show the signed-in user", "whoami", cmd_whoami),
    ]
}

/// Passwords come from the argument list in scripts and a hidden prompt otherwise.
fn password_arg(context: &ShellContext, given: Option<&&str>) -> Result<String, CommandError> {
    match (given, context.mode()) {
        (Some(password), _) => Ok(password.to_string()),
        (None, CliMode::Interactive) => io::prompt_password(&context.prompt_theme, "Password"),
        (None, CliMode::Script) => Err(CommandError::InvalidArguments(
            "A password is required in script mode.".into(),
        )),
    }
}

fn cmd_login(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let email = args
        .first()
        .ok_or_else(|| CommandError::InvalidArguments("usage: login <email> [password]".into()))?;
    if !ValidationService::is_valid_email(email) {
        return Err(CommandError::InvalidArguments(
            "Please enter a valid email address".into(),
        ));
    }
    let password = password_arg(context, args.get(1))?;

    let user = context.auth.login(email, &password)?;
    context.notify(ToastVariant::Success, format!("Signed in as {}.", user.email));
    Ok(())
}

fn cmd_register(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let (Some(username), Some(email)) = (args.first(), args.get(1)) else {
        return Err(CommandError::InvalidArguments(
            "usage: register <username> <email> [password]".into(),
        ));
    };
    let password = password_arg(context, args.get(2))?;

    let user = context.auth.register(username, email, &password)?;
    context.notify(
        ToastVariant::Success,
        format!("Account created. Signed in as {}.", user.email),
    );
    Ok(())
}

fn cmd_logout(context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    if !context.auth.is_authenticated() {
        output::info("Not signed in.");
        return Ok(());
    }
    context.auth.logout()?;
    context.notify(ToastVariant::Info, "Signed out.");
    Ok(())
}

fn cmd_whoami(context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    match context.auth.user() {
        Some(user) => {
            output::section("Signed in");
            output::raw(format!("  Username: {}", user.username));
            output::raw(format!("  Email   : {}", user.email));
            if let Some(role) = &user.role {
                output::raw(format!("  Role    : {}", role));
            }
        }
        None => {
            output::info("Not signed in.");
            if let Some(message) = context.auth.error() {
                output::warning(message);
            }
        }
    }
    Ok(())
}
