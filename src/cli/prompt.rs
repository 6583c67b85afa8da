//! Interactive prompts shared by command handlers.

use crate::cli::parser::Cli;
use crate::core::auth::{Authorizer, Credentials, Grant};
use crate::db::repository::Repository;
use crate::errors::{AppError, AppResult};
use crate::models::operator::Permission;
use crate::ui::messages::warning;
use std::io::{self, IsTerminal, Write};

/// Ask a yes/no confirmation from the user
pub fn ask_confirmation(prompt: &str) -> bool {
    warning(prompt);
    print!("Confirm [y/N]: ");
    let _ = io::stdout().flush();

    let mut s = String::new();
    if io::stdin().read_line(&mut s).is_ok() {
        matches!(s.trim().to_lowercase().as_str(), "y" | "yes")
    } else {
        false
    }
}

/// Read one trimmed line after printing `label`.
pub fn read_value(label: &str) -> AppResult<String> {
    print!("{}: ", label);
    io::stdout().flush()?;

    let mut s = String::new();
    io::stdin().read_line(&mut s)?;
    Ok(s.trim().to_string())
}

/// Like [`read_value`], without echo when stdin is a terminal.
pub fn read_secret(label: &str) -> AppResult<String> {
    if !io::stdin().is_terminal() {
        return read_value(label);
    }
    let secret = rpassword::prompt_password(format!("{}: ", label))?;
    Ok(secret.trim().to_string())
}

/// Credentials from `--operator`/`--passcode`, prompting for what is missing.
pub fn credentials(cli: &Cli) -> AppResult<Credentials> {
    let operator = match &cli.operator {
        Some(name) => name.clone(),
        None => read_value("Operator")?,
    };
    if operator.is_empty() {
        return Err(AppError::Unauthorized("operator name is required".into()));
    }

    let passcode = match &cli.passcode {
        Some(p) => p.clone(),
        None => read_secret("Passcode")?,
    };

    Ok(Credentials { operator, passcode })
}

/// Prompt (if needed) and check the credentials for `permission`.
pub fn authorize(cli: &Cli, repo: &Repository, permission: Permission) -> AppResult<Grant> {
    let creds = credentials(cli)?;
    Authorizer::new(repo).authorize(&creds, permission)
}
