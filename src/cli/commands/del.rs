use crate::cli::parser::{Cli, Commands};
use crate::cli::prompt::{ask_confirmation, authorize};
use crate::config::Config;
use crate::core::store::AttendeeStore;
use crate::db::repository::Repository;
use crate::errors::AppResult;
use crate::models::operator::Permission;
use crate::ui::messages::{info, success, warning};

/// `del` and `clear`: both admin-only and confirmed.
pub fn handle(cli: &Cli, cfg: &Config) -> AppResult<()> {
    let mut repo = Repository::open(&cfg.database)?;

    match &cli.command {
        Commands::Del { phones, yes } => {
            let session = repo.active_session()?;
            authorize(cli, &repo, Permission::ManageRoster)?;

            let prompt = format!(
                "Delete {} attendee(s) from '{}'? This action is irreversible.",
                phones.len(),
                session.name
            );
            if !*yes && !ask_confirmation(&prompt) {
                info("Operation cancelled.");
                return Ok(());
            }

            let removed = AttendeeStore::new(&mut repo).remove_many(phones)?;
            if removed == 0 {
                warning("No attendee matched the given phone numbers.");
            } else {
                success(format!("{} attendee(s) deleted.", removed));
            }
        }

        Commands::Clear { yes } => {
            let session = repo.active_session()?;
            authorize(cli, &repo, Permission::ManageRoster)?;

            let prompt = format!(
                "Remove ALL {} attendees from '{}'? This action is irreversible.",
                session.participants.len(),
                session.name
            );
            if !*yes && !ask_confirmation(&prompt) {
                info("Operation cancelled.");
                return Ok(());
            }

            let removed = AttendeeStore::new(&mut repo).clear()?;
            success(format!("Roster cleared ({} removed).", removed));
        }

        _ => {}
    }

    Ok(())
}
