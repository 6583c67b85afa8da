use crate::cli::parser::{Cli, Commands, SessionAction};
use crate::cli::prompt::{ask_confirmation, authorize};
use crate::config::Config;
use crate::core::store::AttendeeStore;
use crate::db::repository::Repository;
use crate::errors::AppResult;
use crate::models::operator::Permission;
use crate::ui::messages::{header, info, success};
use crate::utils::table::{Column, Table};

pub fn handle(cli: &Cli, cfg: &Config) -> AppResult<()> {
    let Commands::Session { action } = &cli.command else {
        return Ok(());
    };

    let mut repo = Repository::open(&cfg.database)?;

    match action {
        SessionAction::Create { name } => {
            let session = AttendeeStore::new(&mut repo).create_session(name)?;
            success(format!(
                "Session '{}' created and selected (id {}).",
                session.name, session.id
            ));
        }

        SessionAction::List => {
            let active = repo.active_session_id()?;
            let sessions = AttendeeStore::new(&mut repo).list_sessions()?;
            if sessions.is_empty() {
                info("No sessions yet. Create one with `session create <name>`.");
                return Ok(());
            }

            header("Sessions");
            let mut table = Table::new(vec![
                Column::new(""),
                Column::new("ID"),
                Column::new("NAME"),
                Column::new("CREATED"),
                Column::new("ATTENDEES"),
                Column::new("CHECKED IN"),
            ]);
            for s in &sessions {
                let stats = s.stats();
                let marker = if active.as_deref() == Some(s.id.as_str()) { "*" } else { "" };
                table.add_row(vec![
                    marker.to_string(),
                    s.id.chars().take(8).collect(),
                    s.name.clone(),
                    s.created_at
                        .with_timezone(&chrono::Local)
                        .format("%Y-%m-%d %H:%M")
                        .to_string(),
                    stats.total.to_string(),
                    stats.checked_in.to_string(),
                ]);
            }
            print!("{}", table.render());
        }

        SessionAction::Use { session } => {
            let selected = AttendeeStore::new(&mut repo).select_session(session)?;
            success(format!("Active session: '{}'.", selected.name));
        }

        SessionAction::Delete { session, yes } => {
            let grant = authorize(cli, &repo, Permission::ManageRoster)?;
            let target = repo.find_session(session)?;

            let prompt = format!(
                "Delete session '{}' and its {} attendees? This action is irreversible.",
                target.name,
                target.participants.len()
            );
            if !*yes && !ask_confirmation(&prompt) {
                info("Operation cancelled.");
                return Ok(());
            }

            let deleted = AttendeeStore::new(&mut repo).delete_session(&target.id)?;
            success(format!(
                "Session '{}' deleted by {}.",
                deleted.name, grant.operator
            ));
        }
    }

    Ok(())
}
