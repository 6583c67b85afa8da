use crate::cli::parser::{Commands, SyncCommand};
use crate::config::Config;
use crate::core::store::{AttendeeStore, ImportMode};
use crate::db::repository::Repository;
use crate::errors::AppResult;
use crate::sync::{self, PushReceipt};
use crate::ui::messages::{header, info, success, warning};
use crate::utils::table::{Column, Table};

pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    let Commands::Sync { action } = cmd else {
        return Ok(());
    };

    let gateway = sync::open_gateway(cfg.sync_endpoint()?)?;
    let mut repo = Repository::open(&cfg.database)?;

    match action {
        SyncCommand::Push => {
            let session = repo.active_session()?;
            match gateway.push(&session.participants, &session.name)? {
                PushReceipt::Acknowledged { count } => {
                    success(format!("Pushed '{}': {} rows stored.", session.name, count));
                }
                PushReceipt::Unconfirmed => {
                    warning(format!(
                        "Pushed '{}' ({} attendees) but the remote store did not confirm.",
                        session.name,
                        session.participants.len()
                    ));
                }
            }
            repo.audit(
                "sync_push",
                &session.name,
                &format!("{} attendees", session.participants.len()),
            );
        }

        SyncCommand::Sessions => {
            let sessions = gateway.list_sessions()?;
            if sessions.is_empty() {
                info("No remote sessions.");
                return Ok(());
            }

            header("Remote sessions");
            let mut table = Table::new(vec![
                Column::new("NAME"),
                Column::new("ROWS"),
                Column::new("LAST UPDATE"),
            ]);
            for s in sessions {
                table.add_row(vec![s.name, s.count.to_string(), s.last_update]);
            }
            print!("{}", table.render());
        }

        SyncCommand::Pull { name, as_name } => {
            let rows = gateway.fetch_session(name)?;
            if rows.is_empty() {
                warning(format!("Remote session '{}' has no rows.", name));
                return Ok(());
            }
            let attendees = sync::latest_per_phone(rows);

            let local_name = as_name.as_deref().unwrap_or(name);
            let mut store = AttendeeStore::new(&mut repo);
            let session = store.create_session(local_name)?;
            let report = store.load(attendees, ImportMode::Replace)?;

            repo.audit(
                "sync_pull",
                &session.name,
                &format!("{} attendees from remote '{}'", report.added, name),
            );
            success(format!(
                "Pulled '{}' into new session '{}' ({} attendees).",
                name, session.name, report.added
            ));
        }
    }

    Ok(())
}
