use crate::cli::parser::Commands;
use crate::config::Config;
use crate::db::repository::Repository;
use crate::errors::{AppError, AppResult};
use crate::qr;
use crate::ui::messages::success;
use crate::utils::path::expand_tilde;

pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::Qr { phone, out } = cmd {
        let repo = Repository::open(&cfg.database)?;
        let session = repo.active_session()?;
        let attendee = session
            .find_by_phone(phone)
            .ok_or_else(|| AppError::AttendeeNotFound(phone.clone()))?;

        let path = expand_tilde(out);
        qr::write_png(attendee, &path)?;
        success(format!("QR code of {} written to {}", attendee.name, path.display()));
    }

    Ok(())
}
