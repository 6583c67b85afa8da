use crate::cli::parser::Commands;
use crate::cli::prompt::ask_confirmation;
use crate::config::Config;
use crate::core::dispatch::{Dispatcher, LogLevel};
use crate::db::repository::Repository;
use crate::errors::{AppError, AppResult};
use crate::messaging::solapi::SolapiClient;
use crate::ui::messages::{error, header, info, progress, success, warning};
use std::time::Duration;

pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::Send { yes, message } = cmd {
        let repo = Repository::open(&cfg.database)?;
        let session = repo.active_session()?;

        if session.participants.is_empty() {
            return Err(AppError::Send("the active session has no attendees".into()));
        }
        if cfg.solapi.sender.trim().is_empty() {
            return Err(AppError::Config("solapi.sender is not set".into()));
        }
        let client = SolapiClient::new(&cfg.solapi)?;

        let prompt = format!(
            "Send QR messages to {} attendees of '{}'? MMS messages are billed.",
            session.participants.len(),
            session.name
        );
        if !*yes && !ask_confirmation(&prompt) {
            info("Operation cancelled.");
            return Ok(());
        }

        let template = message.as_deref().unwrap_or(&cfg.message_template);
        let dispatcher = Dispatcher::new(&client, &cfg.solapi.sender, template)
            .with_delay(Duration::from_millis(cfg.dispatch_delay_ms));

        header(format!("Dispatching to '{}'", session.name));
        let report = dispatcher.run(&session.participants, |p, entry| {
            let line = format!("[{}] {}", entry.at.format("%H:%M:%S"), entry.message);
            match entry.level {
                LogLevel::Success => success(line),
                LogLevel::Error => error(line),
            }
            progress(p.current, p.total, p.success, p.fail);
        });

        let p = report.progress;
        repo.audit(
            "dispatch",
            &session.name,
            &format!("total={} success={} fail={}", p.total, p.success, p.fail),
        );

        if p.fail == 0 {
            success(format!("All {} messages sent.", p.total));
        } else {
            warning(format!(
                "{} of {} messages sent, {} failed.",
                p.success, p.total, p.fail
            ));
        }
    }

    Ok(())
}
