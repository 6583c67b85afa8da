use crate::cli::parser::{Cli, Commands};
use crate::cli::prompt::authorize;
use crate::config::Config;
use crate::core::checkin::{CheckInEngine, ManualOutcome, ScanDesk, ScanOutcome};
use crate::db::repository::Repository;
use crate::errors::AppResult;
use crate::models::operator::Permission;
use crate::ui::messages::{error, header, info, success, warning};
use crate::utils::colors::{GREY, RESET};
use std::io::{self, BufRead};
use std::time::{Duration, Instant};

/// `checkin`, `cancel` and `scan`.
pub fn handle(cli: &Cli, cfg: &Config) -> AppResult<()> {
    let mut repo = Repository::open(&cfg.database)?;

    match &cli.command {
        Commands::Checkin { phone } => {
            repo.active_session()?;
            let grant = authorize(cli, &repo, Permission::CheckIn)?;
            match CheckInEngine::new(&mut repo).check_in(phone, &grant)? {
                ManualOutcome::CheckedIn(a) => success(format!(
                    "{} checked in at {}.",
                    a.name,
                    a.checked_in_at_local().unwrap_or_default()
                )),
                ManualOutcome::Unchanged(a) => {
                    warning(format!("{} is already checked in.", a.name))
                }
                ManualOutcome::Cancelled(_) => {}
            }
        }

        Commands::Cancel { phone } => {
            repo.active_session()?;
            let grant = authorize(cli, &repo, Permission::CheckIn)?;
            match CheckInEngine::new(&mut repo).cancel(phone, &grant)? {
                ManualOutcome::Cancelled(a) => {
                    success(format!("Check-in of {} cancelled.", a.name))
                }
                ManualOutcome::Unchanged(a) => {
                    warning(format!("{} is not checked in.", a.name))
                }
                ManualOutcome::CheckedIn(_) => {}
            }
        }

        Commands::Scan { payload } => {
            let session = repo.active_session()?;
            let mut desk = ScanDesk::new(Duration::from_secs(cfg.scan_window_secs));
            let mut engine = CheckInEngine::new(&mut repo);

            if let Some(raw) = payload {
                let outcome = engine.scan(&mut desk, raw, Instant::now())?;
                report(&outcome);
                return Ok(());
            }

            header(format!("Scanning for '{}'", session.name));
            info("Waiting for QR payloads (one per line, Ctrl-D to stop)…");
            for line in io::stdin().lock().lines() {
                let raw = line?;
                if raw.trim().is_empty() {
                    continue;
                }
                let outcome = engine.scan(&mut desk, &raw, Instant::now())?;
                report(&outcome);
            }
        }

        _ => {}
    }

    Ok(())
}

fn report(outcome: &ScanOutcome) {
    let msg = outcome.message();
    match outcome {
        ScanOutcome::Success(a) => success(format!("{}: {} ({})", msg, a.name, a.affiliation)),
        ScanOutcome::AlreadyCheckedIn(a) => warning(format!(
            "{}: {} at {}",
            msg,
            a.name,
            a.checked_in_at_local().unwrap_or_default()
        )),
        ScanOutcome::NoMatch { name, phone } => error(format!("{}: {} ({})", msg, name, phone)),
        ScanOutcome::Invalid(reason) => error(format!("{}: {}", msg, reason)),
        ScanOutcome::Ignored => println!("{GREY}{msg}{RESET}"),
    }
}
