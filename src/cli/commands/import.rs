use crate::cli::parser::Commands;
use crate::cli::prompt::read_value;
use crate::config::Config;
use crate::core::normalizer;
use crate::core::store::{AttendeeStore, ImportMode};
use crate::db::repository::Repository;
use crate::errors::AppResult;
use crate::ui::messages::{info, success, warning};
use crate::utils::path::expand_tilde;

/// Ask replace/merge when the active session already holds attendees.
fn ask_mode(current: usize) -> AppResult<Option<ImportMode>> {
    warning(format!(
        "The active session already has {} attendees.",
        current
    ));
    let answer = read_value("[r]eplace, [m]erge or [c]ancel")?;
    Ok(match answer.to_lowercase().as_str() {
        "r" | "replace" => Some(ImportMode::Replace),
        "m" | "merge" => Some(ImportMode::Merge),
        _ => None,
    })
}

pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::Import {
        file,
        replace,
        merge,
    } = cmd
    {
        let path = expand_tilde(file);
        let records = normalizer::normalize_file(&path)?;
        if records.is_empty() {
            warning(format!("No attendee rows found in {}.", path.display()));
            return Ok(());
        }

        let mut repo = Repository::open(&cfg.database)?;
        let mut store = AttendeeStore::new(&mut repo);
        let mode = if *replace {
            ImportMode::Replace
        } else if *merge || !store.needs_import_choice()? {
            ImportMode::Merge
        } else {
            match ask_mode(store.active()?.participants.len())? {
                Some(mode) => mode,
                None => {
                    info("Import cancelled.");
                    return Ok(());
                }
            }
        };

        let report = store.load(records, mode)?;
        success(format!(
            "Imported {} attendees ({} skipped as duplicate phones).",
            report.added, report.skipped
        ));
    }

    Ok(())
}
