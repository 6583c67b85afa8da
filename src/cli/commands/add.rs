use crate::cli::parser::Commands;
use crate::config::Config;
use crate::core::store::AttendeeStore;
use crate::db::repository::Repository;
use crate::errors::AppResult;
use crate::models::attendee::Attendee;
use crate::ui::messages::success;

pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::Add {
        name,
        phone,
        affiliation,
        vehicle,
        event,
        disability,
        device,
    } = cmd
    {
        let mut record = Attendee::new(name, affiliation, phone, vehicle);
        if let Some(v) = event {
            record = record.with_event_name(v);
        }
        if let Some(v) = disability {
            record = record.with_disability(v);
        }
        if let Some(v) = device {
            record = record.with_assistive_device(v);
        }

        let mut repo = Repository::open(&cfg.database)?;
        let added = AttendeeStore::new(&mut repo).add(record)?;
        success(format!("Registered {} ({}).", added.name, added.phone));
    }

    Ok(())
}
