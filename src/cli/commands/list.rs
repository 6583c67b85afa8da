use crate::cli::parser::Commands;
use crate::config::Config;
use crate::db::repository::Repository;
use crate::errors::AppResult;
use crate::models::attendee::Attendee;
use crate::ui::messages::{header, info};
use crate::utils::colors::{GREEN, RESET, color_for_ratio};
use crate::utils::table::{Column, Table};

pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::List {
        search,
        checked,
        pending,
    } = cmd
    {
        let repo = Repository::open(&cfg.database)?;
        let session = repo.active_session()?;
        let stats = session.stats();

        header(&session.name);
        println!(
            "Total {}  |  {}Checked in {}{}  |  Not checked in {}\n",
            stats.total,
            color_for_ratio(stats.checked_in, stats.total),
            stats.checked_in,
            RESET,
            stats.not_checked_in
        );

        let term = search.as_deref().unwrap_or("");
        let rows: Vec<&Attendee> = session
            .search(term)
            .filter(|a| !*checked || a.checked_in)
            .filter(|a| !*pending || !a.checked_in)
            .collect();

        if rows.is_empty() {
            info("No attendees match.");
            return Ok(());
        }

        print_roster(&rows);
    }
    Ok(())
}

fn print_roster(rows: &[&Attendee]) {
    let mut table = Table::new(vec![
        Column::new("#"),
        Column::new("IN"),
        Column::new("NAME"),
        Column::new("AFFILIATION"),
        Column::new("PHONE"),
        Column::new("VEHICLE"),
        Column::new("EVENT"),
        Column::new("CHECKED IN AT"),
    ]);

    for (i, a) in rows.iter().enumerate() {
        table.add_row(vec![
            (i + 1).to_string(),
            if a.checked_in { "O" } else { "X" }.to_string(),
            a.name.clone(),
            a.affiliation.clone(),
            a.phone.clone(),
            a.vehicle.clone(),
            a.event_name.clone().unwrap_or_default(),
            a.checked_in_at_local().unwrap_or_else(|| "--".into()),
        ]);
    }

    // header + separator, then one line per attendee
    let rendered = table.render();
    let mut lines = rendered.lines();
    for line in lines.by_ref().take(2) {
        println!("{}", line);
    }
    for (line, a) in lines.zip(rows) {
        if a.checked_in {
            println!("{GREEN}{line}{RESET}");
        } else {
            println!("{line}");
        }
    }
}
