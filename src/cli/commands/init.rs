use crate::cli::parser::Cli;
use crate::config::Config;
use crate::core::auth;
use crate::db::repository::Repository;
use crate::errors::AppResult;
use crate::models::operator::Role;
use crate::ui::messages::{info, success};

/// Handle the `init` command
///
/// This initializes:
///  - the config directory and configuration file (skipped in test mode)
///  - the SQLite database with all pending migrations
///  - the first admin, when `--operator` and `--passcode` are given
pub fn handle(cli: &Cli) -> AppResult<()> {
    let db_path = Config::init_all(cli.db.clone(), cli.test)?;
    let db_path = db_path.to_string_lossy().to_string();

    info("Initializing qrcheckin…");
    if !cli.test {
        info(format!("Config file : {}", Config::config_file().display()));
    }
    info(format!("Database    : {}", db_path));

    let mut repo = Repository::open(&db_path)?;
    repo.audit("init", "", &format!("Database initialized at {}", db_path));

    if let (Some(name), Some(passcode)) = (&cli.operator, &cli.passcode)
        && repo.list_operators()?.is_empty()
    {
        let op = auth::new_operator(name, Role::Admin, passcode)?;
        repo.insert_operator(&op)?;
        repo.audit("operator_add", &op.name, "bootstrap admin");
        success(format!("Admin '{}' registered.", op.name));
    }

    success("qrcheckin initialization completed!");
    Ok(())
}
