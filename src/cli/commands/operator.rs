use crate::cli::parser::{Cli, Commands, OperatorAction};
use crate::cli::prompt::{authorize, read_value};
use crate::config::Config;
use crate::core::auth::{self, Authorizer};
use crate::db::repository::Repository;
use crate::errors::{AppError, AppResult};
use crate::models::operator::{Permission, Role};
use crate::ui::messages::{header, info, success};
use crate::utils::table::{Column, Table};

pub fn handle(cli: &Cli, cfg: &Config) -> AppResult<()> {
    let Commands::Operator { action } = &cli.command else {
        return Ok(());
    };

    let mut repo = Repository::open(&cfg.database)?;

    match action {
        OperatorAction::Add {
            name,
            role,
            new_passcode,
        } => {
            let role = Role::from_code(role).ok_or_else(|| AppError::InvalidRole(role.clone()))?;

            // the very first operator is registered without credentials
            let registered_by = if Authorizer::new(&repo).is_bootstrap()? {
                if role != Role::Admin {
                    return Err(AppError::Unauthorized(
                        "the first operator must be an admin".into(),
                    ));
                }
                "bootstrap".to_string()
            } else {
                authorize(cli, &repo, Permission::ManageRoster)?.operator
            };

            let passcode = match new_passcode {
                Some(p) => p.clone(),
                None => read_value(&format!("New passcode for {}", name))?,
            };

            let op = auth::new_operator(name, role, &passcode)?;
            repo.insert_operator(&op)?;
            repo.audit(
                "operator_add",
                &op.name,
                &format!("role={} by {}", op.role.code(), registered_by),
            );
            success(format!("Operator '{}' registered as {}.", op.name, op.role.code()));
        }

        OperatorAction::List => {
            let ops = repo.list_operators()?;
            if ops.is_empty() {
                info("No operators registered. Add the first admin with `operator add <name> --role admin`.");
                return Ok(());
            }

            header("Operators");
            let mut table = Table::new(vec![
                Column::new("NAME"),
                Column::new("ROLE"),
                Column::new("CREATED"),
            ]);
            for op in ops {
                table.add_row(vec![op.name, op.role.code().to_string(), op.created_at]);
            }
            print!("{}", table.render());
        }
    }

    Ok(())
}
