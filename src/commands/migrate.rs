//! Migrate command - schema management from the command line.

use crate::cli::args::{MigrateAction, MigrateArgs};
use crate::config::Config;
use crate::errors::AppResult;
use crate::infra::{Database, Persistence, UnitOfWork};

/// Execute the migrate command
pub async fn execute(args: MigrateArgs, config: Config) -> AppResult<()> {
    // Schema changes are explicit here, so open without auto-migrating
    let db = Database::open(&config).await?;

    match args.action {
        MigrateAction::Up => {
            db.run_migrations().await?;
            tracing::info!("Migrations applied");
            report_bootstrap(&db).await?;
        }
        MigrateAction::Down => {
            db.rollback_migration().await?;
            tracing::info!("Rolled back the last migration");
        }
        MigrateAction::Status => {
            let states = db.migration_status().await?;
            let pending = states.iter().filter(|s| !s.applied).count();
            for state in &states {
                println!(
                    "{:<50} {}",
                    state.name,
                    if state.applied { "applied" } else { "pending" }
                );
            }
            println!("{} of {} pending", pending, states.len());
        }
        MigrateAction::Fresh => {
            tracing::warn!("Dropping all tables, including users and the superuser");
            db.fresh_migrations().await?;
            tracing::info!("Schema recreated");
            report_bootstrap(&db).await?;
        }
    }

    Ok(())
}

/// After a schema change, remind the operator when setup is still open.
async fn report_bootstrap(db: &Database) -> AppResult<()> {
    let store = Persistence::new(db.get_connection());
    if store.superusers().count_active().await? == 0 {
        tracing::warn!("No superuser yet: run `superuser create` or POST /superuser/create");
    }
    Ok(())
}
