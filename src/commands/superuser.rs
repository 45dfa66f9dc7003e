//! Superuser command - first-run setup from the command line.

use crate::cli::args::{SuperUserAction, SuperUserArgs};
use crate::config::{Config, SUPERUSER_CREATED_BY_CLI};
use crate::errors::{AppError, AppResult};
use crate::infra::Database;
use crate::services::{ServiceContainer, Services, SuperUserSignup};

/// Execute the superuser command
pub async fn execute(args: SuperUserArgs, config: Config) -> AppResult<()> {
    let db = Database::connect(&config)
        .await
        .map_err(|e| AppError::internal(format!("Database connection failed: {}", e)))?;
    let services = Services::from_connection(db.get_connection(), config);

    match args.action {
        SuperUserAction::Check => {
            let status = services.superusers().status().await?;
            if status.exists {
                println!("Superuser exists ({} active)", status.count);
            } else {
                println!("No superuser yet - run `superuser create` to finish setup");
            }
        }
        SuperUserAction::Create {
            name,
            email,
            password,
        } => {
            let session = services
                .auth()
                .create_superuser(SuperUserSignup {
                    name,
                    email,
                    password,
                    created_by: SUPERUSER_CREATED_BY_CLI.to_string(),
                })
                .await?;
            println!("Superuser {} created ({})", session.email, session.id);
        }
    }

    Ok(())
}
