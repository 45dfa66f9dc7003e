//! CLI argument definitions.
//!
//! Uses clap derive macros for type-safe argument parsing.

use clap::{Parser, Subcommand};

use crate::config::{DEFAULT_SERVER_HOST, DEFAULT_SERVER_PORT};

/// Storefront API - accounts, superuser bootstrap and sales reporting
#[derive(Parser, Debug)]
#[command(name = "storefront-api")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the HTTP server
    Serve(ServeArgs),

    /// Run database migrations
    Migrate(MigrateArgs),

    /// Inspect or create the superuser
    Superuser(SuperUserArgs),
}

/// Arguments for the serve command
#[derive(Parser, Debug)]
pub struct ServeArgs {
    /// Host to bind to
    #[arg(short = 'H', long, default_value = DEFAULT_SERVER_HOST, env = "SERVER_HOST")]
    pub host: String,

    /// Port to listen on
    #[arg(short, long, default_value_t = DEFAULT_SERVER_PORT, env = "SERVER_PORT")]
    pub port: u16,
}

/// Arguments for the migrate command
#[derive(Parser, Debug)]
pub struct MigrateArgs {
    #[command(subcommand)]
    pub action: MigrateAction,
}

/// Migration actions
#[derive(Subcommand, Debug)]
pub enum MigrateAction {
    /// Run pending migrations
    Up,
    /// Rollback last migration
    Down,
    /// Show migration status
    Status,
    /// Reset and re-run all migrations
    Fresh,
}

/// Arguments for the superuser command
#[derive(Parser, Debug)]
pub struct SuperUserArgs {
    #[command(subcommand)]
    pub action: SuperUserAction,
}

#[derive(Subcommand, Debug)]
pub enum SuperUserAction {
    /// Report whether the superuser exists
    Check,
    /// Create the superuser (fails if one already exists)
    Create {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        /// Read from SUPERUSER_PASSWORD when omitted
        #[arg(long, env = "SUPERUSER_PASSWORD", hide_env_values = true)]
        password: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_superuser_create() {
        let cli = Cli::try_parse_from([
            "storefront-api",
            "superuser",
            "create",
            "--name",
            "Owner",
            "--email",
            "owner@example.com",
            "--password",
            "hunter22",
        ])
        .unwrap();

        match cli.command {
            Commands::Superuser(SuperUserArgs {
                action: SuperUserAction::Create { name, email, password },
            }) => {
                assert_eq!(name, "Owner");
                assert_eq!(email, "owner@example.com");
                assert_eq!(password, "hunter22");
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_parse_migrate_status() {
        let cli = Cli::try_parse_from(["storefront-api", "-v", "migrate", "status"]).unwrap();
        assert!(cli.verbose);
        assert!(matches!(
            cli.command,
            Commands::Migrate(MigrateArgs {
                action: MigrateAction::Status
            })
        ));
    }

    #[test]
    fn test_cli_definition_is_valid() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
