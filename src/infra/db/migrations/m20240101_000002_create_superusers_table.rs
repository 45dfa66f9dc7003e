//! Migration: Create superusers table.
//!
//! A partial unique index on `is_active` lets the database reject a second
//! active superuser even if two bootstrap requests race.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

const SINGLE_ACTIVE_INDEX: &str = "idx_superusers_single_active";

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(SuperUsers::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(SuperUsers::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(SuperUsers::Name).string().not_null())
                    .col(
                        ColumnDef::new(SuperUsers::Email)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(SuperUsers::PasswordHash).string().not_null())
                    .col(
                        ColumnDef::new(SuperUsers::IsActive)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(SuperUsers::CreatedBy)
                            .string()
                            .not_null()
                            .default("system"),
                    )
                    .col(
                        ColumnDef::new(SuperUsers::LastLogin)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(SuperUsers::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(SuperUsers::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        // sea-query has no builder for partial indexes
        manager
            .get_connection()
            .execute_unprepared(&format!(
                "CREATE UNIQUE INDEX IF NOT EXISTS {SINGLE_ACTIVE_INDEX} \
                 ON superusers (is_active) WHERE is_active"
            ))
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .get_connection()
            .execute_unprepared(&format!("DROP INDEX IF EXISTS {SINGLE_ACTIVE_INDEX}"))
            .await?;

        manager
            .drop_table(Table::drop().table(SuperUsers::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum SuperUsers {
    #[iden = "superusers"]
    Table,
    Id,
    Name,
    Email,
    PasswordHash,
    IsActive,
    CreatedBy,
    LastLogin,
    CreatedAt,
    UpdatedAt,
}
