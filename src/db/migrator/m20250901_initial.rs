use crate::entities::prelude::*;
use crate::entities::{calendar_events, external_credentials};
use sea_orm_migration::prelude::*;
use sea_orm_migration::sea_orm::Schema;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let backend = manager.get_database_backend();
        let schema = Schema::new(backend);

        manager
            .create_table(
                schema
                    .create_table_from_entity(Users)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                schema
                    .create_table_from_entity(CalendarEvents)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                schema
                    .create_table_from_entity(ExternalCredentials)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                schema
                    .create_table_from_entity(UserSettings)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        // Dedup key for machine-sourced events. SQLite treats NULLs as
        // distinct, so manual events (no external id) are unaffected.
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_events_dedup_external")
                    .table(CalendarEvents)
                    .col(calendar_events::Column::UserId)
                    .col(calendar_events::Column::Source)
                    .col(calendar_events::Column::SourceExternalId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_events_user_due")
                    .table(CalendarEvents)
                    .col(calendar_events::Column::UserId)
                    .col(calendar_events::Column::DueDate)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_credentials_user_source")
                    .table(ExternalCredentials)
                    .col(external_credentials::Column::UserId)
                    .col(external_credentials::Column::SourceType)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(UserSettings).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(ExternalCredentials).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(CalendarEvents).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Users).to_owned())
            .await?;

        Ok(())
    }
}
