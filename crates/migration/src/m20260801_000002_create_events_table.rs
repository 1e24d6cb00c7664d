use sea_orm_migration::{prelude::*, schema::*, sea_query::extension::postgres::Type};

use crate::m20260801_000001_create_users_table::Users;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_type(
                Type::create()
                    .as_enum(EventStatus::Table)
                    .values(vec![
                        EventStatus::Draft,
                        EventStatus::Published,
                        EventStatus::InProgress,
                        EventStatus::Completed,
                        EventStatus::Cancelled,
                    ])
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Events::Table)
                    .if_not_exists()
                    .col(pk_uuid(Events::Id))
                    .col(string(Events::Title).not_null())
                    .col(text_null(Events::Description))
                    .col(date(Events::EventDate).not_null())
                    .col(
                        enumeration(
                            Events::Status,
                            EventStatus::Table,
                            vec![
                                EventStatus::Draft,
                                EventStatus::Published,
                                EventStatus::InProgress,
                                EventStatus::Completed,
                                EventStatus::Cancelled,
                            ],
                        )
                        .default("draft"),
                    )
                    .col(integer(Events::MaxVolunteers).not_null())
                    .col(uuid(Events::CreatedBy).not_null())
                    .col(
                        timestamp_with_time_zone(Events::CreatedAt)
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        timestamp_with_time_zone(Events::UpdatedAt)
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_foreign_key(
                ForeignKey::create()
                    .name("fk_events_created_by")
                    .from(Events::Table, Events::CreatedBy)
                    .to(Users::Table, Users::Id)
                    .on_delete(ForeignKeyAction::Restrict)
                    .to_owned(),
            )
            .await?;

        // The lazy finalization sweep scans by status and date.
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_events_status_date")
                    .table(Events::Table)
                    .col(Events::Status)
                    .col(Events::EventDate)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Events::Table).to_owned())
            .await?;

        manager
            .drop_type(Type::drop().name(EventStatus::Table).to_owned())
            .await?;

        Ok(())
    }
}

#[derive(DeriveIden)]
pub enum Events {
    Table,
    Id,
    Title,
    Description,
    EventDate,
    Status,
    MaxVolunteers,
    CreatedBy,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
pub enum EventStatus {
    Table,
    Draft,
    Published,
    InProgress,
    Completed,
    Cancelled,
}
