use sea_orm_migration::{prelude::*, schema::*, sea_query::extension::postgres::Type};

use crate::m20260801_000001_create_users_table::Users;
use crate::m20260801_000002_create_events_table::Events;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_type(
                Type::create()
                    .as_enum(RegistrationStatus::Table)
                    .values(vec![
                        RegistrationStatus::Pending,
                        RegistrationStatus::Confirmed,
                        RegistrationStatus::Cancelled,
                        RegistrationStatus::Transferred,
                    ])
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(EventRegistrations::Table)
                    .if_not_exists()
                    .col(pk_uuid(EventRegistrations::Id))
                    .col(uuid(EventRegistrations::EventId).not_null())
                    .col(uuid(EventRegistrations::UserId).not_null())
                    .col(
                        enumeration(
                            EventRegistrations::Status,
                            RegistrationStatus::Table,
                            vec![
                                RegistrationStatus::Pending,
                                RegistrationStatus::Confirmed,
                                RegistrationStatus::Cancelled,
                                RegistrationStatus::Transferred,
                            ],
                        )
                        .default("pending"),
                    )
                    .col(
                        timestamp_with_time_zone(EventRegistrations::CreatedAt)
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        timestamp_with_time_zone(EventRegistrations::UpdatedAt)
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_foreign_key(
                ForeignKey::create()
                    .name("fk_event_registrations_event_id")
                    .from(EventRegistrations::Table, EventRegistrations::EventId)
                    .to(Events::Table, Events::Id)
                    .on_delete(ForeignKeyAction::Cascade)
                    .to_owned(),
            )
            .await?;

        manager
            .create_foreign_key(
                ForeignKey::create()
                    .name("fk_event_registrations_user_id")
                    .from(EventRegistrations::Table, EventRegistrations::UserId)
                    .to(Users::Table, Users::Id)
                    .on_delete(ForeignKeyAction::Cascade)
                    .to_owned(),
            )
            .await?;

        // One logical registration per (event, user).
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_event_registrations_event_user_unique")
                    .table(EventRegistrations::Table)
                    .col(EventRegistrations::EventId)
                    .col(EventRegistrations::UserId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_event_registrations_user_id")
                    .table(EventRegistrations::Table)
                    .col(EventRegistrations::UserId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(EventRegistrations::Table).to_owned())
            .await?;

        manager
            .drop_type(Type::drop().name(RegistrationStatus::Table).to_owned())
            .await?;

        Ok(())
    }
}

#[derive(DeriveIden)]
pub enum EventRegistrations {
    Table,
    Id,
    EventId,
    UserId,
    Status,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
pub enum RegistrationStatus {
    Table,
    Pending,
    Confirmed,
    Cancelled,
    Transferred,
}
