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
                    .as_enum(TeamStatus::Table)
                    .values(vec![
                        TeamStatus::Forming,
                        TeamStatus::Active,
                        TeamStatus::Complete,
                        TeamStatus::Finished,
                    ])
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Teams::Table)
                    .if_not_exists()
                    .col(pk_uuid(Teams::Id))
                    .col(uuid(Teams::EventId).not_null())
                    .col(string(Teams::Name).not_null())
                    .col(uuid_null(Teams::CaptainId))
                    .col(integer(Teams::MaxVolunteers).not_null())
                    .col(
                        enumeration(
                            Teams::Status,
                            TeamStatus::Table,
                            vec![
                                TeamStatus::Forming,
                                TeamStatus::Active,
                                TeamStatus::Complete,
                                TeamStatus::Finished,
                            ],
                        )
                        .default("forming"),
                    )
                    .col(
                        timestamp_with_time_zone(Teams::CreatedAt)
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        timestamp_with_time_zone(Teams::UpdatedAt)
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_foreign_key(
                ForeignKey::create()
                    .name("fk_teams_event_id")
                    .from(Teams::Table, Teams::EventId)
                    .to(Events::Table, Events::Id)
                    .on_delete(ForeignKeyAction::Cascade)
                    .to_owned(),
            )
            .await?;

        manager
            .create_foreign_key(
                ForeignKey::create()
                    .name("fk_teams_captain_id")
                    .from(Teams::Table, Teams::CaptainId)
                    .to(Users::Table, Users::Id)
                    .on_delete(ForeignKeyAction::SetNull)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_teams_event_id")
                    .table(Teams::Table)
                    .col(Teams::EventId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Teams::Table).to_owned())
            .await?;

        manager
            .drop_type(Type::drop().name(TeamStatus::Table).to_owned())
            .await?;

        Ok(())
    }
}

#[derive(DeriveIden)]
pub enum Teams {
    Table,
    Id,
    EventId,
    Name,
    CaptainId,
    MaxVolunteers,
    Status,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
pub enum TeamStatus {
    Table,
    Forming,
    Active,
    Complete,
    Finished,
}
