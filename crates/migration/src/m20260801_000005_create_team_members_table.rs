use sea_orm_migration::{prelude::*, schema::*, sea_query::extension::postgres::Type};

use crate::m20260801_000001_create_users_table::Users;
use crate::m20260801_000004_create_teams_table::Teams;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_type(
                Type::create()
                    .as_enum(TeamRole::Table)
                    .values(vec![TeamRole::Captain, TeamRole::Volunteer])
                    .to_owned(),
            )
            .await?;

        manager
            .create_type(
                Type::create()
                    .as_enum(MemberStatus::Table)
                    .values(vec![MemberStatus::Active, MemberStatus::Inactive, MemberStatus::Removed])
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(TeamMembers::Table)
                    .if_not_exists()
                    .col(pk_uuid(TeamMembers::Id))
                    .col(uuid(TeamMembers::TeamId).not_null())
                    .col(uuid(TeamMembers::UserId).not_null())
                    .col(
                        enumeration(
                            TeamMembers::Role,
                            TeamRole::Table,
                            vec![TeamRole::Captain, TeamRole::Volunteer],
                        )
                        .default("volunteer"),
                    )
                    .col(
                        enumeration(
                            TeamMembers::Status,
                            MemberStatus::Table,
                            vec![MemberStatus::Active, MemberStatus::Inactive, MemberStatus::Removed],
                        )
                        .default("active"),
                    )
                    .col(
                        timestamp_with_time_zone(TeamMembers::JoinedAt)
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(timestamp_with_time_zone_null(TeamMembers::LeftAt))
                    .col(
                        timestamp_with_time_zone(TeamMembers::CreatedAt)
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        timestamp_with_time_zone(TeamMembers::UpdatedAt)
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_foreign_key(
                ForeignKey::create()
                    .name("fk_team_members_team_id")
                    .from(TeamMembers::Table, TeamMembers::TeamId)
                    .to(Teams::Table, Teams::Id)
                    .on_delete(ForeignKeyAction::Cascade)
                    .to_owned(),
            )
            .await?;

        manager
            .create_foreign_key(
                ForeignKey::create()
                    .name("fk_team_members_user_id")
                    .from(TeamMembers::Table, TeamMembers::UserId)
                    .to(Users::Table, Users::Id)
                    .on_delete(ForeignKeyAction::Cascade)
                    .to_owned(),
            )
            .await?;

        // One row per person per team; rejoin reactivates the row.
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_team_members_team_user_unique")
                    .table(TeamMembers::Table)
                    .col(TeamMembers::TeamId)
                    .col(TeamMembers::UserId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_team_members_user_id")
                    .table(TeamMembers::Table)
                    .col(TeamMembers::UserId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_team_members_team_status")
                    .table(TeamMembers::Table)
                    .col(TeamMembers::TeamId)
                    .col(TeamMembers::Status)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(TeamMembers::Table).to_owned())
            .await?;

        manager
            .drop_type(Type::drop().name(MemberStatus::Table).to_owned())
            .await?;

        manager
            .drop_type(Type::drop().name(TeamRole::Table).to_owned())
            .await?;

        Ok(())
    }
}

#[derive(DeriveIden)]
pub enum TeamMembers {
    Table,
    Id,
    TeamId,
    UserId,
    Role,
    Status,
    JoinedAt,
    LeftAt,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
pub enum TeamRole {
    Table,
    Captain,
    Volunteer,
}

#[derive(DeriveIden)]
pub enum MemberStatus {
    Table,
    Active,
    Inactive,
    Removed,
}
