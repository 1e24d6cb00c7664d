use sea_orm_migration::{prelude::*, schema::*, sea_query::extension::postgres::Type};

use crate::m20260801_000001_create_users_table::Users;
use crate::m20260801_000002_create_events_table::Events;
use crate::m20260801_000004_create_teams_table::Teams;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_type(
                Type::create()
                    .as_enum(EvaluationKind::Table)
                    .values(vec![
                        EvaluationKind::VolunteerByCaptain,
                        EvaluationKind::CaptainByAdmin,
                        EvaluationKind::CaptainByVolunteer,
                    ])
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Evaluations::Table)
                    .if_not_exists()
                    .col(pk_uuid(Evaluations::Id))
                    .col(enumeration(
                        Evaluations::Kind,
                        EvaluationKind::Table,
                        vec![
                            EvaluationKind::VolunteerByCaptain,
                            EvaluationKind::CaptainByAdmin,
                            EvaluationKind::CaptainByVolunteer,
                        ],
                    ))
                    .col(uuid(Evaluations::SubjectId).not_null())
                    .col(uuid(Evaluations::RaterId).not_null())
                    .col(uuid(Evaluations::EventId).not_null())
                    .col(uuid(Evaluations::TeamId).not_null())
                    .col(small_integer(Evaluations::OverallRating).not_null())
                    .col(small_integer_null(Evaluations::Punctuality))
                    .col(small_integer_null(Evaluations::Teamwork))
                    .col(small_integer_null(Evaluations::Leadership))
                    .col(small_integer_null(Evaluations::Organization))
                    .col(small_integer_null(Evaluations::Support))
                    .col(small_integer_null(Evaluations::Communication))
                    .col(boolean_null(Evaluations::WouldWorkAgain))
                    .col(boolean_null(Evaluations::WouldRecommend))
                    .col(text_null(Evaluations::Comments))
                    .col(
                        timestamp_with_time_zone(Evaluations::CreatedAt)
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        for (name, from, to_table, to_col) in [
            ("fk_evaluations_subject_id", Evaluations::SubjectId, Users::Table.into_iden(), Users::Id.into_iden()),
            ("fk_evaluations_rater_id", Evaluations::RaterId, Users::Table.into_iden(), Users::Id.into_iden()),
            ("fk_evaluations_event_id", Evaluations::EventId, Events::Table.into_iden(), Events::Id.into_iden()),
            ("fk_evaluations_team_id", Evaluations::TeamId, Teams::Table.into_iden(), Teams::Id.into_iden()),
        ] {
            manager
                .create_foreign_key(
                    ForeignKey::create()
                        .name(name)
                        .from(Evaluations::Table, from)
                        .to(to_table, to_col)
                        .on_delete(ForeignKeyAction::Cascade)
                        .to_owned(),
                )
                .await?;
        }

        // Re-evaluation is rejected, never overwritten.
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_evaluations_subject_rater_event_unique")
                    .table(Evaluations::Table)
                    .col(Evaluations::SubjectId)
                    .col(Evaluations::RaterId)
                    .col(Evaluations::EventId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_evaluations_subject_id")
                    .table(Evaluations::Table)
                    .col(Evaluations::SubjectId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Evaluations::Table).to_owned())
            .await?;

        manager
            .drop_type(Type::drop().name(EvaluationKind::Table).to_owned())
            .await?;

        Ok(())
    }
}

#[derive(DeriveIden)]
pub enum Evaluations {
    Table,
    Id,
    Kind,
    SubjectId,
    RaterId,
    EventId,
    TeamId,
    OverallRating,
    Punctuality,
    Teamwork,
    Leadership,
    Organization,
    Support,
    Communication,
    WouldWorkAgain,
    WouldRecommend,
    Comments,
    CreatedAt,
}

#[derive(DeriveIden)]
pub enum EvaluationKind {
    Table,
    VolunteerByCaptain,
    CaptainByAdmin,
    CaptainByVolunteer,
}
