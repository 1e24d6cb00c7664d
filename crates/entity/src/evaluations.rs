//! Evaluations Entity
//!
//! Cross-role evaluations stored in one table with a `kind` discriminant.
//! The three shapes carry different sub-rating columns; unused columns are
//! null for a given kind. At most one evaluation exists per
//! (subject, rater, event) regardless of kind.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "evaluations")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false, column_type = "Uuid")]
    pub id:              uuid::Uuid,
    pub kind:            EvaluationKind,
    pub subject_id:      uuid::Uuid,
    pub rater_id:        uuid::Uuid,
    pub event_id:        uuid::Uuid,
    pub team_id:         uuid::Uuid,
    pub overall_rating:  i16,
    pub punctuality:     Option<i16>,
    pub teamwork:        Option<i16>,
    pub leadership:      Option<i16>,
    pub organization:    Option<i16>,
    pub support:         Option<i16>,
    pub communication:   Option<i16>,
    pub would_work_again: Option<bool>,
    pub would_recommend: Option<bool>,
    pub comments:        Option<String>,
    pub created_at:      chrono::DateTime<chrono::Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::events::Entity",
        from = "Column::EventId",
        to = "super::events::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Event,
    #[sea_orm(
        belongs_to = "super::teams::Entity",
        from = "Column::TeamId",
        to = "super::teams::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Team,
}

impl Related<super::events::Entity> for Entity {
    fn to() -> RelationDef { Relation::Event.def() }
}

impl Related<super::teams::Entity> for Entity {
    fn to() -> RelationDef { Relation::Team.def() }
}

impl ActiveModelBehavior for ActiveModel {}

/// Evaluation shape discriminant
#[derive(Copy, Clone, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "evaluation_kind")]
pub enum EvaluationKind {
    /// A captain rates one of their volunteers
    #[sea_orm(string_value = "volunteer_by_captain")]
    VolunteerByCaptain,
    /// An admin rates a team's captain
    #[sea_orm(string_value = "captain_by_admin")]
    CaptainByAdmin,
    /// A volunteer rates their own captain
    #[sea_orm(string_value = "captain_by_volunteer")]
    CaptainByVolunteer,
}

impl std::fmt::Display for EvaluationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EvaluationKind::VolunteerByCaptain => write!(f, "volunteer_by_captain"),
            EvaluationKind::CaptainByAdmin => write!(f, "captain_by_admin"),
            EvaluationKind::CaptainByVolunteer => write!(f, "captain_by_volunteer"),
        }
    }
}
