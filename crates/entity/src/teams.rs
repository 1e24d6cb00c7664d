//! Teams Entity
//!
//! A staffed unit under one event. `captain_id` is a denormalized pointer
//! that must always match the team's single active captain-role member when
//! one exists; a mismatch is surfaced as a consistency warning, never
//! silently repaired.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "teams")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false, column_type = "Uuid")]
    pub id:             uuid::Uuid,
    pub event_id:       uuid::Uuid,
    pub name:           String,
    pub captain_id:     Option<uuid::Uuid>,
    pub max_volunteers: i32,
    pub status:         TeamStatus,
    pub created_at:     chrono::DateTime<chrono::Utc>,
    pub updated_at:     chrono::DateTime<chrono::Utc>,
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
    #[sea_orm(has_many = "super::team_members::Entity")]
    TeamMembers,
}

impl Related<super::events::Entity> for Entity {
    fn to() -> RelationDef { Relation::Event.def() }
}

impl Related<super::team_members::Entity> for Entity {
    fn to() -> RelationDef { Relation::TeamMembers.def() }
}

impl ActiveModelBehavior for ActiveModel {}

/// Team status enumeration
#[derive(Copy, Clone, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "team_status")]
pub enum TeamStatus {
    /// Recruiting members
    #[sea_orm(string_value = "forming")]
    Forming,
    /// Fully staffed and operating
    #[sea_orm(string_value = "active")]
    Active,
    /// Roster closed ahead of the event
    #[sea_orm(string_value = "complete")]
    Complete,
    /// The owning event has been finalized
    #[sea_orm(string_value = "finished")]
    Finished,
}

impl TeamStatus {
    /// Teams still open for leadership, used when deciding whether a captain
    /// may be demoted after an event finalizes.
    #[must_use]
    pub fn is_open(&self) -> bool { matches!(self, TeamStatus::Forming | TeamStatus::Active) }
}

impl std::fmt::Display for TeamStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TeamStatus::Forming => write!(f, "forming"),
            TeamStatus::Active => write!(f, "active"),
            TeamStatus::Complete => write!(f, "complete"),
            TeamStatus::Finished => write!(f, "finished"),
        }
    }
}
