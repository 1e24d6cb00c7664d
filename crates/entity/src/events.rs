//! Events Entity
//!
//! A published event moves through `draft -> published -> in_progress ->
//! completed`, with `cancelled` reachable from any non-terminal state. Once
//! an event is `completed` its teams, members and registrations are history
//! and may not be structurally mutated.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "events")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false, column_type = "Uuid")]
    pub id:             uuid::Uuid,
    pub title:          String,
    pub description:    Option<String>,
    pub event_date:     chrono::NaiveDate,
    pub status:         EventStatus,
    pub max_volunteers: i32,
    pub created_by:     uuid::Uuid,
    pub created_at:     chrono::DateTime<chrono::Utc>,
    pub updated_at:     chrono::DateTime<chrono::Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::teams::Entity")]
    Teams,
    #[sea_orm(has_many = "super::event_registrations::Entity")]
    EventRegistrations,
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::CreatedBy",
        to = "super::users::Column::Id",
        on_update = "NoAction",
        on_delete = "Restrict"
    )]
    Creator,
}

impl Related<super::teams::Entity> for Entity {
    fn to() -> RelationDef { Relation::Teams.def() }
}

impl Related<super::event_registrations::Entity> for Entity {
    fn to() -> RelationDef { Relation::EventRegistrations.def() }
}

impl ActiveModelBehavior for ActiveModel {}

/// Event lifecycle status enumeration
#[derive(Copy, Clone, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "event_status")]
pub enum EventStatus {
    /// Visible only to its creator and admins
    #[sea_orm(string_value = "draft")]
    Draft,
    /// Open for registration and team building
    #[sea_orm(string_value = "published")]
    Published,
    /// The gathering is underway
    #[sea_orm(string_value = "in_progress")]
    InProgress,
    /// Terminal; structure is frozen
    #[sea_orm(string_value = "completed")]
    Completed,
    /// Terminal; called off before completion
    #[sea_orm(string_value = "cancelled")]
    Cancelled,
}

impl EventStatus {
    /// Terminal states admit no further transitions.
    #[must_use]
    pub fn is_terminal(&self) -> bool { matches!(self, EventStatus::Completed | EventStatus::Cancelled) }
}

impl std::fmt::Display for EventStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EventStatus::Draft => write!(f, "draft"),
            EventStatus::Published => write!(f, "published"),
            EventStatus::InProgress => write!(f, "in_progress"),
            EventStatus::Completed => write!(f, "completed"),
            EventStatus::Cancelled => write!(f, "cancelled"),
        }
    }
}
