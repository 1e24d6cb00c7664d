//! Event Registrations Entity
//!
//! A direct sign-up for an event, one logical row per (event, user). Only
//! `pending` and `confirmed` registrations count toward occupancy; a
//! registration becomes `transferred` once its holder is seated in a team.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "event_registrations")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false, column_type = "Uuid")]
    pub id:         uuid::Uuid,
    pub event_id:   uuid::Uuid,
    pub user_id:    uuid::Uuid,
    pub status:     RegistrationStatus,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
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
        belongs_to = "super::users::Entity",
        from = "Column::UserId",
        to = "super::users::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    User,
}

impl Related<super::events::Entity> for Entity {
    fn to() -> RelationDef { Relation::Event.def() }
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef { Relation::User.def() }
}

impl ActiveModelBehavior for ActiveModel {}

/// Registration status enumeration
#[derive(Copy, Clone, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "registration_status")]
pub enum RegistrationStatus {
    /// Signed up, awaiting confirmation; counts toward occupancy
    #[sea_orm(string_value = "pending")]
    Pending,
    /// Confirmed attendance; counts toward occupancy
    #[sea_orm(string_value = "confirmed")]
    Confirmed,
    /// Withdrawn; does not count
    #[sea_orm(string_value = "cancelled")]
    Cancelled,
    /// Superseded by a team seat; does not count
    #[sea_orm(string_value = "transferred")]
    Transferred,
}

impl RegistrationStatus {
    /// Whether this registration contributes to event occupancy.
    #[must_use]
    pub fn counts_toward_occupancy(&self) -> bool {
        matches!(self, RegistrationStatus::Pending | RegistrationStatus::Confirmed)
    }
}

impl std::fmt::Display for RegistrationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RegistrationStatus::Pending => write!(f, "pending"),
            RegistrationStatus::Confirmed => write!(f, "confirmed"),
            RegistrationStatus::Cancelled => write!(f, "cancelled"),
            RegistrationStatus::Transferred => write!(f, "transferred"),
        }
    }
}
