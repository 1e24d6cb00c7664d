//! Users Entity
//!
//! Represents registered people with a single global role that is the source
//! of truth for system-wide permissions. Accounts are soft-deleted: the row
//! stays, `is_active` drops to false and the email is tombstoned.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false, column_type = "Uuid")]
    pub id:           uuid::Uuid,
    pub email:        String,
    pub display_name: String,
    pub role:         UserRole,
    pub is_active:    bool,
    pub avatar_url:   Option<String>,
    pub postal_code:  Option<String>,
    pub street:       Option<String>,
    pub city:         Option<String>,
    pub region:       Option<String>,
    pub created_at:   chrono::DateTime<chrono::Utc>,
    pub updated_at:   chrono::DateTime<chrono::Utc>,
    pub deleted_at:   Option<chrono::DateTime<chrono::Utc>>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::team_members::Entity")]
    TeamMembers,
    #[sea_orm(has_many = "super::event_registrations::Entity")]
    EventRegistrations,
}

impl Related<super::team_members::Entity> for Entity {
    fn to() -> RelationDef { Relation::TeamMembers.def() }
}

impl Related<super::event_registrations::Entity> for Entity {
    fn to() -> RelationDef { Relation::EventRegistrations.def() }
}

impl ActiveModelBehavior for ActiveModel {}

/// Global user role enumeration
#[derive(Copy, Clone, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "user_role")]
pub enum UserRole {
    /// Default role for every registered person
    #[sea_orm(string_value = "volunteer")]
    Volunteer,
    /// May lead teams and evaluate their volunteers
    #[sea_orm(string_value = "captain")]
    Captain,
    /// Full administrative control
    #[sea_orm(string_value = "admin")]
    Admin,
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UserRole::Volunteer => write!(f, "volunteer"),
            UserRole::Captain => write!(f, "captain"),
            UserRole::Admin => write!(f, "admin"),
        }
    }
}
