//! Team Members Entity
//!
//! The mapping of a person to a team with their role-in-team. Role-in-team is
//! local leadership within one team and is independent of the user's global
//! role. At most one row per team may hold (captain, active).

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "team_members")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false, column_type = "Uuid")]
    pub id:         uuid::Uuid,
    pub team_id:    uuid::Uuid,
    pub user_id:    uuid::Uuid,
    pub role:       TeamRole,
    pub status:     MemberStatus,
    pub joined_at:  chrono::DateTime<chrono::Utc>,
    pub left_at:    Option<chrono::DateTime<chrono::Utc>>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::teams::Entity",
        from = "Column::TeamId",
        to = "super::teams::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Team,
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::UserId",
        to = "super::users::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    User,
}

impl Related<super::teams::Entity> for Entity {
    fn to() -> RelationDef { Relation::Team.def() }
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef { Relation::User.def() }
}

impl ActiveModelBehavior for ActiveModel {}

/// Role-in-team enumeration
#[derive(Copy, Clone, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "team_role")]
pub enum TeamRole {
    /// Designated team leader; assigned only through the role manager
    #[sea_orm(string_value = "captain")]
    Captain,
    /// Regular seat
    #[sea_orm(string_value = "volunteer")]
    Volunteer,
}

impl std::fmt::Display for TeamRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TeamRole::Captain => write!(f, "captain"),
            TeamRole::Volunteer => write!(f, "volunteer"),
        }
    }
}

/// Membership status enumeration
#[derive(Copy, Clone, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "member_status")]
pub enum MemberStatus {
    /// Holds a seat; counts toward team capacity and occupancy
    #[sea_orm(string_value = "active")]
    Active,
    /// Left voluntarily or deactivated by finalization
    #[sea_orm(string_value = "inactive")]
    Inactive,
    /// Removed by a privileged caller
    #[sea_orm(string_value = "removed")]
    Removed,
}

impl std::fmt::Display for MemberStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MemberStatus::Active => write!(f, "active"),
            MemberStatus::Inactive => write!(f, "inactive"),
            MemberStatus::Removed => write!(f, "removed"),
        }
    }
}
