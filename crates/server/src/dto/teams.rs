//! # Team and Membership Data Transfer Objects

use engine::ConsistencyWarning;
use entity::{team_members, teams};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Response for a team
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TeamResponse {
    pub id:             Uuid,
    pub event_id:       Uuid,
    pub name:           String,
    pub captain_id:     Option<Uuid>,
    pub max_volunteers: i32,
    pub status:         String,
    pub created_at:     String,
    pub updated_at:     String,
}

impl From<teams::Model> for TeamResponse {
    fn from(team: teams::Model) -> Self {
        Self {
            id:             team.id,
            event_id:       team.event_id,
            name:           team.name,
            captain_id:     team.captain_id,
            max_volunteers: team.max_volunteers,
            status:         team.status.to_string(),
            created_at:     team.created_at.to_rfc3339(),
            updated_at:     team.updated_at.to_rfc3339(),
        }
    }
}

/// Response for a team member row
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TeamMemberResponse {
    pub id:        Uuid,
    pub team_id:   Uuid,
    pub user_id:   Uuid,
    pub role:      String,
    pub status:    String,
    pub joined_at: String,
    pub left_at:   Option<String>,
}

impl From<team_members::Model> for TeamMemberResponse {
    fn from(member: team_members::Model) -> Self {
        Self {
            id:        member.id,
            team_id:   member.team_id,
            user_id:   member.user_id,
            role:      member.role.to_string(),
            status:    member.status.to_string(),
            joined_at: member.joined_at.to_rfc3339(),
            left_at:   member.left_at.map(|t| t.to_rfc3339()),
        }
    }
}

/// Team detail: the team, its roster, and any detected captain
/// inconsistency. The warning is informational and never auto-repaired.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TeamDetailResponse {
    pub success: bool,
    pub team:    TeamResponse,
    pub members: Vec<TeamMemberResponse>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<ConsistencyWarning>,
}

/// Request to create a team under an event
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Validate)]
pub struct CreateTeamRequest {
    #[validate(length(min = 1, max = 255, message = "Name must be between 1 and 255 characters"))]
    pub name:           String,
    #[validate(range(min = 1, message = "max_volunteers must be at least 1"))]
    pub max_volunteers: i32,
}

/// Request to update a team
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize, Validate)]
pub struct UpdateTeamRequest {
    #[validate(length(min = 1, max = 255, message = "Name must be between 1 and 255 characters"))]
    pub name:           Option<String>,
    #[validate(range(min = 1, message = "max_volunteers must be at least 1"))]
    pub max_volunteers: Option<i32>,
    pub status:         Option<entity::teams::TeamStatus>,
}

/// Request naming a user for a roster or captain operation
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct MemberRequest {
    pub user_id: Uuid,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_team_request_validation() {
        let valid = CreateTeamRequest {
            name:           "North gate".to_string(),
            max_volunteers: 5,
        };
        assert!(valid.validate().is_ok());

        let invalid = CreateTeamRequest {
            name:           String::new(),
            max_volunteers: 0,
        };
        assert!(invalid.validate().is_err());
    }
}
