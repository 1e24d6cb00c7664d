//! # Team and Roster Handlers

use axum::Json;
use engine::{external, lifecycle, Actor};
use entity::{team_members, TeamMembers, Teams};
use error::{AppError, Result};
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter};
use uuid::Uuid;
use validator::Validate;

use crate::dto::teams::{
    CreateTeamRequest,
    MemberRequest,
    TeamDetailResponse,
    TeamMemberResponse,
    TeamResponse,
    UpdateTeamRequest,
};
use crate::dto::SuccessResponse;
use crate::AppState;

pub async fn create_team_inner(
    state: &AppState,
    actor: &Actor,
    event_id: Uuid,
    req: CreateTeamRequest,
) -> Result<Json<TeamResponse>> {
    req.validate()?;
    let team = state
        .lifecycle()
        .create_team(
            actor,
            event_id,
            lifecycle::NewTeam {
                name:           req.name,
                max_volunteers: req.max_volunteers,
            },
        )
        .await?;
    Ok(Json(TeamResponse::from(team)))
}

/// Team detail with roster. A captain-pointer mismatch is reported in the
/// response and logged, never silently repaired.
pub async fn get_team_inner(state: &AppState, _actor: &Actor, team_id: Uuid) -> Result<Json<TeamDetailResponse>> {
    let team = Teams::find_by_id(team_id)
        .one(&*state.db)
        .await?
        .ok_or_else(|| AppError::not_found("Team not found"))?;
    let members = TeamMembers::find()
        .filter(team_members::Column::TeamId.eq(team_id))
        .all(&*state.db)
        .await?;
    let warning = state.roles().team_consistency(team_id).await?;
    Ok(Json(TeamDetailResponse {
        success: true,
        team: TeamResponse::from(team),
        members: members.into_iter().map(TeamMemberResponse::from).collect(),
        warning,
    }))
}

pub async fn update_team_inner(
    state: &AppState,
    actor: &Actor,
    team_id: Uuid,
    req: UpdateTeamRequest,
) -> Result<Json<TeamResponse>> {
    req.validate()?;
    let team = state
        .lifecycle()
        .update_team(
            actor,
            team_id,
            lifecycle::TeamPatch {
                name:           req.name,
                max_volunteers: req.max_volunteers,
                status:         req.status,
            },
        )
        .await?;
    Ok(Json(TeamResponse::from(team)))
}

pub async fn delete_team_inner(state: &AppState, actor: &Actor, team_id: Uuid) -> Result<Json<SuccessResponse>> {
    state.lifecycle().delete_team(actor, team_id).await?;
    Ok(Json(SuccessResponse::new("Team deleted")))
}

pub async fn join_team_inner(
    state: &AppState,
    actor: &Actor,
    team_id: Uuid,
    req: MemberRequest,
) -> Result<Json<TeamMemberResponse>> {
    let member = state.membership().join(actor, team_id, req.user_id).await?;
    external::notify_best_effort(
        state.notifier.as_ref(),
        member.user_id,
        "You were added to a team",
        "team_joined",
    )
    .await;
    Ok(Json(TeamMemberResponse::from(member)))
}

pub async fn leave_team_inner(
    state: &AppState,
    actor: &Actor,
    team_id: Uuid,
    user_id: Uuid,
) -> Result<Json<SuccessResponse>> {
    state.membership().leave(actor, team_id, user_id).await?;
    Ok(Json(SuccessResponse::new("Left the team")))
}

pub async fn remove_member_inner(state: &AppState, actor: &Actor, member_id: Uuid) -> Result<Json<SuccessResponse>> {
    state.membership().remove(actor, member_id).await?;
    Ok(Json(SuccessResponse::new("Member removed")))
}

pub async fn set_captain_inner(
    state: &AppState,
    actor: &Actor,
    team_id: Uuid,
    req: MemberRequest,
) -> Result<Json<TeamResponse>> {
    let team = state.roles().set_team_captain(actor, team_id, req.user_id).await?;
    Ok(Json(TeamResponse::from(team)))
}
