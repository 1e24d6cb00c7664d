//! # Role Consistency Manager
//!
//! Global role promotion/demotion and the synchronization primitive that
//! keeps a team's denormalized `captain_id` pointing at exactly one active
//! captain-role member. Global permission (User.role) and team-local
//! leadership (role_in_team) are deliberately decoupled layers: assigning a
//! team captain never silently changes a global role.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::Utc;
use entity::{
    team_members::{self, Column as MemberColumn, MemberStatus, TeamRole},
    teams::{self, Column as TeamColumn},
    users::{self, UserRole},
    TeamMembers,
    Teams,
    Users,
};
use error::{AppError, Result};
use sea_orm::{
    ActiveModelTrait,
    ColumnTrait,
    ConnectionTrait,
    DbConn,
    EntityTrait,
    QueryFilter,
    Set,
    TransactionTrait,
};
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::access::{self, Actor};
use crate::membership::guard_not_finalized;

/// A detected mismatch between `Team.captain_id` and the authoritative
/// membership roster. Surfaced to operators, never auto-repaired.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConsistencyWarning {
    pub team_id:         Uuid,
    pub captain_id:      Option<Uuid>,
    pub active_captains: Vec<Uuid>,
    pub detail:          String,
}

/// Read-time consistency check for a team's captain pointer.
///
/// The invariant only binds while an active captain-role row exists; a
/// finished team whose members were all deactivated carries no warning.
#[must_use]
pub fn captain_consistency(team: &teams::Model, members: &[team_members::Model]) -> Option<ConsistencyWarning> {
    let active_captains: Vec<Uuid> = members
        .iter()
        .filter(|m| m.role == TeamRole::Captain && m.status == MemberStatus::Active)
        .map(|m| m.user_id)
        .collect();

    if active_captains.is_empty() {
        return None;
    }
    if active_captains.len() > 1 {
        return Some(ConsistencyWarning {
            team_id:         team.id,
            captain_id:      team.captain_id,
            active_captains: active_captains.clone(),
            detail:          "Multiple active captain-role members".to_string(),
        });
    }
    if team.captain_id != Some(active_captains[0]) {
        return Some(ConsistencyWarning {
            team_id:         team.id,
            captain_id:      team.captain_id,
            active_captains: active_captains.clone(),
            detail:          "captain_id does not match the active captain-role member".to_string(),
        });
    }
    None
}

/// Demote captains of an event's teams after finalization.
///
/// Runs inside the completion cascade's transaction. A captain is spared
/// while they hold an active captain seat on a forming/active team of
/// another event; demotion decisions are per-event and independent across
/// events. Returns the number of users demoted; on repeat invocations the
/// users are already volunteers and the count is zero.
pub async fn demote_captains_after_event_finalize<C: ConnectionTrait>(conn: &C, event_id: Uuid) -> Result<usize> {
    let teams = Teams::find()
        .filter(TeamColumn::EventId.eq(event_id))
        .all(conn)
        .await?;
    if teams.is_empty() {
        return Ok(0);
    }
    let team_ids: Vec<Uuid> = teams.iter().map(|t| t.id).collect();

    // Captains may already be deactivated by the cascade, so removed rows
    // are the only ones excluded here; the denormalized pointers cover
    // teams whose roster was never materialized.
    let mut candidates: HashSet<Uuid> = teams.iter().filter_map(|t| t.captain_id).collect();
    let captain_rows = TeamMembers::find()
        .filter(MemberColumn::TeamId.is_in(team_ids.clone()))
        .filter(MemberColumn::Role.eq(TeamRole::Captain))
        .filter(MemberColumn::Status.ne(MemberStatus::Removed))
        .all(conn)
        .await?;
    candidates.extend(captain_rows.iter().map(|m| m.user_id));

    let mut demoted = 0;
    for user_id in candidates {
        let Some(user) = Users::find_by_id(user_id).one(conn).await? else {
            continue;
        };
        if user.role != UserRole::Captain {
            continue;
        }

        let elsewhere = TeamMembers::find()
            .filter(MemberColumn::UserId.eq(user_id))
            .filter(MemberColumn::Role.eq(TeamRole::Captain))
            .filter(MemberColumn::Status.eq(MemberStatus::Active))
            .filter(MemberColumn::TeamId.is_not_in(team_ids.clone()))
            .all(conn)
            .await?;
        if !elsewhere.is_empty() {
            let other_team_ids: Vec<Uuid> = elsewhere.iter().map(|m| m.team_id).collect();
            let other_teams = Teams::find()
                .filter(TeamColumn::Id.is_in(other_team_ids))
                .all(conn)
                .await?;
            if other_teams.iter().any(|t| t.status.is_open()) {
                info!(user_id = %user_id, "Captain spared from demotion; still leads an open team");
                continue;
            }
        }

        let now = Utc::now();
        let mut active: users::ActiveModel = user.into();
        active.role = Set(UserRole::Volunteer);
        active.updated_at = Set(now);
        active.update(conn).await?;
        demoted += 1;
    }

    if demoted > 0 {
        info!(event_id = %event_id, demoted, "Captains demoted after event finalization");
    }
    Ok(demoted)
}

/// Role consistency manager service.
#[derive(Clone, Debug)]
pub struct RoleManager {
    db: Arc<DbConn>,
}

impl RoleManager {
    #[must_use]
    pub fn new(db: impl Into<Arc<DbConn>>) -> Self {
        Self {
            db: db.into(),
        }
    }

    /// Promote a volunteer to captain. Touches no TeamMember row.
    pub async fn promote_to_captain(&self, actor: &Actor, user_id: Uuid) -> Result<users::Model> {
        access::require_admin(actor)?;
        self.set_global_role(user_id, UserRole::Volunteer, UserRole::Captain)
            .await
    }

    /// Demote a captain back to volunteer.
    pub async fn demote_to_volunteer(&self, actor: &Actor, user_id: Uuid) -> Result<users::Model> {
        access::require_admin(actor)?;
        self.set_global_role(user_id, UserRole::Captain, UserRole::Volunteer)
            .await
    }

    /// Grant the admin role (admin-only).
    pub async fn promote_to_admin(&self, actor: &Actor, user_id: Uuid) -> Result<users::Model> {
        access::require_admin(actor)?;
        let user = self.load_user(user_id).await?;
        if user.role == UserRole::Admin {
            return Err(AppError::not_allowed("User is already an admin"));
        }
        self.apply_role(user, UserRole::Admin).await
    }

    /// Revoke the admin role. An admin cannot demote themselves.
    pub async fn demote_from_admin(&self, actor: &Actor, user_id: Uuid) -> Result<users::Model> {
        access::require_admin(actor)?;
        if actor.id == user_id {
            return Err(AppError::not_allowed("Admins cannot demote themselves"));
        }
        self.set_global_role(user_id, UserRole::Admin, UserRole::Volunteer)
            .await
    }

    /// The captain synchronization primitive.
    ///
    /// In order: rewrite the current active captain row (if any) to
    /// volunteer, find-or-create the new captain's member row, then point
    /// `Team.captain_id` at them. Requires the user's global role to already
    /// be captain; promotion is a separate, deliberate call.
    pub async fn set_team_captain(&self, actor: &Actor, team_id: Uuid, user_id: Uuid) -> Result<teams::Model> {
        let txn = self.db.begin().await?;

        let team = Teams::find_by_id(team_id)
            .one(&txn)
            .await?
            .ok_or_else(|| AppError::not_found("Team not found"))?;
        let event = entity::Events::find_by_id(team.event_id)
            .one(&txn)
            .await?
            .ok_or_else(|| AppError::not_found("Event not found"))?;
        guard_not_finalized(&event)?;
        access::require_event_manager(actor, &event)?;

        let user = Users::find_by_id(user_id)
            .one(&txn)
            .await?
            .ok_or_else(|| AppError::not_found("User not found"))?;
        if user.role != UserRole::Captain {
            return Err(AppError::not_allowed(
                "Global role must be captain before team captain assignment",
            ));
        }

        let now = Utc::now();
        let current = TeamMembers::find()
            .filter(MemberColumn::TeamId.eq(team_id))
            .filter(MemberColumn::Role.eq(TeamRole::Captain))
            .filter(MemberColumn::Status.eq(MemberStatus::Active))
            .one(&txn)
            .await?;

        if let Some(ref row) = current {
            if row.user_id == user_id {
                // Already the active captain; only the pointer may lag.
                let team = if team.captain_id != Some(user_id) {
                    let mut active: teams::ActiveModel = team.into();
                    active.captain_id = Set(Some(user_id));
                    active.updated_at = Set(now);
                    active.update(&txn).await?
                }
                else {
                    team
                };
                txn.commit().await?;
                return Ok(team);
            }
        }

        if let Some(row) = current {
            let mut active: team_members::ActiveModel = row.into();
            active.role = Set(TeamRole::Volunteer);
            active.updated_at = Set(now);
            active.update(&txn).await?;
        }

        let existing = TeamMembers::find()
            .filter(MemberColumn::TeamId.eq(team_id))
            .filter(MemberColumn::UserId.eq(user_id))
            .one(&txn)
            .await?;
        match existing {
            Some(row) => {
                let mut active: team_members::ActiveModel = row.into();
                active.role = Set(TeamRole::Captain);
                active.status = Set(MemberStatus::Active);
                active.left_at = Set(None);
                active.updated_at = Set(now);
                active.update(&txn).await?;
            },
            None => {
                let row = team_members::ActiveModel {
                    id:         Set(Uuid::new_v4()),
                    team_id:    Set(team_id),
                    user_id:    Set(user_id),
                    role:       Set(TeamRole::Captain),
                    status:     Set(MemberStatus::Active),
                    joined_at:  Set(now),
                    left_at:    Set(None),
                    created_at: Set(now),
                    updated_at: Set(now),
                };
                row.insert(&txn).await?;
            },
        }

        let mut active: teams::ActiveModel = team.into();
        active.captain_id = Set(Some(user_id));
        active.updated_at = Set(now);
        let updated = active.update(&txn).await?;

        txn.commit().await?;
        info!(team_id = %team_id, captain_id = %user_id, "Team captain assigned");
        Ok(updated)
    }

    /// Demotion sweep for a finalized event, on its own transaction. The
    /// completion cascade calls [`demote_captains_after_event_finalize`]
    /// directly inside its transaction.
    pub async fn demote_captains_after_event_finalize(&self, actor: &Actor, event_id: Uuid) -> Result<usize> {
        access::require_admin(actor)?;
        let txn = self.db.begin().await?;
        let demoted = demote_captains_after_event_finalize(&txn, event_id).await?;
        txn.commit().await?;
        Ok(demoted)
    }

    /// Check a team's captain pointer against its roster, logging any
    /// detected mismatch.
    pub async fn team_consistency(&self, team_id: Uuid) -> Result<Option<ConsistencyWarning>> {
        let team = Teams::find_by_id(team_id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| AppError::not_found("Team not found"))?;
        let members = TeamMembers::find()
            .filter(MemberColumn::TeamId.eq(team_id))
            .all(&*self.db)
            .await?;
        let warning = captain_consistency(&team, &members);
        if let Some(ref w) = warning {
            warn!(team_id = %w.team_id, detail = %w.detail, "Captain consistency warning");
        }
        Ok(warning)
    }

    async fn load_user(&self, user_id: Uuid) -> Result<users::Model> {
        Users::find_by_id(user_id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| AppError::not_found("User not found"))
    }

    async fn set_global_role(&self, user_id: Uuid, from: UserRole, to: UserRole) -> Result<users::Model> {
        let user = self.load_user(user_id).await?;
        if user.role != from {
            return Err(AppError::not_allowed(format!(
                "Role change requires current role {}, found {}",
                from, user.role
            )));
        }
        self.apply_role(user, to).await
    }

    async fn apply_role(&self, user: users::Model, to: UserRole) -> Result<users::Model> {
        let user_id = user.id;
        let mut active: users::ActiveModel = user.into();
        active.role = Set(to);
        active.updated_at = Set(Utc::now());
        let updated = active.update(&*self.db).await?;
        info!(user_id = %user_id, role = %to, "Global role changed");
        Ok(updated)
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use entity::teams::TeamStatus;

    use super::*;

    fn team_with_captain(captain_id: Option<Uuid>) -> teams::Model {
        teams::Model {
            id:             Uuid::new_v4(),
            event_id:       Uuid::new_v4(),
            name:           "West gate".to_string(),
            captain_id,
            max_volunteers: 6,
            status:         TeamStatus::Active,
            created_at:     Utc::now(),
            updated_at:     Utc::now(),
        }
    }

    fn member(team_id: Uuid, user_id: Uuid, role: TeamRole, status: MemberStatus) -> team_members::Model {
        team_members::Model {
            id: Uuid::new_v4(),
            team_id,
            user_id,
            role,
            status,
            joined_at: Utc::now(),
            left_at: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_consistency_ok() {
        let captain = Uuid::new_v4();
        let team = team_with_captain(Some(captain));
        let members = vec![
            member(team.id, captain, TeamRole::Captain, MemberStatus::Active),
            member(team.id, Uuid::new_v4(), TeamRole::Volunteer, MemberStatus::Active),
        ];
        assert!(captain_consistency(&team, &members).is_none());
    }

    #[test]
    fn test_consistency_pointer_mismatch() {
        let team = team_with_captain(Some(Uuid::new_v4()));
        let row_captain = Uuid::new_v4();
        let members = vec![member(team.id, row_captain, TeamRole::Captain, MemberStatus::Active)];
        let warning = captain_consistency(&team, &members).unwrap();
        assert_eq!(warning.active_captains, vec![row_captain]);
        assert!(warning.detail.contains("does not match"));
    }

    #[test]
    fn test_consistency_null_pointer_with_active_captain() {
        let team = team_with_captain(None);
        let members = vec![member(team.id, Uuid::new_v4(), TeamRole::Captain, MemberStatus::Active)];
        assert!(captain_consistency(&team, &members).is_some());
    }

    #[test]
    fn test_consistency_multiple_active_captains() {
        let captain = Uuid::new_v4();
        let team = team_with_captain(Some(captain));
        let members = vec![
            member(team.id, captain, TeamRole::Captain, MemberStatus::Active),
            member(team.id, Uuid::new_v4(), TeamRole::Captain, MemberStatus::Active),
        ];
        let warning = captain_consistency(&team, &members).unwrap();
        assert!(warning.detail.contains("Multiple"));
    }

    #[test]
    fn test_consistency_no_active_captain_is_fine() {
        // After finalization every row is inactive; the invariant only binds
        // while an active captain row exists.
        let captain = Uuid::new_v4();
        let team = team_with_captain(Some(captain));
        let members = vec![member(team.id, captain, TeamRole::Captain, MemberStatus::Inactive)];
        assert!(captain_consistency(&team, &members).is_none());
    }

    #[tokio::test]
    async fn test_admin_cannot_demote_self() {
        let db = sea_orm::MockDatabase::new(sea_orm::DatabaseBackend::Postgres).into_connection();
        let manager = RoleManager::new(db);
        let admin = Actor {
            id:        Uuid::new_v4(),
            role:      UserRole::Admin,
            is_active: true,
        };
        let err = manager.demote_from_admin(&admin, admin.id).await.unwrap_err();
        assert_eq!(err.code(), "NOT_ALLOWED");
    }

    #[tokio::test]
    async fn test_set_team_captain_swaps_rows_and_pointer() {
        use sea_orm::{DatabaseBackend, MockDatabase};

        let old_captain = Uuid::new_v4();
        let new_captain = Uuid::new_v4();
        let team = team_with_captain(Some(old_captain));
        let team_id = team.id;
        let now = Utc::now();

        let event = entity::events::Model {
            id:             team.event_id,
            title:          "River cleanup".to_string(),
            description:    None,
            event_date:     now.date_naive(),
            status:         entity::events::EventStatus::Published,
            max_volunteers: 10,
            created_by:     Uuid::new_v4(),
            created_at:     now,
            updated_at:     now,
        };
        let new_captain_user = users::Model {
            id:           new_captain,
            email:        "captain@example.com".to_string(),
            display_name: "Next captain".to_string(),
            role:         UserRole::Captain,
            is_active:    true,
            avatar_url:   None,
            postal_code:  None,
            street:       None,
            city:         None,
            region:       None,
            created_at:   now,
            updated_at:   now,
            deleted_at:   None,
        };

        let old_row = member(team_id, old_captain, TeamRole::Captain, MemberStatus::Active);
        let old_row_demoted = team_members::Model {
            role: TeamRole::Volunteer,
            ..old_row.clone()
        };
        let new_row = member(team_id, new_captain, TeamRole::Volunteer, MemberStatus::Active);
        let new_row_promoted = team_members::Model {
            role: TeamRole::Captain,
            ..new_row.clone()
        };
        let updated_team = teams::Model {
            captain_id: Some(new_captain),
            ..team.clone()
        };

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![team]])
            .append_query_results([vec![event]])
            .append_query_results([vec![new_captain_user]])
            .append_query_results([vec![old_row]])
            .append_query_results([vec![old_row_demoted]])
            .append_query_results([vec![new_row]])
            .append_query_results([vec![new_row_promoted]])
            .append_query_results([vec![updated_team]])
            .into_connection();

        let manager = RoleManager::new(db);
        let admin = Actor {
            id:        Uuid::new_v4(),
            role:      UserRole::Admin,
            is_active: true,
        };
        let team = manager.set_team_captain(&admin, team_id, new_captain).await.unwrap();
        assert_eq!(team.captain_id, Some(new_captain));
    }

    #[tokio::test]
    async fn test_promote_requires_admin() {
        let db = sea_orm::MockDatabase::new(sea_orm::DatabaseBackend::Postgres).into_connection();
        let manager = RoleManager::new(db);
        let captain = Actor {
            id:        Uuid::new_v4(),
            role:      UserRole::Captain,
            is_active: true,
        };
        let err = manager.promote_to_captain(&captain, Uuid::new_v4()).await.unwrap_err();
        assert_eq!(err.code(), "UNAUTHORIZED");
    }
}
