//! # Event Lifecycle Controller
//!
//! Owns the event status graph and the completion cascade. The status graph
//! is draft → published → in_progress → completed, with cancelled reachable
//! from any non-terminal state; completed and cancelled are terminal. Every
//! path into `completed` (explicit advance or lazy expiry) funnels through
//! one cascade so the freeze, roster deactivation, team finishing and
//! captain demotion can never diverge.

use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use entity::{
    event_registrations::Column as RegistrationColumn,
    events::{self, EventStatus},
    team_members::{self, Column as MemberColumn, MemberStatus},
    teams::{self, Column as TeamColumn, TeamStatus},
    EventRegistrations,
    Events,
    TeamMembers,
    Teams,
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
use tracing::info;
use uuid::Uuid;

use crate::access::{self, Actor};
use crate::membership::{guard_not_finalized, occupancy_set};
use crate::roles::demote_captains_after_event_finalize;

/// Legal edges of the event status graph.
///
/// `EventFinalized` for any edge out of `completed`; `NotAllowed` for every
/// other illegal edge, including edges out of `cancelled` and self-loops.
pub fn validate_transition(from: EventStatus, to: EventStatus) -> Result<()> {
    if from == EventStatus::Completed {
        return Err(AppError::event_finalized("Event is completed and frozen"));
    }
    let legal = matches!(
        (from, to),
        (EventStatus::Draft, EventStatus::Published)
            | (EventStatus::Published, EventStatus::InProgress)
            | (EventStatus::InProgress, EventStatus::Completed)
    ) || (to == EventStatus::Cancelled && !from.is_terminal());
    if legal {
        Ok(())
    }
    else {
        Err(AppError::not_allowed(format!(
            "Illegal status transition {} -> {}",
            from, to
        )))
    }
}

/// Fields accepted when creating an event.
#[derive(Debug, Clone)]
pub struct NewEvent {
    pub title:          String,
    pub description:    Option<String>,
    pub event_date:     NaiveDate,
    pub max_volunteers: i32,
}

/// Partial update for an event; `None` fields are left untouched.
#[derive(Debug, Clone, Default)]
pub struct EventPatch {
    pub title:          Option<String>,
    pub description:    Option<Option<String>>,
    pub event_date:     Option<NaiveDate>,
    pub max_volunteers: Option<i32>,
}

/// Fields accepted when creating a team under an event.
#[derive(Debug, Clone)]
pub struct NewTeam {
    pub name:           String,
    pub max_volunteers: i32,
}

/// Partial update for a team.
#[derive(Debug, Clone, Default)]
pub struct TeamPatch {
    pub name:           Option<String>,
    pub max_volunteers: Option<i32>,
    pub status:         Option<TeamStatus>,
}

/// Event lifecycle controller service.
#[derive(Clone, Debug)]
pub struct LifecycleController {
    db: Arc<DbConn>,
}

impl LifecycleController {
    #[must_use]
    pub fn new(db: impl Into<Arc<DbConn>>) -> Self {
        Self {
            db: db.into(),
        }
    }

    /// Create a draft event. Admins and captains may create events; the
    /// creator becomes the event's manager of record.
    pub async fn create_event(&self, actor: &Actor, req: NewEvent) -> Result<events::Model> {
        if !(actor.is_admin() || actor.is_captain()) {
            return Err(AppError::unauthorized("Not permitted to create events"));
        }
        if req.max_volunteers < 1 {
            return Err(AppError::validation("max_volunteers must be at least 1"));
        }
        let now = Utc::now();
        let event = events::ActiveModel {
            id:             Set(Uuid::new_v4()),
            title:          Set(req.title),
            description:    Set(req.description),
            event_date:     Set(req.event_date),
            status:         Set(EventStatus::Draft),
            max_volunteers: Set(req.max_volunteers),
            created_by:     Set(actor.id),
            created_at:     Set(now),
            updated_at:     Set(now),
        };
        let created = event.insert(&*self.db).await?;
        info!(event_id = %created.id, "Event created");
        Ok(created)
    }

    /// Patch an event's descriptive fields. Shrinking `max_volunteers` below
    /// the current occupancy is rejected; existing participants are never
    /// displaced by an edit.
    pub async fn update_event(&self, actor: &Actor, event_id: Uuid, patch: EventPatch) -> Result<events::Model> {
        let txn = self.db.begin().await?;

        let event = Events::find_by_id(event_id)
            .one(&txn)
            .await?
            .ok_or_else(|| AppError::not_found("Event not found"))?;
        guard_not_finalized(&event)?;
        access::require_event_manager(actor, &event)?;

        if let Some(max) = patch.max_volunteers {
            if max < 1 {
                return Err(AppError::validation("max_volunteers must be at least 1"));
            }
            let occupancy = occupancy_set(&txn, event_id).await?;
            if (max as usize) < occupancy.len() {
                return Err(AppError::validation(format!(
                    "max_volunteers {} is below the current occupancy of {}",
                    max,
                    occupancy.len()
                )));
            }
        }

        let mut active: events::ActiveModel = event.into();
        if let Some(title) = patch.title {
            active.title = Set(title);
        }
        if let Some(description) = patch.description {
            active.description = Set(description);
        }
        if let Some(date) = patch.event_date {
            active.event_date = Set(date);
        }
        if let Some(max) = patch.max_volunteers {
            active.max_volunteers = Set(max);
        }
        active.updated_at = Set(Utc::now());
        let updated = active.update(&txn).await?;

        txn.commit().await?;
        Ok(updated)
    }

    /// Move an event along the status graph. The `completed` edge routes
    /// through the completion cascade; there is no second path.
    pub async fn advance(&self, actor: &Actor, event_id: Uuid, new_status: EventStatus) -> Result<events::Model> {
        let txn = self.db.begin().await?;

        let event = Events::find_by_id(event_id)
            .one(&txn)
            .await?
            .ok_or_else(|| AppError::not_found("Event not found"))?;
        access::require_event_manager(actor, &event)?;
        validate_transition(event.status, new_status)?;

        let updated = if new_status == EventStatus::Completed {
            complete_cascade(&txn, event).await?
        }
        else {
            let mut active: events::ActiveModel = event.into();
            active.status = Set(new_status);
            active.updated_at = Set(Utc::now());
            active.update(&txn).await?
        };

        txn.commit().await?;
        info!(event_id = %event_id, status = %updated.status, "Event advanced");
        Ok(updated)
    }

    /// Finalize an event whose date has passed. Idempotent: returns `true`
    /// only on the call that performed the cascade; repeat calls (and calls
    /// on unexpired or terminal events) return `false` without writing.
    pub async fn finalize_if_expired(&self, event_id: Uuid) -> Result<bool> {
        let txn = self.db.begin().await?;

        let event = Events::find_by_id(event_id)
            .one(&txn)
            .await?
            .ok_or_else(|| AppError::not_found("Event not found"))?;
        if event.status.is_terminal() || event.event_date >= Utc::now().date_naive() {
            return Ok(false);
        }

        complete_cascade(&txn, event).await?;
        txn.commit().await?;
        info!(event_id = %event_id, "Expired event finalized");
        Ok(true)
    }

    /// Delete a non-completed event and everything under it.
    pub async fn delete_event(&self, actor: &Actor, event_id: Uuid) -> Result<()> {
        access::require_admin(actor)?;
        let txn = self.db.begin().await?;

        let event = Events::find_by_id(event_id)
            .one(&txn)
            .await?
            .ok_or_else(|| AppError::not_found("Event not found"))?;
        guard_not_finalized(&event)?;

        let team_ids: Vec<Uuid> = Teams::find()
            .filter(TeamColumn::EventId.eq(event_id))
            .all(&txn)
            .await?
            .into_iter()
            .map(|t| t.id)
            .collect();
        if !team_ids.is_empty() {
            TeamMembers::delete_many()
                .filter(MemberColumn::TeamId.is_in(team_ids))
                .exec(&txn)
                .await?;
            Teams::delete_many()
                .filter(TeamColumn::EventId.eq(event_id))
                .exec(&txn)
                .await?;
        }
        EventRegistrations::delete_many()
            .filter(RegistrationColumn::EventId.eq(event_id))
            .exec(&txn)
            .await?;
        Events::delete_by_id(event_id).exec(&txn).await?;

        txn.commit().await?;
        info!(event_id = %event_id, "Event deleted");
        Ok(())
    }

    /// Create a team under an event. Teams start forming with no captain;
    /// leadership is assigned through the role manager.
    pub async fn create_team(&self, actor: &Actor, event_id: Uuid, req: NewTeam) -> Result<teams::Model> {
        let event = Events::find_by_id(event_id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| AppError::not_found("Event not found"))?;
        guard_not_finalized(&event)?;
        access::require_event_manager(actor, &event)?;
        if req.max_volunteers < 1 {
            return Err(AppError::validation("max_volunteers must be at least 1"));
        }

        let now = Utc::now();
        let team = teams::ActiveModel {
            id:             Set(Uuid::new_v4()),
            event_id:       Set(event_id),
            name:           Set(req.name),
            captain_id:     Set(None),
            max_volunteers: Set(req.max_volunteers),
            status:         Set(TeamStatus::Forming),
            created_at:     Set(now),
            updated_at:     Set(now),
        };
        let created = team.insert(&*self.db).await?;
        info!(team_id = %created.id, event_id = %event_id, "Team created");
        Ok(created)
    }

    /// Patch a team's structural fields. Shrinking `max_volunteers` below
    /// the active member count is rejected.
    pub async fn update_team(&self, actor: &Actor, team_id: Uuid, patch: TeamPatch) -> Result<teams::Model> {
        let txn = self.db.begin().await?;

        let team = Teams::find_by_id(team_id)
            .one(&txn)
            .await?
            .ok_or_else(|| AppError::not_found("Team not found"))?;
        let event = Events::find_by_id(team.event_id)
            .one(&txn)
            .await?
            .ok_or_else(|| AppError::not_found("Event not found"))?;
        guard_not_finalized(&event)?;
        if !(access::can_manage_event(actor, &event) || access::can_manage_roster(actor, &team)) {
            return Err(AppError::unauthorized("Not permitted to manage this team"));
        }

        if let Some(max) = patch.max_volunteers {
            if max < 1 {
                return Err(AppError::validation("max_volunteers must be at least 1"));
            }
            let active_members = TeamMembers::find()
                .filter(MemberColumn::TeamId.eq(team_id))
                .filter(MemberColumn::Status.eq(MemberStatus::Active))
                .all(&txn)
                .await?;
            if (max as usize) < active_members.len() {
                return Err(AppError::validation(format!(
                    "max_volunteers {} is below the active member count of {}",
                    max,
                    active_members.len()
                )));
            }
        }

        let mut active: teams::ActiveModel = team.into();
        if let Some(name) = patch.name {
            active.name = Set(name);
        }
        if let Some(max) = patch.max_volunteers {
            active.max_volunteers = Set(max);
        }
        if let Some(status) = patch.status {
            active.status = Set(status);
        }
        active.updated_at = Set(Utc::now());
        let updated = active.update(&txn).await?;

        txn.commit().await?;
        Ok(updated)
    }

    /// Delete a team and its member rows. Pre-completion only.
    pub async fn delete_team(&self, actor: &Actor, team_id: Uuid) -> Result<()> {
        let txn = self.db.begin().await?;

        let team = Teams::find_by_id(team_id)
            .one(&txn)
            .await?
            .ok_or_else(|| AppError::not_found("Team not found"))?;
        let event = Events::find_by_id(team.event_id)
            .one(&txn)
            .await?
            .ok_or_else(|| AppError::not_found("Event not found"))?;
        guard_not_finalized(&event)?;
        access::require_event_manager(actor, &event)?;

        TeamMembers::delete_many()
            .filter(MemberColumn::TeamId.eq(team_id))
            .exec(&txn)
            .await?;
        Teams::delete_by_id(team_id).exec(&txn).await?;

        txn.commit().await?;
        info!(team_id = %team_id, "Team deleted");
        Ok(())
    }
}

/// The completion cascade. Runs inside the caller's transaction: deactivate
/// every active member of the event's teams, mark the teams finished, demote
/// captains whose last open captaincy this was, and freeze the event as
/// completed.
pub(crate) async fn complete_cascade<C: ConnectionTrait>(conn: &C, event: events::Model) -> Result<events::Model> {
    let now = Utc::now();
    let event_id = event.id;

    let teams = Teams::find()
        .filter(TeamColumn::EventId.eq(event_id))
        .all(conn)
        .await?;
    let team_ids: Vec<Uuid> = teams.iter().map(|t| t.id).collect();

    if !team_ids.is_empty() {
        let members = TeamMembers::find()
            .filter(MemberColumn::TeamId.is_in(team_ids))
            .filter(MemberColumn::Status.eq(MemberStatus::Active))
            .all(conn)
            .await?;
        for member in members {
            let mut active: team_members::ActiveModel = member.into();
            active.status = Set(MemberStatus::Inactive);
            active.left_at = Set(Some(now));
            active.updated_at = Set(now);
            active.update(conn).await?;
        }
        for team in teams {
            if team.status == TeamStatus::Finished {
                continue;
            }
            let mut active: teams::ActiveModel = team.into();
            active.status = Set(TeamStatus::Finished);
            active.updated_at = Set(now);
            active.update(conn).await?;
        }
    }

    demote_captains_after_event_finalize(conn, event_id).await?;

    let mut active: events::ActiveModel = event.into();
    active.status = Set(EventStatus::Completed);
    active.updated_at = Set(now);
    let completed = active.update(conn).await?;
    info!(event_id = %event_id, "Completion cascade applied");
    Ok(completed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_forward_edges_are_legal() {
        assert!(validate_transition(EventStatus::Draft, EventStatus::Published).is_ok());
        assert!(validate_transition(EventStatus::Published, EventStatus::InProgress).is_ok());
        assert!(validate_transition(EventStatus::InProgress, EventStatus::Completed).is_ok());
    }

    #[test]
    fn test_cancel_from_any_non_terminal() {
        assert!(validate_transition(EventStatus::Draft, EventStatus::Cancelled).is_ok());
        assert!(validate_transition(EventStatus::Published, EventStatus::Cancelled).is_ok());
        assert!(validate_transition(EventStatus::InProgress, EventStatus::Cancelled).is_ok());
    }

    #[test]
    fn test_completed_is_frozen() {
        for to in [
            EventStatus::Draft,
            EventStatus::Published,
            EventStatus::InProgress,
            EventStatus::Cancelled,
        ] {
            let err = validate_transition(EventStatus::Completed, to).unwrap_err();
            assert_eq!(err.code(), "EVENT_FINALIZED");
        }
    }

    #[test]
    fn test_cancelled_is_terminal_but_not_finalized() {
        let err = validate_transition(EventStatus::Cancelled, EventStatus::Published).unwrap_err();
        assert_eq!(err.code(), "NOT_ALLOWED");
    }

    #[test]
    fn test_skipping_states_is_rejected() {
        let err = validate_transition(EventStatus::Draft, EventStatus::InProgress).unwrap_err();
        assert_eq!(err.code(), "NOT_ALLOWED");
        let err = validate_transition(EventStatus::Draft, EventStatus::Completed).unwrap_err();
        assert_eq!(err.code(), "NOT_ALLOWED");
        let err = validate_transition(EventStatus::Published, EventStatus::Draft).unwrap_err();
        assert_eq!(err.code(), "NOT_ALLOWED");
    }

    #[test]
    fn test_self_loop_is_rejected() {
        let err = validate_transition(EventStatus::Published, EventStatus::Published).unwrap_err();
        assert_eq!(err.code(), "NOT_ALLOWED");
    }

    #[tokio::test]
    async fn test_finalize_terminal_event_is_a_no_op() {
        use sea_orm::{DatabaseBackend, MockDatabase};

        let now = chrono::Utc::now();
        let event = events::Model {
            id:             Uuid::new_v4(),
            title:          "Last year's gala".to_string(),
            description:    None,
            event_date:     now.date_naive() - chrono::Days::new(30),
            status:         EventStatus::Completed,
            max_volunteers: 8,
            created_by:     Uuid::new_v4(),
            created_at:     now,
            updated_at:     now,
        };
        let event_id = event.id;
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![event]])
            .into_connection();

        let controller = LifecycleController::new(db);
        assert!(!controller.finalize_if_expired(event_id).await.unwrap());
    }

    #[tokio::test]
    async fn test_finalize_cascade_runs_once() {
        use sea_orm::{DatabaseBackend, MockDatabase};

        let now = chrono::Utc::now();
        let event_id = Uuid::new_v4();
        let team_id = Uuid::new_v4();
        let captain_id = Uuid::new_v4();

        let expired = events::Model {
            id:             event_id,
            title:          "Coastal cleanup".to_string(),
            description:    None,
            event_date:     now.date_naive() - chrono::Days::new(7),
            status:         EventStatus::Published,
            max_volunteers: 6,
            created_by:     Uuid::new_v4(),
            created_at:     now,
            updated_at:     now,
        };
        let completed = events::Model {
            status: EventStatus::Completed,
            ..expired.clone()
        };
        let team = teams::Model {
            id:             team_id,
            event_id,
            name:           "Beach crew".to_string(),
            captain_id:     Some(captain_id),
            max_volunteers: 6,
            status:         TeamStatus::Active,
            created_at:     now,
            updated_at:     now,
        };
        let team_finished = teams::Model {
            status: TeamStatus::Finished,
            ..team.clone()
        };
        let captain_row = team_members::Model {
            id:         Uuid::new_v4(),
            team_id,
            user_id:    captain_id,
            role:       entity::team_members::TeamRole::Captain,
            status:     MemberStatus::Active,
            joined_at:  now,
            left_at:    None,
            created_at: now,
            updated_at: now,
        };
        let captain_row_inactive = team_members::Model {
            status: MemberStatus::Inactive,
            left_at: Some(now),
            ..captain_row.clone()
        };
        let captain_user = entity::users::Model {
            id:           captain_id,
            email:        "captain@example.com".to_string(),
            display_name: "Crew captain".to_string(),
            role:         entity::users::UserRole::Captain,
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
        let captain_demoted = entity::users::Model {
            role: entity::users::UserRole::Volunteer,
            ..captain_user.clone()
        };

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            // first call: fetch, deactivate the roster, finish the team,
            // demote the captain, freeze the event
            .append_query_results([vec![expired]])
            .append_query_results([vec![team]])
            .append_query_results([vec![captain_row.clone()]])
            .append_query_results([vec![captain_row_inactive]])
            .append_query_results([vec![team_finished.clone()]])
            .append_query_results([vec![team_finished]])
            .append_query_results([vec![captain_row]])
            .append_query_results([vec![captain_user]])
            .append_query_results([Vec::<team_members::Model>::new()])
            .append_query_results([vec![captain_demoted]])
            .append_query_results([vec![completed.clone()]])
            // second call sees the terminal status and stops
            .append_query_results([vec![completed]])
            .into_connection();

        let controller = LifecycleController::new(db);
        assert!(controller.finalize_if_expired(event_id).await.unwrap());
        assert!(!controller.finalize_if_expired(event_id).await.unwrap());
    }
}
