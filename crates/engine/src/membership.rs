//! # Membership Ledger
//!
//! Owns the mapping of a person to a team and their status transitions, plus
//! direct event registrations. The central rule is deduplicated occupancy: a
//! person registered directly and also seated in a team counts once toward
//! an event's `max_volunteers`.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::Utc;
use entity::{
    event_registrations::{self, Column as RegistrationColumn, RegistrationStatus},
    events::{self, EventStatus},
    team_members::{self, Column as MemberColumn, MemberStatus, TeamRole},
    teams::{Column as TeamColumn},
    EventRegistrations,
    Events,
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
    PaginatorTrait,
    QueryFilter,
    Set,
    TransactionTrait,
};
use tracing::{debug, info};
use uuid::Uuid;

use crate::access::{self, Actor};

/// Deduplicated union of directly-registered and team-seated user ids.
///
/// This is the anti-double-counting rule: the same person appearing in both
/// sources, or seated in several teams, still counts once.
#[must_use]
pub fn dedup_occupancy(registered: &[Uuid], seated: &[Uuid]) -> HashSet<Uuid> {
    registered.iter().chain(seated.iter()).copied().collect()
}

/// Load the occupancy set for an event: distinct user ids holding a
/// pending/confirmed registration or an active seat in any of the event's
/// teams. Recomputed on every call; never cached or incremented.
pub async fn occupancy_set<C: ConnectionTrait>(conn: &C, event_id: Uuid) -> Result<HashSet<Uuid>> {
    let registered: Vec<Uuid> = EventRegistrations::find()
        .filter(RegistrationColumn::EventId.eq(event_id))
        .filter(RegistrationColumn::Status.is_in([RegistrationStatus::Pending, RegistrationStatus::Confirmed]))
        .all(conn)
        .await?
        .into_iter()
        .map(|r| r.user_id)
        .collect();

    let team_ids: Vec<Uuid> = Teams::find()
        .filter(TeamColumn::EventId.eq(event_id))
        .all(conn)
        .await?
        .into_iter()
        .map(|t| t.id)
        .collect();

    let seated: Vec<Uuid> = if team_ids.is_empty() {
        Vec::new()
    }
    else {
        TeamMembers::find()
            .filter(MemberColumn::TeamId.is_in(team_ids))
            .filter(MemberColumn::Status.eq(MemberStatus::Active))
            .all(conn)
            .await?
            .into_iter()
            .map(|m| m.user_id)
            .collect()
    };

    Ok(dedup_occupancy(&registered, &seated))
}

/// Reject any structural mutation of a completed event.
pub(crate) fn guard_not_finalized(event: &events::Model) -> Result<()> {
    if event.status == EventStatus::Completed {
        return Err(AppError::event_finalized(format!(
            "Event '{}' is completed; its structure is history",
            event.title
        )));
    }
    Ok(())
}

/// Membership ledger service.
#[derive(Clone, Debug)]
pub struct MembershipLedger {
    db: Arc<DbConn>,
}

impl MembershipLedger {
    #[must_use]
    pub fn new(db: impl Into<Arc<DbConn>>) -> Self {
        Self {
            db: db.into(),
        }
    }

    /// Deduplicated occupancy count for an event.
    pub async fn occupancy(&self, event_id: Uuid) -> Result<u64> {
        Ok(occupancy_set(&*self.db, event_id).await?.len() as u64)
    }

    /// Seat a user in a team.
    ///
    /// Reactivates a prior `removed`/`inactive` row for the pair instead of
    /// inserting a duplicate. New seats are always `volunteer`; the captain
    /// role is only ever granted through the role manager.
    pub async fn join(&self, actor: &Actor, team_id: Uuid, user_id: Uuid) -> Result<team_members::Model> {
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
        if actor.id != user_id {
            access::require_roster_manager(actor, &team)?;
        }

        let user = Users::find_by_id(user_id)
            .one(&txn)
            .await?
            .ok_or_else(|| AppError::not_found("User not found"))?;
        if !user.is_active {
            return Err(AppError::not_allowed("Deactivated users cannot join a team"));
        }

        let active_members = TeamMembers::find()
            .filter(MemberColumn::TeamId.eq(team_id))
            .filter(MemberColumn::Status.eq(MemberStatus::Active))
            .count(&txn)
            .await?;
        if active_members >= team.max_volunteers as u64 {
            return Err(AppError::capacity_exceeded(format!(
                "Team '{}' is full ({} seats)",
                team.name, team.max_volunteers
            )));
        }

        // The candidate only raises event occupancy when they are not
        // already counted through a registration or another seat.
        let occupancy = occupancy_set(&txn, event.id).await?;
        if !occupancy.contains(&user_id) && occupancy.len() as u64 >= event.max_volunteers as u64 {
            return Err(AppError::capacity_exceeded(format!(
                "Event '{}' is full ({} volunteers)",
                event.title, event.max_volunteers
            )));
        }

        let now = Utc::now();
        let existing = TeamMembers::find()
            .filter(MemberColumn::TeamId.eq(team_id))
            .filter(MemberColumn::UserId.eq(user_id))
            .one(&txn)
            .await?;

        let member = match existing {
            Some(row) if row.status == MemberStatus::Active => {
                return Err(AppError::conflict("Already an active member of this team"));
            },
            Some(row) => {
                let mut active: team_members::ActiveModel = row.into();
                active.role = Set(TeamRole::Volunteer);
                active.status = Set(MemberStatus::Active);
                active.joined_at = Set(now);
                active.left_at = Set(None);
                active.updated_at = Set(now);
                active.update(&txn).await?
            },
            None => {
                let row = team_members::ActiveModel {
                    id:         Set(Uuid::new_v4()),
                    team_id:    Set(team_id),
                    user_id:    Set(user_id),
                    role:       Set(TeamRole::Volunteer),
                    status:     Set(MemberStatus::Active),
                    joined_at:  Set(now),
                    left_at:    Set(None),
                    created_at: Set(now),
                    updated_at: Set(now),
                };
                row.insert(&txn).await?
            },
        };

        txn.commit().await?;
        info!(team_id = %team_id, user_id = %user_id, "Member joined team");
        Ok(member)
    }

    /// Leave a team voluntarily. Captains never self-leave; they are removed
    /// only through demotion.
    pub async fn leave(&self, actor: &Actor, team_id: Uuid, user_id: Uuid) -> Result<()> {
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

        if actor.id != user_id {
            access::require_roster_manager(actor, &team)?;
        }

        let member = TeamMembers::find()
            .filter(MemberColumn::TeamId.eq(team_id))
            .filter(MemberColumn::UserId.eq(user_id))
            .filter(MemberColumn::Status.eq(MemberStatus::Active))
            .one(&txn)
            .await?
            .ok_or_else(|| AppError::not_found("Active membership not found"))?;

        if member.role == TeamRole::Captain {
            return Err(AppError::not_allowed(
                "Captains cannot leave their team; demote them first",
            ));
        }

        let now = Utc::now();
        let mut active: team_members::ActiveModel = member.into();
        active.status = Set(MemberStatus::Inactive);
        active.left_at = Set(Some(now));
        active.updated_at = Set(now);
        active.update(&txn).await?;

        txn.commit().await?;
        info!(team_id = %team_id, user_id = %user_id, "Member left team");
        Ok(())
    }

    /// Remove a member from a team (privileged).
    pub async fn remove(&self, actor: &Actor, member_id: Uuid) -> Result<()> {
        let txn = self.db.begin().await?;

        let member = TeamMembers::find_by_id(member_id)
            .one(&txn)
            .await?
            .ok_or_else(|| AppError::not_found("Membership not found"))?;
        let team = Teams::find_by_id(member.team_id)
            .one(&txn)
            .await?
            .ok_or_else(|| AppError::not_found("Team not found"))?;
        let event = Events::find_by_id(team.event_id)
            .one(&txn)
            .await?
            .ok_or_else(|| AppError::not_found("Event not found"))?;

        guard_not_finalized(&event)?;
        access::require_roster_manager(actor, &team)?;

        if member.role == TeamRole::Captain {
            return Err(AppError::not_allowed(
                "Captain rows are removed through demotion, not removal",
            ));
        }

        let now = Utc::now();
        let user_id = member.user_id;
        let mut active: team_members::ActiveModel = member.into();
        active.status = Set(MemberStatus::Removed);
        active.left_at = Set(Some(now));
        active.updated_at = Set(now);
        active.update(&txn).await?;

        txn.commit().await?;
        info!(team_id = %team.id, user_id = %user_id, "Member removed from team");
        Ok(())
    }

    /// Register directly for an event. Reactivates a cancelled registration
    /// for the pair rather than inserting a second logical row.
    pub async fn register(&self, actor: &Actor, event_id: Uuid, user_id: Uuid) -> Result<event_registrations::Model> {
        access::require_self_or_admin(actor, user_id)?;

        let txn = self.db.begin().await?;

        let event = Events::find_by_id(event_id)
            .one(&txn)
            .await?
            .ok_or_else(|| AppError::not_found("Event not found"))?;
        guard_not_finalized(&event)?;
        if !matches!(event.status, EventStatus::Published | EventStatus::InProgress) {
            return Err(AppError::not_allowed("Event is not open for registration"));
        }

        let occupancy = occupancy_set(&txn, event_id).await?;
        if !occupancy.contains(&user_id) && occupancy.len() as u64 >= event.max_volunteers as u64 {
            return Err(AppError::capacity_exceeded(format!(
                "Event '{}' is full ({} volunteers)",
                event.title, event.max_volunteers
            )));
        }

        let now = Utc::now();
        let existing = EventRegistrations::find()
            .filter(RegistrationColumn::EventId.eq(event_id))
            .filter(RegistrationColumn::UserId.eq(user_id))
            .one(&txn)
            .await?;

        let registration = match existing {
            Some(row) if row.status.counts_toward_occupancy() => {
                return Err(AppError::conflict("Already registered for this event"));
            },
            Some(row) => {
                let mut active: event_registrations::ActiveModel = row.into();
                active.status = Set(RegistrationStatus::Pending);
                active.updated_at = Set(now);
                active.update(&txn).await?
            },
            None => {
                let row = event_registrations::ActiveModel {
                    id:         Set(Uuid::new_v4()),
                    event_id:   Set(event_id),
                    user_id:    Set(user_id),
                    status:     Set(RegistrationStatus::Pending),
                    created_at: Set(now),
                    updated_at: Set(now),
                };
                row.insert(&txn).await?
            },
        };

        txn.commit().await?;
        info!(event_id = %event_id, user_id = %user_id, "Registered for event");
        Ok(registration)
    }

    /// Confirm a pending registration (privileged).
    pub async fn confirm_registration(&self, actor: &Actor, registration_id: Uuid) -> Result<event_registrations::Model> {
        self.set_registration_status(actor, registration_id, RegistrationStatus::Confirmed, |current| {
            current == RegistrationStatus::Pending
        })
        .await
    }

    /// Cancel a registration. The holder may cancel their own.
    pub async fn cancel_registration(&self, actor: &Actor, registration_id: Uuid) -> Result<event_registrations::Model> {
        let txn = self.db.begin().await?;
        let registration = EventRegistrations::find_by_id(registration_id)
            .one(&txn)
            .await?
            .ok_or_else(|| AppError::not_found("Registration not found"))?;
        let event = Events::find_by_id(registration.event_id)
            .one(&txn)
            .await?
            .ok_or_else(|| AppError::not_found("Event not found"))?;
        guard_not_finalized(&event)?;
        if actor.id != registration.user_id {
            access::require_event_manager(actor, &event)?;
        }
        if registration.status == RegistrationStatus::Cancelled {
            return Err(AppError::conflict("Registration is already cancelled"));
        }

        let now = Utc::now();
        let mut active: event_registrations::ActiveModel = registration.into();
        active.status = Set(RegistrationStatus::Cancelled);
        active.updated_at = Set(now);
        let updated = active.update(&txn).await?;
        txn.commit().await?;
        debug!(registration_id = %registration_id, "Registration cancelled");
        Ok(updated)
    }

    /// Mark a registration as transferred into a team seat (privileged).
    pub async fn transfer_registration(&self, actor: &Actor, registration_id: Uuid) -> Result<event_registrations::Model> {
        self.set_registration_status(actor, registration_id, RegistrationStatus::Transferred, |current| {
            current.counts_toward_occupancy()
        })
        .await
    }

    async fn set_registration_status(
        &self,
        actor: &Actor,
        registration_id: Uuid,
        next: RegistrationStatus,
        permitted_from: impl Fn(RegistrationStatus) -> bool,
    ) -> Result<event_registrations::Model> {
        let txn = self.db.begin().await?;

        let registration = EventRegistrations::find_by_id(registration_id)
            .one(&txn)
            .await?
            .ok_or_else(|| AppError::not_found("Registration not found"))?;
        let event = Events::find_by_id(registration.event_id)
            .one(&txn)
            .await?
            .ok_or_else(|| AppError::not_found("Event not found"))?;

        guard_not_finalized(&event)?;
        access::require_event_manager(actor, &event)?;

        if !permitted_from(registration.status) {
            return Err(AppError::not_allowed(format!(
                "Registration cannot move from {} to {}",
                registration.status, next
            )));
        }

        let now = Utc::now();
        let mut active: event_registrations::ActiveModel = registration.into();
        active.status = Set(next);
        active.updated_at = Set(now);
        let updated = active.update(&txn).await?;
        txn.commit().await?;
        debug!(registration_id = %registration_id, status = %next, "Registration status updated");
        Ok(updated)
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use entity::events::EventStatus;
    use sea_orm::{DatabaseBackend, MockDatabase};

    use super::*;
    use crate::access::Actor;

    fn ids(n: usize) -> Vec<Uuid> { (0 .. n).map(|_| Uuid::new_v4()).collect() }

    #[test]
    fn test_dedup_occupancy_counts_distinct_users() {
        let users = ids(3);
        let registered = vec![users[0], users[1]];
        let seated = vec![users[1], users[2]];
        assert_eq!(dedup_occupancy(&registered, &seated).len(), 3);
    }

    #[test]
    fn test_dedup_occupancy_single_user_both_sources() {
        // A person registered directly and also seated in a team counts once.
        let user = Uuid::new_v4();
        let set = dedup_occupancy(&[user], &[user]);
        assert_eq!(set.len(), 1);
        assert!(set.contains(&user));
    }

    #[test]
    fn test_dedup_occupancy_multiple_seats_count_once() {
        let user = Uuid::new_v4();
        assert_eq!(dedup_occupancy(&[], &[user, user]).len(), 1);
    }

    #[test]
    fn test_guard_not_finalized() {
        let mut event = entity::events::Model {
            id:             Uuid::new_v4(),
            title:          "Harbor festival".to_string(),
            description:    None,
            event_date:     Utc::now().date_naive(),
            status:         EventStatus::Published,
            max_volunteers: 4,
            created_by:     Uuid::new_v4(),
            created_at:     Utc::now(),
            updated_at:     Utc::now(),
        };
        assert!(guard_not_finalized(&event).is_ok());
        event.status = EventStatus::Completed;
        assert_eq!(guard_not_finalized(&event).unwrap_err().code(), "EVENT_FINALIZED");
        // Cancelled events are terminal but not frozen history.
        event.status = EventStatus::Cancelled;
        assert!(guard_not_finalized(&event).is_ok());
    }

    #[tokio::test]
    async fn test_join_rejects_completed_event() {
        let team_id = Uuid::new_v4();
        let event_id = Uuid::new_v4();
        let now = Utc::now();

        let team = entity::teams::Model {
            id:             team_id,
            event_id,
            name:           "South gate".to_string(),
            captain_id:     None,
            max_volunteers: 5,
            status:         entity::teams::TeamStatus::Finished,
            created_at:     now,
            updated_at:     now,
        };
        let event = entity::events::Model {
            id:             event_id,
            title:          "Past event".to_string(),
            description:    None,
            event_date:     now.date_naive(),
            status:         EventStatus::Completed,
            max_volunteers: 5,
            created_by:     Uuid::new_v4(),
            created_at:     now,
            updated_at:     now,
        };

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![team]])
            .append_query_results([vec![event]])
            .into_connection();

        let ledger = MembershipLedger::new(db);
        let actor = Actor {
            id:        Uuid::new_v4(),
            role:      entity::users::UserRole::Admin,
            is_active: true,
        };
        let err = ledger.join(&actor, team_id, Uuid::new_v4()).await.unwrap_err();
        assert_eq!(err.code(), "EVENT_FINALIZED");
    }

    fn open_team(team_id: Uuid, event_id: Uuid) -> entity::teams::Model {
        let now = Utc::now();
        entity::teams::Model {
            id:             team_id,
            event_id,
            name:           "Stage crew".to_string(),
            captain_id:     None,
            max_volunteers: 5,
            status:         entity::teams::TeamStatus::Active,
            created_at:     now,
            updated_at:     now,
        }
    }

    fn published_event(event_id: Uuid, max_volunteers: i32) -> entity::events::Model {
        let now = Utc::now();
        entity::events::Model {
            id:             event_id,
            title:          "Street fair".to_string(),
            description:    None,
            event_date:     now.date_naive(),
            status:         EventStatus::Published,
            max_volunteers,
            created_by:     Uuid::new_v4(),
            created_at:     now,
            updated_at:     now,
        }
    }

    fn volunteer(user_id: Uuid) -> entity::users::Model {
        let now = Utc::now();
        entity::users::Model {
            id:           user_id,
            email:        "vol@example.com".to_string(),
            display_name: "Volunteer".to_string(),
            role:         entity::users::UserRole::Volunteer,
            is_active:    true,
            avatar_url:   None,
            postal_code:  None,
            street:       None,
            city:         None,
            region:       None,
            created_at:   now,
            updated_at:   now,
            deleted_at:   None,
        }
    }

    fn seat(team_id: Uuid, user_id: Uuid) -> team_members::Model {
        let now = Utc::now();
        team_members::Model {
            id:         Uuid::new_v4(),
            team_id,
            user_id,
            role:       TeamRole::Volunteer,
            status:     MemberStatus::Active,
            joined_at:  now,
            left_at:    None,
            created_at: now,
            updated_at: now,
        }
    }

    fn pending_registration(event_id: Uuid, user_id: Uuid) -> event_registrations::Model {
        let now = Utc::now();
        event_registrations::Model {
            id: Uuid::new_v4(),
            event_id,
            user_id,
            status: RegistrationStatus::Pending,
            created_at: now,
            updated_at: now,
        }
    }

    fn count_row(n: i64) -> std::collections::BTreeMap<&'static str, sea_orm::Value> {
        std::collections::BTreeMap::from([("num_items", sea_orm::Value::from(n))])
    }

    #[tokio::test]
    async fn test_join_counts_registered_and_seated_user_once() {
        // Event has two slots; the same person holds a registration and a
        // seat, so occupancy is 1 and a second person can still join.
        let team_id = Uuid::new_v4();
        let event_id = Uuid::new_v4();
        let occupant = Uuid::new_v4();
        let joiner = Uuid::new_v4();

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![open_team(team_id, event_id)]])
            .append_query_results([vec![published_event(event_id, 2)]])
            .append_query_results([vec![volunteer(joiner)]])
            .append_query_results([vec![count_row(1)]])
            .append_query_results([vec![pending_registration(event_id, occupant)]])
            .append_query_results([vec![open_team(team_id, event_id)]])
            .append_query_results([vec![seat(team_id, occupant)]])
            .append_query_results([Vec::<team_members::Model>::new()])
            .append_query_results([vec![seat(team_id, joiner)]])
            .into_connection();

        let ledger = MembershipLedger::new(db);
        let actor = Actor {
            id:        joiner,
            role:      entity::users::UserRole::Volunteer,
            is_active: true,
        };
        let member = ledger.join(&actor, team_id, joiner).await.unwrap();
        assert_eq!(member.user_id, joiner);
        assert_eq!(member.status, MemberStatus::Active);
    }

    #[tokio::test]
    async fn test_join_rejects_full_event() {
        // Two distinct people already occupy a two-slot event; a third join
        // attempt fails even though the team itself still has seats.
        let team_id = Uuid::new_v4();
        let event_id = Uuid::new_v4();
        let first = Uuid::new_v4();
        let second = Uuid::new_v4();
        let joiner = Uuid::new_v4();

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![open_team(team_id, event_id)]])
            .append_query_results([vec![published_event(event_id, 2)]])
            .append_query_results([vec![volunteer(joiner)]])
            .append_query_results([vec![count_row(2)]])
            .append_query_results([vec![pending_registration(event_id, first)]])
            .append_query_results([vec![open_team(team_id, event_id)]])
            .append_query_results([vec![seat(team_id, first), seat(team_id, second)]])
            .into_connection();

        let ledger = MembershipLedger::new(db);
        let actor = Actor {
            id:        joiner,
            role:      entity::users::UserRole::Volunteer,
            is_active: true,
        };
        let err = ledger.join(&actor, team_id, joiner).await.unwrap_err();
        assert_eq!(err.code(), "CAPACITY_EXCEEDED");
    }
}
