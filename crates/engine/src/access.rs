//! # Access Guards
//!
//! The caller identity resolved for a request and the permission checks the
//! engine applies before touching rows. Authorization failures are
//! `Unauthorized` and are surfaced as-is; they are distinct from
//! business-rule rejections (`NotAllowed` and friends), which carry their
//! own codes.

use entity::users::{self, UserRole};
use error::{AppError, Result};
use uuid::Uuid;

/// The authenticated caller on whose behalf the engine acts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Actor {
    pub id:        Uuid,
    pub role:      UserRole,
    pub is_active: bool,
}

impl Actor {
    /// Build an actor from a loaded user row. Inactive accounts cannot act.
    pub fn from_user(user: &users::Model) -> Result<Self> {
        if !user.is_active {
            return Err(AppError::unauthorized("Account is deactivated"));
        }
        Ok(Self {
            id:        user.id,
            role:      user.role,
            is_active: user.is_active,
        })
    }

    #[must_use]
    pub fn is_admin(&self) -> bool { self.role == UserRole::Admin }

    #[must_use]
    pub fn is_captain(&self) -> bool { self.role == UserRole::Captain }
}

/// Require the global admin role.
pub fn require_admin(actor: &Actor) -> Result<()> {
    if actor.is_admin() {
        Ok(())
    }
    else {
        Err(AppError::unauthorized("Admin role required"))
    }
}

/// Require the caller to act on their own row, or be an admin.
pub fn require_self_or_admin(actor: &Actor, user_id: Uuid) -> Result<()> {
    if actor.id == user_id || actor.is_admin() {
        Ok(())
    }
    else {
        Err(AppError::unauthorized("Not permitted to act for this user"))
    }
}

/// Whether the actor may administer an event: admins always, captains only
/// for events they created.
#[must_use]
pub fn can_manage_event(actor: &Actor, event: &entity::events::Model) -> bool {
    actor.is_admin() || (actor.is_captain() && event.created_by == actor.id)
}

/// Require event-management permission.
pub fn require_event_manager(actor: &Actor, event: &entity::events::Model) -> Result<()> {
    if can_manage_event(actor, event) {
        Ok(())
    }
    else {
        Err(AppError::unauthorized("Not permitted to manage this event"))
    }
}

/// Whether the actor may edit a team's roster: admins always, otherwise the
/// team's designated captain.
#[must_use]
pub fn can_manage_roster(actor: &Actor, team: &entity::teams::Model) -> bool {
    actor.is_admin() || team.captain_id == Some(actor.id)
}

/// Require roster-management permission.
pub fn require_roster_manager(actor: &Actor, team: &entity::teams::Model) -> Result<()> {
    if can_manage_roster(actor, team) {
        Ok(())
    }
    else {
        Err(AppError::unauthorized("Not permitted to manage this roster"))
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;

    fn actor(role: UserRole) -> Actor {
        Actor {
            id:        Uuid::new_v4(),
            role,
            is_active: true,
        }
    }

    fn event(created_by: Uuid) -> entity::events::Model {
        entity::events::Model {
            id:             Uuid::new_v4(),
            title:          "Riverside cleanup".to_string(),
            description:    None,
            event_date:     Utc::now().date_naive(),
            status:         entity::events::EventStatus::Published,
            max_volunteers: 10,
            created_by,
            created_at:     Utc::now(),
            updated_at:     Utc::now(),
        }
    }

    fn team(captain_id: Option<Uuid>) -> entity::teams::Model {
        entity::teams::Model {
            id:             Uuid::new_v4(),
            event_id:       Uuid::new_v4(),
            name:           "North gate".to_string(),
            captain_id,
            max_volunteers: 5,
            status:         entity::teams::TeamStatus::Forming,
            created_at:     Utc::now(),
            updated_at:     Utc::now(),
        }
    }

    #[test]
    fn test_from_user_rejects_inactive() {
        let user = entity::users::Model {
            id:           Uuid::new_v4(),
            email:        "a@example.com".to_string(),
            display_name: "A".to_string(),
            role:         UserRole::Volunteer,
            is_active:    false,
            avatar_url:   None,
            postal_code:  None,
            street:       None,
            city:         None,
            region:       None,
            created_at:   Utc::now(),
            updated_at:   Utc::now(),
            deleted_at:   Some(Utc::now()),
        };
        assert!(Actor::from_user(&user).is_err());
    }

    #[test]
    fn test_require_admin() {
        assert!(require_admin(&actor(UserRole::Admin)).is_ok());
        let err = require_admin(&actor(UserRole::Captain)).unwrap_err();
        assert_eq!(err.code(), "UNAUTHORIZED");
    }

    #[test]
    fn test_require_self_or_admin() {
        let a = actor(UserRole::Volunteer);
        assert!(require_self_or_admin(&a, a.id).is_ok());
        assert!(require_self_or_admin(&a, Uuid::new_v4()).is_err());
        assert!(require_self_or_admin(&actor(UserRole::Admin), Uuid::new_v4()).is_ok());
    }

    #[test]
    fn test_event_manager_rules() {
        let captain = actor(UserRole::Captain);
        assert!(can_manage_event(&captain, &event(captain.id)));
        assert!(!can_manage_event(&captain, &event(Uuid::new_v4())));
        // A volunteer never manages events, even their own creations.
        let volunteer = actor(UserRole::Volunteer);
        assert!(!can_manage_event(&volunteer, &event(volunteer.id)));
        assert!(can_manage_event(&actor(UserRole::Admin), &event(Uuid::new_v4())));
    }

    #[test]
    fn test_roster_manager_rules() {
        let captain = actor(UserRole::Captain);
        assert!(can_manage_roster(&captain, &team(Some(captain.id))));
        assert!(!can_manage_roster(&captain, &team(None)));
        assert!(can_manage_roster(&actor(UserRole::Admin), &team(None)));
        assert!(require_roster_manager(&actor(UserRole::Volunteer), &team(None)).is_err());
    }
}
