//! Entity definitions for the rally coordination backend
//!
//! This crate contains the Sea-ORM entity definitions for the database
//! models. Each module also carries the typed active enums for its table.

pub mod event_registrations;
pub use event_registrations::Entity as EventRegistrations;
pub mod evaluations;
pub use evaluations::Entity as Evaluations;
pub mod events;
pub use events::Entity as Events;
pub mod team_members;
pub use team_members::Entity as TeamMembers;
pub mod teams;
pub use teams::Entity as Teams;
pub mod users;
pub use users::Entity as Users;
