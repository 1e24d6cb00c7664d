//! # Rally Engine
//!
//! The event-team-role lifecycle and consistency engine. Everything here
//! operates against the authorization-filtered entity store and preserves
//! the cross-entity invariants:
//!
//! - no volunteer counted twice toward an event's occupancy
//!   ([`membership`]);
//! - at most one active captain-role member per team, matching the team's
//!   denormalized captain pointer ([`roles`]);
//! - no structural mutation after an event is finalized, with a single
//!   idempotent completion cascade ([`lifecycle`]);
//! - at most one evaluation per (subject, rater, event), aggregated across
//!   heterogeneous shapes ([`evaluation`]).
//!
//! All multi-entity writes run inside one database transaction, and every
//! mutating call re-reads current state before deciding; a status fetched by
//! a client earlier never gates anything.

pub mod access;
pub mod evaluation;
pub mod external;
pub mod lifecycle;
pub mod membership;
pub mod roles;

pub use access::Actor;
pub use evaluation::{EvaluationService, NewEvaluation, SubjectStats};
pub use external::{AddressLookup, LogNotifier, NotificationSink, ObjectStorage};
pub use lifecycle::{EventPatch, LifecycleController, NewEvent, NewTeam, TeamPatch};
pub use membership::MembershipLedger;
pub use roles::{ConsistencyWarning, RoleManager};
