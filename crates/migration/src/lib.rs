//! # Database Migrations
//!
//! Schema migrations for the rally backend, managed by the Sea-ORM
//! migration framework. Run them through the `migration` binary or via the
//! main CLI's `migrate` subcommand.

pub use sea_orm_migration::prelude::*;

pub mod db;
mod m20260801_000001_create_users_table;
mod m20260801_000002_create_events_table;
mod m20260801_000003_create_event_registrations_table;
mod m20260801_000004_create_teams_table;
mod m20260801_000005_create_team_members_table;
mod m20260801_000006_create_evaluations_table;
mod m20260801_000007_create_evaluation_stats_view;

/// Coordinates all migration operations and tracks migration history.
/// Migrations execute in the order they appear in this list.
#[derive(Debug)]
pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20260801_000001_create_users_table::Migration),
            Box::new(m20260801_000002_create_events_table::Migration),
            Box::new(m20260801_000003_create_event_registrations_table::Migration),
            Box::new(m20260801_000004_create_teams_table::Migration),
            Box::new(m20260801_000005_create_team_members_table::Migration),
            Box::new(m20260801_000006_create_evaluations_table::Migration),
            Box::new(m20260801_000007_create_evaluation_stats_view::Migration),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_migrations_are_registered() {
        assert_eq!(Migrator::migrations().len(), 7);
    }
}
