use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Pre-aggregated per-subject, per-kind statistics. The read path
        // falls back to per-row computation when the view is missing, so a
        // deployment that skips this migration still serves stats.
        //
        // The COALESCE folds the shape-specific recommendation columns into
        // one answer: each kind populates exactly one of the two.
        manager
            .get_connection()
            .execute_unprepared(
                r"
                CREATE VIEW evaluation_subject_stats AS
                SELECT
                    subject_id,
                    kind::text AS kind,
                    COUNT(*) AS eval_count,
                    SUM(overall_rating)::bigint AS overall_sum,
                    (COUNT(*) FILTER (
                        WHERE COALESCE(would_work_again, would_recommend) IS TRUE
                    ))::bigint AS recommended_true,
                    (COUNT(*) FILTER (
                        WHERE COALESCE(would_work_again, would_recommend) IS NOT NULL
                    ))::bigint AS recommended_answered
                FROM evaluations
                GROUP BY subject_id, kind
                ",
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .get_connection()
            .execute_unprepared("DROP VIEW IF EXISTS evaluation_subject_stats")
            .await?;

        Ok(())
    }
}
