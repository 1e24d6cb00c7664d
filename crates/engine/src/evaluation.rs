//! # Evaluation Aggregator
//!
//! Records cross-role evaluations and computes per-subject statistics.
//! Rows from the store arrive in three shapes sharing one table; they are
//! normalized into [`EvaluationRecord`] at the boundary so the aggregation
//! code never touches columns that do not belong to a row's kind.
//!
//! The read path prefers the `evaluation_subject_stats` aggregate view and
//! falls back to per-row computation when the view is unavailable. Both
//! paths derive means as sum over count, so their output is identical.

use std::sync::Arc;

use entity::{
    evaluations::{self, Column as EvaluationColumn, EvaluationKind},
    events::{self, EventStatus},
    team_members::{self, Column as MemberColumn, MemberStatus, TeamRole},
    Evaluations,
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
    FromQueryResult,
    QueryFilter,
    Set,
    Statement,
    TransactionTrait,
};
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::access::Actor;

/// An evaluation row normalized to its shape. Columns foreign to the kind
/// are dropped here and can never leak into a statistic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EvaluationRecord {
    VolunteerByCaptain {
        overall_rating:   i16,
        punctuality:      Option<i16>,
        teamwork:         Option<i16>,
        would_work_again: Option<bool>,
    },
    CaptainByAdmin {
        overall_rating:  i16,
        leadership:      Option<i16>,
        organization:    Option<i16>,
        would_recommend: Option<bool>,
    },
    CaptainByVolunteer {
        overall_rating:  i16,
        leadership:      Option<i16>,
        support:         Option<i16>,
        communication:   Option<i16>,
        would_recommend: Option<bool>,
    },
}

impl EvaluationRecord {
    /// Normalize a stored row, keeping only the columns of its kind.
    #[must_use]
    pub fn from_model(row: &evaluations::Model) -> Self {
        match row.kind {
            EvaluationKind::VolunteerByCaptain => Self::VolunteerByCaptain {
                overall_rating:   row.overall_rating,
                punctuality:      row.punctuality,
                teamwork:         row.teamwork,
                would_work_again: row.would_work_again,
            },
            EvaluationKind::CaptainByAdmin => Self::CaptainByAdmin {
                overall_rating:  row.overall_rating,
                leadership:      row.leadership,
                organization:    row.organization,
                would_recommend: row.would_recommend,
            },
            EvaluationKind::CaptainByVolunteer => Self::CaptainByVolunteer {
                overall_rating:  row.overall_rating,
                leadership:      row.leadership,
                support:         row.support,
                communication:   row.communication,
                would_recommend: row.would_recommend,
            },
        }
    }

    #[must_use]
    pub fn kind(&self) -> EvaluationKind {
        match self {
            Self::VolunteerByCaptain { .. } => EvaluationKind::VolunteerByCaptain,
            Self::CaptainByAdmin { .. } => EvaluationKind::CaptainByAdmin,
            Self::CaptainByVolunteer { .. } => EvaluationKind::CaptainByVolunteer,
        }
    }

    #[must_use]
    pub fn overall_rating(&self) -> i16 {
        match self {
            Self::VolunteerByCaptain {
                overall_rating, ..
            }
            | Self::CaptainByAdmin {
                overall_rating, ..
            }
            | Self::CaptainByVolunteer {
                overall_rating, ..
            } => *overall_rating,
        }
    }

    /// The shape's recommendation answer, whatever its column is called.
    #[must_use]
    pub fn recommended(&self) -> Option<bool> {
        match self {
            Self::VolunteerByCaptain {
                would_work_again, ..
            } => *would_work_again,
            Self::CaptainByAdmin {
                would_recommend, ..
            }
            | Self::CaptainByVolunteer {
                would_recommend, ..
            } => *would_recommend,
        }
    }
}

/// A submission, before eligibility and duplicate checks. The rater is the
/// acting caller and is never taken from the payload.
#[derive(Debug, Clone)]
pub struct NewEvaluation {
    pub kind:             EvaluationKind,
    pub subject_id:       Uuid,
    pub event_id:         Uuid,
    pub team_id:          Uuid,
    pub overall_rating:   i16,
    pub punctuality:      Option<i16>,
    pub teamwork:         Option<i16>,
    pub leadership:       Option<i16>,
    pub organization:     Option<i16>,
    pub support:          Option<i16>,
    pub communication:    Option<i16>,
    pub would_work_again: Option<bool>,
    pub would_recommend:  Option<bool>,
    pub comments:         Option<String>,
}

fn rating_in_range(label: &str, value: i16) -> Result<()> {
    if (1..=5).contains(&value) {
        Ok(())
    }
    else {
        Err(AppError::validation(format!("{label} must be between 1 and 5")))
    }
}

fn require_absent(label: &str, present: bool) -> Result<()> {
    if present {
        Err(AppError::validation(format!("{label} does not apply to this evaluation kind")))
    }
    else {
        Ok(())
    }
}

/// Shape validation: every rating within 1..=5 and no field of a foreign
/// shape smuggled in.
pub fn validate_shape(req: &NewEvaluation) -> Result<()> {
    rating_in_range("overall_rating", req.overall_rating)?;
    for (label, value) in [
        ("punctuality", req.punctuality),
        ("teamwork", req.teamwork),
        ("leadership", req.leadership),
        ("organization", req.organization),
        ("support", req.support),
        ("communication", req.communication),
    ] {
        if let Some(value) = value {
            rating_in_range(label, value)?;
        }
    }

    match req.kind {
        EvaluationKind::VolunteerByCaptain => {
            require_absent("leadership", req.leadership.is_some())?;
            require_absent("organization", req.organization.is_some())?;
            require_absent("support", req.support.is_some())?;
            require_absent("communication", req.communication.is_some())?;
            require_absent("would_recommend", req.would_recommend.is_some())?;
        },
        EvaluationKind::CaptainByAdmin => {
            require_absent("punctuality", req.punctuality.is_some())?;
            require_absent("teamwork", req.teamwork.is_some())?;
            require_absent("support", req.support.is_some())?;
            require_absent("communication", req.communication.is_some())?;
            require_absent("would_work_again", req.would_work_again.is_some())?;
        },
        EvaluationKind::CaptainByVolunteer => {
            require_absent("punctuality", req.punctuality.is_some())?;
            require_absent("teamwork", req.teamwork.is_some())?;
            require_absent("organization", req.organization.is_some())?;
            require_absent("would_work_again", req.would_work_again.is_some())?;
        },
    }
    Ok(())
}

fn held_role(rows: &[team_members::Model], role: TeamRole) -> bool {
    rows.iter()
        .any(|m| m.role == role && m.status != MemberStatus::Removed)
}

/// Eligibility for a given shape. `rater_rows` and `subject_rows` are the
/// two users' member rows on the evaluation's team; removed rows never
/// qualify, but inactive ones do, since evaluations happen after the
/// completion cascade deactivated the roster.
pub fn check_eligibility(
    kind: EvaluationKind,
    event: &events::Model,
    rater_is_admin: bool,
    rater_rows: &[team_members::Model],
    subject_rows: &[team_members::Model],
) -> Result<()> {
    if event.status != EventStatus::Completed {
        return Err(AppError::not_eligible("Evaluations open once the event is completed"));
    }
    let eligible = match kind {
        EvaluationKind::VolunteerByCaptain => {
            held_role(rater_rows, TeamRole::Captain) && held_role(subject_rows, TeamRole::Volunteer)
        },
        EvaluationKind::CaptainByVolunteer => {
            held_role(rater_rows, TeamRole::Volunteer) && held_role(subject_rows, TeamRole::Captain)
        },
        EvaluationKind::CaptainByAdmin => rater_is_admin && held_role(subject_rows, TeamRole::Captain),
    };
    if eligible {
        Ok(())
    }
    else {
        Err(AppError::not_eligible("Rater and subject roles do not match this evaluation kind"))
    }
}

/// Per-shape statistics for one subject.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KindStats {
    pub kind:                EvaluationKind,
    pub count:               u64,
    pub mean_overall:        Option<f64>,
    pub recommendation_rate: Option<f64>,
}

/// Statistics merged across every shape a subject accumulated. Sub-ratings
/// of different scales never mix; only the shared overall rating and the
/// recommendation answer are merged.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubjectStats {
    pub subject_id:          Uuid,
    pub count:               u64,
    pub mean_overall:        Option<f64>,
    pub recommendation_rate: Option<f64>,
    pub by_kind:             Vec<KindStats>,
}

#[derive(Debug, Default, Clone, Copy)]
struct Accumulator {
    count:                u64,
    overall_sum:          i64,
    recommended_true:     u64,
    recommended_answered: u64,
}

impl Accumulator {
    fn add_record(&mut self, record: &EvaluationRecord) {
        self.count += 1;
        self.overall_sum += i64::from(record.overall_rating());
        if let Some(answer) = record.recommended() {
            self.recommended_answered += 1;
            if answer {
                self.recommended_true += 1;
            }
        }
    }

    fn mean_overall(&self) -> Option<f64> {
        (self.count > 0).then(|| self.overall_sum as f64 / self.count as f64)
    }

    fn recommendation_rate(&self) -> Option<f64> {
        (self.recommended_answered > 0)
            .then(|| 100.0 * self.recommended_true as f64 / self.recommended_answered as f64)
    }
}

const KIND_ORDER: [EvaluationKind; 3] = [
    EvaluationKind::VolunteerByCaptain,
    EvaluationKind::CaptainByAdmin,
    EvaluationKind::CaptainByVolunteer,
];

fn assemble(subject_id: Uuid, per_kind: [Accumulator; 3]) -> SubjectStats {
    let mut total = Accumulator::default();
    let mut by_kind = Vec::new();
    for (kind, acc) in KIND_ORDER.iter().zip(per_kind.iter()) {
        if acc.count == 0 {
            continue;
        }
        total.count += acc.count;
        total.overall_sum += acc.overall_sum;
        total.recommended_true += acc.recommended_true;
        total.recommended_answered += acc.recommended_answered;
        by_kind.push(KindStats {
            kind:                *kind,
            count:               acc.count,
            mean_overall:        acc.mean_overall(),
            recommendation_rate: acc.recommendation_rate(),
        });
    }
    SubjectStats {
        subject_id,
        count: total.count,
        mean_overall: total.mean_overall(),
        recommendation_rate: total.recommendation_rate(),
        by_kind,
    }
}

fn kind_slot(kind: EvaluationKind) -> usize {
    match kind {
        EvaluationKind::VolunteerByCaptain => 0,
        EvaluationKind::CaptainByAdmin => 1,
        EvaluationKind::CaptainByVolunteer => 2,
    }
}

impl SubjectStats {
    /// Per-row computation, shared by the fallback read path and tests.
    #[must_use]
    pub fn from_records(subject_id: Uuid, records: &[EvaluationRecord]) -> Self {
        let mut per_kind = [Accumulator::default(); 3];
        for record in records {
            per_kind[kind_slot(record.kind())].add_record(record);
        }
        assemble(subject_id, per_kind)
    }
}

/// One row of the `evaluation_subject_stats` aggregate view.
#[derive(Debug, FromQueryResult)]
struct StatsViewRow {
    kind:                 String,
    eval_count:           i64,
    overall_sum:          i64,
    recommended_true:     i64,
    recommended_answered: i64,
}

fn parse_kind(raw: &str) -> Result<EvaluationKind> {
    match raw {
        "volunteer_by_captain" => Ok(EvaluationKind::VolunteerByCaptain),
        "captain_by_admin" => Ok(EvaluationKind::CaptainByAdmin),
        "captain_by_volunteer" => Ok(EvaluationKind::CaptainByVolunteer),
        other => Err(AppError::internal(format!("Unknown evaluation kind '{other}' in aggregate view"))),
    }
}

fn stats_from_view_rows(subject_id: Uuid, rows: Vec<StatsViewRow>) -> Result<SubjectStats> {
    let mut per_kind = [Accumulator::default(); 3];
    for row in rows {
        let slot = kind_slot(parse_kind(&row.kind)?);
        let acc = &mut per_kind[slot];
        acc.count += row.eval_count as u64;
        acc.overall_sum += row.overall_sum;
        acc.recommended_true += row.recommended_true as u64;
        acc.recommended_answered += row.recommended_answered as u64;
    }
    Ok(assemble(subject_id, per_kind))
}

/// Evaluation aggregator service.
#[derive(Clone, Debug)]
pub struct EvaluationService {
    db: Arc<DbConn>,
}

impl EvaluationService {
    #[must_use]
    pub fn new(db: impl Into<Arc<DbConn>>) -> Self {
        Self {
            db: db.into(),
        }
    }

    /// Record an evaluation. A prior row for the same (subject, rater,
    /// event) is rejected, never overwritten.
    pub async fn submit(&self, actor: &Actor, req: NewEvaluation) -> Result<evaluations::Model> {
        validate_shape(&req)?;
        if req.subject_id == actor.id {
            return Err(AppError::validation("Self-evaluation is not supported"));
        }

        let txn = self.db.begin().await?;

        let event = Events::find_by_id(req.event_id)
            .one(&txn)
            .await?
            .ok_or_else(|| AppError::not_found("Event not found"))?;
        let team = Teams::find_by_id(req.team_id)
            .one(&txn)
            .await?
            .ok_or_else(|| AppError::not_found("Team not found"))?;
        if team.event_id != req.event_id {
            return Err(AppError::validation("Team does not belong to this event"));
        }

        let existing = Evaluations::find()
            .filter(EvaluationColumn::SubjectId.eq(req.subject_id))
            .filter(EvaluationColumn::RaterId.eq(actor.id))
            .filter(EvaluationColumn::EventId.eq(req.event_id))
            .one(&txn)
            .await?;
        if existing.is_some() {
            return Err(AppError::duplicate_evaluation(
                "An evaluation for this subject, rater and event already exists",
            ));
        }

        let rater_rows = TeamMembers::find()
            .filter(MemberColumn::TeamId.eq(req.team_id))
            .filter(MemberColumn::UserId.eq(actor.id))
            .all(&txn)
            .await?;
        let subject_rows = TeamMembers::find()
            .filter(MemberColumn::TeamId.eq(req.team_id))
            .filter(MemberColumn::UserId.eq(req.subject_id))
            .all(&txn)
            .await?;
        check_eligibility(req.kind, &event, actor.is_admin(), &rater_rows, &subject_rows)?;

        let row = evaluations::ActiveModel {
            id:               Set(Uuid::new_v4()),
            kind:             Set(req.kind),
            subject_id:       Set(req.subject_id),
            rater_id:         Set(actor.id),
            event_id:         Set(req.event_id),
            team_id:          Set(req.team_id),
            overall_rating:   Set(req.overall_rating),
            punctuality:      Set(req.punctuality),
            teamwork:         Set(req.teamwork),
            leadership:       Set(req.leadership),
            organization:     Set(req.organization),
            support:          Set(req.support),
            communication:    Set(req.communication),
            would_work_again: Set(req.would_work_again),
            would_recommend:  Set(req.would_recommend),
            comments:         Set(req.comments),
            created_at:       Set(chrono::Utc::now()),
        };
        let created = row.insert(&txn).await?;

        txn.commit().await?;
        info!(
            evaluation_id = %created.id,
            kind = %created.kind,
            subject_id = %created.subject_id,
            "Evaluation recorded"
        );
        Ok(created)
    }

    /// Subject statistics, preferring the aggregate view with a mandatory
    /// per-row fallback.
    pub async fn stats_for(&self, subject_id: Uuid) -> Result<SubjectStats> {
        let query = Statement::from_sql_and_values(
            self.db.get_database_backend(),
            "SELECT kind, eval_count, overall_sum, recommended_true, recommended_answered \
             FROM evaluation_subject_stats WHERE subject_id = $1",
            [subject_id.into()],
        );
        match StatsViewRow::find_by_statement(query).all(&*self.db).await {
            Ok(rows) => stats_from_view_rows(subject_id, rows),
            Err(err) => {
                warn!(error = %err, "Aggregate stats view unavailable; computing per-row");
                self.stats_per_row(subject_id).await
            },
        }
    }

    async fn stats_per_row(&self, subject_id: Uuid) -> Result<SubjectStats> {
        let rows = Evaluations::find()
            .filter(EvaluationColumn::SubjectId.eq(subject_id))
            .all(&*self.db)
            .await?;
        let records: Vec<EvaluationRecord> = rows.iter().map(EvaluationRecord::from_model).collect();
        Ok(SubjectStats::from_records(subject_id, &records))
    }

    /// Evaluations a subject received, normalized.
    pub async fn received_by(&self, subject_id: Uuid) -> Result<Vec<evaluations::Model>> {
        Ok(Evaluations::find()
            .filter(EvaluationColumn::SubjectId.eq(subject_id))
            .all(&*self.db)
            .await?)
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use entity::users::UserRole;
    use sea_orm::{DatabaseBackend, MockDatabase};

    use super::*;

    fn new_eval(kind: EvaluationKind) -> NewEvaluation {
        NewEvaluation {
            kind,
            subject_id: Uuid::new_v4(),
            event_id: Uuid::new_v4(),
            team_id: Uuid::new_v4(),
            overall_rating: 4,
            punctuality: None,
            teamwork: None,
            leadership: None,
            organization: None,
            support: None,
            communication: None,
            would_work_again: None,
            would_recommend: None,
            comments: None,
        }
    }

    fn event(status: EventStatus) -> events::Model {
        events::Model {
            id:             Uuid::new_v4(),
            title:          "Harvest festival".to_string(),
            description:    None,
            event_date:     Utc::now().date_naive(),
            status,
            max_volunteers: 10,
            created_by:     Uuid::new_v4(),
            created_at:     Utc::now(),
            updated_at:     Utc::now(),
        }
    }

    fn member(user_id: Uuid, role: TeamRole, status: MemberStatus) -> team_members::Model {
        team_members::Model {
            id: Uuid::new_v4(),
            team_id: Uuid::new_v4(),
            user_id,
            role,
            status,
            joined_at: Utc::now(),
            left_at: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn record(kind: EvaluationKind, overall: i16, recommended: Option<bool>) -> EvaluationRecord {
        match kind {
            EvaluationKind::VolunteerByCaptain => EvaluationRecord::VolunteerByCaptain {
                overall_rating:   overall,
                punctuality:      None,
                teamwork:         None,
                would_work_again: recommended,
            },
            EvaluationKind::CaptainByAdmin => EvaluationRecord::CaptainByAdmin {
                overall_rating:  overall,
                leadership:      None,
                organization:    None,
                would_recommend: recommended,
            },
            EvaluationKind::CaptainByVolunteer => EvaluationRecord::CaptainByVolunteer {
                overall_rating:  overall,
                leadership:      None,
                support:         None,
                communication:   None,
                would_recommend: recommended,
            },
        }
    }

    #[test]
    fn test_shape_rejects_out_of_range() {
        let mut req = new_eval(EvaluationKind::VolunteerByCaptain);
        req.overall_rating = 6;
        assert_eq!(validate_shape(&req).unwrap_err().code(), "VALIDATION_ERROR");
        req.overall_rating = 4;
        req.punctuality = Some(0);
        assert_eq!(validate_shape(&req).unwrap_err().code(), "VALIDATION_ERROR");
    }

    #[test]
    fn test_shape_rejects_foreign_fields() {
        let mut req = new_eval(EvaluationKind::VolunteerByCaptain);
        req.leadership = Some(3);
        assert!(validate_shape(&req).is_err());

        let mut req = new_eval(EvaluationKind::CaptainByAdmin);
        req.would_work_again = Some(true);
        assert!(validate_shape(&req).is_err());

        let mut req = new_eval(EvaluationKind::CaptainByVolunteer);
        req.punctuality = Some(5);
        assert!(validate_shape(&req).is_err());
    }

    #[test]
    fn test_shape_accepts_own_fields() {
        let mut req = new_eval(EvaluationKind::CaptainByVolunteer);
        req.leadership = Some(5);
        req.support = Some(4);
        req.communication = Some(3);
        req.would_recommend = Some(true);
        assert!(validate_shape(&req).is_ok());
    }

    #[test]
    fn test_eligibility_requires_completed_event() {
        let rater = member(Uuid::new_v4(), TeamRole::Captain, MemberStatus::Inactive);
        let subject = member(Uuid::new_v4(), TeamRole::Volunteer, MemberStatus::Inactive);
        let err = check_eligibility(
            EvaluationKind::VolunteerByCaptain,
            &event(EventStatus::InProgress),
            false,
            std::slice::from_ref(&rater),
            std::slice::from_ref(&subject),
        )
        .unwrap_err();
        assert_eq!(err.code(), "NOT_ELIGIBLE");

        assert!(check_eligibility(
            EvaluationKind::VolunteerByCaptain,
            &event(EventStatus::Completed),
            false,
            &[rater],
            &[subject],
        )
        .is_ok());
    }

    #[test]
    fn test_eligibility_checks_team_roles() {
        let completed = event(EventStatus::Completed);
        let volunteer_row = member(Uuid::new_v4(), TeamRole::Volunteer, MemberStatus::Inactive);
        let captain_row = member(Uuid::new_v4(), TeamRole::Captain, MemberStatus::Inactive);

        // A volunteer cannot file a volunteer_by_captain evaluation.
        let err = check_eligibility(
            EvaluationKind::VolunteerByCaptain,
            &completed,
            false,
            std::slice::from_ref(&volunteer_row),
            std::slice::from_ref(&volunteer_row),
        )
        .unwrap_err();
        assert_eq!(err.code(), "NOT_ELIGIBLE");

        // Removed rows never qualify.
        let removed_captain = member(Uuid::new_v4(), TeamRole::Captain, MemberStatus::Removed);
        assert!(check_eligibility(
            EvaluationKind::CaptainByVolunteer,
            &completed,
            false,
            std::slice::from_ref(&volunteer_row),
            std::slice::from_ref(&removed_captain),
        )
        .is_err());

        // captain_by_admin needs a global admin rater with no row of their own.
        assert!(check_eligibility(
            EvaluationKind::CaptainByAdmin,
            &completed,
            true,
            &[],
            std::slice::from_ref(&captain_row),
        )
        .is_ok());
        assert!(check_eligibility(
            EvaluationKind::CaptainByAdmin,
            &completed,
            false,
            &[],
            std::slice::from_ref(&captain_row),
        )
        .is_err());
    }

    #[test]
    fn test_stats_merge_across_shapes() {
        let subject = Uuid::new_v4();
        let records = vec![
            record(EvaluationKind::VolunteerByCaptain, 4, Some(true)),
            record(EvaluationKind::VolunteerByCaptain, 2, Some(false)),
            record(EvaluationKind::CaptainByVolunteer, 5, Some(true)),
            record(EvaluationKind::CaptainByAdmin, 5, None),
        ];
        let stats = SubjectStats::from_records(subject, &records);
        assert_eq!(stats.count, 4);
        assert_eq!(stats.mean_overall, Some(4.0));
        // 2 of 3 answered recommendations were positive.
        let rate = stats.recommendation_rate.unwrap();
        assert!((rate - 200.0 / 3.0).abs() < 1e-9);
        assert_eq!(stats.by_kind.len(), 3);
        let volunteer_kind = &stats.by_kind[0];
        assert_eq!(volunteer_kind.kind, EvaluationKind::VolunteerByCaptain);
        assert_eq!(volunteer_kind.count, 2);
        assert_eq!(volunteer_kind.mean_overall, Some(3.0));
        assert_eq!(volunteer_kind.recommendation_rate, Some(50.0));
    }

    #[test]
    fn test_stats_empty_subject() {
        let stats = SubjectStats::from_records(Uuid::new_v4(), &[]);
        assert_eq!(stats.count, 0);
        assert_eq!(stats.mean_overall, None);
        assert_eq!(stats.recommendation_rate, None);
        assert!(stats.by_kind.is_empty());
    }

    #[test]
    fn test_view_path_matches_per_row_path() {
        let subject = Uuid::new_v4();
        let records = vec![
            record(EvaluationKind::VolunteerByCaptain, 4, Some(true)),
            record(EvaluationKind::VolunteerByCaptain, 3, Some(true)),
            record(EvaluationKind::VolunteerByCaptain, 1, Some(false)),
            record(EvaluationKind::CaptainByAdmin, 5, Some(true)),
        ];
        let per_row = SubjectStats::from_records(subject, &records);

        let view_rows = vec![
            StatsViewRow {
                kind:                 "volunteer_by_captain".to_string(),
                eval_count:           3,
                overall_sum:          8,
                recommended_true:     2,
                recommended_answered: 3,
            },
            StatsViewRow {
                kind:                 "captain_by_admin".to_string(),
                eval_count:           1,
                overall_sum:          5,
                recommended_true:     1,
                recommended_answered: 1,
            },
        ];
        let from_view = stats_from_view_rows(subject, view_rows).unwrap();
        assert_eq!(per_row, from_view);
    }

    #[tokio::test]
    async fn test_submit_rejects_duplicate() {
        let rater = Uuid::new_v4();
        let mut req = new_eval(EvaluationKind::VolunteerByCaptain);
        let completed = events::Model {
            id: req.event_id,
            ..event(EventStatus::Completed)
        };
        let team = entity::teams::Model {
            id:             req.team_id,
            event_id:       req.event_id,
            name:           "Kitchen".to_string(),
            captain_id:     Some(rater),
            max_volunteers: 5,
            status:         entity::teams::TeamStatus::Finished,
            created_at:     Utc::now(),
            updated_at:     Utc::now(),
        };
        let existing = evaluations::Model {
            id:               Uuid::new_v4(),
            kind:             EvaluationKind::VolunteerByCaptain,
            subject_id:       req.subject_id,
            rater_id:         rater,
            event_id:         req.event_id,
            team_id:          req.team_id,
            overall_rating:   3,
            punctuality:      None,
            teamwork:         None,
            leadership:       None,
            organization:     None,
            support:          None,
            communication:    None,
            would_work_again: None,
            would_recommend:  None,
            comments:         None,
            created_at:       Utc::now(),
        };

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![completed]])
            .append_query_results([vec![team]])
            .append_query_results([vec![existing]])
            .into_connection();
        let service = EvaluationService::new(db);
        let actor = Actor {
            id:        rater,
            role:      UserRole::Captain,
            is_active: true,
        };
        req.would_work_again = Some(true);
        let err = service.submit(&actor, req).await.unwrap_err();
        assert_eq!(err.code(), "DUPLICATE_EVALUATION");
    }
}
