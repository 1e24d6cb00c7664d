//! # Evaluation Data Transfer Objects

use engine::NewEvaluation;
use entity::evaluations::{self, EvaluationKind};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Request to submit an evaluation. The rater is always the acting caller;
/// field applicability per kind is enforced by the engine.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Validate)]
pub struct SubmitEvaluationRequest {
    pub kind:             EvaluationKind,
    pub subject_id:       Uuid,
    pub event_id:         Uuid,
    pub team_id:          Uuid,
    #[validate(range(min = 1, max = 5, message = "overall_rating must be between 1 and 5"))]
    pub overall_rating:   i16,
    pub punctuality:      Option<i16>,
    pub teamwork:         Option<i16>,
    pub leadership:       Option<i16>,
    pub organization:     Option<i16>,
    pub support:          Option<i16>,
    pub communication:    Option<i16>,
    pub would_work_again: Option<bool>,
    pub would_recommend:  Option<bool>,
    #[validate(length(max = 4000, message = "Comments must not exceed 4000 characters"))]
    pub comments:         Option<String>,
}

impl From<SubmitEvaluationRequest> for NewEvaluation {
    fn from(req: SubmitEvaluationRequest) -> Self {
        Self {
            kind:             req.kind,
            subject_id:       req.subject_id,
            event_id:         req.event_id,
            team_id:          req.team_id,
            overall_rating:   req.overall_rating,
            punctuality:      req.punctuality,
            teamwork:         req.teamwork,
            leadership:       req.leadership,
            organization:     req.organization,
            support:          req.support,
            communication:    req.communication,
            would_work_again: req.would_work_again,
            would_recommend:  req.would_recommend,
            comments:         req.comments,
        }
    }
}

/// Response for a stored evaluation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EvaluationResponse {
    pub id:               Uuid,
    pub kind:             String,
    pub subject_id:       Uuid,
    pub rater_id:         Uuid,
    pub event_id:         Uuid,
    pub team_id:          Uuid,
    pub overall_rating:   i16,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub punctuality:      Option<i16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub teamwork:         Option<i16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub leadership:       Option<i16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub organization:     Option<i16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub support:          Option<i16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub communication:    Option<i16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub would_work_again: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub would_recommend:  Option<bool>,
    pub comments:         Option<String>,
    pub created_at:       String,
}

impl From<evaluations::Model> for EvaluationResponse {
    fn from(row: evaluations::Model) -> Self {
        Self {
            id:               row.id,
            kind:             row.kind.to_string(),
            subject_id:       row.subject_id,
            rater_id:         row.rater_id,
            event_id:         row.event_id,
            team_id:          row.team_id,
            overall_rating:   row.overall_rating,
            punctuality:      row.punctuality,
            teamwork:         row.teamwork,
            leadership:       row.leadership,
            organization:     row.organization,
            support:          row.support,
            communication:    row.communication,
            would_work_again: row.would_work_again,
            would_recommend:  row.would_recommend,
            comments:         row.comments,
            created_at:       row.created_at.to_rfc3339(),
        }
    }
}

/// Response for the evaluations a subject received
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EvaluationListResponse {
    pub success:     bool,
    pub evaluations: Vec<EvaluationResponse>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_submit_request_validates_overall_rating() {
        let req = SubmitEvaluationRequest {
            kind:             EvaluationKind::VolunteerByCaptain,
            subject_id:       Uuid::new_v4(),
            event_id:         Uuid::new_v4(),
            team_id:          Uuid::new_v4(),
            overall_rating:   0,
            punctuality:      None,
            teamwork:         None,
            leadership:       None,
            organization:     None,
            support:          None,
            communication:    None,
            would_work_again: None,
            would_recommend:  None,
            comments:         None,
        };
        assert!(req.validate().is_err());
    }
}
