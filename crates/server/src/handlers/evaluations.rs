//! # Evaluation Handlers

use axum::Json;
use engine::{Actor, SubjectStats};
use error::Result;
use uuid::Uuid;
use validator::Validate;

use crate::dto::evaluations::{EvaluationListResponse, EvaluationResponse, SubmitEvaluationRequest};
use crate::AppState;

pub async fn submit_evaluation_inner(
    state: &AppState,
    actor: &Actor,
    req: SubmitEvaluationRequest,
) -> Result<Json<EvaluationResponse>> {
    req.validate()?;
    let created = state.evaluations().submit(actor, req.into()).await?;
    Ok(Json(EvaluationResponse::from(created)))
}

pub async fn list_received_inner(
    state: &AppState,
    _actor: &Actor,
    subject_id: Uuid,
) -> Result<Json<EvaluationListResponse>> {
    let rows = state.evaluations().received_by(subject_id).await?;
    Ok(Json(EvaluationListResponse {
        success:     true,
        evaluations: rows.into_iter().map(EvaluationResponse::from).collect(),
    }))
}

pub async fn stats_inner(state: &AppState, _actor: &Actor, subject_id: Uuid) -> Result<Json<SubjectStats>> {
    let stats = state.evaluations().stats_for(subject_id).await?;
    Ok(Json(stats))
}
