//! # Registration Handlers
//!
//! Direct event sign-up, separate from team seating. A person may hold
//! both; occupancy counts them once.

use axum::Json;
use engine::{access, external, Actor};
use entity::{event_registrations, EventRegistrations, Events};
use error::{AppError, Result};
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter};
use uuid::Uuid;

use crate::dto::events::{RegistrationListResponse, RegistrationResponse};
use crate::AppState;

pub async fn list_registrations_inner(
    state: &AppState,
    actor: &Actor,
    event_id: Uuid,
) -> Result<Json<RegistrationListResponse>> {
    let event = Events::find_by_id(event_id)
        .one(&*state.db)
        .await?
        .ok_or_else(|| AppError::not_found("Event not found"))?;
    access::require_event_manager(actor, &event)?;

    let rows = EventRegistrations::find()
        .filter(event_registrations::Column::EventId.eq(event_id))
        .all(&*state.db)
        .await?;
    Ok(Json(RegistrationListResponse {
        success:       true,
        registrations: rows.into_iter().map(RegistrationResponse::from).collect(),
    }))
}

pub async fn register_inner(state: &AppState, actor: &Actor, event_id: Uuid) -> Result<Json<RegistrationResponse>> {
    let row = state.membership().register(actor, event_id, actor.id).await?;
    Ok(Json(RegistrationResponse::from(row)))
}

pub async fn confirm_registration_inner(
    state: &AppState,
    actor: &Actor,
    registration_id: Uuid,
) -> Result<Json<RegistrationResponse>> {
    let row = state.membership().confirm_registration(actor, registration_id).await?;
    external::notify_best_effort(
        state.notifier.as_ref(),
        row.user_id,
        "Your event registration was confirmed",
        "registration_confirmed",
    )
    .await;
    Ok(Json(RegistrationResponse::from(row)))
}

pub async fn cancel_registration_inner(
    state: &AppState,
    actor: &Actor,
    registration_id: Uuid,
) -> Result<Json<RegistrationResponse>> {
    let row = state.membership().cancel_registration(actor, registration_id).await?;
    Ok(Json(RegistrationResponse::from(row)))
}

pub async fn transfer_registration_inner(
    state: &AppState,
    actor: &Actor,
    registration_id: Uuid,
) -> Result<Json<RegistrationResponse>> {
    let row = state.membership().transfer_registration(actor, registration_id).await?;
    Ok(Json(RegistrationResponse::from(row)))
}
