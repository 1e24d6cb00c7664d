//! # Event Handlers
//!
//! Event CRUD and status advancement. Reads finalize lazily: loading an
//! event whose date has passed triggers the idempotent completion cascade
//! before the response is built, so clients never observe an expired event
//! still reporting a live status.

use axum::Json;
use engine::{lifecycle, Actor};
use entity::{events, Events};
use error::{AppError, Result};
use sea_orm::{EntityTrait, QueryOrder};
use uuid::Uuid;
use validator::Validate;

use crate::dto::events::{
    AdvanceEventRequest,
    CreateEventRequest,
    EventListResponse,
    EventResponse,
    UpdateEventRequest,
};
use crate::dto::SuccessResponse;
use crate::AppState;

async fn load_with_occupancy(state: &AppState, event: events::Model) -> Result<EventResponse> {
    let occupancy = state.membership().occupancy(event.id).await?;
    Ok(EventResponse::from_model(event, occupancy))
}

pub async fn list_events_inner(state: &AppState, _actor: &Actor) -> Result<Json<EventListResponse>> {
    let rows = Events::find()
        .order_by_asc(events::Column::EventDate)
        .all(&*state.db)
        .await?;
    let today = chrono::Utc::now().date_naive();
    let mut out = Vec::with_capacity(rows.len());
    for event in rows {
        // The list view finalizes expired rows just like the detail view,
        // so neither surface shows an expired event as live.
        let event = if !event.status.is_terminal()
            && event.event_date < today
            && state.lifecycle().finalize_if_expired(event.id).await?
        {
            Events::find_by_id(event.id)
                .one(&*state.db)
                .await?
                .ok_or_else(|| AppError::not_found("Event not found"))?
        }
        else {
            event
        };
        out.push(load_with_occupancy(state, event).await?);
    }
    Ok(Json(EventListResponse {
        success: true,
        events:  out,
    }))
}

pub async fn get_event_inner(state: &AppState, _actor: &Actor, event_id: Uuid) -> Result<Json<EventResponse>> {
    state.lifecycle().finalize_if_expired(event_id).await?;
    let event = Events::find_by_id(event_id)
        .one(&*state.db)
        .await?
        .ok_or_else(|| AppError::not_found("Event not found"))?;
    Ok(Json(load_with_occupancy(state, event).await?))
}

pub async fn create_event_inner(state: &AppState, actor: &Actor, req: CreateEventRequest) -> Result<Json<EventResponse>> {
    req.validate()?;
    let event = state
        .lifecycle()
        .create_event(
            actor,
            lifecycle::NewEvent {
                title:          req.title,
                description:    req.description,
                event_date:     req.event_date,
                max_volunteers: req.max_volunteers,
            },
        )
        .await?;
    Ok(Json(EventResponse::from_model(event, 0)))
}

pub async fn update_event_inner(
    state: &AppState,
    actor: &Actor,
    event_id: Uuid,
    req: UpdateEventRequest,
) -> Result<Json<EventResponse>> {
    req.validate()?;
    let event = state
        .lifecycle()
        .update_event(
            actor,
            event_id,
            lifecycle::EventPatch {
                title:          req.title,
                description:    req.description,
                event_date:     req.event_date,
                max_volunteers: req.max_volunteers,
            },
        )
        .await?;
    Ok(Json(load_with_occupancy(state, event).await?))
}

pub async fn advance_event_inner(
    state: &AppState,
    actor: &Actor,
    event_id: Uuid,
    req: AdvanceEventRequest,
) -> Result<Json<EventResponse>> {
    let event = state.lifecycle().advance(actor, event_id, req.status).await?;
    Ok(Json(load_with_occupancy(state, event).await?))
}

pub async fn delete_event_inner(state: &AppState, actor: &Actor, event_id: Uuid) -> Result<Json<SuccessResponse>> {
    state.lifecycle().delete_event(actor, event_id).await?;
    Ok(Json(SuccessResponse::new("Event deleted")))
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use entity::events::EventStatus;
    use sea_orm::{DatabaseBackend, MockDatabase};

    use super::*;

    #[tokio::test]
    async fn test_list_finalizes_expired_events() {
        let now = Utc::now();
        let expired = events::Model {
            id:             Uuid::new_v4(),
            title:          "Spring plant sale".to_string(),
            description:    None,
            event_date:     now.date_naive() - chrono::Days::new(3),
            status:         EventStatus::Published,
            max_volunteers: 4,
            created_by:     Uuid::new_v4(),
            created_at:     now,
            updated_at:     now,
        };
        let completed = events::Model {
            status: EventStatus::Completed,
            ..expired.clone()
        };

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![expired.clone()]])
            .append_query_results([vec![expired]])
            .append_query_results([Vec::<entity::teams::Model>::new()])
            .append_query_results([Vec::<entity::teams::Model>::new()])
            .append_query_results([vec![completed.clone()]])
            .append_query_results([vec![completed]])
            .append_query_results([Vec::<entity::event_registrations::Model>::new()])
            .append_query_results([Vec::<entity::teams::Model>::new()])
            .into_connection();

        let state = AppState::new(db);
        let actor = Actor {
            id:        Uuid::new_v4(),
            role:      entity::users::UserRole::Volunteer,
            is_active: true,
        };
        let Json(response) = list_events_inner(&state, &actor).await.unwrap();
        assert_eq!(response.events.len(), 1);
        assert_eq!(response.events[0].status, "completed");
        assert_eq!(response.events[0].occupancy, 0);
    }
}
