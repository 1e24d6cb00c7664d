//! # Actor Resolution Middleware
//!
//! Authentication happens upstream: the deployment's authenticating proxy
//! forwards the caller's id in the `x-user-id` header. This middleware
//! loads the user row, rejects unknown or deactivated callers, and attaches
//! the resolved [`Actor`] to request extensions for handlers to consume.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use engine::Actor;
use entity::Users;
use error::AppError;
use sea_orm::EntityTrait;
use uuid::Uuid;

use crate::AppState;

pub const USER_ID_HEADER: &str = "x-user-id";

/// Resolve the acting caller from the `x-user-id` header.
pub async fn actor_middleware(State(state): State<AppState>, mut request: Request, next: Next) -> Response {
    let actor = match resolve_actor(&state, request.headers()).await {
        Ok(actor) => actor,
        Err(err) => return err.into_response(),
    };
    request.extensions_mut().insert(actor);
    next.run(request).await
}

async fn resolve_actor(state: &AppState, headers: &axum::http::HeaderMap) -> Result<Actor, AppError> {
    let raw = headers
        .get(USER_ID_HEADER)
        .ok_or_else(|| AppError::unauthorized("Missing x-user-id header"))?
        .to_str()
        .map_err(|_| AppError::unauthorized("Invalid x-user-id header encoding"))?;
    let user_id: Uuid = raw
        .parse()
        .map_err(|_| AppError::unauthorized("Invalid x-user-id header"))?;

    let user = Users::find_by_id(user_id)
        .one(&*state.db)
        .await?
        .ok_or_else(|| AppError::unauthorized("Unknown caller"))?;
    Actor::from_user(&user)
}
