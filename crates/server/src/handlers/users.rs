//! # User Handlers
//!
//! Profile CRUD plus the global role endpoints. Users are soft-deleted:
//! the account is deactivated and the email tombstoned so the row survives
//! for historical memberships and evaluations.

use axum::Json;
use chrono::Utc;
use engine::{access, Actor};
use entity::{users, Users};
use error::{AppError, Result};
use sea_orm::{ActiveModelTrait, EntityTrait, PaginatorTrait, QueryOrder, Set};
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use crate::dto::users::{CreateUserRequest, UpdateUserRequest, UserListQuery, UserListResponse, UserResponse};
use crate::dto::SuccessResponse;
use crate::AppState;

pub async fn list_users_inner(state: &AppState, actor: &Actor, query: UserListQuery) -> Result<Json<UserListResponse>> {
    access::require_admin(actor)?;
    let paginator = Users::find()
        .order_by_asc(users::Column::CreatedAt)
        .paginate(&*state.db, query.per_page());
    let page = paginator.fetch_page(query.page() - 1).await?;
    Ok(Json(UserListResponse {
        success: true,
        users:   page.into_iter().map(UserResponse::from).collect(),
    }))
}

pub async fn get_user_inner(state: &AppState, _actor: &Actor, user_id: Uuid) -> Result<Json<UserResponse>> {
    let user = Users::find_by_id(user_id)
        .one(&*state.db)
        .await?
        .ok_or_else(|| AppError::not_found("User not found"))?;
    Ok(Json(UserResponse::from(user)))
}

pub async fn create_user_inner(state: &AppState, actor: &Actor, req: CreateUserRequest) -> Result<Json<UserResponse>> {
    access::require_admin(actor)?;
    req.validate()?;

    let now = Utc::now();
    let user = users::ActiveModel {
        id:           Set(Uuid::new_v4()),
        email:        Set(req.email.to_lowercase()),
        display_name: Set(req.display_name),
        role:         Set(users::UserRole::Volunteer),
        is_active:    Set(true),
        avatar_url:   Set(None),
        postal_code:  Set(None),
        street:       Set(None),
        city:         Set(None),
        region:       Set(None),
        created_at:   Set(now),
        updated_at:   Set(now),
        deleted_at:   Set(None),
    };
    let created = user.insert(&*state.db).await?;
    info!(user_id = %created.id, "User created");
    Ok(Json(UserResponse::from(created)))
}

pub async fn update_user_inner(
    state: &AppState,
    actor: &Actor,
    user_id: Uuid,
    req: UpdateUserRequest,
) -> Result<Json<UserResponse>> {
    access::require_self_or_admin(actor, user_id)?;
    req.validate()?;

    let user = Users::find_by_id(user_id)
        .one(&*state.db)
        .await?
        .ok_or_else(|| AppError::not_found("User not found"))?;

    // Advisory enrichment: fill the address from the postal code when the
    // caller supplied neither street nor city. Lookup misses are fine.
    let mut enriched = None;
    if let (Some(lookup), Some(postal_code)) = (&state.lookup, &req.postal_code) {
        if req.street.is_none() && req.city.is_none() {
            enriched = lookup.lookup(postal_code).await.unwrap_or_default();
        }
    }

    let mut active: users::ActiveModel = user.into();
    if let Some(display_name) = req.display_name {
        active.display_name = Set(display_name);
    }
    if let Some(avatar_url) = req.avatar_url {
        active.avatar_url = Set(Some(avatar_url));
    }
    if let Some(postal_code) = req.postal_code {
        active.postal_code = Set(Some(postal_code));
    }
    if let Some(address) = enriched {
        active.street = Set(address.street);
        active.city = Set(Some(address.city));
        active.region = Set(Some(address.region));
    }
    if let Some(street) = req.street {
        active.street = Set(Some(street));
    }
    if let Some(city) = req.city {
        active.city = Set(Some(city));
    }
    if let Some(region) = req.region {
        active.region = Set(Some(region));
    }
    active.updated_at = Set(Utc::now());
    let updated = active.update(&*state.db).await?;
    Ok(Json(UserResponse::from(updated)))
}

pub async fn delete_user_inner(state: &AppState, actor: &Actor, user_id: Uuid) -> Result<Json<SuccessResponse>> {
    access::require_self_or_admin(actor, user_id)?;

    let user = Users::find_by_id(user_id)
        .one(&*state.db)
        .await?
        .ok_or_else(|| AppError::not_found("User not found"))?;
    if !user.is_active {
        return Err(AppError::conflict("Account is already deactivated"));
    }

    let now = Utc::now();
    let mut active: users::ActiveModel = user.into();
    active.is_active = Set(false);
    active.email = Set(format!("deleted-{user_id}@tombstone.invalid"));
    active.deleted_at = Set(Some(now));
    active.updated_at = Set(now);
    active.update(&*state.db).await?;
    info!(user_id = %user_id, "User soft-deleted");
    Ok(Json(SuccessResponse::new("Account deactivated")))
}

pub async fn promote_captain_inner(state: &AppState, actor: &Actor, user_id: Uuid) -> Result<Json<UserResponse>> {
    let updated = state.roles().promote_to_captain(actor, user_id).await?;
    Ok(Json(UserResponse::from(updated)))
}

pub async fn demote_captain_inner(state: &AppState, actor: &Actor, user_id: Uuid) -> Result<Json<UserResponse>> {
    let updated = state.roles().demote_to_volunteer(actor, user_id).await?;
    Ok(Json(UserResponse::from(updated)))
}

pub async fn promote_admin_inner(state: &AppState, actor: &Actor, user_id: Uuid) -> Result<Json<UserResponse>> {
    let updated = state.roles().promote_to_admin(actor, user_id).await?;
    Ok(Json(UserResponse::from(updated)))
}

pub async fn demote_admin_inner(state: &AppState, actor: &Actor, user_id: Uuid) -> Result<Json<UserResponse>> {
    let updated = state.roles().demote_from_admin(actor, user_id).await?;
    Ok(Json(UserResponse::from(updated)))
}
