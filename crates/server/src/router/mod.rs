//! # API Router Configuration
//!
//! Route table plus thin wrapper handlers. Wrappers only extract; all
//! logic lives in [`crate::handlers`].

use axum::{
    extract::{Extension, Path, Query, State as AxumState},
    middleware,
    routing::{delete, get, post, put},
    Json,
    Router,
};
use engine::{Actor, SubjectStats};
use error::Result;
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use crate::dto;
use crate::handlers;
use crate::AppState;

/// Creates the API router with all routes behind actor resolution
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/api/v1/users", get(list_users_handler).post(create_user_handler))
        .route(
            "/api/v1/users/:id",
            get(get_user_handler).put(update_user_handler).delete(delete_user_handler),
        )
        .route("/api/v1/users/:id/promote-captain", post(promote_captain_handler))
        .route("/api/v1/users/:id/demote-captain", post(demote_captain_handler))
        .route("/api/v1/users/:id/promote-admin", post(promote_admin_handler))
        .route("/api/v1/users/:id/demote-admin", post(demote_admin_handler))
        .route("/api/v1/users/:id/evaluations", get(list_received_handler))
        .route("/api/v1/users/:id/evaluation-stats", get(evaluation_stats_handler))
        .route("/api/v1/events", get(list_events_handler).post(create_event_handler))
        .route(
            "/api/v1/events/:id",
            get(get_event_handler)
                .put(update_event_handler)
                .delete(delete_event_handler),
        )
        .route("/api/v1/events/:id/advance", post(advance_event_handler))
        .route(
            "/api/v1/events/:id/registrations",
            get(list_registrations_handler).post(register_handler),
        )
        .route("/api/v1/registrations/:id/confirm", post(confirm_registration_handler))
        .route("/api/v1/registrations/:id/cancel", post(cancel_registration_handler))
        .route("/api/v1/registrations/:id/transfer", post(transfer_registration_handler))
        .route("/api/v1/events/:id/teams", post(create_team_handler))
        .route(
            "/api/v1/teams/:id",
            get(get_team_handler).put(update_team_handler).delete(delete_team_handler),
        )
        .route("/api/v1/teams/:id/captain", put(set_captain_handler))
        .route("/api/v1/teams/:id/members", post(join_team_handler))
        .route("/api/v1/teams/:id/members/:user_id", delete(leave_team_handler))
        .route("/api/v1/team-members/:id", delete(remove_member_handler))
        .route("/api/v1/evaluations", post(submit_evaluation_handler))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            crate::middleware::actor::actor_middleware,
        ))
        .with_state(state)
}

async fn list_users_handler(
    AxumState(state): AxumState<AppState>,
    Extension(actor): Extension<Actor>,
    Query(query): Query<dto::users::UserListQuery>,
) -> Result<Json<dto::users::UserListResponse>> {
    handlers::users::list_users_inner(&state, &actor, query).await
}

async fn create_user_handler(
    AxumState(state): AxumState<AppState>,
    Extension(actor): Extension<Actor>,
    Json(req): Json<dto::users::CreateUserRequest>,
) -> Result<Json<dto::users::UserResponse>> {
    handlers::users::create_user_inner(&state, &actor, req).await
}

async fn get_user_handler(
    AxumState(state): AxumState<AppState>,
    Extension(actor): Extension<Actor>,
    Path(user_id): Path<Uuid>,
) -> Result<Json<dto::users::UserResponse>> {
    handlers::users::get_user_inner(&state, &actor, user_id).await
}

async fn update_user_handler(
    AxumState(state): AxumState<AppState>,
    Extension(actor): Extension<Actor>,
    Path(user_id): Path<Uuid>,
    Json(req): Json<dto::users::UpdateUserRequest>,
) -> Result<Json<dto::users::UserResponse>> {
    handlers::users::update_user_inner(&state, &actor, user_id, req).await
}

async fn delete_user_handler(
    AxumState(state): AxumState<AppState>,
    Extension(actor): Extension<Actor>,
    Path(user_id): Path<Uuid>,
) -> Result<Json<dto::SuccessResponse>> {
    handlers::users::delete_user_inner(&state, &actor, user_id).await
}

async fn promote_captain_handler(
    AxumState(state): AxumState<AppState>,
    Extension(actor): Extension<Actor>,
    Path(user_id): Path<Uuid>,
) -> Result<Json<dto::users::UserResponse>> {
    handlers::users::promote_captain_inner(&state, &actor, user_id).await
}

async fn demote_captain_handler(
    AxumState(state): AxumState<AppState>,
    Extension(actor): Extension<Actor>,
    Path(user_id): Path<Uuid>,
) -> Result<Json<dto::users::UserResponse>> {
    handlers::users::demote_captain_inner(&state, &actor, user_id).await
}

async fn promote_admin_handler(
    AxumState(state): AxumState<AppState>,
    Extension(actor): Extension<Actor>,
    Path(user_id): Path<Uuid>,
) -> Result<Json<dto::users::UserResponse>> {
    handlers::users::promote_admin_inner(&state, &actor, user_id).await
}

async fn demote_admin_handler(
    AxumState(state): AxumState<AppState>,
    Extension(actor): Extension<Actor>,
    Path(user_id): Path<Uuid>,
) -> Result<Json<dto::users::UserResponse>> {
    handlers::users::demote_admin_inner(&state, &actor, user_id).await
}

async fn list_received_handler(
    AxumState(state): AxumState<AppState>,
    Extension(actor): Extension<Actor>,
    Path(subject_id): Path<Uuid>,
) -> Result<Json<dto::evaluations::EvaluationListResponse>> {
    handlers::evaluations::list_received_inner(&state, &actor, subject_id).await
}

async fn evaluation_stats_handler(
    AxumState(state): AxumState<AppState>,
    Extension(actor): Extension<Actor>,
    Path(subject_id): Path<Uuid>,
) -> Result<Json<SubjectStats>> {
    handlers::evaluations::stats_inner(&state, &actor, subject_id).await
}

async fn list_events_handler(
    AxumState(state): AxumState<AppState>,
    Extension(actor): Extension<Actor>,
) -> Result<Json<dto::events::EventListResponse>> {
    handlers::events::list_events_inner(&state, &actor).await
}

async fn create_event_handler(
    AxumState(state): AxumState<AppState>,
    Extension(actor): Extension<Actor>,
    Json(req): Json<dto::events::CreateEventRequest>,
) -> Result<Json<dto::events::EventResponse>> {
    handlers::events::create_event_inner(&state, &actor, req).await
}

async fn get_event_handler(
    AxumState(state): AxumState<AppState>,
    Extension(actor): Extension<Actor>,
    Path(event_id): Path<Uuid>,
) -> Result<Json<dto::events::EventResponse>> {
    handlers::events::get_event_inner(&state, &actor, event_id).await
}

async fn update_event_handler(
    AxumState(state): AxumState<AppState>,
    Extension(actor): Extension<Actor>,
    Path(event_id): Path<Uuid>,
    Json(req): Json<dto::events::UpdateEventRequest>,
) -> Result<Json<dto::events::EventResponse>> {
    handlers::events::update_event_inner(&state, &actor, event_id, req).await
}

async fn delete_event_handler(
    AxumState(state): AxumState<AppState>,
    Extension(actor): Extension<Actor>,
    Path(event_id): Path<Uuid>,
) -> Result<Json<dto::SuccessResponse>> {
    handlers::events::delete_event_inner(&state, &actor, event_id).await
}

async fn advance_event_handler(
    AxumState(state): AxumState<AppState>,
    Extension(actor): Extension<Actor>,
    Path(event_id): Path<Uuid>,
    Json(req): Json<dto::events::AdvanceEventRequest>,
) -> Result<Json<dto::events::EventResponse>> {
    handlers::events::advance_event_inner(&state, &actor, event_id, req).await
}

async fn list_registrations_handler(
    AxumState(state): AxumState<AppState>,
    Extension(actor): Extension<Actor>,
    Path(event_id): Path<Uuid>,
) -> Result<Json<dto::events::RegistrationListResponse>> {
    handlers::registrations::list_registrations_inner(&state, &actor, event_id).await
}

async fn register_handler(
    AxumState(state): AxumState<AppState>,
    Extension(actor): Extension<Actor>,
    Path(event_id): Path<Uuid>,
) -> Result<Json<dto::events::RegistrationResponse>> {
    handlers::registrations::register_inner(&state, &actor, event_id).await
}

async fn confirm_registration_handler(
    AxumState(state): AxumState<AppState>,
    Extension(actor): Extension<Actor>,
    Path(registration_id): Path<Uuid>,
) -> Result<Json<dto::events::RegistrationResponse>> {
    handlers::registrations::confirm_registration_inner(&state, &actor, registration_id).await
}

async fn cancel_registration_handler(
    AxumState(state): AxumState<AppState>,
    Extension(actor): Extension<Actor>,
    Path(registration_id): Path<Uuid>,
) -> Result<Json<dto::events::RegistrationResponse>> {
    handlers::registrations::cancel_registration_inner(&state, &actor, registration_id).await
}

async fn transfer_registration_handler(
    AxumState(state): AxumState<AppState>,
    Extension(actor): Extension<Actor>,
    Path(registration_id): Path<Uuid>,
) -> Result<Json<dto::events::RegistrationResponse>> {
    handlers::registrations::transfer_registration_inner(&state, &actor, registration_id).await
}

async fn create_team_handler(
    AxumState(state): AxumState<AppState>,
    Extension(actor): Extension<Actor>,
    Path(event_id): Path<Uuid>,
    Json(req): Json<dto::teams::CreateTeamRequest>,
) -> Result<Json<dto::teams::TeamResponse>> {
    handlers::teams::create_team_inner(&state, &actor, event_id, req).await
}

async fn get_team_handler(
    AxumState(state): AxumState<AppState>,
    Extension(actor): Extension<Actor>,
    Path(team_id): Path<Uuid>,
) -> Result<Json<dto::teams::TeamDetailResponse>> {
    handlers::teams::get_team_inner(&state, &actor, team_id).await
}

async fn update_team_handler(
    AxumState(state): AxumState<AppState>,
    Extension(actor): Extension<Actor>,
    Path(team_id): Path<Uuid>,
    Json(req): Json<dto::teams::UpdateTeamRequest>,
) -> Result<Json<dto::teams::TeamResponse>> {
    handlers::teams::update_team_inner(&state, &actor, team_id, req).await
}

async fn delete_team_handler(
    AxumState(state): AxumState<AppState>,
    Extension(actor): Extension<Actor>,
    Path(team_id): Path<Uuid>,
) -> Result<Json<dto::SuccessResponse>> {
    handlers::teams::delete_team_inner(&state, &actor, team_id).await
}

async fn set_captain_handler(
    AxumState(state): AxumState<AppState>,
    Extension(actor): Extension<Actor>,
    Path(team_id): Path<Uuid>,
    Json(req): Json<dto::teams::MemberRequest>,
) -> Result<Json<dto::teams::TeamResponse>> {
    handlers::teams::set_captain_inner(&state, &actor, team_id, req).await
}

async fn join_team_handler(
    AxumState(state): AxumState<AppState>,
    Extension(actor): Extension<Actor>,
    Path(team_id): Path<Uuid>,
    Json(req): Json<dto::teams::MemberRequest>,
) -> Result<Json<dto::teams::TeamMemberResponse>> {
    handlers::teams::join_team_inner(&state, &actor, team_id, req).await
}

async fn leave_team_handler(
    AxumState(state): AxumState<AppState>,
    Extension(actor): Extension<Actor>,
    Path((team_id, user_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<dto::SuccessResponse>> {
    handlers::teams::leave_team_inner(&state, &actor, team_id, user_id).await
}

async fn remove_member_handler(
    AxumState(state): AxumState<AppState>,
    Extension(actor): Extension<Actor>,
    Path(member_id): Path<Uuid>,
) -> Result<Json<dto::SuccessResponse>> {
    handlers::teams::remove_member_inner(&state, &actor, member_id).await
}

async fn submit_evaluation_handler(
    AxumState(state): AxumState<AppState>,
    Extension(actor): Extension<Actor>,
    Json(req): Json<dto::evaluations::SubmitEvaluationRequest>,
) -> Result<Json<dto::evaluations::EvaluationResponse>> {
    handlers::evaluations::submit_evaluation_inner(&state, &actor, req).await
}

/// Creates the health check router
pub fn create_health_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .with_state(state)
}

async fn health_handler(AxumState(state): AxumState<AppState>) -> Json<handlers::health::HealthResponse> {
    handlers::health::health_inner(&state).await
}

/// Creates the main application router
pub fn create_app_router(state: AppState) -> Router {
    Router::new()
        .merge(create_health_router(state.clone()))
        .merge(create_router(state))
        .layer(TraceLayer::new_for_http())
}
