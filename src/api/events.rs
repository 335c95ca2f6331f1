use axum::{
    Extension, Json,
    extract::{Path, Query, State},
};
use std::sync::Arc;

use super::auth::{AuthUser, check_user_scope};
use super::{
    ApiError, ApiResponse, AppState, CreateEventRequest, CreatedEventDto, EventDto, EventListDto,
    UpdateEventRequest, UserScopeQuery,
};
use crate::db::EventPatch;
use crate::models::normalize_due_date;

/// Due dates are stored normalized to UTC so the listing order is
/// chronological, whatever offset the client sent.
fn parse_due_date(value: &str) -> Result<String, ApiError> {
    normalize_due_date(value)
        .ok_or_else(|| ApiError::validation("dueDate must be an RFC 3339 timestamp"))
}

/// GET /events
///
/// All of the user's events, soonest due date first.
pub async fn list_events(
    State(state): State<Arc<AppState>>,
    Extension(auth_user): Extension<AuthUser>,
    Query(query): Query<UserScopeQuery>,
) -> Result<Json<ApiResponse<EventListDto>>, ApiError> {
    check_user_scope(&auth_user, query.user_id)?;

    let events = state
        .shared
        .store
        .list_events(auth_user.id)
        .await
        .map_err(|e| ApiError::DatabaseError(e.to_string()))?;

    Ok(Json(ApiResponse::success(EventListDto {
        events: events.into_iter().map(EventDto::from).collect(),
    })))
}

/// POST /events
pub async fn create_event(
    State(state): State<Arc<AppState>>,
    Extension(auth_user): Extension<AuthUser>,
    Json(payload): Json<CreateEventRequest>,
) -> Result<Json<ApiResponse<CreatedEventDto>>, ApiError> {
    if payload.title.trim().is_empty() {
        return Err(ApiError::validation("Title is required"));
    }
    let due_date = parse_due_date(&payload.due_date)?;

    let id = state
        .shared
        .store
        .insert_manual_event(
            auth_user.id,
            payload.title.trim(),
            &payload.description,
            &due_date,
        )
        .await
        .map_err(|e| ApiError::DatabaseError(e.to_string()))?;

    Ok(Json(ApiResponse::success(CreatedEventDto { id })))
}

/// GET /events/{id}
pub async fn get_event(
    State(state): State<Arc<AppState>>,
    Extension(auth_user): Extension<AuthUser>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<EventDto>>, ApiError> {
    let event = state
        .shared
        .store
        .get_event(id, auth_user.id)
        .await
        .map_err(|e| ApiError::DatabaseError(e.to_string()))?
        .ok_or_else(|| ApiError::event_not_found(id))?;

    Ok(Json(ApiResponse::success(event.into())))
}

/// PUT /events/{id}
///
/// Partial update; absent fields are left untouched. Works on both manual
/// and synced rows, so a user can complete a synced assignment.
pub async fn update_event(
    State(state): State<Arc<AppState>>,
    Extension(auth_user): Extension<AuthUser>,
    Path(id): Path<i32>,
    Json(payload): Json<UpdateEventRequest>,
) -> Result<Json<ApiResponse<EventDto>>, ApiError> {
    if let Some(title) = &payload.title
        && title.trim().is_empty()
    {
        return Err(ApiError::validation("Title cannot be empty"));
    }
    let due_date = payload
        .due_date
        .as_deref()
        .map(parse_due_date)
        .transpose()?;

    let patch = EventPatch {
        title: payload.title.map(|t| t.trim().to_string()),
        description: payload.description,
        due_date,
        completed: payload.completed,
    };

    let updated = state
        .shared
        .store
        .update_event(id, auth_user.id, &patch)
        .await
        .map_err(|e| ApiError::DatabaseError(e.to_string()))?;

    if !updated {
        return Err(ApiError::event_not_found(id));
    }

    let event = state
        .shared
        .store
        .get_event(id, auth_user.id)
        .await
        .map_err(|e| ApiError::DatabaseError(e.to_string()))?
        .ok_or_else(|| ApiError::event_not_found(id))?;

    Ok(Json(ApiResponse::success(event.into())))
}

/// DELETE /events/{id}
pub async fn delete_event(
    State(state): State<Arc<AppState>>,
    Extension(auth_user): Extension<AuthUser>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    let deleted = state
        .shared
        .store
        .delete_event(id, auth_user.id)
        .await
        .map_err(|e| ApiError::DatabaseError(e.to_string()))?;

    if !deleted {
        return Err(ApiError::event_not_found(id));
    }

    Ok(Json(ApiResponse::success(())))
}
