use axum::{
    Extension, Json,
    extract::{Query, State},
};
use std::sync::Arc;

use super::auth::{AuthUser, check_user_scope};
use super::{ApiError, ApiResponse, AppState, SettingsDto, UserScopeQuery};
use crate::db::SettingsInput;

const PRIVACY_MODES: [&str; 3] = ["standard", "restricted", "open"];

/// GET /settings
///
/// A user who has never saved settings gets the defaults; the row is created
/// on first read.
pub async fn get_settings(
    State(state): State<Arc<AppState>>,
    Extension(auth_user): Extension<AuthUser>,
    Query(query): Query<UserScopeQuery>,
) -> Result<Json<ApiResponse<SettingsDto>>, ApiError> {
    check_user_scope(&auth_user, query.user_id)?;

    let row = state
        .shared
        .store
        .get_or_create_settings(auth_user.id)
        .await
        .map_err(|e| ApiError::DatabaseError(e.to_string()))?;

    Ok(Json(ApiResponse::success(SettingsDto {
        email_notifications: row.email_notifications,
        push_notifications: row.push_notifications,
        reminder_before_hours: row.reminder_before_hours,
        reminder_before_minutes: row.reminder_before_minutes,
        privacy_mode: row.privacy_mode,
        data_sharing: row.data_sharing,
    })))
}

/// PUT /settings
pub async fn update_settings(
    State(state): State<Arc<AppState>>,
    Extension(auth_user): Extension<AuthUser>,
    Json(payload): Json<SettingsDto>,
) -> Result<Json<ApiResponse<SettingsDto>>, ApiError> {
    if !PRIVACY_MODES.contains(&payload.privacy_mode.as_str()) {
        return Err(ApiError::validation(format!(
            "privacyMode must be one of: {}",
            PRIVACY_MODES.join(", ")
        )));
    }
    if payload.reminder_before_hours < 0 || payload.reminder_before_minutes < 0 {
        return Err(ApiError::validation("Reminder offsets cannot be negative"));
    }

    let input = SettingsInput {
        email_notifications: payload.email_notifications,
        push_notifications: payload.push_notifications,
        reminder_before_hours: payload.reminder_before_hours,
        reminder_before_minutes: payload.reminder_before_minutes,
        privacy_mode: payload.privacy_mode.clone(),
        data_sharing: payload.data_sharing,
    };

    state
        .shared
        .store
        .upsert_settings(auth_user.id, &input)
        .await
        .map_err(|e| ApiError::DatabaseError(e.to_string()))?;

    Ok(Json(ApiResponse::success(payload)))
}
