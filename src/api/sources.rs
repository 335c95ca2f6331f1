use axum::{
    Extension, Json,
    extract::{Path, State},
};
use std::sync::Arc;

use super::auth::{AuthUser, check_user_scope};
use super::{ApiError, ApiResponse, AppState, LinkSourceDto, LinkSourceRequest};
use crate::models::EventSource;

/// POST /sources/{source_type}/link
///
/// Runs a full sync for the source with the supplied bearer credential.
/// Re-linking with the same token is idempotent; previously synced items are
/// updated in place rather than duplicated.
pub async fn link_source(
    State(state): State<Arc<AppState>>,
    Extension(auth_user): Extension<AuthUser>,
    Path(source_type): Path<String>,
    Json(payload): Json<LinkSourceRequest>,
) -> Result<Json<ApiResponse<LinkSourceDto>>, ApiError> {
    check_user_scope(&auth_user, payload.user_id)?;

    let source = EventSource::parse_linkable(&source_type)
        .ok_or_else(|| ApiError::validation(format!("Unknown source type: {source_type}")))?;

    if payload.bearer_token.is_empty() {
        return Err(ApiError::validation("bearerToken is required"));
    }

    let report = state
        .shared
        .sync_service
        .link_source(auth_user.id, source, &payload.bearer_token)
        .await?;

    Ok(Json(ApiResponse::success(report.into())))
}
