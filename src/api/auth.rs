use axum::{
    Extension, Json,
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::IntoResponse,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::{ApiError, ApiResponse, AppState};
use crate::services::LoginOutcome;

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub external_id: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterResponse {
    pub user_id: i32,
    pub email: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Either a full session grant or a prompt for the second factor. The
/// two-factor branch deliberately carries no token.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub user_id: i32,
    pub requires_second_factor: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyTwoFactorRequest {
    pub user_id: i32,
    pub code: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionResponse {
    pub user_id: i32,
    pub session_token: String,
    pub expires_at: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrollTwoFactorRequest {
    pub user_id: Option<i32>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrollTwoFactorResponse {
    pub secret: String,
    pub provisioning_uri: String,
}

// ============================================================================
// Middleware
// ============================================================================

/// Authenticated identity attached to requests behind the session middleware.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: i32,
    pub email: String,
}

/// Session middleware: resolves the bearer token from the `Authorization`
/// header (or `X-Session-Token`) and attaches the user as an extension.
pub async fn auth_middleware(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Result<impl IntoResponse, ApiError> {
    let token = extract_session_token(&headers)
        .ok_or_else(|| ApiError::Unauthorized("Missing session token".to_string()))?;

    let user = state.shared.auth_service.validate_session(&token).await?;

    request.extensions_mut().insert(AuthUser {
        id: user.id,
        email: user.email,
    });

    Ok(next.run(request).await)
}

/// Reject a request that names a user other than the session's own.
pub fn check_user_scope(auth_user: &AuthUser, requested: Option<i32>) -> Result<(), ApiError> {
    match requested {
        Some(id) if id != auth_user.id => Err(ApiError::Unauthorized(
            "userId does not match the session".to_string(),
        )),
        _ => Ok(()),
    }
}

fn extract_session_token(headers: &HeaderMap) -> Option<String> {
    if let Some(auth_header) = headers.get("Authorization")
        && let Ok(auth_str) = auth_header.to_str()
        && let Some(token) = auth_str.strip_prefix("Bearer ")
    {
        return Some(token.trim().to_string());
    }

    if let Some(token) = headers.get("X-Session-Token")
        && let Ok(token_str) = token.to_str()
    {
        return Some(token_str.to_string());
    }

    None
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /auth/register
pub async fn register(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<RegisterRequest>,
) -> Result<Json<ApiResponse<RegisterResponse>>, ApiError> {
    if payload.email.is_empty() {
        return Err(ApiError::validation("Email is required"));
    }
    if payload.external_id.is_empty() {
        return Err(ApiError::validation("External ID is required"));
    }

    let registered = state
        .shared
        .auth_service
        .register(&payload.email, &payload.password, &payload.external_id)
        .await?;

    Ok(Json(ApiResponse::success(RegisterResponse {
        user_id: registered.user_id,
        email: registered.email,
    })))
}

/// POST /auth/login
///
/// Returns a session grant directly, or `requiresSecondFactor: true` when
/// the account has a second factor enrolled.
pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<ApiResponse<LoginResponse>>, ApiError> {
    if payload.email.is_empty() || payload.password.is_empty() {
        return Err(ApiError::validation("Email and password are required"));
    }

    let outcome = state
        .shared
        .auth_service
        .login(&payload.email, &payload.password)
        .await?;

    let response = match outcome {
        LoginOutcome::Authenticated(grant) => LoginResponse {
            user_id: grant.user_id,
            requires_second_factor: false,
            session_token: Some(grant.session_token),
            expires_at: Some(grant.expires_at),
        },
        LoginOutcome::SecondFactorRequired { user_id } => LoginResponse {
            user_id,
            requires_second_factor: true,
            session_token: None,
            expires_at: None,
        },
    };

    Ok(Json(ApiResponse::success(response)))
}

/// POST /auth/verify-2fa
pub async fn verify_two_factor(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<VerifyTwoFactorRequest>,
) -> Result<Json<ApiResponse<SessionResponse>>, ApiError> {
    let grant = state
        .shared
        .auth_service
        .verify_second_factor(payload.user_id, &payload.code)
        .await?;

    Ok(Json(ApiResponse::success(SessionResponse {
        user_id: grant.user_id,
        session_token: grant.session_token,
        expires_at: grant.expires_at,
    })))
}

/// POST /auth/enroll-2fa (requires a session)
///
/// A `userId` in the body, if present, must match the session's user.
pub async fn enroll_two_factor(
    State(state): State<Arc<AppState>>,
    Extension(auth_user): Extension<AuthUser>,
    payload: Option<Json<EnrollTwoFactorRequest>>,
) -> Result<Json<ApiResponse<EnrollTwoFactorResponse>>, ApiError> {
    if let Some(Json(body)) = payload {
        check_user_scope(&auth_user, body.user_id)?;
    }

    let enrollment = state
        .shared
        .auth_service
        .enroll_second_factor(auth_user.id)
        .await?;

    Ok(Json(ApiResponse::success(EnrollTwoFactorResponse {
        secret: enrollment.secret,
        provisioning_uri: enrollment.provisioning_uri,
    })))
}

/// GET /auth/me
pub async fn get_current_user(
    State(state): State<Arc<AppState>>,
    Extension(auth_user): Extension<AuthUser>,
) -> Result<Json<ApiResponse<super::UserDto>>, ApiError> {
    let user = state
        .shared
        .store
        .get_user_by_id(auth_user.id)
        .await
        .map_err(|e| ApiError::internal(format!("Failed to get user: {e}")))?
        .ok_or_else(|| ApiError::Unauthorized("User not found".to_string()))?;

    Ok(Json(ApiResponse::success(user.into())))
}
