//! Domain service for registration, login, and the optional second factor.
//!
//! Drives the `Anonymous -> AwaitingCredentials -> (AwaitingSecondFactor |
//! Authenticated)` state machine; session issuance happens only on the final
//! transition and every failure leaves no partial state behind.

use serde::Serialize;
use thiserror::Error;

use crate::db::User;

/// Errors specific to authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Email must belong to the {0} domain")]
    InvalidEmailDomain(String),

    #[error("Email already registered")]
    DuplicateEmail,

    /// One error for unknown email and wrong password alike, so callers
    /// cannot enumerate accounts.
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Two-factor authentication is not enabled for this account")]
    TwoFactorNotEnabled,

    #[error("Invalid two-factor code")]
    InvalidTwoFactorCode,

    #[error("User not found")]
    UserNotFound,

    #[error("Invalid session")]
    SessionInvalid,

    #[error("Session expired")]
    SessionExpired,

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<sea_orm::DbErr> for AuthError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<anyhow::Error> for AuthError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

/// Identity returned from a successful registration. No session is issued.
#[derive(Debug, Clone, Serialize)]
pub struct RegisteredUser {
    pub user_id: i32,
    pub email: String,
}

/// A completed login: the session token and when it stops being valid.
#[derive(Debug, Clone, Serialize)]
pub struct SessionGrant {
    pub user_id: i32,
    pub session_token: String,
    pub expires_at: String,
}

/// Result of the first login step.
#[derive(Debug, Clone)]
pub enum LoginOutcome {
    /// Password checked out and no second factor is enrolled.
    Authenticated(SessionGrant),
    /// Password checked out but a time-stepped code must follow.
    /// Deliberately carries no token.
    SecondFactorRequired { user_id: i32 },
}

/// Secret and otpauth URI handed to the user exactly once at enrollment.
#[derive(Debug, Clone, Serialize)]
pub struct Enrollment {
    pub secret: String,
    pub provisioning_uri: String,
}

/// Domain service trait for authentication.
#[async_trait::async_trait]
pub trait AuthService: Send + Sync {
    /// Create an account. Enforces the institutional email domain and a
    /// minimum password length; stores only a one-way hash.
    ///
    /// # Errors
    ///
    /// [`AuthError::InvalidEmailDomain`], [`AuthError::DuplicateEmail`],
    /// or [`AuthError::Validation`].
    async fn register(
        &self,
        email: &str,
        password: &str,
        external_id: &str,
    ) -> Result<RegisteredUser, AuthError>;

    /// Login step 1: verify the password and either grant a session or ask
    /// for the second factor.
    async fn login(&self, email: &str, password: &str) -> Result<LoginOutcome, AuthError>;

    /// Login step 2: verify the time-stepped code and grant a session.
    ///
    /// # Errors
    ///
    /// [`AuthError::TwoFactorNotEnabled`] if the user has no second factor,
    /// [`AuthError::InvalidTwoFactorCode`] on a bad code (no state change).
    async fn verify_second_factor(&self, user_id: i32, code: &str)
    -> Result<SessionGrant, AuthError>;

    /// Enroll (or re-enroll) the second factor, replacing any prior secret.
    async fn enroll_second_factor(&self, user_id: i32) -> Result<Enrollment, AuthError>;

    /// Resolve a session token to its user. Pure read.
    async fn validate_session(&self, token: &str) -> Result<User, AuthError>;
}
