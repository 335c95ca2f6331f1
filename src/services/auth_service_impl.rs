//! `SeaORM` implementation of the `AuthService` trait.

use async_trait::async_trait;
use chrono::Utc;
use tokio::task;
use tracing::info;

use crate::config::{AuthConfig, SecurityConfig};
use crate::db::{Store, User, repositories::user::hash_password};
use crate::services::auth_service::{
    AuthError, AuthService, Enrollment, LoginOutcome, RegisteredUser, SessionGrant,
};
use crate::services::session::SessionManager;
use crate::services::totp;

const MIN_PASSWORD_LENGTH: usize = 8;

pub struct SeaOrmAuthService {
    store: Store,
    sessions: SessionManager,
    auth: AuthConfig,
    security: SecurityConfig,
}

impl SeaOrmAuthService {
    #[must_use]
    pub fn new(store: Store, auth: AuthConfig, security: SecurityConfig) -> Self {
        let sessions = SessionManager::new(store.clone(), auth.session_ttl_hours);
        Self {
            store,
            sessions,
            auth,
            security,
        }
    }

    fn check_email_domain(&self, email: &str) -> Result<(), AuthError> {
        let suffix = format!("@{}", self.auth.allowed_email_domain);
        if email.ends_with(&suffix) && email.len() > suffix.len() {
            Ok(())
        } else {
            Err(AuthError::InvalidEmailDomain(
                self.auth.allowed_email_domain.clone(),
            ))
        }
    }

    async fn grant_session(&self, user_id: i32) -> Result<SessionGrant, AuthError> {
        let issued = self.sessions.issue(user_id).await?;
        Ok(SessionGrant {
            user_id,
            session_token: issued.token,
            expires_at: issued.expires_at.to_rfc3339(),
        })
    }
}

#[async_trait]
impl AuthService for SeaOrmAuthService {
    async fn register(
        &self,
        email: &str,
        password: &str,
        external_id: &str,
    ) -> Result<RegisteredUser, AuthError> {
        self.check_email_domain(email)?;

        if password.len() < MIN_PASSWORD_LENGTH {
            return Err(AuthError::Validation(format!(
                "Password must be at least {MIN_PASSWORD_LENGTH} characters"
            )));
        }

        if self.store.get_user_by_email(email).await?.is_some() {
            return Err(AuthError::DuplicateEmail);
        }

        // Argon2id is CPU-intensive; keep it off the async runtime.
        let password = password.to_string();
        let security = self.security.clone();
        let password_hash = task::spawn_blocking(move || hash_password(&password, Some(&security)))
            .await
            .map_err(|e| AuthError::Internal(format!("Password hashing task panicked: {e}")))??;

        let user = self
            .store
            .create_user(email, &password_hash, external_id)
            .await?;

        info!(user_id = user.id, "Registered new user");

        Ok(RegisteredUser {
            user_id: user.id,
            email: user.email,
        })
    }

    async fn login(&self, email: &str, password: &str) -> Result<LoginOutcome, AuthError> {
        self.check_email_domain(email)?;

        // An unknown email verifies false, so the error below is identical
        // for both failure modes.
        let is_valid = self.store.verify_user_password(email, password).await?;
        if !is_valid {
            return Err(AuthError::InvalidCredentials);
        }

        let user = self
            .store
            .get_user_by_email(email)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        if user.two_factor_enabled {
            return Ok(LoginOutcome::SecondFactorRequired { user_id: user.id });
        }

        let grant = self.grant_session(user.id).await?;
        Ok(LoginOutcome::Authenticated(grant))
    }

    async fn verify_second_factor(
        &self,
        user_id: i32,
        code: &str,
    ) -> Result<SessionGrant, AuthError> {
        let user = self
            .store
            .get_user_by_id(user_id)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        if !user.two_factor_enabled {
            return Err(AuthError::TwoFactorNotEnabled);
        }

        let secret = user.two_factor_secret.as_deref().ok_or_else(|| {
            AuthError::Internal("Two-factor enabled without a stored secret".to_string())
        })?;

        let is_valid = totp::verify(
            secret,
            code,
            self.auth.totp_step_seconds,
            self.auth.totp_skew_steps,
            Utc::now(),
        );

        if !is_valid {
            return Err(AuthError::InvalidTwoFactorCode);
        }

        self.grant_session(user_id).await
    }

    async fn enroll_second_factor(&self, user_id: i32) -> Result<Enrollment, AuthError> {
        let user = self
            .store
            .get_user_by_id(user_id)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        let secret = totp::generate_secret();
        self.store.set_two_factor_secret(user_id, &secret).await?;

        info!(user_id, "Two-factor enrollment completed");

        Ok(Enrollment {
            provisioning_uri: totp::provisioning_uri(
                &self.auth.totp_issuer,
                &user.email,
                &secret,
                self.auth.totp_step_seconds,
            ),
            secret,
        })
    }

    async fn validate_session(&self, token: &str) -> Result<User, AuthError> {
        self.sessions.validate(token).await
    }
}
