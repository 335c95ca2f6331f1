//! Opaque session tokens with a fixed TTL.
//!
//! One logical session per user: issuing stores the new token on the user row,
//! so any previously issued token simply stops resolving. There is no
//! server-side revocation list; logout is a client-side token discard.

use chrono::{DateTime, Duration, Utc};

use crate::db::{Store, User};
use crate::services::auth_service::AuthError;

/// Token plus its expiry, as handed back to the client.
#[derive(Debug, Clone)]
pub struct IssuedSession {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

#[derive(Clone)]
pub struct SessionManager {
    store: Store,
    ttl: Duration,
}

impl SessionManager {
    #[must_use]
    pub fn new(store: Store, ttl_hours: i64) -> Self {
        Self {
            store,
            ttl: Duration::hours(ttl_hours),
        }
    }

    /// Issue a fresh token for the user and persist it as their current
    /// session, invalidating any prior one. Single read-modify-write per user;
    /// concurrent logins resolve last-writer-wins.
    pub async fn issue(&self, user_id: i32) -> Result<IssuedSession, AuthError> {
        self.issue_at(user_id, Utc::now()).await
    }

    pub(crate) async fn issue_at(
        &self,
        user_id: i32,
        now: DateTime<Utc>,
    ) -> Result<IssuedSession, AuthError> {
        let token = generate_session_token();
        let expires_at = now + self.ttl;

        self.store
            .set_user_session(user_id, &token, &expires_at.to_rfc3339(), &now.to_rfc3339())
            .await?;

        Ok(IssuedSession { token, expires_at })
    }

    /// Resolve a token to its user. Pure read; never mutates.
    pub async fn validate(&self, token: &str) -> Result<User, AuthError> {
        self.validate_at(token, Utc::now()).await
    }

    pub(crate) async fn validate_at(
        &self,
        token: &str,
        now: DateTime<Utc>,
    ) -> Result<User, AuthError> {
        if token.is_empty() {
            return Err(AuthError::SessionInvalid);
        }

        let user = self
            .store
            .find_user_by_session_token(token)
            .await?
            .ok_or(AuthError::SessionInvalid)?;

        let expires_at = user
            .session_expires_at
            .as_deref()
            .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
            .ok_or(AuthError::SessionInvalid)?;

        if now >= expires_at {
            return Err(AuthError::SessionExpired);
        }

        Ok(user)
    }
}

/// Random session token: 32 bytes (256 bits) as a 64-char hex string.
#[must_use]
pub fn generate_session_token() -> String {
    use rand::Rng;

    let mut rng = rand::rng();
    let bytes: [u8; 32] = rng.random();

    bytes.iter().fold(String::with_capacity(64), |mut acc, b| {
        use std::fmt::Write;
        let _ = write!(acc, "{b:02x}");
        acc
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Store;

    async fn store() -> Store {
        // A single connection so the in-memory database is shared.
        Store::with_pool_options("sqlite::memory:", 1, 1)
            .await
            .unwrap()
    }

    async fn seeded_user(store: &Store) -> i32 {
        store
            .create_user("bob@inst.edu", "$argon2id$fake", "ext-1")
            .await
            .unwrap()
            .id
    }

    #[test]
    fn test_token_shape() {
        let token = generate_session_token();
        assert_eq!(token.len(), 64);
        assert!(token.bytes().all(|b| b.is_ascii_hexdigit()));
        assert_ne!(token, generate_session_token());
    }

    #[tokio::test]
    async fn test_issue_then_validate() {
        let store = store().await;
        let sessions = SessionManager::new(store.clone(), 24);
        let user_id = seeded_user(&store).await;

        let issued = sessions.issue(user_id).await.unwrap();
        let user = sessions.validate(&issued.token).await.unwrap();
        assert_eq!(user.id, user_id);

        assert!(matches!(
            sessions.validate("not-a-token").await,
            Err(AuthError::SessionInvalid)
        ));
    }

    #[tokio::test]
    async fn test_expiry_boundary() {
        let store = store().await;
        let sessions = SessionManager::new(store.clone(), 24);
        let user_id = seeded_user(&store).await;

        let now = Utc::now();
        let issued = sessions.issue_at(user_id, now).await.unwrap();

        // Valid one second before expiry, rejected one second after.
        let just_before = issued.expires_at - Duration::seconds(1);
        assert!(sessions.validate_at(&issued.token, just_before).await.is_ok());

        let just_after = issued.expires_at + Duration::seconds(1);
        assert!(matches!(
            sessions.validate_at(&issued.token, just_after).await,
            Err(AuthError::SessionExpired)
        ));
    }

    #[tokio::test]
    async fn test_reissue_invalidates_prior_token() {
        let store = store().await;
        let sessions = SessionManager::new(store.clone(), 24);
        let user_id = seeded_user(&store).await;

        let first = sessions.issue(user_id).await.unwrap();
        let second = sessions.issue(user_id).await.unwrap();

        assert!(matches!(
            sessions.validate(&first.token).await,
            Err(AuthError::SessionInvalid)
        ));
        assert!(sessions.validate(&second.token).await.is_ok());
    }
}
