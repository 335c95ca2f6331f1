use anyhow::Result;
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, Statement};
use std::path::Path;
use std::time::Duration;
use tracing::info;

use crate::entities::{calendar_events, external_credentials, user_settings};
use crate::models::{EventSource, NormalizedEvent};

pub mod migrator;
pub mod repositories;

pub use repositories::event::{EventPatch, UpsertOutcome};
pub use repositories::settings::SettingsInput;
pub use repositories::user::User;

#[derive(Clone)]
pub struct Store {
    pub conn: DatabaseConnection,
}

impl Store {
    pub async fn new(db_url: &str) -> Result<Self> {
        Self::with_pool_options(db_url, 5, 1).await
    }

    pub async fn with_pool_options(
        db_url: &str,
        max_connections: u32,
        min_connections: u32,
    ) -> Result<Self> {
        use sea_orm_migration::MigratorTrait;

        if !db_url.contains(":memory:") {
            let path_str = db_url.trim_start_matches("sqlite:");
            if let Some(parent) = Path::new(path_str).parent() {
                tokio::fs::create_dir_all(parent).await.ok();
            }
            if !Path::new(path_str).exists() {
                std::fs::File::create(path_str)?;
            }
        }

        let mut opt = ConnectOptions::new(db_url.to_string());
        opt.max_connections(max_connections)
            .min_connections(min_connections)
            .connect_timeout(Duration::from_secs(10))
            .acquire_timeout(Duration::from_secs(10))
            .idle_timeout(Duration::from_secs(300))
            .max_lifetime(Duration::from_secs(600))
            .sqlx_logging(false);

        let conn = Database::connect(opt).await?;

        migrator::Migrator::up(&conn, None).await?;

        info!(
            "Database connected & migrations applied (pool: {}-{})",
            min_connections, max_connections
        );

        Ok(Self { conn })
    }

    pub async fn ping(&self) -> Result<()> {
        let backend = self.conn.get_database_backend();
        self.conn
            .query_one(Statement::from_string(backend, "SELECT 1".to_string()))
            .await?;
        Ok(())
    }

    fn user_repo(&self) -> repositories::user::UserRepository {
        repositories::user::UserRepository::new(self.conn.clone())
    }

    fn event_repo(&self) -> repositories::event::EventRepository {
        repositories::event::EventRepository::new(self.conn.clone())
    }

    fn credential_repo(&self) -> repositories::credential::CredentialRepository {
        repositories::credential::CredentialRepository::new(self.conn.clone())
    }

    fn settings_repo(&self) -> repositories::settings::SettingsRepository {
        repositories::settings::SettingsRepository::new(self.conn.clone())
    }

    // ========== Users ==========

    pub async fn create_user(
        &self,
        email: &str,
        password_hash: &str,
        external_id: &str,
    ) -> Result<User> {
        self.user_repo()
            .create(email, password_hash, external_id)
            .await
    }

    pub async fn get_user_by_email(&self, email: &str) -> Result<Option<User>> {
        self.user_repo().get_by_email(email).await
    }

    pub async fn get_user_by_id(&self, id: i32) -> Result<Option<User>> {
        self.user_repo().get_by_id(id).await
    }

    pub async fn verify_user_password(&self, email: &str, password: &str) -> Result<bool> {
        self.user_repo().verify_password(email, password).await
    }

    pub async fn set_user_session(
        &self,
        user_id: i32,
        token: &str,
        expires_at: &str,
        last_login_at: &str,
    ) -> Result<()> {
        self.user_repo()
            .set_session(user_id, token, expires_at, last_login_at)
            .await
    }

    pub async fn find_user_by_session_token(&self, token: &str) -> Result<Option<User>> {
        self.user_repo().find_by_session_token(token).await
    }

    pub async fn set_two_factor_secret(&self, user_id: i32, secret: &str) -> Result<()> {
        self.user_repo()
            .set_two_factor_secret(user_id, secret)
            .await
    }

    // ========== Calendar events ==========

    pub async fn list_events(&self, user_id: i32) -> Result<Vec<calendar_events::Model>> {
        self.event_repo().list_for_user(user_id).await
    }

    pub async fn get_event(&self, id: i32, user_id: i32) -> Result<Option<calendar_events::Model>> {
        self.event_repo().get(id, user_id).await
    }

    pub async fn insert_manual_event(
        &self,
        user_id: i32,
        title: &str,
        description: &str,
        due_date: &str,
    ) -> Result<i32> {
        self.event_repo()
            .insert_manual(user_id, title, description, due_date)
            .await
    }

    pub async fn upsert_synced_event(
        &self,
        user_id: i32,
        event: &NormalizedEvent,
    ) -> Result<UpsertOutcome> {
        self.event_repo().upsert_synced(user_id, event).await
    }

    pub async fn update_event(&self, id: i32, user_id: i32, patch: &EventPatch) -> Result<bool> {
        self.event_repo().update(id, user_id, patch).await
    }

    pub async fn delete_event(&self, id: i32, user_id: i32) -> Result<bool> {
        self.event_repo().delete(id, user_id).await
    }

    // ========== External credentials ==========

    pub async fn upsert_external_credential(
        &self,
        user_id: i32,
        source: EventSource,
        access_token: &str,
        refresh_token: Option<&str>,
        expires_at: Option<&str>,
    ) -> Result<()> {
        self.credential_repo()
            .upsert(user_id, source, access_token, refresh_token, expires_at)
            .await
    }

    pub async fn get_external_credential(
        &self,
        user_id: i32,
        source: EventSource,
    ) -> Result<Option<external_credentials::Model>> {
        self.credential_repo().get(user_id, source).await
    }

    // ========== User settings ==========

    pub async fn get_or_create_settings(&self, user_id: i32) -> Result<user_settings::Model> {
        self.settings_repo().get_or_create(user_id).await
    }

    pub async fn upsert_settings(&self, user_id: i32, input: &SettingsInput) -> Result<()> {
        self.settings_repo().upsert(user_id, input).await
    }
}
