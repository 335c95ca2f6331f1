use anyhow::Result;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

use crate::clients::agenda::AgendaClient;
use crate::clients::lms::LmsClient;
use crate::config::Config;
use crate::db::Store;
use crate::services::{
    AuthService, SeaOrmAuthService, SeaOrmSyncService, SyncService,
};

/// Builds the shared HTTP client used for all outbound source calls.
pub fn build_shared_http_client(timeout_seconds: u64) -> Result<reqwest::Client> {
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(timeout_seconds))
        .user_agent("Agendarr/1.0")
        .build()?;
    Ok(client)
}

/// Shared application state passed to all API handlers.
#[derive(Clone)]
pub struct SharedState {
    pub config: Arc<RwLock<Config>>,
    pub store: Store,
    pub auth_service: Arc<dyn AuthService>,
    pub sync_service: Arc<dyn SyncService>,
}

impl SharedState {
    pub async fn new(config: Config) -> Result<Self> {
        let store = Store::with_pool_options(
            &config.general.database_path,
            config.general.max_db_connections,
            config.general.min_db_connections,
        )
        .await?;

        let http_client = build_shared_http_client(config.sources.request_timeout_seconds)?;
        let lms = Arc::new(LmsClient::with_shared_client(
            http_client.clone(),
            config.sources.lms_base_url.clone(),
        ));
        let agenda = Arc::new(AgendaClient::with_shared_client(
            http_client,
            config.sources.calendar_base_url.clone(),
        ));

        let auth_service: Arc<dyn AuthService> = Arc::new(SeaOrmAuthService::new(
            store.clone(),
            config.auth.clone(),
            config.security.clone(),
        ));

        let sync_service: Arc<dyn SyncService> = Arc::new(SeaOrmSyncService::new(
            store.clone(),
            lms,
            agenda,
            config.sources.calendar_max_results,
        ));

        Ok(Self {
            config: Arc::new(RwLock::new(config)),
            store,
            auth_service,
            sync_service,
        })
    }
}
