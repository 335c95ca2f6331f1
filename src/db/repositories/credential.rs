use anyhow::{Context, Result};
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set, sea_query};

use crate::entities::external_credentials;
use crate::models::EventSource;

pub struct CredentialRepository {
    conn: DatabaseConnection,
}

impl CredentialRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    /// Store the bearer credential for a (user, source) pair. A re-link
    /// replaces the prior token in place.
    pub async fn upsert(
        &self,
        user_id: i32,
        source: EventSource,
        access_token: &str,
        refresh_token: Option<&str>,
        expires_at: Option<&str>,
    ) -> Result<()> {
        let active = external_credentials::ActiveModel {
            user_id: Set(user_id),
            source_type: Set(source.as_str().to_string()),
            access_token: Set(access_token.to_string()),
            refresh_token: Set(refresh_token.map(ToString::to_string)),
            expires_at: Set(expires_at.map(ToString::to_string)),
            linked_at: Set(chrono::Utc::now().to_rfc3339()),
            ..Default::default()
        };

        external_credentials::Entity::insert(active)
            .on_conflict(
                sea_query::OnConflict::columns([
                    external_credentials::Column::UserId,
                    external_credentials::Column::SourceType,
                ])
                .update_columns([
                    external_credentials::Column::AccessToken,
                    external_credentials::Column::RefreshToken,
                    external_credentials::Column::ExpiresAt,
                    external_credentials::Column::LinkedAt,
                ])
                .to_owned(),
            )
            .exec(&self.conn)
            .await
            .context("Failed to upsert external credential")?;

        Ok(())
    }

    pub async fn get(
        &self,
        user_id: i32,
        source: EventSource,
    ) -> Result<Option<external_credentials::Model>> {
        let credential = external_credentials::Entity::find()
            .filter(external_credentials::Column::UserId.eq(user_id))
            .filter(external_credentials::Column::SourceType.eq(source.as_str()))
            .one(&self.conn)
            .await
            .context("Failed to query external credential")?;

        Ok(credential)
    }
}
