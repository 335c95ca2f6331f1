use anyhow::{Context, Result};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set, sea_query,
};

use crate::entities::user_settings;

/// Settings values as accepted from the API; the row id stays internal.
#[derive(Debug, Clone)]
pub struct SettingsInput {
    pub email_notifications: bool,
    pub push_notifications: bool,
    pub reminder_before_hours: i32,
    pub reminder_before_minutes: i32,
    pub privacy_mode: String,
    pub data_sharing: bool,
}

pub struct SettingsRepository {
    conn: DatabaseConnection,
}

impl SettingsRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    /// Fetch the user's settings row, creating it with defaults on first read.
    pub async fn get_or_create(&self, user_id: i32) -> Result<user_settings::Model> {
        let existing = user_settings::Entity::find()
            .filter(user_settings::Column::UserId.eq(user_id))
            .one(&self.conn)
            .await
            .context("Failed to query settings")?;

        if let Some(row) = existing {
            return Ok(row);
        }

        let defaults = user_settings::ActiveModel {
            user_id: Set(user_id),
            email_notifications: Set(true),
            push_notifications: Set(true),
            reminder_before_hours: Set(24),
            reminder_before_minutes: Set(60),
            privacy_mode: Set("standard".to_string()),
            data_sharing: Set(false),
            ..Default::default()
        };

        let row = defaults
            .insert(&self.conn)
            .await
            .context("Failed to insert default settings")?;

        Ok(row)
    }

    pub async fn upsert(&self, user_id: i32, input: &SettingsInput) -> Result<()> {
        let active = user_settings::ActiveModel {
            user_id: Set(user_id),
            email_notifications: Set(input.email_notifications),
            push_notifications: Set(input.push_notifications),
            reminder_before_hours: Set(input.reminder_before_hours),
            reminder_before_minutes: Set(input.reminder_before_minutes),
            privacy_mode: Set(input.privacy_mode.clone()),
            data_sharing: Set(input.data_sharing),
            ..Default::default()
        };

        user_settings::Entity::insert(active)
            .on_conflict(
                sea_query::OnConflict::column(user_settings::Column::UserId)
                    .update_columns([
                        user_settings::Column::EmailNotifications,
                        user_settings::Column::PushNotifications,
                        user_settings::Column::ReminderBeforeHours,
                        user_settings::Column::ReminderBeforeMinutes,
                        user_settings::Column::PrivacyMode,
                        user_settings::Column::DataSharing,
                    ])
                    .to_owned(),
            )
            .exec(&self.conn)
            .await
            .context("Failed to upsert settings")?;

        Ok(())
    }
}
