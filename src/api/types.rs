use serde::{Deserialize, Serialize};

use crate::db::User;
use crate::entities::calendar_events;
use crate::models::SyncReport;

#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub const fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventDto {
    pub id: i32,
    pub title: String,
    pub description: String,
    pub due_date: String,
    pub source: String,
    pub source_course: Option<String>,
    pub source_external_id: Option<String>,
    pub completed: bool,
}

impl From<calendar_events::Model> for EventDto {
    fn from(model: calendar_events::Model) -> Self {
        Self {
            id: model.id,
            title: model.title,
            description: model.description,
            due_date: model.due_date,
            source: model.source,
            source_course: model.source_course,
            source_external_id: model.source_external_id,
            completed: model.completed,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventListDto {
    pub events: Vec<EventDto>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateEventRequest {
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub due_date: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateEventRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub due_date: Option<String>,
    pub completed: Option<bool>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedEventDto {
    pub id: i32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkSourceRequest {
    /// Accepted for contract compatibility; must match the session's user.
    pub user_id: Option<i32>,
    pub bearer_token: String,
}

/// Optional `userId` query parameter on user-scoped reads; when present it
/// must match the session's user.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserScopeQuery {
    pub user_id: Option<i32>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkSourceDto {
    pub items_linked: usize,
    pub containers_attempted: usize,
    pub containers_failed: usize,
}

impl From<SyncReport> for LinkSourceDto {
    fn from(report: SyncReport) -> Self {
        Self {
            items_linked: report.items_synced,
            containers_attempted: report.containers_attempted,
            containers_failed: report.containers_failed,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsDto {
    pub email_notifications: bool,
    pub push_notifications: bool,
    pub reminder_before_hours: i32,
    pub reminder_before_minutes: i32,
    pub privacy_mode: String,
    pub data_sharing: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserDto {
    pub id: i32,
    pub email: String,
    pub external_id: String,
    pub two_factor_enabled: bool,
}

impl From<User> for UserDto {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            external_id: user.external_id,
            two_factor_enabled: user.two_factor_enabled,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SystemStatus {
    pub version: String,
    pub uptime_seconds: u64,
    pub database_ok: bool,
}
