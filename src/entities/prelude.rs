pub use super::calendar_events::Entity as CalendarEvents;
pub use super::external_credentials::Entity as ExternalCredentials;
pub use super::user_settings::Entity as UserSettings;
pub use super::users::Entity as Users;
