pub mod prelude;

pub mod calendar_events;
pub mod external_credentials;
pub mod user_settings;
pub mod users;
