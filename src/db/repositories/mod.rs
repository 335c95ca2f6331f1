pub mod credential;
pub mod event;
pub mod settings;
pub mod user;
