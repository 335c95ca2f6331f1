pub mod auth_service;
pub mod auth_service_impl;
pub use auth_service::{
    AuthError, AuthService, Enrollment, LoginOutcome, RegisteredUser, SessionGrant,
};
pub use auth_service_impl::SeaOrmAuthService;

pub mod session;
pub use session::SessionManager;

pub mod totp;

pub mod sync_service;
pub mod sync_service_impl;
pub use sync_service::{SyncError, SyncService};
pub use sync_service_impl::SeaOrmSyncService;
