use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    /// Institutional email address, unique across the instance.
    #[sea_orm(unique)]
    pub email: String,

    /// Argon2id password hash
    pub password_hash: String,

    /// The user's identifier on the LMS side, captured at registration.
    pub external_id: String,

    pub two_factor_enabled: bool,

    /// Shared TOTP secret, present only while two-factor is enabled.
    pub two_factor_secret: Option<String>,

    /// Latest issued session token (64-char hex). A new login overwrites it.
    pub session_token: Option<String>,

    pub session_expires_at: Option<String>,

    pub created_at: String,

    pub last_login_at: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
