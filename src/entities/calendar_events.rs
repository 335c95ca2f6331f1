use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "calendar_events")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub user_id: i32,

    pub title: String,

    pub description: String,

    /// RFC 3339 due timestamp; the per-user listing is ordered by this.
    pub due_date: String,

    /// "lms", "calendar" or "manual" (see `models::EventSource`).
    pub source: String,

    /// Name of the originating course, for assignment-feed events.
    pub source_course: Option<String>,

    /// Upstream item identifier. Together with (user_id, source) this is the
    /// dedup key for synced events; manual events never carry one.
    pub source_external_id: Option<String>,

    pub completed: bool,

    pub reminder_sent: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::UserId",
        to = "super::users::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Users,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Users.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
