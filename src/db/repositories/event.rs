use anyhow::{Context, Result};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};

use crate::entities::calendar_events;
use crate::models::{EventSource, NormalizedEvent};

/// Whether an upsert wrote a new row or refreshed an existing one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    Inserted,
    Updated,
}

/// Partial update for a user-driven event edit. `None` fields are left alone.
#[derive(Debug, Default, Clone)]
pub struct EventPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub due_date: Option<String>,
    pub completed: Option<bool>,
}

pub struct EventRepository {
    conn: DatabaseConnection,
}

impl EventRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    /// All events for a user, due date ascending.
    pub async fn list_for_user(&self, user_id: i32) -> Result<Vec<calendar_events::Model>> {
        let events = calendar_events::Entity::find()
            .filter(calendar_events::Column::UserId.eq(user_id))
            .order_by_asc(calendar_events::Column::DueDate)
            .all(&self.conn)
            .await
            .context("Failed to list events")?;

        Ok(events)
    }

    pub async fn get(&self, id: i32, user_id: i32) -> Result<Option<calendar_events::Model>> {
        let event = calendar_events::Entity::find_by_id(id)
            .filter(calendar_events::Column::UserId.eq(user_id))
            .one(&self.conn)
            .await
            .context("Failed to query event")?;

        Ok(event)
    }

    /// Insert a user-entered event. Manual rows never carry an external id,
    /// so sync runs cannot touch them.
    pub async fn insert_manual(
        &self,
        user_id: i32,
        title: &str,
        description: &str,
        due_date: &str,
    ) -> Result<i32> {
        let active = calendar_events::ActiveModel {
            user_id: Set(user_id),
            title: Set(title.to_string()),
            description: Set(description.to_string()),
            due_date: Set(due_date.to_string()),
            source: Set(EventSource::Manual.as_str().to_string()),
            source_course: Set(None),
            source_external_id: Set(None),
            completed: Set(false),
            reminder_sent: Set(false),
            ..Default::default()
        };

        let model = active
            .insert(&self.conn)
            .await
            .context("Failed to insert manual event")?;

        Ok(model.id)
    }

    /// Insert-or-update a machine-sourced event by its dedup key:
    /// (user_id, source, source_external_id) when the upstream item has an id,
    /// otherwise (user_id, source, title, due_date). Updates refresh the
    /// upstream-owned fields and preserve the user-owned `completed` and
    /// `reminder_sent` flags, which is what makes repeated syncs idempotent.
    pub async fn upsert_synced(
        &self,
        user_id: i32,
        event: &NormalizedEvent,
    ) -> Result<UpsertOutcome> {
        let source = event.source.as_str();

        let existing = match &event.source_external_id {
            Some(external_id) => {
                calendar_events::Entity::find()
                    .filter(calendar_events::Column::UserId.eq(user_id))
                    .filter(calendar_events::Column::Source.eq(source))
                    .filter(calendar_events::Column::SourceExternalId.eq(external_id))
                    .one(&self.conn)
                    .await
            }
            None => {
                calendar_events::Entity::find()
                    .filter(calendar_events::Column::UserId.eq(user_id))
                    .filter(calendar_events::Column::Source.eq(source))
                    .filter(calendar_events::Column::Title.eq(&event.title))
                    .filter(calendar_events::Column::DueDate.eq(&event.due_date))
                    .one(&self.conn)
                    .await
            }
        }
        .context("Failed to query event by dedup key")?;

        if let Some(row) = existing {
            let mut active: calendar_events::ActiveModel = row.into();
            active.title = Set(event.title.clone());
            active.description = Set(event.description.clone());
            active.due_date = Set(event.due_date.clone());
            active.source_course = Set(event.source_course.clone());
            active
                .update(&self.conn)
                .await
                .context("Failed to update synced event")?;

            return Ok(UpsertOutcome::Updated);
        }

        let active = calendar_events::ActiveModel {
            user_id: Set(user_id),
            title: Set(event.title.clone()),
            description: Set(event.description.clone()),
            due_date: Set(event.due_date.clone()),
            source: Set(source.to_string()),
            source_course: Set(event.source_course.clone()),
            source_external_id: Set(event.source_external_id.clone()),
            completed: Set(false),
            reminder_sent: Set(false),
            ..Default::default()
        };

        active
            .insert(&self.conn)
            .await
            .context("Failed to insert synced event")?;

        Ok(UpsertOutcome::Inserted)
    }

    /// Apply a partial edit to an event owned by `user_id`.
    /// Returns false if no such event exists.
    pub async fn update(&self, id: i32, user_id: i32, patch: &EventPatch) -> Result<bool> {
        let Some(row) = self.get(id, user_id).await? else {
            return Ok(false);
        };

        let mut active: calendar_events::ActiveModel = row.into();
        if let Some(title) = &patch.title {
            active.title = Set(title.clone());
        }
        if let Some(description) = &patch.description {
            active.description = Set(description.clone());
        }
        if let Some(due_date) = &patch.due_date {
            active.due_date = Set(due_date.clone());
        }
        if let Some(completed) = patch.completed {
            active.completed = Set(completed);
        }
        active
            .update(&self.conn)
            .await
            .context("Failed to update event")?;

        Ok(true)
    }

    pub async fn delete(&self, id: i32, user_id: i32) -> Result<bool> {
        let result = calendar_events::Entity::delete_many()
            .filter(calendar_events::Column::Id.eq(id))
            .filter(calendar_events::Column::UserId.eq(user_id))
            .exec(&self.conn)
            .await
            .context("Failed to delete event")?;

        Ok(result.rows_affected > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Store;

    async fn store() -> Store {
        // A single connection so the in-memory database is shared.
        Store::with_pool_options("sqlite::memory:", 1, 1)
            .await
            .unwrap()
    }

    async fn seeded_user(store: &Store) -> i32 {
        store
            .create_user("pat@inst.edu", "$argon2id$fake", "ext-1")
            .await
            .unwrap()
            .id
    }

    fn untagged_event(description: &str) -> NormalizedEvent {
        NormalizedEvent {
            title: "Department colloquium".to_string(),
            description: description.to_string(),
            due_date: "2026-10-06T16:00:00Z".to_string(),
            source: EventSource::Calendar,
            source_course: None,
            source_external_id: None,
        }
    }

    #[tokio::test]
    async fn test_upsert_without_external_id_falls_back_to_title_and_due_date() {
        let store = store().await;
        let user_id = seeded_user(&store).await;

        let first = store
            .upsert_synced_event(user_id, &untagged_event("Room 120"))
            .await
            .unwrap();
        assert_eq!(first, UpsertOutcome::Inserted);

        // Same title and due date: the existing row is refreshed in place.
        let second = store
            .upsert_synced_event(user_id, &untagged_event("Moved to room 220"))
            .await
            .unwrap();
        assert_eq!(second, UpsertOutcome::Updated);

        let events = store.list_events(user_id).await.unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].description, "Moved to room 220");
        assert_eq!(events[0].source_external_id, None);
    }

    #[tokio::test]
    async fn test_fallback_key_includes_due_date() {
        let store = store().await;
        let user_id = seeded_user(&store).await;

        store
            .upsert_synced_event(user_id, &untagged_event("Week 1"))
            .await
            .unwrap();

        // A different due date is a different untagged item, not an update.
        let mut rescheduled = untagged_event("Week 2");
        rescheduled.due_date = "2026-10-13T16:00:00Z".to_string();
        let outcome = store
            .upsert_synced_event(user_id, &rescheduled)
            .await
            .unwrap();
        assert_eq!(outcome, UpsertOutcome::Inserted);

        assert_eq!(store.list_events(user_id).await.unwrap().len(), 2);
    }
}
