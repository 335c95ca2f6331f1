//! `SeaORM` implementation of the `SyncService` trait.
//!
//! Each upsert is awaited in listing order before the next one starts, so the
//! dedup key always resolves to exactly one row and the report counts reflect
//! confirmed writes. Per-container fetch failures are logged and skipped; a
//! rejected credential aborts the run before any write.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tracing::{info, warn};

use crate::clients::ClientError;
use crate::clients::agenda::AgendaClient;
use crate::clients::lms::{Assignment, Course, LmsClient};
use crate::db::Store;
use crate::models::{EventSource, NormalizedEvent, SyncReport, normalize_due_date};
use crate::services::sync_service::{SyncError, SyncService};

pub struct SeaOrmSyncService {
    store: Store,
    lms: Arc<LmsClient>,
    agenda: Arc<AgendaClient>,
    calendar_max_results: u32,
}

impl SeaOrmSyncService {
    #[must_use]
    pub const fn new(
        store: Store,
        lms: Arc<LmsClient>,
        agenda: Arc<AgendaClient>,
        calendar_max_results: u32,
    ) -> Self {
        Self {
            store,
            lms,
            agenda,
            calendar_max_results,
        }
    }

    async fn sync_lms(&self, user_id: i32, bearer_token: &str) -> Result<SyncReport, SyncError> {
        // The course listing doubles as the credential probe: if it fails we
        // have written nothing and can fail the whole call.
        let courses = self
            .lms
            .list_courses(bearer_token)
            .await
            .map_err(|e| top_level_error(EventSource::Lms, e))?;

        let mut report = SyncReport {
            containers_attempted: courses.len(),
            ..Default::default()
        };

        for course in &courses {
            match self
                .lms
                .list_upcoming_assignments(bearer_token, course.id)
                .await
            {
                Ok(assignments) => {
                    for assignment in assignments {
                        if let Some(event) = normalize_assignment(course, assignment) {
                            self.store.upsert_synced_event(user_id, &event).await?;
                            report.items_synced += 1;
                        }
                    }
                }
                Err(e) => {
                    warn!(
                        course_id = course.id,
                        error = %e,
                        "Skipping course after assignment fetch failure"
                    );
                    report.containers_failed += 1;
                }
            }
        }

        self.store
            .upsert_external_credential(user_id, EventSource::Lms, bearer_token, None, None)
            .await?;

        info!(
            user_id,
            items = report.items_synced,
            courses = report.containers_attempted,
            skipped = report.containers_failed,
            "LMS sync complete"
        );

        Ok(report)
    }

    async fn sync_calendar(
        &self,
        user_id: i32,
        bearer_token: &str,
    ) -> Result<SyncReport, SyncError> {
        let time_min = Utc::now().to_rfc3339();
        let items = self
            .agenda
            .list_upcoming(bearer_token, &time_min, self.calendar_max_results)
            .await
            .map_err(|e| top_level_error(EventSource::Calendar, e))?;

        // The single listing is the one and only container.
        let mut report = SyncReport {
            containers_attempted: 1,
            ..Default::default()
        };

        for item in items {
            let Some(due_date) = item
                .start
                .and_then(|s| s.date_time)
                .as_deref()
                .and_then(normalize_due_date)
            else {
                continue;
            };

            let event = NormalizedEvent {
                title: item
                    .summary
                    .unwrap_or_else(|| "Untitled event".to_string()),
                description: item.description.unwrap_or_default(),
                due_date,
                source: EventSource::Calendar,
                source_course: None,
                source_external_id: Some(item.id),
            };

            self.store.upsert_synced_event(user_id, &event).await?;
            report.items_synced += 1;
        }

        self.store
            .upsert_external_credential(user_id, EventSource::Calendar, bearer_token, None, None)
            .await?;

        info!(
            user_id,
            items = report.items_synced,
            "Calendar sync complete"
        );

        Ok(report)
    }
}

#[async_trait]
impl SyncService for SeaOrmSyncService {
    async fn link_source(
        &self,
        user_id: i32,
        source: EventSource,
        bearer_token: &str,
    ) -> Result<SyncReport, SyncError> {
        match source {
            EventSource::Lms => self.sync_lms(user_id, bearer_token).await,
            EventSource::Calendar => self.sync_calendar(user_id, bearer_token).await,
            EventSource::Manual => Err(SyncError::NotLinkable),
        }
    }
}

fn top_level_error(source: EventSource, err: ClientError) -> SyncError {
    match err {
        ClientError::Unauthorized => SyncError::UpstreamAuth { source },
        other => SyncError::Upstream {
            source,
            message: other.to_string(),
        },
    }
}

/// Assignments without a parseable due timestamp cannot be scheduled and are
/// dropped. Due dates are stored in UTC so the listing order is chronological.
fn normalize_assignment(course: &Course, assignment: Assignment) -> Option<NormalizedEvent> {
    let due_date = assignment.due_at.as_deref().and_then(normalize_due_date)?;

    Some(NormalizedEvent {
        title: assignment.name,
        description: assignment.description.unwrap_or_default(),
        due_date,
        source: EventSource::Lms,
        source_course: Some(course.name.clone()),
        source_external_id: Some(assignment.id.to_string()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn course() -> Course {
        Course {
            id: 42,
            name: "Systems Programming".to_string(),
            course_code: Some("CS 3214".to_string()),
        }
    }

    #[test]
    fn test_normalize_keeps_dated_assignments() {
        let event = normalize_assignment(
            &course(),
            Assignment {
                id: 7,
                name: "Project 2".to_string(),
                description: Some("Threads".to_string()),
                due_at: Some("2026-09-10T23:59:00Z".to_string()),
            },
        )
        .unwrap();

        assert_eq!(event.title, "Project 2");
        assert_eq!(event.source, EventSource::Lms);
        assert_eq!(event.source_course.as_deref(), Some("Systems Programming"));
        assert_eq!(event.source_external_id.as_deref(), Some("7"));
    }

    #[test]
    fn test_normalize_converts_offset_due_dates_to_utc() {
        let event = normalize_assignment(
            &course(),
            Assignment {
                id: 9,
                name: "Quiz".to_string(),
                description: None,
                due_at: Some("2026-09-11T01:59:00+02:00".to_string()),
            },
        )
        .unwrap();

        assert_eq!(event.due_date, "2026-09-10T23:59:00Z");
    }

    #[test]
    fn test_normalize_drops_undated_assignments() {
        let event = normalize_assignment(
            &course(),
            Assignment {
                id: 8,
                name: "Reading".to_string(),
                description: None,
                due_at: None,
            },
        );

        assert!(event.is_none());
    }
}
