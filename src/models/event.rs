use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

/// Origin of a calendar event. Machine sources ("lms", "calendar") are owned
/// by the sync engine; "manual" rows belong to the user and are never touched
/// by a sync run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventSource {
    Lms,
    Calendar,
    Manual,
}

impl EventSource {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Lms => "lms",
            Self::Calendar => "calendar",
            Self::Manual => "manual",
        }
    }

    /// Parses a source path segment. Only machine sources are linkable;
    /// "manual" is deliberately not accepted here.
    #[must_use]
    pub fn parse_linkable(s: &str) -> Option<Self> {
        match s {
            "lms" => Some(Self::Lms),
            "calendar" => Some(Self::Calendar),
            _ => None,
        }
    }
}

impl std::fmt::Display for EventSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parse an RFC 3339 timestamp and re-render it in UTC with a `Z` suffix.
/// Every stored due date goes through this, so the strings sort
/// lexicographically in chronological order regardless of the offset the
/// caller or upstream supplied.
#[must_use]
pub fn normalize_due_date(value: &str) -> Option<String> {
    DateTime::parse_from_rfc3339(value)
        .ok()
        .map(|dt| dt.with_timezone(&Utc).to_rfc3339_opts(SecondsFormat::Secs, true))
}

/// A source item reduced to the common event schema. Items without a due
/// timestamp never become one of these; they cannot be scheduled.
#[derive(Debug, Clone)]
pub struct NormalizedEvent {
    pub title: String,
    pub description: String,
    pub due_date: String,
    pub source: EventSource,
    pub source_course: Option<String>,
    pub source_external_id: Option<String>,
}

/// Outcome of one sync run for one source.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct SyncReport {
    /// Items successfully upserted into the event store.
    pub items_synced: usize,
    /// Containers (courses, or the single calendar listing) we tried to fetch.
    pub containers_attempted: usize,
    /// Containers whose fetch failed and was skipped.
    pub containers_failed: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_roundtrip() {
        assert_eq!(EventSource::parse_linkable("lms"), Some(EventSource::Lms));
        assert_eq!(
            EventSource::parse_linkable("calendar"),
            Some(EventSource::Calendar)
        );
        assert_eq!(EventSource::parse_linkable("manual"), None);
        assert_eq!(EventSource::parse_linkable("gopher"), None);
        assert_eq!(EventSource::Lms.as_str(), "lms");
    }

    #[test]
    fn test_due_dates_normalize_to_utc() {
        // An offset timestamp and its UTC equivalent render identically.
        assert_eq!(
            normalize_due_date("2026-09-10T08:00:00+02:00").as_deref(),
            Some("2026-09-10T06:00:00Z")
        );
        assert_eq!(
            normalize_due_date("2026-09-10T06:00:00Z").as_deref(),
            Some("2026-09-10T06:00:00Z")
        );
        assert_eq!(
            normalize_due_date("2026-09-10T06:00:00.250Z").as_deref(),
            Some("2026-09-10T06:00:00Z")
        );
        assert_eq!(normalize_due_date("next tuesday"), None);
    }
}
