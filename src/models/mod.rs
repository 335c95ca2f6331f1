pub mod event;

pub use event::{EventSource, NormalizedEvent, SyncReport, normalize_due_date};
