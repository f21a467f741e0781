//! Core types: feed events, course tags, event transformation, tracing

pub mod error;
pub mod event;
pub mod tag;
pub mod time;
pub mod tracing;
pub mod transform;
pub mod zones;

pub use error::{TagPatternError, TransformError};
pub use event::{
    CalendarSource, EventDateTime, ReminderOverride, Reminders, SourceEvent, TargetEvent,
};
pub use tag::{CourseTag, CourseTagExtractor, DEFAULT_SUBJECTS};
pub use time::EventTime;
pub use tracing::{init_tracing, TracingConfig, TracingError, TracingOutputFormat};
pub use transform::{derive_event_id, EventTransformer};
pub use event::UNTITLED_EVENT;
pub use zones::resolve_tzid;
