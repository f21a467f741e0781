//! Feed event to calendar body transformation.
//!
//! The transformer is a pure function of the source event, the source name
//! and the destination timezone. In particular the generated event id only
//! depends on the source `UID`, which is what lets a re-run update events
//! instead of duplicating them.

use std::collections::HashMap;

use chrono_tz::Tz;

use crate::error::TransformError;
use crate::event::{EventDateTime, Reminders, SourceEvent, TargetEvent};
use crate::tag::CourseTagExtractor;

/// Derives the destination event id from a source `UID`.
///
/// The UID is lower-cased and every character outside `a-v` and `0-9` is
/// dropped. Event ids on the destination are base32hex, whose alphabet
/// stops at `v`; widening the set would change ids of events that were
/// already synced.
pub fn derive_event_id(uid: &str) -> String {
    uid.to_lowercase()
        .chars()
        .filter(|c| matches!(c, 'a'..='v' | '0'..='9'))
        .collect()
}

/// Builds destination calendar bodies from feed events.
#[derive(Debug, Clone)]
pub struct EventTransformer {
    extractor: CourseTagExtractor,
    timezone: Tz,
    /// Subject (upper-case) to destination color id.
    colors: HashMap<String, String>,
}

impl EventTransformer {
    /// Creates a transformer targeting `timezone`.
    pub fn new(extractor: CourseTagExtractor, timezone: Tz) -> Self {
        Self {
            extractor,
            timezone,
            colors: HashMap::new(),
        }
    }

    /// Sets the subject to color id mapping. Subjects are matched case-insensitively.
    pub fn with_colors(mut self, colors: HashMap<String, String>) -> Self {
        self.colors = colors
            .into_iter()
            .map(|(subject, color)| (subject.to_uppercase(), color))
            .collect();
        self
    }

    /// Returns the destination timezone.
    pub fn timezone(&self) -> Tz {
        self.timezone
    }

    /// Transforms one feed event from the source named `source_name`.
    pub fn transform(
        &self,
        event: &SourceEvent,
        source_name: &str,
    ) -> Result<TargetEvent, TransformError> {
        let uid = event
            .uid
            .as_deref()
            .filter(|uid| !uid.is_empty())
            .ok_or(TransformError::MissingUid)?;

        let id = derive_event_id(uid);
        if id.is_empty() {
            return Err(TransformError::EmptyIdentifier {
                uid: uid.to_string(),
            });
        }

        let start = event.start.as_ref().ok_or(TransformError::MissingStart)?;
        let end = event.end.as_ref().unwrap_or(start);

        let tag = self
            .extractor
            .extract(event.summary.as_deref(), event.description.as_deref());

        let title = event.display_title();
        let summary = match &tag {
            Some(tag) => {
                let tag = tag.to_string();
                if title.starts_with(&tag) {
                    title.to_string()
                } else {
                    format!("{} {}", tag, title)
                }
            }
            None => title.to_string(),
        };

        let description = format!(
            "{}\n\n[Synced from {}]",
            event.description.as_deref().unwrap_or(""),
            source_name
        );

        let color_id = tag
            .as_ref()
            .and_then(|tag| self.colors.get(&tag.subject))
            .cloned();

        Ok(TargetEvent {
            id,
            summary,
            description,
            start: self.event_date_time(start)?,
            end: self.event_date_time(end)?,
            reminders: Reminders::course_defaults(),
            color_id,
        })
    }

    fn event_date_time(
        &self,
        time: &crate::time::EventTime,
    ) -> Result<EventDateTime, TransformError> {
        Ok(EventDateTime {
            date_time: time.format_local_in(&self.timezone)?,
            time_zone: self.timezone.name().to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;
    use crate::time::EventTime;

    fn transformer() -> EventTransformer {
        EventTransformer::new(
            CourseTagExtractor::default(),
            chrono_tz::America::Chicago,
        )
    }

    fn event(summary: &str, description: &str) -> SourceEvent {
        SourceEvent::new(EventTime::from_utc(
            Utc.with_ymd_and_hms(2025, 2, 5, 16, 0, 0).unwrap(),
        ))
        .with_end(EventTime::from_utc(
            Utc.with_ymd_and_hms(2025, 2, 5, 17, 0, 0).unwrap(),
        ))
        .with_uid("evt-42@elearning.example.edu")
        .with_summary(summary)
        .with_description(description)
    }

    #[test]
    fn derive_event_id_strips_to_base32hex_alphabet() {
        assert_eq!(derive_event_id("ABC-123_xyz!"), "abc123");
        assert_eq!(derive_event_id("wxyzWXYZ"), "");
        assert_eq!(derive_event_id("abcdefghijklmnopqrstuv0123456789"), "abcdefghijklmnopqrstuv0123456789");
    }

    #[test]
    fn derive_event_id_is_deterministic() {
        let uid = "Event_1234@Calendar.Example.COM";
        let first = derive_event_id(uid);
        assert_eq!(first, derive_event_id(uid));
        assert!(first
            .chars()
            .all(|c| matches!(c, 'a'..='v' | '0'..='9')));
    }

    #[test]
    fn prefixes_title_with_tag_from_description() {
        let body = transformer()
            .transform(&event("Midterm Review", "Join us for CS 3345 review"), "Teams")
            .unwrap();
        assert_eq!(body.summary, "[CS 3345] Midterm Review");
    }

    #[test]
    fn does_not_double_prefix() {
        let body = transformer()
            .transform(
                &event("[CS 3345] Midterm Review", "Join us for CS 3345 review"),
                "Teams",
            )
            .unwrap();
        assert_eq!(body.summary, "[CS 3345] Midterm Review");
    }

    #[test]
    fn transform_is_idempotent_on_its_own_output() {
        let t = transformer();
        let first = t
            .transform(&event("Homework 3", "MATH-2418"), "eLearning")
            .unwrap();
        let again = t
            .transform(&event(&first.summary, "MATH-2418"), "eLearning")
            .unwrap();
        assert_eq!(first.summary, "[MATH 2418] Homework 3");
        assert_eq!(again.summary, first.summary);
        assert_eq!(again.id, first.id);
    }

    #[test]
    fn untagged_title_is_unchanged() {
        let body = transformer()
            .transform(&event("Office hours", "Room 2.410"), "Teams")
            .unwrap();
        assert_eq!(body.summary, "Office hours");
        assert_eq!(body.color_id, None);
    }

    #[test]
    fn missing_title_becomes_untitled() {
        let mut source = event("ignored", "CS 1337 lab");
        source.summary = None;
        let body = transformer().transform(&source, "Teams").unwrap();
        assert_eq!(body.summary, "[CS 1337] Untitled Event");
    }

    #[test]
    fn description_is_annotated_with_source() {
        let body = transformer()
            .transform(&event("Quiz", "Chapter 4"), "eLearning")
            .unwrap();
        assert_eq!(body.description, "Chapter 4\n\n[Synced from eLearning]");

        let mut source = event("Quiz", "");
        source.description = None;
        let body = transformer().transform(&source, "eLearning").unwrap();
        assert_eq!(body.description, "\n\n[Synced from eLearning]");
    }

    #[test]
    fn times_are_local_to_destination_zone() {
        let body = transformer().transform(&event("Quiz", ""), "Teams").unwrap();
        assert_eq!(body.start.date_time, "2025-02-05T10:00:00");
        assert_eq!(body.start.time_zone, "America/Chicago");
        assert_eq!(body.end.date_time, "2025-02-05T11:00:00");
        assert_eq!(body.end.time_zone, "America/Chicago");
    }

    #[test]
    fn missing_end_uses_start() {
        let mut source = event("Deadline", "");
        source.end = None;
        let body = transformer().transform(&source, "Teams").unwrap();
        assert_eq!(body.end, body.start);
    }

    #[test]
    fn reminders_are_fixed() {
        let body = transformer().transform(&event("Quiz", ""), "Teams").unwrap();
        assert!(!body.reminders.use_default);
        let minutes: Vec<u32> = body.reminders.overrides.iter().map(|o| o.minutes).collect();
        assert_eq!(minutes, vec![1440, 4320]);
        assert!(body.reminders.overrides.iter().all(|o| o.method == "popup"));
    }

    #[test]
    fn missing_or_empty_uid_is_an_error() {
        let mut source = event("Quiz", "");
        source.uid = None;
        assert_eq!(
            transformer().transform(&source, "Teams"),
            Err(TransformError::MissingUid)
        );

        source.uid = Some(String::new());
        assert_eq!(
            transformer().transform(&source, "Teams"),
            Err(TransformError::MissingUid)
        );
    }

    #[test]
    fn uid_without_usable_characters_is_an_error() {
        let source = event("Quiz", "").with_uid("xyz-@!");
        assert!(matches!(
            transformer().transform(&source, "Teams"),
            Err(TransformError::EmptyIdentifier { .. })
        ));
    }

    #[test]
    fn missing_start_is_an_error() {
        let mut source = event("Quiz", "");
        source.start = None;
        assert_eq!(
            transformer().transform(&source, "Teams"),
            Err(TransformError::MissingStart)
        );
    }

    #[test]
    fn color_is_set_for_mapped_subject() {
        let colors = HashMap::from([("cs".to_string(), "9".to_string())]);
        let t = transformer().with_colors(colors);

        let tagged = t.transform(&event("Exam", "CS 2305"), "Teams").unwrap();
        assert_eq!(tagged.color_id, Some("9".to_string()));

        let other = t.transform(&event("Exam", "HIST 1301"), "Teams").unwrap();
        assert_eq!(other.color_id, None);
    }
}
