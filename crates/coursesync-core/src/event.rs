//! Event types on both sides of the sync.
//!
//! - [`CalendarSource`]: a configured feed
//! - [`SourceEvent`]: one `VEVENT` as read from a feed
//! - [`TargetEvent`]: the body submitted to the destination calendar

use serde::{Deserialize, Serialize};

use crate::time::EventTime;

/// Reminder offsets attached to every synced event, in minutes before start.
pub const REMINDER_MINUTES: [u32; 2] = [24 * 60, 72 * 60];

/// Title used for events without a `SUMMARY`.
pub const UNTITLED_EVENT: &str = "Untitled Event";

/// A read-only ICS feed to pull events from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarSource {
    /// Display name, used in log lines and in the synced description.
    pub name: String,
    /// Feed URL.
    pub url: String,
}

impl CalendarSource {
    /// Creates a source.
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
        }
    }
}

/// A calendar event as parsed from an ICS feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceEvent {
    /// The feed-unique identifier (`UID`).
    pub uid: Option<String>,
    /// Event title (`SUMMARY`).
    pub summary: Option<String>,
    /// Event description (`DESCRIPTION`).
    pub description: Option<String>,
    /// Start time (`DTSTART`).
    pub start: Option<EventTime>,
    /// End time (`DTEND`).
    pub end: Option<EventTime>,
}

impl SourceEvent {
    /// Creates an event with only a start time.
    pub fn new(start: EventTime) -> Self {
        Self {
            uid: None,
            summary: None,
            description: None,
            start: Some(start),
            end: None,
        }
    }

    /// Builder method to set the UID.
    pub fn with_uid(mut self, uid: impl Into<String>) -> Self {
        self.uid = Some(uid.into());
        self
    }

    /// Builder method to set the summary.
    pub fn with_summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = Some(summary.into());
        self
    }

    /// Builder method to set the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Builder method to set the end time.
    pub fn with_end(mut self, end: EventTime) -> Self {
        self.end = Some(end);
        self
    }

    /// Returns the title for log lines.
    pub fn display_title(&self) -> &str {
        self.summary.as_deref().unwrap_or(UNTITLED_EVENT)
    }
}

/// A start or end time in the destination calendar's format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventDateTime {
    /// Local date-time without offset, e.g. `2025-02-05T10:00:00`.
    pub date_time: String,
    /// IANA timezone the local time is in.
    pub time_zone: String,
}

/// A single reminder override.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReminderOverride {
    /// Delivery method (`popup`, `email`).
    pub method: String,
    /// Minutes before the event start.
    pub minutes: u32,
}

impl ReminderOverride {
    /// Creates a popup reminder.
    pub fn popup(minutes: u32) -> Self {
        Self {
            method: "popup".to_string(),
            minutes,
        }
    }
}

/// Reminder settings of a destination event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reminders {
    /// Whether the calendar's default reminders apply.
    pub use_default: bool,
    /// Explicit reminders.
    pub overrides: Vec<ReminderOverride>,
}

impl Reminders {
    /// Popups at 24 and 72 hours before start, defaults off.
    pub fn course_defaults() -> Self {
        Self {
            use_default: false,
            overrides: REMINDER_MINUTES
                .iter()
                .copied()
                .map(ReminderOverride::popup)
                .collect(),
        }
    }
}

/// The event body submitted to the destination calendar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TargetEvent {
    /// Deterministic identifier derived from the source UID.
    pub id: String,
    /// Title, possibly prefixed with a course tag.
    pub summary: String,
    /// Description with the source annotation appended.
    pub description: String,
    /// Start time.
    pub start: EventDateTime,
    /// End time.
    pub end: EventDateTime,
    /// Reminder settings.
    pub reminders: Reminders,
    /// Color id for the course's subject, when one is configured.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color_id: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn target_event_serializes_with_camel_case_keys() {
        let body = TargetEvent {
            id: "abc123".to_string(),
            summary: "[CS 3345] Midterm Review".to_string(),
            description: "\n\n[Synced from Teams]".to_string(),
            start: EventDateTime {
                date_time: "2025-02-05T10:00:00".to_string(),
                time_zone: "America/Chicago".to_string(),
            },
            end: EventDateTime {
                date_time: "2025-02-05T11:00:00".to_string(),
                time_zone: "America/Chicago".to_string(),
            },
            reminders: Reminders::course_defaults(),
            color_id: None,
        };

        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["id"], "abc123");
        assert_eq!(json["start"]["dateTime"], "2025-02-05T10:00:00");
        assert_eq!(json["end"]["timeZone"], "America/Chicago");
        assert_eq!(json["reminders"]["useDefault"], false);
        assert_eq!(json["reminders"]["overrides"][0]["method"], "popup");
        assert_eq!(json["reminders"]["overrides"][0]["minutes"], 1440);
        assert_eq!(json["reminders"]["overrides"][1]["minutes"], 4320);
        assert!(json.get("colorId").is_none());
    }

    #[test]
    fn display_title_defaults_when_missing() {
        let event = SourceEvent::new(EventTime::from_date(
            chrono::NaiveDate::from_ymd_opt(2025, 2, 10).unwrap(),
        ));
        assert_eq!(event.display_title(), UNTITLED_EVENT);
        assert_eq!(event.with_summary("Quiz").display_title(), "Quiz");
    }
}
