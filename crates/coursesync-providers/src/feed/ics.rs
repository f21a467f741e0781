//! iCalendar (RFC 5545) feed parsing.

use std::borrow::Cow;

use coursesync_core::{EventTime, SourceEvent};
use icalendar::{
    Calendar, CalendarComponent, CalendarDateTime, Component, DatePerhapsTime, Event, EventLike,
};
use tracing::debug;

use crate::error::{ProviderError, ProviderResult};

/// Parses feed text into events, in feed order.
///
/// Fails with a parse error when the text is not an iCalendar document.
/// Events with missing properties are still returned; deciding whether
/// they can be synced is left to the transformer.
pub fn parse_ics_content(ics: &str) -> ProviderResult<Vec<SourceEvent>> {
    let first_line = ics.lines().map(str::trim).find(|line| !line.is_empty());
    if !first_line.is_some_and(|line| line.eq_ignore_ascii_case("BEGIN:VCALENDAR")) {
        return Err(ProviderError::parse("content is not an iCalendar document"));
    }

    let calendar = normalize_delimiters(ics)
        .parse::<Calendar>()
        .map_err(|e| ProviderError::parse(format!("invalid iCalendar data: {}", e)))?;

    let events: Vec<SourceEvent> = calendar
        .iter()
        .filter_map(|component| match component {
            CalendarComponent::Event(event) => Some(convert_event(event)),
            _ => None,
        })
        .collect();

    debug!(count = events.len(), "parsed feed");
    Ok(events)
}

/// Upper-cases `BEGIN:`/`END:` lines, whose names are case-insensitive.
fn normalize_delimiters(ics: &str) -> Cow<'_, str> {
    let needs_change = ics
        .split_inclusive('\n')
        .any(|line| is_delimiter(line) && line.bytes().any(|b| b.is_ascii_lowercase()));
    if !needs_change {
        return Cow::Borrowed(ics);
    }

    Cow::Owned(
        ics.split_inclusive('\n')
            .map(|line| {
                if is_delimiter(line) {
                    line.to_ascii_uppercase()
                } else {
                    line.to_string()
                }
            })
            .collect(),
    )
}

fn is_delimiter(line: &str) -> bool {
    let head = line.get(..6).unwrap_or(line).to_ascii_uppercase();
    head.starts_with("BEGIN:") || head.starts_with("END:")
}

fn convert_event(event: &Event) -> SourceEvent {
    let start = event.get_start().map(convert_date_time);
    let end = event.get_end().map(convert_date_time).or_else(|| start.clone());

    SourceEvent {
        uid: event.get_uid().map(str::to_string),
        summary: event.get_summary().map(str::to_string),
        description: event.get_description().map(str::to_string),
        start,
        end,
    }
}

fn convert_date_time(value: DatePerhapsTime) -> EventTime {
    match value {
        DatePerhapsTime::Date(date) => EventTime::from_date(date),
        DatePerhapsTime::DateTime(CalendarDateTime::Utc(dt)) => EventTime::from_utc(dt),
        DatePerhapsTime::DateTime(CalendarDateTime::Floating(local)) => EventTime::Floating(local),
        DatePerhapsTime::DateTime(CalendarDateTime::WithTimezone { date_time, tzid }) => {
            EventTime::zoned(date_time, tzid)
        }
    }
}
