//! Time types for feed events.
//!
//! ICS feeds express start/end times in four shapes: UTC instants, floating
//! local times, local times bound to a `TZID`, and all-day dates. [`EventTime`]
//! keeps that distinction so the transformer can render every shape as a
//! wall-clock time in the destination calendar's timezone.

use chrono::{DateTime, LocalResult, NaiveDate, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::TransformError;
use crate::zones::resolve_tzid;

/// Format used for the `dateTime` field of the destination calendar.
pub const LOCAL_DATETIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// The start or end time of a feed event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value")]
pub enum EventTime {
    /// An absolute instant (`DTSTART:20250205T100000Z`).
    Utc(DateTime<Utc>),
    /// A wall-clock time with no zone attached.
    Floating(NaiveDateTime),
    /// A wall-clock time in the named zone (`DTSTART;TZID=...`).
    Zoned {
        /// The local time as written in the feed.
        local: NaiveDateTime,
        /// The `TZID` parameter, verbatim.
        tzid: String,
    },
    /// An all-day date.
    AllDay(NaiveDate),
}

impl EventTime {
    /// Creates an `EventTime::Utc`.
    pub fn from_utc(dt: DateTime<Utc>) -> Self {
        Self::Utc(dt)
    }

    /// Creates an `EventTime::AllDay`.
    pub fn from_date(date: NaiveDate) -> Self {
        Self::AllDay(date)
    }

    /// Creates an `EventTime::Zoned`.
    pub fn zoned(local: NaiveDateTime, tzid: impl Into<String>) -> Self {
        Self::Zoned {
            local,
            tzid: tzid.into(),
        }
    }

    /// Returns `true` if this is an all-day date.
    pub fn is_all_day(&self) -> bool {
        matches!(self, Self::AllDay(_))
    }

    /// Resolves this time to a wall-clock time in `tz`.
    ///
    /// Floating times are read as already being in `tz`. A `TZID` is resolved
    /// as an IANA or Windows zone name; one that is neither is treated like a
    /// floating time, with a warning. All-day dates
    /// resolve to local midnight.
    pub fn to_local_in(&self, tz: &Tz) -> Result<NaiveDateTime, TransformError> {
        match self {
            Self::Utc(dt) => Ok(dt.with_timezone(tz).naive_local()),
            Self::Floating(local) => Ok(*local),
            Self::AllDay(date) => Ok(date.and_time(chrono::NaiveTime::MIN)),
            Self::Zoned { local, tzid } => {
                let source_tz = match resolve_tzid(tzid) {
                    Some(source_tz) => source_tz,
                    None => {
                        warn!(tzid = %tzid, "unknown TZID, treating time as local to {}", tz);
                        return Ok(*local);
                    }
                };

                if source_tz == *tz {
                    return Ok(*local);
                }

                match source_tz.from_local_datetime(local) {
                    LocalResult::Single(dt) => Ok(dt.with_timezone(tz).naive_local()),
                    // Ambiguous fall-back hour: take the first occurrence.
                    LocalResult::Ambiguous(earliest, _) => {
                        Ok(earliest.with_timezone(tz).naive_local())
                    }
                    LocalResult::None => Err(TransformError::InvalidLocalTime {
                        time: local.to_string(),
                        tzid: tzid.clone(),
                    }),
                }
            }
        }
    }

    /// Renders this time as a destination `dateTime` string in `tz`.
    pub fn format_local_in(&self, tz: &Tz) -> Result<String, TransformError> {
        Ok(self
            .to_local_in(tz)?
            .format(LOCAL_DATETIME_FORMAT)
            .to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn naive(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, min, 0)
            .unwrap()
    }

    #[test]
    fn utc_converts_into_destination_zone() {
        let time = EventTime::from_utc(Utc.with_ymd_and_hms(2025, 2, 5, 16, 0, 0).unwrap());
        let local = time.format_local_in(&chrono_tz::America::Chicago).unwrap();
        assert_eq!(local, "2025-02-05T10:00:00");
    }

    #[test]
    fn utc_respects_daylight_saving() {
        let time = EventTime::from_utc(Utc.with_ymd_and_hms(2025, 7, 1, 16, 0, 0).unwrap());
        let local = time.format_local_in(&chrono_tz::America::Chicago).unwrap();
        assert_eq!(local, "2025-07-01T11:00:00");
    }

    #[test]
    fn floating_is_kept_as_wall_clock() {
        let time = EventTime::Floating(naive(2025, 2, 5, 9, 30));
        let local = time.format_local_in(&chrono_tz::America::Chicago).unwrap();
        assert_eq!(local, "2025-02-05T09:30:00");
    }

    #[test]
    fn all_day_is_local_midnight() {
        let time = EventTime::from_date(NaiveDate::from_ymd_opt(2025, 2, 10).unwrap());
        assert!(time.is_all_day());
        let local = time.format_local_in(&chrono_tz::America::Chicago).unwrap();
        assert_eq!(local, "2025-02-10T00:00:00");
    }

    #[test]
    fn zoned_converts_between_zones() {
        let time = EventTime::zoned(naive(2025, 2, 5, 12, 0), "America/New_York");
        let local = time.format_local_in(&chrono_tz::America::Chicago).unwrap();
        assert_eq!(local, "2025-02-05T11:00:00");
    }

    #[test]
    fn zoned_in_destination_zone_is_unchanged() {
        let time = EventTime::zoned(naive(2025, 2, 5, 12, 0), "America/Chicago");
        let local = time.format_local_in(&chrono_tz::America::Chicago).unwrap();
        assert_eq!(local, "2025-02-05T12:00:00");
    }

    #[test]
    fn windows_tzid_is_converted() {
        let time = EventTime::zoned(naive(2025, 2, 6, 9, 0), "Eastern Standard Time");
        let local = time.format_local_in(&chrono_tz::America::Chicago).unwrap();
        assert_eq!(local, "2025-02-06T08:00:00");
    }

    #[test]
    fn unknown_tzid_falls_back_to_wall_clock() {
        let time = EventTime::zoned(naive(2025, 2, 5, 12, 0), "Customized Time Zone");
        let local = time.format_local_in(&chrono_tz::America::Chicago).unwrap();
        assert_eq!(local, "2025-02-05T12:00:00");
    }

    #[test]
    fn nonexistent_local_time_is_an_error() {
        // 02:30 on the spring-forward day does not exist in New York.
        let time = EventTime::zoned(naive(2025, 3, 9, 2, 30), "America/New_York");
        let err = time
            .format_local_in(&chrono_tz::America::Chicago)
            .unwrap_err();
        assert!(matches!(err, TransformError::InvalidLocalTime { .. }));
    }
}
