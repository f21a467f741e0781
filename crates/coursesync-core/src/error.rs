//! Error types for tag extraction and event transformation.

use thiserror::Error;

/// Reasons a single feed event cannot be turned into a calendar body.
///
/// These are event-scoped: the sync loop logs them and moves on to the
/// next event.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransformError {
    /// The event has no `UID`, so no stable identifier can be derived.
    #[error("event has no UID")]
    MissingUid,

    /// The `UID` contains no character usable in a calendar event id.
    #[error("UID {uid:?} yields an empty event id")]
    EmptyIdentifier {
        /// The offending UID.
        uid: String,
    },

    /// The event has no start time.
    #[error("event has no start time")]
    MissingStart,

    /// A local time does not exist in its zone (skipped by a DST transition).
    #[error("local time {time} does not exist in {tzid}")]
    InvalidLocalTime {
        /// The local time as written in the feed.
        time: String,
        /// The zone it was attached to.
        tzid: String,
    },
}

/// Failure to build a course tag pattern from a subject list.
#[derive(Debug, Error)]
#[error("invalid subject pattern: {0}")]
pub struct TagPatternError(#[from] regex::Error);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transform_error_display() {
        assert_eq!(TransformError::MissingUid.to_string(), "event has no UID");
        let err = TransformError::EmptyIdentifier {
            uid: "wxyz".to_string(),
        };
        assert_eq!(err.to_string(), "UID \"wxyz\" yields an empty event id");
    }
}
