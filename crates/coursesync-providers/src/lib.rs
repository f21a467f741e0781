//! Feed sources and calendar destinations for coursesync.
//!
//! - [`FeedFetcher`] / [`HttpFeedFetcher`] - download an ICS feed
//! - [`parse_ics_content`] - turn feed text into source events
//! - [`CalendarClient`] - write access to the destination calendar
//! - [`upsert`] - insert an event, or update it when its id is taken
//! - [`ProviderError`] - error type shared by all of the above
//!
//! ```text
//!  ICS host ──fetch──▶ text ──parse──▶ SourceEvent ──(core transform)──▶ TargetEvent
//!                                                                           │
//!                                                    upsert ◀──────────────┘
//!                                                       │
//!                                              CalendarClient (Google)
//! ```

pub mod calendar;
pub mod error;
pub mod feed;
#[cfg(feature = "google")]
pub mod google;
pub mod retry;

pub use calendar::{BoxFuture, CalendarClient, CalendarInfo, UpsertError, UpsertOutcome, upsert};
pub use error::{ProviderError, ProviderErrorCode, ProviderResult};
pub use feed::{FeedFetcher, HttpFeedFetcher, parse_ics_content};
pub use retry::RetryPolicy;
