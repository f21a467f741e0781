//! Google Calendar as the sync destination.
//!
//! - OAuth 2.0 PKCE authorization with a loopback redirect ([`OAuthClient`])
//! - Token persistence with owner-only permissions ([`TokenStorage`])
//! - Access token refresh on expiry and on HTTP 401
//! - `events.insert`, `events.update` and `calendarList.list` ([`GoogleCalendarApi`])
//!
//! Users bring their own OAuth client id and secret; Google does not issue
//! calendar tokens to unregistered applications.

mod client;
mod config;
mod oauth;
mod provider;
mod tokens;

pub use client::{CalendarListEntry, GoogleCalendarApi};
pub use config::{CALENDAR_API_BASE, GoogleConfig, OAuthCredentials, TOKEN_URL};
pub use oauth::{OAuthClient, PkceFlow};
pub use provider::GoogleCalendar;
pub use tokens::{TokenInfo, TokenStorage};
