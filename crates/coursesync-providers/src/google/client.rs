//! Google Calendar API v3 HTTP client.
//!
//! Thin request/response layer: builds the URLs, attaches the bearer
//! token, and maps HTTP statuses to [`ProviderError`] codes. Token
//! lifetime is handled one level up, in [`GoogleCalendar`](super::GoogleCalendar).

use std::time::Duration;

use coursesync_core::TargetEvent;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{ProviderError, ProviderResult};

/// Google Calendar API client.
#[derive(Debug, Clone)]
pub struct GoogleCalendarApi {
    http_client: reqwest::Client,
    base_url: String,
}

impl GoogleCalendarApi {
    /// Creates a client for the API at `base_url`.
    pub fn new(
        base_url: impl Into<String>,
        timeout: Duration,
        user_agent: &str,
    ) -> ProviderResult<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .build()
            .map_err(|e| {
                ProviderError::internal(format!("failed to create HTTP client: {}", e))
                    .with_source(e)
            })?;

        Ok(Self {
            http_client,
            base_url: base_url.into(),
        })
    }

    fn events_url(&self, calendar_id: &str) -> String {
        format!(
            "{}/calendars/{}/events",
            self.base_url,
            urlencoding::encode(calendar_id)
        )
    }

    /// `events.insert`: creates `event` with its own `id`.
    ///
    /// A taken id comes back as HTTP 409, i.e. a conflict error.
    pub async fn insert_event(
        &self,
        access_token: &str,
        calendar_id: &str,
        event: &TargetEvent,
    ) -> ProviderResult<()> {
        debug!(calendar_id, event_id = %event.id, "events.insert");
        let request = self
            .http_client
            .post(self.events_url(calendar_id))
            .bearer_auth(access_token)
            .json(event);
        self.send(request).await.map(drop)
    }

    /// `events.update`: replaces the event `event_id` with `event`.
    pub async fn update_event(
        &self,
        access_token: &str,
        calendar_id: &str,
        event_id: &str,
        event: &TargetEvent,
    ) -> ProviderResult<()> {
        debug!(calendar_id, event_id, "events.update");
        let url = format!(
            "{}/{}",
            self.events_url(calendar_id),
            urlencoding::encode(event_id)
        );
        let request = self.http_client.put(url).bearer_auth(access_token).json(event);
        self.send(request).await.map(drop)
    }

    /// `calendarList.list`: every calendar on the user's list, across pages.
    pub async fn list_calendars(&self, access_token: &str) -> ProviderResult<Vec<CalendarListEntry>> {
        let url = format!("{}/users/me/calendarList", self.base_url);
        let mut calendars = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut request = self.http_client.get(&url).bearer_auth(access_token);
            if let Some(token) = &page_token {
                request = request.query(&[("pageToken", token)]);
            }

            let body = self.send(request).await?;
            let page: CalendarListResponse = serde_json::from_str(&body).map_err(|e| {
                ProviderError::invalid_response(format!("failed to parse calendar list: {}", e))
                    .with_source(e)
            })?;

            calendars.extend(page.items);
            match page.next_page_token {
                Some(token) => page_token = Some(token),
                None => break,
            }
        }

        debug!(count = calendars.len(), "listed calendars");
        Ok(calendars)
    }

    /// Sends `request` and returns the body of a successful response.
    async fn send(&self, request: reqwest::RequestBuilder) -> ProviderResult<String> {
        let response = request.send().await.map_err(ProviderError::from_reqwest)?;
        let status = response.status();
        let body = response.text().await.map_err(|e| {
            ProviderError::network(format!("failed to read response: {}", e)).with_source(e)
        })?;

        if !status.is_success() {
            return Err(ProviderError::from_status(status, &api_error_message(&body)));
        }
        Ok(body)
    }
}

/// Pulls `error.message` out of a Google error body, falling back to the raw body.
fn api_error_message(body: &str) -> String {
    serde_json::from_str::<ApiErrorResponse>(body)
        .map(|e| e.error.message)
        .unwrap_or_else(|_| body.to_string())
}

#[derive(Debug, Deserialize)]
struct ApiErrorResponse {
    error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    message: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CalendarListResponse {
    #[serde(default)]
    items: Vec<CalendarListEntry>,
    next_page_token: Option<String>,
}

/// A calendar from the calendar list.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarListEntry {
    /// The calendar ID.
    pub id: String,
    /// The calendar name.
    pub summary: String,
    /// Whether this is the user's primary calendar.
    #[serde(default)]
    pub primary: bool,
    /// The calendar timezone.
    pub time_zone: Option<String>,
}
