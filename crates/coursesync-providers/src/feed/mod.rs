//! ICS feed download and parsing.
//!
//! - [`FeedFetcher`]: downloads the raw text of a [`CalendarSource`]
//! - [`HttpFeedFetcher`]: the `reqwest` implementation
//! - [`parse_ics_content`]: turns feed text into [`SourceEvent`](coursesync_core::SourceEvent)s

mod ics;

use std::time::Duration;

use coursesync_core::CalendarSource;
use tracing::debug;

use crate::calendar::BoxFuture;
use crate::error::{ProviderError, ProviderResult};

pub use ics::parse_ics_content;

/// Default request timeout for feed downloads.
pub const DEFAULT_FEED_TIMEOUT: Duration = Duration::from_secs(30);

/// User agent sent with feed requests.
pub const USER_AGENT: &str = concat!("coursesync/", env!("CARGO_PKG_VERSION"));

/// Downloads the body of an ICS feed.
pub trait FeedFetcher: Send + Sync {
    /// Fetches the raw text of `source`.
    ///
    /// Errors carry the source name as their provider.
    fn fetch<'a>(&'a self, source: &'a CalendarSource) -> BoxFuture<'a, ProviderResult<String>>;
}

/// Fetches feeds over HTTP(S).
///
/// Redirects are followed; any final status outside 2xx/3xx is an error.
#[derive(Debug, Clone)]
pub struct HttpFeedFetcher {
    http_client: reqwest::Client,
}

impl HttpFeedFetcher {
    /// Creates a fetcher with the given request timeout.
    pub fn new(timeout: Duration) -> ProviderResult<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| {
                ProviderError::internal(format!("failed to create HTTP client: {}", e))
                    .with_source(e)
            })?;

        Ok(Self { http_client })
    }

    async fn fetch_text(&self, source: &CalendarSource) -> ProviderResult<String> {
        debug!(source = %source.name, url = %source.url, "fetching feed");

        let response = self
            .http_client
            .get(&source.url)
            .send()
            .await
            .map_err(ProviderError::from_reqwest)?;

        let status = response.status();
        if !(status.is_success() || status.is_redirection()) {
            let detail = response.text().await.unwrap_or_default();
            return Err(ProviderError::from_status(status, &detail));
        }

        let body = response.text().await.map_err(|e| {
            ProviderError::network(format!("failed to read response: {}", e)).with_source(e)
        })?;

        debug!(source = %source.name, bytes = body.len(), "feed downloaded");
        Ok(body)
    }
}

impl FeedFetcher for HttpFeedFetcher {
    fn fetch<'a>(&'a self, source: &'a CalendarSource) -> BoxFuture<'a, ProviderResult<String>> {
        Box::pin(async move {
            self.fetch_text(source)
                .await
                .map_err(|e| e.with_provider(&source.name))
        })
    }
}

#[cfg(test)]
mod tests {
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::error::ProviderErrorCode;

    async fn fetch(server: &MockServer, route: &str) -> ProviderResult<String> {
        let fetcher = HttpFeedFetcher::new(Duration::from_secs(5)).unwrap();
        let source = CalendarSource::new("eLearning", format!("{}{}", server.uri(), route));
        fetcher.fetch(&source).await
    }

    #[tokio::test]
    async fn returns_body_on_success() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/feed.ics"))
            .respond_with(ResponseTemplate::new(200).set_body_string("BEGIN:VCALENDAR\r\nEND:VCALENDAR"))
            .mount(&server)
            .await;

        let body = fetch(&server, "/feed.ics").await.unwrap();
        assert!(body.starts_with("BEGIN:VCALENDAR"));
    }

    #[tokio::test]
    async fn follows_redirects() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/old.ics"))
            .respond_with(
                ResponseTemplate::new(302).insert_header("Location", format!("{}/new.ics", server.uri())),
            )
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/new.ics"))
            .respond_with(ResponseTemplate::new(200).set_body_string("BEGIN:VCALENDAR"))
            .mount(&server)
            .await;

        assert_eq!(fetch(&server, "/old.ics").await.unwrap(), "BEGIN:VCALENDAR");
    }

    #[tokio::test]
    async fn server_error_carries_source_name() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/feed.ics"))
            .respond_with(ResponseTemplate::new(500).set_body_string("internal error"))
            .mount(&server)
            .await;

        let err = fetch(&server, "/feed.ics").await.unwrap_err();
        assert_eq!(err.code(), ProviderErrorCode::ServerError);
        assert_eq!(err.provider(), Some("eLearning"));
        assert!(err.message().contains("internal error"));
    }

    #[tokio::test]
    async fn missing_feed_is_not_found() {
        let server = MockServer::start().await;
        let err = fetch(&server, "/missing.ics").await.unwrap_err();
        assert_eq!(err.code(), ProviderErrorCode::NotFound);
    }

    #[tokio::test]
    async fn unreachable_host_is_network_error() {
        let fetcher = HttpFeedFetcher::new(Duration::from_secs(2)).unwrap();
        let source = CalendarSource::new("Teams", "http://127.0.0.1:9/feed.ics");
        let err = fetcher.fetch(&source).await.unwrap_err();
        assert_eq!(err.code(), ProviderErrorCode::NetworkError);
        assert_eq!(err.provider(), Some("Teams"));
    }
}
