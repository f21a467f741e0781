//! [`CalendarClient`] implementation for Google Calendar.

use std::future::Future;

use coursesync_core::TargetEvent;
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::calendar::{BoxFuture, CalendarClient, CalendarInfo};
use crate::error::{ProviderError, ProviderErrorCode, ProviderResult};

use super::client::GoogleCalendarApi;
use super::config::GoogleConfig;
use super::oauth::OAuthClient;
use super::tokens::TokenStorage;

/// Google Calendar as a sync destination.
///
/// Loads the persisted OAuth token on creation, refreshes the access token
/// when it expires or the API rejects it, and writes refreshed tokens back
/// to disk.
pub struct GoogleCalendar {
    config: GoogleConfig,
    display_name: String,
    token_storage: TokenStorage,
    oauth_client: OAuthClient,
    api: GoogleCalendarApi,
    /// Serializes token refreshes.
    refresh_lock: Mutex<()>,
}

impl GoogleCalendar {
    /// Creates the client and loads any stored token.
    ///
    /// Does not start authorization; see [`authorize`](Self::authorize).
    pub fn new(config: GoogleConfig) -> ProviderResult<Self> {
        config.validate().map_err(ProviderError::configuration)?;

        let display_name = config.provider_name();
        let token_storage = TokenStorage::new(&config.token_path);
        token_storage
            .load()
            .map_err(|e| e.with_provider(&display_name))?;

        let oauth_client = OAuthClient::new(config.credentials.clone(), config.timeout)?
            .with_token_url(&config.token_url);
        let api = GoogleCalendarApi::new(&config.api_base_url, config.timeout, &config.user_agent)?;

        Ok(Self {
            config,
            display_name,
            token_storage,
            oauth_client,
            api,
            refresh_lock: Mutex::new(()),
        })
    }

    /// Runs the browser authorization flow and stores the resulting token.
    pub async fn authorize(&self) -> ProviderResult<()> {
        info!(account = %self.config.account_name, "starting Google authorization");
        let tokens = self
            .oauth_client
            .authorize(&self.config.scopes, self.config.loopback_port_range)
            .await
            .map_err(|e| e.with_provider(&self.display_name))?;
        self.token_storage.set(tokens)?;
        info!(path = %self.token_storage.path().display(), "token saved");
        Ok(())
    }

    /// Returns true if a stored token can be used, directly or after a refresh.
    pub fn is_authenticated(&self) -> bool {
        self.token_storage
            .get()
            .is_some_and(|t| !t.is_expired() || t.refresh_token.is_some())
    }

    /// Returns true if there is no token or it lacks a configured scope.
    pub fn needs_reauth(&self) -> bool {
        self.token_storage.needs_reauth(&self.config.scopes)
    }

    fn not_authorized(&self, reason: &str) -> ProviderError {
        ProviderError::authentication(format!("{}, run 'coursesync auth google'", reason))
            .with_provider(&self.display_name)
    }

    /// Returns a usable access token, refreshing it first if it has expired.
    async fn access_token(&self) -> ProviderResult<String> {
        let tokens = self
            .token_storage
            .get()
            .ok_or_else(|| self.not_authorized("not authorized"))?;

        if tokens.is_expired() {
            self.refresh(&tokens.access_token).await
        } else {
            Ok(tokens.access_token)
        }
    }

    /// Refreshes the access token unless another caller already replaced `stale`.
    async fn refresh(&self, stale: &str) -> ProviderResult<String> {
        let _guard = self.refresh_lock.lock().await;

        let tokens = self
            .token_storage
            .get()
            .ok_or_else(|| self.not_authorized("not authorized"))?;
        if tokens.access_token != stale && !tokens.is_expired() {
            return Ok(tokens.access_token);
        }

        let refresh_token = tokens
            .refresh_token
            .as_deref()
            .ok_or_else(|| self.not_authorized("access token expired and no refresh token stored"))?;

        debug!("refreshing access token");
        let (access_token, expires_in) = self
            .oauth_client
            .refresh_token(refresh_token)
            .await
            .map_err(|e| e.with_provider(&self.display_name))?;
        let updated = self
            .token_storage
            .update_access_token(access_token, expires_in)?;
        Ok(updated.access_token)
    }

    /// Runs `call` with a valid token, refreshing and retrying once on HTTP 401.
    async fn authorized<T, F, Fut>(&self, call: F) -> ProviderResult<T>
    where
        F: Fn(String) -> Fut,
        Fut: Future<Output = ProviderResult<T>>,
    {
        let token = self.access_token().await?;
        let result = match call(token.clone()).await {
            Err(err) if err.code() == ProviderErrorCode::AuthenticationFailed => {
                debug!("access token rejected, refreshing");
                let fresh = self.refresh(&token).await?;
                call(fresh).await
            }
            other => other,
        };
        result.map_err(|e| e.with_provider(&self.display_name))
    }
}

impl CalendarClient for GoogleCalendar {
    fn name(&self) -> &str {
        &self.display_name
    }

    fn insert<'a>(
        &'a self,
        calendar_id: &'a str,
        event: &'a TargetEvent,
    ) -> BoxFuture<'a, ProviderResult<()>> {
        Box::pin(self.authorized(move |token| async move {
            self.api.insert_event(&token, calendar_id, event).await
        }))
    }

    fn update<'a>(
        &'a self,
        calendar_id: &'a str,
        event_id: &'a str,
        event: &'a TargetEvent,
    ) -> BoxFuture<'a, ProviderResult<()>> {
        Box::pin(self.authorized(move |token| async move {
            self.api
                .update_event(&token, calendar_id, event_id, event)
                .await
        }))
    }

    fn list_calendars(&self) -> BoxFuture<'_, ProviderResult<Vec<CalendarInfo>>> {
        Box::pin(async move {
            let entries = self
                .authorized(move |token| async move { self.api.list_calendars(&token).await })
                .await?;

            Ok(entries
                .into_iter()
                .map(|entry| {
                    let info = CalendarInfo::new(entry.id, entry.summary).with_primary(entry.primary);
                    match entry.time_zone {
                        Some(tz) => info.with_timezone(tz),
                        None => info,
                    }
                })
                .collect())
        })
    }
}
