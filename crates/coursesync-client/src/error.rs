//! Client error types.

use std::fmt;

/// Result type for client operations.
pub type ClientResult<T> = Result<T, ClientError>;

/// Errors that end a `coursesync` invocation.
#[derive(Debug)]
pub enum ClientError {
    /// Configuration error.
    Config(String),
    /// Provider error outside the per-event loop (client setup, listing).
    Provider(String),
    /// IO error.
    Io(std::io::Error),
    /// Authorization missing, expired, or rejected.
    AuthRequired(String),
    /// The run finished with failures and `--fail-on-error` was given.
    SyncFailed(usize),
}

impl fmt::Display for ClientError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(msg) => write!(f, "configuration error: {}", msg),
            Self::Provider(msg) => write!(f, "provider error: {}", msg),
            Self::Io(err) => write!(f, "IO error: {}", err),
            Self::AuthRequired(msg) => write!(f, "authorization required: {}", msg),
            Self::SyncFailed(count) => write!(f, "sync finished with {} failure(s)", count),
        }
    }
}

impl std::error::Error for ClientError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for ClientError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<coursesync_providers::ProviderError> for ClientError {
    fn from(err: coursesync_providers::ProviderError) -> Self {
        match err.code() {
            coursesync_providers::ProviderErrorCode::AuthenticationFailed => {
                Self::AuthRequired(err.to_string())
            }
            _ => Self::Provider(err.to_string()),
        }
    }
}

impl From<coursesync_core::TagPatternError> for ClientError {
    fn from(err: coursesync_core::TagPatternError) -> Self {
        Self::Config(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use coursesync_providers::ProviderError;

    use super::*;

    #[test]
    fn authentication_failures_become_auth_required() {
        let err: ClientError = ProviderError::authentication("token revoked").into();
        assert!(matches!(err, ClientError::AuthRequired(_)));

        let err: ClientError = ProviderError::server("HTTP 503").into();
        assert!(matches!(err, ClientError::Provider(_)));
    }

    #[test]
    fn display() {
        assert_eq!(
            ClientError::SyncFailed(3).to_string(),
            "sync finished with 3 failure(s)"
        );
        assert_eq!(
            ClientError::Config("bad timezone".into()).to_string(),
            "configuration error: bad timezone"
        );
    }
}
