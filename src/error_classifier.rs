use crate::api::error::ApiError;
use crate::auth::AuthError;
use crate::logging::LogLevel;

#[derive(Debug, Clone)]
pub struct ErrorClassifier;

impl ErrorClassifier {
    pub fn new() -> Self {
        Self
    }

    pub fn classify_api_error(&self, error: &ApiError) -> LogLevel {
        match error {
            // Non-critical: Temporary server issues
            ApiError::Http { status, .. } if *status == 429 => LogLevel::Debug,
            ApiError::Http { status, .. } if (500..=599).contains(status) => LogLevel::Warn,

            // Critical: Auth, malformed responses
            e if e.is_auth_failure() => LogLevel::Error,
            ApiError::MissingData | ApiError::Decode(_) => LogLevel::Error,

            // The server understood and refused; the caller shows the message
            ApiError::Rejected { .. } => LogLevel::Info,

            // Network issues - usually temporary
            _ => LogLevel::Warn,
        }
    }

    pub fn classify_auth_error(&self, error: &AuthError) -> LogLevel {
        match error {
            AuthError::Validation(_) => LogLevel::Info,
            AuthError::Api(api) => self.classify_api_error(api),
            // Session cannot be persisted
            AuthError::Storage(_) => LogLevel::Error,
        }
    }
}

impl Default for ErrorClassifier {
    fn default() -> Self {
        Self::new()
    }
}
