//! API client configuration.

use crate::consts::cli_consts::api::{API_URL_ENV, DEFAULT_API_URL, ENVIRONMENT_ENV, request_timeout};
use crate::environment::Environment;
use std::fmt::{Debug, Display, Formatter};
use std::time::Duration;

/// Where the API lives and how long a request may take.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiConfig {
    base_url: String,
    timeout: Duration,
}

impl ApiConfig {
    /// Create a configuration for the given base URL with the fixed request timeout.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: normalize_base_url(&base_url.into()),
            timeout: request_timeout(),
        }
    }

    /// Resolve the base URL from the process environment.
    ///
    /// `CLOUDOPS_API_URL` wins; otherwise `CLOUDOPS_ENVIRONMENT` names a deployment.
    /// Unknown environment names fall back to the local API.
    pub fn from_env() -> Self {
        Self::resolve(
            std::env::var(API_URL_ENV).ok(),
            std::env::var(ENVIRONMENT_ENV).ok(),
        )
    }

    fn resolve(url: Option<String>, environment: Option<String>) -> Self {
        if let Some(url) = url.filter(|url| !url.trim().is_empty()) {
            return Self::new(url);
        }
        let environment = match environment {
            Some(name) => name.parse::<Environment>().unwrap_or_else(|_| {
                log::warn!("Unknown environment '{}', using {}", name, Environment::Local);
                Environment::Local
            }),
            None => Environment::default(),
        };
        Self::new(environment.api_url())
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Joins an endpoint path onto the base URL.
    pub fn url_for(&self, endpoint: &str) -> String {
        format!("{}/{}", self.base_url, endpoint.trim_start_matches('/'))
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self::new(DEFAULT_API_URL)
    }
}

impl Display for ApiConfig {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.base_url)
    }
}

impl Debug for ApiConfig {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "ApiConfig, URL: {}, timeout: {}s",
            self.base_url,
            self.timeout.as_secs()
        )
    }
}

fn normalize_base_url(url: &str) -> String {
    url.trim().trim_end_matches('/').to_string()
}
