//! Client configuration.
//!
//! A `Config` is assembled once, validated, and then moved into the client.
//! Nothing mutates it afterwards.

use std::fmt;
use std::time::Duration;

use oauth2::{AccessToken, ClientId, ClientSecret};
use url::Url;

use crate::error::ConfigError;

/// Base URL of the Forrst v2 API.
pub const DEFAULT_ENDPOINT: &str = "http://forrst.com/api/v2/";

/// User agent sent when none is configured.
pub const DEFAULT_USER_AGENT: &str = concat!("forrst-rs/", env!("CARGO_PKG_VERSION"));

/// Credentials and endpoint settings shared by every request.
#[derive(Clone)]
pub struct Config {
    pub app_id: Option<ClientId>,
    pub app_secret: Option<ClientSecret>,
    pub access_token: Option<AccessToken>,
    pub endpoint: String,
    pub user_agent: String,
    pub timeout: Option<Duration>,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("app_id", &self.app_id.as_ref().map(|id| id.as_str()))
            .field("app_secret", &self.app_secret.as_ref().map(|_| "<redacted>"))
            .field("access_token", &self.access_token.as_ref().map(|_| "<redacted>"))
            .field("endpoint", &self.endpoint)
            .field("user_agent", &self.user_agent)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            app_id: None,
            app_secret: None,
            access_token: None,
            endpoint: DEFAULT_ENDPOINT.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout: None,
        }
    }
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_app_id(mut self, id: impl Into<String>) -> Self {
        self.app_id = Some(ClientId::new(id.into()));
        self
    }

    pub fn with_app_secret(mut self, secret: impl Into<String>) -> Self {
        self.app_secret = Some(ClientSecret::new(secret.into()));
        self
    }

    pub fn with_access_token(mut self, token: impl Into<String>) -> Self {
        self.access_token = Some(AccessToken::new(token.into()));
        self
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Load configuration from `FORRST_*` environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if `FORRST_TIMEOUT_SECS` is not an integer or the
    /// resulting configuration fails [`Config::validate`].
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Config::new();
        if let Some(id) = optional_env("FORRST_APP_ID") {
            config = config.with_app_id(id);
        }
        if let Some(secret) = optional_env("FORRST_APP_SECRET") {
            config = config.with_app_secret(secret);
        }
        if let Some(token) = optional_env("FORRST_ACCESS_TOKEN") {
            config = config.with_access_token(token);
        }
        if let Some(endpoint) = optional_env("FORRST_ENDPOINT") {
            config = config.with_endpoint(endpoint);
        }
        if let Some(user_agent) = optional_env("FORRST_USER_AGENT") {
            config = config.with_user_agent(user_agent);
        }
        if let Some(secs) = optional_env("FORRST_TIMEOUT_SECS") {
            let secs: u64 = secs.parse().map_err(|_| ConfigError::ParseInt {
                name: "FORRST_TIMEOUT_SECS".to_string(),
                value: secs.clone(),
            })?;
            config = config.with_timeout(Duration::from_secs(secs));
        }
        config.validate()?;
        Ok(config)
    }

    /// Check that the endpoint is an absolute http(s) URL without a query or
    /// fragment, and that the user agent is non-empty.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let url = Url::parse(&self.endpoint).map_err(|e| ConfigError::InvalidValue {
            name: "endpoint".to_string(),
            message: e.to_string(),
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ConfigError::InvalidValue {
                name: "endpoint".to_string(),
                message: format!("unsupported scheme {}", url.scheme()),
            });
        }
        if url.query().is_some() || url.fragment().is_some() {
            return Err(ConfigError::InvalidValue {
                name: "endpoint".to_string(),
                message: "cannot carry a query string or fragment".to_string(),
            });
        }
        if self.user_agent.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                name: "user_agent".to_string(),
                message: "cannot be empty".to_string(),
            });
        }
        Ok(())
    }

    /// Endpoint with exactly one trailing slash, ready for relative paths.
    pub(crate) fn base_url(&self) -> String {
        format!("{}/", self.endpoint.trim_end_matches('/'))
    }
}

fn optional_env(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_point_at_forrst() {
        let config = Config::new();
        assert_eq!(config.endpoint, "http://forrst.com/api/v2/");
        assert!(config.user_agent.starts_with("forrst-rs/"));
        assert!(config.access_token.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn base_url_normalizes_trailing_slash() {
        let config = Config::new().with_endpoint("http://localhost:3000/api/v2");
        assert_eq!(config.base_url(), "http://localhost:3000/api/v2/");
        let config = Config::new().with_endpoint("http://localhost:3000/api/v2//");
        assert_eq!(config.base_url(), "http://localhost:3000/api/v2/");
    }

    #[test]
    fn relative_endpoint_is_rejected() {
        let err = Config::new().with_endpoint("api/v2").validate().unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { ref name, .. } if name == "endpoint"));
    }

    #[test]
    fn non_http_endpoint_is_rejected() {
        let err = Config::new().with_endpoint("ftp://forrst.com/").validate().unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { .. }));
    }

    #[test]
    fn endpoint_with_query_or_fragment_is_rejected() {
        for endpoint in [
            "http://forrst.com/api/v2/?env=sandbox",
            "http://forrst.com/api/v2/#top",
        ] {
            let err = Config::new().with_endpoint(endpoint).validate().unwrap_err();
            assert!(
                matches!(err, ConfigError::InvalidValue { ref name, .. } if name == "endpoint")
            );
        }
    }

    #[test]
    fn blank_user_agent_is_rejected() {
        assert!(Config::new().with_user_agent("  ").validate().is_err());
    }

    #[test]
    fn debug_redacts_secrets() {
        let config = Config::new()
            .with_app_id("app")
            .with_app_secret("shh")
            .with_access_token("tok123");
        let printed = format!("{config:?}");
        assert!(printed.contains("app"));
        assert!(!printed.contains("shh"));
        assert!(!printed.contains("tok123"));
    }
}
