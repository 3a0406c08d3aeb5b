//! Configuration types for the Billogram API client.
//!
//! The main types in this module are:
//!
//! - [`Config`]: connection settings, immutable after construction
//! - [`ConfigBuilder`]: fluent builder for [`Config`] instances
//! - [`AuthUser`] / [`AuthKey`]: validated credential newtypes
//!
//! # Example
//!
//! ```rust
//! use billogram_api::{AuthKey, AuthUser, Config};
//!
//! let config = Config::builder()
//!     .auth_user(AuthUser::new("1234-abcd").unwrap())
//!     .auth_key(AuthKey::new("my-api-key").unwrap())
//!     .user_agent("MyIntegration/2.0")
//!     .build()
//!     .unwrap();
//! ```

mod newtypes;

pub use newtypes::{AuthKey, AuthUser};

use std::collections::HashMap;
use std::time::Duration;

use crate::error::ConfigError;

/// Default base URL of the Billogram v2 API.
pub const DEFAULT_API_BASE: &str = "https://billogram.com/api/v2";

/// Default User-Agent header sent with every request.
pub const DEFAULT_USER_AGENT: &str =
    concat!("Billogram API Rust Library/", env!("CARGO_PKG_VERSION"));

/// Default request timeout handed to the HTTP transport.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Configuration for a [`Connection`](crate::Connection).
///
/// Holds the API credentials, the base URL, the User-Agent string, any
/// extra static headers merged into every request, and the transport
/// timeout. All fields are set at construction and immutable thereafter;
/// there is no process-wide mutable state.
///
/// # Example
///
/// ```rust
/// use billogram_api::{AuthKey, AuthUser, Config, DEFAULT_API_BASE};
///
/// let config = Config::builder()
///     .auth_user(AuthUser::new("1234-abcd").unwrap())
///     .auth_key(AuthKey::new("key").unwrap())
///     .build()
///     .unwrap();
///
/// assert_eq!(config.api_base(), DEFAULT_API_BASE);
/// ```
#[derive(Clone, Debug)]
pub struct Config {
    auth_user: AuthUser,
    auth_key: AuthKey,
    api_base: String,
    user_agent: String,
    extra_headers: HashMap<String, String>,
    timeout: Duration,
}

impl Config {
    /// Creates a new builder for constructing a `Config`.
    #[must_use]
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::new()
    }

    /// Returns the API user identifier.
    #[must_use]
    pub const fn auth_user(&self) -> &AuthUser {
        &self.auth_user
    }

    /// Returns the API secret key.
    #[must_use]
    pub const fn auth_key(&self) -> &AuthKey {
        &self.auth_key
    }

    /// Returns the API base URL.
    #[must_use]
    pub fn api_base(&self) -> &str {
        &self.api_base
    }

    /// Returns the User-Agent string.
    #[must_use]
    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }

    /// Returns the extra headers merged into every request.
    #[must_use]
    pub const fn extra_headers(&self) -> &HashMap<String, String> {
        &self.extra_headers
    }

    /// Returns the request timeout passed to the HTTP transport.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        self.timeout
    }
}

// Verify Config is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<Config>();
};

/// Builder for constructing [`Config`] instances.
///
/// Required fields are `auth_user` and `auth_key`; everything else has a
/// documented default.
///
/// # Defaults
///
/// - `api_base`: [`DEFAULT_API_BASE`]
/// - `user_agent`: [`DEFAULT_USER_AGENT`]
/// - `extra_headers`: empty
/// - `timeout`: [`DEFAULT_TIMEOUT`]
#[derive(Debug, Default)]
pub struct ConfigBuilder {
    auth_user: Option<AuthUser>,
    auth_key: Option<AuthKey>,
    api_base: Option<String>,
    user_agent: Option<String>,
    extra_headers: HashMap<String, String>,
    timeout: Option<Duration>,
}

impl ConfigBuilder {
    /// Creates a new builder with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the API user identifier (required).
    #[must_use]
    pub fn auth_user(mut self, user: AuthUser) -> Self {
        self.auth_user = Some(user);
        self
    }

    /// Sets the API secret key (required).
    #[must_use]
    pub fn auth_key(mut self, key: AuthKey) -> Self {
        self.auth_key = Some(key);
        self
    }

    /// Overrides the API base URL. A trailing slash is stripped.
    #[must_use]
    pub fn api_base(mut self, base: impl Into<String>) -> Self {
        let base = base.into();
        self.api_base = Some(base.trim_end_matches('/').to_string());
        self
    }

    /// Overrides the User-Agent string.
    #[must_use]
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    /// Adds a static header sent with every request.
    #[must_use]
    pub fn extra_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.extra_headers.insert(name.into(), value.into());
        self
    }

    /// Sets all extra headers at once, replacing any previously added.
    #[must_use]
    pub fn extra_headers(mut self, headers: HashMap<String, String>) -> Self {
        self.extra_headers = headers;
        self
    }

    /// Sets the request timeout handed to the HTTP transport.
    #[must_use]
    pub const fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Builds the [`Config`], validating that required fields are set.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingRequiredField`] if `auth_user` or
    /// `auth_key` are not set.
    pub fn build(self) -> Result<Config, ConfigError> {
        let auth_user = self
            .auth_user
            .ok_or(ConfigError::MissingRequiredField { field: "auth_user" })?;
        let auth_key = self
            .auth_key
            .ok_or(ConfigError::MissingRequiredField { field: "auth_key" })?;

        Ok(Config {
            auth_user,
            auth_key,
            api_base: self
                .api_base
                .unwrap_or_else(|| DEFAULT_API_BASE.to_string()),
            user_agent: self
                .user_agent
                .unwrap_or_else(|| DEFAULT_USER_AGENT.to_string()),
            extra_headers: self.extra_headers,
            timeout: self.timeout.unwrap_or(DEFAULT_TIMEOUT),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_requires_auth_user() {
        let result = ConfigBuilder::new()
            .auth_key(AuthKey::new("key").unwrap())
            .build();

        assert!(matches!(
            result,
            Err(ConfigError::MissingRequiredField { field: "auth_user" })
        ));
    }

    #[test]
    fn test_builder_requires_auth_key() {
        let result = ConfigBuilder::new()
            .auth_user(AuthUser::new("user").unwrap())
            .build();

        assert!(matches!(
            result,
            Err(ConfigError::MissingRequiredField { field: "auth_key" })
        ));
    }

    #[test]
    fn test_builder_provides_documented_defaults() {
        let config = Config::builder()
            .auth_user(AuthUser::new("user").unwrap())
            .auth_key(AuthKey::new("key").unwrap())
            .build()
            .unwrap();

        assert_eq!(config.api_base(), DEFAULT_API_BASE);
        assert_eq!(config.user_agent(), DEFAULT_USER_AGENT);
        assert!(config.extra_headers().is_empty());
        assert_eq!(config.timeout(), DEFAULT_TIMEOUT);
    }

    #[test]
    fn test_api_base_trailing_slash_is_stripped() {
        let config = Config::builder()
            .auth_user(AuthUser::new("user").unwrap())
            .auth_key(AuthKey::new("key").unwrap())
            .api_base("https://sandbox.billogram.com/api/v2/")
            .build()
            .unwrap();

        assert_eq!(config.api_base(), "https://sandbox.billogram.com/api/v2");
    }

    #[test]
    fn test_extra_headers_are_collected() {
        let config = Config::builder()
            .auth_user(AuthUser::new("user").unwrap())
            .auth_key(AuthKey::new("key").unwrap())
            .extra_header("X-Partner-Id", "partner-7")
            .extra_header("X-Trace", "on")
            .build()
            .unwrap();

        assert_eq!(
            config.extra_headers().get("X-Partner-Id"),
            Some(&"partner-7".to_string())
        );
        assert_eq!(config.extra_headers().len(), 2);
    }

    #[test]
    fn test_config_is_clone_and_debug_with_masked_key() {
        let config = Config::builder()
            .auth_user(AuthUser::new("user").unwrap())
            .auth_key(AuthKey::new("secret-key").unwrap())
            .build()
            .unwrap();

        let cloned = config.clone();
        assert_eq!(cloned.api_base(), config.api_base());

        let debug = format!("{config:?}");
        assert!(debug.contains("Config"));
        assert!(!debug.contains("secret-key"));
    }
}
