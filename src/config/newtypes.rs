//! Validated newtype wrappers for API credentials.
//!
//! Credentials are validated on construction so that an empty user or key
//! is rejected before any request is attempted.

use std::fmt;

use crate::error::ConfigError;

/// A validated Billogram API user identifier.
///
/// API accounts can only be created from the Billogram web interface; the
/// user identifier is the first half of the Basic authentication pair.
///
/// # Example
///
/// ```rust
/// use billogram_api::AuthUser;
///
/// let user = AuthUser::new("1234-abcd").unwrap();
/// assert_eq!(user.as_ref(), "1234-abcd");
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AuthUser(String);

impl AuthUser {
    /// Creates a new validated API user identifier.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::EmptyAuthUser`] if the identifier is empty.
    pub fn new(user: impl Into<String>) -> Result<Self, ConfigError> {
        let user = user.into();
        if user.is_empty() {
            return Err(ConfigError::EmptyAuthUser);
        }
        Ok(Self(user))
    }
}

impl AsRef<str> for AuthUser {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// A validated Billogram API secret key.
///
/// The second half of the Basic authentication pair. The `Debug`
/// implementation masks the value so the key cannot leak into logs.
///
/// # Example
///
/// ```rust
/// use billogram_api::AuthKey;
///
/// let key = AuthKey::new("s3cr3t").unwrap();
/// assert_eq!(format!("{:?}", key), "AuthKey(*****)");
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct AuthKey(String);

impl AuthKey {
    /// Creates a new validated API secret key.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::EmptyAuthKey`] if the key is empty.
    pub fn new(key: impl Into<String>) -> Result<Self, ConfigError> {
        let key = key.into();
        if key.is_empty() {
            return Err(ConfigError::EmptyAuthKey);
        }
        Ok(Self(key))
    }
}

impl AsRef<str> for AuthKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for AuthKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AuthKey(*****)")
    }
}
