//! Authenticated connection to the Billogram API.
//!
//! This module provides the [`Connection`] type, which owns the credentials
//! and base URL, builds authenticated requests, and hands every response to
//! the classifier in [`crate::clients::response`].

use std::collections::HashMap;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use serde_json::Value;

use crate::clients::response::{self, Envelope, Payload};
use crate::config::{AuthKey, AuthUser, Config};
use crate::error::ApiError;
use crate::resources::{BillogramCollection, RemoteObject, ResourceCollection};

/// Connection to the Billogram v2 API.
///
/// Owns the [`Config`] (credentials, base URL, User-Agent, extra headers,
/// timeout) and an HTTP client. All request building happens here: absolute
/// URL construction, Basic authentication, query string encoding for GET,
/// and JSON bodies for POST/PUT. Responses are passed through the response
/// classifier, whose result or error is surfaced directly — this layer
/// never retries and never reinterprets errors.
///
/// A `Connection` is not designed for concurrent mutation of the objects it
/// hands out; callers needing parallelism should use independent
/// connections or serialize access themselves.
///
/// # Example
///
/// ```rust,ignore
/// use billogram_api::{AuthKey, AuthUser, Connection};
///
/// let api = Connection::from_credentials(
///     AuthUser::new("1234-abcd")?,
///     AuthKey::new("my-api-key")?,
/// );
///
/// let customer = api.customers().get("12345").await?;
/// let invoices = api.billogram().query().page_size(50).get_page(1).await?;
/// ```
#[derive(Debug)]
pub struct Connection {
    config: Config,
    client: reqwest::Client,
}

// Verify Connection is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<Connection>();
};

impl Connection {
    /// Creates a connection from a full [`Config`].
    ///
    /// # Panics
    ///
    /// Panics if the underlying HTTP client cannot be created, which only
    /// happens in unusual circumstances such as TLS initialization failure.
    #[must_use]
    pub fn new(config: Config) -> Self {
        let client = reqwest::Client::builder()
            .use_rustls_tls()
            .timeout(config.timeout())
            .build()
            .expect("Failed to create HTTP client");

        Self { config, client }
    }

    /// Creates a connection with default settings for the given credentials.
    #[must_use]
    pub fn from_credentials(auth_user: AuthUser, auth_key: AuthKey) -> Self {
        let config = Config::builder()
            .auth_user(auth_user)
            .auth_key(auth_key)
            .build()
            .expect("both credentials are provided");
        Self::new(config)
    }

    /// Returns the connection's configuration.
    #[must_use]
    pub const fn config(&self) -> &Config {
        &self.config
    }

    /// Returns the Basic authentication header value for the credentials.
    fn auth_header(&self) -> String {
        let pair = format!(
            "{}:{}",
            self.config.auth_user().as_ref(),
            self.config.auth_key().as_ref()
        );
        format!("Basic {}", BASE64.encode(pair))
    }

    /// Builds the absolute URL for an object path.
    fn absolute_url(&self, path: &str) -> String {
        format!("{}/{}", self.config.api_base(), path)
    }

    /// Sends a request and classifies the response.
    async fn send(
        &self,
        method: reqwest::Method,
        path: &str,
        query: Option<&HashMap<String, String>>,
        body: Option<&Value>,
        expected_content_type: Option<&str>,
    ) -> Result<Payload, ApiError> {
        let url = self.absolute_url(path);
        tracing::debug!(%method, %url, "sending Billogram API request");

        let mut request = self
            .client
            .request(method, &url)
            .header("Authorization", self.auth_header())
            .header("User-Agent", self.config.user_agent());

        for (name, value) in self.config.extra_headers() {
            request = request.header(name, value);
        }

        if let Some(query) = query {
            request = request.query(query);
        }
        if let Some(body) = body {
            // reqwest sets Content-Type: application/json for .json() bodies
            request = request.json(body);
        }

        let response = request.send().await?;
        let status_code = response.status().as_u16();
        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(ToString::to_string);
        let bytes = response.bytes().await?;

        response::classify(
            status_code,
            content_type.as_deref(),
            &bytes,
            expected_content_type,
        )
    }

    /// Requires a JSON envelope from a classified payload.
    fn expect_envelope(payload: Payload) -> Result<Envelope, ApiError> {
        match payload {
            Payload::Envelope(envelope) => Ok(envelope),
            Payload::Raw(_) => Err(ApiError::ServiceMalfunctioning(
                "Billogram API returned unexpected content type".to_string(),
            )),
        }
    }

    /// Makes a GET request to an API object.
    ///
    /// Used for fetching an existing object or a list of resources. Query
    /// parameters, when given, are URL-encoded into the query string.
    ///
    /// # Errors
    ///
    /// Returns the [`ApiError`] chosen by the response classifier, or
    /// [`ApiError::Network`] for transport failures.
    pub async fn get(
        &self,
        path: &str,
        query: Option<&HashMap<String, String>>,
    ) -> Result<Envelope, ApiError> {
        let payload = self
            .send(reqwest::Method::GET, path, query, None, None)
            .await?;
        Self::expect_envelope(payload)
    }

    /// Makes a GET request with an expected content type override.
    ///
    /// The override only takes effect on HTTP 200 responses; error
    /// responses are always classified as JSON envelopes. When the expected
    /// type is not JSON and matches the response, the raw body is returned
    /// as [`Payload::Raw`].
    ///
    /// # Errors
    ///
    /// Returns the [`ApiError`] chosen by the response classifier.
    pub async fn get_with_content_type(
        &self,
        path: &str,
        query: Option<&HashMap<String, String>>,
        expected_content_type: &str,
    ) -> Result<Payload, ApiError> {
        self.send(
            reqwest::Method::GET,
            path,
            query,
            None,
            Some(expected_content_type),
        )
        .await
    }

    /// Makes a POST request to an API object. Used to create a new object
    /// and to dispatch events.
    ///
    /// # Errors
    ///
    /// Returns the [`ApiError`] chosen by the response classifier.
    pub async fn post(&self, path: &str, data: &Value) -> Result<Envelope, ApiError> {
        let payload = self
            .send(reqwest::Method::POST, path, None, Some(data), None)
            .await?;
        Self::expect_envelope(payload)
    }

    /// Makes a PUT request to an API object. Used for updating a single
    /// existing object.
    ///
    /// # Errors
    ///
    /// Returns the [`ApiError`] chosen by the response classifier.
    pub async fn put(&self, path: &str, data: &Value) -> Result<Envelope, ApiError> {
        let payload = self
            .send(reqwest::Method::PUT, path, None, Some(data), None)
            .await?;
        Self::expect_envelope(payload)
    }

    /// Makes a DELETE request to an API object. No body is sent.
    ///
    /// # Errors
    ///
    /// Returns the [`ApiError`] chosen by the response classifier.
    pub async fn delete(&self, path: &str) -> Result<Envelope, ApiError> {
        let payload = self
            .send(reqwest::Method::DELETE, path, None, None, None)
            .await?;
        Self::expect_envelope(payload)
    }

    /// The item (invoice article) collection.
    #[must_use]
    pub const fn items(&self) -> ResourceCollection<'_> {
        ResourceCollection::new(self, "item", "item_no")
    }

    /// The customer collection.
    #[must_use]
    pub const fn customers(&self) -> ResourceCollection<'_> {
        ResourceCollection::new(self, "customer", "customer_no")
    }

    /// The billogram (invoice) collection, with its lifecycle operations.
    #[must_use]
    pub const fn billogram(&self) -> BillogramCollection<'_> {
        BillogramCollection::new(self)
    }

    /// The account settings singleton, fetched lazily on first field access.
    #[must_use]
    pub const fn settings(&self) -> RemoteObject<'_> {
        RemoteObject::singleton(self, "settings")
    }

    /// The logotype singleton, fetched lazily on first field access.
    #[must_use]
    pub const fn logotype(&self) -> RemoteObject<'_> {
        RemoteObject::singleton(self, "logotype")
    }

    /// The report collection.
    #[must_use]
    pub const fn reports(&self) -> ResourceCollection<'_> {
        ResourceCollection::new(self, "report", "filename")
    }

    /// The creditor collection.
    #[must_use]
    pub const fn creditors(&self) -> ResourceCollection<'_> {
        ResourceCollection::new(self, "creditor", "id")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_connection() -> Connection {
        Connection::from_credentials(
            AuthUser::new("test-user").unwrap(),
            AuthKey::new("test-key").unwrap(),
        )
    }

    #[test]
    fn test_auth_header_is_base64_of_user_and_key() {
        let connection = create_test_connection();
        // base64("test-user:test-key")
        assert_eq!(connection.auth_header(), "Basic dGVzdC11c2VyOnRlc3Qta2V5");
    }

    #[test]
    fn test_absolute_url_joins_base_and_path() {
        let connection = create_test_connection();
        assert_eq!(
            connection.absolute_url("billogram/abc123"),
            "https://billogram.com/api/v2/billogram/abc123"
        );
    }

    #[test]
    fn test_collection_accessors_bind_fixed_paths_and_id_fields() {
        let connection = create_test_connection();

        assert_eq!(connection.items().url(), "item");
        assert_eq!(connection.customers().url(), "customer");
        assert_eq!(connection.billogram().url(), "billogram");
        assert_eq!(connection.reports().url(), "report");
        assert_eq!(connection.creditors().url(), "creditor");
    }

    #[test]
    fn test_singleton_accessors_start_lazy() {
        let connection = create_test_connection();

        assert!(!connection.settings().is_loaded());
        assert!(!connection.logotype().is_loaded());
    }

    #[test]
    fn test_connection_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Connection>();
    }
}
