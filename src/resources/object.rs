//! Remote object proxies.
//!
//! A [`RemoteObject`] is the client-side proxy for one entity living on the
//! Billogram service. It has two states: **Lazy** (no cached data, fetched
//! transparently on first field access) and **Loaded** (cached field map
//! present). Singletons such as `settings` and `logotype` start Lazy;
//! objects returned from get/create/query start Loaded, since the server
//! already returned their data.
//!
//! The cached data should be treated as read-only; the only way to change
//! the remote object is [`RemoteObject::update`] or an event dispatched
//! through [`RemoteObject::perform_event`].

use std::collections::HashMap;
use std::fmt;

use serde_json::{Map, Value};

use crate::clients::response::JSON_CONTENT_TYPE;
use crate::clients::{Connection, Payload};
use crate::error::ApiError;

/// How a remote object's URL is derived.
#[derive(Clone, Debug)]
enum Anchor {
    /// A fixed URL for singleton resources.
    Singleton(&'static str),
    /// A member of a collection; the URL is `url_name/<id field value>`,
    /// read from the current data.
    Member {
        url_name: &'static str,
        id_field: &'static str,
    },
}

/// Renders a field value as a URL path segment.
fn id_segment(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Client-side proxy for one remote entity.
///
/// Field reads other than [`cached_data`](Self::cached_data) trigger a
/// fetch while the object is Lazy. Reading a field name not present in the
/// fetched data fails with [`ApiError::UnknownField`].
///
/// # Example
///
/// ```rust,ignore
/// let mut settings = api.settings();
/// let name = settings.field("name").await?;   // first access fetches
/// let city = settings.field("city").await?;   // served from cache
/// settings.refresh().await?;                  // explicit re-fetch
/// ```
#[derive(Debug)]
pub struct RemoteObject<'a> {
    conn: &'a Connection,
    anchor: Anchor,
    data: Option<Map<String, Value>>,
}

impl<'a> RemoteObject<'a> {
    /// Creates a Lazy proxy for a singleton resource at a fixed URL.
    #[must_use]
    pub(crate) const fn singleton(conn: &'a Connection, url_name: &'static str) -> Self {
        Self {
            conn,
            anchor: Anchor::Singleton(url_name),
            data: None,
        }
    }

    /// Creates a Loaded proxy from data already returned by the server.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::ServiceMalfunctioning`] if the payload data is
    /// not a JSON object.
    pub(crate) fn from_data(
        conn: &'a Connection,
        url_name: &'static str,
        id_field: &'static str,
        data: Value,
    ) -> Result<Self, ApiError> {
        let Value::Object(map) = data else {
            return Err(ApiError::ServiceMalfunctioning(
                "Response data is not an object".to_string(),
            ));
        };
        Ok(Self {
            conn,
            anchor: Anchor::Member { url_name, id_field },
            data: Some(map),
        })
    }

    /// Returns the API path where this object lives.
    ///
    /// For collection members the path is derived from the id field of the
    /// current data.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::UnknownField`] if a member object's data lacks
    /// its id field.
    pub fn url(&self) -> Result<String, ApiError> {
        match &self.anchor {
            Anchor::Singleton(url_name) => Ok((*url_name).to_string()),
            Anchor::Member { url_name, id_field } => {
                let id = self
                    .data
                    .as_ref()
                    .and_then(|data| data.get(*id_field))
                    .ok_or_else(|| {
                        ApiError::UnknownField(format!("Invalid parameter: {id_field}"))
                    })?;
                Ok(format!("{url_name}/{}", id_segment(id)))
            }
        }
    }

    /// `true` once the object holds cached data.
    #[must_use]
    pub const fn is_loaded(&self) -> bool {
        self.data.is_some()
    }

    /// The raw cached field map, without triggering a fetch.
    #[must_use]
    pub const fn cached_data(&self) -> Option<&Map<String, Value>> {
        self.data.as_ref()
    }

    /// Replaces the cached data with a response payload.
    fn replace_data(&mut self, data: Value) -> Result<(), ApiError> {
        let Value::Object(map) = data else {
            return Err(ApiError::ServiceMalfunctioning(
                "Response data is not an object".to_string(),
            ));
        };
        self.data = Some(map);
        Ok(())
    }

    /// Fetches the object if it is still Lazy.
    ///
    /// # Errors
    ///
    /// Propagates any [`ApiError`] from the fetch.
    pub async fn ensure_loaded(&mut self) -> Result<(), ApiError> {
        if self.data.is_none() {
            self.refresh().await?;
        }
        Ok(())
    }

    /// Returns the object's field map, fetching it first if Lazy.
    ///
    /// # Errors
    ///
    /// Propagates any [`ApiError`] from the fetch.
    pub async fn data(&mut self) -> Result<&Map<String, Value>, ApiError> {
        self.ensure_loaded().await?;
        match &self.data {
            Some(map) => Ok(map),
            None => Err(ApiError::ServiceMalfunctioning(
                "Response data is not an object".to_string(),
            )),
        }
    }

    /// Reads one field of the object, fetching the data first if Lazy.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::UnknownField`] if the field is not present in
    /// the object's data; propagates any [`ApiError`] from the fetch.
    pub async fn field(&mut self, name: &str) -> Result<Value, ApiError> {
        let data = self.data().await?;
        data.get(name)
            .cloned()
            .ok_or_else(|| ApiError::UnknownField(format!("Invalid parameter: {name}")))
    }

    /// Makes a GET request and replaces the local data with up-to-date
    /// info. Moves a Lazy object to Loaded.
    ///
    /// # Errors
    ///
    /// Propagates any [`ApiError`] from the request.
    pub async fn refresh(&mut self) -> Result<(), ApiError> {
        let url = self.url()?;
        let envelope = self.conn.get(&url, None).await?;
        self.replace_data(envelope.data)
    }

    /// Updates the remote object with `fields` via PUT and replaces the
    /// cached data with the response.
    ///
    /// # Errors
    ///
    /// Propagates any [`ApiError`] from the request.
    pub async fn update(&mut self, fields: &Value) -> Result<(), ApiError> {
        let url = self.url()?;
        let envelope = self.conn.put(&url, fields).await?;
        self.replace_data(envelope.data)
    }

    /// Deletes the remote object.
    ///
    /// Consumes the proxy: after a delete the local object has no defined
    /// contract, so no further use is possible.
    ///
    /// # Errors
    ///
    /// Propagates any [`ApiError`] from the request.
    pub async fn delete(self) -> Result<(), ApiError> {
        let url = self.url()?;
        self.conn.delete(&url).await?;
        Ok(())
    }

    /// Dispatches an event by POSTing to `url/command/<event>`, replacing
    /// the cached data with the event response payload.
    ///
    /// This is the primitive underlying all state-transition operations on
    /// billogram objects (send, remind, credit, and so on).
    ///
    /// # Errors
    ///
    /// Propagates any [`ApiError`] from the request.
    pub async fn perform_event(
        &mut self,
        event: &str,
        event_data: Option<&Value>,
    ) -> Result<(), ApiError> {
        let url = format!("{}/command/{event}", self.url()?);
        let body = event_data.cloned().unwrap_or(Value::Null);
        let envelope = self.conn.post(&url, &body).await?;
        self.replace_data(envelope.data)
    }

    /// Fetches a base64-encoded document from a sub-path of this object
    /// and returns the decoded bytes.
    ///
    /// Fails with [`ApiError::ObjectNotFound`] ("Object not available yet")
    /// while the server is still generating the document; callers poll on
    /// that specific error.
    pub(crate) async fn fetch_document(
        &self,
        path: &str,
        query: Option<&HashMap<String, String>>,
    ) -> Result<Vec<u8>, ApiError> {
        let payload = self
            .conn
            .get_with_content_type(path, query, JSON_CONTENT_TYPE)
            .await?;
        let Payload::Envelope(envelope) = payload else {
            return Err(ApiError::ServiceMalfunctioning(
                "Billogram API returned unexpected content type".to_string(),
            ));
        };
        let content = envelope
            .data
            .get("content")
            .and_then(Value::as_str)
            .ok_or_else(|| {
                ApiError::ServiceMalfunctioning("Response data missing content field".to_string())
            })?;
        crate::resources::decode_base64(content)
    }
}

impl fmt::Display for RemoteObject<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let url = self.url().unwrap_or_else(|_| "?".to_string());
        let lazy = if self.is_loaded() { "" } else { " (lazy)" };
        write!(f, "<Billogram object '{url}'{lazy}>")
    }
}
