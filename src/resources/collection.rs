//! Resource collections.
//!
//! A [`ResourceCollection`] binds a URL segment and an id-field name to the
//! remote objects of one resource type, and exposes fetch, create and
//! query-builder construction for them. The fixed bindings live on
//! [`Connection`](crate::Connection) as typed accessors: `item`/`item_no`,
//! `customer`/`customer_no`, `report`/`filename`, `creditor`/`id`.

use serde_json::Value;

use crate::clients::Connection;
use crate::error::ApiError;
use crate::query::Query;
use crate::resources::RemoteObject;

/// Client-side proxy for a server-side collection of one entity type.
///
/// Cheap borrowed handle: the connection accessors construct one on demand.
///
/// # Example
///
/// ```rust,ignore
/// let customers = api.customers();
/// let customer = customers.get("12345").await?;
/// let created = customers
///     .create(&serde_json::json!({"name": "ACME", "customer_no": 12345}))
///     .await?;
/// ```
#[derive(Clone, Copy, Debug)]
pub struct ResourceCollection<'a> {
    conn: &'a Connection,
    url_name: &'static str,
    id_field: &'static str,
}

impl<'a> ResourceCollection<'a> {
    /// Creates a collection handle bound to a URL segment and id field.
    #[must_use]
    pub(crate) const fn new(
        conn: &'a Connection,
        url_name: &'static str,
        id_field: &'static str,
    ) -> Self {
        Self {
            conn,
            url_name,
            id_field,
        }
    }

    /// Returns the collection's base path.
    #[must_use]
    pub const fn url(&self) -> &'static str {
        self.url_name
    }

    /// Returns the name of the field holding a member's id.
    #[must_use]
    pub const fn id_field(&self) -> &'static str {
        self.id_field
    }

    /// Returns the path of the member with the given id.
    #[must_use]
    pub fn url_for_id(&self, id: &str) -> String {
        format!("{}/{id}", self.url_name)
    }

    /// Returns the path of a member object, read from its id field.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::UnknownField`] if the object's data lacks the
    /// collection's id field.
    pub fn url_for(&self, object: &RemoteObject<'_>) -> Result<String, ApiError> {
        object.url()
    }

    /// Fetches the member with the given id.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::ObjectNotFound`] if no such member exists;
    /// propagates any other classification error.
    pub async fn get(&self, id: &str) -> Result<RemoteObject<'a>, ApiError> {
        let envelope = self.conn.get(&self.url_for_id(id), None).await?;
        RemoteObject::from_data(self.conn, self.url_name, self.id_field, envelope.data)
    }

    /// Creates a new member with the given fields and returns its proxy,
    /// already Loaded with the server's representation.
    ///
    /// # Errors
    ///
    /// Propagates any classification error, typically
    /// [`ApiError::InvalidFieldValue`] or
    /// [`ApiError::InvalidFieldCombination`] for rejected field data.
    pub async fn create(&self, fields: &Value) -> Result<RemoteObject<'a>, ApiError> {
        let envelope = self.conn.post(self.url_name, fields).await?;
        RemoteObject::from_data(self.conn, self.url_name, self.id_field, envelope.data)
    }

    /// Creates a query for members of this collection.
    #[must_use]
    pub const fn query(&self) -> Query<'a> {
        Query::new(self.conn, self.url_name, self.id_field)
    }
}
