//! The billogram (invoice) resource and its lifecycle operations.
//!
//! A billogram is the invoice object of the service. On top of the generic
//! remote-object operations it supports a set of state-transition events
//! (send, remind, credit, collect, sell, ...), all built on the generic
//! event-dispatch primitive, plus retrieval of the asynchronously generated
//! PDF documents.

use std::collections::HashMap;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use serde_json::{json, Value};

use crate::clients::Connection;
use crate::error::ApiError;
use crate::query::Query;
use crate::resources::{RemoteObject, ResourceCollection};

/// Delivery method for sending a billogram.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DeliveryMethod {
    /// Deliver by email.
    Email,
    /// Deliver by postal letter.
    Letter,
    /// Deliver by email with a letter fallback.
    EmailAndLetter,
}

impl DeliveryMethod {
    /// Returns the wire value for this method.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Email => "Email",
            Self::Letter => "Letter",
            Self::EmailAndLetter => "Email+Letter",
        }
    }
}

/// Delivery method for reminders and resends, which do not support the
/// combined email-and-letter mode.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReminderMethod {
    /// Deliver by email.
    Email,
    /// Deliver by postal letter.
    Letter,
}

impl ReminderMethod {
    /// Returns the wire value for this method.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Email => "Email",
            Self::Letter => "Letter",
        }
    }
}

/// The collection of billogram objects, with creation shortcuts that
/// transition the new object immediately.
///
/// Obtained from [`Connection::billogram`].
#[derive(Clone, Copy, Debug)]
pub struct BillogramCollection<'a> {
    inner: ResourceCollection<'a>,
}

impl<'a> BillogramCollection<'a> {
    #[must_use]
    pub(crate) const fn new(conn: &'a Connection) -> Self {
        Self {
            inner: ResourceCollection::new(conn, "billogram", "id"),
        }
    }

    /// Returns the collection's base path.
    #[must_use]
    pub const fn url(&self) -> &'static str {
        self.inner.url()
    }

    /// Fetches the billogram with the given id.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::ObjectNotFound`] if no such billogram exists;
    /// propagates any other classification error.
    pub async fn get(&self, id: &str) -> Result<Billogram<'a>, ApiError> {
        Ok(Billogram {
            inner: self.inner.get(id).await?,
        })
    }

    /// Creates a new billogram from the given fields.
    ///
    /// # Errors
    ///
    /// Propagates any classification error for the rejected field data.
    pub async fn create(&self, fields: &Value) -> Result<Billogram<'a>, ApiError> {
        Ok(Billogram {
            inner: self.inner.create(fields).await?,
        })
    }

    /// Creates a query for billogram objects.
    #[must_use]
    pub const fn query(&self) -> Query<'a> {
        self.inner.query()
    }

    /// Creates a billogram and immediately sends it with the given method.
    ///
    /// If sending fails because of an invalid field value, the freshly
    /// created billogram is deleted before the error is re-raised, so no
    /// unsent orphan is left behind.
    ///
    /// # Errors
    ///
    /// Propagates any classification error from the create or send step.
    pub async fn create_and_send(
        &self,
        fields: &Value,
        method: DeliveryMethod,
    ) -> Result<Billogram<'a>, ApiError> {
        let mut billogram = self.create(fields).await?;
        if let Err(error) = billogram.send(method).await {
            if matches!(error, ApiError::InvalidFieldValue(_)) {
                billogram.delete().await?;
            }
            return Err(error);
        }
        Ok(billogram)
    }

    /// Creates a billogram and immediately sells it to factoring, by
    /// creating it with the `sell` event intent set. No further request is
    /// made.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::InvalidFieldValue`] if `fields` is not a JSON
    /// object; propagates any classification error from the create.
    pub async fn create_and_sell(&self, fields: &Value) -> Result<Billogram<'a>, ApiError> {
        let Value::Object(map) = fields else {
            return Err(ApiError::InvalidFieldValue(
                "billogram fields must be a JSON object".to_string(),
            ));
        };
        let mut body = map.clone();
        body.insert("_event".to_string(), Value::String("sell".to_string()));
        self.create(&Value::Object(body)).await
    }
}

/// A billogram object on the service.
///
/// Wraps a [`RemoteObject`] and adds the invoice lifecycle operations.
/// Every state-transition method replaces the cached data with the
/// server's updated representation of the object.
///
/// # Example
///
/// ```rust,ignore
/// use billogram_api::DeliveryMethod;
///
/// let mut billogram = api.billogram().get("aBcD1234").await?;
/// billogram.send(DeliveryMethod::Email).await?;
/// let state = billogram.field("state").await?;
/// ```
#[derive(Debug)]
pub struct Billogram<'a> {
    inner: RemoteObject<'a>,
}

impl<'a> From<RemoteObject<'a>> for Billogram<'a> {
    /// Wraps a remote object from the billogram collection, e.g. one
    /// returned by a query page.
    fn from(inner: RemoteObject<'a>) -> Self {
        Self { inner }
    }
}

impl<'a> Billogram<'a> {
    /// Returns the underlying remote object.
    #[must_use]
    pub const fn object(&self) -> &RemoteObject<'a> {
        &self.inner
    }

    /// Returns the billogram's API path.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::UnknownField`] if the data lacks the id field.
    pub fn url(&self) -> Result<String, ApiError> {
        self.inner.url()
    }

    /// Reads one field of the billogram.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::UnknownField`] for an absent field name.
    pub async fn field(&mut self, name: &str) -> Result<Value, ApiError> {
        self.inner.field(name).await
    }

    /// Returns the billogram's field map.
    ///
    /// # Errors
    ///
    /// Propagates any [`ApiError`] from a fetch.
    pub async fn data(&mut self) -> Result<&serde_json::Map<String, Value>, ApiError> {
        self.inner.data().await
    }

    /// Re-fetches the billogram from the server.
    ///
    /// # Errors
    ///
    /// Propagates any [`ApiError`] from the request.
    pub async fn refresh(&mut self) -> Result<(), ApiError> {
        self.inner.refresh().await
    }

    /// Updates the billogram with `fields` via PUT.
    ///
    /// # Errors
    ///
    /// Propagates any [`ApiError`] from the request.
    pub async fn update(&mut self, fields: &Value) -> Result<(), ApiError> {
        self.inner.update(fields).await
    }

    /// Deletes the billogram, consuming the proxy.
    ///
    /// # Errors
    ///
    /// Propagates any [`ApiError`] from the request.
    pub async fn delete(self) -> Result<(), ApiError> {
        self.inner.delete().await
    }

    /// Dispatches a raw event on the billogram.
    ///
    /// All the named lifecycle methods below are wrappers over this.
    ///
    /// # Errors
    ///
    /// Propagates any [`ApiError`] from the request.
    pub async fn perform_event(
        &mut self,
        event: &str,
        event_data: Option<&Value>,
    ) -> Result<(), ApiError> {
        self.inner.perform_event(event, event_data).await
    }

    /// Sends an unsent billogram using the method of choice.
    ///
    /// # Errors
    ///
    /// Propagates any [`ApiError`] from the request, typically
    /// [`ApiError::InvalidObjectState`] if the billogram was already sent.
    pub async fn send(&mut self, method: DeliveryMethod) -> Result<(), ApiError> {
        self.perform_event("send", Some(&json!({"method": method.as_str()})))
            .await
    }

    /// Resends the billogram, optionally forcing a delivery method.
    ///
    /// # Errors
    ///
    /// Propagates any [`ApiError`] from the request.
    pub async fn resend(&mut self, method: Option<ReminderMethod>) -> Result<(), ApiError> {
        match method {
            Some(method) => {
                self.perform_event("resend", Some(&json!({"method": method.as_str()})))
                    .await
            }
            None => self.perform_event("resend", None).await,
        }
    }

    /// Manually sends a reminder for an overdue billogram.
    ///
    /// # Errors
    ///
    /// Propagates any [`ApiError`] from the request.
    pub async fn send_reminder(&mut self, method: Option<ReminderMethod>) -> Result<(), ApiError> {
        match method {
            Some(method) => {
                self.perform_event("remind", Some(&json!({"method": method.as_str()})))
                    .await
            }
            None => self.perform_event("remind", None).await,
        }
    }

    /// Stores a manual payment for the billogram.
    ///
    /// # Errors
    ///
    /// Propagates any [`ApiError`] from the request.
    pub async fn create_payment(&mut self, amount: f64) -> Result<(), ApiError> {
        self.perform_event("payment", Some(&json!({"amount": amount})))
            .await
    }

    /// Creates a credit invoice for the specific amount.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::InvalidFieldValue`] for a non-positive or
    /// non-finite amount; propagates any [`ApiError`] from the request.
    pub async fn credit_amount(&mut self, amount: f64) -> Result<(), ApiError> {
        if !amount.is_finite() || amount <= 0.0 {
            return Err(ApiError::InvalidFieldValue(
                "'amount' must be a positive numeric value".to_string(),
            ));
        }
        self.perform_event("credit", Some(&json!({"mode": "amount", "amount": amount})))
            .await
    }

    /// Creates a credit invoice for the full total amount.
    ///
    /// # Errors
    ///
    /// Propagates any [`ApiError`] from the request.
    pub async fn credit_full(&mut self) -> Result<(), ApiError> {
        self.perform_event("credit", Some(&json!({"mode": "full"})))
            .await
    }

    /// Creates a credit invoice for the remaining amount.
    ///
    /// # Errors
    ///
    /// Propagates any [`ApiError`] from the request.
    pub async fn credit_remaining(&mut self) -> Result<(), ApiError> {
        self.perform_event("credit", Some(&json!({"mode": "remaining"})))
            .await
    }

    /// Writes a comment/message on the billogram.
    ///
    /// # Errors
    ///
    /// Propagates any [`ApiError`] from the request.
    pub async fn send_message(&mut self, message: &str) -> Result<(), ApiError> {
        self.perform_event("message", Some(&json!({"message": message})))
            .await
    }

    /// Sends the billogram for collection. Requires a collectors
    /// agreement.
    ///
    /// # Errors
    ///
    /// Propagates any [`ApiError`] from the request.
    pub async fn send_to_collector(&mut self) -> Result<(), ApiError> {
        self.perform_event("collect", None).await
    }

    /// Sells the billogram to factoring. Requires a factoring agreement.
    ///
    /// # Errors
    ///
    /// Propagates any [`ApiError`] from the request.
    pub async fn send_to_factoring(&mut self) -> Result<(), ApiError> {
        self.perform_event("sell", None).await
    }

    /// Attaches a PDF document to the billogram.
    ///
    /// The content is base64-encoded into the event payload.
    ///
    /// # Errors
    ///
    /// Propagates any [`ApiError`] from the request.
    pub async fn attach_pdf(&mut self, filename: &str, content: &[u8]) -> Result<(), ApiError> {
        self.perform_event(
            "attach",
            Some(&json!({
                "filename": filename,
                "content": BASE64.encode(content),
            })),
        )
        .await
    }

    /// Returns the PDF document for the billogram, or for one specific
    /// letter or invoice of it.
    ///
    /// The server generates PDFs asynchronously; until the document is
    /// ready this fails with [`ApiError::ObjectNotFound`] carrying the
    /// message "Object not available yet", and callers are expected to
    /// poll with their own backoff on that specific error.
    ///
    /// # Errors
    ///
    /// Propagates any [`ApiError`] from the request.
    pub async fn invoice_pdf(
        &self,
        letter_id: Option<&str>,
        invoice_no: Option<&str>,
    ) -> Result<Vec<u8>, ApiError> {
        let mut params = HashMap::new();
        if let Some(letter_id) = letter_id {
            params.insert("letter_id".to_string(), letter_id.to_string());
        }
        if let Some(invoice_no) = invoice_no {
            params.insert("invoice_no".to_string(), invoice_no.to_string());
        }
        let query = if params.is_empty() { None } else { Some(&params) };
        let path = format!("{}.pdf", self.inner.url()?);
        self.inner.fetch_document(&path, query).await
    }

    /// Returns the PDF content of the billogram's attachment.
    ///
    /// Subject to the same not-available-yet polling contract as
    /// [`invoice_pdf`](Self::invoice_pdf).
    ///
    /// # Errors
    ///
    /// Propagates any [`ApiError`] from the request.
    pub async fn attachment_pdf(&self) -> Result<Vec<u8>, ApiError> {
        let path = format!("{}/attachment.pdf", self.inner.url()?);
        self.inner.fetch_document(&path, None).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{AuthKey, AuthUser};

    fn create_test_connection() -> Connection {
        Connection::from_credentials(
            AuthUser::new("test-user").unwrap(),
            AuthKey::new("test-key").unwrap(),
        )
    }

    #[test]
    fn test_delivery_method_wire_values() {
        assert_eq!(DeliveryMethod::Email.as_str(), "Email");
        assert_eq!(DeliveryMethod::Letter.as_str(), "Letter");
        assert_eq!(DeliveryMethod::EmailAndLetter.as_str(), "Email+Letter");
    }

    #[test]
    fn test_reminder_method_wire_values() {
        assert_eq!(ReminderMethod::Email.as_str(), "Email");
        assert_eq!(ReminderMethod::Letter.as_str(), "Letter");
    }

    #[test]
    fn test_collection_is_bound_to_billogram_path() {
        let connection = create_test_connection();
        let billogram = connection.billogram();

        assert_eq!(billogram.url(), "billogram");
        assert_eq!(billogram.query().url(), "billogram");
    }

    #[tokio::test]
    async fn test_credit_amount_rejects_non_positive_amounts() {
        let connection = create_test_connection();
        let object = RemoteObject::from_data(
            &connection,
            "billogram",
            "id",
            serde_json::json!({"id": "abc"}),
        )
        .unwrap();
        let mut billogram = Billogram::from(object);

        for amount in [0.0, -10.0, f64::NAN, f64::INFINITY] {
            let result = billogram.credit_amount(amount).await;
            assert!(
                matches!(result, Err(ApiError::InvalidFieldValue(_))),
                "amount {amount} accepted"
            );
        }
    }
}
