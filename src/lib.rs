//! # Billogram API Client Library for Rust
//!
//! A client library for the [Billogram v2 API](https://billogram.com/api),
//! the invoicing service's HTTP interface. It covers the invoice
//! (billogram), customer, item, report and creditor resources, the account
//! settings and logotype singletons, filtered and paginated queries, and
//! the invoice lifecycle events (send, remind, credit, collect, sell).
//!
//! ## Features
//!
//! - **Connection handling**: Basic authentication, request building and a
//!   single response classifier that maps the API's layered error model
//!   onto one error enum
//! - **Resource collections**: fetch, create and query objects per resource
//! - **Remote objects**: lazy proxies that fetch on first field access and
//!   cache the server representation
//! - **Queries**: filtering, ordering and pagination with total-count
//!   caching
//! - **Billogram lifecycle**: typed delivery methods, event dispatch and
//!   PDF document retrieval
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use billogram_api::{AuthKey, AuthUser, Connection, DeliveryMethod};
//! use serde_json::json;
//!
//! # async fn example() -> Result<(), billogram_api::ApiError> {
//! let api = Connection::from_credentials(
//!     AuthUser::new("1234-abcd").unwrap(),
//!     AuthKey::new("my-api-key").unwrap(),
//! );
//!
//! // Fetch a customer and read a field.
//! let mut customer = api.customers().get("12345").await?;
//! let name = customer.field("name").await?;
//!
//! // Create an invoice and send it by email.
//! let billogram = api
//!     .billogram()
//!     .create_and_send(
//!         &json!({
//!             "invoice_date": "2026-09-01",
//!             "customer": {"customer_no": 12345},
//!             "items": [{"item_no": "10"}],
//!         }),
//!         DeliveryMethod::Email,
//!     )
//!     .await?;
//!
//! // Page through overdue invoices.
//! let mut query = api.billogram().query();
//! query.filter_special("state", "Overdue").page_size(50);
//! for invoice in query.get_page(1).await? {
//!     println!("{invoice}");
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Error Handling
//!
//! Every operation returns `Result<_, ApiError>`. The [`ApiError`] variants
//! mirror the service's error taxonomy: authentication and permission
//! problems, malformed requests, field-level validation failures, invalid
//! object states, missing objects, and server or transport malfunctions.
//! PDF documents are generated asynchronously on the server; until ready,
//! fetching one fails with [`ApiError::ObjectNotFound`] carrying the
//! message "Object not available yet", which callers poll on.

pub mod clients;
pub mod config;
pub mod error;
pub mod query;
pub mod resources;

pub use clients::{Connection, Envelope, Meta, Payload};
pub use config::{
    AuthKey, AuthUser, Config, ConfigBuilder, DEFAULT_API_BASE, DEFAULT_TIMEOUT,
    DEFAULT_USER_AGENT,
};
pub use error::{ApiError, ConfigError};
pub use query::{OrderDirection, Query, DEFAULT_PAGE_SIZE};
pub use resources::{
    Billogram, BillogramCollection, DeliveryMethod, ReminderMethod, RemoteObject,
    ResourceCollection,
};
