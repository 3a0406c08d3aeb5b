//! API client core: the authenticated connection and response classifier.
//!
//! [`Connection`] builds and sends authenticated requests;
//! [`response::classify`] turns every response into a decoded payload or a
//! typed [`ApiError`](crate::ApiError). Nothing above these two layers
//! touches HTTP.

mod connection;
pub mod response;

pub use connection::Connection;
pub use response::{Envelope, Meta, Payload, JSON_CONTENT_TYPE};
