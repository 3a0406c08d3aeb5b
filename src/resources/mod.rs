//! Resource collections and remote-object proxies.
//!
//! Every resource on the API is reached through a collection handle
//! obtained from a [`Connection`](crate::Connection) accessor. Collections
//! hand out [`RemoteObject`] proxies, which lazily fetch and cache the
//! server-side representation. The billogram resource has specialized
//! [`BillogramCollection`] and [`Billogram`] types with creation shortcuts
//! and invoice lifecycle events.

mod billogram;
mod collection;
mod object;

pub use billogram::{Billogram, BillogramCollection, DeliveryMethod, ReminderMethod};
pub use collection::ResourceCollection;
pub use object::RemoteObject;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;

use crate::error::ApiError;

/// Decodes base64 document content from a response payload.
pub(crate) fn decode_base64(content: &str) -> Result<Vec<u8>, ApiError> {
    BASE64.decode(content).map_err(|err| {
        ApiError::ServiceMalfunctioning(format!("Response content is not valid base64: {err}"))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_base64_round_trips_document_bytes() {
        let decoded = decode_base64("JVBERi0xLjQ=").unwrap();
        assert_eq!(decoded, b"%PDF-1.4");
    }

    #[test]
    fn test_decode_base64_rejects_invalid_content() {
        let result = decode_base64("not base64!");
        assert!(matches!(result, Err(ApiError::ServiceMalfunctioning(_))));
    }
}
