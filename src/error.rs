//! Error types for the Billogram API client.
//!
//! The API error taxonomy mirrors the error classes of the Billogram v2
//! service. Every variant carries the message string reported by the server
//! (or a fixed client-side message for conditions detected locally).
//!
//! All errors are produced by the response classifier in
//! [`crate::clients::response`]; the layers above it (collections, remote
//! objects, queries) propagate them unchanged. The single exception is the
//! compensating delete performed by
//! [`BillogramCollection::create_and_send`](crate::resources::BillogramCollection::create_and_send),
//! which deletes the freshly created object before re-raising an
//! [`ApiError::InvalidFieldValue`] from the send step.

use thiserror::Error;

/// Error type for all Billogram API operations.
///
/// One variant per error class of the Billogram service, plus
/// [`ApiError::Network`] for transport-level failures surfaced by reqwest.
///
/// # Example
///
/// ```rust,ignore
/// use billogram_api::ApiError;
///
/// match billogram.invoice_pdf(None, None).await {
///     Ok(bytes) => std::fs::write("invoice.pdf", bytes)?,
///     Err(ApiError::ObjectNotFound(_)) => {
///         // PDF not generated yet, poll again later
///     }
///     Err(e) => return Err(e.into()),
/// }
/// ```
#[derive(Debug, Error)]
pub enum ApiError {
    /// Server-side or protocol anomaly: 5xx response, missing content type,
    /// malformed response envelope, or an undecodable JSON body.
    #[error("{0}")]
    ServiceMalfunctioning(String),

    /// Bad credentials: HTTP 401, or a 403 with payload status `INVALID_AUTH`.
    #[error("{0}")]
    InvalidAuthentication(String),

    /// The authenticated account may not perform the requested operation
    /// (403 with payload status `PERMISSION_DENIED`).
    #[error("{0}")]
    NotAuthorized(String),

    /// Permission denied for a reason other than `PERMISSION_DENIED` (403).
    #[error("{0}")]
    PermissionDenied(String),

    /// Malformed request shape: missing or invalid query parameter, wrong
    /// HTTP method, or missing authentication data.
    #[error("{0}")]
    RequestForm(String),

    /// A field was given an invalid value.
    #[error("{0}")]
    InvalidFieldValue(String),

    /// Two or more fields were given values that conflict with each other.
    #[error("{0}")]
    InvalidFieldCombination(String),

    /// An attempt was made to write a read-only field.
    #[error("{0}")]
    ReadOnlyField(String),

    /// A field name not recognized by the server, or a local field read for
    /// a name not present in a remote object's data.
    #[error("{0}")]
    UnknownField(String),

    /// The remote object is in a state that does not allow the operation.
    #[error("{0}")]
    InvalidObjectState(String),

    /// Generic request data error, the fallback for unmapped payload
    /// statuses.
    #[error("{0}")]
    RequestData(String),

    /// The object does not exist (404), or is not available yet — the
    /// sentinel used for asynchronously generated documents such as PDFs.
    #[error("{0}")]
    ObjectNotFound(String),

    /// Network or connection error from the underlying HTTP transport.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
}

impl ApiError {
    /// Maps an error-class payload status to the corresponding variant.
    ///
    /// This is the table applied by the response classifier after the
    /// HTTP-status-specific checks have passed; `message` is the message
    /// string from the response payload.
    #[must_use]
    pub fn from_payload_status(status: &str, message: String) -> Self {
        match status {
            "MISSING_QUERY_PARAMETER" | "INVALID_QUERY_PARAMETER" => Self::RequestForm(message),
            "INVALID_PARAMETER" => Self::InvalidFieldValue(message),
            "INVALID_PARAMETER_COMBINATION" => Self::InvalidFieldCombination(message),
            "READ_ONLY_PARAMETER" => Self::ReadOnlyField(message),
            "UNKNOWN_PARAMETER" => Self::UnknownField(message),
            "INVALID_OBJECT_STATE" => Self::InvalidObjectState(message),
            _ => Self::RequestData(message),
        }
    }
}

/// Configuration validation error.
///
/// Returned when constructing a [`Config`](crate::Config) or one of its
/// validated newtype fields from invalid input.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// A required builder field was not set.
    #[error("Missing required configuration field: {field}")]
    MissingRequiredField {
        /// The name of the missing field.
        field: &'static str,
    },

    /// The API user identifier is empty.
    #[error("API user must not be empty")]
    EmptyAuthUser,

    /// The API secret key is empty.
    #[error("API key must not be empty")]
    EmptyAuthKey,
}

// Verify ApiError is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<ApiError>();
};
