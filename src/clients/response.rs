//! Response classification for the Billogram API.
//!
//! Every HTTP response passes through [`classify`], which turns the raw
//! status code, content type and body into either a decoded payload or a
//! typed [`ApiError`]. The checks run in a fixed precedence order and later
//! checks assume the earlier ones passed; in particular the envelope decode
//! is the single decode point reused by all payload-status checks.

use serde::Deserialize;
use serde_json::Value;

use crate::error::ApiError;

/// The JSON media type expected for API envelopes.
pub const JSON_CONTENT_TYPE: &str = "application/json";

/// A successfully decoded JSON response envelope.
///
/// Successful responses have the shape
/// `{"status": "OK", "data": <payload>, "meta": {"total_count": N}}`,
/// where `meta` is only present on list responses.
#[derive(Clone, Debug)]
pub struct Envelope {
    /// The application-level payload status; always `"OK"` for envelopes
    /// returned by [`classify`].
    pub status: String,
    /// The response payload.
    pub data: Value,
    /// List metadata, when present.
    pub meta: Option<Meta>,
}

/// List metadata carried in the `meta` section of list responses.
#[derive(Clone, Debug, Deserialize)]
pub struct Meta {
    /// Total number of objects matched by the query, across all pages.
    pub total_count: Option<u64>,
}

/// A classified response payload.
#[derive(Clone, Debug)]
pub enum Payload {
    /// A decoded JSON envelope with payload status `OK`.
    Envelope(Envelope),
    /// The raw body, returned when a non-JSON content type was expected.
    Raw(Vec<u8>),
}

/// Returns the media type of a Content-Type header value, ignoring
/// parameters such as `charset`.
fn media_type(content_type: &str) -> &str {
    content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
}

/// Decodes a JSON body, or `None` if it is not valid JSON.
fn decode_json(body: &[u8]) -> Option<Value> {
    serde_json::from_slice(body).ok()
}

/// Extracts the `data.message` string from a decoded envelope, used when
/// building error messages from error-class payloads.
fn payload_message(envelope: &Value) -> String {
    envelope
        .get("data")
        .and_then(|data| data.get("message"))
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

const INVALID_AUTH_MESSAGE: &str = "The user/key combination is wrong, \
     check the credentials used and possibly generate a new set";

/// Classifies an HTTP response into a payload or a typed error.
///
/// `expected_content_type` overrides the expected content type for HTTP 200
/// responses only; for any other status the envelope is always expected to
/// be JSON. Passing `None` expects JSON.
///
/// The checks are applied in this order:
///
/// 1. Missing content type → [`ApiError::ServiceMalfunctioning`]
/// 2. 5xx → [`ApiError::ServiceMalfunctioning`], carrying the server's
///    status and message when the body is a decodable JSON envelope
/// 3. 401 → [`ApiError::InvalidAuthentication`]
/// 4. Unexpected JSON content type → [`ApiError::ObjectNotFound`] for the
///    `NOT_AVAILABLE_YET` sentinel, otherwise
///    [`ApiError::ServiceMalfunctioning`]
/// 5. Envelope decode (JSON expected) or raw passthrough (otherwise)
/// 6. 403 → error by payload status (`PERMISSION_DENIED`, `INVALID_AUTH`,
///    `MISSING_AUTH`, fallback)
/// 7. 404 → [`ApiError::ObjectNotFound`]
/// 8. 405 → [`ApiError::RequestForm`]
/// 9. Payload status `OK` → success
/// 10. Any other payload status → the taxonomy table in
///     [`ApiError::from_payload_status`]
///
/// # Errors
///
/// Returns the [`ApiError`] variant selected by the rules above.
pub fn classify(
    status_code: u16,
    content_type: Option<&str>,
    body: &[u8],
    expected_content_type: Option<&str>,
) -> Result<Payload, ApiError> {
    // The expected content type override only applies to 200 responses;
    // error responses always carry a JSON envelope.
    let expected = if status_code == 200 {
        expected_content_type.unwrap_or(JSON_CONTENT_TYPE)
    } else {
        JSON_CONTENT_TYPE
    };

    let Some(content_type) = content_type.map(media_type) else {
        return Err(ApiError::ServiceMalfunctioning(
            "Billogram API did not return a content type".to_string(),
        ));
    };

    if (500..600).contains(&status_code) {
        if content_type == expected && expected == JSON_CONTENT_TYPE {
            if let Some(envelope) = decode_json(body) {
                let status = envelope
                    .get("status")
                    .and_then(Value::as_str)
                    .unwrap_or_default();
                return Err(ApiError::ServiceMalfunctioning(format!(
                    "Billogram API reported a server error: {status} - {}",
                    payload_message(&envelope)
                )));
            }
        }
        return Err(ApiError::ServiceMalfunctioning(
            "Billogram API reported a server error".to_string(),
        ));
    }

    if status_code == 401 {
        return Err(ApiError::InvalidAuthentication(
            INVALID_AUTH_MESSAGE.to_string(),
        ));
    }

    if content_type != expected && content_type == JSON_CONTENT_TYPE {
        let status = decode_json(body)
            .as_ref()
            .and_then(|envelope| envelope.get("status"))
            .and_then(Value::as_str)
            .map(ToString::to_string);
        if status.as_deref() == Some("NOT_AVAILABLE_YET") {
            return Err(ApiError::ObjectNotFound(
                "Object not available yet".to_string(),
            ));
        }
        return Err(ApiError::ServiceMalfunctioning(
            "Billogram API returned unexpected content type".to_string(),
        ));
    }

    if expected != JSON_CONTENT_TYPE {
        return Ok(Payload::Raw(body.to_vec()));
    }

    let Some(envelope) = decode_json(body) else {
        return Err(ApiError::ServiceMalfunctioning(
            "Response data missing status field".to_string(),
        ));
    };
    let status = match envelope.get("status").and_then(Value::as_str) {
        Some(status) if !status.is_empty() => status.to_string(),
        _ => {
            return Err(ApiError::ServiceMalfunctioning(
                "Response data missing status field".to_string(),
            ))
        }
    };
    if envelope.get("data").is_none() {
        return Err(ApiError::ServiceMalfunctioning(
            "Response data missing data field".to_string(),
        ));
    }

    if status_code == 403 {
        return Err(match status.as_str() {
            "PERMISSION_DENIED" => ApiError::NotAuthorized(
                "Not allowed to perform the requested operation".to_string(),
            ),
            "INVALID_AUTH" => ApiError::InvalidAuthentication(INVALID_AUTH_MESSAGE.to_string()),
            "MISSING_AUTH" => {
                ApiError::RequestForm("No authentication data was given".to_string())
            }
            _ => ApiError::PermissionDenied(format!("Permission denied, status={status}")),
        });
    }

    if status_code == 404 {
        return Err(if status == "NOT_AVAILABLE_YET" {
            ApiError::ObjectNotFound("Object not available yet".to_string())
        } else {
            ApiError::ObjectNotFound("Object not found".to_string())
        });
    }

    if status_code == 405 {
        return Err(ApiError::RequestForm("Invalid HTTP method".to_string()));
    }

    if status == "OK" {
        let meta = envelope
            .get("meta")
            .cloned()
            .and_then(|meta| serde_json::from_value(meta).ok());
        let data = envelope
            .get("data")
            .cloned()
            .unwrap_or(Value::Null);
        return Ok(Payload::Envelope(Envelope {
            status,
            data,
            meta,
        }));
    }

    Err(ApiError::from_payload_status(
        &status,
        payload_message(&envelope),
    ))
}
