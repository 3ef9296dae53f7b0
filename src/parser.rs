//! JSON parser for the upstream results payload.

use serde_json::Value;

use crate::error::PortalError;
use crate::results::types::RawPayload;

/// Decodes a raw results payload from JSON bytes.
///
/// # Errors
///
/// Returns [`PortalError::MalformedPayload`] if the bytes are not JSON or
/// lack a `studentResult` array. Bad values inside individual records are
/// tolerated and left for the normalizer to default or drop.
pub fn parse_payload(bytes: &[u8]) -> Result<RawPayload, PortalError> {
    let value: Value =
        serde_json::from_slice(bytes).map_err(|e| PortalError::MalformedPayload(e.to_string()))?;
    payload_from_value(value)
}

/// Same as [`parse_payload`] for an already-decoded JSON value.
pub fn payload_from_value(value: Value) -> Result<RawPayload, PortalError> {
    match value.get("studentResult") {
        Some(Value::Array(_)) => {}
        Some(_) => {
            return Err(PortalError::MalformedPayload(
                "`studentResult` is not an array".to_string(),
            ));
        }
        None => {
            return Err(PortalError::MalformedPayload(
                "missing `studentResult`".to_string(),
            ));
        }
    }

    serde_json::from_value(value).map_err(|e| PortalError::MalformedPayload(e.to_string()))
}
