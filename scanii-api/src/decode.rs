//! Response decoding: status checks, header provenance and JSON bodies.
//!
//! Bodies and headers are decoded independently and only merged once both
//! succeeded, so no half-built entity escapes on an error path.

use log::{debug, warn};
use reqwest::header::{HeaderMap, LOCATION};
use reqwest::{Response, StatusCode};
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use std::collections::HashMap;

use crate::ScaniiError;
use crate::models::{AuthToken, PendingResult, ResponseMeta, ScanResult};

/// Header carrying the per-request id.
pub const REQUEST_ID_HEADER: &str = "x-scanii-request-id";
/// Header carrying the id of the serving host.
pub const HOST_ID_HEADER: &str = "x-scanii-host-id";

/// Fail with [`ScaniiError::Service`] unless the response has `expected` status.
///
/// # Errors
///
/// Returns the status and raw body of any other response, or
/// [`ScaniiError::Http`] if that body cannot be read.
pub(crate) async fn expect_status(
    response: Response,
    expected: StatusCode,
    operation: &str,
) -> Result<Response, ScaniiError> {
    let status = response.status();
    debug!("{operation} -> HTTP {status}");

    if status == expected {
        return Ok(response);
    }

    let body = response.text().await?;
    warn!("{operation} failed with HTTP {status} (expected {expected})");
    Err(ScaniiError::Service {
        status: status.as_u16(),
        body,
    })
}

/// Read the provenance headers of a response.
///
/// Missing headers simply leave the field empty.
#[must_use]
pub fn response_meta(status: u16, headers: &HeaderMap) -> ResponseMeta {
    let header = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    };

    ResponseMeta {
        status_code: status,
        request_id: header(REQUEST_ID_HEADER),
        host_id: header(HOST_ID_HEADER),
        resource_location: header(LOCATION.as_str()),
    }
}

/// Consume a successful response and decode its body and headers.
pub(crate) async fn read_entity(response: Response) -> Result<RawEntity, ScaniiError> {
    let meta = response_meta(response.status().as_u16(), response.headers());
    let body = response.text().await?;
    debug!("response body: {body}");
    RawEntity::parse(&body, meta)
}

/// JSON view of every Scanii response body.
///
/// Only `id` is required. Content fields are only meaningful when `findings`
/// is present, which is how the service marks a finished scan.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawEntity {
    #[serde(default, deserialize_with = "stringish")]
    id: Option<String>,
    #[serde(default)]
    findings: Option<Vec<String>>,
    #[serde(default, deserialize_with = "stringish")]
    content_type: Option<String>,
    #[serde(default)]
    content_length: Option<ContentLength>,
    #[serde(default, deserialize_with = "stringish")]
    checksum: Option<String>,
    #[serde(default)]
    metadata: Option<HashMap<String, Value>>,
    #[serde(default, deserialize_with = "stringish")]
    creation_date: Option<String>,
    #[serde(default, deserialize_with = "stringish")]
    expiration_date: Option<String>,
    #[serde(default, deserialize_with = "stringish")]
    message: Option<String>,
    #[serde(skip)]
    meta: ResponseMeta,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum ContentLength {
    Number(u64),
    Text(String),
}

fn stringish<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.and_then(value_to_string))
}

fn value_to_string(value: Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s),
        other => Some(other.to_string()),
    }
}

impl RawEntity {
    /// Parse a JSON body and attach the response provenance.
    ///
    /// # Errors
    ///
    /// Returns [`ScaniiError::Decode`] when the body is not a JSON object,
    /// when `id` is missing or empty, or when `content_length` is not an
    /// integer.
    pub fn parse(body: &str, meta: ResponseMeta) -> Result<Self, ScaniiError> {
        let mut raw: RawEntity = serde_json::from_str(body).map_err(|e| ScaniiError::Decode {
            message: format!("invalid JSON body: {e}"),
            body: body.to_string(),
        })?;

        match raw.id.as_deref() {
            Some(id) if !id.is_empty() => {}
            _ => {
                return Err(ScaniiError::Decode {
                    message: "response is missing the required 'id' field".to_string(),
                    body: body.to_string(),
                });
            }
        }

        if let Some(ContentLength::Text(text)) = &raw.content_length {
            let length = text.trim().parse::<u64>().map_err(|_| ScaniiError::Decode {
                message: format!("content_length is not an integer: '{text}'"),
                body: body.to_string(),
            })?;
            raw.content_length = Some(ContentLength::Number(length));
        }

        raw.meta = meta;
        Ok(raw)
    }

    fn resource_id(&mut self) -> String {
        // presence checked in `parse`
        self.id.take().unwrap_or_default()
    }

    fn metadata(&mut self) -> HashMap<String, String> {
        self.metadata
            .take()
            .unwrap_or_default()
            .into_iter()
            .map(|(key, value)| {
                let value = value_to_string(value).unwrap_or_default();
                (key, value)
            })
            .collect()
    }

    /// Build a [`ScanResult`].
    #[must_use]
    pub fn into_scan_result(mut self) -> ScanResult {
        let resource_id = self.resource_id();
        let metadata = self.metadata();

        let (content_type, content_length, checksum, findings) = match self.findings.take() {
            Some(findings) => {
                let length = match self.content_length {
                    Some(ContentLength::Number(n)) => Some(n),
                    _ => None,
                };
                (self.content_type, length, self.checksum, findings)
            }
            None => (None, None, None, Vec::new()),
        };

        ScanResult {
            resource_id,
            content_type,
            content_length,
            checksum,
            creation_date: self.creation_date,
            findings,
            metadata,
            message: self.message,
            meta: self.meta,
        }
    }

    /// Build a [`PendingResult`].
    #[must_use]
    pub fn into_pending_result(mut self) -> PendingResult {
        PendingResult {
            resource_id: self.resource_id(),
            message: self.message,
            meta: self.meta,
        }
    }

    /// Build an [`AuthToken`].
    #[must_use]
    pub fn into_auth_token(mut self) -> AuthToken {
        AuthToken {
            resource_id: self.resource_id(),
            creation_date: self.creation_date,
            expiration_date: self.expiration_date,
            meta: self.meta,
        }
    }
}

#[cfg(test)]
#[allow(clippy::expect_used)]
mod tests {
    use super::*;
    use reqwest::header::HeaderValue;

    fn meta(status: u16) -> ResponseMeta {
        ResponseMeta {
            status_code: status,
            ..ResponseMeta::default()
        }
    }

    #[test]
    fn test_decode_finished_scan() {
        let body = r#"{
            "id": "3b5a2e7c",
            "checksum": "bec1b52d350d721c7e22a6d4bb0a92909893a3ae",
            "content_length": 184,
            "findings": ["content.malicious.eicar-test-signature"],
            "creation_date": "2024-03-01T10:15:30.123Z",
            "content_type": "application/zip",
            "metadata": {"hello": "world"}
        }"#;

        let result = RawEntity::parse(body, meta(200))
            .expect("body decodes")
            .into_scan_result();

        assert_eq!(result.resource_id, "3b5a2e7c");
        assert_eq!(result.content_type.as_deref(), Some("application/zip"));
        assert_eq!(result.content_length, Some(184));
        assert_eq!(
            result.checksum.as_deref(),
            Some("bec1b52d350d721c7e22a6d4bb0a92909893a3ae")
        );
        assert_eq!(result.findings, vec!["content.malicious.eicar-test-signature"]);
        assert_eq!(result.metadata.get("hello").map(String::as_str), Some("world"));
        assert_eq!(result.meta.status_code, 200);
        assert!(result.creation_time().is_some());
    }

    #[test]
    fn test_content_fields_require_findings() {
        let body = r#"{"id": "abc", "content_type": "text/plain", "content_length": 10}"#;
        let result = RawEntity::parse(body, meta(200))
            .expect("body decodes")
            .into_scan_result();

        assert!(result.content_type.is_none());
        assert!(result.content_length.is_none());
        assert!(result.checksum.is_none());
        assert!(result.findings.is_empty());
    }

    #[test]
    fn test_content_length_string_is_coerced() {
        let body = r#"{"id": "abc", "findings": [], "content_length": "42"}"#;
        let result = RawEntity::parse(body, meta(201))
            .expect("body decodes")
            .into_scan_result();
        assert_eq!(result.content_length, Some(42));
        assert!(result.is_clean());
    }

    #[test]
    fn test_non_numeric_content_length_is_decode_error() {
        let body = r#"{"id": "abc", "findings": [], "content_length": "lots"}"#;
        let err = RawEntity::parse(body, meta(201)).unwrap_err();
        assert!(matches!(err, ScaniiError::Decode { .. }));
    }

    #[test]
    fn test_missing_metadata_is_empty_map() {
        let result = RawEntity::parse(r#"{"id": "abc", "findings": []}"#, meta(201))
            .expect("body decodes")
            .into_scan_result();
        assert!(result.metadata.is_empty());
    }

    #[test]
    fn test_non_string_metadata_values_are_stringified() {
        let body = r#"{"id": "abc", "metadata": {"count": 3, "flag": true, "name": "x"}}"#;
        let result = RawEntity::parse(body, meta(200))
            .expect("body decodes")
            .into_scan_result();
        assert_eq!(result.metadata.len(), 3);
        assert_eq!(result.metadata["count"], "3");
        assert_eq!(result.metadata["flag"], "true");
        assert_eq!(result.metadata["name"], "x");
    }

    #[test]
    fn test_missing_id_is_decode_error() {
        for body in [r#"{"findings": []}"#, r#"{"id": ""}"#, r#"{"id": null}"#] {
            let err = RawEntity::parse(body, meta(200)).unwrap_err();
            match err {
                ScaniiError::Decode { message, body: raw } => {
                    assert!(message.contains("'id'"));
                    assert_eq!(raw, body);
                }
                other => panic!("expected decode error, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_numeric_id_is_used_as_text() {
        let pending = RawEntity::parse(r#"{"id": 12345}"#, meta(202))
            .expect("body decodes")
            .into_pending_result();
        assert_eq!(pending.resource_id, "12345");
    }

    #[test]
    fn test_invalid_json_is_decode_error() {
        let err = RawEntity::parse("<html>oops</html>", meta(201)).unwrap_err();
        assert!(matches!(err, ScaniiError::Decode { .. }));
    }

    #[test]
    fn test_message_is_kept() {
        let body = r#"{"id": "abc", "message": "Accepted for processing"}"#;
        let pending = RawEntity::parse(body, meta(202))
            .expect("body decodes")
            .into_pending_result();
        assert_eq!(pending.resource_id, "abc");
        assert_eq!(pending.message.as_deref(), Some("Accepted for processing"));
    }

    #[test]
    fn test_decode_auth_token() {
        let body = r#"{
            "id": "tok-1",
            "creation_date": "2024-03-01T10:15:30.123Z",
            "expiration_date": "2024-03-01T10:20:30.123Z"
        }"#;
        let token = RawEntity::parse(body, meta(201))
            .expect("body decodes")
            .into_auth_token();
        assert_eq!(token.resource_id, "tok-1");
        assert_eq!(
            token.expiration_date.as_deref(),
            Some("2024-03-01T10:20:30.123Z")
        );
        assert!(token.expiration_time() > token.creation_time());
    }

    #[test]
    fn test_response_meta_reads_headers() {
        let mut headers = HeaderMap::new();
        headers.insert(REQUEST_ID_HEADER, HeaderValue::from_static("req-1"));
        headers.insert(HOST_ID_HEADER, HeaderValue::from_static("host-1"));
        headers.insert(
            LOCATION,
            HeaderValue::from_static("https://api.scanii.com/v2.1/files/abc"),
        );

        let meta = response_meta(202, &headers);
        assert_eq!(meta.status_code, 202);
        assert_eq!(meta.request_id.as_deref(), Some("req-1"));
        assert_eq!(meta.host_id.as_deref(), Some("host-1"));
        assert_eq!(
            meta.resource_location.as_deref(),
            Some("https://api.scanii.com/v2.1/files/abc")
        );
    }

    #[test]
    fn test_response_meta_missing_headers() {
        let meta = response_meta(200, &HeaderMap::new());
        assert_eq!(meta, ResponseMeta {
            status_code: 200,
            ..ResponseMeta::default()
        });
    }
}
