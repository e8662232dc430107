//! Typed results returned by the Scanii API.
//!
//! Every value here is built exactly once by the response decoder from a
//! single HTTP response. A finished scan for an async submission is a new
//! [`ScanResult`] obtained through `retrieve`, never an update of the
//! [`PendingResult`].

use chrono::{DateTime, FixedOffset};
use serde::Serialize;
use std::collections::HashMap;

/// Response provenance attached to every entity.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ResponseMeta {
    /// HTTP status code of the response
    pub status_code: u16,
    /// Per-request id (`X-Scanii-Request-Id`)
    pub request_id: Option<String>,
    /// Id of the host that served the request (`X-Scanii-Host-Id`)
    pub host_id: Option<String>,
    /// `Location` header, only sent on resource creating calls
    pub resource_location: Option<String>,
}

/// Result of a completed scan.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScanResult {
    /// Server assigned id of the processed content
    pub resource_id: String,
    /// Detected content type
    pub content_type: Option<String>,
    /// Content length in bytes
    pub content_length: Option<u64>,
    /// SHA-1 hex digest of the content
    pub checksum: Option<String>,
    /// Creation timestamp, as sent by the service
    pub creation_date: Option<String>,
    /// Finding identifiers, empty when the content is clean
    pub findings: Vec<String>,
    /// Metadata supplied on submission, echoed back
    pub metadata: HashMap<String, String>,
    /// Informational message some responses carry
    pub message: Option<String>,
    /// Response provenance
    pub meta: ResponseMeta,
}

impl ScanResult {
    /// `true` when the scan produced no findings.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.findings.is_empty()
    }

    /// Creation timestamp interpreted as RFC 3339, if it is one.
    #[must_use]
    pub fn creation_time(&self) -> Option<DateTime<FixedOffset>> {
        parse_timestamp(self.creation_date.as_deref())
    }
}

/// Acknowledgement of an async submission or fetch request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PendingResult {
    /// Id to pass to `retrieve` once processing completes
    pub resource_id: String,
    /// Informational message some responses carry
    pub message: Option<String>,
    /// Response provenance
    pub meta: ResponseMeta,
}

impl PendingResult {
    /// URL of the resource being processed.
    #[must_use]
    pub fn resource_location(&self) -> Option<&str> {
        self.meta.resource_location.as_deref()
    }
}

/// Short-lived credential created through the auth token API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuthToken {
    /// Token id, usable as a credential
    pub resource_id: String,
    pub creation_date: Option<String>,
    pub expiration_date: Option<String>,
    /// Response provenance
    pub meta: ResponseMeta,
}

impl AuthToken {
    #[must_use]
    pub fn creation_time(&self) -> Option<DateTime<FixedOffset>> {
        parse_timestamp(self.creation_date.as_deref())
    }

    #[must_use]
    pub fn expiration_time(&self) -> Option<DateTime<FixedOffset>> {
        parse_timestamp(self.expiration_date.as_deref())
    }
}

fn parse_timestamp(value: Option<&str>) -> Option<DateTime<FixedOffset>> {
    value.and_then(|v| DateTime::parse_from_rfc3339(v).ok())
}
