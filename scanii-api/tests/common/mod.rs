//! Shared helpers for the mock-server tests.
#![allow(dead_code)]

use scanii::{ScaniiClient, ScaniiConfig, ScaniiCredentials, ScaniiTarget};

/// `Basic base64("key:secret")`
pub const AUTH_HEADER: &str = "Basic a2V5OnNlY3JldA==";

pub const FINDING: &str = "content.malicious.eicar-test-signature";

pub const EICAR: &str =
    "X5O!P%@AP[4\\PZX54(P^)7CC)7}$EICAR-STANDARD-ANTIVIRUS-TEST-FILE!$H+H*";

pub const FILE_ID: &str = "3b5a2e7c9d1f4a6b8c0e2d4f6a8b0c1d";

pub const FINISHED_SCAN: &str = r#"{
    "id": "3b5a2e7c9d1f4a6b8c0e2d4f6a8b0c1d",
    "checksum": "cf8bd9dfddff007f75adf4c2be48005cea317c62",
    "content_length": 69,
    "findings": ["content.malicious.eicar-test-signature"],
    "creation_date": "2024-03-01T10:15:30.123Z",
    "content_type": "text/plain",
    "metadata": {"hello": "world"}
}"#;

pub const CLEAN_SCAN: &str = r#"{
    "id": "3b5a2e7c9d1f4a6b8c0e2d4f6a8b0c1d",
    "checksum": "aaf4c61ddcc5e8a2dabede0f3b482cd9aea9434d",
    "content_length": 5,
    "findings": [],
    "creation_date": "2024-03-01T10:15:30.123Z",
    "content_type": "text/plain"
}"#;

pub const PENDING: &str = r#"{"id": "3b5a2e7c9d1f4a6b8c0e2d4f6a8b0c1d"}"#;

pub const TOKEN_ID: &str = "c4d6e8f0a2b4";

pub const TOKEN: &str = r#"{
    "id": "c4d6e8f0a2b4",
    "creation_date": "2024-03-01T10:15:30.123Z",
    "expiration_date": "2024-03-01T10:15:35.123Z"
}"#;

/// Client for `server` authenticating with `key:secret`.
pub fn client_for(server: &mockito::ServerGuard) -> ScaniiClient {
    let credentials = ScaniiCredentials::key_secret("key", "secret").expect("valid credentials");
    let config = ScaniiConfig::new(credentials).with_target(ScaniiTarget::custom(server.url()));
    ScaniiClient::new(config).expect("client builds")
}

/// Location the mock server reports for a created file resource.
pub fn file_location(server: &mockito::ServerGuard) -> String {
    format!("{}/files/{FILE_ID}", server.url())
}

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}
