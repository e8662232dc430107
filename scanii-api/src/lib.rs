//! # Scanii API Client Library
//!
//! An async Rust client for the [Scanii](https://www.scanii.com) content
//! scanning API: submit files or streams for synchronous or asynchronous
//! processing, let the service fetch remote content, retrieve results,
//! manage temporary auth tokens and ping the service.
//!
//! ## Features
//!
//! - **Multi-Regional Support** - geo-balanced or pinned US, EU and AP endpoints, API v2.0 and v2.1
//! - **Key/secret or token auth** - HTTP Basic auth built once per client
//! - **Typed results** - [`ScanResult`], [`PendingResult`] and [`AuthToken`] with response provenance
//! - **Single error type** - every failure surfaces as a [`ScaniiError`]
//! - **Async/Await** - built on tokio and reqwest, one HTTP exchange per call
//!
//! ## Quick Start
//!
//! ```no_run
//! use scanii::{ScaniiClient, ScaniiConfig, ScaniiCredentials, ScaniiTarget, SubmitOptions};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let credentials = ScaniiCredentials::key_secret("your_key", "your_secret")?;
//!     let config = ScaniiConfig::new(credentials).with_target(ScaniiTarget::V21_EU1);
//!     let client = ScaniiClient::new(config)?;
//!
//!     let result = client
//!         .process_file("./invoice.pdf", &SubmitOptions::new().with_metadata("customer", "42"))
//!         .await?;
//!
//!     if result.is_clean() {
//!         println!("{} is clean", result.resource_id);
//!     } else {
//!         println!("findings: {:?}", result.findings);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Async processing
//!
//! [`ScaniiClient::process_async`] and [`ScaniiClient::fetch`] return a
//! [`PendingResult`]. The final [`ScanResult`] is a separate value obtained
//! through [`ScaniiClient::retrieve`]; until processing finishes the service
//! answers with a 404 [`ScaniiError::Service`]. The client never polls on its
//! own, see [`polling`] for a caller-side helper.

pub mod auth;
pub mod client;
pub mod credentials;
pub mod decode;
pub mod files;
pub mod models;
pub mod polling;
pub mod target;

use std::time::Duration;

// Re-export common types for convenience
pub use client::ScaniiClient;
pub use credentials::ScaniiCredentials;
pub use files::{ScanSource, SubmitOptions};
pub use models::{AuthToken, PendingResult, ResponseMeta, ScanResult};
pub use polling::{PollPolicy, poll_for_result};
pub use target::{ApiVersion, ScaniiRegion, ScaniiTarget};

/// Environment variable selecting the target, see [`ScaniiTarget`]'s `FromStr`.
pub const TARGET_ENV_VAR: &str = "SCANII_TARGET";

/// Error type for every Scanii operation.
#[derive(Debug, thiserror::Error)]
#[must_use = "Need to handle all error enum types."]
pub enum ScaniiError {
    /// The service answered with a status other than the operation's success status
    #[error("Invalid HTTP response from service, code: {status} message: {body}")]
    Service { status: u16, body: String },

    /// Invalid target, credentials or client settings; never reaches the network
    #[error("Invalid configuration: {0}")]
    Configuration(String),

    /// A required call argument was empty
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// The response arrived but its body violates the API contract
    #[error("Invalid response body: {message}")]
    Decode { message: String, body: String },

    /// Transport failure (connection, TLS, timeout)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Reading a local file or stream failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ScaniiError {
    /// HTTP status of a [`ScaniiError::Service`] error.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            ScaniiError::Service { status, .. } => Some(*status),
            ScaniiError::Http(e) => e.status().map(|s| s.as_u16()),
            ScaniiError::Configuration(_)
            | ScaniiError::InvalidArgument(_)
            | ScaniiError::Decode { .. }
            | ScaniiError::Io(_) => None,
        }
    }

    /// `true` for a 404 from the service, which `retrieve` returns while an
    /// async submission is still being processed.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, ScaniiError::Service { status: 404, .. })
    }
}

/// Configuration for the Scanii API client.
#[derive(Debug, Clone)]
pub struct ScaniiConfig {
    /// Credentials sent with every request
    pub credentials: ScaniiCredentials,
    /// API version and region
    pub target: ScaniiTarget,
    /// Connection timeout
    pub connect_timeout: Duration,
    /// Timeout for a whole request, upload included
    pub request_timeout: Duration,
    /// Optional HTTP(S) proxy URL
    pub proxy_url: Option<String>,
    /// Whether to validate TLS certificates (default: true)
    pub validate_certificates: bool,
}

impl ScaniiConfig {
    /// Create a configuration for the default geo-balanced v2.1 target.
    pub fn new(credentials: ScaniiCredentials) -> Self {
        Self {
            credentials,
            target: ScaniiTarget::default(),
            connect_timeout: Duration::from_secs(30),
            request_timeout: Duration::from_secs(300),
            proxy_url: None,
            validate_certificates: true,
        }
    }

    /// Build a configuration from `SCANII_CREDS`, and optionally
    /// `SCANII_TARGET` and `HTTPS_PROXY`.
    ///
    /// # Errors
    ///
    /// Returns [`ScaniiError::Configuration`] when credentials are missing or
    /// malformed, or the target is unknown.
    pub fn from_env() -> Result<Self, ScaniiError> {
        let mut config = Self::new(ScaniiCredentials::from_env()?);

        if let Ok(target) = std::env::var(TARGET_ENV_VAR) {
            config.target = target.parse()?;
        }

        if let Ok(proxy) = std::env::var("HTTPS_PROXY").or_else(|_| std::env::var("https_proxy")) {
            if !proxy.is_empty() {
                config.proxy_url = Some(proxy);
            }
        }

        Ok(config)
    }

    /// Set the API version and region.
    pub fn with_target(mut self, target: ScaniiTarget) -> Self {
        self.target = target;
        self
    }

    /// Set the connection timeout.
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Set the overall request timeout.
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Route requests through a proxy.
    pub fn with_proxy(mut self, proxy_url: impl Into<String>) -> Self {
        self.proxy_url = Some(proxy_url.into());
        self
    }

    /// Disable certificate validation for development environments.
    ///
    /// WARNING: Never use this in production.
    pub fn with_certificate_validation_disabled(mut self) -> Self {
        self.validate_certificates = false;
        self
    }
}
