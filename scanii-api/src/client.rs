//! Core Scanii API client implementation.
//!
//! This module contains the foundational client that owns the pooled HTTP
//! transport, the resolved base URL and the per-client default headers. The
//! typed operations live in [`crate::files`] and [`crate::auth`].

use log::{debug, info};
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue, USER_AGENT};
use reqwest::{Body, Client, multipart};

use crate::models::AuthToken;
use crate::{ScaniiConfig, ScaniiCredentials, ScaniiError};

/// Product name sent in the `User-Agent` header.
pub const CLIENT_NAME: &str = "scanii-rust";

/// `User-Agent` value: client name and this crate's version.
#[must_use]
pub fn user_agent() -> String {
    format!("{CLIENT_NAME}/v{}", env!("CARGO_PKG_VERSION"))
}

/// Core Scanii API client.
///
/// Cheap to clone; clones share the same connection pool. A single instance
/// can serve many concurrent calls.
#[derive(Debug, Clone)]
pub struct ScaniiClient {
    config: ScaniiConfig,
    base_url: String,
    client: Client,
}

impl ScaniiClient {
    /// Create a new Scanii API client.
    ///
    /// Resolves the target and installs the authentication and user agent
    /// headers once for every request made by this client.
    ///
    /// # Errors
    ///
    /// Returns [`ScaniiError::Configuration`] for an unusable target or proxy
    /// URL, or [`ScaniiError::Http`] if the transport cannot be built.
    pub fn new(config: ScaniiConfig) -> Result<Self, ScaniiError> {
        let base_url = config
            .target
            .resolve()?
            .as_str()
            .trim_end_matches('/')
            .to_string();

        let mut auth_value = HeaderValue::from_str(&config.credentials.authorization_header())
            .map_err(|e| ScaniiError::Configuration(format!("Invalid credentials: {e}")))?;
        auth_value.set_sensitive(true);

        let user_agent = user_agent();
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, auth_value);
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&user_agent)
                .map_err(|e| ScaniiError::Configuration(format!("Invalid user agent: {e}")))?,
        );

        let mut client_builder = Client::builder()
            .default_headers(headers)
            .connect_timeout(config.connect_timeout)
            .timeout(config.request_timeout);

        // Use the certificate validation setting from config
        if !config.validate_certificates {
            client_builder = client_builder.danger_accept_invalid_certs(true);
        }

        // Proxies only come from the config, see `ScaniiConfig::from_env`
        client_builder = match &config.proxy_url {
            Some(proxy_url) => {
                let proxy = reqwest::Proxy::all(proxy_url)
                    .map_err(|e| ScaniiError::Configuration(format!("Invalid proxy URL: {e}")))?;
                client_builder.proxy(proxy)
            }
            None => client_builder.no_proxy(),
        };

        let client = client_builder.build()?;

        info!(
            "starting client with version {user_agent} and target {} ({base_url})",
            config.target
        );

        Ok(Self {
            config,
            base_url,
            client,
        })
    }

    /// Create a client authenticating with `token`, sharing every other
    /// setting of `config`.
    ///
    /// # Errors
    ///
    /// Same as [`ScaniiClient::new`], plus an invalid token id.
    pub fn with_auth_token(config: &ScaniiConfig, token: &AuthToken) -> Result<Self, ScaniiError> {
        let mut token_config = config.clone();
        token_config.credentials = ScaniiCredentials::from_auth_token(token)?;
        Self::new(token_config)
    }

    /// Get the resolved base URL for API requests.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Get access to the configuration
    #[must_use]
    pub fn config(&self) -> &ScaniiConfig {
        &self.config
    }

    /// Get access to the underlying reqwest client
    #[must_use]
    pub fn client(&self) -> &Client {
        &self.client
    }

    fn url(&self, endpoint: &str) -> String {
        let mut url = String::with_capacity(self.base_url.len().saturating_add(endpoint.len()));
        url.push_str(&self.base_url);
        url.push_str(endpoint);
        url
    }

    /// Make a GET request to the specified endpoint.
    ///
    /// # Errors
    ///
    /// Returns [`ScaniiError::Http`] if the request cannot be sent.
    pub async fn get(&self, endpoint: &str) -> Result<reqwest::Response, ScaniiError> {
        debug!("GET {endpoint}");
        let response = self.client.get(self.url(endpoint)).send().await?;
        Ok(response)
    }

    /// Make a DELETE request to the specified endpoint.
    ///
    /// # Errors
    ///
    /// Returns [`ScaniiError::Http`] if the request cannot be sent.
    pub async fn delete(&self, endpoint: &str) -> Result<reqwest::Response, ScaniiError> {
        debug!("DELETE {endpoint}");
        let response = self.client.delete(self.url(endpoint)).send().await?;
        Ok(response)
    }

    /// POST a form-urlencoded body.
    ///
    /// # Errors
    ///
    /// Returns [`ScaniiError::Http`] if the request cannot be sent.
    pub async fn post_form(
        &self,
        endpoint: &str,
        params: &[(String, String)],
    ) -> Result<reqwest::Response, ScaniiError> {
        debug!("POST {endpoint} (form, {} fields)", params.len());
        let response = self
            .client
            .post(self.url(endpoint))
            .form(params)
            .send()
            .await?;
        Ok(response)
    }

    /// Upload a file using multipart form data.
    ///
    /// # Arguments
    ///
    /// * `endpoint` - The API endpoint to call
    /// * `params` - Additional text fields, sent after the file part
    /// * `file_field_name` - Name of the file field
    /// * `filename` - Name of the file
    /// * `file_data` - File data as bytes
    ///
    /// # Errors
    ///
    /// Returns [`ScaniiError::Http`] if the request cannot be sent.
    pub async fn upload_file_multipart(
        &self,
        endpoint: &str,
        params: Vec<(String, String)>,
        file_field_name: &str,
        filename: &str,
        file_data: Vec<u8>,
    ) -> Result<reqwest::Response, ScaniiError> {
        debug!(
            "POST {endpoint} (multipart, {} bytes, {} fields)",
            file_data.len(),
            params.len()
        );

        let part = multipart::Part::bytes(file_data);
        self.send_multipart(endpoint, params, file_field_name, filename, part)
            .await
    }

    /// Upload a file using multipart form data, streaming its content.
    ///
    /// `length` is sent as the part's size so the body never has to be
    /// buffered.
    ///
    /// # Errors
    ///
    /// Returns [`ScaniiError::Http`] if the request cannot be sent or the
    /// stream fails while uploading.
    pub async fn upload_stream_multipart(
        &self,
        endpoint: &str,
        params: Vec<(String, String)>,
        file_field_name: &str,
        filename: &str,
        body: impl Into<Body>,
        length: u64,
    ) -> Result<reqwest::Response, ScaniiError> {
        debug!(
            "POST {endpoint} (multipart stream, {length} bytes, {} fields)",
            params.len()
        );

        let part = multipart::Part::stream_with_length(body, length);
        self.send_multipart(endpoint, params, file_field_name, filename, part)
            .await
    }

    async fn send_multipart(
        &self,
        endpoint: &str,
        params: Vec<(String, String)>,
        file_field_name: &str,
        filename: &str,
        part: multipart::Part,
    ) -> Result<reqwest::Response, ScaniiError> {
        let part = part
            .file_name(filename.to_string())
            .mime_str("application/octet-stream")
            .map_err(|e| ScaniiError::Configuration(e.to_string()))?;

        // field names such as `metadata[key]` go out verbatim, callers must
        // keep quotes and line breaks out of them
        let mut form = multipart::Form::new()
            .percent_encode_noop()
            .part(file_field_name.to_string(), part);
        for (key, value) in params {
            form = form.text(key, value);
        }

        let response = self
            .client
            .post(self.url(endpoint))
            .multipart(form)
            .send()
            .await?;
        Ok(response)
    }
}
