//! Temporary auth tokens.
//!
//! A token can be handed to less trusted parties (browsers, mobile apps) in
//! place of the key/secret pair. Expiration is enforced by the service.

use log::info;
use reqwest::StatusCode;

use crate::ScaniiError;
use crate::client::ScaniiClient;
use crate::decode::{expect_status, read_entity};
use crate::models::AuthToken;

/// Token lifetime used by the service's own clients when none is chosen.
pub const DEFAULT_TOKEN_TIMEOUT_SECS: u32 = 300;

impl ScaniiClient {
    /// Create a new temporary auth token (`POST /auth/tokens`).
    ///
    /// # Arguments
    ///
    /// * `timeout_secs` - How long the token should be valid for, in seconds
    ///
    /// # Errors
    ///
    /// Returns [`ScaniiError::Service`] unless the service answers `201 Created`.
    pub async fn create_auth_token(&self, timeout_secs: u32) -> Result<AuthToken, ScaniiError> {
        let params = [("timeout".to_string(), timeout_secs.to_string())];

        let response = self.post_form("/auth/tokens", &params).await?;
        let response = expect_status(response, StatusCode::CREATED, "create_auth_token").await?;
        Ok(read_entity(response).await?.into_auth_token())
    }

    /// Retrieve a previously created auth token (`GET /auth/tokens/{id}`).
    ///
    /// # Errors
    ///
    /// Returns [`ScaniiError::InvalidArgument`] for an empty id and
    /// [`ScaniiError::Service`] unless the service answers `200 OK`.
    pub async fn retrieve_auth_token(&self, id: &str) -> Result<AuthToken, ScaniiError> {
        if id.is_empty() {
            return Err(ScaniiError::InvalidArgument(
                "auth token id cannot be empty".to_string(),
            ));
        }

        let response = self.get(&format!("/auth/tokens/{id}")).await?;
        let response = expect_status(response, StatusCode::OK, "retrieve_auth_token").await?;
        Ok(read_entity(response).await?.into_auth_token())
    }

    /// Delete a previously created auth token (`DELETE /auth/tokens/{id}`).
    ///
    /// The service may keep answering [`ScaniiClient::retrieve_auth_token`]
    /// for a deleted token until it is purged.
    ///
    /// # Errors
    ///
    /// Returns [`ScaniiError::InvalidArgument`] for an empty id and
    /// [`ScaniiError::Service`] unless the service answers `204 No Content`.
    pub async fn delete_auth_token(&self, id: &str) -> Result<(), ScaniiError> {
        if id.is_empty() {
            return Err(ScaniiError::InvalidArgument(
                "auth token id cannot be empty".to_string(),
            ));
        }

        info!("deleting auth token {id}");
        let response = self.delete(&format!("/auth/tokens/{id}")).await?;
        expect_status(response, StatusCode::NO_CONTENT, "delete_auth_token").await?;
        Ok(())
    }
}
