//! Address book endpoints.

use nyraa_core::AddressId;
use reqwest::Method;
use tracing::instrument;

use crate::models::Address;

use super::client::{Auth, CacheValue};
use super::types::{AckEnvelope, AddressEnvelope, AddressesEnvelope};
use super::{ApiClient, ApiError};

const ADDRESSES_KEY: &str = "addresses";

impl ApiClient {
    /// Fetch the account's addresses.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] if the request fails.
    #[instrument(skip(self))]
    pub async fn addresses(&self) -> Result<Vec<Address>, ApiError> {
        if let Some(CacheValue::Addresses(cached)) = self.cache_get(ADDRESSES_KEY).await {
            return Ok(cached);
        }

        let envelope: AddressesEnvelope = self.get_json("api/user/addresses", Auth::Bearer).await?;
        self.cache_put(
            ADDRESSES_KEY.to_string(),
            CacheValue::Addresses(envelope.addresses.clone()),
        )
        .await;
        Ok(envelope.addresses)
    }

    /// Create an address. The backend may reassign the id.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] if the request fails.
    #[instrument(skip(self, address))]
    pub async fn create_address(&self, address: &Address) -> Result<Address, ApiError> {
        let envelope: AddressEnvelope = self
            .send_json(Method::POST, "api/user/addresses", address, Auth::Bearer)
            .await?;
        self.invalidate_cache();
        unwrap_address(envelope, address)
    }

    /// Update an existing address.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::NotFound`] for an unknown id.
    #[instrument(skip(self, address), fields(id = %address.id))]
    pub async fn update_address(&self, address: &Address) -> Result<Address, ApiError> {
        let envelope: AddressEnvelope = self
            .send_json(
                Method::PUT,
                &format!("api/user/addresses/{}", address.id),
                address,
                Auth::Bearer,
            )
            .await?;
        self.invalidate_cache();
        unwrap_address(envelope, address)
    }

    /// Delete an address.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::NotFound`] for an unknown id.
    #[instrument(skip(self))]
    pub async fn delete_address(&self, id: AddressId) -> Result<(), ApiError> {
        let _: AckEnvelope = self
            .send_empty(
                Method::DELETE,
                &format!("api/user/addresses/{id}"),
                Auth::Bearer,
            )
            .await?;
        self.invalidate_cache();
        Ok(())
    }

    /// Mark an address as the account default.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::NotFound`] for an unknown id.
    #[instrument(skip(self))]
    pub async fn set_default_address(&self, id: AddressId) -> Result<(), ApiError> {
        let _: AckEnvelope = self
            .send_empty(
                Method::PATCH,
                &format!("api/user/addresses/{id}/default"),
                Auth::Bearer,
            )
            .await?;
        self.invalidate_cache();
        Ok(())
    }
}

/// The create/update envelope may omit the echoed address; fall back to what
/// was sent.
fn unwrap_address(envelope: AddressEnvelope, sent: &Address) -> Result<Address, ApiError> {
    if !envelope.success {
        return Err(ApiError::Rejected(
            envelope
                .message
                .unwrap_or_else(|| "address request failed".to_string()),
        ));
    }
    Ok(envelope.address.unwrap_or_else(|| sent.clone()))
}
