//! Store endpoints.

use reqwest::Method;
use storescore_core::{RegionId, Store, StoreDraft, StoreId};

use crate::client::StoreScoreClient;
use crate::error::ClientError;
use crate::types::{GeocodeResult, QrTokenResponse, RegionAssignment};

impl StoreScoreClient {
    /// Lists every store of the organization, active or not.
    ///
    /// # Errors
    ///
    /// - [`ClientError::Api`] on a non-2xx response.
    /// - [`ClientError::Http`] on network failure.
    /// - [`ClientError::Deserialize`] if the body is not a store list.
    pub async fn list_stores(&self) -> Result<Vec<Store>, ClientError> {
        self.get_list("stores/", &[]).await
    }

    /// # Errors
    ///
    /// - [`ClientError::Api`] if the backend rejects the payload.
    /// - [`ClientError::Http`] on network failure.
    /// - [`ClientError::Deserialize`] if the response is not a store.
    pub async fn create_store(&self, draft: &StoreDraft) -> Result<Store, ClientError> {
        self.send_json(Method::POST, "stores/", Some(draft)).await
    }

    /// Replaces the editable fields of a store, departments included.
    ///
    /// # Errors
    ///
    /// - [`ClientError::Api`] if the backend rejects the payload.
    /// - [`ClientError::Http`] on network failure.
    /// - [`ClientError::Deserialize`] if the response is not a store.
    pub async fn update_store(&self, id: StoreId, draft: &StoreDraft) -> Result<Store, ClientError> {
        self.send_json(Method::PATCH, &format!("stores/{id}/"), Some(draft))
            .await
    }

    /// Moves a store to `region`, or unassigns it with `None`.
    ///
    /// # Errors
    ///
    /// - [`ClientError::Api`] if the backend refuses the move.
    /// - [`ClientError::Http`] on network failure.
    /// - [`ClientError::Deserialize`] if the response is not a store.
    pub async fn set_store_region(
        &self,
        id: StoreId,
        region: Option<RegionId>,
    ) -> Result<Store, ClientError> {
        self.send_json(
            Method::PATCH,
            &format!("stores/{id}/"),
            Some(&RegionAssignment { region }),
        )
        .await
    }

    /// Asks the backend to geocode the store's saved address.
    ///
    /// # Errors
    ///
    /// - [`ClientError::Api`] if the address could not be geocoded.
    /// - [`ClientError::Http`] on network failure.
    /// - [`ClientError::Deserialize`] if the response lacks coordinates.
    pub async fn geocode_store(&self, id: StoreId) -> Result<GeocodeResult, ClientError> {
        self.send_json(Method::POST, &format!("stores/{id}/geocode/"), None::<&()>)
            .await
    }

    /// Issues a new QR verification token, invalidating printed codes.
    ///
    /// # Errors
    ///
    /// - [`ClientError::Api`] on a non-2xx response.
    /// - [`ClientError::Http`] on network failure.
    /// - [`ClientError::Deserialize`] if the response lacks the token.
    pub async fn regenerate_qr_token(&self, id: StoreId) -> Result<String, ClientError> {
        let response: QrTokenResponse = self
            .send_json(
                Method::POST,
                &format!("stores/{id}/regenerate-qr/"),
                None::<&()>,
            )
            .await?;
        Ok(response.qr_verification_token)
    }

    /// Downloads the store's QR code as PNG bytes.
    ///
    /// # Errors
    ///
    /// - [`ClientError::Api`] on a non-2xx response.
    /// - [`ClientError::Http`] on network failure.
    pub async fn fetch_qr_image(&self, id: StoreId) -> Result<Vec<u8>, ClientError> {
        self.get_bytes(&format!("stores/{id}/qr-code/"), "image/png")
            .await
    }
}
