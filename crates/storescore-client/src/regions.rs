//! Region endpoints.

use reqwest::Method;
use storescore_core::{Region, RegionDraft, RegionId, RegionPatch, UserId};

use crate::client::StoreScoreClient;
use crate::error::ClientError;
use crate::types::ManagerAssignment;

impl StoreScoreClient {
    /// Lists all regions, top-level and children, in backend order.
    ///
    /// # Errors
    ///
    /// - [`ClientError::Api`] on a non-2xx response.
    /// - [`ClientError::Http`] on network failure.
    /// - [`ClientError::Deserialize`] if the body is not a region list.
    pub async fn list_regions(&self) -> Result<Vec<Region>, ClientError> {
        self.get_list("regions/", &[]).await
    }

    /// # Errors
    ///
    /// - [`ClientError::Api`] if the backend rejects the name (e.g. duplicate).
    /// - [`ClientError::Http`] on network failure.
    /// - [`ClientError::Deserialize`] if the response is not a region.
    pub async fn create_region(&self, draft: &RegionDraft) -> Result<Region, ClientError> {
        self.send_json(Method::POST, "regions/", Some(draft)).await
    }

    /// # Errors
    ///
    /// - [`ClientError::Api`] if the backend rejects the patch.
    /// - [`ClientError::Http`] on network failure.
    /// - [`ClientError::Deserialize`] if the response is not a region.
    pub async fn update_region(
        &self,
        id: RegionId,
        patch: &RegionPatch,
    ) -> Result<Region, ClientError> {
        self.send_json(Method::PATCH, &format!("regions/{id}/"), Some(patch))
            .await
    }

    /// # Errors
    ///
    /// - [`ClientError::Api`] if the backend refuses the delete.
    /// - [`ClientError::Http`] on network failure.
    pub async fn delete_region(&self, id: RegionId) -> Result<(), ClientError> {
        self.send(Method::DELETE, &format!("regions/{id}/"), None::<&()>)
            .await?;
        Ok(())
    }

    /// Sets the region's manager, or clears it with `None`.
    ///
    /// # Errors
    ///
    /// - [`ClientError::Api`] if the user cannot manage regions.
    /// - [`ClientError::Http`] on network failure.
    /// - [`ClientError::Deserialize`] if the response is not a region.
    pub async fn assign_region_manager(
        &self,
        id: RegionId,
        manager: Option<UserId>,
    ) -> Result<Region, ClientError> {
        self.send_json(
            Method::POST,
            &format!("regions/{id}/assign-manager/"),
            Some(&ManagerAssignment { manager }),
        )
        .await
    }
}
