//! Store form actions: save, geocode, QR token rotation and download.

use storescore_client::GeocodeResult;
use storescore_core::{CoreError, Store, StoreForm, StoreId};

use crate::error::ManagerError;
use crate::manager::RegionManager;

impl RegionManager {
    /// Create the store, or update it when the form was opened on a saved
    /// one. Departments are sent as the complete set.
    ///
    /// # Errors
    ///
    /// - [`ManagerError::Validation`] for an empty name; nothing is sent.
    /// - [`ManagerError::Core`] if the form points at an unknown region.
    /// - [`ManagerError::Backend`] if the backend rejects the store.
    pub async fn save_store(&mut self, form: &StoreForm) -> Result<Store, ManagerError> {
        let draft = form.validate()?;
        if let Some(region) = draft.region {
            if self.tree.region(region).is_none() {
                return Err(CoreError::UnknownRegion(region).into());
            }
        }

        let result = match form.id {
            Some(id) => self.client.update_store(id, &draft).await,
            None => self.client.create_store(&draft).await,
        };
        match result {
            Ok(store) => {
                tracing::info!(store = %store.id, name = %store.name, "store saved");
                self.notices.success(format!("Saved \"{}\"", store.name));
                self.tree.upsert_store(store.clone());
                self.mark_local_change();
                self.reconcile().await;
                Ok(store)
            }
            Err(e) => {
                let err = ManagerError::backend("Failed to save store", e);
                self.notices.error(err.to_string());
                Err(err)
            }
        }
    }

    /// Geocode the saved address and copy the coordinates into `form`. The
    /// store itself is not saved.
    ///
    /// # Errors
    ///
    /// - [`ManagerError::NotSaved`] for a form that has never been saved.
    /// - [`ManagerError::Backend`] if the address could not be geocoded.
    pub async fn geocode(&mut self, form: &mut StoreForm) -> Result<GeocodeResult, ManagerError> {
        let id = form.id.ok_or(ManagerError::NotSaved)?;
        match self.client.geocode_store(id).await {
            Ok(result) => {
                form.apply_geocode(result.latitude, result.longitude);
                self.notices.success(format!(
                    "Located at {}, {}; save to keep the new coordinates",
                    result.latitude, result.longitude
                ));
                Ok(result)
            }
            Err(e) => {
                let err = ManagerError::backend("Could not geocode address", e);
                self.notices.error(err.to_string());
                Err(err)
            }
        }
    }

    /// Issue a new QR token. Printed codes for the store stop working, so the
    /// caller must pass `confirmed = true` once the user has agreed.
    ///
    /// # Errors
    ///
    /// - [`ManagerError::ConfirmationRequired`] without confirmation; nothing is sent.
    /// - [`ManagerError::Core`] if the store is not in the tree.
    /// - [`ManagerError::Backend`] if the backend refuses.
    pub async fn regenerate_qr(
        &mut self,
        store: StoreId,
        confirmed: bool,
    ) -> Result<String, ManagerError> {
        if !confirmed {
            return Err(ManagerError::ConfirmationRequired(
                "regenerating the QR code invalidates every printed code for this store",
            ));
        }
        let name = self
            .tree
            .store(store)
            .map(|s| s.name.clone())
            .ok_or(CoreError::UnknownStore(store))?;

        match self.client.regenerate_qr_token(store).await {
            Ok(token) => {
                self.tree.set_store_token(store, token.clone())?;
                tracing::info!(store = %store, "QR token regenerated");
                self.notices
                    .success(format!("New QR code issued for \"{name}\""));
                Ok(token)
            }
            Err(e) => {
                let err = ManagerError::backend(
                    &format!("Failed to regenerate QR code for \"{name}\""),
                    e,
                );
                self.notices.error(err.to_string());
                Err(err)
            }
        }
    }

    /// PNG bytes of the store's current QR code.
    ///
    /// # Errors
    ///
    /// Returns [`ManagerError::Backend`] if the image cannot be fetched.
    pub async fn qr_image(&self, store: StoreId) -> Result<Vec<u8>, ManagerError> {
        self.client
            .fetch_qr_image(store)
            .await
            .map_err(|e| ManagerError::backend("Failed to download QR code", e))
    }
}
