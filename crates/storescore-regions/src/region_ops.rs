//! Region create, rename, recolor, manager assignment and delete.
//!
//! Field patches are applied to the local tree before the request goes out
//! and rolled back if it fails. Create and delete change the shape of the
//! tree, so those wait for the backend and then refresh.

use storescore_client::ClientError;
use storescore_core::{
    normalize_color, CoreError, Region, RegionDraft, RegionId, RegionPatch, RegionTree, UserId,
    ValidationError,
};

use crate::error::{failure_message, ManagerError};
use crate::manager::{RegionManager, Settled};
use crate::sequence::{EntityKey, Ticket};

impl RegionManager {
    /// Create a top-level region, or a child of an existing top-level one.
    ///
    /// # Errors
    ///
    /// - [`ManagerError::Validation`] for an empty name or bad colour; nothing is sent.
    /// - [`ManagerError::Core`] if `parent` is unknown or itself a child; nothing is sent.
    /// - [`ManagerError::Backend`] if the backend rejects the region (a
    ///   duplicate name, for instance); an error notice carries the detail.
    pub async fn create_region(
        &mut self,
        name: &str,
        parent: Option<RegionId>,
        color: Option<&str>,
    ) -> Result<Region, ManagerError> {
        let mut draft = RegionDraft::new(name, parent)?;
        if let Some(color) = color {
            draft = draft.with_color(color)?;
        }
        if let Some(parent) = parent {
            self.tree.check_parent(parent)?;
        }

        match self.client.create_region(&draft).await {
            Ok(region) => {
                tracing::info!(region = %region.id, name = %region.name, "region created");
                self.notices
                    .success(format!("Created region \"{}\"", region.name));
                self.reconcile().await;
                Ok(region)
            }
            Err(e) => {
                let err = ManagerError::backend("Failed to create region", e);
                self.notices.error(err.to_string());
                Err(err)
            }
        }
    }

    /// # Errors
    ///
    /// - [`ManagerError::Validation`] for an empty name; nothing is sent.
    /// - [`ManagerError::Core`] if the region is unknown.
    /// - [`ManagerError::Backend`] if the backend refuses; the old name is restored.
    pub async fn rename_region(
        &mut self,
        id: RegionId,
        name: &str,
    ) -> Result<Settled, ManagerError> {
        let patch = RegionPatch::rename(name)?;
        let new_name = name.trim().to_owned();
        let previous = self.tree.set_region_name(id, new_name)?;
        let failure = format!("Failed to rename \"{previous}\"");
        let ticket = self.begin_region_patch(id);

        let result = self.client.update_region(id, &patch).await;
        let Some(saved) = self.settle_region_patch(ticket, result, &failure, |tree| {
            note_rollback(id, tree.set_region_name(id, previous));
        })?
        else {
            return Ok(Settled::Superseded);
        };

        self.tree.set_region_name(id, saved.name.clone())?;
        self.notices
            .success(format!("Renamed region to \"{}\"", saved.name));
        Ok(Settled::Applied)
    }

    /// # Errors
    ///
    /// - [`ManagerError::Validation`] unless `color` is `#RRGGBB`; nothing is sent.
    /// - [`ManagerError::Core`] if the region is unknown.
    /// - [`ManagerError::Backend`] if the backend refuses; the old colour is restored.
    pub async fn recolor_region(
        &mut self,
        id: RegionId,
        color: &str,
    ) -> Result<Settled, ManagerError> {
        let color = normalize_color(color)?;
        let patch = RegionPatch {
            color: Some(color.clone()),
            ..RegionPatch::default()
        };
        let previous = self.tree.set_region_color(id, color)?;
        let name = self.region_name(id);
        let ticket = self.begin_region_patch(id);

        let result = self.client.update_region(id, &patch).await;
        let failure = format!("Failed to update colour of \"{name}\"");
        if self
            .settle_region_patch(ticket, result, &failure, |tree| {
                note_rollback(id, tree.set_region_color(id, previous));
            })?
            .is_none()
        {
            return Ok(Settled::Superseded);
        }

        self.notices.success(format!("Updated colour of \"{name}\""));
        Ok(Settled::Applied)
    }

    /// Set the region's manager, or clear it with `None`. Only members whose
    /// role can manage regions are accepted.
    ///
    /// # Errors
    ///
    /// - [`ManagerError::Core`] if the region is unknown.
    /// - [`ManagerError::Validation`] if `manager` is not an eligible member;
    ///   nothing is sent.
    /// - [`ManagerError::Backend`] if the member list cannot be loaded or the
    ///   backend refuses; the previous manager is restored.
    pub async fn assign_manager(
        &mut self,
        id: RegionId,
        manager: Option<UserId>,
    ) -> Result<Settled, ManagerError> {
        if self.tree.region(id).is_none() {
            return Err(CoreError::UnknownRegion(id).into());
        }
        let name = self.region_name(id);

        let manager_name = match manager {
            Some(user) => Some(self.eligible_manager_name(user).await?),
            None => None,
        };
        let (previous_manager, previous_name) =
            self.tree
                .set_region_manager(id, manager, manager_name.clone())?;
        let ticket = self.begin_region_patch(id);

        let result = self.client.assign_region_manager(id, manager).await;
        let failure = format!("Failed to update manager of \"{name}\"");
        let Some(saved) = self.settle_region_patch(ticket, result, &failure, |tree| {
            note_rollback(id, tree.set_region_manager(id, previous_manager, previous_name));
        })?
        else {
            return Ok(Settled::Superseded);
        };

        let confirmed_name = saved.manager_name.or(manager_name);
        self.tree
            .set_region_manager(id, saved.manager, confirmed_name.clone())?;
        match confirmed_name {
            Some(manager) => self
                .notices
                .success(format!("{manager} now manages \"{name}\"")),
            None => self.notices.success(format!("Removed manager of \"{name}\"")),
        }
        Ok(Settled::Applied)
    }

    /// Delete a region after the local pre-flight passes.
    ///
    /// # Errors
    ///
    /// - [`ManagerError::Refused`] if the region or one of its children still
    ///   has stores; nothing is sent.
    /// - [`ManagerError::Backend`] if the backend refuses for its own reasons.
    pub async fn delete_region(&mut self, id: RegionId) -> Result<(), ManagerError> {
        let name = match self.tree.check_delete(id) {
            Ok(region) => region.name.clone(),
            Err(refusal) => {
                self.notices.error(refusal.to_string());
                return Err(refusal.into());
            }
        };

        match self.client.delete_region(id).await {
            Ok(()) => {
                tracing::info!(region = %id, %name, "region deleted");
                self.notices.success(format!("Deleted region \"{name}\""));
                self.reconcile().await;
                Ok(())
            }
            Err(e) => {
                let err = ManagerError::backend(&format!("Failed to delete region \"{name}\""), e);
                self.notices.error(err.to_string());
                Err(err)
            }
        }
    }

    async fn eligible_manager_name(&mut self, user: UserId) -> Result<String, ManagerError> {
        if self.members.is_empty() {
            self.load_directory().await?;
        }
        let member = self
            .members
            .iter()
            .find(|m| m.user.id == user)
            .ok_or_else(|| ValidationError::InvalidField {
                field: "manager",
                reason: format!("user {user} is not a member of this organization"),
            })?;
        if !member.role.can_manage_region() {
            return Err(ValidationError::InvalidField {
                field: "manager",
                reason: format!("{} ({}) cannot manage regions", member.display_name(), member.role),
            }
            .into());
        }
        Ok(member.display_name())
    }

    fn region_name(&self, id: RegionId) -> String {
        self.tree
            .region(id)
            .map_or_else(|| id.to_string(), |r| r.name.clone())
    }

    fn begin_region_patch(&mut self, id: RegionId) -> Ticket {
        self.mark_local_change();
        self.sequencer.issue(EntityKey::Region(id))
    }

    /// `Ok(None)` when a newer patch to the same region was issued meanwhile;
    /// its response decides, so this one is neither applied nor rolled back.
    pub(crate) fn settle_region_patch<T>(
        &mut self,
        ticket: Ticket,
        result: Result<T, ClientError>,
        failure: &str,
        rollback: impl FnOnce(&mut RegionTree),
    ) -> Result<Option<T>, ManagerError> {
        if !self.sequencer.is_current(&ticket) {
            tracing::debug!(entity = ?ticket.key(), "stale region response, dropping");
            return Ok(None);
        }
        match result {
            Ok(value) => Ok(Some(value)),
            Err(e) => {
                rollback(&mut self.tree);
                let message = failure_message(failure, &e);
                self.notices.error(message.clone());
                Err(ManagerError::Backend { message, source: e })
            }
        }
    }
}

fn note_rollback<T>(id: RegionId, restored: Result<T, CoreError>) {
    if let Err(e) = restored {
        tracing::warn!(region = %id, error = %e, "could not restore region after failed update");
    }
}
