//! Drag-and-drop store reassignment.

use storescore_client::{ClientError, StoreScoreClient};
use storescore_core::{CoreError, DropOutcome, DropTarget, MoveRequest, Store, StoreId};

use crate::error::{failure_message, ManagerError};
use crate::manager::RegionManager;
use crate::sequence::{EntityKey, Ticket};

/// A move whose request has been issued but not yet resolved.
#[derive(Debug, Clone, Copy)]
pub struct PendingMove {
    pub request: MoveRequest,
    ticket: Ticket,
}

/// What a drop turned into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveOutcome {
    /// Dropped outside any target.
    Ignored,
    /// Dropped on the region the store is already in; nothing was sent.
    Unchanged,
    Moved(MoveRequest),
    Superseded(MoveRequest),
}

impl RegionManager {
    /// # Errors
    ///
    /// - [`ManagerError::Drag`] if another store is already being dragged or
    ///   committed.
    /// - [`ManagerError::Core`] if the store is not in the tree.
    pub fn start_drag(&mut self, store: StoreId) -> Result<(), ManagerError> {
        if self.tree.store(store).is_none() {
            return Err(CoreError::UnknownStore(store).into());
        }
        self.drag.start(store)?;
        Ok(())
    }

    /// # Errors
    ///
    /// - [`ManagerError::Drag`] when no drag is in progress.
    /// - [`ManagerError::Core`] if the target region is not in the tree; the
    ///   drag is cancelled.
    pub fn drag_enter(&mut self, target: DropTarget) -> Result<(), ManagerError> {
        if let DropTarget::Region(id) = target {
            if self.tree.region(id).is_none() {
                self.drag.cancel();
                return Err(CoreError::UnknownRegion(id).into());
            }
        }
        self.drag.enter(target)?;
        Ok(())
    }

    pub fn cancel_drag(&mut self) {
        self.drag.cancel();
    }

    /// Resolve the current drag. A drop on the store's own region sends
    /// nothing; any other target sends exactly one reassignment request.
    ///
    /// On success the store is moved in the local tree, a success notice is
    /// raised and a background refresh reconciles counts. On failure an error
    /// notice names the store and the tree is left as it was.
    ///
    /// # Errors
    ///
    /// - [`ManagerError::Drag`] if the dragged store vanished from the tree.
    /// - [`ManagerError::Core`] if the target region vanished; nothing is sent.
    /// - [`ManagerError::Backend`] if the backend refused the move.
    pub async fn drop_store(&mut self) -> Result<MoveOutcome, ManagerError> {
        let request = match self.drag.drop(&self.tree)? {
            DropOutcome::Ignored => return Ok(MoveOutcome::Ignored),
            DropOutcome::NoOp => return Ok(MoveOutcome::Unchanged),
            DropOutcome::Commit(request) => request,
        };
        if let Some(to) = request.to {
            if self.tree.region(to).is_none() {
                self.drag.finish();
                return Err(CoreError::UnknownRegion(to).into());
            }
        }

        let pending = self.begin_move(request);
        let result = send_move(&self.client, request).await;
        self.drag.finish();
        let outcome = self.finish_move(pending, result)?;
        if matches!(outcome, MoveOutcome::Moved(_)) {
            self.reconcile().await;
        }
        Ok(outcome)
    }

    /// Tag a move with a sequence number for its store.
    pub fn begin_move(&mut self, request: MoveRequest) -> PendingMove {
        PendingMove {
            request,
            ticket: self.sequencer.issue(EntityKey::Store(request.store)),
        }
    }

    /// Apply a move's response. Responses for a store that has since been
    /// moved again are dropped without a notice.
    ///
    /// # Errors
    ///
    /// Returns [`ManagerError::Backend`] when `result` is a failure for the
    /// store's latest move; an error notice is raised as well.
    pub fn finish_move(
        &mut self,
        pending: PendingMove,
        result: Result<Store, ClientError>,
    ) -> Result<MoveOutcome, ManagerError> {
        let request = pending.request;
        if !self.sequencer.is_current(&pending.ticket) {
            tracing::debug!(store = %request.store, "stale move response, dropping");
            return Ok(MoveOutcome::Superseded(request));
        }

        let store_name = self
            .tree
            .store(request.store)
            .map_or_else(|| request.store.to_string(), |s| s.name.clone());

        match result {
            Ok(_) => {
                self.tree.reassign_store(request.store, request.to)?;
                self.mark_local_change();
                let target = request
                    .to
                    .and_then(|id| self.tree.region(id))
                    .map_or_else(|| "Unassigned".to_owned(), |r| r.name.clone());
                self.notices
                    .success(format!("Moved \"{store_name}\" to {target}"));
                Ok(MoveOutcome::Moved(request))
            }
            Err(e) => {
                let message = failure_message(&format!("Failed to move \"{store_name}\""), &e);
                self.notices.error(message.clone());
                Err(ManagerError::Backend { message, source: e })
            }
        }
    }
}

async fn send_move(client: &StoreScoreClient, request: MoveRequest) -> Result<Store, ClientError> {
    tracing::info!(
        store = %request.store,
        from = ?request.from,
        to = ?request.to,
        "moving store"
    );
    client.set_store_region(request.store, request.to).await
}
