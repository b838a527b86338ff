//! Region hierarchy manager: owns the local tree and mediates every change
//! between the view and the backend.
//!
//! All state lives behind `&mut self`; the view drives it one operation at a
//! time and reads the tree, drag state and notices back out. Hosts that run
//! requests on their own tasks use the split `begin_*`/`finish_*` calls so
//! stale responses can still be told apart from current ones.

use std::collections::HashMap;

use storescore_client::StoreScoreClient;
use storescore_core::{
    active_departments, eligible_managers, walk_counts, AppConfig, Department, DragController,
    DragState, Member, Region, RegionTree, Store, StoreId, WalkCounts,
};

use crate::error::ManagerError;
use crate::notice::NoticeLog;
use crate::sequence::{CancelHandle, Sequencer};

/// Whether a response changed local state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Settled {
    Applied,
    /// A newer request for the same entity (or a newer load) was issued
    /// first, or the owner went away; the response was dropped.
    Superseded,
}

/// Ticket for one stores+regions load.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RefreshTicket(u64);

pub struct RegionManager {
    pub(crate) client: StoreScoreClient,
    pub(crate) tree: RegionTree,
    pub(crate) drag: DragController,
    pub(crate) members: Vec<Member>,
    pub(crate) departments: Vec<Department>,
    pub(crate) notices: NoticeLog,
    pub(crate) sequencer: Sequencer,
    issued_generation: u64,
    applied_generation: u64,
    cancel: CancelHandle,
}

impl RegionManager {
    #[must_use]
    pub fn new(client: StoreScoreClient) -> Self {
        Self {
            client,
            tree: RegionTree::default(),
            drag: DragController::new(),
            members: Vec::new(),
            departments: Vec::new(),
            notices: NoticeLog::default(),
            sequencer: Sequencer::default(),
            issued_generation: 0,
            applied_generation: 0,
            cancel: CancelHandle::default(),
        }
    }

    /// # Errors
    ///
    /// Returns [`ManagerError::Backend`] if the HTTP client cannot be built
    /// from `config`.
    pub fn from_config(config: &AppConfig) -> Result<Self, ManagerError> {
        let client = StoreScoreClient::from_config(config)
            .map_err(|e| ManagerError::backend("Failed to create API client", e))?;
        Ok(Self::new(client))
    }

    #[must_use]
    pub fn client(&self) -> &StoreScoreClient {
        &self.client
    }

    #[must_use]
    pub fn tree(&self) -> &RegionTree {
        &self.tree
    }

    #[must_use]
    pub fn drag_state(&self) -> DragState {
        self.drag.state()
    }

    #[must_use]
    pub fn notices(&self) -> &NoticeLog {
        &self.notices
    }

    pub fn notices_mut(&mut self) -> &mut NoticeLog {
        &mut self.notices
    }

    /// Handle the owner keeps to stop in-flight loads from being applied.
    #[must_use]
    pub fn cancel_handle(&self) -> CancelHandle {
        self.cancel.clone()
    }

    #[must_use]
    pub fn members(&self) -> &[Member] {
        &self.members
    }

    /// Members whose role lets them manage a region.
    #[must_use]
    pub fn eligible_managers(&self) -> Vec<&Member> {
        eligible_managers(&self.members)
    }

    /// Departments offered as checkboxes on the store form.
    #[must_use]
    pub fn active_departments(&self) -> Vec<&Department> {
        active_departments(&self.departments)
    }

    /// Start a stores+regions load.
    pub fn begin_refresh(&mut self) -> RefreshTicket {
        self.issued_generation += 1;
        RefreshTicket(self.issued_generation)
    }

    /// Rebuild the tree from a completed load, unless a newer load or local
    /// change has already been applied or the owner cancelled.
    pub fn apply_refresh(
        &mut self,
        ticket: RefreshTicket,
        stores: &[Store],
        regions: &[Region],
    ) -> Settled {
        if self.cancel.is_cancelled() {
            tracing::debug!(generation = ticket.0, "load finished after teardown, dropping");
            return Settled::Superseded;
        }
        if ticket.0 < self.applied_generation {
            tracing::debug!(
                generation = ticket.0,
                applied = self.applied_generation,
                "stale load, dropping"
            );
            return Settled::Superseded;
        }
        self.applied_generation = ticket.0;
        self.tree = RegionTree::build(stores, regions);
        tracing::debug!(
            generation = ticket.0,
            stores = stores.len(),
            regions = self.tree.regions().len(),
            "tree rebuilt"
        );
        Settled::Applied
    }

    /// Loads issued before a local change carry data older than the change.
    pub(crate) fn mark_local_change(&mut self) {
        self.issued_generation += 1;
        self.applied_generation = self.issued_generation;
    }

    /// Fetch stores and regions concurrently and rebuild the tree.
    ///
    /// # Errors
    ///
    /// Returns [`ManagerError::Backend`] if either list fails to load; an
    /// error notice is raised as well.
    pub async fn refresh(&mut self) -> Result<Settled, ManagerError> {
        let ticket = self.begin_refresh();
        let loaded = tokio::try_join!(self.client.list_stores(), self.client.list_regions());
        match loaded {
            Ok((stores, regions)) => Ok(self.apply_refresh(ticket, &stores, &regions)),
            Err(e) => {
                if self.cancel.is_cancelled() {
                    return Ok(Settled::Superseded);
                }
                let err = ManagerError::backend("Failed to load regions", e);
                self.notices.error(err.to_string());
                Err(err)
            }
        }
    }

    /// Refresh after a successful mutation to pick up derived counts. A
    /// failure here only gets logged; the mutation itself already succeeded.
    pub(crate) async fn reconcile(&mut self) {
        let ticket = self.begin_refresh();
        match tokio::try_join!(self.client.list_stores(), self.client.list_regions()) {
            Ok((stores, regions)) => {
                self.apply_refresh(ticket, &stores, &regions);
            }
            Err(e) => tracing::warn!(error = %e, "background refresh failed"),
        }
    }

    /// Load the member and department pickers.
    ///
    /// # Errors
    ///
    /// Returns [`ManagerError::Backend`] if either list fails to load.
    pub async fn load_directory(&mut self) -> Result<(), ManagerError> {
        let (members, departments) =
            tokio::try_join!(self.client.list_members(), self.client.list_departments())
                .map_err(|e| ManagerError::backend("Failed to load members", e))?;
        if self.cancel.is_cancelled() {
            return Ok(());
        }
        self.members = members;
        self.departments = departments;
        Ok(())
    }

    /// Completed/total walk counts per store, for display next to each row.
    ///
    /// # Errors
    ///
    /// Returns [`ManagerError::Backend`] if the walk list fails to load.
    pub async fn walk_counts(&self) -> Result<HashMap<StoreId, WalkCounts>, ManagerError> {
        let walks = self
            .client
            .list_walks(None)
            .await
            .map_err(|e| ManagerError::backend("Failed to load walks", e))?;
        Ok(walk_counts(&walks))
    }
}
