//! State machine turning a drag gesture on a store row into at most one
//! region-reassignment request.
//!
//! ```text
//! Idle --start--> Dragging --enter--> OverTarget --drop--> Committing --finish--> Idle
//!                    |                   |   ^  \
//!                    +------cancel-------+   |   +--drop on current region--> Idle
//!                                            +--enter (new candidate)
//! ```

use thiserror::Error;

use crate::ids::{RegionId, StoreId};
use crate::tree::RegionTree;

/// Where a store can be dropped: a real region or the synthetic unassigned bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropTarget {
    Region(RegionId),
    Unassigned,
}

impl DropTarget {
    #[must_use]
    pub fn region(self) -> Option<RegionId> {
        match self {
            DropTarget::Region(id) => Some(id),
            DropTarget::Unassigned => None,
        }
    }
}

impl From<Option<RegionId>> for DropTarget {
    fn from(region: Option<RegionId>) -> Self {
        region.map_or(DropTarget::Unassigned, DropTarget::Region)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DragState {
    #[default]
    Idle,
    Dragging {
        store: StoreId,
    },
    OverTarget {
        store: StoreId,
        target: DropTarget,
    },
    Committing {
        store: StoreId,
        from: Option<RegionId>,
        to: Option<RegionId>,
    },
}

/// The single update a drop turns into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoveRequest {
    pub store: StoreId,
    pub from: Option<RegionId>,
    pub to: Option<RegionId>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropOutcome {
    /// Dropped outside any target, or nothing was being dragged.
    Ignored,
    /// Dropped on the region the store already belongs to.
    NoOp,
    Commit(MoveRequest),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum DragError {
    #[error("a drag is already in progress for store {0}")]
    Busy(StoreId),

    #[error("store {0} is not in the hierarchy")]
    UnknownStore(StoreId),

    #[error("no store is being dragged")]
    NotDragging,
}

#[derive(Debug, Clone, Default)]
pub struct DragController {
    state: DragState,
}

impl DragController {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn state(&self) -> DragState {
        self.state
    }

    #[must_use]
    pub fn is_idle(&self) -> bool {
        self.state == DragState::Idle
    }

    /// Store currently being dragged or committed, if any.
    #[must_use]
    pub fn active_store(&self) -> Option<StoreId> {
        match self.state {
            DragState::Idle => None,
            DragState::Dragging { store }
            | DragState::OverTarget { store, .. }
            | DragState::Committing { store, .. } => Some(store),
        }
    }

    /// # Errors
    ///
    /// Returns [`DragError::Busy`] unless the controller is idle.
    pub fn start(&mut self, store: StoreId) -> Result<(), DragError> {
        if let Some(active) = self.active_store() {
            return Err(DragError::Busy(active));
        }
        self.state = DragState::Dragging { store };
        Ok(())
    }

    /// Pointer entered a droppable row. Entering another row replaces the candidate.
    ///
    /// # Errors
    ///
    /// Returns [`DragError::NotDragging`] when no gesture is in progress.
    pub fn enter(&mut self, target: DropTarget) -> Result<(), DragError> {
        match self.state {
            DragState::Dragging { store } | DragState::OverTarget { store, .. } => {
                self.state = DragState::OverTarget { store, target };
                Ok(())
            }
            DragState::Idle | DragState::Committing { .. } => Err(DragError::NotDragging),
        }
    }

    /// Gesture ended without a drop. Discards the candidate; no-op while committing.
    pub fn cancel(&mut self) {
        if matches!(
            self.state,
            DragState::Dragging { .. } | DragState::OverTarget { .. }
        ) {
            self.state = DragState::Idle;
        }
    }

    /// Resolve a drop against the store's current region in `tree`.
    ///
    /// # Errors
    ///
    /// Returns [`DragError::UnknownStore`] if the dragged store is no longer
    /// in the tree; the controller is reset to idle.
    pub fn drop(&mut self, tree: &RegionTree) -> Result<DropOutcome, DragError> {
        let DragState::OverTarget { store, target } = self.state else {
            if matches!(self.state, DragState::Dragging { .. }) {
                self.state = DragState::Idle;
            }
            return Ok(DropOutcome::Ignored);
        };

        let Some(current) = tree.store(store) else {
            self.state = DragState::Idle;
            return Err(DragError::UnknownStore(store));
        };

        let from = current.region;
        let to = target.region();
        if from == to {
            self.state = DragState::Idle;
            return Ok(DropOutcome::NoOp);
        }

        self.state = DragState::Committing { store, from, to };
        Ok(DropOutcome::Commit(MoveRequest { store, from, to }))
    }

    /// The move request resolved, successfully or not.
    pub fn finish(&mut self) {
        if matches!(self.state, DragState::Committing { .. }) {
            self.state = DragState::Idle;
        }
    }
}
