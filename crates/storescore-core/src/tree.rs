//! In-memory region hierarchy built from the backend's flat store and region lists.
//!
//! Regions and stores live in arenas (`Vec`s in backend order) addressed by
//! slot; per-region store buckets hold slots of *active* stores in ascending
//! order. Reassigning a store moves one slot between two buckets instead of
//! rescanning every store, and keeps the bucket contents identical to what a
//! full rebuild would produce.

use std::collections::HashMap;

use thiserror::Error;

use crate::ids::{RegionId, StoreId, UserId};
use crate::regions::Region;
use crate::stores::Store;
use crate::CoreError;

/// Why a region delete was refused before any request was made.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DeleteRefusal {
    #[error("region {0} not found")]
    UnknownRegion(RegionId),

    #[error("Cannot delete \"{region}\" — it has {count} store(s) assigned")]
    HasStores { region: String, count: u32 },

    #[error("Cannot delete \"{region}\" — child region \"{child}\" has {count} store(s)")]
    ChildHasStores {
        region: String,
        child: String,
        count: u32,
    },
}

#[derive(Debug, Clone, Default)]
pub struct RegionTree {
    regions: Vec<Region>,
    region_slots: HashMap<RegionId, usize>,
    children: HashMap<RegionId, Vec<usize>>,
    stores: Vec<Store>,
    store_slots: HashMap<StoreId, usize>,
    buckets: HashMap<RegionId, Vec<usize>>,
    unassigned: Vec<usize>,
}

impl RegionTree {
    /// Build the hierarchy from flat lists. Inputs are not modified.
    ///
    /// Nested `children` arrays are flattened into the arena unless the same
    /// region also appears in the flat list.
    #[must_use]
    pub fn build(stores: &[Store], regions: &[Region]) -> Self {
        let mut tree = Self::default();

        let mut pending: Vec<Region> = regions.iter().rev().cloned().collect();
        while let Some(mut region) = pending.pop() {
            let nested = std::mem::take(&mut region.children);
            for mut child in nested.into_iter().rev() {
                if child.parent.is_none() {
                    child.parent = Some(region.id);
                }
                pending.push(child);
            }
            if tree.region_slots.contains_key(&region.id) {
                continue;
            }
            tree.region_slots.insert(region.id, tree.regions.len());
            tree.regions.push(region);
        }

        for (slot, region) in tree.regions.iter().enumerate() {
            if let Some(parent) = region.parent {
                if tree.region_slots.contains_key(&parent) {
                    tree.children.entry(parent).or_default().push(slot);
                }
            }
        }

        for store in stores {
            if tree.store_slots.contains_key(&store.id) {
                continue;
            }
            let slot = tree.stores.len();
            tree.store_slots.insert(store.id, slot);
            tree.stores.push(store.clone());
            tree.index_store(slot);
        }

        tree
    }

    /// All regions in arena order.
    #[must_use]
    pub fn regions(&self) -> &[Region] {
        &self.regions
    }

    /// All stores, active or not, in backend order.
    #[must_use]
    pub fn stores(&self) -> &[Store] {
        &self.stores
    }

    #[must_use]
    pub fn region(&self, id: RegionId) -> Option<&Region> {
        self.region_slots.get(&id).map(|&slot| &self.regions[slot])
    }

    #[must_use]
    pub fn store(&self, id: StoreId) -> Option<&Store> {
        self.store_slots.get(&id).map(|&slot| &self.stores[slot])
    }

    /// Regions without a parent, in backend order. A region whose parent is
    /// missing from the payload is shown at the top level rather than dropped.
    #[must_use]
    pub fn top_level_regions(&self) -> Vec<&Region> {
        self.regions
            .iter()
            .filter(|r| r.parent.is_none_or(|p| !self.region_slots.contains_key(&p)))
            .collect()
    }

    #[must_use]
    pub fn children_of(&self, id: RegionId) -> Vec<&Region> {
        self.children
            .get(&id)
            .map(|slots| slots.iter().map(|&s| &self.regions[s]).collect())
            .unwrap_or_default()
    }

    /// Active stores assigned to `id`.
    #[must_use]
    pub fn stores_for_region(&self, id: RegionId) -> Vec<&Store> {
        self.buckets
            .get(&id)
            .map(|slots| slots.iter().map(|&s| &self.stores[s]).collect())
            .unwrap_or_default()
    }

    /// Active stores with no region.
    #[must_use]
    pub fn unassigned_stores(&self) -> Vec<&Store> {
        self.unassigned.iter().map(|&s| &self.stores[s]).collect()
    }

    /// Cached store count of a region plus all of its children.
    #[must_use]
    pub fn total_store_count(&self, id: RegionId) -> u32 {
        let own = self.region(id).map_or(0, |r| r.store_count);
        own + self
            .children_of(id)
            .iter()
            .map(|c| c.store_count)
            .sum::<u32>()
    }

    /// Check whether `id` may be used as a parent for a new region.
    ///
    /// # Errors
    ///
    /// - [`CoreError::UnknownRegion`] if the region does not exist.
    /// - [`CoreError::NestingTooDeep`] if the region is itself a child.
    pub fn check_parent(&self, id: RegionId) -> Result<&Region, CoreError> {
        let region = self.region(id).ok_or(CoreError::UnknownRegion(id))?;
        if region
            .parent
            .is_some_and(|p| self.region_slots.contains_key(&p))
        {
            return Err(CoreError::NestingTooDeep {
                region: region.name.clone(),
            });
        }
        Ok(region)
    }

    /// Advisory pre-flight for deleting a region, based on cached counts.
    ///
    /// # Errors
    ///
    /// Returns a [`DeleteRefusal`] describing why the delete must not be sent.
    pub fn check_delete(&self, id: RegionId) -> Result<&Region, DeleteRefusal> {
        let region = self.region(id).ok_or(DeleteRefusal::UnknownRegion(id))?;
        if region.store_count > 0 {
            return Err(DeleteRefusal::HasStores {
                region: region.name.clone(),
                count: region.store_count,
            });
        }
        if let Some(child) = self.children_of(id).into_iter().find(|c| c.store_count > 0) {
            return Err(DeleteRefusal::ChildHasStores {
                region: region.name.clone(),
                child: child.name.clone(),
                count: child.store_count,
            });
        }
        Ok(region)
    }

    /// Move a store to `to` (or unassign it with `None`), returning the
    /// previous region. Cached `store_count`s of both regions follow along.
    ///
    /// # Errors
    ///
    /// - [`CoreError::UnknownStore`] if the store is not in the tree.
    /// - [`CoreError::UnknownRegion`] if `to` names a region that does not exist.
    pub fn reassign_store(
        &mut self,
        store: StoreId,
        to: Option<RegionId>,
    ) -> Result<Option<RegionId>, CoreError> {
        let slot = *self
            .store_slots
            .get(&store)
            .ok_or(CoreError::UnknownStore(store))?;
        if let Some(region) = to {
            if !self.region_slots.contains_key(&region) {
                return Err(CoreError::UnknownRegion(region));
            }
        }

        let from = self.stores[slot].region;
        if from == to {
            return Ok(from);
        }

        self.unindex_store(slot);
        self.stores[slot].region = to;
        self.index_store(slot);

        if let Some(region) = from.and_then(|id| self.region_mut(id)) {
            region.store_count = region.store_count.saturating_sub(1);
        }
        if let Some(region) = to.and_then(|id| self.region_mut(id)) {
            region.store_count += 1;
        }

        Ok(from)
    }

    /// # Errors
    ///
    /// Returns [`CoreError::UnknownRegion`] if the region does not exist.
    pub fn set_region_name(&mut self, id: RegionId, name: String) -> Result<String, CoreError> {
        let region = self.region_mut(id).ok_or(CoreError::UnknownRegion(id))?;
        Ok(std::mem::replace(&mut region.name, name))
    }

    /// # Errors
    ///
    /// Returns [`CoreError::UnknownRegion`] if the region does not exist.
    pub fn set_region_color(&mut self, id: RegionId, color: String) -> Result<String, CoreError> {
        let region = self.region_mut(id).ok_or(CoreError::UnknownRegion(id))?;
        Ok(std::mem::replace(&mut region.color, color))
    }

    /// Set or clear the manager, returning the previous `(manager, manager_name)`.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::UnknownRegion`] if the region does not exist.
    pub fn set_region_manager(
        &mut self,
        id: RegionId,
        manager: Option<UserId>,
        manager_name: Option<String>,
    ) -> Result<(Option<UserId>, Option<String>), CoreError> {
        let region = self.region_mut(id).ok_or(CoreError::UnknownRegion(id))?;
        let previous = (
            std::mem::replace(&mut region.manager, manager),
            std::mem::replace(&mut region.manager_name, manager_name),
        );
        Ok(previous)
    }

    /// Replace a store's QR token, returning the old one.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::UnknownStore`] if the store is not in the tree.
    pub fn set_store_token(&mut self, id: StoreId, token: String) -> Result<String, CoreError> {
        let slot = *self.store_slots.get(&id).ok_or(CoreError::UnknownStore(id))?;
        Ok(std::mem::replace(
            &mut self.stores[slot].qr_verification_token,
            token,
        ))
    }

    /// Insert a new store or replace an existing one with the saved version.
    ///
    /// Region counts are left to the next refresh; only bucket membership is
    /// updated here.
    pub fn upsert_store(&mut self, store: Store) {
        if let Some(&slot) = self.store_slots.get(&store.id) {
            self.unindex_store(slot);
            self.stores[slot] = store;
            self.index_store(slot);
        } else {
            let slot = self.stores.len();
            self.store_slots.insert(store.id, slot);
            self.stores.push(store);
            self.index_store(slot);
        }
    }

    fn region_mut(&mut self, id: RegionId) -> Option<&mut Region> {
        let slot = *self.region_slots.get(&id)?;
        Some(&mut self.regions[slot])
    }

    fn bucket_for(&mut self, region: Option<RegionId>) -> &mut Vec<usize> {
        match region {
            Some(id) => self.buckets.entry(id).or_default(),
            None => &mut self.unassigned,
        }
    }

    fn index_store(&mut self, slot: usize) {
        let (is_active, region) = (self.stores[slot].is_active, self.stores[slot].region);
        if !is_active {
            return;
        }
        let bucket = self.bucket_for(region);
        if let Err(pos) = bucket.binary_search(&slot) {
            bucket.insert(pos, slot);
        }
    }

    fn unindex_store(&mut self, slot: usize) {
        let region = self.stores[slot].region;
        let bucket = self.bucket_for(region);
        if let Ok(pos) = bucket.binary_search(&slot) {
            bucket.remove(pos);
        }
    }
}

#[cfg(test)]
#[path = "tree_test.rs"]
mod tests;
