//! Plain-text rendering of the region tree and lookup lists.
//!
//! Every function returns the text instead of printing it so the layout can
//! be asserted in tests.

use std::collections::{HashMap, HashSet};

use storescore_core::{Department, Member, Region, RegionId, RegionTree, Store, StoreId, WalkCounts};

const NONE: &str = "\u{2014}";

/// Options for [`render_tree`].
#[derive(Debug, Default)]
pub(crate) struct TreeView<'a> {
    /// Regions shown folded: header only, no stores or children.
    pub collapsed: HashSet<RegionId>,
    pub collapse_all: bool,
    pub walks: Option<&'a HashMap<StoreId, WalkCounts>>,
}

impl TreeView<'_> {
    fn is_collapsed(&self, id: RegionId) -> bool {
        self.collapse_all || self.collapsed.contains(&id)
    }
}

/// Top-level regions in backend order, each followed by its own stores and
/// then its children, and finally the unassigned bucket.
pub(crate) fn render_tree(tree: &RegionTree, view: &TreeView<'_>) -> String {
    let mut lines = Vec::new();
    for region in tree.top_level_regions() {
        region_block(&mut lines, tree, region, 0, view);
        if view.is_collapsed(region.id) {
            continue;
        }
        for child in tree.children_of(region.id) {
            region_block(&mut lines, tree, child, 1, view);
        }
    }

    let unassigned = tree.unassigned_stores();
    lines.push(format!("Unassigned ({})", unassigned.len()));
    for store in unassigned {
        lines.push(store_line(store, 1, view.walks));
    }
    lines.join("\n")
}

fn region_block(
    lines: &mut Vec<String>,
    tree: &RegionTree,
    region: &Region,
    depth: usize,
    view: &TreeView<'_>,
) {
    let collapsed = view.is_collapsed(region.id);
    lines.push(region_header(tree, region, depth, collapsed));
    if collapsed {
        return;
    }
    for store in tree.stores_for_region(region.id) {
        lines.push(store_line(store, depth + 1, view.walks));
    }
}

fn region_header(tree: &RegionTree, region: &Region, depth: usize, collapsed: bool) -> String {
    let marker = if collapsed { "[+]" } else { "[-]" };
    let has_children = !tree.children_of(region.id).is_empty();
    let count = if has_children {
        format!(
            "{} stores ({} incl. sub-regions)",
            region.store_count,
            tree.total_store_count(region.id)
        )
    } else {
        format!("{} stores", region.store_count)
    };
    format!(
        "{}{marker} {} ({})  [{}]  {count}  manager: {}",
        indent(depth),
        region.name,
        region.id,
        region.color,
        region.manager_name.as_deref().unwrap_or(NONE)
    )
}

fn store_line(store: &Store, depth: usize, walks: Option<&HashMap<StoreId, WalkCounts>>) -> String {
    let mut line = format!("{}- {} ({})", indent(depth), store.name, store.id);
    if !store.store_number.is_empty() {
        line.push_str(&format!(" #{}", store.store_number));
    }
    let address = store.address_line();
    if !address.is_empty() {
        line.push_str(&format!("  {address}"));
    }
    if let Some(walks) = walks {
        let counts = walks.get(&store.id).copied().unwrap_or_default();
        line.push_str(&format!("  walks {}/{}", counts.completed, counts.total));
    }
    line
}

fn indent(depth: usize) -> String {
    "  ".repeat(depth)
}

/// Which stores `stores` lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum StoreFilter {
    All,
    Region(RegionId),
    Unassigned,
}

pub(crate) fn render_store_table(tree: &RegionTree, filter: StoreFilter) -> String {
    let stores: Vec<&Store> = match filter {
        StoreFilter::All => tree.stores().iter().collect(),
        StoreFilter::Region(id) => tree.stores_for_region(id),
        StoreFilter::Unassigned => tree.unassigned_stores(),
    };
    if stores.is_empty() {
        return "no stores found".to_owned();
    }

    let mut lines = vec![format!(
        "{:<7}{:<26}{:<9}{:<18}{:<12}{:<10}ADDRESS",
        "ID", "NAME", "NUMBER", "REGION", "CHECK-IN", "STATUS"
    )];
    for store in stores {
        let region = store
            .region
            .and_then(|id| tree.region(id))
            .map_or(NONE, |r| r.name.as_str());
        let status = if store.is_active { "active" } else { "inactive" };
        let number = if store.store_number.is_empty() {
            NONE
        } else {
            store.store_number.as_str()
        };
        lines.push(format!(
            "{:<7}{:<26}{:<9}{:<18}{:<12}{:<10}{}",
            store.id.to_string(),
            truncate(&store.name, 24),
            number,
            truncate(region, 16),
            store.verification_method.label(),
            status,
            store.address_line()
        ));
    }
    lines.join("\n")
}

pub(crate) fn render_members(members: &[&Member]) -> String {
    if members.is_empty() {
        return "no members found".to_owned();
    }
    let mut lines = vec![format!(
        "{:<9}{:<28}{:<18}CAN MANAGE",
        "USER", "NAME", "ROLE"
    )];
    for member in members {
        let eligible = if member.role.can_manage_region() { "yes" } else { "no" };
        lines.push(format!(
            "{:<9}{:<28}{:<18}{eligible}",
            member.user.id.to_string(),
            truncate(&member.display_name(), 26),
            member.role.to_string()
        ));
    }
    lines.join("\n")
}

pub(crate) fn render_departments(departments: &[&Department]) -> String {
    if departments.is_empty() {
        return "no departments found".to_owned();
    }
    let mut lines = vec![format!("{:<7}NAME", "ID")];
    for department in departments {
        lines.push(format!("{:<7}{}", department.id.to_string(), department.name));
    }
    lines.join("\n")
}

/// Store locations, or a notice when no maps key is configured.
pub(crate) fn render_map(tree: &RegionTree, maps_enabled: bool) -> String {
    if !maps_enabled {
        return "Map view is unavailable: set STORESCORE_MAPS_API_KEY to enable it.".to_owned();
    }
    let (located, missing): (Vec<&Store>, Vec<&Store>) = tree
        .stores()
        .iter()
        .filter(|s| s.is_active)
        .partition(|s| s.has_coordinates());

    let mut lines = Vec::new();
    for store in &located {
        if let (Some(lat), Some(lng)) = (store.latitude, store.longitude) {
            lines.push(format!("{:<26}{lat}, {lng}", truncate(&store.name, 24)));
        }
    }
    if !missing.is_empty() {
        lines.push(format!(
            "{} store(s) without coordinates; geocode them with `store geocode <ID>`",
            missing.len()
        ));
    }
    if lines.is_empty() {
        return "no active stores".to_owned();
    }
    lines.join("\n")
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() > max {
        format!("{}...", s.chars().take(max.saturating_sub(3)).collect::<String>())
    } else {
        s.to_owned()
    }
}
