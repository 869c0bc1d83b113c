//! Sibling reordering.
//!
//! A drag-and-drop gesture yields the full desired order of one sibling
//! group. The engine checks it is a permutation of the current group and
//! computes the minimal set of `order_index` writes.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::tree::ModuleTree;
use crate::types::ModuleId;

/// One `order_index` write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderUpdate {
    pub id: ModuleId,
    pub order_index: i32,
}

/// Compute the writes needed to move `current` into `ordered`.
///
/// `current` is `(id, order_index)` for one sibling group. Only entries whose
/// index actually changes are returned. Fails if `ordered` is not a
/// permutation of the ids in `current`.
pub fn order_updates(
    current: &[(ModuleId, i32)],
    ordered: &[ModuleId],
) -> Result<Vec<OrderUpdate>, CoreError> {
    if ordered.len() != current.len() {
        return Err(CoreError::Validation(format!(
            "Reorder lists {} ids but the group has {}",
            ordered.len(),
            current.len()
        )));
    }
    let known: HashSet<ModuleId> = current.iter().map(|(id, _)| *id).collect();
    let mut seen = HashSet::with_capacity(ordered.len());
    for id in ordered {
        if !known.contains(id) {
            return Err(CoreError::Validation(format!(
                "Module {id} is not part of this sibling group"
            )));
        }
        if !seen.insert(*id) {
            return Err(CoreError::Validation(format!(
                "Module {id} appears more than once in the new order"
            )));
        }
    }

    Ok(ordered
        .iter()
        .enumerate()
        .filter_map(|(index, id)| {
            let index = index as i32;
            let old = current.iter().find(|(cid, _)| cid == id).map(|(_, i)| *i);
            (old != Some(index)).then_some(OrderUpdate {
                id: *id,
                order_index: index,
            })
        })
        .collect())
}

/// Reorder the children of `parent_id` (`None` = top level) to match
/// `ordered_ids`. On error the tree is unchanged.
///
/// Children of a moved top-level module travel with it since they reference
/// their parent by id. Moving a node across parents is not supported.
pub fn reorder_siblings(
    tree: &mut ModuleTree,
    parent_id: Option<ModuleId>,
    ordered_ids: &[ModuleId],
) -> Result<Vec<OrderUpdate>, CoreError> {
    let current: Vec<(ModuleId, i32)> = tree
        .children_of(parent_id)
        .iter()
        .map(|m| (m.id, m.order_index))
        .collect();
    let updates = order_updates(&current, ordered_ids)?;
    if !updates.is_empty() {
        let assignments: Vec<(ModuleId, i32)> =
            updates.iter().map(|u| (u.id, u.order_index)).collect();
        tree.set_order(&assignments);
    }
    Ok(updates)
}

/// Resolve a single drag (`active` dropped onto `over`) into the full new
/// order of their shared sibling group. Returns `None` when the ids are
/// unknown, identical, or in different groups.
pub fn drag_order(tree: &ModuleTree, active: ModuleId, over: ModuleId) -> Option<Vec<ModuleId>> {
    if active == over {
        return None;
    }
    let parent = tree.get(active)?.parent_id;
    if tree.get(over)?.parent_id != parent {
        return None;
    }
    let mut ids = tree.sibling_ids(parent);
    let from = ids.iter().position(|id| *id == active)?;
    let to = ids.iter().position(|id| *id == over)?;
    let moved = ids.remove(from);
    ids.insert(to, moved);
    Some(ids)
}
