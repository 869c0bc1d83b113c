//! Per-node change set between two snapshots of the same tree.

use std::collections::BTreeSet;

use serde::Serialize;

use crate::module::Module;
use crate::tree::ModuleTree;
use crate::types::ModuleId;

/// What a save must send to the content store. Created and updated entries
/// carry the full node state; the store never receives field-level diffs.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ModuleChanges {
    pub created: Vec<Module>,
    pub updated: Vec<Module>,
    pub deleted: Vec<ModuleId>,
}

impl ModuleChanges {
    pub fn is_empty(&self) -> bool {
        self.created.is_empty() && self.updated.is_empty() && self.deleted.is_empty()
    }

    pub fn len(&self) -> usize {
        self.created.len() + self.updated.len() + self.deleted.len()
    }

    /// Nodes to upsert: created first, then updated, each in render order.
    pub fn upserts(&self) -> Vec<Module> {
        self.created.iter().chain(&self.updated).cloned().collect()
    }
}

/// Compare `working` against `loaded` node by node.
///
/// A node present in both with any differing field (including `order_index`
/// or `numbering`) is reported as updated.
pub fn compute_changes(loaded: &ModuleTree, working: &ModuleTree) -> ModuleChanges {
    let mut changes = ModuleChanges::default();

    for module in working.flatten() {
        match loaded.get(module.id) {
            None => changes.created.push(module.clone()),
            Some(before) if before != module => changes.updated.push(module.clone()),
            Some(_) => {}
        }
    }

    // Children first so a store with parent foreign keys can apply in order.
    let remaining: BTreeSet<ModuleId> = working.modules().map(|m| m.id).collect();
    let mut deleted: Vec<&Module> = loaded
        .modules()
        .filter(|m| !remaining.contains(&m.id))
        .collect();
    deleted.sort_by_key(|m| m.is_top_level());
    changes.deleted = deleted.into_iter().map(|m| m.id).collect();

    changes
}
