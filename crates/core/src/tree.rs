//! Two-level module tree stored as a flat arena.
//!
//! Nodes are kept in a map keyed by id; the rendered hierarchy is derived by
//! grouping on `parent_id` and sorting by `order_index`. Every structural
//! mutation re-sequences the affected sibling group to `0..n` and recomputes
//! `numbering`.
//!
//! Mutations referencing an unknown id are silent no-ops: ids always come
//! from the currently rendered tree, so a miss is an internal-consistency
//! concern rather than a user error.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::CoreError;
use crate::module::{Module, ModulePatch};
use crate::step_config::StepPayload;
use crate::types::{ModuleId, TrainingId};

/// Wire form of a tree as exchanged with the content store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreeSnapshot {
    pub training_id: TrainingId,
    pub modules: Vec<Module>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ModuleTree {
    training_id: TrainingId,
    nodes: BTreeMap<ModuleId, Module>,
}

impl ModuleTree {
    pub fn new(training_id: TrainingId) -> Self {
        Self {
            training_id,
            nodes: BTreeMap::new(),
        }
    }

    /// Build a tree from a stored snapshot.
    ///
    /// Rejects duplicate ids, dangling parents and nodes nested deeper than
    /// two levels. Gaps or duplicates in `order_index` are repaired by
    /// re-sequencing each group in its stored order, and the result must
    /// pass [`ModuleTree::validate_structure`].
    pub fn from_snapshot(snapshot: TreeSnapshot) -> Result<Self, CoreError> {
        let mut tree = Self::new(snapshot.training_id);
        for module in snapshot.modules {
            let id = module.id;
            if tree.nodes.insert(id, module).is_some() {
                return Err(CoreError::Validation(format!(
                    "Duplicate module id {id} in snapshot"
                )));
            }
        }
        tree.check_hierarchy()?;

        let parents: Vec<Option<ModuleId>> = std::iter::once(None)
            .chain(tree.top_level_ids().into_iter().map(Some))
            .collect();
        for parent in parents {
            tree.resequence(parent);
        }
        tree.renumber();
        tree.validate_structure()?;
        Ok(tree)
    }

    pub fn to_snapshot(&self) -> TreeSnapshot {
        TreeSnapshot {
            training_id: self.training_id,
            modules: self.flatten().into_iter().cloned().collect(),
        }
    }

    pub fn training_id(&self) -> TrainingId {
        self.training_id
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    pub fn get(&self, id: ModuleId) -> Option<&Module> {
        self.nodes.get(&id)
    }

    pub fn contains(&self, id: ModuleId) -> bool {
        self.nodes.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Unordered iteration over every node.
    pub fn modules(&self) -> impl Iterator<Item = &Module> {
        self.nodes.values()
    }

    /// Siblings under `parent_id` (`None` = top level) in render order.
    pub fn children_of(&self, parent_id: Option<ModuleId>) -> Vec<&Module> {
        let mut children: Vec<&Module> = self
            .nodes
            .values()
            .filter(|m| m.parent_id == parent_id)
            .collect();
        children.sort_by_key(|m| m.order_index);
        children
    }

    pub fn top_level(&self) -> Vec<&Module> {
        self.children_of(None)
    }

    /// Ids of a sibling group in render order.
    pub fn sibling_ids(&self, parent_id: Option<ModuleId>) -> Vec<ModuleId> {
        self.children_of(parent_id).into_iter().map(|m| m.id).collect()
    }

    /// Every node in render order: each top-level module followed by its steps.
    pub fn flatten(&self) -> Vec<&Module> {
        let mut out = Vec::with_capacity(self.nodes.len());
        for top in self.top_level() {
            out.push(top);
            out.extend(self.children_of(Some(top.id)));
        }
        out
    }

    fn top_level_ids(&self) -> Vec<ModuleId> {
        self.sibling_ids(None)
    }

    // -----------------------------------------------------------------------
    // Mutations
    // -----------------------------------------------------------------------

    /// Append a new module at the end of the group under `parent_id`.
    ///
    /// Returns `None` (and changes nothing) if the parent is unknown or is
    /// itself a child: the tree never grows past two levels.
    pub fn add_module(&mut self, parent_id: Option<ModuleId>) -> Option<ModuleId> {
        if let Some(pid) = parent_id {
            match self.nodes.get(&pid) {
                Some(parent) if parent.is_top_level() => {}
                _ => return None,
            }
        }
        let id = Uuid::new_v4();
        let order_index = self.group_len(parent_id);
        self.nodes.insert(id, Module::new(id, parent_id, order_index));
        self.renumber();
        Some(id)
    }

    /// Delete a module. Deleting a top-level module removes its whole step
    /// group. Returns the removed ids (empty for an unknown id).
    pub fn delete_module(&mut self, id: ModuleId) -> Vec<ModuleId> {
        let Some(module) = self.nodes.remove(&id) else {
            return Vec::new();
        };
        let mut removed = vec![id];
        if module.is_top_level() {
            let children: Vec<ModuleId> = self
                .nodes
                .values()
                .filter(|m| m.parent_id == Some(id))
                .map(|m| m.id)
                .collect();
            for child in children {
                self.nodes.remove(&child);
                removed.push(child);
            }
        }
        self.resequence(module.parent_id);
        self.renumber();
        removed
    }

    /// Clone a module (all fields except id and position) and append the
    /// copy at the end of the source's sibling group. Steps of a duplicated
    /// top-level module are not copied.
    pub fn duplicate_module(&mut self, id: ModuleId) -> Option<ModuleId> {
        let source = self.nodes.get(&id)?;
        let new_id = Uuid::new_v4();
        let mut copy = source.clone();
        copy.id = new_id;
        copy.order_index = self.group_len(source.parent_id);
        self.nodes.insert(new_id, copy);
        self.renumber();
        Some(new_id)
    }

    /// Apply a partial update. `Ok(false)` for an unknown id; `Err` if the
    /// patch fails field validation, in which case the node is unchanged.
    pub fn update_module(&mut self, id: ModuleId, patch: &ModulePatch) -> Result<bool, CoreError> {
        match self.nodes.get_mut(&id) {
            Some(module) => module.apply_patch(patch).map(|()| true),
            None => Ok(false),
        }
    }

    /// Edit the active step payload of a module with typed helpers (e.g.
    /// removing a quiz question).
    ///
    /// The edit runs on a copy that must pass validation before replacing
    /// the stored payload. Returns `Ok(None)` for an unknown id.
    pub fn edit_step_payload<R>(
        &mut self,
        id: ModuleId,
        edit: impl FnOnce(&mut StepPayload) -> R,
    ) -> Result<Option<R>, CoreError> {
        let Some(module) = self.nodes.get_mut(&id) else {
            return Ok(None);
        };
        let step_type = module.step_type;
        let mut payload = module.step_config.ensure(step_type).clone();
        let result = edit(&mut payload);
        payload.validate()?;
        module.step_config.insert(step_type, payload)?;
        Ok(Some(result))
    }

    /// Assign `order_index` values directly. Used by the reorder engine after
    /// it has validated the permutation.
    pub(crate) fn set_order(&mut self, assignments: &[(ModuleId, i32)]) {
        for (id, index) in assignments {
            if let Some(module) = self.nodes.get_mut(id) {
                module.order_index = *index;
            }
        }
        self.renumber();
    }

    // -----------------------------------------------------------------------
    // Invariant maintenance
    // -----------------------------------------------------------------------

    fn group_len(&self, parent_id: Option<ModuleId>) -> i32 {
        self.nodes
            .values()
            .filter(|m| m.parent_id == parent_id)
            .count() as i32
    }

    /// Re-sequence a sibling group to `0..n`, keeping its relative order.
    fn resequence(&mut self, parent_id: Option<ModuleId>) {
        let ids = self.sibling_ids(parent_id);
        for (index, id) in ids.into_iter().enumerate() {
            if let Some(module) = self.nodes.get_mut(&id) {
                module.order_index = index as i32;
            }
        }
    }

    /// Recompute `numbering` for every node from the current order.
    fn renumber(&mut self) {
        let mut labels = Vec::with_capacity(self.nodes.len());
        for (i, top) in self.top_level().into_iter().enumerate() {
            let prefix = (i + 1).to_string();
            for (j, child) in self.children_of(Some(top.id)).into_iter().enumerate() {
                labels.push((child.id, format!("{prefix}.{}", j + 1)));
            }
            labels.push((top.id, prefix));
        }
        for (id, label) in labels {
            if let Some(module) = self.nodes.get_mut(&id) {
                module.numbering = label;
            }
        }
    }

    fn check_hierarchy(&self) -> Result<(), CoreError> {
        for module in self.nodes.values() {
            let Some(pid) = module.parent_id else {
                continue;
            };
            match self.nodes.get(&pid) {
                None => {
                    return Err(CoreError::Validation(format!(
                        "Module {} references missing parent {pid}",
                        module.id
                    )))
                }
                Some(parent) if !parent.is_top_level() => {
                    return Err(CoreError::Validation(format!(
                        "Module {} is nested more than two levels deep",
                        module.id
                    )))
                }
                Some(_) => {}
            }
        }
        Ok(())
    }

    /// Check every tree invariant: two-level depth, no dangling parents, and
    /// contiguous `0..n` ordering within each sibling group.
    pub fn validate_structure(&self) -> Result<(), CoreError> {
        self.check_hierarchy()?;
        let mut groups: Vec<Option<ModuleId>> = vec![None];
        groups.extend(self.top_level_ids().into_iter().map(Some));
        for parent in groups {
            let indices: Vec<i32> = self
                .children_of(parent)
                .iter()
                .map(|m| m.order_index)
                .collect();
            let expected: Vec<i32> = (0..indices.len() as i32).collect();
            if indices != expected {
                return Err(CoreError::Validation(format!(
                    "Sibling group {parent:?} has non-contiguous order {indices:?}"
                )));
            }
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::step_config::StepType;
    use serde_json::json;

    fn tree() -> ModuleTree {
        ModuleTree::new(Uuid::new_v4())
    }

    fn orders(tree: &ModuleTree, parent: Option<ModuleId>) -> Vec<i32> {
        tree.children_of(parent).iter().map(|m| m.order_index).collect()
    }

    // -- add --

    #[test]
    fn add_appends_to_end_of_group() {
        let mut t = tree();
        let a = t.add_module(None).unwrap();
        let b = t.add_module(None).unwrap();
        assert_eq!(t.sibling_ids(None), vec![a, b]);
        assert_eq!(orders(&t, None), vec![0, 1]);
    }

    #[test]
    fn add_child_under_top_level() {
        let mut t = tree();
        let parent = t.add_module(None).unwrap();
        let child = t.add_module(Some(parent)).unwrap();
        assert_eq!(t.get(child).unwrap().parent_id, Some(parent));
        assert_eq!(t.get(child).unwrap().numbering, "1.1");
    }

    #[test]
    fn add_under_child_is_rejected() {
        let mut t = tree();
        let parent = t.add_module(None).unwrap();
        let child = t.add_module(Some(parent)).unwrap();
        assert_eq!(t.add_module(Some(child)), None);
        assert_eq!(t.len(), 2);
    }

    #[test]
    fn add_under_unknown_parent_is_noop() {
        let mut t = tree();
        assert_eq!(t.add_module(Some(Uuid::new_v4())), None);
        assert!(t.is_empty());
    }

    // -- delete --

    #[test]
    fn delete_top_level_cascades_to_children() {
        let mut t = tree();
        let parent = t.add_module(None).unwrap();
        let c1 = t.add_module(Some(parent)).unwrap();
        let c2 = t.add_module(Some(parent)).unwrap();
        let other = t.add_module(None).unwrap();

        let removed = t.delete_module(parent);

        assert_eq!(removed.len(), 3);
        assert!(removed.contains(&c1) && removed.contains(&c2));
        assert_eq!(t.sibling_ids(None), vec![other]);
        assert_eq!(t.get(other).unwrap().order_index, 0);
        assert_eq!(t.get(other).unwrap().numbering, "1");
    }

    #[test]
    fn delete_child_resequences_siblings() {
        let mut t = tree();
        let parent = t.add_module(None).unwrap();
        let c1 = t.add_module(Some(parent)).unwrap();
        let c2 = t.add_module(Some(parent)).unwrap();
        let c3 = t.add_module(Some(parent)).unwrap();

        t.delete_module(c1);

        assert_eq!(t.sibling_ids(Some(parent)), vec![c2, c3]);
        assert_eq!(orders(&t, Some(parent)), vec![0, 1]);
        assert_eq!(t.get(c3).unwrap().numbering, "1.2");
        assert!(t.contains(parent));
    }

    #[test]
    fn delete_unknown_is_noop() {
        let mut t = tree();
        t.add_module(None);
        let before = t.clone();
        assert!(t.delete_module(Uuid::new_v4()).is_empty());
        assert_eq!(t, before);
    }

    #[test]
    fn add_then_delete_restores_sibling_order() {
        let mut t = tree();
        let parent = t.add_module(None).unwrap();
        for _ in 0..3 {
            t.add_module(Some(parent));
        }
        let before: Vec<(ModuleId, i32)> = t
            .children_of(Some(parent))
            .iter()
            .map(|m| (m.id, m.order_index))
            .collect();

        let added = t.add_module(Some(parent)).unwrap();
        t.delete_module(added);

        let after: Vec<(ModuleId, i32)> = t
            .children_of(Some(parent))
            .iter()
            .map(|m| (m.id, m.order_index))
            .collect();
        assert_eq!(before, after);
    }

    // -- duplicate --

    #[test]
    fn duplicate_copies_fields_and_appends() {
        let mut t = tree();
        let a = t.add_module(None).unwrap();
        t.add_module(None).unwrap();
        t.update_module(
            a,
            &ModulePatch {
                name: Some("Onboarding".into()),
                xp_reward: Some(50),
                step_type: Some(StepType::Quiz),
                ..Default::default()
            },
        )
        .unwrap();

        let copy_id = t.duplicate_module(a).unwrap();
        let source = t.get(a).unwrap().clone();
        let copy = t.get(copy_id).unwrap();

        assert_ne!(copy.id, source.id);
        assert_eq!(copy.order_index, 2);
        assert_eq!(copy.numbering, "3");
        assert_eq!(copy.name, source.name);
        assert_eq!(copy.step_type, source.step_type);
        assert_eq!(copy.step_config, source.step_config);
        assert_eq!(copy.xp_reward, source.xp_reward);
        assert_eq!(copy.parent_id, source.parent_id);
    }

    #[test]
    fn duplicate_child_stays_in_group() {
        let mut t = tree();
        let parent = t.add_module(None).unwrap();
        let child = t.add_module(Some(parent)).unwrap();
        let copy = t.duplicate_module(child).unwrap();
        assert_eq!(t.sibling_ids(Some(parent)), vec![child, copy]);
    }

    #[test]
    fn duplicate_unknown_is_noop() {
        let mut t = tree();
        assert_eq!(t.duplicate_module(Uuid::new_v4()), None);
    }

    // -- update --

    #[test]
    fn update_unknown_returns_false() {
        let mut t = tree();
        let patch = ModulePatch {
            name: Some("x".into()),
            ..Default::default()
        };
        assert!(!t.update_module(Uuid::new_v4(), &patch).unwrap());
    }

    #[test]
    fn update_with_empty_patch_is_identity() {
        let mut t = tree();
        let a = t.add_module(None).unwrap();
        let before = t.clone();
        assert!(t.update_module(a, &ModulePatch::default()).unwrap());
        assert_eq!(t, before);
    }

    // -- edit_step_payload --

    #[test]
    fn edit_step_payload_applies_typed_edit() {
        let mut t = tree();
        let a = t.add_module(None).unwrap();
        t.update_module(
            a,
            &ModulePatch {
                step_type: Some(StepType::Quiz),
                ..Default::default()
            },
        )
        .unwrap();

        let added = t
            .edit_step_payload(a, |payload| match payload {
                StepPayload::Quiz(quiz) => Some(quiz.add_question()),
                _ => None,
            })
            .unwrap()
            .flatten();

        assert!(added.is_some());
        let value = t.get(a).unwrap().active_payload().unwrap().to_value();
        assert_eq!(value["questions"].as_array().unwrap().len(), 1);
    }

    #[test]
    fn edit_step_payload_rolls_back_invalid_edit() {
        let mut t = tree();
        let a = t.add_module(None).unwrap();
        t.update_module(
            a,
            &ModulePatch {
                step_type: Some(StepType::ArenaGame),
                ..Default::default()
            },
        )
        .unwrap();
        let before = t.clone();

        let result = t.edit_step_payload(a, |payload| {
            if let StepPayload::ArenaGame(game) = payload {
                game.min_score = Some(500);
            }
        });

        assert!(result.is_err());
        assert_eq!(t, before);
    }

    // -- flatten / numbering --

    #[test]
    fn flatten_is_depth_first_render_order() {
        let mut t = tree();
        let a = t.add_module(None).unwrap();
        let b = t.add_module(None).unwrap();
        let b1 = t.add_module(Some(b)).unwrap();
        let a1 = t.add_module(Some(a)).unwrap();
        let a2 = t.add_module(Some(a)).unwrap();

        let ids: Vec<ModuleId> = t.flatten().iter().map(|m| m.id).collect();
        assert_eq!(ids, vec![a, a1, a2, b, b1]);

        let labels: Vec<&str> = t.flatten().iter().map(|m| m.numbering.as_str()).collect();
        assert_eq!(labels, vec!["1", "1.1", "1.2", "2", "2.1"]);
    }

    // -- snapshots --

    #[test]
    fn snapshot_roundtrip() {
        let mut t = tree();
        let a = t.add_module(None).unwrap();
        t.add_module(Some(a));
        t.add_module(None);
        let back = ModuleTree::from_snapshot(t.to_snapshot()).unwrap();
        assert_eq!(back, t);
        assert!(back.validate_structure().is_ok());
    }

    #[test]
    fn from_snapshot_repairs_order_gaps() {
        let training_id = Uuid::new_v4();
        let mut m1 = Module::new(Uuid::new_v4(), None, 4);
        m1.name = "second".into();
        let mut m2 = Module::new(Uuid::new_v4(), None, 1);
        m2.name = "first".into();
        let t = ModuleTree::from_snapshot(TreeSnapshot {
            training_id,
            modules: vec![m1.clone(), m2.clone()],
        })
        .unwrap();
        assert_eq!(t.sibling_ids(None), vec![m2.id, m1.id]);
        assert!(t.validate_structure().is_ok());
    }

    #[test]
    fn from_snapshot_rejects_dangling_parent() {
        let orphan = Module::new(Uuid::new_v4(), Some(Uuid::new_v4()), 0);
        let result = ModuleTree::from_snapshot(TreeSnapshot {
            training_id: Uuid::new_v4(),
            modules: vec![orphan],
        });
        assert!(result.is_err());
    }

    #[test]
    fn from_snapshot_rejects_third_level() {
        let top = Module::new(Uuid::new_v4(), None, 0);
        let step = Module::new(Uuid::new_v4(), Some(top.id), 0);
        let nested = Module::new(Uuid::new_v4(), Some(step.id), 0);
        let result = ModuleTree::from_snapshot(TreeSnapshot {
            training_id: Uuid::new_v4(),
            modules: vec![top, step, nested],
        });
        assert!(result.is_err());
    }

    #[test]
    fn snapshot_serializes_module_config() {
        let mut t = tree();
        let a = t.add_module(None).unwrap();
        t.update_module(
            a,
            &ModulePatch {
                step_config: Some(json!({"content_data": {"text": "Hi"}})),
                ..Default::default()
            },
        )
        .unwrap();
        let value = serde_json::to_value(t.to_snapshot()).unwrap();
        assert_eq!(
            value["modules"][0]["step_config"]["content"]["content_data"]["text"],
            "Hi"
        );
    }
}
