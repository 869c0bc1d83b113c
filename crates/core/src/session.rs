//! Edit session state for one open training.
//!
//! Holds two owned copies of the tree: `loaded` (last fetched or saved) and
//! `working` (the live draft). All mutations go through [`EditSession::mutate`]
//! or [`EditSession::try_mutate`], which mark the session dirty whenever an
//! operation runs, whether or not it changed any value.
//!
//! Saving is split in two so the I/O can happen outside any lock:
//! [`EditSession::prepare_save`] captures the change set and the snapshot
//! being sent, and [`EditSession::commit_save`] installs that snapshot as
//! `loaded` once the store has acknowledged it.

use crate::delta::{compute_changes, ModuleChanges};
use crate::error::CoreError;
use crate::module::ModulePatch;
use crate::reorder::{drag_order, reorder_siblings, OrderUpdate};
use crate::step_config::StepPayload;
use crate::tree::{ModuleTree, TreeSnapshot};
use crate::types::{ModuleId, TrainingId};

#[derive(Debug, Clone)]
pub struct EditSession {
    loaded: ModuleTree,
    working: ModuleTree,
    dirty: bool,
    selected: Option<ModuleId>,
    /// Bumped on every mutation and discard.
    generation: u64,
}

/// Everything a save needs, captured at the moment it starts.
#[derive(Debug, Clone)]
pub struct SavePlan {
    pub training_id: TrainingId,
    pub changes: ModuleChanges,
    pub snapshot: ModuleTree,
    pub generation: u64,
}

impl EditSession {
    pub fn new(tree: ModuleTree) -> Self {
        Self {
            loaded: tree.clone(),
            working: tree,
            dirty: false,
            selected: None,
            generation: 0,
        }
    }

    pub fn from_snapshot(snapshot: TreeSnapshot) -> Result<Self, CoreError> {
        ModuleTree::from_snapshot(snapshot).map(Self::new)
    }

    pub fn training_id(&self) -> TrainingId {
        self.working.training_id()
    }

    pub fn loaded(&self) -> &ModuleTree {
        &self.loaded
    }

    pub fn working(&self) -> &ModuleTree {
        &self.working
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn selected(&self) -> Option<ModuleId> {
        self.selected
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    // -----------------------------------------------------------------------
    // Mutation
    // -----------------------------------------------------------------------

    /// Apply an infallible operation to `working`.
    pub fn mutate<R>(&mut self, op: impl FnOnce(&mut ModuleTree) -> R) -> R {
        let result = op(&mut self.working);
        self.touch();
        result
    }

    /// Apply a fallible operation to a copy of `working`. On error the
    /// session (including `dirty`) is left exactly as it was.
    pub fn try_mutate<R>(
        &mut self,
        op: impl FnOnce(&mut ModuleTree) -> Result<R, CoreError>,
    ) -> Result<R, CoreError> {
        let mut next = self.working.clone();
        let result = op(&mut next)?;
        self.working = next;
        self.touch();
        Ok(result)
    }

    fn touch(&mut self) {
        self.dirty = true;
        self.generation += 1;
        self.revalidate_selection();
    }

    pub fn add_module(&mut self, parent_id: Option<ModuleId>) -> Option<ModuleId> {
        self.mutate(|tree| tree.add_module(parent_id))
    }

    pub fn delete_module(&mut self, id: ModuleId) -> Vec<ModuleId> {
        self.mutate(|tree| tree.delete_module(id))
    }

    pub fn duplicate_module(&mut self, id: ModuleId) -> Option<ModuleId> {
        self.mutate(|tree| tree.duplicate_module(id))
    }

    pub fn update_module(&mut self, id: ModuleId, patch: &ModulePatch) -> Result<bool, CoreError> {
        self.try_mutate(|tree| tree.update_module(id, patch))
    }

    pub fn reorder_siblings(
        &mut self,
        parent_id: Option<ModuleId>,
        ordered_ids: &[ModuleId],
    ) -> Result<Vec<OrderUpdate>, CoreError> {
        self.try_mutate(|tree| reorder_siblings(tree, parent_id, ordered_ids))
    }

    /// Drop `active` onto `over`'s position in their shared sibling group.
    ///
    /// A drop onto itself, onto an unknown id or across groups is ignored:
    /// nothing is written and the session stays as it was.
    pub fn drag_module(
        &mut self,
        active: ModuleId,
        over: ModuleId,
    ) -> Result<Vec<OrderUpdate>, CoreError> {
        let Some(ordered) = drag_order(&self.working, active, over) else {
            return Ok(Vec::new());
        };
        let parent_id = self.working.get(active).and_then(|m| m.parent_id);
        self.reorder_siblings(parent_id, &ordered)
    }

    pub fn edit_step_payload<R>(
        &mut self,
        id: ModuleId,
        edit: impl FnOnce(&mut StepPayload) -> R,
    ) -> Result<Option<R>, CoreError> {
        self.try_mutate(|tree| tree.edit_step_payload(id, edit))
    }

    // -----------------------------------------------------------------------
    // Selection
    // -----------------------------------------------------------------------

    /// Select a node (or clear with `None`). Unknown ids are ignored and
    /// the previous selection is kept. Returns whether the selection changed.
    pub fn select(&mut self, id: Option<ModuleId>) -> bool {
        match id {
            Some(id) if !self.working.contains(id) => false,
            _ => {
                let changed = self.selected != id;
                self.selected = id;
                changed
            }
        }
    }

    fn revalidate_selection(&mut self) {
        if let Some(id) = self.selected {
            if !self.working.contains(id) {
                self.selected = None;
            }
        }
    }

    // -----------------------------------------------------------------------
    // Discard / save
    // -----------------------------------------------------------------------

    /// Throw away every unsaved change.
    pub fn discard(&mut self) {
        self.working = self.loaded.clone();
        self.dirty = false;
        self.generation += 1;
        self.revalidate_selection();
    }

    /// Node-level differences between `working` and `loaded`.
    pub fn pending_changes(&self) -> ModuleChanges {
        compute_changes(&self.loaded, &self.working)
    }

    pub fn prepare_save(&self) -> SavePlan {
        SavePlan {
            training_id: self.training_id(),
            changes: self.pending_changes(),
            snapshot: self.working.clone(),
            generation: self.generation,
        }
    }

    /// Record a successful save of `plan`.
    ///
    /// `loaded` becomes the snapshot that was sent. The session is marked
    /// clean if nothing happened after the plan was prepared. Otherwise (a
    /// mutation or a discard ran meanwhile) `dirty` is recomputed against
    /// the new `loaded`.
    pub fn commit_save(&mut self, plan: SavePlan) {
        self.loaded = plan.snapshot;
        self.dirty = self.generation != plan.generation && self.working != self.loaded;
    }

    /// Replace both copies with a freshly fetched tree.
    pub fn reload(&mut self, tree: ModuleTree) {
        *self = Self {
            generation: self.generation + 1,
            ..Self::new(tree)
        };
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
