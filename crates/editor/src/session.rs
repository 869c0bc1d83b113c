//! Edit session controller.
//!
//! Wraps one [`EditSession`] behind a mutex that is never held across an
//! await. Store I/O happens between [`EditSession::prepare_save`] and
//! [`EditSession::commit_save`], so the working tree stays editable while a
//! save is in flight.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use questline_core::delta::ModuleChanges;
use questline_core::error::CoreError;
use questline_core::module::{Module, ModulePatch};
use questline_core::reorder::OrderUpdate;
use questline_core::session::EditSession;
use questline_core::step_config::StepPayload;
use questline_core::store::ContentStore;
use questline_core::tree::ModuleTree;
use questline_core::types::{ModuleId, TrainingId};
use questline_events::{kinds, EditorEvent, EventBus};
use serde::Serialize;
use serde_json::json;

use crate::error::{EditorError, EditorResult};

// ---------------------------------------------------------------------------
// Views
// ---------------------------------------------------------------------------

/// One node of the rendered tree.
#[derive(Debug, Clone, Serialize)]
pub struct ModuleView {
    #[serde(flatten)]
    pub module: Module,
    /// 0 for top-level modules, 1 for steps.
    pub depth: u8,
    /// Whether the active step payload has its minimum authored content.
    pub step_ready: bool,
}

impl ModuleView {
    fn from_module(module: &Module) -> Self {
        Self {
            depth: u8::from(!module.is_top_level()),
            step_ready: module.active_payload().is_some_and(StepPayload::is_complete),
            module: module.clone(),
        }
    }
}

/// Snapshot of the session for rendering.
#[derive(Debug, Clone, Serialize)]
pub struct SessionView {
    pub training_id: TrainingId,
    pub dirty: bool,
    pub saving: bool,
    pub selected_id: Option<ModuleId>,
    /// Working tree in render order.
    pub modules: Vec<ModuleView>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SaveOutcome {
    pub upserted: usize,
    pub deleted: usize,
    /// Still dirty because the tree changed while the save was in flight.
    pub dirty: bool,
}

// ---------------------------------------------------------------------------
// Controller
// ---------------------------------------------------------------------------

pub struct SessionController {
    store: Arc<dyn ContentStore>,
    events: Arc<EventBus>,
    session: Mutex<Option<EditSession>>,
    saving: AtomicBool,
}

/// Clears the in-flight flag when a save finishes, however it finishes.
struct SavingFlag<'a>(&'a AtomicBool);

impl Drop for SavingFlag<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

impl SessionController {
    pub fn new(store: Arc<dyn ContentStore>, events: Arc<EventBus>) -> Self {
        Self {
            store,
            events,
            session: Mutex::new(None),
            saving: AtomicBool::new(false),
        }
    }

    fn with_session<R>(
        &self,
        f: impl FnOnce(&mut EditSession) -> EditorResult<R>,
    ) -> EditorResult<R> {
        let mut guard = self
            .session
            .lock()
            .map_err(|_| CoreError::Internal("Edit session lock poisoned".into()))?;
        let session = guard.as_mut().ok_or(EditorError::NoSession)?;
        f(session)
    }

    fn publish(&self, event_type: &str, training_id: TrainingId, payload: serde_json::Value) {
        self.events.publish(
            EditorEvent::new(event_type)
                .with_training(training_id)
                .with_payload(payload),
        );
    }

    // -----------------------------------------------------------------------
    // Load / view
    // -----------------------------------------------------------------------

    /// Fetch a training's tree and make it both the loaded and working copy.
    ///
    /// Refused while a save is in flight.
    pub async fn load(&self, training_id: TrainingId) -> EditorResult<SessionView> {
        if self.is_saving() {
            return Err(EditorError::SaveInProgress(training_id));
        }
        let snapshot = self.store.fetch(training_id).await?;
        let tree = ModuleTree::from_snapshot(snapshot)?;
        let count = tree.len();
        {
            let mut guard = self
                .session
                .lock()
                .map_err(|_| CoreError::Internal("Edit session lock poisoned".into()))?;
            match guard.as_mut() {
                Some(existing) => existing.reload(tree),
                None => *guard = Some(EditSession::new(tree)),
            }
        }
        tracing::info!(%training_id, modules = count, "Loaded edit session");
        self.publish(kinds::SESSION_LOADED, training_id, json!({ "modules": count }));
        self.view()
    }

    pub fn view(&self) -> EditorResult<SessionView> {
        let saving = self.is_saving();
        self.with_session(|s| {
            Ok(SessionView {
                training_id: s.training_id(),
                dirty: s.is_dirty(),
                saving,
                selected_id: s.selected(),
                modules: s
                    .working()
                    .flatten()
                    .into_iter()
                    .map(ModuleView::from_module)
                    .collect(),
            })
        })
    }

    pub fn training_id(&self) -> EditorResult<TrainingId> {
        self.with_session(|s| Ok(s.training_id()))
    }

    pub fn is_dirty(&self) -> EditorResult<bool> {
        self.with_session(|s| Ok(s.is_dirty()))
    }

    pub fn is_saving(&self) -> bool {
        self.saving.load(Ordering::SeqCst)
    }

    pub fn pending_changes(&self) -> EditorResult<ModuleChanges> {
        self.with_session(|s| Ok(s.pending_changes()))
    }

    // -----------------------------------------------------------------------
    // Mutations
    // -----------------------------------------------------------------------

    /// Run an operation against the session and announce the change.
    pub fn mutate<R>(
        &self,
        op: impl FnOnce(&mut EditSession) -> Result<R, CoreError>,
    ) -> EditorResult<R> {
        let (result, training_id, generation) = self.with_session(|s| {
            let result = op(s)?;
            Ok((result, s.training_id(), s.generation()))
        })?;
        tracing::debug!(%training_id, generation, "Working tree mutated");
        self.publish(
            kinds::SESSION_MUTATED,
            training_id,
            json!({ "generation": generation }),
        );
        Ok(result)
    }

    pub fn add_module(&self, parent_id: Option<ModuleId>) -> EditorResult<Option<ModuleId>> {
        self.mutate(|s| Ok(s.add_module(parent_id)))
    }

    pub fn delete_module(&self, id: ModuleId) -> EditorResult<Vec<ModuleId>> {
        self.mutate(|s| Ok(s.delete_module(id)))
    }

    pub fn duplicate_module(&self, id: ModuleId) -> EditorResult<Option<ModuleId>> {
        self.mutate(|s| Ok(s.duplicate_module(id)))
    }

    pub fn update_module(&self, id: ModuleId, patch: &ModulePatch) -> EditorResult<bool> {
        self.mutate(|s| s.update_module(id, patch))
    }

    pub fn reorder_siblings(
        &self,
        parent_id: Option<ModuleId>,
        ordered_ids: &[ModuleId],
    ) -> EditorResult<Vec<OrderUpdate>> {
        self.mutate(|s| s.reorder_siblings(parent_id, ordered_ids))
    }

    pub fn drag_module(&self, active: ModuleId, over: ModuleId) -> EditorResult<Vec<OrderUpdate>> {
        let (updates, training_id, generation) = self.with_session(|s| {
            let updates = s.drag_module(active, over)?;
            Ok((updates, s.training_id(), s.generation()))
        })?;
        if !updates.is_empty() {
            tracing::debug!(%training_id, generation, moved = %active, "Working tree mutated");
            self.publish(
                kinds::SESSION_MUTATED,
                training_id,
                json!({ "generation": generation }),
            );
        }
        Ok(updates)
    }

    pub fn edit_step_payload<R>(
        &self,
        id: ModuleId,
        edit: impl FnOnce(&mut StepPayload) -> R,
    ) -> EditorResult<Option<R>> {
        self.mutate(|s| s.edit_step_payload(id, edit))
    }

    /// Change the selection. Not a tree mutation: the session stays clean.
    pub fn select(&self, id: Option<ModuleId>) -> EditorResult<Option<ModuleId>> {
        self.with_session(|s| {
            s.select(id);
            Ok(s.selected())
        })
    }

    pub fn discard(&self) -> EditorResult<()> {
        let training_id = self.with_session(|s| {
            s.discard();
            Ok(s.training_id())
        })?;
        tracing::info!(%training_id, "Discarded unsaved changes");
        self.publish(kinds::SESSION_DISCARDED, training_id, json!({}));
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Save
    // -----------------------------------------------------------------------

    /// Send the working tree's changes to the content store.
    ///
    /// On success `loaded` becomes the snapshot that was sent. On failure
    /// the session is untouched and the call can simply be repeated. Only one
    /// save may be outstanding; a second one gets
    /// [`EditorError::SaveInProgress`].
    pub async fn save(&self) -> EditorResult<SaveOutcome> {
        let training_id = self.training_id()?;
        if self
            .saving
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return Err(EditorError::SaveInProgress(training_id));
        }
        let _flag = SavingFlag(&self.saving);

        let plan = self.with_session(|s| Ok(s.prepare_save()))?;
        let upserts = plan.changes.upserts();
        let deleted = plan.changes.deleted.clone();

        let result = self.write_changes(training_id, &upserts, &deleted).await;
        if let Err(e) = result {
            tracing::warn!(%training_id, error = %e, "Save failed; working tree kept");
            self.publish(
                kinds::SESSION_SAVE_FAILED,
                training_id,
                json!({ "error": e.to_string() }),
            );
            return Err(e.into());
        }

        let dirty = self.with_session(|s| {
            s.commit_save(plan);
            Ok(s.is_dirty())
        })?;
        let outcome = SaveOutcome {
            upserted: upserts.len(),
            deleted: deleted.len(),
            dirty,
        };
        tracing::info!(
            %training_id,
            upserted = outcome.upserted,
            deleted = outcome.deleted,
            "Saved edit session"
        );
        self.publish(
            kinds::SESSION_SAVED,
            training_id,
            json!({ "upserted": outcome.upserted, "deleted": outcome.deleted }),
        );
        Ok(outcome)
    }

    async fn write_changes(
        &self,
        training_id: TrainingId,
        upserts: &[Module],
        deleted: &[ModuleId],
    ) -> Result<(), CoreError> {
        if !upserts.is_empty() {
            self.store.upsert_modules(training_id, upserts).await?;
        }
        if !deleted.is_empty() {
            self.store.delete_modules(training_id, deleted).await?;
        }
        Ok(())
    }
}
