//! Training creation wizard controller.
//!
//! The draft lives only in memory. Thumbnail uploads run without holding the
//! wizard lock, so several may be in flight; whichever resolves last sets
//! the draft field. Submission persists the training and then resets.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use questline_core::error::CoreError;
use questline_core::store::{AssetStore, ContentStore};
use questline_core::training::Training;
use questline_core::wizard::{BackOutcome, DraftPatch, Wizard, WizardFlow, WizardStatus};
use questline_events::{kinds, EditorEvent, EventBus};
use serde_json::json;
use uuid::Uuid;

use crate::error::EditorResult;

pub struct WizardController {
    id: Uuid,
    wizard: Mutex<Wizard>,
    content: Arc<dyn ContentStore>,
    assets: Arc<dyn AssetStore>,
    events: Arc<EventBus>,
    thumbnail_bucket: String,
    submitting: AtomicBool,
}

impl WizardController {
    pub fn new(
        flow: WizardFlow,
        content: Arc<dyn ContentStore>,
        assets: Arc<dyn AssetStore>,
        events: Arc<EventBus>,
        thumbnail_bucket: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            wizard: Mutex::new(Wizard::new(flow)),
            content,
            assets,
            events,
            thumbnail_bucket: thumbnail_bucket.into(),
            submitting: AtomicBool::new(false),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    fn lock(&self) -> Result<MutexGuard<'_, Wizard>, CoreError> {
        self.wizard
            .lock()
            .map_err(|_| CoreError::Internal("Wizard lock poisoned".into()))
    }

    fn publish(&self, event_type: &str, payload: serde_json::Value) {
        self.events.publish(
            EditorEvent::new(event_type)
                .with_wizard(self.id)
                .with_payload(payload),
        );
    }

    pub fn status(&self) -> EditorResult<WizardStatus> {
        Ok(self.lock()?.status())
    }

    pub fn update_draft(&self, patch: &DraftPatch) -> EditorResult<WizardStatus> {
        let mut wizard = self.lock()?;
        wizard.update_draft(patch)?;
        Ok(wizard.status())
    }

    pub fn next(&self) -> EditorResult<WizardStatus> {
        let mut wizard = self.lock()?;
        let step = wizard.next()?;
        tracing::debug!(wizard_id = %self.id, step = step.as_str(), "Wizard advanced");
        Ok(wizard.status())
    }

    /// Go back one step; from the first step this cancels the wizard.
    pub async fn back(&self) -> EditorResult<BackOutcome> {
        let (outcome, thumbnail) = {
            let mut wizard = self.lock()?;
            let thumbnail = wizard.draft().thumbnail_url.clone();
            (wizard.back(), thumbnail)
        };
        if outcome == BackOutcome::Cancelled {
            self.after_cancel(thumbnail).await;
        }
        Ok(outcome)
    }

    /// Drop the draft. An already uploaded thumbnail is removed best-effort.
    pub async fn cancel(&self) -> EditorResult<()> {
        let thumbnail = {
            let mut wizard = self.lock()?;
            let thumbnail = wizard.draft().thumbnail_url.clone();
            wizard.reset();
            thumbnail
        };
        self.after_cancel(thumbnail).await;
        Ok(())
    }

    async fn after_cancel(&self, thumbnail: Option<String>) {
        if let Some(url) = thumbnail {
            if let Err(e) = self.assets.remove(&self.thumbnail_bucket, &url).await {
                tracing::warn!(wizard_id = %self.id, error = %e, "Failed to remove orphaned thumbnail");
            }
        }
        tracing::info!(wizard_id = %self.id, "Wizard cancelled");
        self.publish(kinds::WIZARD_CANCELLED, json!({}));
    }

    // -----------------------------------------------------------------------
    // Assets
    // -----------------------------------------------------------------------

    /// Upload a thumbnail and point the draft at it once stored.
    ///
    /// If the wizard was cancelled or submitted while the upload ran, the
    /// stored file is removed again and the call fails with a conflict.
    pub async fn upload_thumbnail(&self, file_name: &str, bytes: &[u8]) -> EditorResult<String> {
        let epoch = self.lock()?.epoch();
        let url = self
            .assets
            .upload(&self.thumbnail_bucket, file_name, bytes)
            .await?;
        let stale = {
            let mut wizard = self.lock()?;
            let stale = wizard.epoch() != epoch;
            if !stale {
                wizard.set_thumbnail(Some(url.clone()));
            }
            stale
        };
        if stale {
            if let Err(e) = self.assets.remove(&self.thumbnail_bucket, &url).await {
                tracing::warn!(wizard_id = %self.id, error = %e, "Failed to remove stale thumbnail");
            }
            return Err(CoreError::Conflict("Wizard was reset during the upload".into()).into());
        }
        tracing::info!(wizard_id = %self.id, url = %url, "Thumbnail uploaded");
        self.publish(
            kinds::ASSET_UPLOADED,
            json!({ "bucket": self.thumbnail_bucket, "url": url }),
        );
        Ok(url)
    }

    /// Delete the current thumbnail and clear the draft field. A no-op when
    /// the draft has none.
    pub async fn remove_thumbnail(&self) -> EditorResult<WizardStatus> {
        let current = self.lock()?.draft().thumbnail_url.clone();
        let Some(url) = current else {
            return self.status();
        };
        self.assets.remove(&self.thumbnail_bucket, &url).await?;

        let mut wizard = self.lock()?;
        if wizard.draft().thumbnail_url.as_deref() == Some(url.as_str()) {
            wizard.set_thumbnail(None);
        }
        Ok(wizard.status())
    }

    // -----------------------------------------------------------------------
    // Submit
    // -----------------------------------------------------------------------

    /// Persist the draft as a new training and reset the wizard.
    ///
    /// On failure the wizard keeps its step and draft so the call can be
    /// retried.
    pub async fn submit(&self) -> EditorResult<Training> {
        if self
            .submitting
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return Err(CoreError::Conflict("Submission already in progress".into()).into());
        }
        let result = self.submit_inner().await;
        self.submitting.store(false, Ordering::SeqCst);
        result
    }

    async fn submit_inner(&self) -> EditorResult<Training> {
        let new_training = self.lock()?.materialize()?;
        let training = match self.content.create_training(new_training).await {
            Ok(training) => training,
            Err(e) => {
                tracing::warn!(wizard_id = %self.id, error = %e, "Training submission failed");
                return Err(e.into());
            }
        };

        self.lock()?.reset();
        tracing::info!(wizard_id = %self.id, training_id = %training.id, "Training created");
        self.publish(
            kinds::WIZARD_SUBMITTED,
            json!({ "training_id": training.id, "name": training.name }),
        );
        Ok(training)
    }
}
