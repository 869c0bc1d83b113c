//! Collaborator interfaces consumed by the editor.
//!
//! Implementations live in `questline-db` (PostgreSQL, filesystem and
//! in-memory). Every failure is reported as a recoverable
//! [`CoreError::Store`] (or `NotFound`); callers retry by re-invoking.

use async_trait::async_trait;

use crate::catalog::{CatalogEntry, CatalogKind};
use crate::error::CoreError;
use crate::module::Module;
use crate::training::{NewTraining, Training};
use crate::tree::TreeSnapshot;
use crate::types::{ModuleId, TrainingId};

/// Persistent home of trainings and their module trees.
#[async_trait]
pub trait ContentStore: Send + Sync {
    /// Fetch the full module tree of a training.
    async fn fetch(&self, training_id: TrainingId) -> Result<TreeSnapshot, CoreError>;

    /// Insert or overwrite modules. Each entry carries the full node state.
    async fn upsert_modules(
        &self,
        training_id: TrainingId,
        modules: &[Module],
    ) -> Result<(), CoreError>;

    async fn delete_modules(&self, training_id: TrainingId, ids: &[ModuleId])
        -> Result<(), CoreError>;

    async fn create_training(&self, training: NewTraining) -> Result<Training, CoreError>;

    async fn list_trainings(&self) -> Result<Vec<Training>, CoreError>;
}

/// Binary asset storage (thumbnails, uploaded videos and PDFs).
#[async_trait]
pub trait AssetStore: Send + Sync {
    /// Store `bytes` under `bucket` and return the public URL.
    async fn upload(&self, bucket: &str, file_name: &str, bytes: &[u8])
        -> Result<String, CoreError>;

    /// Remove a previously uploaded asset. `path` is the URL or key
    /// returned by [`AssetStore::upload`].
    async fn remove(&self, bucket: &str, path: &str) -> Result<(), CoreError>;
}

#[async_trait]
pub trait ReferenceCatalog: Send + Sync {
    async fn list(&self, kind: CatalogKind) -> Result<Vec<CatalogEntry>, CoreError>;
}
