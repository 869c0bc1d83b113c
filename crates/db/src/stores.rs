//! PostgreSQL-backed collaborators for the editor.

use async_trait::async_trait;
use questline_core::catalog::{CatalogEntry, CatalogKind};
use questline_core::error::CoreError;
use questline_core::module::Module;
use questline_core::store::{ContentStore, ReferenceCatalog};
use questline_core::training::{NewTraining, Training};
use questline_core::tree::TreeSnapshot;
use questline_core::types::{ModuleId, TrainingId};

use crate::repositories::{CatalogRepo, ModuleRepo, TrainingRepo};
use crate::DbPool;

/// Map a database failure to a recoverable store error.
fn store_error(err: sqlx::Error) -> CoreError {
    tracing::warn!(error = %err, "Content store query failed");
    CoreError::Store(err.to_string())
}

#[derive(Clone)]
pub struct PgContentStore {
    pool: DbPool,
}

impl PgContentStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ContentStore for PgContentStore {
    async fn fetch(&self, training_id: TrainingId) -> Result<TreeSnapshot, CoreError> {
        TrainingRepo::find_by_id(&self.pool, training_id)
            .await
            .map_err(store_error)?
            .ok_or(CoreError::NotFound {
                entity: "Training",
                id: training_id,
            })?;

        let modules = ModuleRepo::list_by_training(&self.pool, training_id)
            .await
            .map_err(store_error)?
            .into_iter()
            .map(|row| row.into_domain())
            .collect();

        Ok(TreeSnapshot {
            training_id,
            modules,
        })
    }

    async fn upsert_modules(
        &self,
        training_id: TrainingId,
        modules: &[Module],
    ) -> Result<(), CoreError> {
        let affected = ModuleRepo::upsert_many(&self.pool, training_id, modules)
            .await
            .map_err(store_error)?;
        TrainingRepo::touch(&self.pool, training_id)
            .await
            .map_err(store_error)?;
        tracing::debug!(%training_id, affected, "Upserted modules");
        Ok(())
    }

    async fn delete_modules(
        &self,
        training_id: TrainingId,
        ids: &[ModuleId],
    ) -> Result<(), CoreError> {
        let affected = ModuleRepo::delete_many(&self.pool, training_id, ids)
            .await
            .map_err(store_error)?;
        tracing::debug!(%training_id, affected, "Deleted modules");
        Ok(())
    }

    async fn create_training(&self, training: NewTraining) -> Result<Training, CoreError> {
        let row = TrainingRepo::create(&self.pool, &training)
            .await
            .map_err(store_error)?;
        Ok(row.into_domain())
    }

    async fn list_trainings(&self) -> Result<Vec<Training>, CoreError> {
        let rows = TrainingRepo::list(&self.pool).await.map_err(store_error)?;
        Ok(rows.into_iter().map(|row| row.into_domain()).collect())
    }
}

#[derive(Clone)]
pub struct PgReferenceCatalog {
    pool: DbPool,
}

impl PgReferenceCatalog {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ReferenceCatalog for PgReferenceCatalog {
    async fn list(&self, kind: CatalogKind) -> Result<Vec<CatalogEntry>, CoreError> {
        let rows = CatalogRepo::list(&self.pool, kind)
            .await
            .map_err(store_error)?;
        Ok(rows.into_iter().map(CatalogEntry::from).collect())
    }
}
