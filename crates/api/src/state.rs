use std::collections::HashMap;
use std::sync::Arc;

use questline_core::error::CoreError;
use questline_core::store::{AssetStore, ContentStore, ReferenceCatalog};
use questline_core::types::TrainingId;
use questline_core::wizard::WizardFlow;
use questline_editor::{EditorError, SessionController, SessionView, WizardController};
use questline_events::EventBus;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::config::ServerConfig;
use crate::error::{AppError, AppResult};

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheaply cloneable: every field is behind an `Arc` or is already `Clone`.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ServerConfig>,
    /// Database pool, present only when running against PostgreSQL.
    pub pool: Option<questline_db::DbPool>,
    pub content: Arc<dyn ContentStore>,
    pub assets: Arc<dyn AssetStore>,
    pub catalog: Arc<dyn ReferenceCatalog>,
    pub event_bus: Arc<EventBus>,
    /// Open edit sessions keyed by training.
    pub sessions: Arc<RwLock<HashMap<TrainingId, Arc<SessionController>>>>,
    /// Open creation wizards keyed by wizard id.
    pub wizards: Arc<RwLock<HashMap<Uuid, Arc<WizardController>>>>,
}

impl AppState {
    pub fn new(
        config: ServerConfig,
        pool: Option<questline_db::DbPool>,
        content: Arc<dyn ContentStore>,
        assets: Arc<dyn AssetStore>,
        catalog: Arc<dyn ReferenceCatalog>,
        event_bus: Arc<EventBus>,
    ) -> Self {
        Self {
            config: Arc::new(config),
            pool,
            content,
            assets,
            catalog,
            event_bus,
            sessions: Arc::default(),
            wizards: Arc::default(),
        }
    }

    // -----------------------------------------------------------------------
    // Sessions
    // -----------------------------------------------------------------------

    /// Load (or reload) the session for a training.
    ///
    /// A new controller is registered only once its first load succeeds, so
    /// an unknown training never leaves an empty session behind.
    pub async fn open_session(&self, training_id: TrainingId) -> AppResult<SessionView> {
        let existing = self.sessions.read().await.get(&training_id).cloned();
        if let Some(controller) = existing {
            return Ok(controller.load(training_id).await?);
        }

        let controller = Arc::new(SessionController::new(
            Arc::clone(&self.content),
            Arc::clone(&self.event_bus),
        ));
        let view = controller.load(training_id).await?;
        self.sessions
            .write()
            .await
            .entry(training_id)
            .or_insert(controller);
        Ok(view)
    }

    pub async fn session(&self, training_id: TrainingId) -> AppResult<Arc<SessionController>> {
        self.sessions
            .read()
            .await
            .get(&training_id)
            .cloned()
            .ok_or(AppError::Editor(EditorError::NoSession))
    }

    /// Drop the session for a training. Unsaved edits are discarded.
    pub async fn close_session(&self, training_id: TrainingId) -> bool {
        self.sessions.write().await.remove(&training_id).is_some()
    }

    // -----------------------------------------------------------------------
    // Wizards
    // -----------------------------------------------------------------------

    pub async fn start_wizard(&self) -> Arc<WizardController> {
        let controller = Arc::new(WizardController::new(
            WizardFlow::standard(),
            Arc::clone(&self.content),
            Arc::clone(&self.assets),
            Arc::clone(&self.event_bus),
            self.config.thumbnail_bucket.clone(),
        ));
        self.wizards
            .write()
            .await
            .insert(controller.id(), Arc::clone(&controller));
        controller
    }

    pub async fn wizard(&self, id: Uuid) -> AppResult<Arc<WizardController>> {
        self.wizards
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or(AppError::Core(CoreError::NotFound {
                entity: "Wizard",
                id,
            }))
    }

    pub async fn close_wizard(&self, id: Uuid) -> Option<Arc<WizardController>> {
        self.wizards.write().await.remove(&id)
    }
}
