//! In-memory collaborators.
//!
//! Used by tests and by the API server when no `DATABASE_URL` is set. Each
//! store has a failure switch ([`InMemoryContentStore::set_failing`]) so
//! callers can exercise their recoverable-error paths.

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use questline_core::catalog::{CatalogEntry, CatalogKind};
use questline_core::error::CoreError;
use questline_core::module::Module;
use questline_core::store::{AssetStore, ContentStore, ReferenceCatalog};
use questline_core::training::{NewTraining, Training};
use questline_core::tree::TreeSnapshot;
use questline_core::types::{ModuleId, TrainingId};
use tokio::sync::{RwLock, RwLockWriteGuard};

use crate::assets::{sanitize_file_name, validate_bucket};

fn injected_failure(op: &str) -> CoreError {
    CoreError::Store(format!("{op} failed (injected)"))
}

// ---------------------------------------------------------------------------
// Content store
// ---------------------------------------------------------------------------

struct StoredTraining {
    training: Training,
    modules: BTreeMap<ModuleId, Module>,
}

#[derive(Default)]
pub struct InMemoryContentStore {
    trainings: RwLock<HashMap<TrainingId, StoredTraining>>,
    failing: AtomicBool,
    write_calls: AtomicUsize,
    /// Writes take a read guard; [`Self::hold_writes`] takes the write guard
    /// to park them.
    write_gate: RwLock<()>,
}

impl InMemoryContentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a training with an initial module tree.
    pub async fn seed(&self, training: Training, modules: Vec<Module>) {
        let modules = modules.into_iter().map(|m| (m.id, m)).collect();
        self.trainings
            .write()
            .await
            .insert(training.id, StoredTraining { training, modules });
    }

    /// Make every subsequent call fail with a store error until reset.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Number of `upsert_modules` / `delete_modules` calls that reached the store.
    pub fn write_calls(&self) -> usize {
        self.write_calls.load(Ordering::SeqCst)
    }

    /// Park all writes until the returned guard is dropped.
    pub async fn hold_writes(&self) -> RwLockWriteGuard<'_, ()> {
        self.write_gate.write().await
    }

    /// Stored modules of a training in render order.
    pub async fn modules(&self, training_id: TrainingId) -> Vec<Module> {
        let trainings = self.trainings.read().await;
        let Some(stored) = trainings.get(&training_id) else {
            return Vec::new();
        };
        let mut modules: Vec<Module> = stored.modules.values().cloned().collect();
        modules.sort_by_key(|m| (m.parent_id.is_some(), m.parent_id, m.order_index));
        modules
    }

    fn check_failing(&self, op: &str) -> Result<(), CoreError> {
        if self.failing.load(Ordering::SeqCst) {
            tracing::warn!(op, "Injected content store failure");
            return Err(injected_failure(op));
        }
        Ok(())
    }

    async fn begin_write(&self, op: &str) -> Result<(), CoreError> {
        let _gate = self.write_gate.read().await;
        self.write_calls.fetch_add(1, Ordering::SeqCst);
        self.check_failing(op)
    }
}

#[async_trait]
impl ContentStore for InMemoryContentStore {
    async fn fetch(&self, training_id: TrainingId) -> Result<TreeSnapshot, CoreError> {
        self.check_failing("fetch")?;
        if !self.trainings.read().await.contains_key(&training_id) {
            return Err(CoreError::NotFound {
                entity: "Training",
                id: training_id,
            });
        }
        Ok(TreeSnapshot {
            training_id,
            modules: self.modules(training_id).await,
        })
    }

    async fn upsert_modules(
        &self,
        training_id: TrainingId,
        modules: &[Module],
    ) -> Result<(), CoreError> {
        self.begin_write("upsert_modules").await?;
        let mut trainings = self.trainings.write().await;
        let stored = trainings.get_mut(&training_id).ok_or(CoreError::NotFound {
            entity: "Training",
            id: training_id,
        })?;
        for module in modules {
            stored.modules.insert(module.id, module.clone());
        }
        stored.training.updated_at = Utc::now();
        Ok(())
    }

    async fn delete_modules(
        &self,
        training_id: TrainingId,
        ids: &[ModuleId],
    ) -> Result<(), CoreError> {
        self.begin_write("delete_modules").await?;
        let mut trainings = self.trainings.write().await;
        let stored = trainings.get_mut(&training_id).ok_or(CoreError::NotFound {
            entity: "Training",
            id: training_id,
        })?;
        stored
            .modules
            .retain(|id, m| !ids.contains(id) && !m.parent_id.is_some_and(|p| ids.contains(&p)));
        stored.training.updated_at = Utc::now();
        Ok(())
    }

    async fn create_training(&self, training: NewTraining) -> Result<Training, CoreError> {
        self.check_failing("create_training")?;
        let mut trainings = self.trainings.write().await;
        if trainings.contains_key(&training.id) {
            return Err(CoreError::Conflict(format!(
                "Training {} already exists",
                training.id
            )));
        }
        let training = Training::from_new(training, Utc::now());
        trainings.insert(
            training.id,
            StoredTraining {
                training: training.clone(),
                modules: BTreeMap::new(),
            },
        );
        Ok(training)
    }

    async fn list_trainings(&self) -> Result<Vec<Training>, CoreError> {
        self.check_failing("list_trainings")?;
        let mut list: Vec<Training> = self
            .trainings
            .read()
            .await
            .values()
            .map(|s| s.training.clone())
            .collect();
        list.sort_by(|a, b| b.updated_at.cmp(&a.updated_at).then(a.name.cmp(&b.name)));
        Ok(list)
    }
}

// ---------------------------------------------------------------------------
// Asset store
// ---------------------------------------------------------------------------

/// Keeps uploaded bytes in memory and hands out `memory://bucket/key` URLs.
#[derive(Default)]
pub struct InMemoryAssetStore {
    objects: RwLock<HashMap<(String, String), Vec<u8>>>,
    failing: AtomicBool,
    upload_gate: RwLock<()>,
}

pub const MEMORY_URL_SCHEME: &str = "memory://";

impl InMemoryAssetStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Park all uploads until the returned guard is dropped.
    pub async fn hold_uploads(&self) -> RwLockWriteGuard<'_, ()> {
        self.upload_gate.write().await
    }

    pub async fn len(&self) -> usize {
        self.objects.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.objects.read().await.is_empty()
    }

    pub async fn get(&self, bucket: &str, key: &str) -> Option<Vec<u8>> {
        self.objects
            .read()
            .await
            .get(&(bucket.to_string(), key.to_string()))
            .cloned()
    }
}

#[async_trait]
impl AssetStore for InMemoryAssetStore {
    async fn upload(
        &self,
        bucket: &str,
        file_name: &str,
        bytes: &[u8],
    ) -> Result<String, CoreError> {
        let _gate = self.upload_gate.read().await;
        if self.failing.load(Ordering::SeqCst) {
            return Err(injected_failure("upload"));
        }
        validate_bucket(bucket)?;
        let key = format!("{}-{}", uuid::Uuid::new_v4(), sanitize_file_name(file_name));
        self.objects
            .write()
            .await
            .insert((bucket.to_string(), key.clone()), bytes.to_vec());
        Ok(format!("{MEMORY_URL_SCHEME}{bucket}/{key}"))
    }

    async fn remove(&self, bucket: &str, path: &str) -> Result<(), CoreError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(injected_failure("remove"));
        }
        let key = path.rsplit('/').next().unwrap_or(path);
        self.objects
            .write()
            .await
            .remove(&(bucket.to_string(), key.to_string()));
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Reference catalog
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct InMemoryCatalog {
    entries: RwLock<HashMap<CatalogKind, Vec<CatalogEntry>>>,
}

impl InMemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// A small catalog for local runs without a database.
    pub fn seeded() -> Self {
        let entries = HashMap::from([
            (
                CatalogKind::Games,
                vec![
                    CatalogEntry::new("memory-match", "Memory Match", Some("brain")),
                    CatalogEntry::new("speed-quiz", "Speed Quiz", Some("bolt")),
                    CatalogEntry::new("word-hunt", "Word Hunt", Some("search")),
                ],
            ),
            (
                CatalogKind::Skills,
                vec![
                    CatalogEntry::new("communication", "Communication", None),
                    CatalogEntry::new("leadership", "Leadership", None),
                    CatalogEntry::new("negotiation", "Negotiation", None),
                ],
            ),
            (
                CatalogKind::Badges,
                vec![
                    CatalogEntry::new("first-steps", "First Steps", Some("boot")),
                    CatalogEntry::new("finisher", "Finisher", Some("flag")),
                ],
            ),
        ]);
        Self {
            entries: RwLock::new(entries),
        }
    }

    pub async fn insert(&self, kind: CatalogKind, entry: CatalogEntry) {
        self.entries.write().await.entry(kind).or_default().push(entry);
    }
}

#[async_trait]
impl ReferenceCatalog for InMemoryCatalog {
    async fn list(&self, kind: CatalogKind) -> Result<Vec<CatalogEntry>, CoreError> {
        let mut entries = self
            .entries
            .read()
            .await
            .get(&kind)
            .cloned()
            .unwrap_or_default();
        entries.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(entries)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use questline_core::training::{CertificateSettings, TrainingLevel};
    use uuid::Uuid;

    fn new_training(name: &str) -> NewTraining {
        NewTraining {
            id: Uuid::new_v4(),
            name: name.into(),
            description: None,
            category: "Sales".into(),
            level: TrainingLevel::Beginner,
            thumbnail_url: None,
            estimated_hours: 1.5,
            xp_reward: 100,
            coins_reward: 10,
            skill_impacts: Vec::new(),
            badge_relations: Vec::new(),
            item_rewards: Vec::new(),
            evolution_template_id: None,
            certificate: CertificateSettings::default(),
        }
    }

    // -- content store --

    #[tokio::test]
    async fn create_then_fetch_empty_tree() {
        let store = InMemoryContentStore::new();
        let training = store.create_training(new_training("Onboarding")).await.unwrap();

        let snapshot = store.fetch(training.id).await.unwrap();

        assert_eq!(snapshot.training_id, training.id);
        assert!(snapshot.modules.is_empty());
        assert_eq!(store.list_trainings().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn fetch_unknown_training_is_not_found() {
        let store = InMemoryContentStore::new();
        assert_matches!(
            store.fetch(Uuid::new_v4()).await,
            Err(CoreError::NotFound { entity: "Training", .. })
        );
    }

    #[tokio::test]
    async fn upsert_and_delete_cascade() {
        let store = InMemoryContentStore::new();
        let training = store.create_training(new_training("T")).await.unwrap();
        let top = Module::new(Uuid::new_v4(), None, 0);
        let child = Module::new(Uuid::new_v4(), Some(top.id), 0);

        store
            .upsert_modules(training.id, &[top.clone(), child.clone()])
            .await
            .unwrap();
        assert_eq!(store.modules(training.id).await.len(), 2);

        store.delete_modules(training.id, &[top.id]).await.unwrap();
        assert!(store.modules(training.id).await.is_empty());
        assert_eq!(store.write_calls(), 2);
    }

    #[tokio::test]
    async fn failure_switch_rejects_calls() {
        let store = InMemoryContentStore::new();
        let training = store.create_training(new_training("T")).await.unwrap();
        store.set_failing(true);

        assert_matches!(
            store.upsert_modules(training.id, &[]).await,
            Err(CoreError::Store(_))
        );
        assert_matches!(store.fetch(training.id).await, Err(CoreError::Store(_)));

        store.set_failing(false);
        assert!(store.fetch(training.id).await.is_ok());
    }

    // -- asset store --

    #[tokio::test]
    async fn upload_and_remove_asset() {
        let assets = InMemoryAssetStore::new();
        let url = assets
            .upload("training-thumbnails", "cover art.png", b"png")
            .await
            .unwrap();
        assert!(url.starts_with("memory://training-thumbnails/"));
        assert!(url.ends_with("cover_art.png"));
        assert_eq!(assets.len().await, 1);

        assets.remove("training-thumbnails", &url).await.unwrap();
        assert!(assets.is_empty().await);
    }

    #[tokio::test]
    async fn upload_rejects_bad_bucket() {
        let assets = InMemoryAssetStore::new();
        assert_matches!(
            assets.upload("../etc", "x.png", b"").await,
            Err(CoreError::Validation(_))
        );
    }

    // -- catalog --

    #[tokio::test]
    async fn catalog_lists_sorted_by_name() {
        let catalog = InMemoryCatalog::new();
        catalog
            .insert(CatalogKind::Skills, CatalogEntry::new("z", "Zeal", None))
            .await;
        catalog
            .insert(CatalogKind::Skills, CatalogEntry::new("a", "Agility", None))
            .await;

        let skills = catalog.list(CatalogKind::Skills).await.unwrap();
        let names: Vec<&str> = skills.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["Agility", "Zeal"]);
        assert!(catalog.list(CatalogKind::Badges).await.unwrap().is_empty());
    }
}
