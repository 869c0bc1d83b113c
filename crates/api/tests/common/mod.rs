#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::Arc;

use axum::body::Body;
use axum::http::{Method, Request};
use axum::response::Response;
use axum::Router;
use chrono::Utc;
use http_body_util::BodyExt;
use questline_core::module::Module;
use questline_core::training::{CertificateSettings, Training, TrainingLevel};
use questline_core::types::{ModuleId, TrainingId};
use questline_db::{InMemoryAssetStore, InMemoryCatalog, InMemoryContentStore};
use questline_events::EventBus;
use tower::ServiceExt;
use uuid::Uuid;

use questline_api::config::ServerConfig;
use questline_api::router::build_app_router;
use questline_api::state::AppState;

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        database_url: None,
        asset_root: PathBuf::from("./storage"),
        asset_public_base_url: "http://localhost:3000/assets".to_string(),
        thumbnail_bucket: "training-thumbnails".to_string(),
    }
}

/// In-memory collaborators behind a test app, kept so tests can seed data
/// and inject failures.
pub struct TestApp {
    pub router: Router,
    pub content: Arc<InMemoryContentStore>,
    pub assets: Arc<InMemoryAssetStore>,
    pub events: Arc<EventBus>,
}

impl TestApp {
    /// A fresh clone of the router for one `oneshot` request. All clones
    /// share the same state.
    pub fn app(&self) -> Router {
        self.router.clone()
    }
}

/// Build the full application router over in-memory stores.
///
/// Uses the same [`build_app_router`] as `main.rs`, so requests go through
/// the production middleware stack.
pub fn build_test_app() -> TestApp {
    let config = test_config();
    let content = Arc::new(InMemoryContentStore::new());
    let assets = Arc::new(InMemoryAssetStore::new());
    let events = Arc::new(EventBus::default());

    let state = AppState::new(
        config.clone(),
        None,
        content.clone(),
        assets.clone(),
        Arc::new(InMemoryCatalog::seeded()),
        Arc::clone(&events),
    );

    TestApp {
        router: build_app_router(state, &config),
        content,
        assets,
        events,
    }
}

// ---------------------------------------------------------------------------
// Seed data
// ---------------------------------------------------------------------------

pub fn training(id: TrainingId) -> Training {
    Training {
        id,
        name: "Customer Care".into(),
        description: None,
        category: "Support".into(),
        level: TrainingLevel::Beginner,
        thumbnail_url: None,
        estimated_hours: 2.0,
        xp_reward: 0,
        coins_reward: 0,
        skill_impacts: Vec::new(),
        badge_relations: Vec::new(),
        item_rewards: Vec::new(),
        evolution_template_id: None,
        certificate: CertificateSettings::default(),
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

/// Seed a training with three top-level modules; the first holds two steps.
/// Returns the training id and the top-level ids in order.
pub async fn seed_training(content: &InMemoryContentStore) -> (TrainingId, Vec<ModuleId>) {
    let training_id = Uuid::new_v4();
    let tops: Vec<Module> = (0..3)
        .map(|i| Module::new(Uuid::new_v4(), None, i))
        .collect();
    let steps: Vec<Module> = (0..2)
        .map(|i| Module::new(Uuid::new_v4(), Some(tops[0].id), i))
        .collect();
    let ids = tops.iter().map(|m| m.id).collect();
    content
        .seed(training(training_id), tops.into_iter().chain(steps).collect())
        .await;
    (training_id, ids)
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

async fn send(app: Router, method: Method, uri: &str, body: Option<serde_json::Value>) -> Response {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(json) => {
            builder = builder.header("content-type", "application/json");
            Body::from(json.to_string())
        }
        None => Body::empty(),
    };
    app.oneshot(builder.body(body).unwrap()).await.unwrap()
}

pub async fn get(app: Router, uri: &str) -> Response {
    send(app, Method::GET, uri, None).await
}

pub async fn post(app: Router, uri: &str) -> Response {
    send(app, Method::POST, uri, None).await
}

pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response {
    send(app, Method::POST, uri, Some(body)).await
}

pub async fn put_json(app: Router, uri: &str, body: serde_json::Value) -> Response {
    send(app, Method::PUT, uri, Some(body)).await
}

pub async fn patch_json(app: Router, uri: &str, body: serde_json::Value) -> Response {
    send(app, Method::PATCH, uri, Some(body)).await
}

pub async fn delete(app: Router, uri: &str) -> Response {
    send(app, Method::DELETE, uri, None).await
}

/// POST raw bytes (uploads).
pub async fn post_bytes(app: Router, uri: &str, bytes: Vec<u8>) -> Response {
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header("content-type", "application/octet-stream")
        .body(Body::from(bytes))
        .unwrap();
    app.oneshot(request).await.unwrap()
}

/// Collect a response body as JSON.
pub async fn body_json(response: Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}
