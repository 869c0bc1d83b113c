//! HTTP-level tests for the `/sessions` endpoints over in-memory stores.

mod common;

use axum::http::StatusCode;
use common::{body_json, build_test_app, delete, get, patch_json, post, post_json, put_json};
use uuid::Uuid;

fn session_uri(training_id: Uuid) -> String {
    format!("/api/v1/sessions/{training_id}")
}

fn module_ids(view: &serde_json::Value) -> Vec<String> {
    view["modules"]
        .as_array()
        .unwrap()
        .iter()
        .map(|m| m["id"].as_str().unwrap().to_string())
        .collect()
}

// ---------------------------------------------------------------------------
// Lifecycle
// ---------------------------------------------------------------------------

#[tokio::test]
async fn open_session_renders_numbered_tree() {
    let app = build_test_app();
    let (training_id, _) = common::seed_training(&app.content).await;

    let response = post(app.app(), &session_uri(training_id)).await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    let view = &json["data"];
    assert_eq!(view["dirty"], false);
    let numbering: Vec<_> = view["modules"]
        .as_array()
        .unwrap()
        .iter()
        .map(|m| m["numbering"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(numbering, ["1", "1.1", "1.2", "2", "3"]);
    assert_eq!(view["modules"][1]["depth"], 1);
}

#[tokio::test]
async fn open_unknown_training_returns_404_and_registers_nothing() {
    let app = build_test_app();
    let training_id = Uuid::new_v4();

    let response = post(app.app(), &session_uri(training_id)).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = get(app.app(), &session_uri(training_id)).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(response).await["code"], "NO_SESSION");
}

#[tokio::test]
async fn close_session_drops_it() {
    let app = build_test_app();
    let (training_id, _) = common::seed_training(&app.content).await;
    post(app.app(), &session_uri(training_id)).await;

    let response = delete(app.app(), &session_uri(training_id)).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = delete(app.app(), &session_uri(training_id)).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// ---------------------------------------------------------------------------
// Mutations
// ---------------------------------------------------------------------------

#[tokio::test]
async fn add_module_marks_session_dirty() {
    let app = build_test_app();
    let (training_id, _) = common::seed_training(&app.content).await;
    post(app.app(), &session_uri(training_id)).await;

    let response = post_json(
        app.app(),
        &format!("{}/modules", session_uri(training_id)),
        serde_json::json!({}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let json = body_json(response).await;
    let new_id = json["data"]["result"].as_str().unwrap().to_string();
    let view = &json["data"]["session"];
    assert_eq!(view["dirty"], true);
    let last = view["modules"].as_array().unwrap().last().unwrap().clone();
    assert_eq!(last["id"], new_id);
    assert_eq!(last["numbering"], "4");
    assert_eq!(last["name"], "New module");
}

#[tokio::test]
async fn add_module_under_unknown_parent_is_a_no_op() {
    let app = build_test_app();
    let (training_id, _) = common::seed_training(&app.content).await;
    post(app.app(), &session_uri(training_id)).await;

    let response = post_json(
        app.app(),
        &format!("{}/modules", session_uri(training_id)),
        serde_json::json!({ "parent_id": Uuid::new_v4() }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert!(json["data"]["result"].is_null());
    assert_eq!(json["data"]["session"]["modules"].as_array().unwrap().len(), 5);
}

#[tokio::test]
async fn checkpoint_toggle_assigns_default_min_score() {
    let app = build_test_app();
    let (training_id, tops) = common::seed_training(&app.content).await;
    post(app.app(), &session_uri(training_id)).await;
    let uri = format!("{}/modules/{}", session_uri(training_id), tops[1]);

    let response = patch_json(app.app(), &uri, serde_json::json!({ "is_checkpoint": true })).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["result"], true);
    let module = json["data"]["session"]["modules"]
        .as_array()
        .unwrap()
        .iter()
        .find(|m| m["id"] == tops[1].to_string())
        .unwrap()
        .clone();
    assert_eq!(module["min_score"], 70);

    let response = patch_json(app.app(), &uri, serde_json::json!({ "is_checkpoint": false })).await;
    let json = body_json(response).await;
    let module = json["data"]["session"]["modules"]
        .as_array()
        .unwrap()
        .iter()
        .find(|m| m["id"] == tops[1].to_string())
        .unwrap()
        .clone();
    assert_eq!(module["is_checkpoint"], false);
    assert_eq!(module["min_score"], 70);
}

#[tokio::test]
async fn invalid_patch_is_rejected_without_dirtying() {
    let app = build_test_app();
    let (training_id, tops) = common::seed_training(&app.content).await;
    post(app.app(), &session_uri(training_id)).await;

    let response = patch_json(
        app.app(),
        &format!("{}/modules/{}", session_uri(training_id), tops[0]),
        serde_json::json!({ "min_score": 150 }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let json = body_json(get(app.app(), &session_uri(training_id)).await).await;
    assert_eq!(json["data"]["dirty"], false);
}

#[tokio::test]
async fn delete_module_cascades_to_steps() {
    let app = build_test_app();
    let (training_id, tops) = common::seed_training(&app.content).await;
    post(app.app(), &session_uri(training_id)).await;

    let response = delete(
        app.app(),
        &format!("{}/modules/{}", session_uri(training_id), tops[0]),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["result"].as_array().unwrap().len(), 3);
    let view = &json["data"]["session"];
    assert_eq!(
        module_ids(view),
        [tops[1].to_string(), tops[2].to_string()]
    );
    assert_eq!(view["modules"][0]["numbering"], "1");
}

#[tokio::test]
async fn duplicate_module_appends_copy() {
    let app = build_test_app();
    let (training_id, tops) = common::seed_training(&app.content).await;
    post(app.app(), &session_uri(training_id)).await;

    let response = post(
        app.app(),
        &format!("{}/modules/{}/duplicate", session_uri(training_id), tops[1]),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    let copy_id = json["data"]["result"].as_str().unwrap().to_string();
    let ids = module_ids(&json["data"]["session"]);
    assert_eq!(ids.last().unwrap(), &copy_id);
}

#[tokio::test]
async fn reorder_returns_changed_indices_only() {
    let app = build_test_app();
    let (training_id, tops) = common::seed_training(&app.content).await;
    post(app.app(), &session_uri(training_id)).await;

    let response = put_json(
        app.app(),
        &format!("{}/order", session_uri(training_id)),
        serde_json::json!({ "ordered_ids": [tops[0], tops[2], tops[1]] }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    let updates = json["data"]["result"].as_array().unwrap();
    assert_eq!(updates.len(), 2);
    assert!(updates
        .iter()
        .any(|u| u["id"] == tops[2].to_string() && u["order_index"] == 1));
    assert_eq!(json["data"]["session"]["dirty"], true);
}

#[tokio::test]
async fn drag_moves_module_into_target_slot() {
    let app = build_test_app();
    let (training_id, tops) = common::seed_training(&app.content).await;
    post(app.app(), &session_uri(training_id)).await;

    let response = put_json(
        app.app(),
        &format!("{}/order/drag", session_uri(training_id)),
        serde_json::json!({ "active_id": tops[2], "over_id": tops[0] }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["result"].as_array().unwrap().len(), 3);
    let top_level: Vec<_> = json["data"]["session"]["modules"]
        .as_array()
        .unwrap()
        .iter()
        .filter(|m| m["depth"] == 0)
        .map(|m| m["id"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(
        top_level,
        [tops[2].to_string(), tops[0].to_string(), tops[1].to_string()]
    );
}

#[tokio::test]
async fn reorder_with_foreign_id_is_rejected() {
    let app = build_test_app();
    let (training_id, tops) = common::seed_training(&app.content).await;
    post(app.app(), &session_uri(training_id)).await;

    let response = put_json(
        app.app(),
        &format!("{}/order", session_uri(training_id)),
        serde_json::json!({ "ordered_ids": [tops[0], tops[1], Uuid::new_v4()] }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let json = body_json(get(app.app(), &session_uri(training_id)).await).await;
    assert_eq!(json["data"]["dirty"], false);
}

#[tokio::test]
async fn selection_ignores_unknown_ids() {
    let app = build_test_app();
    let (training_id, tops) = common::seed_training(&app.content).await;
    post(app.app(), &session_uri(training_id)).await;
    let uri = format!("{}/selection", session_uri(training_id));

    let response = put_json(app.app(), &uri, serde_json::json!({ "module_id": tops[2] })).await;
    let json = body_json(response).await;
    assert_eq!(json["data"]["result"], tops[2].to_string());
    assert_eq!(json["data"]["session"]["dirty"], false);

    let response = put_json(
        app.app(),
        &uri,
        serde_json::json!({ "module_id": Uuid::new_v4() }),
    )
    .await;
    let json = body_json(response).await;
    assert_eq!(json["data"]["result"], tops[2].to_string());
}

// ---------------------------------------------------------------------------
// Save / discard
// ---------------------------------------------------------------------------

#[tokio::test]
async fn save_persists_changes_and_clears_dirty() {
    let app = build_test_app();
    let (training_id, tops) = common::seed_training(&app.content).await;
    post(app.app(), &session_uri(training_id)).await;
    patch_json(
        app.app(),
        &format!("{}/modules/{}", session_uri(training_id), tops[2]),
        serde_json::json!({ "name": "Wrap-up" }),
    )
    .await;

    let json = body_json(get(app.app(), &format!("{}/changes", session_uri(training_id))).await)
        .await;
    assert_eq!(json["data"]["updated"].as_array().unwrap().len(), 1);

    let response = post(app.app(), &format!("{}/save", session_uri(training_id))).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["result"]["upserted"], 1);
    assert_eq!(json["data"]["session"]["dirty"], false);

    let stored = app.content.modules(training_id).await;
    assert!(stored
        .iter()
        .any(|m| m.id == tops[2] && m.name == "Wrap-up"));
}

#[tokio::test]
async fn failed_save_keeps_edits_for_retry() {
    let app = build_test_app();
    let (training_id, _) = common::seed_training(&app.content).await;
    post(app.app(), &session_uri(training_id)).await;
    post_json(
        app.app(),
        &format!("{}/modules", session_uri(training_id)),
        serde_json::json!({}),
    )
    .await;

    app.content.set_failing(true);
    let response = post(app.app(), &format!("{}/save", session_uri(training_id))).await;
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body_json(response).await["code"], "STORE_UNAVAILABLE");

    let json = body_json(get(app.app(), &session_uri(training_id)).await).await;
    assert_eq!(json["data"]["dirty"], true);
    assert_eq!(json["data"]["modules"].as_array().unwrap().len(), 6);

    app.content.set_failing(false);
    let response = post(app.app(), &format!("{}/save", session_uri(training_id))).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(app.content.modules(training_id).await.len(), 6);
}

#[tokio::test]
async fn discard_restores_loaded_tree() {
    let app = build_test_app();
    let (training_id, tops) = common::seed_training(&app.content).await;
    post(app.app(), &session_uri(training_id)).await;
    delete(
        app.app(),
        &format!("{}/modules/{}", session_uri(training_id), tops[1]),
    )
    .await;

    let response = post(app.app(), &format!("{}/discard", session_uri(training_id))).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["dirty"], false);
    assert_eq!(json["data"]["modules"].as_array().unwrap().len(), 5);
}
