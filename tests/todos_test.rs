mod common;

use axum::http::StatusCode;
use serde_json::json;

use common::{register_admin, register_and_login, send, test_app};

#[tokio::test]
async fn create_applies_defaults() {
    let (app, _state) = test_app().await;
    let token = register_and_login(&app, "alice").await;

    let (status, body) = send(
        &app,
        "POST",
        "/todos",
        Some(&token),
        Some(json!({ "title": "write report" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["title"], "write report");
    assert_eq!(body["status"], "not-started");
    assert_eq!(body["content"], "");
    assert_eq!(body["tags"], json!([]));
    // Deadline defaults to the creation date.
    assert_eq!(
        body["deadline"].as_str().unwrap(),
        chrono::Utc::now().date_naive().to_string()
    );
}

#[tokio::test]
async fn create_requires_a_title() {
    let (app, _state) = test_app().await;
    let token = register_and_login(&app, "alice").await;

    let (status, _) = send(
        &app,
        "POST",
        "/todos",
        Some(&token),
        Some(json!({ "title": "  " })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn todos_require_a_token() {
    let (app, _state) = test_app().await;
    let (status, _) = send(&app, "GET", "/todos", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn list_is_owner_scoped_and_newest_first() {
    let (app, _state) = test_app().await;
    let alice = register_and_login(&app, "alice").await;
    let bob = register_and_login(&app, "bob").await;

    for title in ["first", "second", "third"] {
        let (status, _) = send(
            &app,
            "POST",
            "/todos",
            Some(&alice),
            Some(json!({ "title": title })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
    }
    send(&app, "POST", "/todos", Some(&bob), Some(json!({ "title": "bobs" }))).await;

    let (status, body) = send(&app, "GET", "/todos", Some(&alice), None).await;
    assert_eq!(status, StatusCode::OK);
    let titles: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["title"].as_str().unwrap())
        .collect();
    assert_eq!(titles, vec!["third", "second", "first"]);
}

#[tokio::test]
async fn foreign_todos_read_as_not_found() {
    let (app, _state) = test_app().await;
    let alice = register_and_login(&app, "alice").await;
    let bob = register_and_login(&app, "bob").await;

    let (_, created) = send(
        &app,
        "POST",
        "/todos",
        Some(&alice),
        Some(json!({ "title": "private" })),
    )
    .await;
    let id = created["id"].as_str().unwrap();

    let (status, _) = send(&app, "GET", &format!("/todos/{id}"), Some(&bob), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(
        &app,
        "PUT",
        &format!("/todos/{id}"),
        Some(&bob),
        Some(json!({ "status": "done" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&app, "DELETE", &format!("/todos/{id}"), Some(&bob), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // Still intact for the owner.
    let (status, body) = send(&app, "GET", "/todos", Some(&alice), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn partial_update_merges_only_supplied_fields() {
    let (app, _state) = test_app().await;
    let token = register_and_login(&app, "alice").await;

    let (_, created) = send(
        &app,
        "POST",
        "/todos",
        Some(&token),
        Some(json!({
            "title": "write report",
            "content": "quarterly numbers",
            "deadline": "2026-09-01",
            "tags": ["work"],
        })),
    )
    .await;
    let id = created["id"].as_str().unwrap();

    let (status, body) = send(
        &app,
        "PATCH",
        &format!("/todos/{id}"),
        Some(&token),
        Some(json!({ "status": "done" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "done");
    assert_eq!(body["title"], "write report");
    assert_eq!(body["content"], "quarterly numbers");
    assert_eq!(body["deadline"], "2026-09-01");
    assert_eq!(body["tags"], json!(["work"]));
}

#[tokio::test]
async fn tags_behave_as_a_set() {
    let (app, _state) = test_app().await;
    let token = register_and_login(&app, "alice").await;

    let (_, created) = send(
        &app,
        "POST",
        "/todos",
        Some(&token),
        Some(json!({ "title": "t", "tags": ["x", "y", "x"] })),
    )
    .await;
    let id = created["id"].as_str().unwrap();
    assert_eq!(created["tags"], json!(["x", "y"]));

    // Removing "x" by exact match.
    let (_, body) = send(
        &app,
        "PATCH",
        &format!("/todos/{id}"),
        Some(&token),
        Some(json!({ "tags": ["y"] })),
    )
    .await;
    assert_eq!(body["tags"], json!(["y"]));

    // Re-adding restores it, still deduplicated.
    let (_, body) = send(
        &app,
        "PATCH",
        &format!("/todos/{id}"),
        Some(&token),
        Some(json!({ "tags": ["y", "x", "x"] })),
    )
    .await;
    assert_eq!(body["tags"], json!(["y", "x"]));
}

#[tokio::test]
async fn delete_removes_the_todo() {
    let (app, _state) = test_app().await;
    let token = register_and_login(&app, "alice").await;

    let (_, created) = send(
        &app,
        "POST",
        "/todos",
        Some(&token),
        Some(json!({ "title": "t" })),
    )
    .await;
    let id = created["id"].as_str().unwrap();

    let (status, _) = send(&app, "DELETE", &format!("/todos/{id}"), Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(&app, "DELETE", &format!("/todos/{id}"), Some(&token), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, body) = send(&app, "GET", "/todos", Some(&token), None).await;
    assert!(body.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn deleting_a_user_cascades_to_their_todos() {
    let (app, state) = test_app().await;
    let alice = register_and_login(&app, "alice").await;
    let admin = register_admin(&app, &state, "root").await;

    send(&app, "POST", "/todos", Some(&alice), Some(json!({ "title": "a" }))).await;
    send(&app, "POST", "/todos", Some(&alice), Some(json!({ "title": "b" }))).await;

    let (status, _) = send(&app, "DELETE", "/admin/users/alice", Some(&admin), None).await;
    assert_eq!(status, StatusCode::OK);

    let remaining: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM todos WHERE user_id = 'alice'")
        .fetch_one(&state.db)
        .await
        .unwrap();
    assert_eq!(remaining, 0);
}
