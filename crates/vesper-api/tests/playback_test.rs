//! Playback session lifecycle and view recording.
//!
//! Run with: `cargo test -p vesper-api --test playback_test`
//! Requires Docker for testcontainers (Postgres).

mod helpers;

use helpers::auth::create_test_user;
use helpers::fixtures::{create_test_media, media_counter};
use helpers::{api_path, setup_test_app};
use vesper_core::models::UserRole;

#[tokio::test]
async fn test_full_playback_records_one_view() {
    let app = setup_test_app().await;
    let owner = create_test_user(app.pool(), UserRole::User).await;
    let listener = create_test_user(app.pool(), UserRole::User).await;
    let media_id = create_test_media(app.pool(), owner.user_id, 100.0).await;

    let started = app
        .client()
        .post(&api_path("/playback/start"))
        .add_header("Authorization", listener.bearer())
        .json(&serde_json::json!({ "media_id": media_id, "duration": 100.0 }))
        .await;
    assert_eq!(started.status_code(), 201);
    let body: serde_json::Value = started.json();
    let session_id = body["data"]["session"]["id"]
        .as_str()
        .expect("session id")
        .to_string();

    let progressed = app
        .client()
        .put(&api_path(&format!("/playback/{}/progress", session_id)))
        .add_header("Authorization", listener.bearer())
        .json(&serde_json::json!({ "position": 50.0 }))
        .await;
    assert_eq!(progressed.status_code(), 200);
    let body: serde_json::Value = progressed.json();
    assert_eq!(body["data"]["progress_percentage"], 50.0);

    let active = app
        .client()
        .get(&api_path("/playback/active"))
        .add_header("Authorization", listener.bearer())
        .await;
    let body: serde_json::Value = active.json();
    assert_eq!(body["data"]["id"], session_id.as_str());

    let ended = app
        .client()
        .post(&api_path(&format!("/playback/{}/end", session_id)))
        .add_header("Authorization", listener.bearer())
        .json(&serde_json::json!({ "reason": "completed", "final_position": 95.0 }))
        .await;
    assert_eq!(ended.status_code(), 200);
    let body: serde_json::Value = ended.json();
    assert_eq!(body["data"]["view_recorded"], true);
    assert_eq!(media_counter(app.pool(), media_id, "view_count").await, 1);

    let again = app
        .client()
        .post(&api_path(&format!("/playback/{}/end", session_id)))
        .add_header("Authorization", listener.bearer())
        .await;
    assert_eq!(again.status_code(), 400);
    assert_eq!(media_counter(app.pool(), media_id, "view_count").await, 1);
}

#[tokio::test]
async fn test_short_listen_records_no_view() {
    let app = setup_test_app().await;
    let owner = create_test_user(app.pool(), UserRole::User).await;
    let listener = create_test_user(app.pool(), UserRole::User).await;
    let media_id = create_test_media(app.pool(), owner.user_id, 100.0).await;

    let started = app
        .client()
        .post(&api_path("/playback/start"))
        .add_header("Authorization", listener.bearer())
        .json(&serde_json::json!({ "media_id": media_id, "duration": 100.0 }))
        .await;
    let body: serde_json::Value = started.json();
    let session_id = body["data"]["session"]["id"].as_str().expect("session id").to_string();

    let ended = app
        .client()
        .post(&api_path(&format!("/playback/{}/end", session_id)))
        .add_header("Authorization", listener.bearer())
        .json(&serde_json::json!({ "final_position": 30.0 }))
        .await;
    assert_eq!(ended.status_code(), 200);
    let body: serde_json::Value = ended.json();
    assert_eq!(body["data"]["view_recorded"], false);
    assert_eq!(media_counter(app.pool(), media_id, "view_count").await, 0);
}

#[tokio::test]
async fn test_starting_second_session_pauses_the_first() {
    let app = setup_test_app().await;
    let owner = create_test_user(app.pool(), UserRole::User).await;
    let listener = create_test_user(app.pool(), UserRole::User).await;
    let first_media = create_test_media(app.pool(), owner.user_id, 100.0).await;
    let second_media = create_test_media(app.pool(), owner.user_id, 200.0).await;

    let first = app
        .client()
        .post(&api_path("/playback/start"))
        .add_header("Authorization", listener.bearer())
        .json(&serde_json::json!({ "media_id": first_media, "duration": 100.0 }))
        .await;
    let body: serde_json::Value = first.json();
    let first_id = body["data"]["session"]["id"].as_str().expect("session id").to_string();

    let second = app
        .client()
        .post(&api_path("/playback/start"))
        .add_header("Authorization", listener.bearer())
        .json(&serde_json::json!({ "media_id": second_media, "duration": 200.0 }))
        .await;
    assert_eq!(second.status_code(), 201);
    let body: serde_json::Value = second.json();
    assert_eq!(body["data"]["paused_session"]["id"], first_id.as_str());
    assert_eq!(body["data"]["paused_session"]["is_paused"], true);

    let history = app
        .client()
        .get(&api_path("/playback/history"))
        .add_header("Authorization", listener.bearer())
        .await;
    let body: serde_json::Value = history.json();
    assert_eq!(body["data"]["pagination"]["total"], 2);
}

#[tokio::test]
async fn test_other_users_cannot_end_a_session() {
    let app = setup_test_app().await;
    let owner = create_test_user(app.pool(), UserRole::User).await;
    let listener = create_test_user(app.pool(), UserRole::User).await;
    let stranger = create_test_user(app.pool(), UserRole::User).await;
    let media_id = create_test_media(app.pool(), owner.user_id, 100.0).await;

    let started = app
        .client()
        .post(&api_path("/playback/start"))
        .add_header("Authorization", listener.bearer())
        .json(&serde_json::json!({ "media_id": media_id, "duration": 100.0 }))
        .await;
    let body: serde_json::Value = started.json();
    let session_id = body["data"]["session"]["id"].as_str().expect("session id").to_string();

    let response = app
        .client()
        .post(&api_path(&format!("/playback/{}/end", session_id)))
        .add_header("Authorization", stranger.bearer())
        .await;

    assert_eq!(response.status_code(), 403);
}
