//! Hymn listing, filtering and admin-only writes.
//!
//! Run with: `cargo test -p vesper-api --test hymns_test`
//! Requires Docker for testcontainers (Postgres).

mod helpers;

use helpers::auth::create_test_user;
use helpers::fixtures::create_test_hymn;
use helpers::{api_path, setup_test_app};
use vesper_core::models::UserRole;

#[tokio::test]
async fn test_list_hymns_paginates() {
    let app = setup_test_app().await;
    for n in 1..=5 {
        create_test_hymn(app.pool(), n, &format!("Hymn {}", n), "worship").await;
    }

    let response = app
        .client()
        .get(&api_path("/hymns"))
        .add_query_param("page", 2)
        .add_query_param("limit", 2)
        .await;

    assert_eq!(response.status_code(), 200);
    let body: serde_json::Value = response.json();
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["items"].as_array().map(Vec::len), Some(2));
    assert_eq!(body["data"]["pagination"]["total"], 5);
    assert_eq!(body["data"]["pagination"]["pages"], 3);
    assert_eq!(body["data"]["pagination"]["page"], 2);
}

#[tokio::test]
async fn test_list_hymns_filters_by_exact_category() {
    let app = setup_test_app().await;
    create_test_hymn(app.pool(), 1, "Praise to the Lord", "praise").await;
    create_test_hymn(app.pool(), 2, "To God Be the Glory", "praise").await;
    create_test_hymn(app.pool(), 3, "Praise Him", "Praise").await;
    create_test_hymn(app.pool(), 4, "It Is Well", "peace").await;

    let response = app
        .client()
        .get(&api_path("/hymns"))
        .add_query_param("category", "praise")
        .await;

    assert_eq!(response.status_code(), 200);
    let body: serde_json::Value = response.json();
    assert_eq!(body["data"]["pagination"]["total"], 2);
    let items = body["data"]["items"].as_array().expect("items");
    assert!(items.iter().all(|hymn| hymn["category"] == "praise"));
}

#[tokio::test]
async fn test_list_hymns_past_last_page_is_empty() {
    let app = setup_test_app().await;
    create_test_hymn(app.pool(), 1, "Amazing Grace", "grace").await;

    let response = app
        .client()
        .get(&api_path("/hymns"))
        .add_query_param("page", i64::MAX)
        .add_query_param("limit", 100)
        .await;

    assert_eq!(response.status_code(), 200);
    let body: serde_json::Value = response.json();
    assert_eq!(body["data"]["items"].as_array().map(Vec::len), Some(0));
    assert_eq!(body["data"]["pagination"]["total"], 1);
}

#[tokio::test]
async fn test_get_hymn_with_malformed_id_is_bad_request() {
    let app = setup_test_app().await;

    let response = app.client().get(&api_path("/hymns/not-a-uuid")).await;

    assert_eq!(response.status_code(), 400);
    let body: serde_json::Value = response.json();
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn test_create_hymn_requires_admin() {
    let app = setup_test_app().await;
    let member = create_test_user(app.pool(), UserRole::User).await;
    let admin = create_test_user(app.pool(), UserRole::Admin).await;
    let payload = serde_json::json!({
        "number": 10,
        "title": "Holy, Holy, Holy",
        "category": "worship",
        "lyrics": "Holy, holy, holy! Lord God Almighty!"
    });

    let anonymous = app.client().post(&api_path("/hymns")).json(&payload).await;
    assert_eq!(anonymous.status_code(), 401);

    let forbidden = app
        .client()
        .post(&api_path("/hymns"))
        .add_header("Authorization", member.bearer())
        .json(&payload)
        .await;
    assert_eq!(forbidden.status_code(), 403);

    let created = app
        .client()
        .post(&api_path("/hymns"))
        .add_header("Authorization", admin.bearer())
        .json(&payload)
        .await;
    assert_eq!(created.status_code(), 201);
    let body: serde_json::Value = created.json();
    assert_eq!(body["data"]["title"], "Holy, Holy, Holy");
}
