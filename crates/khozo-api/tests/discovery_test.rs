//! Integration tests for related content, trending and viewing history.

mod helpers;

use axum::http::StatusCode;
use chrono::Duration;
use serde_json::json;

async fn add(app: &helpers::TestApp, token: &str, title: &str, category: &str, kind: &str, tags: &[&str]) -> String {
    let created = app
        .create_opportunity(
            token,
            json!({ "title": title, "category": category, "type": kind, "tags": tags }),
        )
        .await;
    created["id"].as_str().unwrap().to_string()
}

async fn track(app: &helpers::TestApp, token: &str, id: &str, kind: &str) -> helpers::TestResponse {
    app.request(
        "POST",
        &format!("/api/opportunities/{id}/track"),
        Some(json!({ "kind": kind })),
        Some(token),
    )
    .await
}

#[tokio::test]
async fn test_related_items_are_ranked_and_shaped() {
    let app = helpers::TestApp::new();
    let token = app.new_user();
    let source = add(&app, &token, "Railway Group D", "job", "application", &["railway", "10th"]).await;
    let strong = add(&app, &token, "Railway NTPC", "job", "application", &["railway", "10th"]).await;
    let weak = add(&app, &token, "Army Agniveer", "job", "application", &[]).await;
    add(&app, &token, "PM Kisan", "scheme", "scheme", &["farmer"]).await;

    let response = app
        .request(
            "GET",
            &format!("/api/opportunities/{source}/related"),
            None,
            Some(&token),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
    let items = response.body["data"].as_array().unwrap();
    let ids: Vec<&str> = items.iter().map(|i| i["id"].as_str().unwrap()).collect();
    assert_eq!(ids, vec![strong.as_str(), weak.as_str()]);
    assert_eq!(items[0]["type"], "application");
    assert!(items[0]["similarity"].as_f64().unwrap() <= 1.0);
    assert!(items[0]["reason"].is_string());

    let response = app
        .request(
            "GET",
            &format!("/api/opportunities/{source}/related?limit=1"),
            None,
            Some(&token),
        )
        .await;
    assert_eq!(response.body["data"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_related_rejects_bad_parameters() {
    let app = helpers::TestApp::new();
    let token = app.new_user();
    let source = add(&app, &token, "Startup India", "startup", "scheme", &["startup"]).await;

    let response = app
        .request(
            "GET",
            &format!("/api/opportunities/{source}/related?minSimilarity=1.5"),
            None,
            Some(&token),
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);

    let response = app
        .request(
            "GET",
            &format!("/api/opportunities/{source}/related?include_types=scheme,lottery"),
            None,
            Some(&token),
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_trending_ranks_by_engagement_in_window() {
    let app = helpers::TestApp::new();
    let token = app.new_user();
    let quiet = add(&app, &token, "UPSC CSE", "exam", "application", &[]).await;
    let busy = add(&app, &token, "SSC CGL", "exam", "application", &[]).await;

    app.clock.advance(Duration::minutes(1));
    assert_eq!(track(&app, &token, &quiet, "view").await.status, StatusCode::OK);
    for kind in ["view", "save", "share", "view"] {
        track(&app, &token, &busy, kind).await;
    }

    let response = app
        .request("GET", "/api/trending?window=day", None, Some(&token))
        .await;
    assert_eq!(response.status, StatusCode::OK);
    let items = response.body["data"].as_array().unwrap();
    assert_eq!(items.len(), 2);
    assert_eq!(items[0]["id"], busy.as_str());
    assert_eq!(items[0]["viewCount"], 2);
    assert_eq!(items[0]["growthRate"], 100.0);
    assert_eq!(items[1]["id"], quiet.as_str());

    let response = app
        .request("GET", "/api/trending/overview", None, Some(&token))
        .await;
    assert_eq!(response.body["data"]["day"].as_array().unwrap().len(), 2);
    assert_eq!(response.body["data"]["week"].as_array().unwrap().len(), 2);

    let response = app
        .request("GET", "/api/trending?window=month", None, Some(&token))
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_tracking_validates_kind_and_target() {
    let app = helpers::TestApp::new();
    let token = app.new_user();
    let id = add(&app, &token, "CTET", "exam", "application", &[]).await;

    assert_eq!(track(&app, &token, &id, "application").await.status, StatusCode::BAD_REQUEST);
    assert_eq!(track(&app, &token, &id, "like").await.status, StatusCode::BAD_REQUEST);

    let missing = uuid::Uuid::new_v4().to_string();
    assert_eq!(track(&app, &token, &missing, "view").await.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_discovery_is_scoped_to_the_owner() {
    let app = helpers::TestApp::new();
    let owner = app.new_user();
    let stranger = app.new_user();
    let id = add(&app, &owner, "Bihar STET", "exam", "application", &["teacher"]).await;
    add(&app, &stranger, "Bihar TRE", "exam", "application", &["teacher"]).await;

    let response = app
        .request("GET", &format!("/api/opportunities/{id}/related"), None, Some(&owner))
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body["data"].as_array().unwrap().is_empty());

    let response = app
        .request("GET", &format!("/api/opportunities/{id}/related"), None, Some(&stranger))
        .await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);

    app.clock.advance(Duration::minutes(1));
    assert_eq!(track(&app, &stranger, &id, "view").await.status, StatusCode::FORBIDDEN);
    assert_eq!(track(&app, &owner, &id, "view").await.status, StatusCode::OK);

    let response = app
        .request("GET", "/api/trending?window=day", None, Some(&stranger))
        .await;
    assert!(response.body["data"].as_array().unwrap().is_empty());
    let response = app
        .request("GET", "/api/trending?window=day", None, Some(&owner))
        .await;
    assert_eq!(response.body["data"][0]["id"], id.as_str());
}

#[tokio::test]
async fn test_clearing_history_keeps_counters() {
    let app = helpers::TestApp::new();
    let token = app.new_user();
    let id = add(&app, &token, "NDA II", "exam", "application", &[]).await;

    track(&app, &token, &id, "view").await;
    app.clock.advance(Duration::minutes(1));
    track(&app, &token, &id, "view").await;

    let response = app.request("GET", "/api/history?limit=10", None, Some(&token)).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["data"].as_array().unwrap().len(), 2);

    let response = app.request("DELETE", "/api/history", None, Some(&token)).await;
    assert_eq!(response.body["data"]["removed"], 2);

    let response = app.request("GET", "/api/history", None, Some(&token)).await;
    assert!(response.body["data"].as_array().unwrap().is_empty());

    let response = app
        .request("GET", &format!("/api/opportunities/{id}"), None, Some(&token))
        .await;
    assert_eq!(response.body["data"]["view_count"], 2);
}
