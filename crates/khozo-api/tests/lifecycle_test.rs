//! Integration tests for status transitions and history.

mod helpers;

use axum::http::StatusCode;
use serde_json::json;

#[tokio::test]
async fn test_transition_returns_previous_and_new_status() {
    let app = helpers::TestApp::new();
    let token = app.new_user();
    let created = app.create_simple(&token, "CTET December").await;
    let id = created["id"].as_str().unwrap();

    let response = app
        .request(
            "POST",
            &format!("/api/opportunities/{id}/transition"),
            Some(json!({ "status": "applied", "reason": "Submitted online" })),
            Some(&token),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["data"]["previousStatus"], "discovered");
    assert_eq!(response.body["data"]["newStatus"], "applied");

    let response = app
        .request(
            "GET",
            &format!("/api/opportunities/{id}/history"),
            None,
            Some(&token),
        )
        .await;
    let history = response.body["data"].as_array().unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0]["new_status"], "applied");
    assert_eq!(history[0]["reason"], "Submitted online");
}

#[tokio::test]
async fn test_unknown_status_is_unprocessable() {
    let app = helpers::TestApp::new();
    let token = app.new_user();
    let created = app.create_simple(&token, "CTET December").await;
    let id = created["id"].as_str().unwrap();

    let response = app
        .request(
            "POST",
            &format!("/api/opportunities/{id}/transition"),
            Some(json!({ "requestedStatus": "withdrawn" })),
            Some(&token),
        )
        .await;
    assert_eq!(response.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(response.body["code"], "INVALID_STATUS");

    for status in ["", "   "] {
        let response = app
            .request(
                "POST",
                &format!("/api/opportunities/{id}/transition"),
                Some(json!({ "status": status })),
                Some(&token),
            )
            .await;
        assert_eq!(response.status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(response.body["code"], "INVALID_STATUS");
    }

    let response = app
        .request("GET", &format!("/api/opportunities/{id}"), None, Some(&token))
        .await;
    assert_eq!(response.body["data"]["status"], "discovered");
}

#[tokio::test]
async fn test_non_owner_transition_is_forbidden() {
    let app = helpers::TestApp::new();
    let owner = app.new_user();
    let created = app.create_simple(&owner, "CTET December").await;
    let id = created["id"].as_str().unwrap();

    let response = app
        .request(
            "POST",
            &format!("/api/opportunities/{id}/transition"),
            Some(json!({ "status": "applied" })),
            Some(&app.new_user()),
        )
        .await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_archiving_dismisses_pending_reminders() {
    let app = helpers::TestApp::new();
    let token = app.new_user();
    let created = app
        .create_opportunity(
            &token,
            json!({
                "title": "RRB NTPC",
                "category": "job",
                "type": "application",
                "important_dates": { "exam_date": { "date": "2025-12-15" } }
            }),
        )
        .await;
    let id = created["id"].as_str().unwrap();

    let response = app
        .request(
            "POST",
            &format!("/api/opportunities/{id}/transition"),
            Some(json!({ "status": "archived" })),
            Some(&token),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);

    let response = app
        .request(
            "GET",
            &format!("/api/opportunities/{id}/notifications"),
            None,
            Some(&token),
        )
        .await;
    let jobs = response.body["data"].as_array().unwrap();
    assert_eq!(jobs.len(), 6);
    assert!(jobs.iter().all(|j| j["status"] == "dismissed"));
}
