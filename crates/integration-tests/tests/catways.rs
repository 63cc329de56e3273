//! Berth management over HTTP.

use axum::http::StatusCode;
use harbormaster_integration_tests::TestApp;
use serde_json::json;

#[tokio::test]
async fn test_create_and_fetch() {
    let app = TestApp::new();
    let token = app.login_as("office@port.test").await;

    let created = app.create_catway(&token, 1).await;
    assert_eq!(created.status, StatusCode::CREATED);
    assert_eq!(created.data()["catwayNumber"], 1);
    assert_eq!(created.data()["catwayType"], "long");

    // Reads are public.
    let fetched = app.get("/api/catways/1", None).await;
    assert_eq!(fetched.status, StatusCode::OK);
    assert_eq!(fetched.data()["catwayState"], "good");
}

#[tokio::test]
async fn test_create_requires_token() {
    let app = TestApp::new();
    let response = app
        .post(
            "/api/catways",
            None,
            json!({ "catwayNumber": 1, "catwayType": "long", "catwayState": "good" }),
        )
        .await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(app.get("/api/catways", None).await.json["count"], 0);
}

#[tokio::test]
async fn test_duplicate_number_is_bad_request() {
    let app = TestApp::new();
    let token = app.login_as("office@port.test").await;
    app.create_catway(&token, 1).await;

    let duplicate = app
        .post(
            "/api/catways",
            Some(&token),
            json!({ "catwayNumber": 1, "catwayType": "short", "catwayState": "new" }),
        )
        .await;
    assert_eq!(duplicate.status, StatusCode::BAD_REQUEST);

    let original = app.get("/api/catways/1", None).await;
    assert_eq!(original.data()["catwayType"], "long");
}

#[tokio::test]
async fn test_invalid_fields() {
    let app = TestApp::new();
    let token = app.login_as("office@port.test").await;

    let response = app
        .post(
            "/api/catways",
            Some(&token),
            json!({ "catwayNumber": 0, "catwayType": "medium" }),
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert!(!response.message().is_empty());
}

#[tokio::test]
async fn test_list_sorted_by_number() {
    let app = TestApp::new();
    let token = app.login_as("office@port.test").await;
    for n in [3, 1, 2] {
        app.create_catway(&token, n).await;
    }

    let list = app.get("/api/catways", None).await;
    assert_eq!(list.json["count"], 3);
    let numbers: Vec<i64> = list
        .data()
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["catwayNumber"].as_i64().unwrap())
        .collect();
    assert_eq!(numbers, vec![1, 2, 3]);
}

#[tokio::test]
async fn test_update_changes_state_only() {
    let app = TestApp::new();
    let token = app.login_as("office@port.test").await;
    app.create_catway(&token, 5).await;

    let updated = app
        .put(
            "/api/catways/5",
            Some(&token),
            json!({ "catwayState": "broken cleat", "catwayType": "short", "catwayNumber": 9 }),
        )
        .await;
    assert_eq!(updated.status, StatusCode::OK);
    assert_eq!(updated.data()["catwayState"], "broken cleat");
    assert_eq!(updated.data()["catwayType"], "long");
    assert_eq!(updated.data()["catwayNumber"], 5);

    let missing_state = app.put("/api/catways/5", Some(&token), json!({})).await;
    assert_eq!(missing_state.status, StatusCode::BAD_REQUEST);

    let unknown = app
        .put("/api/catways/42", Some(&token), json!({ "catwayState": "x" }))
        .await;
    assert_eq!(unknown.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_delete_denied_while_reserved() {
    let app = TestApp::new();
    let token = app.login_as("office@port.test").await;
    app.create_catway(&token, 1).await;
    let reservation = app
        .post(
            "/api/catways/1/reservations",
            Some(&token),
            json!({
                "clientName": "Jo",
                "boatName": "Wave",
                "startDate": "2024-01-10",
                "endDate": "2024-01-15",
            }),
        )
        .await;
    let id = reservation.data()["id"].as_i64().unwrap();

    let denied = app.delete("/api/catways/1", Some(&token)).await;
    assert_eq!(denied.status, StatusCode::CONFLICT);

    app.delete(&format!("/api/catways/1/reservations/{id}"), Some(&token))
        .await;
    let deleted = app.delete("/api/catways/1", Some(&token)).await;
    assert_eq!(deleted.status, StatusCode::OK);

    let again = app.delete("/api/catways/1", Some(&token)).await;
    assert_eq!(again.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_non_numeric_number_is_not_found() {
    let app = TestApp::new();
    let response = app.get("/api/catways/abc", None).await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert_eq!(response.message(), "catway not found");
}
