//! Integration tests for the track endpoints
//!
//! Each test drives the router directly with `oneshot` against its own
//! in-memory store.

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use chrono::Datelike;
use mlib_api::{build_router, AppState};
use mlib_common::db::init::{init_database, init_in_memory};
use serde_json::{json, Value};
use sqlx::SqlitePool;
use tower::util::ServiceExt; // for `oneshot` method

/// Test helper: app backed by a fresh in-memory store
async fn setup_app() -> (Router, SqlitePool) {
    let db = init_in_memory().await.expect("Should open in-memory store");
    (build_router(AppState::new(db.clone())), db)
}

fn empty_request(method: &str, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

fn json_request(method: &str, uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

/// Test helper: send a request and decode the JSON body
async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("Should read body");
    let body = serde_json::from_slice(&bytes).expect("Should parse JSON");
    (status, body)
}

fn stairway() -> Value {
    json!({
        "songTitle": "Stairway to Heaven",
        "artistName": "Led Zeppelin",
        "albumName": "Led Zeppelin IV",
        "genre": "Rock",
        "duration": 482,
        "releaseYear": 1971
    })
}

async fn create(app: &Router, body: &Value) -> (StatusCode, Value) {
    send(app, json_request("POST", "/api/tracks", body)).await
}

// =============================================================================
// Health
// =============================================================================

#[tokio::test]
async fn test_health_endpoint() {
    let (app, _db) = setup_app().await;

    let (status, body) = send(&app, empty_request("GET", "/health")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["module"], "mlib-api");
    assert!(body["version"].is_string());
}

// =============================================================================
// Create
// =============================================================================

#[tokio::test]
async fn test_create_assigns_increasing_ids() {
    let (app, _db) = setup_app().await;

    let (status, first) = create(&app, &stairway()).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(first["message"], "Track created successfully");

    let (_, second) = create(&app, &stairway()).await;
    let first_id = first["data"]["trackId"].as_i64().unwrap();
    let second_id = second["data"]["trackId"].as_i64().unwrap();
    assert!(second_id > first_id);

    // Deleting the newest row does not free its id
    send(&app, empty_request("DELETE", &format!("/api/tracks/{}", second_id))).await;
    let (_, third) = create(&app, &stairway()).await;
    assert!(third["data"]["trackId"].as_i64().unwrap() > second_id);
}

#[tokio::test]
async fn test_get_returns_submitted_fields() {
    let (app, _db) = setup_app().await;
    let submitted = stairway();

    let (_, created) = create(&app, &submitted).await;
    let id = created["data"]["trackId"].as_i64().unwrap();

    let (status, body) = send(&app, empty_request("GET", &format!("/api/tracks/{}", id))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "success");

    for field in ["songTitle", "artistName", "albumName", "genre", "duration", "releaseYear"] {
        assert_eq!(body["data"][field], submitted[field], "field {} differs", field);
    }
    assert_eq!(body["data"]["trackId"], id);
    assert!(body["data"]["createdAt"].is_string());
    assert!(body["data"]["updatedAt"].is_string());
}

#[tokio::test]
async fn test_release_year_bounds_on_create() {
    let (app, _db) = setup_app().await;

    let mut body = stairway();
    body["releaseYear"] = json!(1899);
    let (status, response) = create(&app, &body).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(response["error"], "Validation error");
    assert_eq!(response["details"][0]["field"], "releaseYear");
    assert!(response["details"][0]["message"]
        .as_str()
        .unwrap()
        .contains("1900"));

    body["releaseYear"] = json!(chrono::Local::now().year());
    let (status, _) = create(&app, &body).await;
    assert_eq!(status, StatusCode::CREATED);
}

#[tokio::test]
async fn test_zero_duration_reported_as_missing() {
    let (app, db) = setup_app().await;

    let mut body = stairway();
    body["duration"] = json!(0);
    let (status, response) = create(&app, &body).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(response["error"], "Missing required fields");
    assert_eq!(response["missing"], json!(["duration"]));
    assert_eq!(response["required"].as_array().unwrap().len(), 6);
    assert_eq!(response["received"], body);

    assert_eq!(mlib_common::db::tracks::count_tracks(&db).await.unwrap(), 0);
}

#[tokio::test]
async fn test_create_coerces_numeric_strings() {
    let (app, _db) = setup_app().await;

    let mut body = stairway();
    body["duration"] = json!("482");
    body["releaseYear"] = json!("1971");
    let (status, response) = create(&app, &body).await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(response["data"]["duration"], 482);
    assert_eq!(response["data"]["releaseYear"], 1971);
}

#[tokio::test]
async fn test_create_rejects_non_numeric_duration() {
    let (app, _db) = setup_app().await;

    let mut body = stairway();
    body["duration"] = json!("eight minutes");
    let (status, response) = create(&app, &body).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        response["details"],
        json!([{ "field": "duration", "message": "Duration must be an integer" }])
    );
}

#[tokio::test]
async fn test_create_rejects_duration_beyond_integer_range() {
    let (app, _db) = setup_app().await;

    let mut body = stairway();
    body["duration"] = json!(1e300);
    let (status, response) = create(&app, &body).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        response["details"],
        json!([{ "field": "duration", "message": "Duration must be an integer" }])
    );

    let (_, list) = send(&app, empty_request("GET", "/api/tracks")).await;
    assert_eq!(list["count"], 0);
}

#[tokio::test]
async fn test_create_reports_every_invalid_field() {
    let (app, _db) = setup_app().await;

    let mut body = stairway();
    body["songTitle"] = json!("   ");
    body["duration"] = json!(-5);
    body["releaseYear"] = json!(3000);
    let (status, response) = create(&app, &body).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    let fields: Vec<_> = response["details"]
        .as_array()
        .unwrap()
        .iter()
        .map(|d| d["field"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(fields, vec!["songTitle", "duration", "releaseYear"]);
}

#[tokio::test]
async fn test_create_with_unreadable_body() {
    let (app, _db) = setup_app().await;

    let request = Request::builder()
        .method("POST")
        .uri("/api/tracks")
        .header("content-type", "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let (status, response) = send(&app, request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(response["error"], "Missing required fields");
    assert_eq!(response["missing"].as_array().unwrap().len(), 6);
}

// =============================================================================
// Read
// =============================================================================

#[tokio::test]
async fn test_get_unknown_id() {
    let (app, _db) = setup_app().await;

    let (status, body) = send(&app, empty_request("GET", "/api/tracks/99999")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Track not found");
    assert_eq!(body["message"], "No track found with ID 99999");

    let (status, _) = send(&app, empty_request("GET", "/api/tracks/abc")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_list_count_tracks_creates_minus_deletes() {
    let (app, _db) = setup_app().await;

    let (status, body) = send(&app, empty_request("GET", "/api/tracks")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 0);

    let mut ids = Vec::new();
    for _ in 0..5 {
        let (_, created) = create(&app, &stairway()).await;
        ids.push(created["data"]["trackId"].as_i64().unwrap());
    }
    for id in &ids[..2] {
        send(&app, empty_request("DELETE", &format!("/api/tracks/{}", id))).await;
    }

    let (status, body) = send(&app, empty_request("GET", "/api/tracks")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "success");
    assert_eq!(body["count"], 3);
    assert_eq!(body["data"].as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn test_store_failure_is_500() {
    let (app, db) = setup_app().await;
    db.close().await;

    let (status, body) = send(&app, empty_request("GET", "/api/tracks")).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "Failed to retrieve tracks");
    assert!(body["details"].is_string());
}

#[tokio::test]
async fn test_store_failure_names_the_failed_action() {
    let (app, db) = setup_app().await;
    let (_, created) = create(&app, &stairway()).await;
    let uri = format!("/api/tracks/{}", created["data"]["trackId"]);
    db.close().await;

    let cases = [
        (empty_request("GET", &uri), "Failed to retrieve track"),
        (json_request("POST", "/api/tracks", &stairway()), "Failed to create track"),
        (json_request("PUT", &uri, &stairway()), "Failed to update track"),
        (empty_request("DELETE", &uri), "Failed to delete track"),
    ];

    for (request, expected) in cases {
        let method = request.method().clone();
        let (status, body) = send(&app, request).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR, "{method}");
        assert_eq!(body["error"], expected, "{method}");
        assert!(body["details"].is_string(), "{method}");
    }
}

// =============================================================================
// Update
// =============================================================================

#[tokio::test]
async fn test_update_unknown_id_is_404_regardless_of_body() {
    let (app, _db) = setup_app().await;

    let (status, _) = send(&app, json_request("PUT", "/api/tracks/99999", &stairway())).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&app, json_request("PUT", "/api/tracks/99999", &json!({}))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let mut invalid = stairway();
    invalid["releaseYear"] = json!(1800);
    let (status, _) = send(&app, json_request("PUT", "/api/tracks/99999", &invalid)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_update_replaces_all_fields() {
    let (app, _db) = setup_app().await;
    let (_, created) = create(&app, &stairway()).await;
    let id = created["data"]["trackId"].as_i64().unwrap();
    let uri = format!("/api/tracks/{}", id);

    let replacement = json!({
        "songTitle": "Good Vibrations",
        "artistName": "The Beach Boys",
        "albumName": "Pet Sounds",
        "genre": "Pop",
        "duration": 219,
        "releaseYear": 1966
    });
    let (status, body) = send(&app, json_request("PUT", &uri, &replacement)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Track updated successfully");
    assert_eq!(body["data"]["trackId"], id);
    assert_eq!(body["data"]["songTitle"], "Good Vibrations");
    assert_eq!(body["data"]["createdAt"], created["data"]["createdAt"]);

    let (_, fetched) = send(&app, empty_request("GET", &uri)).await;
    assert_eq!(fetched["data"], body["data"]);
}

#[tokio::test]
async fn test_update_missing_and_invalid_fields() {
    let (app, _db) = setup_app().await;
    let (_, created) = create(&app, &stairway()).await;
    let uri = format!("/api/tracks/{}", created["data"]["trackId"]);

    let mut missing = stairway();
    missing["genre"] = json!("");
    let (status, body) = send(&app, json_request("PUT", &uri, &missing)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Missing required fields");

    let mut invalid = stairway();
    invalid["releaseYear"] = json!(1899);
    let (status, body) = send(&app, json_request("PUT", &uri, &invalid)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Validation error");

    let (_, fetched) = send(&app, empty_request("GET", &uri)).await;
    assert_eq!(fetched["data"]["genre"], "Rock");
    assert_eq!(fetched["data"]["releaseYear"], 1971);
}

// =============================================================================
// Delete
// =============================================================================

#[tokio::test]
async fn test_delete_echoes_snapshot_and_removes_row() {
    let (app, _db) = setup_app().await;
    let (_, created) = create(&app, &stairway()).await;
    let id = created["data"]["trackId"].as_i64().unwrap();
    let uri = format!("/api/tracks/{}", id);

    let (status, body) = send(&app, empty_request("DELETE", &uri)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Track deleted successfully");
    assert_eq!(
        body["data"],
        json!({
            "trackId": id,
            "songTitle": "Stairway to Heaven",
            "artistName": "Led Zeppelin"
        })
    );

    let (status, _) = send(&app, empty_request("GET", &uri)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&app, empty_request("DELETE", &uri)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

// =============================================================================
// File-backed store
// =============================================================================

#[tokio::test]
async fn test_tracks_survive_router_restart() {
    let dir = tempfile::TempDir::new().unwrap();
    let db_path = dir.path().join("music_library.db");

    let db = init_database(&db_path).await.unwrap();
    let app = build_router(AppState::new(db.clone()));
    let (status, created) = create(&app, &stairway()).await;
    assert_eq!(status, StatusCode::CREATED);
    db.close().await;

    let db = init_database(&db_path).await.unwrap();
    let app = build_router(AppState::new(db));
    let uri = format!("/api/tracks/{}", created["data"]["trackId"]);
    let (status, fetched) = send(&app, empty_request("GET", &uri)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["data"]["songTitle"], "Stairway to Heaven");
}
