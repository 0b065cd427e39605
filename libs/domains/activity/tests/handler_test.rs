//! Handler tests for the activity domain
//!
//! These drive the audit query router directly against the in-memory store:
//! - pagination parameters and their defaults
//! - path scoping by actor and by action
//! - the {records, total} response envelope
//!
//! No broker and no MongoDB involved; the full pipeline is covered by
//! integration_test.rs.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use domain_activity::{
    ActivityEvent, ActivityRepository, InMemoryActivityRepository, handlers,
};
use http_body_util::BodyExt;
use tower::ServiceExt; // For oneshot()

// Helper to parse a JSON response body
async fn json_body(body: Body) -> serde_json::Value {
    let bytes = body.collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn seeded_router() -> axum::Router {
    let repo = Arc::new(InMemoryActivityRepository::new());
    repo.append(ActivityEvent::login(1, "a@x.com", None)).await.unwrap();
    repo.append(ActivityEvent::login(2, "b@x.com", None)).await.unwrap();
    handlers::router(repo)
}

#[tokio::test]
async fn test_list_activity_returns_records_and_total() {
    let app = seeded_router().await;

    let response = app
        .oneshot(Request::get("/").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let json = json_body(response.into_body()).await;
    assert_eq!(json["total"], 2);
    assert_eq!(json["records"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_list_by_actor_scopes_to_the_path_actor() {
    let app = seeded_router().await;

    let response = app
        .oneshot(Request::get("/actor/1").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let json = json_body(response.into_body()).await;
    assert_eq!(json["total"], 1);
    assert_eq!(json["records"][0]["actorId"], 1);
}

#[tokio::test]
async fn test_list_by_action_filters_on_the_wire_name() {
    let app = seeded_router().await;

    let response = app
        .oneshot(Request::get("/action/LOGIN").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let json = json_body(response.into_body()).await;
    assert_eq!(json["total"], 2);
    assert_eq!(json["records"][0]["action"], "LOGIN");
}

#[tokio::test]
async fn test_list_by_action_rejects_unknown_actions() {
    let app = seeded_router().await;

    let response = app
        .oneshot(Request::get("/action/SHOUT").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let json = json_body(response.into_body()).await;
    assert!(json["message"].as_str().unwrap().contains("SHOUT"));
}

#[tokio::test]
async fn test_pagination_params_flow_through() {
    let repo = Arc::new(InMemoryActivityRepository::new());
    for i in 0..25 {
        repo.append(ActivityEvent::login(i, format!("u{}@x.com", i), None))
            .await
            .unwrap();
    }
    let app = handlers::router(repo);

    let response = app
        .oneshot(Request::get("/?page=3&limit=10").body(Body::empty()).unwrap())
        .await
        .unwrap();

    let json = json_body(response.into_body()).await;
    assert_eq!(json["total"], 25);
    assert_eq!(json["records"].as_array().unwrap().len(), 5);
}

#[tokio::test]
async fn test_state_snapshots_survive_the_query_path() {
    let repo = Arc::new(InMemoryActivityRepository::new());
    let before = [("name".to_string(), serde_json::json!("A"))].into_iter().collect();
    let after = [("name".to_string(), serde_json::json!("B"))].into_iter().collect();
    repo.append(ActivityEvent::updated(7, "a@x.com", None, before, after))
        .await
        .unwrap();
    let app = handlers::router(repo);

    let response = app
        .oneshot(Request::get("/actor/7").body(Body::empty()).unwrap())
        .await
        .unwrap();

    let json = json_body(response.into_body()).await;
    let record = &json["records"][0];
    assert_eq!(record["beforeState"]["name"], "A");
    assert_eq!(record["afterState"]["name"], "B");
}
