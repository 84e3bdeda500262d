use super::common::*;
use axum::body::Body;
use axum::extract::{Path, State};
use axum::http::{header, HeaderMap, HeaderValue, Request, StatusCode};
use serde_json::json;
use std::sync::Arc;
use tower::ServiceExt;

use crate::config::MeritConfig;
use crate::workflows::merit::router::{generate_handler, list_handler};
use crate::workflows::merit::{merit_router, MeritListService, ACTOR_HEADER};

fn applicants() -> Vec<crate::workflows::merit::Application> {
    vec![
        application("app-a", "REG-A", json!({ "cgpa": "3.5", "income_score": 80 })),
        application("app-b", "REG-B", json!({ "cgpa": "3.8", "income_score": 70 })),
    ]
}

#[tokio::test]
async fn generate_route_returns_created_summary() {
    let fixture = build_service(scholarship(Some(1)), applicants());
    let router = merit_router(Arc::new(fixture.service));

    let response = router
        .oneshot(
            Request::post("/api/v1/scholarships/sch-merit/merit-list")
                .header(ACTOR_HEADER, "admin-9")
                .body(Body::empty())
                .expect("request builds"),
        )
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::CREATED);
    let payload = read_json_body(response).await;
    assert_eq!(payload["total_applications"], json!(2));
    assert_eq!(payload["selected_count"], json!(1));
    assert_eq!(payload["waitlist_count"], json!(1));
    assert!(payload.get("cutoff_score").is_some());
}

#[tokio::test]
async fn generate_handler_maps_preconditions_to_unprocessable() {
    let fixture = build_service(scholarship(None), applicants());

    let response = generate_handler(
        State(Arc::new(fixture.service)),
        Path("sch-merit".to_string()),
        HeaderMap::new(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let payload = read_json_body(response).await;
    assert!(payload["error"]
        .as_str()
        .unwrap_or_default()
        .contains("number of awards"));
}

#[tokio::test]
async fn generate_handler_maps_unknown_scholarship_to_not_found() {
    let fixture = build_service(scholarship(Some(1)), applicants());

    let response = generate_handler(
        State(Arc::new(fixture.service)),
        Path("sch-unknown".to_string()),
        HeaderMap::new(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn generate_handler_maps_store_failures_to_internal_error() {
    let service = MeritListService::new(
        Arc::new(MemoryApplications::with(applicants())),
        Arc::new(MemoryScholarships::with(scholarship(Some(1)))),
        Arc::new(ReadOnlyMeritLists::default()),
        Arc::new(MemoryNotifications::default()),
        MeritConfig::default(),
    );

    let mut headers = HeaderMap::new();
    headers.insert(ACTOR_HEADER, HeaderValue::from_static("admin-3"));
    let response = generate_handler(
        State(Arc::new(service)),
        Path("sch-merit".to_string()),
        headers,
    )
    .await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn list_handler_returns_entries_in_rank_order() {
    let fixture = build_service(scholarship(Some(1)), applicants());
    let service = Arc::new(fixture.service);
    service
        .generate(
            &crate::workflows::merit::RequestContext::anonymous(),
            &scholarship_id(),
        )
        .expect("generation succeeds");

    let response = list_handler(State(service), Path("sch-merit".to_string())).await;

    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    let entries = payload.as_array().expect("array payload");
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0]["rank"], json!(1));
    assert_eq!(entries[0]["student_regno"], json!("REG-A"));
    assert_eq!(entries[0]["status"], json!("selected"));
    assert_eq!(entries[1]["status"], json!("waitlist"));
    assert!(entries[0]["score_breakdown"].get("cgpa").is_some());
}

#[tokio::test]
async fn status_route_applies_manual_edits() {
    let fixture = build_service(scholarship(Some(1)), applicants());
    let merit_lists = fixture.merit_lists.clone();
    let service = Arc::new(fixture.service);
    service
        .generate(
            &crate::workflows::merit::RequestContext::anonymous(),
            &scholarship_id(),
        )
        .expect("generation succeeds");
    let router = merit_router(service);

    let response = router
        .clone()
        .oneshot(
            Request::patch("/api/v1/scholarships/sch-merit/merit-list/REG-B")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(
                    serde_json::to_vec(&json!({ "status": "awarded" })).expect("serializes"),
                ))
                .expect("request builds"),
        )
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    assert_eq!(payload["status"], json!("awarded"));
    assert_eq!(payload["rank"], json!(2));

    let stored = merit_lists.stored(&scholarship_id());
    assert!(stored
        .iter()
        .any(|entry| entry.student_regno == regno("REG-B")
            && entry.status == crate::workflows::merit::MeritStatus::Awarded));

    let missing = router
        .oneshot(
            Request::patch("/api/v1/scholarships/sch-merit/merit-list/REG-Z")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(r#"{"status":"pending"}"#))
                .expect("request builds"),
        )
        .await
        .expect("route executes");
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn malformed_status_body_gets_json_error() {
    let fixture = build_service(scholarship(Some(1)), applicants());
    let service = Arc::new(fixture.service);
    service
        .generate(
            &crate::workflows::merit::RequestContext::anonymous(),
            &scholarship_id(),
        )
        .expect("generation succeeds");
    let router = merit_router(service);

    let response = router
        .oneshot(
            Request::patch("/api/v1/scholarships/sch-merit/merit-list/REG-A")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(r#"{"status":"expelled"}"#))
                .expect("request builds"),
        )
        .await
        .expect("route executes");

    assert!(response.status().is_client_error());
    let payload = read_json_body(response).await;
    assert!(payload["error"]
        .as_str()
        .unwrap_or_default()
        .starts_with("invalid request body"));
}
