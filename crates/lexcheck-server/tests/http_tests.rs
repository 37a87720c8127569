use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

use lexcheck_core::config::Config;
use lexcheck_core::db::Db;
use lexcheck_core::engine::Engine;
use lexcheck_server::{router, AppState};
use lexcheck_sources::seed;

fn app_with(config: Config) -> Router {
    let db = Db::open(":memory:").expect("open db");
    db.migrate().expect("migrate");
    let config = Arc::new(config);
    let engine = Arc::new(Engine::new(
        Arc::new(seed::rule_table()),
        Arc::new(seed::charge_registry()),
        Arc::new(seed::caselaw_corpus()),
        Arc::new(db),
        config.clone(),
    ));
    router(Arc::new(AppState::new(engine, config)))
}

fn app() -> Router {
    app_with(Config::default())
}

fn post(uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .expect("build request")
}

async fn json_body(response: axum::response::Response) -> Value {
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("read body")
        .to_bytes();
    serde_json::from_slice(&bytes).expect("parse body")
}

fn validation_request() -> Value {
    json!({
        "jurisdiction": "CA",
        "chargeCodes": ["ca-disorderly-conduct"],
        "caseStage": "pretrial",
        "custodyStatus": "released",
        "hasAttorney": false,
        "guidanceStatements": [
            { "statementType": "notarization_required", "claimedValue": "false" },
            { "statementType": "arraignment_deadline_hours", "claimedValue": "48" }
        ]
    })
}

fn feedback_request(session: &str, case: &str, helpful: bool) -> Value {
    json!({
        "sessionId": session,
        "caseId": case,
        "caseName": "People v. Aguilar",
        "jurisdiction": "CA",
        "chargeCategory": "public-order",
        "isHelpful": helpful,
        "caseStage": "pretrial"
    })
}

#[tokio::test]
async fn test_health_endpoint() {
    let response = app()
        .oneshot(
            Request::builder()
                .uri("/health")
                .body(Body::empty())
                .expect("build request"),
        )
        .await
        .expect("send request");

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await["status"], "ok");
}

#[tokio::test]
async fn test_validation_returns_full_envelope() {
    let response = app()
        .oneshot(post("/validation", &validation_request()))
        .await
        .expect("send request");
    assert_eq!(response.status(), StatusCode::OK);

    let body = json_body(response).await;
    let confidence = body["confidenceScore"].as_f64().expect("confidenceScore");
    assert!((0.0..=1.0).contains(&confidence));
    assert!(body["isValid"].as_bool().expect("isValid"));
    assert!(body["tiers"]["tier1"].is_object());
    assert!(!body["precedents"].as_array().expect("precedents").is_empty());
    for p in body["precedents"].as_array().expect("precedents") {
        assert_eq!(p["precedent"]["jurisdiction"], "CA");
    }
}

#[tokio::test]
async fn test_validation_unknown_jurisdiction_is_400() {
    let mut req = validation_request();
    req["jurisdiction"] = json!("ZZ");

    let response = app()
        .oneshot(post("/validation", &req))
        .await
        .expect("send request");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = json_body(response).await;
    assert_eq!(body["error"], "invalid_case_context");
    assert_eq!(body["field"], "jurisdiction");
}

#[tokio::test]
async fn test_validation_unknown_charge_code_is_400() {
    let mut req = validation_request();
    req["chargeCodes"] = json!(["ca-made-up"]);

    let response = app()
        .oneshot(post("/validation", &req))
        .await
        .expect("send request");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = json_body(response).await;
    assert_eq!(body["error"], "invalid_case_context");
    assert_eq!(body["field"], "chargeCodes");
}

#[tokio::test]
async fn test_feedback_resubmission_is_200_both_times() {
    let app = app();

    let first = app
        .clone()
        .oneshot(post(
            "/case-feedback",
            &feedback_request("sess-1", "ca-1993-aguilar", true),
        ))
        .await
        .expect("send request");
    assert_eq!(first.status(), StatusCode::OK);

    let second = app
        .oneshot(post(
            "/case-feedback",
            &feedback_request("sess-1", "ca-1993-aguilar", false),
        ))
        .await
        .expect("send request");
    assert_eq!(second.status(), StatusCode::OK);

    // The stored record reflects the latest vote.
    let body = json_body(second).await;
    assert_eq!(body["sessionId"], "sess-1");
    assert_eq!(body["precedentId"], "ca-1993-aguilar");
    assert_eq!(body["isHelpful"], false);
}

#[tokio::test]
async fn test_feedback_empty_session_is_400() {
    let response = app()
        .oneshot(post(
            "/case-feedback",
            &feedback_request("", "ca-1993-aguilar", true),
        ))
        .await
        .expect("send request");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = json_body(response).await;
    assert_eq!(body["error"], "invalid_feedback");
    assert_eq!(body["field"], "sessionId");
}

#[tokio::test]
async fn test_feedback_rate_limit_is_429() {
    let config = Config {
        feedback_rate_limit: 2,
        ..Config::default()
    };
    let app = app_with(config);

    for case in ["ca-1993-aguilar", "ca-2018-taylor"] {
        let response = app
            .clone()
            .oneshot(post("/case-feedback", &feedback_request("sess-rl", case, true)))
            .await
            .expect("send request");
        assert_eq!(response.status(), StatusCode::OK);
    }

    let third = app
        .oneshot(post(
            "/case-feedback",
            &feedback_request("sess-rl", "ca-2021-okafor", true),
        ))
        .await
        .expect("send request");
    assert_eq!(third.status(), StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(json_body(third).await["error"], "rate_limited");
}

#[tokio::test]
async fn test_session_feedback_listing() {
    let app = app();

    for case in ["ca-2018-taylor", "ca-1993-aguilar"] {
        let response = app
            .clone()
            .oneshot(post("/case-feedback", &feedback_request("sess-list", case, true)))
            .await
            .expect("send request");
        assert_eq!(response.status(), StatusCode::OK);
    }

    let response = app
        .oneshot(
            Request::builder()
                .uri("/case-feedback/sess-list")
                .body(Body::empty())
                .expect("build request"),
        )
        .await
        .expect("send request");
    assert_eq!(response.status(), StatusCode::OK);

    let body = json_body(response).await;
    let records = body["feedback"].as_array().expect("feedback array");
    assert_eq!(records.len(), 2);
    // Listing is ordered by precedent id, not insertion order.
    assert_eq!(records[0]["precedentId"], "ca-1993-aguilar");
    assert_eq!(records[1]["precedentId"], "ca-2018-taylor");
}
