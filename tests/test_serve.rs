//! Handler-level tests for the scoring service

use tiny_http::Method;

use lendscore::serve::ScoreService;

#[path = "common/mod.rs"]
mod common;

fn service() -> ScoreService {
    let (artifact, _, _) = common::train_tiny_artifact(100);
    ScoreService::new(artifact)
}

fn record_json() -> String {
    serde_json::to_string(&common::sample_record(3)).unwrap()
}

#[test]
fn test_health_endpoint() {
    let service = service();

    for path in ["/", "/health"] {
        let reply = service.handle(&Method::Get, path, "");
        assert_eq!(reply.status, 200);
        let body: serde_json::Value = serde_json::from_str(&reply.body).unwrap();
        assert_eq!(body["status"], "ok");
    }
}

#[test]
fn test_predict_returns_probability_in_range() {
    let service = service();

    let reply = service.handle(&Method::Post, "/predict", &record_json());

    assert_eq!(reply.status, 200, "body: {}", reply.body);
    let body: serde_json::Value = serde_json::from_str(&reply.body).unwrap();
    let probability = body["probability"].as_f64().unwrap();
    assert!((0.0..=1.0).contains(&probability));
    assert!(body["defaulted"].is_boolean());
}

#[test]
fn test_predict_missing_field_is_client_error() {
    let service = service();

    let mut payload: serde_json::Value = serde_json::from_str(&record_json()).unwrap();
    payload.as_object_mut().unwrap().remove("dti");

    let reply = service.handle(&Method::Post, "/predict", &payload.to_string());

    assert_eq!(reply.status, 422);
    let body: serde_json::Value = serde_json::from_str(&reply.body).unwrap();
    assert!(body["error"].as_str().unwrap().contains("dti"));
}

#[test]
fn test_predict_malformed_json_is_client_error() {
    let service = service();

    let reply = service.handle(&Method::Post, "/predict", "{not json");
    assert_eq!(reply.status, 422);
}

#[test]
fn test_predict_non_finite_value_is_client_error() {
    let service = service();

    let mut payload: serde_json::Value = serde_json::from_str(&record_json()).unwrap();
    // JSON has no NaN literal; a null numeric field fails deserialization
    payload["annual_inc"] = serde_json::Value::Null;

    let reply = service.handle(&Method::Post, "/predict", &payload.to_string());
    assert_eq!(reply.status, 422);
}

#[test]
fn test_unknown_route_is_404() {
    let service = service();

    let reply = service.handle(&Method::Get, "/nope", "");
    assert_eq!(reply.status, 404);
}

#[test]
fn test_metrics_exposition_counts_requests() {
    let service = service();

    service.handle(&Method::Post, "/predict", &record_json());
    service.handle(&Method::Post, "/predict", &record_json());
    service.handle(&Method::Post, "/predict", "{bad");

    let reply = service.handle(&Method::Get, "/metrics", "");
    assert_eq!(reply.status, 200);
    assert!(reply.content_type.starts_with("text/plain"));
    assert!(reply.body.contains("lendscore_predictions_total 2"));
    assert!(reply.body.contains("lendscore_client_errors_total 1"));
    assert!(reply.body.contains("# TYPE lendscore_predictions_total counter"));
    assert!(reply.body.contains("lendscore_uptime_seconds"));
}

#[test]
fn test_query_string_is_ignored_in_routing() {
    let service = service();

    let reply = service.handle(&Method::Get, "/health?verbose=1", "");
    assert_eq!(reply.status, 200);
}
