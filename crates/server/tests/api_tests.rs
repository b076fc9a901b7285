//! Integration tests for the OSB HTTP surface.

mod common;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use common::*;
use osbridge_executor::backends::mock::{
    MOCK_CLUSTER_IP, MOCK_DATABASE, MOCK_EXTERNAL_IP, MOCK_PASSWORD,
};
use osbridge_executor::{ExecutorError, MockExecutor};
use serde_json::json;
use std::sync::Arc;

#[tokio::test]
async fn test_catalog_lists_single_service() {
    let server = TestServer::new();

    let (status, body) = server.request("GET", "/v2/catalog", None).await;
    assert_eq!(status, StatusCode::OK);

    let services = body["services"].as_array().unwrap();
    assert_eq!(services.len(), 1);
    assert_eq!(services[0]["id"], SERVICE_ID);
    assert_eq!(services[0]["name"], "pgo-osb-service");
    assert_eq!(services[0]["bindable"], true);
    assert_eq!(services[0]["plans"].as_array().unwrap().len(), 7);
}

#[tokio::test]
async fn test_provision_bind_unbind_deprovision() {
    let server = TestServer::new();
    let instance = instance_uri(INSTANCE_ID);
    let binding = binding_uri(INSTANCE_ID, BINDING_ID);

    let (status, body) = server
        .request("PUT", &instance, Some(provision_body("unitinstance", "demo")))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body, json!({}));

    let (status, body) = server.request("PUT", &binding, Some(bind_body())).await;
    assert_eq!(status, StatusCode::CREATED);
    let creds = &body["credentials"];
    let username = MockExecutor::username_for(BINDING_ID);
    assert_eq!(creds["username"], username.as_str());
    assert_eq!(creds["password"], MOCK_PASSWORD);
    assert_eq!(creds["db_port"], 5432);
    assert_eq!(creds["db_name"], MOCK_DATABASE);
    assert_eq!(creds["db_host"], MOCK_EXTERNAL_IP);
    assert_eq!(creds["internal_host"], MOCK_CLUSTER_IP);
    assert_eq!(
        creds["uri"],
        format!("postgresql://{username}:{MOCK_PASSWORD}@{MOCK_EXTERNAL_IP}:5432/{MOCK_DATABASE}")
    );

    // Bindings still exist: the cluster is kept.
    let (status, body) = server.request("DELETE", &instance, None).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "bindings_remain");

    let (status, body) = server.request("DELETE", &binding, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({}));

    let (status, _) = server.request("DELETE", &instance, None).await;
    assert_eq!(status, StatusCode::OK);

    // The instance is gone now.
    let (status, body) = server.request("PUT", &binding, Some(bind_body())).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "instance_not_found");
}

#[tokio::test]
async fn test_bind_is_idempotent() {
    let server = TestServer::new();
    let binding = binding_uri(INSTANCE_ID, BINDING_ID);
    server
        .request(
            "PUT",
            &instance_uri(INSTANCE_ID),
            Some(provision_body("unitinstance", "demo")),
        )
        .await;

    let (_, first) = server.request("PUT", &binding, Some(bind_body())).await;
    let (status, second) = server.request("PUT", &binding, Some(bind_body())).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(first, second);
}

#[tokio::test]
async fn test_provision_missing_parameters() {
    let server = TestServer::new();
    let instance = instance_uri(INSTANCE_ID);

    let mut body = provision_body("unitinstance", "demo");
    body["parameters"] = json!({"NAMESPACE": "demo"});
    let (status, resp) = server.request("PUT", &instance, Some(body)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(resp["error"], "missing_parameter");
    assert!(resp["description"].as_str().unwrap().contains("CLUSTERNAME"));

    let mut body = provision_body("unitinstance", "demo");
    body["parameters"] = json!({"CLUSTERNAME": "unitinstance"});
    let (status, resp) = server.request("PUT", &instance, Some(body)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(resp["description"].as_str().unwrap().contains("NAMESPACE"));

    let mut body = provision_body("unitinstance", "demo");
    body.as_object_mut().unwrap().remove("parameters");
    let (status, _) = server.request("PUT", &instance, Some(body)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_provision_unknown_plan_uses_default() {
    let server = TestServer::new();
    let mut body = provision_body("unitinstance", "demo");
    body["plan_id"] = json!("not-a-published-plan");

    let (status, _) = server
        .request("PUT", &instance_uri(INSTANCE_ID), Some(body))
        .await;
    assert_eq!(status, StatusCode::CREATED);
}

#[tokio::test]
async fn test_malformed_json_is_bad_request() {
    let server = TestServer::new();
    let request = Request::builder()
        .method("PUT")
        .uri(instance_uri(INSTANCE_ID))
        .header("Content-Type", "application/json")
        .body(Body::from("{not json"))
        .unwrap();

    let (status, bytes) = server.send(request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["error"], "bad_request");
}

#[tokio::test]
async fn test_deprovision_unknown_instance_succeeds() {
    let server = TestServer::new();
    let (status, body) = server
        .request("DELETE", &instance_uri("never-provisioned"), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({}));
}

#[tokio::test]
async fn test_deprovision_gone_instance_is_never_accepted_async() {
    let server = TestServer::builder().async_enabled(true).build();
    let uri = format!(
        "{}?accepts_incomplete=true",
        instance_uri("never-provisioned")
    );

    let (status, body) = server.request("DELETE", &uri, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({}));
}

#[tokio::test]
async fn test_bind_unknown_instance_not_found() {
    let server = TestServer::new();
    let (status, body) = server
        .request(
            "PUT",
            &binding_uri("never-provisioned", BINDING_ID),
            Some(bind_body()),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "instance_not_found");
}

#[tokio::test]
async fn test_async_only_when_enabled_and_accepted() {
    let sync_server = TestServer::new();
    let uri = format!("{}?accepts_incomplete=true", instance_uri(INSTANCE_ID));
    let (status, _) = sync_server
        .request("PUT", &uri, Some(provision_body("unitinstance", "demo")))
        .await;
    assert_eq!(status, StatusCode::CREATED);

    let server = TestServer::builder().async_enabled(true).build();
    let (status, _) = server
        .request(
            "PUT",
            &instance_uri(INSTANCE_ID),
            Some(provision_body("unitinstance", "demo")),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, _) = server
        .request("PUT", &uri, Some(provision_body("unitinstance", "demo")))
        .await;
    assert_eq!(status, StatusCode::ACCEPTED);

    let (status, _) = server
        .request(
            "PATCH",
            &uri,
            Some(json!({"service_id": SERVICE_ID, "plan_id": SMALL_PLAN_ID})),
        )
        .await;
    assert_eq!(status, StatusCode::ACCEPTED);

    let (status, _) = server.request("DELETE", &uri, None).await;
    assert_eq!(status, StatusCode::ACCEPTED);
}

#[tokio::test]
async fn test_update_is_noop() {
    let server = TestServer::new();
    let (status, body) = server
        .request(
            "PATCH",
            &instance_uri(INSTANCE_ID),
            Some(json!({"service_id": SERVICE_ID, "plan_id": SMALL_PLAN_ID})),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({}));
}

#[tokio::test]
async fn test_last_operation_returns_empty_body() {
    let server = TestServer::new();
    let (status, body) = server
        .request(
            "GET",
            &format!("{}/last_operation", instance_uri(INSTANCE_ID)),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({}));
}

#[tokio::test]
async fn test_unbind_swallows_executor_errors() {
    let server = TestServer::builder()
        .executor(Arc::new(FailingExecutor {
            error: || ExecutorError::TransportFailure("connection refused".into()),
        }))
        .build();

    let (status, body) = server
        .request("DELETE", &binding_uri(INSTANCE_ID, BINDING_ID), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({}));
}

#[tokio::test]
async fn test_downstream_failures_map_to_bad_gateway() {
    let server = TestServer::builder()
        .executor(Arc::new(FailingExecutor {
            error: || ExecutorError::DownstreamRejected("cluster already exists".into()),
        }))
        .build();

    let (status, body) = server
        .request(
            "PUT",
            &instance_uri(INSTANCE_ID),
            Some(provision_body("unitinstance", "demo")),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["error"], "downstream_rejected");
    assert!(
        body["description"]
            .as_str()
            .unwrap()
            .contains("cluster already exists")
    );
}

#[tokio::test]
async fn test_downstream_auth_failure_is_unauthorized() {
    let server = TestServer::builder()
        .executor(Arc::new(FailingExecutor {
            error: || ExecutorError::AuthenticationFailed,
        }))
        .build();

    let (status, body) = server
        .request(
            "PUT",
            &binding_uri(INSTANCE_ID, BINDING_ID),
            Some(bind_body()),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "authentication_failed");
}

#[tokio::test]
async fn test_healthz() {
    let server = TestServer::new();
    let (status, body) = server.request("GET", "/healthz", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["executor"], "mock");
}

#[tokio::test]
async fn test_metrics_endpoint() {
    let server = TestServer::new();
    server.request("GET", "/v2/catalog", None).await;
    server
        .request("DELETE", &instance_uri("metrics-instance"), None)
        .await;

    let request = Request::builder()
        .uri("/metrics")
        .body(Body::empty())
        .unwrap();
    let (status, bytes) = server.send(request).await;
    assert_eq!(status, StatusCode::OK);
    let text = String::from_utf8(bytes).unwrap();
    assert!(text.contains("osbridge_requests_total"));
    assert!(text.contains("verb=\"deprovision\""));
}

#[tokio::test]
async fn test_metrics_disabled() {
    let server = TestServer::builder().metrics_enabled(false).build();
    let request = Request::builder()
        .uri("/metrics")
        .body(Body::empty())
        .unwrap();
    let (status, _) = server.send(request).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
