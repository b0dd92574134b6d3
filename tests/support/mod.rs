//! Shared helpers for integration tests: a wiremock stand-in for the
//! broker's message and Jolokia endpoints.

// Not every test binary uses every helper.
#![allow(dead_code)]

use brokerlink::config::ConnectionConfig;
use serde_json::{json, Value};
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Broker identity served by the stub's discovery responses
pub const BROKER_NAME: &str = "main";

pub fn broker_mbean() -> String {
    format!("org.apache.activemq:type=Broker,brokerName={BROKER_NAME}")
}

pub fn queue_mbean(name: &str) -> String {
    format!("{},destinationType=Queue,destinationName={name}", broker_mbean())
}

pub fn topic_mbean(name: &str) -> String {
    format!("{},destinationType=Topic,destinationName={name}", broker_mbean())
}

/// Connection config pointing at a mock server
pub fn config_for(server: &MockServer) -> ConnectionConfig {
    let address = server.address();
    ConnectionConfig {
        port: address.port(),
        timeout_ms: 2_000,
        ..ConnectionConfig::new(address.ip().to_string())
    }
}

/// Jolokia success envelope
pub fn jolokia_ok(value: Value) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({"status": 200, "value": value}))
}

/// Jolokia error envelope (HTTP 200, body-level failure)
pub fn jolokia_error(status: u16, message: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({"status": status, "error": message}))
}

/// Broker MBean attributes for a quiet, healthy broker
pub fn healthy_broker_attrs() -> Value {
    json!({
        "TotalConnectionsCount": 3,
        "TotalConsumerCount": 2,
        "TotalProducerCount": 1,
        "TotalEnqueueCount": 40,
        "TotalDequeueCount": 30,
        "TotalMessageCount": 10,
        "MemoryUsage": 10,
        "MemoryLimit": 100,
        "StoreUsage": 10,
        "StoreLimit": 100,
        "TempUsage": 0,
        "TempLimit": 100
    })
}

/// Mount the wildcard-search discovery response
pub async fn mount_discovery(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/api/jolokia"))
        .and(body_partial_json(json!({
            "type": "search",
            "mbean": "org.apache.activemq:type=Broker,brokerName=*"
        })))
        .respond_with(jolokia_ok(json!([broker_mbean()])))
        .mount(server)
        .await;
}

/// Mount the broker-object read with the given attributes
pub async fn mount_broker_read(server: &MockServer, attrs: Value) {
    Mock::given(method("POST"))
        .and(path("/api/jolokia"))
        .and(body_partial_json(json!({"type": "read", "mbean": broker_mbean()})))
        .respond_with(jolokia_ok(attrs))
        .mount(server)
        .await;
}

/// Mount everything a successful `connect()` needs
pub async fn mount_connectable(server: &MockServer) {
    mount_discovery(server).await;
    mount_broker_read(server, healthy_broker_attrs()).await;
}

/// Mount empty queue and topic listings
pub async fn mount_empty_destinations(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/api/jolokia"))
        .and(body_partial_json(json!({"type": "search", "mbean": queue_mbean("*")})))
        .respond_with(jolokia_ok(json!([])))
        .mount(server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/jolokia"))
        .and(body_partial_json(json!({"type": "search", "mbean": topic_mbean("*")})))
        .respond_with(jolokia_ok(json!([])))
        .mount(server)
        .await;
}

/// Start a mock server that accepts connects against a healthy broker
pub async fn start_stub_broker() -> MockServer {
    let server = MockServer::start().await;
    mount_connectable(&server).await;
    server
}
