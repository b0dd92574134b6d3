//! Integration tests for the broker endpoint client
//!
//! A wiremock server stands in for the broker's message and Jolokia
//! endpoints. Covers the connection state machine, the identity discovery
//! fallback chain, message operations (including the 204-means-empty rule
//! and the bounded browse loop), and management reads.

mod support;

use brokerlink::client::{BrokerClient, ConsumeOptions};
use brokerlink::error::GatewayError;
use brokerlink::protocol::HealthStatus;
use serde_json::{json, Value};
use std::collections::HashMap;
use support::*;
use wiremock::matchers::{body_partial_json, body_string_contains, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn connected_client(server: &MockServer) -> BrokerClient {
    let client = BrokerClient::new(config_for(server)).unwrap();
    client.connect().await.unwrap();
    client
}

#[tokio::test]
async fn test_connect_succeeds_against_healthy_broker() {
    let server = start_stub_broker().await;
    let client = BrokerClient::new(config_for(&server)).unwrap();

    assert!(!client.is_connected());
    client.connect().await.unwrap();
    assert!(client.is_connected());

    // Idempotent: a second connect is a no-op, not an error
    client.connect().await.unwrap();
    assert!(client.is_connected());
}

#[tokio::test]
async fn test_connect_fails_when_management_endpoint_errors() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/jolokia"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let client = BrokerClient::new(config_for(&server)).unwrap();
    let result = client.connect().await;
    assert!(matches!(result, Err(GatewayError::RemoteCallFailed { .. })));
    assert!(!client.is_connected());
}

#[tokio::test]
async fn test_disconnect_clears_state_and_gates_operations() {
    let server = start_stub_broker().await;
    let client = connected_client(&server).await;

    client.disconnect();
    assert!(!client.is_connected());

    let result = client
        .consume_message("orders", &ConsumeOptions::default())
        .await;
    assert!(matches!(result, Err(GatewayError::NotConnected)));
}

#[tokio::test]
async fn test_discovery_uses_wildcard_search_first() {
    let server = MockServer::start().await;
    mount_discovery(&server).await;

    let client = BrokerClient::new(config_for(&server)).unwrap();
    assert_eq!(client.broker_name().await.unwrap(), BROKER_NAME);
}

#[tokio::test]
async fn test_discovery_falls_back_to_default_identity_probe() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/jolokia"))
        .and(body_partial_json(json!({"type": "search"})))
        .respond_with(jolokia_error(404, "search unsupported"))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/jolokia"))
        .and(body_partial_json(json!({
            "type": "read",
            "mbean": "org.apache.activemq:type=Broker,brokerName=localhost"
        })))
        .respond_with(jolokia_ok(json!({"BrokerName": "localhost"})))
        .mount(&server)
        .await;

    let client = BrokerClient::new(config_for(&server)).unwrap();
    assert_eq!(client.broker_name().await.unwrap(), "localhost");
}

#[tokio::test]
async fn test_discovery_falls_back_to_registry_listing() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/jolokia"))
        .and(body_partial_json(json!({"type": "search"})))
        .respond_with(jolokia_error(404, "no"))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/jolokia"))
        .and(body_partial_json(json!({"type": "read"})))
        .respond_with(jolokia_error(404, "no such mbean"))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/jolokia"))
        .and(body_partial_json(json!({"type": "list", "path": "org.apache.activemq"})))
        .respond_with(jolokia_ok(json!({
            "type=Broker,brokerName=listed-broker": {"desc": "Broker"}
        })))
        .mount(&server)
        .await;

    let client = BrokerClient::new(config_for(&server)).unwrap();
    assert_eq!(client.broker_name().await.unwrap(), "listed-broker");
}

#[tokio::test]
async fn test_discovery_exhausted_falls_back_to_literal_localhost() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/jolokia"))
        .respond_with(jolokia_error(404, "nothing here"))
        .mount(&server)
        .await;

    let client = BrokerClient::new(config_for(&server)).unwrap();
    assert_eq!(client.broker_name().await.unwrap(), "localhost");
}

#[tokio::test]
async fn test_discovery_result_is_cached() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/jolokia"))
        .and(body_partial_json(json!({"type": "search"})))
        .respond_with(jolokia_ok(json!([broker_mbean()])))
        .up_to_n_times(1)
        .mount(&server)
        .await;

    let client = BrokerClient::new(config_for(&server)).unwrap();
    assert_eq!(client.broker_name().await.unwrap(), BROKER_NAME);
    // The single search mock is used up; a second resolution must hit the
    // cache, not the wire.
    assert_eq!(client.broker_name().await.unwrap(), BROKER_NAME);
}

#[tokio::test]
async fn test_send_message_posts_form_with_type_discriminator() {
    let server = start_stub_broker().await;
    Mock::given(method("POST"))
        .and(path("/api/message/orders"))
        .and(query_param("type", "queue"))
        .and(body_string_contains("body=hello"))
        .and(body_string_contains("priority=high"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let client = connected_client(&server).await;
    let mut headers = HashMap::new();
    headers.insert("priority".to_string(), "high".to_string());

    let receipt = client
        .send_message("/queue/orders", &json!("hello"), &headers)
        .await
        .unwrap();
    assert!(receipt.success);
    assert_eq!(receipt.status, 200);
}

#[tokio::test]
async fn test_send_message_json_encodes_structured_bodies() {
    let server = start_stub_broker().await;
    Mock::given(method("POST"))
        .and(path("/api/message/events"))
        .and(query_param("type", "topic"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let client = connected_client(&server).await;
    let receipt = client
        .send_message("topic/events", &json!({"id": 7}), &HashMap::new())
        .await
        .unwrap();
    assert!(receipt.success);
}

#[tokio::test]
async fn test_send_message_surfaces_broker_rejection() {
    let server = start_stub_broker().await;
    Mock::given(method("POST"))
        .and(path("/api/message/orders"))
        .respond_with(ResponseTemplate::new(500).set_body_string("broker exploded"))
        .mount(&server)
        .await;

    let client = connected_client(&server).await;
    let result = client
        .send_message("orders", &json!("x"), &HashMap::new())
        .await;
    match result {
        Err(GatewayError::RemoteCallFailed {
            status, context, ..
        }) => {
            assert_eq!(status, Some(500));
            assert!(context.contains("orders"));
        }
        other => panic!("expected RemoteCallFailed, got {other:?}"),
    }
}

#[tokio::test]
async fn test_consume_returns_message_with_body() {
    let server = start_stub_broker().await;
    Mock::given(method("GET"))
        .and(path("/api/message/orders"))
        .and(query_param("type", "queue"))
        .and(query_param("oneShot", "true"))
        .respond_with(ResponseTemplate::new(200).set_body_string("hello"))
        .mount(&server)
        .await;

    let client = connected_client(&server).await;
    let message = client
        .consume_message("/queue/orders", &ConsumeOptions::default())
        .await
        .unwrap()
        .expect("message should be present");
    assert_eq!(message.body, "hello");

    // Acknowledge affordances are local no-ops and must never fail
    message.ack();
    message.nack();
}

#[tokio::test]
async fn test_consume_empty_destination_returns_none() {
    let server = start_stub_broker().await;
    Mock::given(method("GET"))
        .and(path("/api/message/empty"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;

    let client = connected_client(&server).await;
    let result = client
        .consume_message("empty", &ConsumeOptions::default())
        .await
        .unwrap();
    assert!(result.is_none());
}

#[tokio::test]
async fn test_consume_forwards_optional_parameters() {
    let server = start_stub_broker().await;
    Mock::given(method("GET"))
        .and(path("/api/message/orders"))
        .and(query_param("timeout", "1500"))
        .and(query_param("clientId", "worker-1"))
        .and(query_param("selector", "priority > 5"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;

    let client = connected_client(&server).await;
    let options = ConsumeOptions {
        timeout_ms: Some(1500),
        client_id: Some("worker-1".to_string()),
        selector: Some("priority > 5".to_string()),
    };
    let result = client.consume_message("orders", &options).await.unwrap();
    assert!(result.is_none());
}

#[tokio::test]
async fn test_browse_never_exceeds_limit_on_endless_queue() {
    let server = start_stub_broker().await;
    // The broker never signals emptiness; the loop must stop at the limit.
    Mock::given(method("GET"))
        .and(path("/api/message/busy"))
        .and(query_param("browse", "true"))
        .respond_with(ResponseTemplate::new(200).set_body_string("m"))
        .mount(&server)
        .await;

    let client = connected_client(&server).await;
    let messages = client.browse_messages("busy", 5).await.unwrap();
    assert_eq!(messages.len(), 5);
}

#[tokio::test]
async fn test_browse_stops_when_queue_drains() {
    let server = start_stub_broker().await;
    Mock::given(method("GET"))
        .and(path("/api/message/short"))
        .and(query_param("browse", "true"))
        .respond_with(ResponseTemplate::new(200).set_body_string("m"))
        .up_to_n_times(2)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/message/short"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;

    let client = connected_client(&server).await;
    let messages = client.browse_messages("short", 10).await.unwrap();
    assert_eq!(messages.len(), 2);
}

#[tokio::test]
async fn test_purge_returns_reported_count() {
    let server = start_stub_broker().await;
    Mock::given(method("POST"))
        .and(path("/api/jolokia"))
        .and(body_partial_json(json!({
            "type": "exec",
            "mbean": queue_mbean("orders"),
            "operation": "purge"
        })))
        .respond_with(jolokia_ok(json!(42)))
        .mount(&server)
        .await;

    let client = connected_client(&server).await;
    assert_eq!(client.purge_queue("/queue/orders").await.unwrap(), 42);
}

#[tokio::test]
async fn test_purge_defaults_to_zero_when_count_absent() {
    let server = start_stub_broker().await;
    Mock::given(method("POST"))
        .and(path("/api/jolokia"))
        .and(body_partial_json(json!({"type": "exec", "operation": "purge"})))
        .respond_with(jolokia_ok(Value::Null))
        .mount(&server)
        .await;

    let client = connected_client(&server).await;
    assert_eq!(client.purge_queue("orders").await.unwrap(), 0);
}

#[tokio::test]
async fn test_queue_info_parses_counters() {
    let server = start_stub_broker().await;
    Mock::given(method("POST"))
        .and(path("/api/jolokia"))
        .and(body_partial_json(json!({"type": "read", "mbean": queue_mbean("orders")})))
        .respond_with(jolokia_ok(json!({
            "QueueSize": 3,
            "ConsumerCount": 1,
            "EnqueueCount": 10,
            "DequeueCount": 7
        })))
        .mount(&server)
        .await;

    let client = connected_client(&server).await;
    let info = client.get_queue_info("orders").await.unwrap();
    assert_eq!(info.name, "orders");
    assert_eq!(info.size, 3);
    assert_eq!(info.consumer_count, 1);
    assert_eq!(info.enqueue_count, 10);
    assert_eq!(info.dequeue_count, 7);
    assert!(info.error.is_none());
}

#[tokio::test]
async fn test_queue_info_degrades_on_management_miss() {
    let server = start_stub_broker().await;
    Mock::given(method("POST"))
        .and(path("/api/jolokia"))
        .and(body_partial_json(json!({"type": "read", "mbean": queue_mbean("ghost")})))
        .respond_with(jolokia_error(404, "no such destination"))
        .mount(&server)
        .await;

    let client = connected_client(&server).await;
    let info = client.get_queue_info("ghost").await.unwrap();
    assert_eq!(info.name, "ghost");
    assert_eq!(info.size, 0);
    assert_eq!(info.error.as_deref(), Some("no such destination"));
}

#[tokio::test]
async fn test_list_queues_filters_advisory_destinations() {
    let server = start_stub_broker().await;
    Mock::given(method("POST"))
        .and(path("/api/jolokia"))
        .and(body_partial_json(json!({"type": "search", "mbean": queue_mbean("*")})))
        .respond_with(jolokia_ok(json!([
            queue_mbean("orders"),
            queue_mbean("ActiveMQ.Advisory.Consumer.Queue.orders"),
            queue_mbean("billing"),
        ])))
        .mount(&server)
        .await;

    let client = connected_client(&server).await;
    let queues = client.list_queues().await.unwrap();
    assert_eq!(queues, vec!["billing".to_string(), "orders".to_string()]);
}

#[tokio::test]
async fn test_broker_info_health_and_stats() {
    let server = MockServer::start().await;
    mount_discovery(&server).await;
    mount_broker_read(
        &server,
        json!({
            "TotalConnectionsCount": 5,
            "TotalConsumerCount": 4,
            "TotalProducerCount": 2,
            "TotalEnqueueCount": 100,
            "TotalDequeueCount": 90,
            "TotalMessageCount": 10,
            "MemoryUsage": 95,
            "MemoryLimit": 100,
            "StoreUsage": 10,
            "StoreLimit": 100,
            "TempUsage": 0,
            "TempLimit": 0
        }),
    )
    .await;
    Mock::given(method("POST"))
        .and(path("/api/jolokia"))
        .and(body_partial_json(json!({"type": "search", "mbean": queue_mbean("*")})))
        .respond_with(jolokia_ok(json!([queue_mbean("orders"), queue_mbean("billing")])))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/jolokia"))
        .and(body_partial_json(json!({"type": "search", "mbean": topic_mbean("*")})))
        .respond_with(jolokia_ok(json!([topic_mbean("events")])))
        .mount(&server)
        .await;

    let client = connected_client(&server).await;

    let info = client.get_broker_info().await.unwrap();
    assert_eq!(info.broker_name, BROKER_NAME);
    assert_eq!(info.connections, 5);
    assert_eq!(info.message_count, 10);

    let health = client.get_health().await.unwrap();
    assert_eq!(health.status, HealthStatus::Critical);
    assert_eq!(health.memory_pct, 95);
    assert_eq!(health.temp_pct, 0);

    let stats = client.get_stats().await.unwrap();
    assert_eq!(stats.queue_count, 2);
    assert_eq!(stats.topic_count, 1);
    assert_eq!(stats.info.enqueue_count, 100);
}

#[tokio::test]
async fn test_end_to_end_send_consume_counter_flow() {
    let server = start_stub_broker().await;

    Mock::given(method("POST"))
        .and(path("/api/message/t1"))
        .and(query_param("type", "queue"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;
    // Queue counters before the consume...
    Mock::given(method("POST"))
        .and(path("/api/jolokia"))
        .and(body_partial_json(json!({"type": "read", "mbean": queue_mbean("t1")})))
        .respond_with(jolokia_ok(json!({
            "QueueSize": 1, "EnqueueCount": 1, "DequeueCount": 0, "ConsumerCount": 0
        })))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    // ...and after it
    Mock::given(method("POST"))
        .and(path("/api/jolokia"))
        .and(body_partial_json(json!({"type": "read", "mbean": queue_mbean("t1")})))
        .respond_with(jolokia_ok(json!({
            "QueueSize": 0, "EnqueueCount": 1, "DequeueCount": 1, "ConsumerCount": 0
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/message/t1"))
        .respond_with(ResponseTemplate::new(200).set_body_string("hello"))
        .mount(&server)
        .await;

    let client = connected_client(&server).await;

    let receipt = client
        .send_message("/queue/t1", &json!("hello"), &HashMap::new())
        .await
        .unwrap();
    assert!(receipt.success);

    let info = client.get_queue_info("t1").await.unwrap();
    assert_eq!(info.size, 1);
    assert_eq!(info.enqueue_count, 1);

    let message = client
        .consume_message("/queue/t1", &ConsumeOptions::default())
        .await
        .unwrap()
        .expect("message should be present");
    assert_eq!(message.body, "hello");

    let info = client.get_queue_info("t1").await.unwrap();
    assert_eq!(info.size, 0);
    assert_eq!(info.dequeue_count, 1);
}
