//! Topic operations for one broker session
//!
//! "Subscription" here is explicitly a bounded polling loop over the HTTP
//! consume endpoint: no push delivery, no delivery guarantee. The loop is
//! capped both by a message count and a wall-clock deadline.

use crate::client::{BrokerClient, ConsumeOptions};
use crate::error::GatewayResult;
use crate::protocol::{Message, SendReceipt, TopicInfo};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::debug;

/// Per-request receive timeout used inside the polling loop
const POLL_STEP_MS: u64 = 1_000;

/// Topic-domain façade over the shared broker client
#[derive(Debug, Clone)]
pub struct TopicService {
    client: Arc<BrokerClient>,
}

impl TopicService {
    pub fn new(client: Arc<BrokerClient>) -> Self {
        Self { client }
    }

    pub async fn publish_message(
        &self,
        topic: &str,
        body: &Value,
        headers: &HashMap<String, String>,
    ) -> GatewayResult<SendReceipt> {
        let destination = qualify_topic(topic);
        self.client.send_message(&destination, body, headers).await
    }

    /// Poll a topic for up to `max_messages` messages or until `timeout`
    /// elapses, whichever comes first. Messages published while no poll is
    /// in flight are not observed.
    pub async fn poll_messages(
        &self,
        topic: &str,
        max_messages: usize,
        timeout: Duration,
        client_id: Option<String>,
    ) -> GatewayResult<Vec<Message>> {
        let destination = qualify_topic(topic);
        let deadline = Instant::now() + timeout;
        let mut messages = Vec::new();

        while messages.len() < max_messages {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                break;
            }
            let step = remaining.as_millis().min(u128::from(POLL_STEP_MS)) as u64;
            let options = ConsumeOptions {
                timeout_ms: Some(step),
                client_id: client_id.clone(),
                selector: None,
            };
            if let Some(message) = self.client.consume_message(&destination, &options).await? {
                messages.push(message);
            }
        }

        debug!(topic, count = messages.len(), "topic poll finished");
        Ok(messages)
    }

    pub async fn get_topic_info(&self, topic_name: &str) -> GatewayResult<TopicInfo> {
        self.client.get_topic_info(topic_name).await
    }

    pub async fn list_topics(&self) -> GatewayResult<Vec<String>> {
        self.client.list_topics().await
    }
}

/// Force topic addressing even when the caller passes a bare name
fn qualify_topic(topic: &str) -> String {
    format!("topic/{}", crate::protocol::clean_name(topic))
}
