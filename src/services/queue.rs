//! Queue operations for one broker session

use crate::client::{BrokerClient, ConsumeOptions};
use crate::error::GatewayResult;
use crate::protocol::{Message, QueueInfo, SendReceipt};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

/// Queue-domain façade over the shared broker client
#[derive(Debug, Clone)]
pub struct QueueService {
    client: Arc<BrokerClient>,
}

impl QueueService {
    pub fn new(client: Arc<BrokerClient>) -> Self {
        Self { client }
    }

    pub async fn send_message(
        &self,
        destination: &str,
        body: &Value,
        headers: &HashMap<String, String>,
    ) -> GatewayResult<SendReceipt> {
        self.client.send_message(destination, body, headers).await
    }

    pub async fn consume_message(
        &self,
        destination: &str,
        options: &ConsumeOptions,
    ) -> GatewayResult<Option<Message>> {
        self.client.consume_message(destination, options).await
    }

    pub async fn browse_messages(
        &self,
        queue_name: &str,
        limit: usize,
    ) -> GatewayResult<Vec<Message>> {
        self.client.browse_messages(queue_name, limit).await
    }

    pub async fn purge_queue(&self, queue_name: &str) -> GatewayResult<u64> {
        self.client.purge_queue(queue_name).await
    }

    pub async fn get_queue_info(&self, queue_name: &str) -> GatewayResult<QueueInfo> {
        self.client.get_queue_info(queue_name).await
    }

    pub async fn list_queues(&self) -> GatewayResult<Vec<String>> {
        self.client.list_queues().await
    }
}
