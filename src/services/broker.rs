//! Broker telemetry operations for one broker session

use crate::client::BrokerClient;
use crate::error::GatewayResult;
use crate::protocol::{BrokerHealth, BrokerInfo, BrokerStats};
use std::sync::Arc;

/// Telemetry façade over the shared broker client
#[derive(Debug, Clone)]
pub struct BrokerService {
    client: Arc<BrokerClient>,
}

impl BrokerService {
    pub fn new(client: Arc<BrokerClient>) -> Self {
        Self { client }
    }

    pub async fn get_broker_info(&self) -> GatewayResult<BrokerInfo> {
        self.client.get_broker_info().await
    }

    pub async fn get_health(&self) -> GatewayResult<BrokerHealth> {
        self.client.get_health().await
    }

    pub async fn get_stats(&self) -> GatewayResult<BrokerStats> {
        self.client.get_stats().await
    }
}
