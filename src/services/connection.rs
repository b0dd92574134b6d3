//! Connection lifecycle operations for one broker session

use crate::client::BrokerClient;
use crate::error::GatewayResult;
use crate::protocol::BrokerInfo;
use std::sync::Arc;

/// Lifecycle façade over the shared broker client
#[derive(Debug, Clone)]
pub struct ConnectionService {
    client: Arc<BrokerClient>,
}

impl ConnectionService {
    pub fn new(client: Arc<BrokerClient>) -> Self {
        Self { client }
    }

    pub async fn connect(&self) -> GatewayResult<()> {
        self.client.connect().await
    }

    pub fn disconnect(&self) {
        self.client.disconnect();
    }

    pub fn is_connected(&self) -> bool {
        self.client.is_connected()
    }

    pub async fn get_broker_info(&self) -> GatewayResult<BrokerInfo> {
        self.client.get_broker_info().await
    }
}
