//! Per-connection composition of client and domain services
//!
//! One [`BrokerFacade`] is the unit of "one connection": a single underlying
//! HTTP session shared by all four domain services, owned by exactly one
//! registry entry. The facade delegates; it never reaches into client
//! internals.

use crate::client::BrokerClient;
use crate::config::ConnectionConfig;
use crate::error::GatewayResult;
use crate::services::{BrokerService, ConnectionService, QueueService, TopicService};
use std::sync::Arc;

/// All domain operations over one broker connection
#[derive(Debug)]
pub struct BrokerFacade {
    client: Arc<BrokerClient>,
    connection: ConnectionService,
    queues: QueueService,
    topics: TopicService,
    broker: BrokerService,
}

impl BrokerFacade {
    /// Build the facade and its services around one new client session.
    /// Performs no network I/O; call [`Self::connect`] to go live.
    pub fn new(config: ConnectionConfig) -> GatewayResult<Self> {
        let client = Arc::new(BrokerClient::new(config)?);
        Ok(Self {
            connection: ConnectionService::new(Arc::clone(&client)),
            queues: QueueService::new(Arc::clone(&client)),
            topics: TopicService::new(Arc::clone(&client)),
            broker: BrokerService::new(Arc::clone(&client)),
            client,
        })
    }

    pub async fn connect(&self) -> GatewayResult<()> {
        self.connection.connect().await
    }

    pub fn disconnect(&self) {
        self.connection.disconnect();
    }

    pub fn is_connected(&self) -> bool {
        self.connection.is_connected()
    }

    pub fn config(&self) -> &ConnectionConfig {
        self.client.config()
    }

    pub fn connection(&self) -> &ConnectionService {
        &self.connection
    }

    pub fn queues(&self) -> &QueueService {
        &self.queues
    }

    pub fn topics(&self) -> &TopicService {
        &self.topics
    }

    pub fn broker(&self) -> &BrokerService {
        &self.broker
    }
}
