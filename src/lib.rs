//! brokerlink - Multi-connection broker gateway
//!
//! A connection registry and protocol-translation layer for ActiveMQ-style
//! message brokers. Many independent named connections to broker HTTP
//! endpoints are created, tracked, health-checked, and torn down on demand;
//! each connection exposes a uniform set of messaging and telemetry
//! operations translated onto the broker's REST message API and its
//! Jolokia-style JMX management API.
//!
//! # Overview
//!
//! - Destination parsing (`/queue/`, `topic/`, ... prefixes)
//! - One HTTP session per broker with runtime broker-name discovery
//! - Send, consume, browse, purge, publish, list, and stats operations
//! - A registry of named connections with periodic health monitoring
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use brokerlink::config::ConnectionConfig;
//! use brokerlink::registry::ConnectionRegistry;
//! use serde_json::json;
//! use std::collections::HashMap;
//!
//! # async fn example() -> brokerlink::error::GatewayResult<()> {
//! let registry = ConnectionRegistry::new();
//! registry
//!     .add_connection("local", ConnectionConfig::new("localhost"))
//!     .await?;
//!
//! let connection = registry.get_connection("local").await?;
//! connection
//!     .queues()
//!     .send_message("/queue/orders", &json!("hello"), &HashMap::new())
//!     .await?;
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod facade;
pub mod observability;
pub mod protocol;
pub mod registry;
pub mod services;

pub use client::{BrokerClient, ConsumeOptions};
pub use config::{ConnectionConfig, GatewayConfig};
pub use error::{GatewayError, GatewayResult};
pub use facade::BrokerFacade;
pub use protocol::*;
pub use registry::ConnectionRegistry;
