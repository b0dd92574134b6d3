//! Value types exchanged with callers
//!
//! All of these are transient: produced by one operation, returned up the
//! chain, never stored. Serde derives keep them ready for whatever envelope
//! the outer RPC layer wraps them in.

use crate::config::ConnectionConfig;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{debug, warn};

/// One message received from a broker destination
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub headers: HashMap<String, String>,
    pub body: String,
    pub received_at: DateTime<Utc>,
}

impl Message {
    /// Acknowledge the message. The broker's HTTP consume endpoint
    /// auto-acknowledges on delivery, so this is a local no-op.
    pub fn ack(&self) {
        debug!("ack is a no-op: the broker auto-acknowledges on HTTP consume");
    }

    /// Negative-acknowledge the message. Unsupported by the broker's HTTP
    /// protocol; logged as a warning, never a failure.
    pub fn nack(&self) {
        warn!("nack is not supported over the broker's HTTP protocol; message was already auto-acknowledged");
    }
}

/// Outcome of a send/publish operation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SendReceipt {
    pub success: bool,
    pub status: u16,
}

/// One usage/limit pair from the broker's resource accounting
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct UsagePair {
    pub usage: u64,
    pub limit: u64,
}

impl UsagePair {
    pub fn new(usage: u64, limit: u64) -> Self {
        Self { usage, limit }
    }

    /// Usage as a rounded percentage of the limit; 0 when the limit is 0
    pub fn usage_pct(&self) -> u32 {
        if self.limit == 0 {
            return 0;
        }
        ((self.usage as f64 / self.limit as f64) * 100.0).round() as u32
    }
}

/// Overall broker health classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Warning,
    Critical,
}

impl HealthStatus {
    /// Classify from resource usage percentages: critical above 90%,
    /// warning above 75%, healthy otherwise.
    pub fn classify(pairs: &[UsagePair]) -> Self {
        let max_pct = pairs.iter().map(UsagePair::usage_pct).max().unwrap_or(0);
        if max_pct > 90 {
            HealthStatus::Critical
        } else if max_pct > 75 {
            HealthStatus::Warning
        } else {
            HealthStatus::Healthy
        }
    }
}

/// Counters and resource usage for one broker
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BrokerInfo {
    pub broker_name: String,
    pub connections: u64,
    pub consumers: u64,
    pub producers: u64,
    pub enqueue_count: u64,
    pub dequeue_count: u64,
    pub message_count: u64,
    pub memory: UsagePair,
    pub store: UsagePair,
    pub temp: UsagePair,
}

impl BrokerInfo {
    /// Health view over the three resource pairs
    pub fn health(&self) -> BrokerHealth {
        BrokerHealth {
            status: HealthStatus::classify(&[self.memory, self.store, self.temp]),
            memory_pct: self.memory.usage_pct(),
            store_pct: self.store.usage_pct(),
            temp_pct: self.temp.usage_pct(),
        }
    }
}

/// Health classification plus the percentages it was derived from
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrokerHealth {
    pub status: HealthStatus,
    pub memory_pct: u32,
    pub store_pct: u32,
    pub temp_pct: u32,
}

/// Broker counters plus destination totals from the full listing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrokerStats {
    #[serde(flatten)]
    pub info: BrokerInfo,
    pub queue_count: usize,
    pub topic_count: usize,
}

/// Management counters for one queue
///
/// A failed management read degrades to a zeroed record carrying the error
/// message: callers use this for does-it-exist/is-it-empty checks where a
/// miss is informative, not fatal.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QueueInfo {
    pub name: String,
    pub size: u64,
    pub consumer_count: u64,
    pub enqueue_count: u64,
    pub dequeue_count: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl QueueInfo {
    /// Zeroed record for a failed management read
    pub fn degraded<S: Into<String>>(name: S, error: String) -> Self {
        Self {
            name: name.into(),
            error: Some(error),
            ..Default::default()
        }
    }
}

/// Management counters for one topic
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TopicInfo {
    pub name: String,
    pub consumer_count: u64,
    pub enqueue_count: u64,
    pub dequeue_count: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl TopicInfo {
    /// Zeroed record for a failed management read
    pub fn degraded<S: Into<String>>(name: S, error: String) -> Self {
        Self {
            name: name.into(),
            error: Some(error),
            ..Default::default()
        }
    }
}

/// Read-only projection of one registry entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectionInfo {
    pub id: String,
    pub host: String,
    pub port: u16,
    pub username: Option<String>,
    pub ssl: bool,
    pub connected: bool,
    pub healthy: bool,
    pub created_at: DateTime<Utc>,
    pub last_health_check: Option<DateTime<Utc>>,
}

/// Exportable form of a connection config. Never carries the password.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExportedConnection {
    pub host: String,
    pub port: u16,
    pub username: Option<String>,
    pub ssl: bool,
    pub timeout_ms: u64,
}

impl From<&ConnectionConfig> for ExportedConnection {
    fn from(config: &ConnectionConfig) -> Self {
        Self {
            host: config.host.clone(),
            port: config.port,
            username: config.username.clone(),
            ssl: config.ssl,
            timeout_ms: config.timeout_ms,
        }
    }
}

/// Per-entry result of a bulk import
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportOutcome {
    pub id: String,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Result of probing a config without registering it
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectionTestReport {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub broker_info: Option<BrokerInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// One connection's slice of an aggregate status/stats view
///
/// A failed broker-info fetch is recorded inline instead of aborting the
/// aggregate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectionStatus {
    pub id: String,
    pub connected: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub broker: Option<BrokerInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// One connection's slice of an aggregate stats view
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectionStats {
    pub id: String,
    pub connected: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stats: Option<BrokerStats>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Registry-wide status roll-up
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemStatus {
    pub total_connections: usize,
    pub connected: usize,
    pub healthy: usize,
    pub connections: Vec<ConnectionStatus>,
}
