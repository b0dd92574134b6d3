//! Connection registry and health monitoring
//!
//! Owns the map from caller-supplied connection identifiers to live
//! [`BrokerFacade`] instances plus their metadata. Enforces identifier
//! uniqueness, gates lookups on liveness, runs the periodic health sweep,
//! and provides bulk export/import and aggregate telemetry views.
//!
//! The health sweep probes connections sequentially on purpose: it bounds
//! the load spike against many brokers at the cost of sweep latency growing
//! with registry size.

use crate::config::ConnectionConfig;
use crate::error::{GatewayError, GatewayResult};
use crate::facade::BrokerFacade;
use crate::protocol::{
    ConnectionInfo, ConnectionStats, ConnectionStatus, ConnectionTestReport, ExportedConnection,
    ImportOutcome, SystemStatus,
};
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

/// Default interval between health-check sweeps
pub const DEFAULT_HEALTH_INTERVAL: Duration = Duration::from_secs(30);

struct ConnectionEntry {
    facade: Arc<BrokerFacade>,
    config: ConnectionConfig,
    created_at: DateTime<Utc>,
    last_health_check: Option<DateTime<Utc>>,
    healthy: bool,
}

impl ConnectionEntry {
    fn info(&self, id: &str) -> ConnectionInfo {
        ConnectionInfo {
            id: id.to_string(),
            host: self.config.host.clone(),
            port: self.config.port,
            username: self.config.username.clone(),
            ssl: self.config.ssl,
            connected: self.facade.is_connected(),
            healthy: self.healthy,
            created_at: self.created_at,
            last_health_check: self.last_health_check,
        }
    }
}

/// Registry of named broker connections
pub struct ConnectionRegistry {
    connections: RwLock<HashMap<String, ConnectionEntry>>,
    health_interval: Duration,
    health_task: Mutex<Option<JoinHandle<()>>>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self::with_health_interval(DEFAULT_HEALTH_INTERVAL)
    }

    pub fn with_health_interval(health_interval: Duration) -> Self {
        Self {
            connections: RwLock::new(HashMap::new()),
            health_interval,
            health_task: Mutex::new(None),
        }
    }

    /// Register a new connection under `id`, connecting before inserting.
    ///
    /// On connect failure the half-built facade is discarded and nothing is
    /// registered; the registry never holds a half-registered entry.
    pub async fn add_connection(&self, id: &str, config: ConnectionConfig) -> GatewayResult<()> {
        if id.trim().is_empty() {
            return Err(GatewayError::invalid_argument(
                "connection id must be a non-empty string",
            ));
        }
        config.validate()?;

        if self.connections.read().await.contains_key(id) {
            return Err(GatewayError::duplicate_id(id));
        }

        let facade = Arc::new(BrokerFacade::new(config.clone())?);
        facade
            .connect()
            .await
            .map_err(|e| e.with_connection(id))?;

        let mut connections = self.connections.write().await;
        // A concurrent add may have won the race while we were connecting.
        if connections.contains_key(id) {
            facade.disconnect();
            return Err(GatewayError::duplicate_id(id));
        }
        connections.insert(
            id.to_string(),
            ConnectionEntry {
                facade,
                config,
                created_at: Utc::now(),
                last_health_check: None,
                healthy: true,
            },
        );
        info!(connection = id, "connection registered");
        Ok(())
    }

    /// Remove a connection, disconnecting best-effort: a disconnect problem
    /// never blocks removal.
    pub async fn remove_connection(&self, id: &str) -> GatewayResult<()> {
        let mut connections = self.connections.write().await;
        match connections.remove(id) {
            Some(entry) => {
                entry.facade.disconnect();
                info!(connection = id, "connection removed");
                Ok(())
            }
            None => {
                let known: Vec<String> = connections.keys().cloned().collect();
                Err(GatewayError::not_found(id, &known))
            }
        }
    }

    /// Resolve a connection id to its facade, used by every domain
    /// operation. Fails with `NotFound` for unknown ids and `Inactive` for
    /// registered-but-disconnected entries.
    pub async fn get_connection(&self, id: &str) -> GatewayResult<Arc<BrokerFacade>> {
        let connections = self.connections.read().await;
        match connections.get(id) {
            Some(entry) => {
                if entry.facade.is_connected() {
                    Ok(Arc::clone(&entry.facade))
                } else {
                    Err(GatewayError::inactive(id))
                }
            }
            None => {
                let known: Vec<String> = connections.keys().cloned().collect();
                Err(GatewayError::not_found(id, &known))
            }
        }
    }

    /// Read-only projection of every registered connection
    pub async fn list_connections(&self) -> Vec<ConnectionInfo> {
        let connections = self.connections.read().await;
        let mut infos: Vec<ConnectionInfo> = connections
            .iter()
            .map(|(id, entry)| entry.info(id))
            .collect();
        infos.sort_by(|a, b| a.id.cmp(&b.id));
        infos
    }

    /// Read-only projection of one connection
    pub async fn get_connection_info(&self, id: &str) -> GatewayResult<ConnectionInfo> {
        let connections = self.connections.read().await;
        match connections.get(id) {
            Some(entry) => Ok(entry.info(id)),
            None => {
                let known: Vec<String> = connections.keys().cloned().collect();
                Err(GatewayError::not_found(id, &known))
            }
        }
    }

    /// Start the recurring health sweep. No-op when already running.
    pub fn start_health_monitor(self: &Arc<Self>) {
        let mut task = self.health_task.lock().unwrap_or_else(|e| e.into_inner());
        if task.is_some() {
            return;
        }
        let registry = Arc::clone(self);
        let interval = self.health_interval;
        *task = Some(tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            // The first tick fires immediately; skip it so a sweep never
            // races the bring-up that spawned us.
            ticker.tick().await;
            loop {
                ticker.tick().await;
                registry.run_health_sweep().await;
            }
        }));
        debug!(interval_secs = interval.as_secs(), "health monitor started");
    }

    /// Probe every registered connection once, sequentially, updating each
    /// entry's health flag and check timestamp.
    pub async fn run_health_sweep(&self) {
        let snapshot: Vec<(String, Arc<BrokerFacade>)> = {
            let connections = self.connections.read().await;
            connections
                .iter()
                .map(|(id, entry)| (id.clone(), Arc::clone(&entry.facade)))
                .collect()
        };

        for (id, facade) in snapshot {
            let healthy = match facade.broker().get_broker_info().await {
                Ok(_) => facade.is_connected(),
                Err(e) => {
                    warn!(connection = %id, error = %e, "health check failed");
                    false
                }
            };

            let mut connections = self.connections.write().await;
            // The entry may have been removed while we probed.
            if let Some(entry) = connections.get_mut(&id) {
                entry.healthy = healthy;
                entry.last_health_check = Some(Utc::now());
            }
        }
    }

    /// Disconnect every connection concurrently (settle-all: one failing
    /// disconnect never prevents the others), clear the registry, and stop
    /// the health monitor.
    pub async fn disconnect_all(&self) {
        if let Some(task) = self
            .health_task
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .take()
        {
            task.abort();
        }

        let entries: Vec<(String, Arc<BrokerFacade>)> = {
            let mut connections = self.connections.write().await;
            connections
                .drain()
                .map(|(id, entry)| (id, entry.facade))
                .collect()
        };

        let handles: Vec<JoinHandle<()>> = entries
            .into_iter()
            .map(|(id, facade)| {
                tokio::spawn(async move {
                    facade.disconnect();
                    debug!(connection = %id, "disconnected during shutdown");
                })
            })
            .collect();
        for handle in handles {
            if let Err(e) = handle.await {
                error!(error = %e, "disconnect task failed during shutdown");
            }
        }
        info!("all connections disconnected, registry cleared");
    }

    /// Probe a config without registering anything. Reachability failures
    /// are reported in the result, never thrown; only malformed input is an
    /// error.
    pub async fn test_connection(
        &self,
        config: ConnectionConfig,
    ) -> GatewayResult<ConnectionTestReport> {
        config.validate()?;
        let facade = BrokerFacade::new(config)?;

        if let Err(e) = facade.connect().await {
            return Ok(ConnectionTestReport {
                success: false,
                broker_info: None,
                error: Some(e.to_string()),
            });
        }

        let report = match facade.broker().get_broker_info().await {
            Ok(info) => ConnectionTestReport {
                success: true,
                broker_info: Some(info),
                error: None,
            },
            Err(e) => ConnectionTestReport {
                success: false,
                broker_info: None,
                error: Some(e.to_string()),
            },
        };
        facade.disconnect();
        Ok(report)
    }

    /// Export every connection's config without its password
    pub async fn export_connections(&self) -> HashMap<String, ExportedConnection> {
        let connections = self.connections.read().await;
        connections
            .iter()
            .map(|(id, entry)| (id.clone(), ExportedConnection::from(&entry.config)))
            .collect()
    }

    /// Register a batch of connections, one outcome per entry. A failing
    /// entry never aborts the rest.
    pub async fn import_connections(
        &self,
        configs: HashMap<String, ConnectionConfig>,
    ) -> Vec<ImportOutcome> {
        let mut entries: Vec<(String, ConnectionConfig)> = configs.into_iter().collect();
        entries.sort_by(|a, b| a.0.cmp(&b.0));

        let mut outcomes = Vec::with_capacity(entries.len());
        for (id, config) in entries {
            let outcome = match self.add_connection(&id, config).await {
                Ok(()) => ImportOutcome {
                    id,
                    success: true,
                    error: None,
                },
                Err(e) => ImportOutcome {
                    id,
                    success: false,
                    error: Some(e.to_string()),
                },
            };
            outcomes.push(outcome);
        }
        outcomes
    }

    /// Aggregate broker stats across every connection; a failing fetch is
    /// recorded inline for that entry.
    pub async fn get_broker_stats(&self) -> Vec<ConnectionStats> {
        let snapshot: Vec<(String, Arc<BrokerFacade>)> = {
            let connections = self.connections.read().await;
            let mut pairs: Vec<_> = connections
                .iter()
                .map(|(id, entry)| (id.clone(), Arc::clone(&entry.facade)))
                .collect();
            pairs.sort_by(|a, b| a.0.cmp(&b.0));
            pairs
        };

        let mut stats = Vec::with_capacity(snapshot.len());
        for (id, facade) in snapshot {
            match facade.broker().get_stats().await {
                Ok(value) => stats.push(ConnectionStats {
                    id,
                    connected: facade.is_connected(),
                    stats: Some(value),
                    error: None,
                }),
                Err(e) => stats.push(ConnectionStats {
                    id,
                    connected: false,
                    stats: None,
                    error: Some(e.to_string()),
                }),
            }
        }
        stats
    }

    /// Registry-wide roll-up of connection and broker state
    pub async fn get_system_status(&self) -> SystemStatus {
        let snapshot: Vec<(String, Arc<BrokerFacade>, bool)> = {
            let connections = self.connections.read().await;
            let mut triples: Vec<_> = connections
                .iter()
                .map(|(id, entry)| (id.clone(), Arc::clone(&entry.facade), entry.healthy))
                .collect();
            triples.sort_by(|a, b| a.0.cmp(&b.0));
            triples
        };

        let total_connections = snapshot.len();
        let mut connected = 0;
        let mut healthy = 0;
        let mut statuses = Vec::with_capacity(total_connections);
        for (id, facade, entry_healthy) in snapshot {
            let is_connected = facade.is_connected();
            if is_connected {
                connected += 1;
            }
            if entry_healthy {
                healthy += 1;
            }
            match facade.broker().get_broker_info().await {
                Ok(info) => statuses.push(ConnectionStatus {
                    id,
                    connected: is_connected,
                    broker: Some(info),
                    error: None,
                }),
                Err(e) => statuses.push(ConnectionStatus {
                    id,
                    connected: false,
                    broker: None,
                    error: Some(e.to_string()),
                }),
            }
        }

        SystemStatus {
            total_connections,
            connected,
            healthy,
            connections: statuses,
        }
    }
}

impl Default for ConnectionRegistry {
    fn default() -> Self {
        Self::new()
    }
}
